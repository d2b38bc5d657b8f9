//! REST API DTOs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::Station;

/// Standard response wrapper. Success: `{"success": true, "data": {...}}`,
/// failure: `{"success": false, "error": "..."}`.
#[derive(Debug, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl<T> ApiResponse<T> {
    pub fn success(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(message.into()),
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct StationDto {
    pub id: i32,
    pub ocpp_id: String,
    pub name: Option<String>,
    pub model: Option<String>,
    pub serial_number: Option<String>,
    pub power_kw: Option<f64>,
    pub network_id: Option<i32>,
    pub connected: bool,
    pub charger_status: Option<String>,
    pub boot_time: Option<DateTime<Utc>>,
    pub last_heartbeat: Option<DateTime<Utc>>,
    pub line1_power_w: Option<f64>,
    pub line1_current_a: Option<f64>,
}

impl From<Station> for StationDto {
    fn from(station: Station) -> Self {
        Self {
            id: station.id,
            connected: station.is_connected(),
            ocpp_id: station.ocpp_id,
            name: station.name,
            model: station.model,
            serial_number: station.serial_number,
            power_kw: station.power_kw,
            network_id: station.network_id,
            charger_status: station.charger_status,
            boot_time: station.boot_time,
            last_heartbeat: station.last_heartbeat,
            line1_power_w: station.line1_power_w,
            line1_current_a: station.line1_current_a,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct CommandResponse {
    pub status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct RemoteStartRequest {
    pub id_tag: String,
    pub connector_id: Option<i32>,
}

#[derive(Debug, Deserialize)]
pub struct RemoteStopRequest {
    /// Falls back to the station's open session when omitted.
    pub transaction_id: Option<i32>,
}

#[derive(Debug, Deserialize)]
pub struct ConfigurationRequest {
    pub key: String,
    pub value: String,
}

#[derive(Debug, Deserialize)]
pub struct TriggerParams {
    pub message: Option<String>,
}

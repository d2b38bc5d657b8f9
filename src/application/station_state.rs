//! Station state manager
//!
//! All mutations are find-or-create-then-upsert against the repository, so
//! applying the same protocol event twice converges on the same stored row.

use std::sync::Arc;

use tracing::info;

use crate::domain::{DomainResult, Station, StationRepository};

/// Upserts a station's descriptive and live-telemetry state from partial
/// protocol-event updates.
pub struct StationDirectory {
    stations: Arc<dyn StationRepository>,
}

impl StationDirectory {
    pub fn new(stations: Arc<dyn StationRepository>) -> Self {
        Self { stations }
    }

    async fn find_or_new(&self, ocpp_id: &str) -> DomainResult<Station> {
        Ok(self
            .stations
            .find_by_ocpp_id(ocpp_id)
            .await?
            .unwrap_or_else(|| Station::new(ocpp_id)))
    }

    /// A socket opened for this station. Creates the row on first contact.
    pub async fn mark_connected(&self, ocpp_id: &str) -> DomainResult<Station> {
        let mut station = self.find_or_new(ocpp_id).await?;
        station.mark_connected();
        self.stations.upsert(station).await
    }

    /// The station's socket closed. Unknown stations are left untouched.
    pub async fn mark_disconnected(&self, ocpp_id: &str) -> DomainResult<()> {
        if let Some(mut station) = self.stations.find_by_ocpp_id(ocpp_id).await? {
            station.mark_disconnected();
            self.stations.upsert(station).await?;
        }
        Ok(())
    }

    /// BootNotification: creates the row if unseen.
    pub async fn record_boot(&self, ocpp_id: &str, model: Option<String>) -> DomainResult<Station> {
        let mut station = self.find_or_new(ocpp_id).await?;
        station.record_boot(model);
        let station = self.stations.upsert(station).await?;
        info!(ocpp_id, model = station.model.as_deref(), "Station booted");
        Ok(station)
    }

    pub async fn record_heartbeat(&self, ocpp_id: &str) -> DomainResult<()> {
        if let Some(mut station) = self.stations.find_by_ocpp_id(ocpp_id).await? {
            station.record_heartbeat();
            self.stations.upsert(station).await?;
        }
        Ok(())
    }

    /// StatusNotification: store the device-reported status string verbatim.
    pub async fn record_status(&self, ocpp_id: &str, status: &str) -> DomainResult<()> {
        if let Some(mut station) = self.stations.find_by_ocpp_id(ocpp_id).await? {
            station.charger_status = Some(status.to_string());
            self.stations.upsert(station).await?;
        }
        Ok(())
    }

    /// Latest instantaneous power/current seen in a MeterValues sample.
    pub async fn record_meter_readings(
        &self,
        ocpp_id: &str,
        power_w: Option<f64>,
        current_a: Option<f64>,
    ) -> DomainResult<Option<Station>> {
        match self.stations.find_by_ocpp_id(ocpp_id).await? {
            Some(mut station) => {
                station.record_meter_readings(power_w, current_a);
                Ok(Some(self.stations.upsert(station).await?))
            }
            None => Ok(None),
        }
    }

    pub async fn find_by_ocpp_id(&self, ocpp_id: &str) -> DomainResult<Option<Station>> {
        self.stations.find_by_ocpp_id(ocpp_id).await
    }

    pub async fn find_by_id(&self, id: i32) -> DomainResult<Option<Station>> {
        self.stations.find_by_id(id).await
    }

    pub async fn list(&self) -> DomainResult<Vec<Station>> {
        self.stations.list().await
    }
}

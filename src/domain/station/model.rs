//! Charging station domain entity

use chrono::{DateTime, Utc};

/// Whether a station currently holds an open WebSocket to this server.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ConnectionStatus {
    Connected,
    #[default]
    Disconnected,
}

impl std::fmt::Display for ConnectionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Connected => write!(f, "Connected"),
            Self::Disconnected => write!(f, "Disconnected"),
        }
    }
}

impl From<&str> for ConnectionStatus {
    fn from(s: &str) -> Self {
        if s.eq_ignore_ascii_case("connected") {
            Self::Connected
        } else {
            Self::Disconnected
        }
    }
}

/// One physical charge point.
///
/// `ocpp_id` is the protocol-level identifier taken from the connection URL
/// and is the sole correlation key between wire traffic and persisted state.
/// The numeric `id` is owned by the persistence layer (0 until first saved).
#[derive(Debug, Clone, Default)]
pub struct Station {
    pub id: i32,
    pub ocpp_id: String,

    // Descriptive
    pub name: Option<String>,
    pub model: Option<String>,
    pub serial_number: Option<String>,
    pub puk: Option<String>,
    /// Rated power in kW.
    pub power_kw: Option<f64>,

    // Free-form operator attributes
    pub vehicle: Option<String>,
    pub access: Option<String>,
    pub self_consumption: Option<String>,
    pub internet: Option<String>,
    pub scheduling: Option<String>,
    pub meter_nominal_power: Option<String>,

    /// Owning network; never mutated by the protocol engine.
    pub network_id: Option<i32>,

    // Live telemetry
    pub boot_time: Option<DateTime<Utc>>,
    pub last_heartbeat: Option<DateTime<Utc>>,
    /// Free-text state as reported by the device ("Booted", "Active", ...).
    pub charger_status: Option<String>,
    pub connection_status: ConnectionStatus,
    /// Last seen instantaneous active power on line 1, in W.
    pub line1_power_w: Option<f64>,
    /// Last seen current on line 1, in A.
    pub line1_current_a: Option<f64>,
}

impl Station {
    pub fn new(ocpp_id: impl Into<String>) -> Self {
        Self {
            ocpp_id: ocpp_id.into(),
            ..Default::default()
        }
    }

    pub fn mark_connected(&mut self) {
        self.connection_status = ConnectionStatus::Connected;
        self.last_heartbeat = Some(Utc::now());
    }

    pub fn mark_disconnected(&mut self) {
        self.connection_status = ConnectionStatus::Disconnected;
    }

    /// Apply a BootNotification: the device is up and re-announcing itself.
    pub fn record_boot(&mut self, model: Option<String>) {
        let now = Utc::now();
        self.boot_time = Some(now);
        self.last_heartbeat = Some(now);
        self.charger_status = Some("Booted".to_string());
        if model.is_some() {
            self.model = model;
        }
    }

    pub fn record_heartbeat(&mut self) {
        self.last_heartbeat = Some(Utc::now());
        self.charger_status = Some("Active".to_string());
    }

    pub fn record_meter_readings(&mut self, power_w: Option<f64>, current_a: Option<f64>) {
        if power_w.is_some() {
            self.line1_power_w = power_w;
        }
        if current_a.is_some() {
            self.line1_current_a = current_a;
        }
    }

    pub fn is_connected(&self) -> bool {
        self.connection_status == ConnectionStatus::Connected
    }
}

//! Live connection handle

use chrono::{DateTime, Utc};
use tokio::sync::mpsc;

/// One registered station socket.
///
/// The `connection_id` distinguishes a socket from its replacement when a
/// station reconnects: cleanup of a superseded socket must not evict the
/// entry belonging to the newer one.
#[derive(Debug)]
pub struct Connection {
    pub connection_id: u64,
    pub station_id: String,
    /// Outbound channel; the per-socket writer task drains it, so there is
    /// only ever one writer on the underlying socket.
    pub sender: mpsc::UnboundedSender<String>,
    pub connected_at: DateTime<Utc>,
}

impl Connection {
    pub fn new(
        connection_id: u64,
        station_id: impl Into<String>,
        sender: mpsc::UnboundedSender<String>,
    ) -> Self {
        Self {
            connection_id,
            station_id: station_id.into(),
            sender,
            connected_at: Utc::now(),
        }
    }

    pub fn send(&self, message: String) -> Result<(), String> {
        self.sender
            .send(message)
            .map_err(|e| format!("send to {} failed: {}", self.station_id, e))
    }
}

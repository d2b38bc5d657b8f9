//! Outbound command sender (Central System → station)
//!
//! Builds OCPP Call frames, writes them to the station's registered socket
//! and correlates the eventual CallResult/CallError back to the caller
//! through a pending-request table keyed by (station id, message id). Each
//! sent Call owns a oneshot responder with a timeout, so a response is never
//! just logged and lost.

pub mod change_configuration;
pub mod remote_start;
pub mod remote_stop;
pub mod trigger_message;

use std::sync::Arc;
use std::time::Duration;

use dashmap::DashMap;
use serde_json::Value;
use tokio::sync::oneshot;
use tokio::time::timeout;
use tracing::{info, warn};
use uuid::Uuid;

use crate::interfaces::ws::SharedConnectionRegistry;
use crate::support::OcppFrame;

pub use change_configuration::change_configuration;
pub use remote_start::remote_start_transaction;
pub use remote_stop::remote_stop_transaction;
pub use trigger_message::trigger_message;

pub const DEFAULT_RESPONSE_TIMEOUT: Duration = Duration::from_secs(30);

struct PendingRequest {
    action: String,
    responder: oneshot::Sender<Result<Value, CommandError>>,
}

#[derive(Debug, Clone)]
pub enum CommandError {
    /// Station has no open socket; callers treat this as a logged no-op.
    NotConnected(String),
    SendFailed(String),
    Timeout,
    ResponseChannelClosed,
    /// The station answered with a CallError frame.
    CallError { code: String, description: String },
}

impl std::fmt::Display for CommandError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotConnected(id) => write!(f, "station not connected: {}", id),
            Self::SendFailed(msg) => write!(f, "failed to send: {}", msg),
            Self::Timeout => write!(f, "response timeout"),
            Self::ResponseChannelClosed => write!(f, "response channel closed"),
            Self::CallError { code, description } => {
                write!(f, "CallError {}: {}", code, description)
            }
        }
    }
}

impl std::error::Error for CommandError {}

pub struct CommandSender {
    registry: SharedConnectionRegistry,
    pending: DashMap<(String, String), PendingRequest>,
    response_timeout: Duration,
}

pub type SharedCommandSender = Arc<CommandSender>;

impl CommandSender {
    pub fn new(registry: SharedConnectionRegistry) -> Self {
        Self::with_timeout(registry, DEFAULT_RESPONSE_TIMEOUT)
    }

    pub fn with_timeout(registry: SharedConnectionRegistry, response_timeout: Duration) -> Self {
        Self {
            registry,
            pending: DashMap::new(),
            response_timeout,
        }
    }

    pub fn shared(registry: SharedConnectionRegistry) -> SharedCommandSender {
        Arc::new(Self::new(registry))
    }

    fn next_message_id() -> String {
        Uuid::new_v4().simple().to_string()
    }

    /// Send a Call and wait for the station's answer.
    ///
    /// `Err(NotConnected)` means nothing was transmitted. A successful return
    /// only proves the device answered; delivery of side effects is the
    /// device's business.
    pub async fn send_request(
        &self,
        station_id: &str,
        action: &str,
        payload: Value,
    ) -> Result<Value, CommandError> {
        if !self.registry.is_connected(station_id) {
            return Err(CommandError::NotConnected(station_id.to_string()));
        }

        let message_id = Self::next_message_id();
        let frame = OcppFrame::Call {
            message_id: message_id.clone(),
            action: action.to_string(),
            payload,
        };

        let (tx, rx) = oneshot::channel();
        let key = (station_id.to_string(), message_id.clone());
        self.pending.insert(
            key.clone(),
            PendingRequest {
                action: action.to_string(),
                responder: tx,
            },
        );

        info!(station_id, action, message_id = message_id.as_str(), "Sending command");

        if let Err(e) = self.registry.send_to(station_id, frame.serialize()) {
            self.pending.remove(&key);
            return Err(CommandError::NotConnected(e));
        }

        match timeout(self.response_timeout, rx).await {
            Ok(Ok(outcome)) => outcome,
            Ok(Err(_)) => {
                self.pending.remove(&key);
                Err(CommandError::ResponseChannelClosed)
            }
            Err(_) => {
                self.pending.remove(&key);
                warn!(station_id, action, message_id = message_id.as_str(), "Command timed out");
                Err(CommandError::Timeout)
            }
        }
    }

    /// Route an incoming CallResult to the matching pending request.
    pub fn handle_response(&self, station_id: &str, message_id: &str, payload: Value) {
        let key = (station_id.to_string(), message_id.to_string());
        if let Some((_, pending)) = self.pending.remove(&key) {
            info!(
                station_id,
                action = pending.action.as_str(),
                message_id,
                "Received command response"
            );
            let _ = pending.responder.send(Ok(payload));
        } else {
            warn!(station_id, message_id, "CallResult without a pending request");
        }
    }

    /// Route an incoming CallError to the matching pending request.
    pub fn handle_error(&self, station_id: &str, message_id: &str, code: &str, description: &str) {
        let key = (station_id.to_string(), message_id.to_string());
        if let Some((_, pending)) = self.pending.remove(&key) {
            warn!(
                station_id,
                action = pending.action.as_str(),
                message_id,
                code,
                description,
                "Command rejected by station"
            );
            let _ = pending.responder.send(Err(CommandError::CallError {
                code: code.to_string(),
                description: description.to_string(),
            }));
        }
    }

    /// Drop pending requests for a station whose socket closed.
    pub fn drop_pending_for(&self, station_id: &str) {
        self.pending.retain(|key, _| key.0 != station_id);
    }

    pub fn registry(&self) -> &SharedConnectionRegistry {
        &self.registry
    }

    #[cfg(test)]
    fn pending_count(&self) -> usize {
        self.pending.len()
    }
}

/// Run a command operation with offline-as-no-op semantics: a station
/// without an open socket yields `Ok(None)` and a logged warning instead of
/// an error.
async fn send_logged(
    sender: &CommandSender,
    station_id: &str,
    action: &str,
    payload: Value,
) -> Result<Option<Value>, CommandError> {
    match sender.send_request(station_id, action, payload).await {
        Ok(response) => Ok(Some(response)),
        Err(CommandError::NotConnected(_)) => {
            warn!(station_id, action, "No open socket for station, command skipped");
            Ok(None)
        }
        Err(e) => Err(e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::interfaces::ws::ConnectionRegistry;
    use serde_json::json;
    use tokio::sync::mpsc;

    fn sender_with_station(
        station_id: &str,
    ) -> (Arc<CommandSender>, mpsc::UnboundedReceiver<String>) {
        let registry = ConnectionRegistry::shared();
        let (tx, rx) = mpsc::unbounded_channel();
        registry.register(station_id, tx);
        (
            Arc::new(CommandSender::with_timeout(
                registry,
                Duration::from_millis(200),
            )),
            rx,
        )
    }

    fn parse_sent_call(raw: &str) -> (String, String, Value) {
        match OcppFrame::parse(raw).unwrap() {
            OcppFrame::Call {
                message_id,
                action,
                payload,
            } => (message_id, action, payload),
            other => panic!("expected Call, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn offline_station_is_a_logged_noop() {
        let registry = ConnectionRegistry::shared();
        let sender = CommandSender::new(registry);

        let outcome = change_configuration(&sender, "ghost", "HeartbeatInterval", "30").await;
        assert!(matches!(outcome, Ok(None)));
        assert_eq!(sender.pending_count(), 0);
    }

    #[tokio::test]
    async fn response_is_correlated_by_message_id() {
        let (sender, mut rx) = sender_with_station("ST-001");

        let request = {
            let sender = sender.clone();
            tokio::spawn(async move {
                sender
                    .send_request("ST-001", "TriggerMessage", json!({"requestedMessage":"Heartbeat"}))
                    .await
            })
        };

        let raw = rx.recv().await.unwrap();
        let (message_id, action, payload) = parse_sent_call(&raw);
        assert_eq!(action, "TriggerMessage");
        assert_eq!(payload["requestedMessage"], "Heartbeat");

        sender.handle_response("ST-001", &message_id, json!({"status":"Accepted"}));

        let response = request.await.unwrap().unwrap();
        assert_eq!(response["status"], "Accepted");
        assert_eq!(sender.pending_count(), 0);
    }

    #[tokio::test]
    async fn call_error_surfaces_to_the_caller() {
        let (sender, mut rx) = sender_with_station("ST-001");

        let request = {
            let sender = sender.clone();
            tokio::spawn(async move {
                sender
                    .send_request("ST-001", "RemoteStopTransaction", json!({"transactionId":5}))
                    .await
            })
        };

        let raw = rx.recv().await.unwrap();
        let (message_id, _, _) = parse_sent_call(&raw);
        sender.handle_error("ST-001", &message_id, "NotSupported", "nope");

        match request.await.unwrap() {
            Err(CommandError::CallError { code, .. }) => assert_eq!(code, "NotSupported"),
            other => panic!("expected CallError, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn unanswered_command_times_out() {
        let (sender, mut rx) = sender_with_station("ST-001");

        let outcome = sender
            .send_request("ST-001", "ChangeConfiguration", json!({"key":"a","value":"b"}))
            .await;
        assert!(matches!(outcome, Err(CommandError::Timeout)));
        assert_eq!(sender.pending_count(), 0);

        // The frame itself was transmitted.
        assert!(rx.recv().await.is_some());
    }

    #[tokio::test]
    async fn unmatched_response_is_ignored() {
        let (sender, _rx) = sender_with_station("ST-001");
        sender.handle_response("ST-001", "no-such-id", json!({}));
        assert_eq!(sender.pending_count(), 0);
    }

    #[tokio::test]
    async fn disconnect_drops_pending_requests() {
        let (sender, mut rx) = sender_with_station("ST-001");

        let request = {
            let sender = sender.clone();
            tokio::spawn(async move {
                sender
                    .send_request("ST-001", "TriggerMessage", json!({"requestedMessage":"Heartbeat"}))
                    .await
            })
        };
        let _ = rx.recv().await.unwrap();
        assert_eq!(sender.pending_count(), 1);

        sender.drop_pending_for("ST-001");
        assert_eq!(sender.pending_count(), 0);
        assert!(matches!(
            request.await.unwrap(),
            Err(CommandError::ResponseChannelClosed)
        ));
    }
}

//! Inbound OCPP 1.6 message handling
//!
//! One [`OcppHandler`] per station connection. Every well-formed Call gets
//! exactly one response frame: the action's CallResult on success, a
//! CallError on unknown actions or persistence failure. CallResult/CallError
//! frames from the station are routed to the command sender's pending table
//! and produce no reply.

pub mod handle_authorize;
pub mod handle_boot_notification;
pub mod handle_data_transfer;
pub mod handle_firmware_status_notification;
pub mod handle_heartbeat;
pub mod handle_meter_values;
pub mod handle_start_transaction;
pub mod handle_status_notification;
pub mod handle_stop_transaction;
pub mod handle_trigger_message;

use std::sync::Arc;

use chrono::{DateTime, SecondsFormat, Utc};
use serde_json::Value;
use tracing::{error, warn};

use crate::application::commands::SharedCommandSender;
use crate::application::sessions::SessionTracker;
use crate::application::station_state::StationDirectory;
use crate::support::OcppFrame;

pub struct OcppHandler {
    /// Identity from the connection URL; fixed for this handler's lifetime.
    station_id: String,
    stations: Arc<StationDirectory>,
    sessions: Arc<SessionTracker>,
    commands: SharedCommandSender,
    heartbeat_interval_secs: u32,
}

impl OcppHandler {
    pub fn new(
        station_id: impl Into<String>,
        stations: Arc<StationDirectory>,
        sessions: Arc<SessionTracker>,
        commands: SharedCommandSender,
        heartbeat_interval_secs: u32,
    ) -> Self {
        Self {
            station_id: station_id.into(),
            stations,
            sessions,
            commands,
            heartbeat_interval_secs,
        }
    }

    pub fn station_id(&self) -> &str {
        &self.station_id
    }

    /// Process one raw frame from the station's socket. Returns the text of
    /// the frame to write back, if any.
    pub async fn handle(&self, raw: &str) -> Option<String> {
        let frame = match OcppFrame::parse(raw) {
            Ok(frame) => frame,
            Err(e) => {
                warn!(station_id = self.station_id.as_str(), error = %e, "Discarding malformed frame");
                return None;
            }
        };

        match frame {
            OcppFrame::Call {
                message_id,
                action,
                payload,
            } => Some(self.handle_call(&message_id, &action, &payload).await),
            OcppFrame::CallResult { message_id, payload } => {
                self.commands
                    .handle_response(&self.station_id, &message_id, payload);
                None
            }
            OcppFrame::CallError {
                message_id,
                error_code,
                error_description,
                ..
            } => {
                self.commands.handle_error(
                    &self.station_id,
                    &message_id,
                    &error_code,
                    &error_description,
                );
                None
            }
        }
    }

    async fn handle_call(&self, message_id: &str, action: &str, payload: &Value) -> String {
        let outcome = match action {
            "BootNotification" => handle_boot_notification::handle(self, payload).await,
            "Heartbeat" => handle_heartbeat::handle(self, payload).await,
            "StatusNotification" => handle_status_notification::handle(self, payload).await,
            "Authorize" => handle_authorize::handle(self, payload).await,
            "StartTransaction" => handle_start_transaction::handle(self, payload).await,
            "StopTransaction" => handle_stop_transaction::handle(self, payload).await,
            "MeterValues" => handle_meter_values::handle(self, payload).await,
            "FirmwareStatusNotification" => {
                handle_firmware_status_notification::handle(self, payload).await
            }
            "DataTransfer" => handle_data_transfer::handle(self, payload).await,
            "TriggerMessage" => handle_trigger_message::handle(self, payload).await,
            _ => {
                return OcppFrame::error(
                    message_id,
                    "NotImplemented",
                    format!("'{}' not implemented", action),
                )
                .serialize();
            }
        };

        match outcome {
            Ok(response) => OcppFrame::result(message_id, response).serialize(),
            Err(e) => {
                error!(
                    station_id = self.station_id.as_str(),
                    action,
                    error = %e,
                    "Handler failed"
                );
                OcppFrame::error(message_id, "InternalError", "internal server error").serialize()
            }
        }
    }
}

fn iso_now() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true)
}

fn opt_str<'a>(payload: &'a Value, key: &str) -> Option<&'a str> {
    payload.get(key).and_then(Value::as_str)
}

/// Integers arrive as JSON numbers or, from sloppy firmware, numeric strings.
fn opt_i32(payload: &Value, key: &str) -> Option<i32> {
    match payload.get(key) {
        Some(Value::Number(n)) => n.as_i64().and_then(|v| i32::try_from(v).ok()),
        Some(Value::String(s)) => s.trim().parse().ok(),
        _ => None,
    }
}

fn value_as_f64(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn value_as_i32(value: &Value) -> Option<i32> {
    match value {
        Value::Number(n) => n.as_i64().and_then(|v| i32::try_from(v).ok()),
        // Registers sometimes come as "1234.0"
        Value::String(s) => s
            .trim()
            .parse::<i32>()
            .ok()
            .or_else(|| s.trim().parse::<f64>().ok().map(|f| f as i32)),
        _ => None,
    }
}

/// Device timestamps are advisory; anything unparseable falls back to now.
fn timestamp_or_now(payload: &Value, key: &str) -> DateTime<Utc> {
    opt_str(payload, key)
        .and_then(|s| DateTime::parse_from_rfc3339(s).ok())
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or_else(Utc::now)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::commands::CommandSender;
    use crate::infrastructure::memory::{InMemorySessionRepository, InMemoryStationRepository};
    use crate::interfaces::ws::ConnectionRegistry;
    use serde_json::json;

    struct Fixture {
        handler: OcppHandler,
        stations: Arc<StationDirectory>,
        sessions: Arc<SessionTracker>,
    }

    fn fixture(station_id: &str) -> Fixture {
        let stations = Arc::new(StationDirectory::new(Arc::new(
            InMemoryStationRepository::new(),
        )));
        let sessions = Arc::new(SessionTracker::new(Arc::new(
            InMemorySessionRepository::new(),
        )));
        let commands = CommandSender::shared(ConnectionRegistry::shared());
        let handler = OcppHandler::new(
            station_id,
            stations.clone(),
            sessions.clone(),
            commands,
            30,
        );
        Fixture {
            handler,
            stations,
            sessions,
        }
    }

    fn call(message_id: &str, action: &str, payload: Value) -> String {
        OcppFrame::Call {
            message_id: message_id.to_string(),
            action: action.to_string(),
            payload,
        }
        .serialize()
    }

    fn parse_result(raw: &str) -> (String, Value) {
        match OcppFrame::parse(raw).unwrap() {
            OcppFrame::CallResult { message_id, payload } => (message_id, payload),
            other => panic!("expected CallResult, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn malformed_frame_gets_no_reply() {
        let fx = fixture("ST-001");
        assert!(fx.handler.handle("not json at all").await.is_none());
        assert!(fx.handler.handle("{\"not\":\"an array\"}").await.is_none());
        assert!(fx.handler.handle("[2]").await.is_none());
    }

    #[tokio::test]
    async fn unknown_action_yields_not_implemented_with_same_id() {
        let fx = fixture("ST-001");
        let reply = fx
            .handler
            .handle(&call("m-77", "Reset", json!({})))
            .await
            .unwrap();
        match OcppFrame::parse(&reply).unwrap() {
            OcppFrame::CallError {
                message_id,
                error_code,
                ..
            } => {
                assert_eq!(message_id, "m-77");
                assert_eq!(error_code, "NotImplemented");
            }
            other => panic!("expected CallError, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn boot_notification_registers_station() {
        let fx = fixture("ST-001");
        let reply = fx
            .handler
            .handle(&call(
                "m-1",
                "BootNotification",
                json!({"chargePointVendor":"Acme","chargePointModel":"X1"}),
            ))
            .await
            .unwrap();

        let (message_id, payload) = parse_result(&reply);
        assert_eq!(message_id, "m-1");
        assert_eq!(payload["status"], "Accepted");
        assert_eq!(payload["interval"], 30);
        assert!(payload["currentTime"].is_string());

        let station = fx.stations.find_by_ocpp_id("ST-001").await.unwrap().unwrap();
        assert_eq!(station.model.as_deref(), Some("X1"));
        assert_eq!(station.charger_status.as_deref(), Some("Booted"));
    }

    #[tokio::test]
    async fn heartbeat_answers_even_for_unknown_station() {
        let fx = fixture("ST-001");
        let reply = fx
            .handler
            .handle(&call("m-2", "Heartbeat", json!({})))
            .await
            .unwrap();
        let (_, payload) = parse_result(&reply);
        assert!(payload["currentTime"].is_string());
        // Heartbeat alone never creates a station row.
        assert!(fx.stations.find_by_ocpp_id("ST-001").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn start_then_stop_records_three_and_a_half_kwh() {
        let fx = fixture("ST-001");
        fx.handler
            .handle(&call("m-1", "BootNotification", json!({"chargePointModel":"X1"})))
            .await
            .unwrap();

        let reply = fx
            .handler
            .handle(&call(
                "m-2",
                "StartTransaction",
                json!({"connectorId":1,"idTag":"TAG1","meterStart":1000}),
            ))
            .await
            .unwrap();
        let (_, payload) = parse_result(&reply);
        let tx_id = payload["transactionId"].as_i64().unwrap() as i32;
        assert!(tx_id > 1000);
        assert_eq!(payload["idTagInfo"]["status"], "Accepted");

        let reply = fx
            .handler
            .handle(&call(
                "m-3",
                "StopTransaction",
                json!({"transactionId":tx_id,"meterStop":4500}),
            ))
            .await
            .unwrap();
        let (_, payload) = parse_result(&reply);
        assert_eq!(payload["idTagInfo"]["status"], "Accepted");

        let station = fx.stations.find_by_ocpp_id("ST-001").await.unwrap().unwrap();
        let all = fx.sessions.find_open_for_station(station.id).await.unwrap();
        assert!(all.is_none());
    }

    #[tokio::test]
    async fn meter_values_update_station_and_running_session() {
        let fx = fixture("ST-001");
        fx.handler
            .handle(&call("m-1", "BootNotification", json!({})))
            .await
            .unwrap();
        fx.handler
            .handle(&call(
                "m-2",
                "StartTransaction",
                json!({"connectorId":1,"idTag":"TAG1","meterStart":1000}),
            ))
            .await
            .unwrap();

        let reply = fx
            .handler
            .handle(&call(
                "m-3",
                "MeterValues",
                json!({"connectorId":1,"meterValue":[{"timestamp":"2026-01-01T00:00:00Z","sampledValue":[
                    {"value":"2500","measurand":"Energy.Active.Import.Register"},
                    {"value":"7400.5","measurand":"Power.Active.Import"},
                    {"value":"32.1","measurand":"Current.Import"}
                ]}]}),
            ))
            .await
            .unwrap();
        let (message_id, payload) = parse_result(&reply);
        assert_eq!(message_id, "m-3");
        assert_eq!(payload, json!({}));

        let station = fx.stations.find_by_ocpp_id("ST-001").await.unwrap().unwrap();
        assert_eq!(station.line1_power_w, Some(7400.5));
        assert_eq!(station.line1_current_a, Some(32.1));

        let session = fx
            .sessions
            .find_open_for_station(station.id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(session.energy_kwh, Some("1.500".parse().unwrap()));
    }

    #[tokio::test]
    async fn meter_values_without_measurand_is_the_energy_register() {
        let fx = fixture("ST-001");
        fx.handler
            .handle(&call("m-1", "BootNotification", json!({})))
            .await
            .unwrap();
        fx.handler
            .handle(&call(
                "m-2",
                "StartTransaction",
                json!({"connectorId":1,"meterStart":0}),
            ))
            .await
            .unwrap();

        fx.handler
            .handle(&call(
                "m-3",
                "MeterValues",
                json!({"meterValue":[{"sampledValue":[{"value":"750"}]}]}),
            ))
            .await
            .unwrap();

        let station = fx.stations.find_by_ocpp_id("ST-001").await.unwrap().unwrap();
        let session = fx
            .sessions
            .find_open_for_station(station.id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(session.energy_kwh, Some("0.750".parse().unwrap()));
    }

    #[tokio::test]
    async fn status_notification_stores_reported_status() {
        let fx = fixture("ST-001");
        fx.handler
            .handle(&call("m-1", "BootNotification", json!({})))
            .await
            .unwrap();
        let reply = fx
            .handler
            .handle(&call(
                "m-2",
                "StatusNotification",
                json!({"connectorId":1,"errorCode":"NoError","status":"Charging"}),
            ))
            .await
            .unwrap();
        let (_, payload) = parse_result(&reply);
        assert_eq!(payload, json!({}));

        let station = fx.stations.find_by_ocpp_id("ST-001").await.unwrap().unwrap();
        assert_eq!(station.charger_status.as_deref(), Some("Charging"));
    }

    #[tokio::test]
    async fn authorize_accepts_any_tag() {
        let fx = fixture("ST-001");
        let reply = fx
            .handler
            .handle(&call("m-1", "Authorize", json!({"idTag":"ANY"})))
            .await
            .unwrap();
        let (_, payload) = parse_result(&reply);
        assert_eq!(payload["idTagInfo"]["status"], "Accepted");
    }

    #[tokio::test]
    async fn data_transfer_is_accepted() {
        let fx = fixture("ST-001");
        let reply = fx
            .handler
            .handle(&call(
                "m-1",
                "DataTransfer",
                json!({"vendorId":"acme","messageId":"ping"}),
            ))
            .await
            .unwrap();
        let (_, payload) = parse_result(&reply);
        assert_eq!(payload["status"], "Accepted");
    }

    #[tokio::test]
    async fn call_result_is_routed_to_pending_command() {
        let registry = ConnectionRegistry::shared();
        let (tx, mut rx) = tokio::sync::mpsc::unbounded_channel();
        registry.register("ST-001", tx);
        let commands = CommandSender::shared(registry);

        let stations = Arc::new(StationDirectory::new(Arc::new(
            InMemoryStationRepository::new(),
        )));
        let sessions = Arc::new(SessionTracker::new(Arc::new(
            InMemorySessionRepository::new(),
        )));
        let handler = OcppHandler::new("ST-001", stations, sessions, commands.clone(), 30);

        let request = {
            let commands = commands.clone();
            tokio::spawn(async move {
                commands
                    .send_request("ST-001", "TriggerMessage", json!({"requestedMessage":"Heartbeat"}))
                    .await
            })
        };

        let sent = rx.recv().await.unwrap();
        let message_id = match OcppFrame::parse(&sent).unwrap() {
            OcppFrame::Call { message_id, .. } => message_id,
            other => panic!("expected Call, got {:?}", other),
        };

        let reply_frame =
            OcppFrame::result(message_id, json!({"status":"Accepted"})).serialize();
        assert!(handler.handle(&reply_frame).await.is_none());

        let response = request.await.unwrap().unwrap();
        assert_eq!(response["status"], "Accepted");
    }

    #[test]
    fn lenient_number_parsing() {
        let payload = json!({"a": 5, "b": "6", "c": " 7 ", "d": "x", "e": 1.0});
        assert_eq!(opt_i32(&payload, "a"), Some(5));
        assert_eq!(opt_i32(&payload, "b"), Some(6));
        assert_eq!(opt_i32(&payload, "c"), Some(7));
        assert_eq!(opt_i32(&payload, "d"), None);
        assert_eq!(opt_i32(&payload, "missing"), None);
        assert_eq!(value_as_i32(&json!("1234.0")), Some(1234));
        assert_eq!(value_as_f64(&json!("7.5")), Some(7.5));
        assert_eq!(value_as_f64(&json!(7.5)), Some(7.5));
    }

    #[test]
    fn bad_timestamp_falls_back_to_now() {
        let before = Utc::now();
        let ts = timestamp_or_now(&json!({"timestamp":"not-a-date"}), "timestamp");
        assert!(ts >= before);

        let exact = timestamp_or_now(&json!({"timestamp":"2026-01-02T03:04:05Z"}), "timestamp");
        assert_eq!(exact.to_rfc3339_opts(SecondsFormat::Secs, true), "2026-01-02T03:04:05Z");
    }
}

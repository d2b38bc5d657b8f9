use serde_json::{json, Value};

use super::{send_logged, CommandError, CommandSender};

/// TriggerMessage.req — ask the station to send a specific message
/// (Heartbeat, BootNotification, StatusNotification, MeterValues, ...).
pub async fn trigger_message(
    sender: &CommandSender,
    station_id: &str,
    requested_message: &str,
) -> Result<Option<Value>, CommandError> {
    send_logged(
        sender,
        station_id,
        "TriggerMessage",
        json!({ "requestedMessage": requested_message }),
    )
    .await
}

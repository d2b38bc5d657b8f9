use serde_json::{json, Value};

use super::{send_logged, CommandError, CommandSender};

/// ChangeConfiguration.req — set one configuration key on the station.
///
/// Offline stations yield `Ok(None)`.
pub async fn change_configuration(
    sender: &CommandSender,
    station_id: &str,
    key: &str,
    value: &str,
) -> Result<Option<Value>, CommandError> {
    send_logged(
        sender,
        station_id,
        "ChangeConfiguration",
        json!({ "key": key, "value": value }),
    )
    .await
}

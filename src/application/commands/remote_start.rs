use serde_json::{json, Value};

use super::{send_logged, CommandError, CommandSender};

/// RemoteStartTransaction.req — the station answers Accepted/Rejected and,
/// when it accepts, follows up with its own StartTransaction Call.
pub async fn remote_start_transaction(
    sender: &CommandSender,
    station_id: &str,
    id_tag: &str,
    connector_id: Option<i32>,
) -> Result<Option<Value>, CommandError> {
    let mut payload = json!({ "idTag": id_tag });
    if let Some(connector_id) = connector_id {
        payload["connectorId"] = json!(connector_id);
    }
    send_logged(sender, station_id, "RemoteStartTransaction", payload).await
}

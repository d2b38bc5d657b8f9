use serde_json::{json, Value};

use super::{send_logged, CommandError, CommandSender};

/// RemoteStopTransaction.req — stop the running transaction by id. The
/// session itself is finalized later by the station's StopTransaction Call.
pub async fn remote_stop_transaction(
    sender: &CommandSender,
    station_id: &str,
    transaction_id: i32,
) -> Result<Option<Value>, CommandError> {
    send_logged(
        sender,
        station_id,
        "RemoteStopTransaction",
        json!({ "transactionId": transaction_id }),
    )
    .await
}

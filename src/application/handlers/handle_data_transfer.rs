use serde_json::{json, Value};
use tracing::info;

use super::{opt_str, OcppHandler};
use crate::domain::DomainResult;

/// DataTransfer.req — vendor blobs are accepted and logged, never
/// interpreted.
pub(super) async fn handle(ctx: &OcppHandler, payload: &Value) -> DomainResult<Value> {
    let vendor_id = opt_str(payload, "vendorId");
    let message_id = opt_str(payload, "messageId");
    info!(
        station_id = ctx.station_id.as_str(),
        vendor_id = ?vendor_id,
        message_id = ?message_id,
        "DataTransfer"
    );
    Ok(json!({ "status": "Accepted" }))
}

use serde_json::{json, Value};
use tracing::info;

use super::{opt_str, OcppHandler};
use crate::domain::DomainResult;

/// FirmwareStatusNotification.req — logged and acknowledged, nothing stored.
pub(super) async fn handle(ctx: &OcppHandler, payload: &Value) -> DomainResult<Value> {
    let status = opt_str(payload, "status").unwrap_or("Unknown");
    info!(
        station_id = ctx.station_id.as_str(),
        status, "FirmwareStatusNotification"
    );
    Ok(json!({}))
}

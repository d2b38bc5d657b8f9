use serde_json::{json, Value};
use tracing::info;

use super::{opt_str, OcppHandler};
use crate::domain::DomainResult;

/// TriggerMessage.req arriving as a Call from the station side. Unusual but
/// some firmware probes with it; we accept without triggering anything.
pub(super) async fn handle(ctx: &OcppHandler, payload: &Value) -> DomainResult<Value> {
    let requested = opt_str(payload, "requestedMessage");
    info!(
        station_id = ctx.station_id.as_str(),
        requested = ?requested,
        "TriggerMessage"
    );
    Ok(json!({ "status": "Accepted" }))
}

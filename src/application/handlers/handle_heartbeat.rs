use serde_json::{json, Value};
use tracing::debug;

use super::{iso_now, OcppHandler};
use crate::domain::DomainResult;

/// Heartbeat.req — refresh liveness for known stations, always answer with
/// the current server time.
pub(super) async fn handle(ctx: &OcppHandler, _payload: &Value) -> DomainResult<Value> {
    debug!(station_id = ctx.station_id.as_str(), "Heartbeat");
    ctx.stations.record_heartbeat(&ctx.station_id).await?;
    Ok(json!({ "currentTime": iso_now() }))
}

use serde_json::{json, Value};
use tracing::info;

use super::{opt_str, OcppHandler};
use crate::domain::DomainResult;

/// Authorize.req — every tag is accepted; access control lives outside the
/// protocol engine.
pub(super) async fn handle(ctx: &OcppHandler, payload: &Value) -> DomainResult<Value> {
    let id_tag = opt_str(payload, "idTag").unwrap_or_default();
    info!(station_id = ctx.station_id.as_str(), id_tag, "Authorize");
    Ok(json!({ "idTagInfo": { "status": "Accepted" } }))
}

use serde_json::{json, Value};
use tracing::info;

use super::{iso_now, opt_str, OcppHandler};
use crate::domain::DomainResult;

/// BootNotification.req — record the boot, answer Accepted with the
/// heartbeat interval the station should adopt.
pub(super) async fn handle(ctx: &OcppHandler, payload: &Value) -> DomainResult<Value> {
    let vendor = opt_str(payload, "chargePointVendor").unwrap_or("Unknown");
    let model = opt_str(payload, "chargePointModel").map(str::to_string);
    info!(
        station_id = ctx.station_id.as_str(),
        vendor,
        model = model.as_deref(),
        "BootNotification"
    );

    ctx.stations.record_boot(&ctx.station_id, model).await?;

    Ok(json!({
        "currentTime": iso_now(),
        "interval": ctx.heartbeat_interval_secs,
        "status": "Accepted"
    }))
}

use serde_json::{json, Value};
use tracing::info;

use super::{opt_i32, timestamp_or_now, OcppHandler};
use crate::domain::DomainResult;

/// StopTransaction.req — finalize the session and acknowledge.
///
/// The reply is Accepted even when no session matches; the charge point must
/// be able to close its side of a transaction we lost track of.
pub(super) async fn handle(ctx: &OcppHandler, payload: &Value) -> DomainResult<Value> {
    let transaction_id = opt_i32(payload, "transactionId");
    let meter_stop = opt_i32(payload, "meterStop");
    let end_time = timestamp_or_now(payload, "timestamp");

    info!(
        station_id = ctx.station_id.as_str(),
        transaction_id = ?transaction_id,
        meter_stop = ?meter_stop,
        "StopTransaction"
    );

    if let Some(station) = ctx.stations.find_by_ocpp_id(&ctx.station_id).await? {
        ctx.sessions
            .stop(station.id, transaction_id, end_time, meter_stop)
            .await?;
    }

    Ok(json!({ "idTagInfo": { "status": "Accepted" } }))
}

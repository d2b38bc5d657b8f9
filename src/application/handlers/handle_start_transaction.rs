use serde_json::{json, Value};
use tracing::{info, warn};

use super::{opt_i32, opt_str, timestamp_or_now, OcppHandler};
use crate::domain::DomainResult;

/// StartTransaction.req — allocate a transaction id, open a session row and
/// hand the id back to the station.
///
/// A station that starts a transaction before any BootNotification has no
/// persisted row yet; it still gets a valid transaction id, just no session.
pub(super) async fn handle(ctx: &OcppHandler, payload: &Value) -> DomainResult<Value> {
    let id_tag = opt_str(payload, "idTag").map(str::to_string);
    let connector_id = opt_i32(payload, "connectorId").unwrap_or(1);
    let meter_start = opt_i32(payload, "meterStart");
    let start_time = timestamp_or_now(payload, "timestamp");

    let transaction_id = match ctx.stations.find_by_ocpp_id(&ctx.station_id).await? {
        Some(station) => {
            let session = ctx
                .sessions
                .start(station.id, connector_id, id_tag, start_time, meter_start)
                .await?;
            session.transaction_id
        }
        None => {
            warn!(
                station_id = ctx.station_id.as_str(),
                "StartTransaction for unknown station, issuing id without a session"
            );
            ctx.sessions.next_transaction_id()
        }
    };

    info!(
        station_id = ctx.station_id.as_str(),
        transaction_id,
        connector_id,
        meter_start = ?meter_start,
        "StartTransaction"
    );

    Ok(json!({
        "transactionId": transaction_id,
        "idTagInfo": { "status": "Accepted" }
    }))
}

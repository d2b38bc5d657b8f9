use serde_json::{json, Value};
use tracing::{debug, info};

use super::{value_as_f64, value_as_i32, OcppHandler};
use crate::domain::DomainResult;

const MEASURAND_ENERGY_REGISTER: &str = "Energy.Active.Import.Register";
const MEASURAND_POWER: &str = "Power.Active.Import";
const MEASURAND_CURRENT: &str = "Current.Import";

/// The readings we extract from one MeterValues payload. Later samples in
/// the same payload win.
#[derive(Debug, Default, PartialEq)]
struct Readings {
    /// Cumulative energy register, Wh.
    meter_wh: Option<i32>,
    power_w: Option<f64>,
    current_a: Option<f64>,
}

/// A sampled value without a measurand is the energy register per the
/// OCPP 1.6 default.
fn extract_readings(payload: &Value) -> Readings {
    let mut readings = Readings::default();

    let Some(meter_values) = payload.get("meterValue").and_then(Value::as_array) else {
        return readings;
    };
    for entry in meter_values {
        let Some(samples) = entry.get("sampledValue").and_then(Value::as_array) else {
            continue;
        };
        for sample in samples {
            let measurand = sample.get("measurand").and_then(Value::as_str).unwrap_or("");
            let Some(value) = sample.get("value") else {
                continue;
            };
            match measurand {
                "" | MEASURAND_ENERGY_REGISTER => {
                    if let Some(wh) = value_as_i32(value) {
                        readings.meter_wh = Some(wh);
                    }
                }
                MEASURAND_POWER => {
                    if let Some(w) = value_as_f64(value) {
                        readings.power_w = Some(w);
                    }
                }
                MEASURAND_CURRENT => {
                    if let Some(a) = value_as_f64(value) {
                        readings.current_a = Some(a);
                    }
                }
                _ => {}
            }
        }
    }
    readings
}

/// MeterValues.req — update the station's live power/current and, when a
/// cumulative energy register is present, the open session's running energy.
/// The CallResult payload is an empty object.
pub(super) async fn handle(ctx: &OcppHandler, payload: &Value) -> DomainResult<Value> {
    debug!(station_id = ctx.station_id.as_str(), %payload, "MeterValues payload");

    let readings = extract_readings(payload);
    info!(
        station_id = ctx.station_id.as_str(),
        power_w = ?readings.power_w,
        current_a = ?readings.current_a,
        meter_wh = ?readings.meter_wh,
        "MeterValues"
    );

    let station = ctx
        .stations
        .record_meter_readings(&ctx.station_id, readings.power_w, readings.current_a)
        .await?;

    if let (Some(station), Some(meter_wh)) = (station, readings.meter_wh) {
        ctx.sessions
            .record_meter_register(station.id, meter_wh)
            .await?;
    }

    Ok(json!({}))
}

//! Charging session domain entity

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;

/// One charging transaction attempt, bounded by StartTransaction and
/// StopTransaction.
///
/// At most one session per station is open (`end_time == None`) at any time;
/// its `transaction_id` is unique while open. Billing fields are populated by
/// external collaborators, never computed here.
#[derive(Debug, Clone)]
pub struct Session {
    /// Persistence-owned id (0 until first saved).
    pub id: i32,
    /// Server-issued OCPP transaction id.
    pub transaction_id: i32,
    /// FK to the owning station's persistence id.
    pub station_id: i32,
    pub connector_id: i32,
    pub id_tag: Option<String>,

    pub start_time: DateTime<Utc>,
    pub end_time: Option<DateTime<Utc>>,
    /// Computed at stop, never negative.
    pub duration_sec: Option<i32>,
    pub last_update: Option<DateTime<Utc>>,

    /// Meter register at start, in Wh. May be absent until the first
    /// cumulative sample arrives.
    pub start_meter_wh: Option<i32>,
    pub stop_meter_wh: Option<i32>,
    /// Running (while open) or final energy, kWh rounded to 3 decimals.
    pub energy_kwh: Option<Decimal>,

    // Billing placeholders
    pub cost: Option<Decimal>,
    pub currency: Option<String>,
}

impl Session {
    pub fn new(
        station_id: i32,
        transaction_id: i32,
        connector_id: i32,
        id_tag: Option<String>,
        start_time: DateTime<Utc>,
        start_meter_wh: Option<i32>,
    ) -> Self {
        Self {
            id: 0,
            transaction_id,
            station_id,
            connector_id,
            id_tag,
            start_time,
            end_time: None,
            duration_sec: None,
            last_update: Some(Utc::now()),
            start_meter_wh,
            stop_meter_wh: None,
            energy_kwh: None,
            cost: None,
            currency: None,
        }
    }

    pub fn is_open(&self) -> bool {
        self.end_time.is_none()
    }

    /// kWh between two register readings: `max(0, stop - start) / 1000`,
    /// rounded to 3 decimals. Never negative.
    pub fn energy_between(start_wh: i32, stop_wh: i32) -> Decimal {
        let diff = (stop_wh - start_wh).max(0);
        let mut kwh = (Decimal::from(diff) / Decimal::from(1000)).round_dp(3);
        kwh.rescale(3);
        kwh
    }

    /// Apply a cumulative energy-register sample while the session is open.
    ///
    /// The first sample seeds `start_meter_wh` when StartTransaction did not
    /// carry one; afterwards the running energy is recomputed from the
    /// latest reading.
    pub fn apply_meter_register(&mut self, meter_wh: i32) {
        if self.start_meter_wh.is_none() {
            self.start_meter_wh = Some(meter_wh);
        }
        if let Some(start) = self.start_meter_wh {
            self.energy_kwh = Some(Self::energy_between(start, meter_wh));
        }
        self.last_update = Some(Utc::now());
    }

    /// Finalize the session: end time, stop meter, duration and energy.
    pub fn finalize(&mut self, end_time: DateTime<Utc>, stop_meter_wh: Option<i32>) {
        self.end_time = Some(end_time);
        self.stop_meter_wh = stop_meter_wh;
        self.last_update = Some(Utc::now());

        if let (Some(start), Some(stop)) = (self.start_meter_wh, self.stop_meter_wh) {
            self.energy_kwh = Some(Self::energy_between(start, stop));
        }

        let secs = (end_time - self.start_time).num_seconds().max(0);
        self.duration_sec = Some(secs as i32);
    }
}

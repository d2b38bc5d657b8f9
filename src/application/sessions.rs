//! Session/transaction manager
//!
//! Owns the process-wide transaction-id counter and the session lifecycle:
//! created on StartTransaction, updated from meter samples while open,
//! finalized on StopTransaction.

use std::sync::atomic::{AtomicI32, Ordering};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::{info, warn};

use crate::domain::{DomainResult, Session, SessionRepository};

/// Transaction ids start above this floor so they are visually distinct from
/// connector ids in device logs.
const TX_ID_FLOOR: i32 = 1000;

pub struct SessionTracker {
    sessions: Arc<dyn SessionRepository>,
    /// Monotonic across all stations; adequate for a single server instance.
    tx_counter: AtomicI32,
}

impl SessionTracker {
    pub fn new(sessions: Arc<dyn SessionRepository>) -> Self {
        Self {
            sessions,
            tx_counter: AtomicI32::new(TX_ID_FLOOR),
        }
    }

    /// Seed the counter from persisted history so a restart cannot reissue
    /// transaction ids still present in the database.
    pub async fn with_seeded_counter(
        sessions: Arc<dyn SessionRepository>,
    ) -> DomainResult<Self> {
        let max = sessions.max_transaction_id().await?.unwrap_or(TX_ID_FLOOR);
        let tracker = Self::new(sessions);
        tracker
            .tx_counter
            .store(max.max(TX_ID_FLOOR), Ordering::SeqCst);
        Ok(tracker)
    }

    /// Allocate the next process-wide unique transaction id.
    pub fn next_transaction_id(&self) -> i32 {
        self.tx_counter.fetch_add(1, Ordering::SeqCst) + 1
    }

    /// StartTransaction: create a new open session and return it.
    pub async fn start(
        &self,
        station_id: i32,
        connector_id: i32,
        id_tag: Option<String>,
        start_time: DateTime<Utc>,
        start_meter_wh: Option<i32>,
    ) -> DomainResult<Session> {
        let transaction_id = self.next_transaction_id();
        let session = Session::new(
            station_id,
            transaction_id,
            connector_id,
            id_tag,
            start_time,
            start_meter_wh,
        );
        let session = self.sessions.insert(session).await?;
        info!(
            station_id,
            transaction_id,
            connector_id,
            meter_start = ?start_meter_wh,
            "Charging session started"
        );
        Ok(session)
    }

    /// A cumulative energy-register sample arrived for the station. Updates
    /// the open session's running energy, seeding the start meter from the
    /// first sample when StartTransaction did not carry one.
    pub async fn record_meter_register(
        &self,
        station_id: i32,
        meter_wh: i32,
    ) -> DomainResult<Option<Session>> {
        let Some(mut session) = self.sessions.find_open_for_station(station_id).await? else {
            return Ok(None);
        };
        session.apply_meter_register(meter_wh);
        self.sessions.update(session.clone()).await?;
        Ok(Some(session))
    }

    /// StopTransaction: finalize the matching session. An exact
    /// transaction-id match is preferred; without one, the latest open
    /// session for the station is taken.
    pub async fn stop(
        &self,
        station_id: i32,
        transaction_id: Option<i32>,
        end_time: DateTime<Utc>,
        stop_meter_wh: Option<i32>,
    ) -> DomainResult<Option<Session>> {
        // Exact transaction-id match wins; a stale or missing id falls back
        // to the station's open session so the device can always close out.
        let mut found = match transaction_id {
            Some(tx_id) => self.sessions.find_by_transaction(station_id, tx_id).await?,
            None => None,
        };
        if found.is_none() {
            found = self.sessions.find_open_for_station(station_id).await?;
        }

        let Some(mut session) = found else {
            warn!(station_id, ?transaction_id, "StopTransaction without a matching session");
            return Ok(None);
        };

        session.finalize(end_time, stop_meter_wh);
        self.sessions.update(session.clone()).await?;
        info!(
            station_id,
            transaction_id = session.transaction_id,
            energy_kwh = ?session.energy_kwh,
            duration_sec = ?session.duration_sec,
            "Charging session finished"
        );
        Ok(Some(session))
    }

    pub async fn find_open_for_station(&self, station_id: i32) -> DomainResult<Option<Session>> {
        self.sessions.find_open_for_station(station_id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::memory::InMemorySessionRepository;

    fn tracker() -> SessionTracker {
        SessionTracker::new(Arc::new(InMemorySessionRepository::new()))
    }

    #[tokio::test]
    async fn transaction_ids_are_monotonic() {
        let t = tracker();
        let a = t.next_transaction_id();
        let b = t.next_transaction_id();
        assert!(a > TX_ID_FLOOR);
        assert_eq!(b, a + 1);
    }

    #[tokio::test]
    async fn concurrent_starts_get_distinct_ids() {
        let t = Arc::new(tracker());
        let mut tasks = Vec::new();
        for station in 0..16 {
            let t = t.clone();
            tasks.push(tokio::spawn(async move {
                t.start(station, 1, Some("TAG".into()), Utc::now(), Some(0))
                    .await
                    .unwrap()
                    .transaction_id
            }));
        }
        let mut ids = Vec::new();
        for task in tasks {
            ids.push(task.await.unwrap());
        }
        ids.sort_unstable();
        ids.dedup();
        assert_eq!(ids.len(), 16);
    }

    #[tokio::test]
    async fn start_then_stop_by_transaction_id() {
        let t = tracker();
        let ses = t
            .start(1, 1, Some("TAG1".into()), Utc::now(), Some(1000))
            .await
            .unwrap();

        let stopped = t
            .stop(1, Some(ses.transaction_id), Utc::now(), Some(4500))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(stopped.energy_kwh, Some("3.500".parse().unwrap()));
        assert!(!stopped.is_open());
        assert!(t.find_open_for_station(1).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn stop_without_transaction_id_takes_open_session() {
        let t = tracker();
        t.start(1, 1, None, Utc::now(), Some(100)).await.unwrap();
        let stopped = t.stop(1, None, Utc::now(), Some(600)).await.unwrap().unwrap();
        assert_eq!(stopped.energy_kwh, Some("0.500".parse().unwrap()));
    }

    #[tokio::test]
    async fn stop_with_stale_id_falls_back_to_open_session() {
        let t = tracker();
        let ses = t.start(1, 1, None, Utc::now(), Some(0)).await.unwrap();
        let stopped = t
            .stop(1, Some(ses.transaction_id + 500), Utc::now(), Some(250))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(stopped.transaction_id, ses.transaction_id);
        assert!(!stopped.is_open());
    }

    #[tokio::test]
    async fn stop_unknown_transaction_is_none() {
        let t = tracker();
        assert!(t.stop(1, Some(9999), Utc::now(), None).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn meter_register_updates_running_energy() {
        let t = tracker();
        t.start(1, 1, None, Utc::now(), Some(1000)).await.unwrap();

        let ses = t.record_meter_register(1, 2500).await.unwrap().unwrap();
        assert_eq!(ses.energy_kwh, Some("1.500".parse().unwrap()));
        assert!(ses.is_open());
    }

    #[tokio::test]
    async fn meter_register_without_open_session_is_none() {
        let t = tracker();
        assert!(t.record_meter_register(1, 2500).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn seeded_counter_continues_after_restart() {
        let repo = Arc::new(InMemorySessionRepository::new());
        let t = SessionTracker::new(repo.clone());
        let ses = t.start(1, 1, None, Utc::now(), None).await.unwrap();

        let restarted = SessionTracker::with_seeded_counter(repo).await.unwrap();
        assert!(restarted.next_transaction_id() > ses.transaction_id);
    }
}

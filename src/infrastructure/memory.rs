//! In-memory repository implementations
//!
//! Backing store for tests and for running the server without a database.
//! Same contracts as the SeaORM implementations, including id assignment.

use std::sync::atomic::{AtomicI32, Ordering};

use async_trait::async_trait;
use dashmap::DashMap;

use crate::domain::{
    DomainResult, Session, SessionRepository, Station, StationRepository,
};

pub struct InMemoryStationRepository {
    by_id: DashMap<i32, Station>,
    next_id: AtomicI32,
}

impl InMemoryStationRepository {
    pub fn new() -> Self {
        Self {
            by_id: DashMap::new(),
            next_id: AtomicI32::new(1),
        }
    }
}

impl Default for InMemoryStationRepository {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl StationRepository for InMemoryStationRepository {
    async fn find_by_ocpp_id(&self, ocpp_id: &str) -> DomainResult<Option<Station>> {
        Ok(self
            .by_id
            .iter()
            .find(|entry| entry.value().ocpp_id == ocpp_id)
            .map(|entry| entry.value().clone()))
    }

    async fn find_by_id(&self, id: i32) -> DomainResult<Option<Station>> {
        Ok(self.by_id.get(&id).map(|entry| entry.value().clone()))
    }

    async fn upsert(&self, mut station: Station) -> DomainResult<Station> {
        if station.id == 0 {
            // Reuse the row for an already-known ocpp id, insert otherwise.
            if let Some(existing) = self.find_by_ocpp_id(&station.ocpp_id).await? {
                station.id = existing.id;
            } else {
                station.id = self.next_id.fetch_add(1, Ordering::SeqCst);
            }
        }
        self.by_id.insert(station.id, station.clone());
        Ok(station)
    }

    async fn list(&self) -> DomainResult<Vec<Station>> {
        let mut all: Vec<Station> = self.by_id.iter().map(|e| e.value().clone()).collect();
        all.sort_by_key(|s| s.id);
        Ok(all)
    }
}

pub struct InMemorySessionRepository {
    by_id: DashMap<i32, Session>,
    next_id: AtomicI32,
}

impl InMemorySessionRepository {
    pub fn new() -> Self {
        Self {
            by_id: DashMap::new(),
            next_id: AtomicI32::new(1),
        }
    }
}

impl Default for InMemorySessionRepository {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SessionRepository for InMemorySessionRepository {
    async fn insert(&self, mut session: Session) -> DomainResult<Session> {
        session.id = self.next_id.fetch_add(1, Ordering::SeqCst);
        self.by_id.insert(session.id, session.clone());
        Ok(session)
    }

    async fn update(&self, session: Session) -> DomainResult<()> {
        self.by_id.insert(session.id, session);
        Ok(())
    }

    async fn find_open_for_station(&self, station_id: i32) -> DomainResult<Option<Session>> {
        let mut open: Vec<Session> = self
            .by_id
            .iter()
            .filter(|e| e.value().station_id == station_id && e.value().is_open())
            .map(|e| e.value().clone())
            .collect();
        open.sort_by_key(|s| s.start_time);
        Ok(open.pop())
    }

    async fn find_by_transaction(
        &self,
        station_id: i32,
        transaction_id: i32,
    ) -> DomainResult<Option<Session>> {
        Ok(self
            .by_id
            .iter()
            .filter(|e| {
                e.value().station_id == station_id && e.value().transaction_id == transaction_id
            })
            .map(|e| e.value().clone())
            .max_by_key(|s| s.id))
    }

    async fn list_for_station(&self, station_id: i32) -> DomainResult<Vec<Session>> {
        let mut all: Vec<Session> = self
            .by_id
            .iter()
            .filter(|e| e.value().station_id == station_id)
            .map(|e| e.value().clone())
            .collect();
        all.sort_by_key(|s| s.id);
        Ok(all)
    }

    async fn max_transaction_id(&self) -> DomainResult<Option<i32>> {
        Ok(self.by_id.iter().map(|e| e.value().transaction_id).max())
    }
}

//! Session persistence trait

use async_trait::async_trait;

use super::model::Session;
use crate::domain::DomainResult;

#[async_trait]
pub trait SessionRepository: Send + Sync {
    /// Insert a new session; returns it with its persistence id.
    async fn insert(&self, session: Session) -> DomainResult<Session>;
    async fn update(&self, session: Session) -> DomainResult<()>;
    /// The most recently started session for the station with no end time.
    async fn find_open_for_station(&self, station_id: i32) -> DomainResult<Option<Session>>;
    async fn find_by_transaction(
        &self,
        station_id: i32,
        transaction_id: i32,
    ) -> DomainResult<Option<Session>>;
    async fn list_for_station(&self, station_id: i32) -> DomainResult<Vec<Session>>;
    /// Highest transaction id ever issued, for seeding the allocator.
    async fn max_transaction_id(&self) -> DomainResult<Option<i32>>;
}

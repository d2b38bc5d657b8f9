//! Station persistence trait

use async_trait::async_trait;

use super::model::Station;
use crate::domain::DomainResult;

/// Read/write operations the protocol engine needs for stations.
///
/// Upserts are idempotent: saving the same state twice leaves the stored row
/// identical to saving it once. Concurrency control is the implementation's
/// concern (row-level, not distributed).
#[async_trait]
pub trait StationRepository: Send + Sync {
    async fn find_by_ocpp_id(&self, ocpp_id: &str) -> DomainResult<Option<Station>>;
    async fn find_by_id(&self, id: i32) -> DomainResult<Option<Station>>;
    /// Insert or update; returns the stored station with its persistence id.
    async fn upsert(&self, station: Station) -> DomainResult<Station>;
    async fn list(&self) -> DomainResult<Vec<Station>>;
}

//! SeaORM repository implementations

pub mod session_repository;
pub mod station_repository;

pub use session_repository::SeaOrmSessionRepository;
pub use station_repository::SeaOrmStationRepository;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Session, SessionRepository, Station, StationRepository};
    use crate::infrastructure::database::migrator::Migrator;
    use chrono::Utc;
    use sea_orm::{Database, DatabaseConnection};
    use sea_orm_migration::MigratorTrait;

    async fn test_db() -> DatabaseConnection {
        let db = Database::connect("sqlite::memory:").await.unwrap();
        Migrator::up(&db, None).await.unwrap();
        db
    }

    #[tokio::test]
    async fn station_upsert_inserts_then_updates_the_same_row() {
        let repo = SeaOrmStationRepository::new(test_db().await);

        let mut station = Station::new("ST-001");
        station.model = Some("X1".to_string());
        let saved = repo.upsert(station).await.unwrap();
        assert!(saved.id > 0);

        // A fresh value for the same ocpp id must hit the existing row.
        let mut again = Station::new("ST-001");
        again.charger_status = Some("Active".to_string());
        let updated = repo.upsert(again).await.unwrap();
        assert_eq!(updated.id, saved.id);

        let listed = repo.list().await.unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].charger_status.as_deref(), Some("Active"));

        assert!(repo.find_by_ocpp_id("ST-001").await.unwrap().is_some());
        assert!(repo.find_by_ocpp_id("nope").await.unwrap().is_none());
        assert!(repo.find_by_id(saved.id).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn session_lifecycle_round_trips_through_sqlite() {
        let db = test_db().await;
        let stations = SeaOrmStationRepository::new(db.clone());
        let sessions = SeaOrmSessionRepository::new(db);

        let station = stations.upsert(Station::new("ST-001")).await.unwrap();

        let ses = Session::new(station.id, 1001, 1, Some("TAG1".into()), Utc::now(), Some(1000));
        let mut ses = sessions.insert(ses).await.unwrap();
        assert!(ses.id > 0);

        let open = sessions
            .find_open_for_station(station.id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(open.transaction_id, 1001);

        ses.finalize(Utc::now(), Some(4500));
        sessions.update(ses.clone()).await.unwrap();

        assert!(sessions
            .find_open_for_station(station.id)
            .await
            .unwrap()
            .is_none());

        let stored = sessions
            .find_by_transaction(station.id, 1001)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(stored.energy_kwh, Some("3.500".parse().unwrap()));
        assert_eq!(stored.stop_meter_wh, Some(4500));

        assert_eq!(sessions.max_transaction_id().await.unwrap(), Some(1001));
        assert_eq!(sessions.list_for_station(station.id).await.unwrap().len(), 1);
    }
}

//! SeaORM implementation of SessionRepository

use async_trait::async_trait;
use sea_orm::{
    ActiveModelTrait, ActiveValue::NotSet, ColumnTrait, DatabaseConnection, EntityTrait,
    QueryFilter, QueryOrder, Set,
};

use crate::domain::{DomainError, DomainResult, Session, SessionRepository};
use crate::infrastructure::database::entities::session;

pub struct SeaOrmSessionRepository {
    db: DatabaseConnection,
}

impl SeaOrmSessionRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

fn db_err(e: sea_orm::DbErr) -> DomainError {
    DomainError::Storage(e.to_string())
}

fn session_from_model(model: session::Model) -> Session {
    Session {
        id: model.id,
        transaction_id: model.transaction_id,
        station_id: model.station_id,
        connector_id: model.connector_id,
        id_tag: model.id_tag,
        start_time: model.start_time,
        end_time: model.end_time,
        duration_sec: model.duration_sec,
        last_update: model.last_update,
        start_meter_wh: model.start_meter_wh,
        stop_meter_wh: model.stop_meter_wh,
        energy_kwh: model.energy_kwh,
        cost: model.cost,
        currency: model.currency,
    }
}

fn active_from_session(ses: &Session) -> session::ActiveModel {
    session::ActiveModel {
        id: NotSet,
        transaction_id: Set(ses.transaction_id),
        station_id: Set(ses.station_id),
        connector_id: Set(ses.connector_id),
        id_tag: Set(ses.id_tag.clone()),
        start_time: Set(ses.start_time),
        end_time: Set(ses.end_time),
        duration_sec: Set(ses.duration_sec),
        last_update: Set(ses.last_update),
        start_meter_wh: Set(ses.start_meter_wh),
        stop_meter_wh: Set(ses.stop_meter_wh),
        energy_kwh: Set(ses.energy_kwh),
        cost: Set(ses.cost),
        currency: Set(ses.currency.clone()),
    }
}

#[async_trait]
impl SessionRepository for SeaOrmSessionRepository {
    async fn insert(&self, ses: Session) -> DomainResult<Session> {
        let model = active_from_session(&ses)
            .insert(&self.db)
            .await
            .map_err(db_err)?;
        Ok(session_from_model(model))
    }

    async fn update(&self, ses: Session) -> DomainResult<()> {
        let mut active = active_from_session(&ses);
        active.id = Set(ses.id);
        active.update(&self.db).await.map_err(db_err)?;
        Ok(())
    }

    async fn find_open_for_station(&self, station_id: i32) -> DomainResult<Option<Session>> {
        let model = session::Entity::find()
            .filter(session::Column::StationId.eq(station_id))
            .filter(session::Column::EndTime.is_null())
            .order_by_desc(session::Column::StartTime)
            .one(&self.db)
            .await
            .map_err(db_err)?;
        Ok(model.map(session_from_model))
    }

    async fn find_by_transaction(
        &self,
        station_id: i32,
        transaction_id: i32,
    ) -> DomainResult<Option<Session>> {
        let model = session::Entity::find()
            .filter(session::Column::StationId.eq(station_id))
            .filter(session::Column::TransactionId.eq(transaction_id))
            .order_by_desc(session::Column::Id)
            .one(&self.db)
            .await
            .map_err(db_err)?;
        Ok(model.map(session_from_model))
    }

    async fn list_for_station(&self, station_id: i32) -> DomainResult<Vec<Session>> {
        let models = session::Entity::find()
            .filter(session::Column::StationId.eq(station_id))
            .order_by_asc(session::Column::Id)
            .all(&self.db)
            .await
            .map_err(db_err)?;
        Ok(models.into_iter().map(session_from_model).collect())
    }

    async fn max_transaction_id(&self) -> DomainResult<Option<i32>> {
        let model = session::Entity::find()
            .order_by_desc(session::Column::TransactionId)
            .one(&self.db)
            .await
            .map_err(db_err)?;
        Ok(model.map(|m| m.transaction_id))
    }
}

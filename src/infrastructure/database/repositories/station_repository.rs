//! SeaORM implementation of StationRepository

use async_trait::async_trait;
use sea_orm::{
    ActiveModelTrait, ActiveValue::NotSet, ColumnTrait, DatabaseConnection, EntityTrait,
    QueryFilter, QueryOrder, Set,
};
use tracing::debug;

use crate::domain::{ConnectionStatus, DomainError, DomainResult, Station, StationRepository};
use crate::infrastructure::database::entities::station;

pub struct SeaOrmStationRepository {
    db: DatabaseConnection,
}

impl SeaOrmStationRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

fn db_err(e: sea_orm::DbErr) -> DomainError {
    DomainError::Storage(e.to_string())
}

fn station_from_model(model: station::Model) -> Station {
    Station {
        id: model.id,
        ocpp_id: model.ocpp_id,
        name: model.name,
        model: model.model,
        serial_number: model.serial_number,
        puk: model.puk,
        power_kw: model.power_kw,
        vehicle: model.vehicle,
        access: model.access,
        self_consumption: model.self_consumption,
        internet: model.internet,
        scheduling: model.scheduling,
        meter_nominal_power: model.meter_nominal_power,
        network_id: model.network_id,
        boot_time: model.boot_time,
        last_heartbeat: model.last_heartbeat,
        charger_status: model.charger_status,
        connection_status: ConnectionStatus::from(model.connection_status.as_str()),
        line1_power_w: model.line1_power_w,
        line1_current_a: model.line1_current_a,
    }
}

/// Active model with every column set; the caller decides the id.
fn active_from_station(st: &Station) -> station::ActiveModel {
    station::ActiveModel {
        id: NotSet,
        ocpp_id: Set(st.ocpp_id.clone()),
        name: Set(st.name.clone()),
        model: Set(st.model.clone()),
        serial_number: Set(st.serial_number.clone()),
        puk: Set(st.puk.clone()),
        power_kw: Set(st.power_kw),
        vehicle: Set(st.vehicle.clone()),
        access: Set(st.access.clone()),
        self_consumption: Set(st.self_consumption.clone()),
        internet: Set(st.internet.clone()),
        scheduling: Set(st.scheduling.clone()),
        meter_nominal_power: Set(st.meter_nominal_power.clone()),
        network_id: Set(st.network_id),
        boot_time: Set(st.boot_time),
        last_heartbeat: Set(st.last_heartbeat),
        charger_status: Set(st.charger_status.clone()),
        connection_status: Set(st.connection_status.to_string()),
        line1_power_w: Set(st.line1_power_w),
        line1_current_a: Set(st.line1_current_a),
    }
}

#[async_trait]
impl StationRepository for SeaOrmStationRepository {
    async fn find_by_ocpp_id(&self, ocpp_id: &str) -> DomainResult<Option<Station>> {
        let model = station::Entity::find()
            .filter(station::Column::OcppId.eq(ocpp_id))
            .one(&self.db)
            .await
            .map_err(db_err)?;
        Ok(model.map(station_from_model))
    }

    async fn find_by_id(&self, id: i32) -> DomainResult<Option<Station>> {
        let model = station::Entity::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(db_err)?;
        Ok(model.map(station_from_model))
    }

    async fn upsert(&self, st: Station) -> DomainResult<Station> {
        debug!(ocpp_id = st.ocpp_id.as_str(), "Saving station");

        // An unsaved value may still collide with an existing row for the
        // same ocpp id; that row is reused.
        let existing_id = if st.id != 0 {
            Some(st.id)
        } else {
            station::Entity::find()
                .filter(station::Column::OcppId.eq(&st.ocpp_id))
                .one(&self.db)
                .await
                .map_err(db_err)?
                .map(|m| m.id)
        };

        let mut active = active_from_station(&st);
        let model = match existing_id {
            Some(id) => {
                active.id = Set(id);
                active.update(&self.db).await.map_err(db_err)?
            }
            None => active.insert(&self.db).await.map_err(db_err)?,
        };
        Ok(station_from_model(model))
    }

    async fn list(&self) -> DomainResult<Vec<Station>> {
        let models = station::Entity::find()
            .order_by_asc(station::Column::Id)
            .all(&self.db)
            .await
            .map_err(db_err)?;
        Ok(models.into_iter().map(station_from_model).collect())
    }
}

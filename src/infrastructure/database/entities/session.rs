//! Charging session entity

use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "charging_sessions")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    /// Server-issued OCPP transaction id.
    pub transaction_id: i32,
    pub station_id: i32,
    pub connector_id: i32,
    #[sea_orm(nullable)]
    pub id_tag: Option<String>,

    pub start_time: DateTimeUtc,
    /// Null while the session is open.
    #[sea_orm(nullable)]
    pub end_time: Option<DateTimeUtc>,
    #[sea_orm(nullable)]
    pub duration_sec: Option<i32>,
    #[sea_orm(nullable)]
    pub last_update: Option<DateTimeUtc>,

    #[sea_orm(nullable)]
    pub start_meter_wh: Option<i32>,
    #[sea_orm(nullable)]
    pub stop_meter_wh: Option<i32>,
    #[sea_orm(nullable)]
    pub energy_kwh: Option<Decimal>,

    #[sea_orm(nullable)]
    pub cost: Option<Decimal>,
    #[sea_orm(nullable)]
    pub currency: Option<String>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::station::Entity",
        from = "Column::StationId",
        to = "super::station::Column::Id"
    )]
    Station,
}

impl Related<super::station::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Station.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

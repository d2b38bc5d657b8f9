//! Charging station entity

use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "charging_stations")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    /// Protocol-level identifier from the connection URL.
    #[sea_orm(unique)]
    pub ocpp_id: String,

    #[sea_orm(nullable)]
    pub name: Option<String>,
    #[sea_orm(nullable)]
    pub model: Option<String>,
    #[sea_orm(nullable)]
    pub serial_number: Option<String>,
    #[sea_orm(nullable)]
    pub puk: Option<String>,
    #[sea_orm(nullable)]
    pub power_kw: Option<f64>,

    #[sea_orm(nullable)]
    pub vehicle: Option<String>,
    #[sea_orm(nullable)]
    pub access: Option<String>,
    #[sea_orm(nullable)]
    pub self_consumption: Option<String>,
    #[sea_orm(nullable)]
    pub internet: Option<String>,
    #[sea_orm(nullable)]
    pub scheduling: Option<String>,
    #[sea_orm(nullable)]
    pub meter_nominal_power: Option<String>,

    #[sea_orm(nullable)]
    pub network_id: Option<i32>,

    #[sea_orm(nullable)]
    pub boot_time: Option<DateTimeUtc>,
    #[sea_orm(nullable)]
    pub last_heartbeat: Option<DateTimeUtc>,
    #[sea_orm(nullable)]
    pub charger_status: Option<String>,
    /// Connected / Disconnected
    pub connection_status: String,
    #[sea_orm(nullable)]
    pub line1_power_w: Option<f64>,
    #[sea_orm(nullable)]
    pub line1_current_a: Option<f64>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::session::Entity")]
    Sessions,
}

impl Related<super::session::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Sessions.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

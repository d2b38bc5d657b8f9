//! Create charging_sessions table

use sea_orm_migration::prelude::*;

use super::m20250601_000001_create_charging_stations::ChargingStations;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(ChargingSessions::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(ChargingSessions::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(ChargingSessions::TransactionId)
                            .integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(ChargingSessions::StationId)
                            .integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(ChargingSessions::ConnectorId)
                            .integer()
                            .not_null(),
                    )
                    .col(ColumnDef::new(ChargingSessions::IdTag).string())
                    .col(
                        ColumnDef::new(ChargingSessions::StartTime)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(ColumnDef::new(ChargingSessions::EndTime).timestamp_with_time_zone())
                    .col(ColumnDef::new(ChargingSessions::DurationSec).integer())
                    .col(ColumnDef::new(ChargingSessions::LastUpdate).timestamp_with_time_zone())
                    .col(ColumnDef::new(ChargingSessions::StartMeterWh).integer())
                    .col(ColumnDef::new(ChargingSessions::StopMeterWh).integer())
                    .col(ColumnDef::new(ChargingSessions::EnergyKwh).decimal_len(12, 3))
                    .col(ColumnDef::new(ChargingSessions::Cost).decimal_len(12, 2))
                    .col(ColumnDef::new(ChargingSessions::Currency).string())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_charging_sessions_station")
                            .from(ChargingSessions::Table, ChargingSessions::StationId)
                            .to(ChargingStations::Table, ChargingStations::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_charging_sessions_station_tx")
                    .table(ChargingSessions::Table)
                    .col(ChargingSessions::StationId)
                    .col(ChargingSessions::TransactionId)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(ChargingSessions::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
pub enum ChargingSessions {
    Table,
    Id,
    TransactionId,
    StationId,
    ConnectorId,
    IdTag,
    StartTime,
    EndTime,
    DurationSec,
    LastUpdate,
    StartMeterWh,
    StopMeterWh,
    EnergyKwh,
    Cost,
    Currency,
}

//! Create charging_stations table

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(ChargingStations::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(ChargingStations::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(ChargingStations::OcppId)
                            .string()
                            .not_null()
                            .unique_key(),
                    )
                    .col(ColumnDef::new(ChargingStations::Name).string())
                    .col(ColumnDef::new(ChargingStations::Model).string())
                    .col(ColumnDef::new(ChargingStations::SerialNumber).string())
                    .col(ColumnDef::new(ChargingStations::Puk).string())
                    .col(ColumnDef::new(ChargingStations::PowerKw).double())
                    .col(ColumnDef::new(ChargingStations::Vehicle).string())
                    .col(ColumnDef::new(ChargingStations::Access).string())
                    .col(ColumnDef::new(ChargingStations::SelfConsumption).string())
                    .col(ColumnDef::new(ChargingStations::Internet).string())
                    .col(ColumnDef::new(ChargingStations::Scheduling).string())
                    .col(ColumnDef::new(ChargingStations::MeterNominalPower).string())
                    .col(ColumnDef::new(ChargingStations::NetworkId).integer())
                    .col(ColumnDef::new(ChargingStations::BootTime).timestamp_with_time_zone())
                    .col(ColumnDef::new(ChargingStations::LastHeartbeat).timestamp_with_time_zone())
                    .col(ColumnDef::new(ChargingStations::ChargerStatus).string())
                    .col(
                        ColumnDef::new(ChargingStations::ConnectionStatus)
                            .string()
                            .not_null()
                            .default("Disconnected"),
                    )
                    .col(ColumnDef::new(ChargingStations::Line1PowerW).double())
                    .col(ColumnDef::new(ChargingStations::Line1CurrentA).double())
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(ChargingStations::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
pub enum ChargingStations {
    Table,
    Id,
    OcppId,
    Name,
    Model,
    SerialNumber,
    Puk,
    PowerKw,
    Vehicle,
    Access,
    SelfConsumption,
    Internet,
    Scheduling,
    MeterNominalPower,
    NetworkId,
    BootTime,
    LastHeartbeat,
    ChargerStatus,
    ConnectionStatus,
    Line1PowerW,
    Line1CurrentA,
}

use sea_orm_migration::{prelude::*, schema::*};

use super::m20260815_000003_create_buses::Bus;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Trip::Table)
                    .if_not_exists()
                    .col(uuid(Trip::Id).primary_key())
                    .col(string(Trip::Source).not_null())
                    .col(string(Trip::Destination).not_null())
                    .col(timestamp_with_time_zone(Trip::Departure).not_null())
                    .col(integer(Trip::BusId).not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_trip_bus")
                            .from(Trip::Table, Trip::BusId)
                            .to(Bus::Table, Bus::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // Route and departure lookups back the trip listing filters.
        manager
            .create_index(
                Index::create()
                    .name("idx_trip_source_destination")
                    .table(Trip::Table)
                    .col(Trip::Source)
                    .col(Trip::Destination)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_trip_departure")
                    .table(Trip::Table)
                    .col(Trip::Departure)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Trip::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
pub enum Trip {
    Table,
    Id,
    Source,
    Destination,
    Departure,
    BusId,
}

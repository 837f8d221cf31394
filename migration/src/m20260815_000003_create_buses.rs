use sea_orm_migration::{prelude::*, schema::*};

use super::m20260815_000002_create_facilities::Facility;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Bus::Table)
                    .if_not_exists()
                    .col(pk_auto(Bus::Id))
                    .col(string_null(Bus::Info))
                    .col(integer(Bus::NumSeats).not_null())
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(BusFacility::Table)
                    .if_not_exists()
                    .col(integer(BusFacility::BusId).not_null())
                    .col(integer(BusFacility::FacilityId).not_null())
                    .primary_key(
                        Index::create()
                            .col(BusFacility::BusId)
                            .col(BusFacility::FacilityId),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_bus_facility_bus")
                            .from(BusFacility::Table, BusFacility::BusId)
                            .to(Bus::Table, Bus::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_bus_facility_facility")
                            .from(BusFacility::Table, BusFacility::FacilityId)
                            .to(Facility::Table, Facility::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(BusFacility::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Bus::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
pub enum Bus {
    Table,
    Id,
    Info,
    NumSeats,
}

#[derive(DeriveIden)]
pub enum BusFacility {
    Table,
    BusId,
    FacilityId,
}

use sea_orm_migration::{prelude::*, schema::*};

use super::m20260815_000004_create_trips::Trip;
use super::m20260815_000005_create_orders::Order;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Ticket::Table)
                    .if_not_exists()
                    .col(uuid(Ticket::Id).primary_key())
                    .col(integer(Ticket::Seat).not_null())
                    .col(uuid(Ticket::TripId).not_null())
                    .col(uuid(Ticket::OrderId).not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_ticket_trip")
                            .from(Ticket::Table, Ticket::TripId)
                            .to(Trip::Table, Trip::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_ticket_order")
                            .from(Ticket::Table, Ticket::OrderId)
                            .to(Order::Table, Order::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // The database, not the application, arbitrates concurrent claims for
        // the same seat: the second writer gets a unique violation even when
        // both started before either committed.
        manager
            .create_index(
                Index::create()
                    .name("ux_ticket_trip_seat")
                    .table(Ticket::Table)
                    .col(Ticket::TripId)
                    .col(Ticket::Seat)
                    .unique()
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Ticket::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
pub enum Ticket {
    Table,
    Id,
    Seat,
    TripId,
    OrderId,
}

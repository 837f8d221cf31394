use sea_orm::{
    ActiveModelTrait, DatabaseConnection, DatabaseTransaction, DbErr, EntityTrait, Set,
    TransactionTrait,
};
use serde::Deserialize;
use thiserror::Error;
use uuid::Uuid;

use crate::booking::seats::{self, SeatClaimError, SeatRangeError};
use crate::entities::{bus, order, ticket, trip};

/// One requested seat within an order.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct SeatRequest {
    pub trip_id: Uuid,
    pub seat: i32,
}

#[derive(Debug, Error)]
pub enum OrderError {
    #[error("order must contain at least one ticket")]
    Empty,
    #[error("trip {0} not found")]
    TripNotFound(Uuid),
    #[error("trip {trip_id}: {source}")]
    InvalidSeat {
        trip_id: Uuid,
        seat: i32,
        source: SeatRangeError,
    },
    #[error("seat {seat} on trip {trip_id} is already taken")]
    SeatTaken { trip_id: Uuid, seat: i32 },
    #[error(transparent)]
    Db(#[from] DbErr),
}

/// Create an order and claim every requested seat, all inside one
/// transaction. The first request that fails a range check, names a missing
/// trip, or loses the seat to another order aborts the whole attempt; nothing
/// from a failed attempt is ever visible outside the transaction.
pub async fn create_order(
    db: &DatabaseConnection,
    user_id: Uuid,
    requests: &[SeatRequest],
) -> Result<(order::Model, Vec<ticket::Model>), OrderError> {
    if requests.is_empty() {
        return Err(OrderError::Empty);
    }

    let txn = db.begin().await?;

    match place_order(&txn, user_id, requests).await {
        Ok(placed) => {
            txn.commit().await?;
            Ok(placed)
        }
        Err(err) => {
            txn.rollback().await?;
            Err(err)
        }
    }
}

async fn place_order(
    txn: &DatabaseTransaction,
    user_id: Uuid,
    requests: &[SeatRequest],
) -> Result<(order::Model, Vec<ticket::Model>), OrderError> {
    let placed_order = order::ActiveModel {
        id: Set(Uuid::new_v4()),
        user_id: Set(user_id),
        created_at: Set(chrono::Utc::now().into()),
    }
    .insert(txn)
    .await?;

    // An order may hold several seats on the same trip; resolve each trip's
    // capacity once.
    let mut capacities: std::collections::HashMap<Uuid, i32> = std::collections::HashMap::new();

    let mut tickets = Vec::with_capacity(requests.len());
    for request in requests {
        let capacity = match capacities.get(&request.trip_id) {
            Some(c) => *c,
            None => {
                let c = trip_capacity(txn, request.trip_id).await?;
                capacities.insert(request.trip_id, c);
                c
            }
        };

        seats::validate_seat_range(request.seat, capacity).map_err(|source| {
            OrderError::InvalidSeat {
                trip_id: request.trip_id,
                seat: request.seat,
                source,
            }
        })?;

        let ticket = seats::claim_seat(txn, placed_order.id, request.trip_id, request.seat)
            .await
            .map_err(|e| match e {
                SeatClaimError::Taken { seat } => OrderError::SeatTaken {
                    trip_id: request.trip_id,
                    seat,
                },
                SeatClaimError::Db(e) => OrderError::Db(e),
            })?;

        tickets.push(ticket);
    }

    Ok((placed_order, tickets))
}

async fn trip_capacity(txn: &DatabaseTransaction, trip_id: Uuid) -> Result<i32, OrderError> {
    let (_, bus) = trip::Entity::find_by_id(trip_id)
        .find_also_related(bus::Entity)
        .one(txn)
        .await?
        .ok_or(OrderError::TripNotFound(trip_id))?;

    let bus = bus.ok_or_else(|| {
        OrderError::Db(DbErr::RecordNotFound(format!(
            "bus for trip {} not found",
            trip_id
        )))
    })?;

    Ok(bus.num_seats)
}

use std::collections::HashMap;

use sea_orm::{
    ColumnTrait, ConnectionTrait, DbErr, EntityTrait, FromQueryResult, PaginatorTrait,
    QueryFilter, QuerySelect, Set, SqlErr,
};
use thiserror::Error;
use uuid::Uuid;

use crate::entities::ticket;

#[derive(Debug, Error, PartialEq, Eq)]
#[error("seat must be in range [1, {capacity}], not {seat}")]
pub struct SeatRangeError {
    pub seat: i32,
    pub capacity: i32,
}

#[derive(Debug, Error)]
pub enum SeatClaimError {
    #[error("seat {seat} is already taken")]
    Taken { seat: i32 },
    #[error(transparent)]
    Db(#[from] DbErr),
}

/// Seats are numbered 1 through the bus capacity, inclusive.
pub fn validate_seat_range(seat: i32, capacity: i32) -> Result<(), SeatRangeError> {
    if seat < 1 || seat > capacity {
        return Err(SeatRangeError { seat, capacity });
    }
    Ok(())
}

/// Record that `seat` on `trip_id` belongs to `order_id`.
///
/// Claiming is a single insert against the unique (trip_id, seat) index, so
/// when two writers race for the same seat the store commits exactly one of
/// them; the loser surfaces here as `Taken`. No seat state is cached between
/// calls.
pub async fn claim_seat<C: ConnectionTrait>(
    conn: &C,
    order_id: Uuid,
    trip_id: Uuid,
    seat: i32,
) -> Result<ticket::Model, SeatClaimError> {
    let claim = ticket::ActiveModel {
        id: Set(Uuid::new_v4()),
        seat: Set(seat),
        trip_id: Set(trip_id),
        order_id: Set(order_id),
    };

    match ticket::Entity::insert(claim)
        .exec_with_returning(conn)
        .await
    {
        Ok(model) => Ok(model),
        Err(e) => match e.sql_err() {
            Some(SqlErr::UniqueConstraintViolation(_)) => Err(SeatClaimError::Taken { seat }),
            _ => Err(SeatClaimError::Db(e)),
        },
    }
}

/// Seats still free on a trip: bus capacity minus one aggregate ticket count.
pub async fn tickets_available<C: ConnectionTrait>(
    conn: &C,
    trip_id: Uuid,
    num_seats: i32,
) -> Result<i64, DbErr> {
    let taken = ticket::Entity::find()
        .filter(ticket::Column::TripId.eq(trip_id))
        .count(conn)
        .await?;

    Ok(num_seats as i64 - taken as i64)
}

#[derive(FromQueryResult)]
struct TripTicketCount {
    trip_id: Uuid,
    taken: i64,
}

/// Ticket counts for every trip in one grouped query, for annotating trip
/// listings without a count query per trip.
pub async fn ticket_counts<C: ConnectionTrait>(conn: &C) -> Result<HashMap<Uuid, i64>, DbErr> {
    let rows = ticket::Entity::find()
        .select_only()
        .column(ticket::Column::TripId)
        .column_as(ticket::Column::Id.count(), "taken")
        .group_by(ticket::Column::TripId)
        .into_model::<TripTicketCount>()
        .all(conn)
        .await?;

    Ok(rows.into_iter().map(|r| (r.trip_id, r.taken)).collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_seats_within_capacity() {
        for seat in 1..=20 {
            assert!(validate_seat_range(seat, 20).is_ok());
        }
    }

    #[test]
    fn rejects_seat_zero_and_below() {
        assert!(validate_seat_range(0, 20).is_err());
        assert!(validate_seat_range(-3, 20).is_err());
    }

    #[test]
    fn rejects_seat_above_capacity() {
        let err = validate_seat_range(21, 20).unwrap_err();
        assert_eq!(err, SeatRangeError { seat: 21, capacity: 20 });
    }

    #[test]
    fn range_error_names_capacity_and_seat() {
        let err = validate_seat_range(21, 20).unwrap_err();
        assert_eq!(err.to_string(), "seat must be in range [1, 20], not 21");
    }
}

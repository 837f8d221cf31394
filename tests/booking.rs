//! End-to-end checks of the seat-reservation core against a real store: the
//! migrations run on an in-memory SQLite database, so the (trip_id, seat)
//! unique index and transactional rollback are exercised for real.

use chrono::{Duration, Utc};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Database, DatabaseConnection, EntityTrait, PaginatorTrait,
    QueryFilter, Set,
};
use sea_orm_migration::MigratorTrait;
use uuid::Uuid;

use bus_station_backend::booking::orders::{create_order, OrderError, SeatRequest};
use bus_station_backend::booking::seats::{ticket_counts, tickets_available};
use bus_station_backend::entities::{bus, order, ticket, trip, user};

async fn setup() -> DatabaseConnection {
    let db = Database::connect("sqlite::memory:")
        .await
        .expect("connect to in-memory sqlite");

    migration::Migrator::up(&db, None)
        .await
        .expect("run migrations");

    db
}

async fn seed_user(db: &DatabaseConnection, email: &str) -> Uuid {
    let id = Uuid::new_v4();
    user::ActiveModel {
        id: Set(id),
        email: Set(email.to_string()),
        name: Set("Test User".to_string()),
        created_at: Set(Utc::now().into()),
    }
    .insert(db)
    .await
    .expect("insert user");
    id
}

async fn seed_trip(db: &DatabaseConnection, num_seats: i32) -> Uuid {
    let bus = bus::ActiveModel {
        info: Set(Some("Test Coach".to_string())),
        num_seats: Set(num_seats),
        ..Default::default()
    }
    .insert(db)
    .await
    .expect("insert bus");

    let trip_id = Uuid::new_v4();
    trip::ActiveModel {
        id: Set(trip_id),
        source: Set("Springfield".to_string()),
        destination: Set("Shelbyville".to_string()),
        departure: Set((Utc::now() + Duration::days(1)).into()),
        bus_id: Set(bus.id),
    }
    .insert(db)
    .await
    .expect("insert trip");

    trip_id
}

async fn count_tickets(db: &DatabaseConnection, trip_id: Uuid) -> u64 {
    ticket::Entity::find()
        .filter(ticket::Column::TripId.eq(trip_id))
        .count(db)
        .await
        .expect("count tickets")
}

async fn count_orders(db: &DatabaseConnection) -> u64 {
    order::Entity::find().count(db).await.expect("count orders")
}

#[tokio::test]
async fn order_with_two_seats_commits_and_reduces_availability() {
    let db = setup().await;
    let user_id = seed_user(&db, "rider@example.com").await;
    let trip_id = seed_trip(&db, 20).await;

    assert_eq!(tickets_available(&db, trip_id, 20).await.unwrap(), 20);

    let requests = [
        SeatRequest { trip_id, seat: 3 },
        SeatRequest { trip_id, seat: 4 },
    ];
    let (placed, tickets) = create_order(&db, user_id, &requests).await.expect("order");

    assert_eq!(placed.user_id, user_id);
    assert_eq!(tickets.len(), 2);
    assert!(tickets.iter().all(|t| t.order_id == placed.id));

    assert_eq!(tickets_available(&db, trip_id, 20).await.unwrap(), 18);
    assert_eq!(count_tickets(&db, trip_id).await, 2);
}

#[tokio::test]
async fn out_of_range_seat_rejects_order_with_exact_message() {
    let db = setup().await;
    let user_id = seed_user(&db, "rider@example.com").await;
    let trip_id = seed_trip(&db, 20).await;

    let err = create_order(&db, user_id, &[SeatRequest { trip_id, seat: 21 }])
        .await
        .unwrap_err();

    match &err {
        OrderError::InvalidSeat { seat, source, .. } => {
            assert_eq!(*seat, 21);
            assert_eq!(
                source.to_string(),
                "seat must be in range [1, 20], not 21"
            );
        }
        other => panic!("expected InvalidSeat, got {other:?}"),
    }

    // Nothing from the failed attempt is persisted.
    assert_eq!(count_orders(&db).await, 0);
    assert_eq!(count_tickets(&db, trip_id).await, 0);
}

#[tokio::test]
async fn seat_zero_is_out_of_range() {
    let db = setup().await;
    let user_id = seed_user(&db, "rider@example.com").await;
    let trip_id = seed_trip(&db, 20).await;

    let err = create_order(&db, user_id, &[SeatRequest { trip_id, seat: 0 }])
        .await
        .unwrap_err();

    assert!(matches!(err, OrderError::InvalidSeat { seat: 0, .. }));
    assert_eq!(count_orders(&db).await, 0);
}

#[tokio::test]
async fn second_order_for_same_seat_conflicts() {
    let db = setup().await;
    let alice = seed_user(&db, "alice@example.com").await;
    let bob = seed_user(&db, "bob@example.com").await;
    let trip_id = seed_trip(&db, 40).await;

    create_order(&db, alice, &[SeatRequest { trip_id, seat: 12 }])
        .await
        .expect("first claim wins");

    let err = create_order(&db, bob, &[SeatRequest { trip_id, seat: 12 }])
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        OrderError::SeatTaken { seat: 12, trip_id: t } if t == trip_id
    ));

    // Exactly one ticket for the contested seat, owned by the winner.
    let winners = ticket::Entity::find()
        .filter(ticket::Column::TripId.eq(trip_id))
        .filter(ticket::Column::Seat.eq(12))
        .all(&db)
        .await
        .unwrap();
    assert_eq!(winners.len(), 1);
    assert_eq!(count_orders(&db).await, 1);
}

#[tokio::test]
async fn duplicate_seat_within_one_order_is_rejected() {
    let db = setup().await;
    let user_id = seed_user(&db, "rider@example.com").await;
    let trip_id = seed_trip(&db, 20).await;

    let requests = [
        SeatRequest { trip_id, seat: 5 },
        SeatRequest { trip_id, seat: 5 },
    ];
    let err = create_order(&db, user_id, &requests).await.unwrap_err();

    assert!(matches!(err, OrderError::SeatTaken { seat: 5, .. }));

    // The whole order rolls back, including the first (valid) claim.
    assert_eq!(count_tickets(&db, trip_id).await, 0);
    assert_eq!(count_orders(&db).await, 0);
}

#[tokio::test]
async fn failure_midway_rolls_back_earlier_claims() {
    let db = setup().await;
    let user_id = seed_user(&db, "rider@example.com").await;
    let trip_id = seed_trip(&db, 20).await;

    let requests = [
        SeatRequest { trip_id, seat: 1 },
        SeatRequest { trip_id, seat: 2 },
        SeatRequest { trip_id, seat: 99 },
    ];
    let err = create_order(&db, user_id, &requests).await.unwrap_err();

    assert!(matches!(err, OrderError::InvalidSeat { seat: 99, .. }));
    assert_eq!(count_tickets(&db, trip_id).await, 0);
    assert_eq!(count_orders(&db).await, 0);
    assert_eq!(tickets_available(&db, trip_id, 20).await.unwrap(), 20);
}

#[tokio::test]
async fn unknown_trip_is_reported_not_found() {
    let db = setup().await;
    let user_id = seed_user(&db, "rider@example.com").await;
    seed_trip(&db, 20).await;

    let ghost = Uuid::new_v4();
    let err = create_order(&db, user_id, &[SeatRequest { trip_id: ghost, seat: 1 }])
        .await
        .unwrap_err();

    assert!(matches!(err, OrderError::TripNotFound(t) if t == ghost));
    assert_eq!(count_orders(&db).await, 0);
}

#[tokio::test]
async fn empty_order_is_rejected_up_front() {
    let db = setup().await;
    let user_id = seed_user(&db, "rider@example.com").await;

    let err = create_order(&db, user_id, &[]).await.unwrap_err();
    assert!(matches!(err, OrderError::Empty));
    assert_eq!(count_orders(&db).await, 0);
}

#[tokio::test]
async fn order_can_span_multiple_trips() {
    let db = setup().await;
    let user_id = seed_user(&db, "rider@example.com").await;
    let first = seed_trip(&db, 20).await;
    let second = seed_trip(&db, 30).await;

    let requests = [
        SeatRequest { trip_id: first, seat: 7 },
        SeatRequest { trip_id: second, seat: 7 },
    ];
    let (_, tickets) = create_order(&db, user_id, &requests).await.expect("order");

    assert_eq!(tickets.len(), 2);
    assert_eq!(count_tickets(&db, first).await, 1);
    assert_eq!(count_tickets(&db, second).await, 1);
}

#[tokio::test]
async fn same_seat_on_different_trips_does_not_conflict() {
    let db = setup().await;
    let alice = seed_user(&db, "alice@example.com").await;
    let bob = seed_user(&db, "bob@example.com").await;
    let first = seed_trip(&db, 20).await;
    let second = seed_trip(&db, 20).await;

    create_order(&db, alice, &[SeatRequest { trip_id: first, seat: 9 }])
        .await
        .expect("first trip");
    create_order(&db, bob, &[SeatRequest { trip_id: second, seat: 9 }])
        .await
        .expect("same seat, different trip");

    assert_eq!(count_tickets(&db, first).await, 1);
    assert_eq!(count_tickets(&db, second).await, 1);
}

#[tokio::test]
async fn grouped_ticket_counts_match_per_trip_counts() {
    let db = setup().await;
    let user_id = seed_user(&db, "rider@example.com").await;
    let busy = seed_trip(&db, 20).await;
    let quiet = seed_trip(&db, 20).await;
    let empty = seed_trip(&db, 20).await;

    let requests = [
        SeatRequest { trip_id: busy, seat: 1 },
        SeatRequest { trip_id: busy, seat: 2 },
        SeatRequest { trip_id: busy, seat: 3 },
        SeatRequest { trip_id: quiet, seat: 1 },
    ];
    create_order(&db, user_id, &requests).await.expect("order");

    let counts = ticket_counts(&db).await.unwrap();
    assert_eq!(counts.get(&busy).copied(), Some(3));
    assert_eq!(counts.get(&quiet).copied(), Some(1));
    assert_eq!(counts.get(&empty), None);

    assert_eq!(tickets_available(&db, busy, 20).await.unwrap(), 17);
    assert_eq!(tickets_available(&db, empty, 20).await.unwrap(), 20);
}

#[tokio::test]
async fn cancelling_an_order_releases_its_seats() {
    let db = setup().await;
    let user_id = seed_user(&db, "rider@example.com").await;
    let trip_id = seed_trip(&db, 20).await;

    let (placed, _) = create_order(&db, user_id, &[SeatRequest { trip_id, seat: 6 }])
        .await
        .expect("order");

    order::Entity::delete_by_id(placed.id)
        .exec(&db)
        .await
        .expect("delete order");

    // Tickets cascade with their order, so the seat opens up again.
    assert_eq!(count_tickets(&db, trip_id).await, 0);
    create_order(&db, user_id, &[SeatRequest { trip_id, seat: 6 }])
        .await
        .expect("seat reclaimable after cancellation");
}

use axum::{
    extract::{Path, Query, State},
    Json,
};
use chrono::{DateTime, Utc};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, QueryOrder, Set,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::booking::seats;
use crate::entities::{bus, ticket, trip};
use crate::error::{AppError, AppResult};
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct CreateTripRequest {
    pub source: String,
    pub destination: String,
    pub departure: DateTime<Utc>,
    pub bus_id: i32,
}

#[derive(Debug, Deserialize)]
pub struct UpdateTripRequest {
    pub source: Option<String>,
    pub destination: Option<String>,
    pub departure: Option<DateTime<Utc>>,
    pub bus_id: Option<i32>,
}

#[derive(Debug, Serialize)]
pub struct BusInfo {
    pub id: i32,
    pub info: Option<String>,
    pub num_seats: i32,
    pub is_mini: bool,
}

impl From<bus::Model> for BusInfo {
    fn from(bus: bus::Model) -> Self {
        Self {
            id: bus.id,
            info: bus.info.clone(),
            num_seats: bus.num_seats,
            is_mini: bus.is_mini(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct TripListResponse {
    pub id: Uuid,
    pub source: String,
    pub destination: String,
    pub departure: DateTime<Utc>,
    pub bus: BusInfo,
    pub tickets_available: i64,
}

#[derive(Debug, Serialize)]
pub struct TripDetailResponse {
    pub id: Uuid,
    pub source: String,
    pub destination: String,
    pub departure: DateTime<Utc>,
    pub bus: BusInfo,
    pub tickets_available: i64,
    pub taken_seats: Vec<i32>,
}

#[derive(Debug, Deserialize)]
pub struct TripListQuery {
    pub source: Option<String>,
    pub destination: Option<String>,
}

/// List trips, annotated with remaining seats
pub async fn list_trips(
    State(state): State<AppState>,
    Query(query): Query<TripListQuery>,
) -> AppResult<Json<Vec<TripListResponse>>> {
    let mut find = trip::Entity::find();

    if let Some(source) = &query.source {
        find = find.filter(trip::Column::Source.eq(source));
    }
    if let Some(destination) = &query.destination {
        find = find.filter(trip::Column::Destination.eq(destination));
    }

    let trips = find
        .find_also_related(bus::Entity)
        .order_by_asc(trip::Column::Departure)
        .all(&state.db)
        .await?;

    // One grouped count for the whole listing instead of a query per trip.
    let counts = seats::ticket_counts(&state.db).await?;

    let mut responses = Vec::with_capacity(trips.len());
    for (t, bus) in trips {
        let bus = bus.ok_or_else(|| {
            AppError::Internal(format!("bus for trip {} not found", t.id))
        })?;

        let taken = counts.get(&t.id).copied().unwrap_or(0);

        responses.push(TripListResponse {
            id: t.id,
            source: t.source,
            destination: t.destination,
            departure: t.departure.with_timezone(&Utc),
            tickets_available: bus.num_seats as i64 - taken,
            bus: bus.into(),
        });
    }

    Ok(Json(responses))
}

/// Get a trip with its remaining and taken seats
pub async fn get_trip(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<TripDetailResponse>> {
    let (trip, bus) = trip::Entity::find_by_id(id)
        .find_also_related(bus::Entity)
        .one(&state.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Trip not found".to_string()))?;

    let bus = bus.ok_or_else(|| {
        AppError::Internal(format!("bus for trip {} not found", trip.id))
    })?;

    let taken_seats: Vec<i32> = ticket::Entity::find()
        .filter(ticket::Column::TripId.eq(trip.id))
        .order_by_asc(ticket::Column::Seat)
        .all(&state.db)
        .await?
        .into_iter()
        .map(|t| t.seat)
        .collect();

    Ok(Json(TripDetailResponse {
        id: trip.id,
        source: trip.source,
        destination: trip.destination,
        departure: trip.departure.with_timezone(&Utc),
        tickets_available: bus.num_seats as i64 - taken_seats.len() as i64,
        bus: bus.into(),
        taken_seats,
    }))
}

/// Create a trip
pub async fn create_trip(
    State(state): State<AppState>,
    Json(payload): Json<CreateTripRequest>,
) -> AppResult<Json<trip::Model>> {
    bus::Entity::find_by_id(payload.bus_id)
        .one(&state.db)
        .await?
        .ok_or_else(|| AppError::BadRequest("Invalid bus".to_string()))?;

    let trip = trip::ActiveModel {
        id: Set(Uuid::new_v4()),
        source: Set(payload.source),
        destination: Set(payload.destination),
        departure: Set(payload.departure.into()),
        bus_id: Set(payload.bus_id),
    };

    let result = trip.insert(&state.db).await?;
    Ok(Json(result))
}

/// Update a trip
pub async fn update_trip(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateTripRequest>,
) -> AppResult<Json<trip::Model>> {
    let trip = trip::Entity::find_by_id(id)
        .one(&state.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Trip not found".to_string()))?;

    let mut active: trip::ActiveModel = trip.into();

    if let Some(source) = payload.source {
        active.source = Set(source);
    }
    if let Some(destination) = payload.destination {
        active.destination = Set(destination);
    }
    if let Some(departure) = payload.departure {
        active.departure = Set(departure.into());
    }
    if let Some(bus_id) = payload.bus_id {
        bus::Entity::find_by_id(bus_id)
            .one(&state.db)
            .await?
            .ok_or_else(|| AppError::BadRequest("Invalid bus".to_string()))?;
        active.bus_id = Set(bus_id);
    }

    let result = active.update(&state.db).await?;
    Ok(Json(result))
}

/// Delete a trip (cascades to its tickets)
pub async fn delete_trip(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<serde_json::Value>> {
    let result = trip::Entity::delete_by_id(id).exec(&state.db).await?;

    if result.rows_affected == 0 {
        return Err(AppError::NotFound("Trip not found".to_string()));
    }

    Ok(Json(serde_json::json!({ "message": "Trip deleted" })))
}

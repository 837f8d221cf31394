use axum::{
    extract::{Path, Query, State},
    Json,
};
use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, ModelTrait, QueryFilter, Set};
use serde::{Deserialize, Serialize};

use crate::entities::{bus, bus_facility, facility};
use crate::error::{AppError, AppResult};
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct CreateBusRequest {
    pub info: Option<String>,
    pub num_seats: i32,
    #[serde(default)]
    pub facility_ids: Vec<i32>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateBusRequest {
    pub info: Option<String>,
    pub num_seats: Option<i32>,
    pub facility_ids: Option<Vec<i32>>,
}

#[derive(Debug, Serialize)]
pub struct BusResponse {
    pub id: i32,
    pub info: Option<String>,
    pub num_seats: i32,
    pub is_mini: bool,
    pub facilities: Vec<facility::Model>,
}

impl BusResponse {
    fn from_parts(bus: bus::Model, facilities: Vec<facility::Model>) -> Self {
        Self {
            id: bus.id,
            info: bus.info.clone(),
            num_seats: bus.num_seats,
            is_mini: bus.is_mini(),
            facilities,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct BusListQuery {
    /// Comma-separated facility ids, e.g. ?facilities=2,5
    pub facilities: Option<String>,
}

fn params_to_ints(qs: &str) -> Result<Vec<i32>, AppError> {
    qs.split(',')
        .map(|s| {
            s.trim()
                .parse::<i32>()
                .map_err(|_| AppError::BadRequest(format!("Invalid facility id: {}", s)))
        })
        .collect()
}

/// List buses, optionally filtered to those offering any of the given
/// facilities
pub async fn list_buses(
    State(state): State<AppState>,
    Query(query): Query<BusListQuery>,
) -> AppResult<Json<Vec<BusResponse>>> {
    let mut find = bus::Entity::find();

    if let Some(qs) = &query.facilities {
        let facility_ids = params_to_ints(qs)?;
        let bus_ids: Vec<i32> = bus_facility::Entity::find()
            .filter(bus_facility::Column::FacilityId.is_in(facility_ids))
            .all(&state.db)
            .await?
            .into_iter()
            .map(|bf| bf.bus_id)
            .collect();
        find = find.filter(bus::Column::Id.is_in(bus_ids));
    }

    let buses = find.find_with_related(facility::Entity).all(&state.db).await?;

    let responses = buses
        .into_iter()
        .map(|(bus, facilities)| BusResponse::from_parts(bus, facilities))
        .collect();

    Ok(Json(responses))
}

/// Create a bus with its facility set
pub async fn create_bus(
    State(state): State<AppState>,
    Json(payload): Json<CreateBusRequest>,
) -> AppResult<Json<BusResponse>> {
    if payload.num_seats < 1 {
        return Err(AppError::BadRequest(
            "Bus must have at least 1 seat".to_string(),
        ));
    }

    let facilities = resolve_facilities(&state, &payload.facility_ids).await?;

    let bus = bus::ActiveModel {
        info: Set(payload.info),
        num_seats: Set(payload.num_seats),
        ..Default::default()
    }
    .insert(&state.db)
    .await?;

    link_facilities(&state, bus.id, &payload.facility_ids).await?;

    Ok(Json(BusResponse::from_parts(bus, facilities)))
}

/// Get a bus with its facilities
pub async fn get_bus(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> AppResult<Json<BusResponse>> {
    let bus = bus::Entity::find_by_id(id)
        .one(&state.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Bus not found".to_string()))?;

    let facilities = bus.find_related(facility::Entity).all(&state.db).await?;

    Ok(Json(BusResponse::from_parts(bus, facilities)))
}

/// Update a bus; replaces the facility set when one is given
pub async fn update_bus(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    Json(payload): Json<UpdateBusRequest>,
) -> AppResult<Json<BusResponse>> {
    let bus = bus::Entity::find_by_id(id)
        .one(&state.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Bus not found".to_string()))?;

    let mut active: bus::ActiveModel = bus.into();

    if payload.info.is_some() {
        active.info = Set(payload.info);
    }

    if let Some(seats) = payload.num_seats {
        if seats < 1 {
            return Err(AppError::BadRequest(
                "Bus must have at least 1 seat".to_string(),
            ));
        }
        active.num_seats = Set(seats);
    }

    let bus = active.update(&state.db).await?;

    if let Some(facility_ids) = &payload.facility_ids {
        resolve_facilities(&state, facility_ids).await?;
        bus_facility::Entity::delete_many()
            .filter(bus_facility::Column::BusId.eq(bus.id))
            .exec(&state.db)
            .await?;
        link_facilities(&state, bus.id, facility_ids).await?;
    }

    let facilities = bus.find_related(facility::Entity).all(&state.db).await?;

    Ok(Json(BusResponse::from_parts(bus, facilities)))
}

/// Delete a bus (cascades to its trips and their tickets)
pub async fn delete_bus(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> AppResult<Json<serde_json::Value>> {
    let result = bus::Entity::delete_by_id(id).exec(&state.db).await?;

    if result.rows_affected == 0 {
        return Err(AppError::NotFound("Bus not found".to_string()));
    }

    Ok(Json(serde_json::json!({ "message": "Bus deleted" })))
}

async fn resolve_facilities(
    state: &AppState,
    facility_ids: &[i32],
) -> AppResult<Vec<facility::Model>> {
    if facility_ids.is_empty() {
        return Ok(Vec::new());
    }

    let facilities = facility::Entity::find()
        .filter(facility::Column::Id.is_in(facility_ids.to_vec()))
        .all(&state.db)
        .await?;

    if facilities.len() != facility_ids.len() {
        return Err(AppError::BadRequest("Invalid facility id".to_string()));
    }

    Ok(facilities)
}

async fn link_facilities(state: &AppState, bus_id: i32, facility_ids: &[i32]) -> AppResult<()> {
    if facility_ids.is_empty() {
        return Ok(());
    }

    let links = facility_ids.iter().map(|fid| bus_facility::ActiveModel {
        bus_id: Set(bus_id),
        facility_id: Set(*fid),
    });

    bus_facility::Entity::insert_many(links)
        .exec(&state.db)
        .await?;

    Ok(())
}

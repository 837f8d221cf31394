use axum::{
    extract::{Path, State},
    Json,
};
use sea_orm::{ActiveModelTrait, EntityTrait, Set};

use crate::entities::facility;
use crate::error::{AppError, AppResult};
use crate::AppState;

#[derive(Debug, serde::Deserialize)]
pub struct FacilityRequest {
    pub name: String,
}

/// List all facilities
pub async fn list_facilities(
    State(state): State<AppState>,
) -> AppResult<Json<Vec<facility::Model>>> {
    let facilities = facility::Entity::find().all(&state.db).await?;
    Ok(Json(facilities))
}

/// Create a facility
pub async fn create_facility(
    State(state): State<AppState>,
    Json(payload): Json<FacilityRequest>,
) -> AppResult<Json<facility::Model>> {
    if payload.name.trim().is_empty() {
        return Err(AppError::BadRequest("Facility name is required".to_string()));
    }

    let facility = facility::ActiveModel {
        name: Set(payload.name),
        ..Default::default()
    };

    let result = facility.insert(&state.db).await?;
    Ok(Json(result))
}

/// Get a facility
pub async fn get_facility(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> AppResult<Json<facility::Model>> {
    let facility = facility::Entity::find_by_id(id)
        .one(&state.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Facility not found".to_string()))?;

    Ok(Json(facility))
}

/// Update a facility
pub async fn update_facility(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    Json(payload): Json<FacilityRequest>,
) -> AppResult<Json<facility::Model>> {
    let facility = facility::Entity::find_by_id(id)
        .one(&state.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Facility not found".to_string()))?;

    let mut active: facility::ActiveModel = facility.into();
    active.name = Set(payload.name);

    let result = active.update(&state.db).await?;
    Ok(Json(result))
}

/// Delete a facility
pub async fn delete_facility(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> AppResult<Json<serde_json::Value>> {
    let result = facility::Entity::delete_by_id(id).exec(&state.db).await?;

    if result.rows_affected == 0 {
        return Err(AppError::NotFound("Facility not found".to_string()));
    }

    Ok(Json(serde_json::json!({ "message": "Facility deleted" })))
}

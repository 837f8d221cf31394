use axum::{
    extract::{Path, State},
    Extension, Json,
};
use chrono::{DateTime, Utc};
use sea_orm::{ColumnTrait, EntityTrait, QueryFilter, QueryOrder};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::booking::orders::{self, SeatRequest};
use crate::entities::{order, ticket, user};
use crate::error::{AppError, AppResult};
use crate::middleware::identity::CurrentUser;
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct CreateOrderRequest {
    pub tickets: Vec<SeatRequest>,
}

#[derive(Debug, Serialize)]
pub struct TicketInfo {
    pub id: Uuid,
    pub trip_id: Uuid,
    pub seat: i32,
}

#[derive(Debug, Serialize)]
pub struct OrderResponse {
    pub id: Uuid,
    pub created_at: DateTime<Utc>,
    pub tickets: Vec<TicketInfo>,
}

impl OrderResponse {
    fn from_parts(order: order::Model, mut tickets: Vec<ticket::Model>) -> Self {
        tickets.sort_by_key(|t| (t.trip_id, t.seat));

        Self {
            id: order.id,
            created_at: order.created_at.with_timezone(&Utc),
            tickets: tickets
                .into_iter()
                .map(|t| TicketInfo {
                    id: t.id,
                    trip_id: t.trip_id,
                    seat: t.seat,
                })
                .collect(),
        }
    }
}

/// Create an order claiming every requested seat, or nothing at all
pub async fn create_order(
    State(state): State<AppState>,
    Extension(CurrentUser(user_id)): Extension<CurrentUser>,
    Json(payload): Json<CreateOrderRequest>,
) -> AppResult<Json<OrderResponse>> {
    user::Entity::find_by_id(user_id)
        .one(&state.db)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;

    let (order, tickets) = orders::create_order(&state.db, user_id, &payload.tickets).await?;

    Ok(Json(OrderResponse::from_parts(order, tickets)))
}

/// List the caller's orders, newest first
pub async fn my_orders(
    State(state): State<AppState>,
    Extension(CurrentUser(user_id)): Extension<CurrentUser>,
) -> AppResult<Json<Vec<OrderResponse>>> {
    let orders = order::Entity::find()
        .filter(order::Column::UserId.eq(user_id))
        .order_by_desc(order::Column::CreatedAt)
        .find_with_related(ticket::Entity)
        .all(&state.db)
        .await?;

    let responses = orders
        .into_iter()
        .map(|(o, tickets)| OrderResponse::from_parts(o, tickets))
        .collect();

    Ok(Json(responses))
}

/// Get one of the caller's orders
pub async fn get_order(
    State(state): State<AppState>,
    Extension(CurrentUser(user_id)): Extension<CurrentUser>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<OrderResponse>> {
    let order = find_owned_order(&state, user_id, id).await?;

    let tickets = ticket::Entity::find()
        .filter(ticket::Column::OrderId.eq(order.id))
        .all(&state.db)
        .await?;

    Ok(Json(OrderResponse::from_parts(order, tickets)))
}

/// Cancel an order, releasing its seats
pub async fn cancel_order(
    State(state): State<AppState>,
    Extension(CurrentUser(user_id)): Extension<CurrentUser>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<serde_json::Value>> {
    let order = find_owned_order(&state, user_id, id).await?;

    order::Entity::delete_by_id(order.id).exec(&state.db).await?;

    Ok(Json(serde_json::json!({ "message": "Order cancelled" })))
}

async fn find_owned_order(
    state: &AppState,
    user_id: Uuid,
    order_id: Uuid,
) -> AppResult<order::Model> {
    let order = order::Entity::find_by_id(order_id)
        .one(&state.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Order not found".to_string()))?;

    // Orders are scoped to their owner; don't reveal other users' orders.
    if order.user_id != user_id {
        return Err(AppError::NotFound("Order not found".to_string()));
    }

    Ok(order)
}

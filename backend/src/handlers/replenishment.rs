//! HTTP handlers for replenishment orders

use axum::{
    extract::State,
    http::StatusCode,
    Json,
};
use serde::Serialize;
use shared::ReplenishmentOrder;

use crate::error::AppResult;
use crate::extract::{JsonPayload, PathParam};
use crate::middleware::CurrentUser;
use crate::services::replenishment::{
    UpdateReplenishmentInput, REPLENISHMENT_ITEM_REQUIRED_FIELDS, REPLENISHMENT_REQUIRED_FIELDS,
};
use crate::services::ReplenishmentService;
use crate::AppState;

#[derive(Serialize)]
pub struct ReplenishmentOrderResponse {
    pub message: &'static str,
    pub order: ReplenishmentOrder,
}

/// Place a replenishment order with a supplier
pub async fn place_replenishment_order(
    State(state): State<AppState>,
    payload: JsonPayload,
) -> AppResult<(StatusCode, Json<ReplenishmentOrderResponse>)> {
    payload
        .require(REPLENISHMENT_REQUIRED_FIELDS)?
        .require_items(REPLENISHMENT_ITEM_REQUIRED_FIELDS)?;

    let service = ReplenishmentService::new(state.db);
    let order = service.place_order(payload.parse()?).await?;

    Ok((
        StatusCode::CREATED,
        Json(ReplenishmentOrderResponse {
            message: "Replenishment order placed successfully",
            order,
        }),
    ))
}

/// List replenishment orders visible to the caller
pub async fn list_replenishment_orders(
    State(state): State<AppState>,
    current_user: CurrentUser,
) -> AppResult<Json<Vec<ReplenishmentOrder>>> {
    let service = ReplenishmentService::new(state.db);
    let orders = service.list_orders(&current_user.0).await?;
    Ok(Json(orders))
}

/// Supplier update of status, delivery time or contact details
pub async fn update_replenishment_order(
    State(state): State<AppState>,
    current_user: CurrentUser,
    PathParam(order_id): PathParam<i64>,
    payload: JsonPayload,
) -> AppResult<Json<ReplenishmentOrderResponse>> {
    let input: UpdateReplenishmentInput = payload.parse()?;

    let service = ReplenishmentService::new(state.db);
    let order = service
        .update_order(current_user.0.user_id, order_id, input)
        .await?;

    Ok(Json(ReplenishmentOrderResponse {
        message: "Order updated successfully",
        order,
    }))
}

//! HTTP handlers for customer orders

use axum::{
    extract::{Query, State},
    http::StatusCode,
    Json,
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use shared::Order;

use crate::error::AppResult;
use crate::extract::{JsonPayload, PathParam};
use crate::handlers::MessageResponse;
use crate::middleware::CurrentUser;
use crate::services::order::{
    quote_shipping_cost, OrderScope, UpdateOrderInput, ORDER_ITEM_REQUIRED_FIELDS,
    ORDER_REQUIRED_FIELDS,
};
use crate::services::OrderService;
use crate::AppState;

#[derive(Serialize)]
pub struct OrderCreatedResponse {
    pub message: &'static str,
    pub order_id: i64,
}

#[derive(Deserialize)]
pub struct ShippingCostQuery {
    pub total_weight: Option<String>,
    pub location_type: Option<String>,
}

#[derive(Serialize)]
pub struct ShippingCostResponse {
    pub shipping_cost: Decimal,
}

/// Place an order for the caller
pub async fn create_order(
    State(state): State<AppState>,
    current_user: CurrentUser,
    payload: JsonPayload,
) -> AppResult<(StatusCode, Json<OrderCreatedResponse>)> {
    payload
        .require(ORDER_REQUIRED_FIELDS)?
        .require_items(ORDER_ITEM_REQUIRED_FIELDS)?;

    let service = OrderService::new(state.db);
    let order = service
        .create_order(current_user.0.user_id, payload.parse()?)
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(OrderCreatedResponse {
            message: "Order created successfully",
            order_id: order.id,
        }),
    ))
}

/// List the caller's orders
pub async fn list_orders(
    State(state): State<AppState>,
    current_user: CurrentUser,
) -> AppResult<Json<Vec<Order>>> {
    let scope = OrderScope::for_user(&current_user.0)?;
    let service = OrderService::new(state.db);
    let orders = service.list_orders(scope).await?;
    Ok(Json(orders))
}

/// Get one order
pub async fn get_order(
    State(state): State<AppState>,
    current_user: CurrentUser,
    PathParam(order_id): PathParam<i64>,
) -> AppResult<Json<Order>> {
    let scope = OrderScope::for_user(&current_user.0)?;
    let service = OrderService::new(state.db);
    let order = service.get_order(scope, order_id).await?;
    Ok(Json(order))
}

/// Update an order's delivery details or status
pub async fn update_order(
    State(state): State<AppState>,
    current_user: CurrentUser,
    PathParam(order_id): PathParam<i64>,
    payload: JsonPayload,
) -> AppResult<Json<MessageResponse>> {
    let scope = OrderScope::for_user(&current_user.0)?;
    let input: UpdateOrderInput = payload.parse()?;

    let service = OrderService::new(state.db);
    service.update_order(scope, order_id, input).await?;
    Ok(Json(MessageResponse::new("Order updated successfully")))
}

/// Delete an order
pub async fn delete_order(
    State(state): State<AppState>,
    current_user: CurrentUser,
    PathParam(order_id): PathParam<i64>,
) -> AppResult<Json<MessageResponse>> {
    let scope = OrderScope::for_user(&current_user.0)?;
    let service = OrderService::new(state.db);
    service.delete_order(scope, order_id).await?;
    Ok(Json(MessageResponse::new("Order deleted successfully")))
}

/// Quote a shipping cost without placing an order
pub async fn get_shipping_cost(
    Query(query): Query<ShippingCostQuery>,
) -> AppResult<Json<ShippingCostResponse>> {
    let shipping_cost =
        quote_shipping_cost(query.total_weight.as_deref(), query.location_type.as_deref())?;
    Ok(Json(ShippingCostResponse { shipping_cost }))
}

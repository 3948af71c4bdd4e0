//! HTTP handlers for stock management endpoints

use axum::{
    extract::State,
    http::StatusCode,
    Json,
};
use serde::Serialize;
use shared::Stock;

use crate::error::AppResult;
use crate::extract::{JsonPayload, PathParam};
use crate::handlers::MessageResponse;
use crate::middleware::CurrentUser;
use crate::services::stock::{UpdateStockInput, STOCK_REQUIRED_FIELDS};
use crate::services::StockService;
use crate::AppState;

#[derive(Serialize)]
pub struct StockResponse {
    pub message: &'static str,
    pub stock: Stock,
}

/// Add a stock line
pub async fn create_stock(
    State(state): State<AppState>,
    current_user: CurrentUser,
    payload: JsonPayload,
) -> AppResult<(StatusCode, Json<StockResponse>)> {
    payload.require(STOCK_REQUIRED_FIELDS)?;

    let service = StockService::new(state.db);
    let stock = service
        .create_stock(current_user.0.user_id, payload.parse()?)
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(StockResponse {
            message: "Stock added successfully",
            stock,
        }),
    ))
}

/// List all stock lines
pub async fn list_stocks(State(state): State<AppState>) -> AppResult<Json<Vec<Stock>>> {
    let service = StockService::new(state.db);
    let stocks = service.list_stocks().await?;
    Ok(Json(stocks))
}

/// Get a stock line
pub async fn get_stock(
    State(state): State<AppState>,
    PathParam(stock_id): PathParam<i64>,
) -> AppResult<Json<Stock>> {
    let service = StockService::new(state.db);
    let stock = service.get_stock(stock_id).await?;
    Ok(Json(stock))
}

/// Update a stock line
pub async fn update_stock(
    State(state): State<AppState>,
    PathParam(stock_id): PathParam<i64>,
    payload: JsonPayload,
) -> AppResult<Json<StockResponse>> {
    let input: UpdateStockInput = payload.parse()?;

    let service = StockService::new(state.db);
    let stock = service.update_stock(stock_id, input).await?;

    Ok(Json(StockResponse {
        message: "Stock updated successfully",
        stock,
    }))
}

/// Delete a stock line
pub async fn delete_stock(
    State(state): State<AppState>,
    PathParam(stock_id): PathParam<i64>,
) -> AppResult<Json<MessageResponse>> {
    let service = StockService::new(state.db);
    service.delete_stock(stock_id).await?;
    Ok(Json(MessageResponse::new("Stock deleted successfully")))
}

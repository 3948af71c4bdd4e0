//! HTTP handlers for suppliers, their products and the courier directory

use axum::{
    extract::State,
    http::StatusCode,
    Json,
};
use serde::Serialize;
use shared::{Product, User};

use crate::error::AppResult;
use crate::extract::{JsonPayload, PathParam};
use crate::handlers::MessageResponse;
use crate::middleware::CurrentUser;
use crate::services::supplier::{
    UpdateSupplierInput, PRODUCT_REQUIRED_FIELDS, SUPPLIER_REQUIRED_FIELDS,
};
use crate::services::SupplierService;
use crate::AppState;

#[derive(Serialize)]
pub struct SupplierResponse {
    pub message: &'static str,
    pub supplier: User,
}

// ============================================================================
// Suppliers
// ============================================================================

/// Create a supplier account
pub async fn create_supplier(
    State(state): State<AppState>,
    payload: JsonPayload,
) -> AppResult<(StatusCode, Json<SupplierResponse>)> {
    payload.require(SUPPLIER_REQUIRED_FIELDS)?;

    let service = SupplierService::new(state.db);
    let supplier = service.create_supplier(payload.parse()?).await?;

    Ok((
        StatusCode::CREATED,
        Json(SupplierResponse {
            message: "Supplier added successfully",
            supplier,
        }),
    ))
}

/// List supplier accounts
pub async fn list_suppliers(State(state): State<AppState>) -> AppResult<Json<Vec<User>>> {
    let service = SupplierService::new(state.db);
    let suppliers = service.list_suppliers().await?;
    Ok(Json(suppliers))
}

/// Get a supplier account
pub async fn get_supplier(
    State(state): State<AppState>,
    PathParam(supplier_id): PathParam<i64>,
) -> AppResult<Json<User>> {
    let service = SupplierService::new(state.db);
    let supplier = service.get_supplier(supplier_id).await?;
    Ok(Json(supplier))
}

/// Update a supplier account
pub async fn update_supplier(
    State(state): State<AppState>,
    PathParam(supplier_id): PathParam<i64>,
    payload: JsonPayload,
) -> AppResult<Json<SupplierResponse>> {
    let input: UpdateSupplierInput = payload.parse()?;

    let service = SupplierService::new(state.db);
    let supplier = service.update_supplier(supplier_id, input).await?;

    Ok(Json(SupplierResponse {
        message: "Supplier updated successfully",
        supplier,
    }))
}

/// Delete a supplier account
pub async fn delete_supplier(
    State(state): State<AppState>,
    PathParam(supplier_id): PathParam<i64>,
) -> AppResult<Json<MessageResponse>> {
    let service = SupplierService::new(state.db);
    service.delete_supplier(supplier_id).await?;
    Ok(Json(MessageResponse::new("Supplier deleted successfully")))
}

// ============================================================================
// Products
// ============================================================================

/// List the product catalogue
pub async fn list_products(State(state): State<AppState>) -> AppResult<Json<Vec<Product>>> {
    let service = SupplierService::new(state.db);
    let products = service.list_products().await?;
    Ok(Json(products))
}

/// List a new product for the calling supplier
pub async fn create_product(
    State(state): State<AppState>,
    current_user: CurrentUser,
    payload: JsonPayload,
) -> AppResult<(StatusCode, Json<Product>)> {
    payload.require(PRODUCT_REQUIRED_FIELDS)?;

    let service = SupplierService::new(state.db);
    let product = service
        .create_product(current_user.0.user_id, payload.parse()?)
        .await?;

    Ok((StatusCode::CREATED, Json(product)))
}

// ============================================================================
// Couriers
// ============================================================================

/// Courier services a customer can pick from
pub async fn list_courier_services(State(state): State<AppState>) -> AppResult<Json<Vec<User>>> {
    let service = SupplierService::new(state.db);
    let couriers = service.list_courier_services().await?;
    Ok(Json(couriers))
}

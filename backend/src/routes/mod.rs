//! Route definitions for the logistics platform

use axum::{
    middleware,
    routing::{get, post, put},
    Router,
};

use crate::{
    handlers,
    middleware::{auth_middleware, enforce_access_policy},
    AppState,
};

/// Authentication routes; logout and profile need a session
pub fn auth_routes(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/logout", post(handlers::logout))
        .route("/profile", get(handlers::profile))
        .route_layer(middleware::from_fn_with_state(state, auth_middleware))
        .route("/register", post(handlers::register))
        .route("/login", post(handlers::login))
        .route("/forgot-password", post(handlers::forgot_password))
        .route("/reset-password/:token", post(handlers::reset_password))
}

/// Protected API routes
///
/// Route templates here must match the access policy table; a template the
/// table does not list is denied for every role.
pub fn api_routes(state: AppState) -> Router<AppState> {
    Router::new()
        // Customer orders
        .route(
            "/orders",
            post(handlers::create_order).get(handlers::list_orders),
        )
        .route("/orders/get-shipping-cost", get(handlers::get_shipping_cost))
        .route(
            "/orders/:order_id",
            get(handlers::get_order)
                .put(handlers::update_order)
                .delete(handlers::delete_order),
        )
        // Stock
        .route(
            "/stocks",
            post(handlers::create_stock).get(handlers::list_stocks),
        )
        .route(
            "/stocks/:stock_id",
            get(handlers::get_stock)
                .put(handlers::update_stock)
                .delete(handlers::delete_stock),
        )
        // Suppliers
        .route(
            "/suppliers",
            post(handlers::create_supplier).get(handlers::list_suppliers),
        )
        .route(
            "/suppliers/:supplier_id",
            get(handlers::get_supplier)
                .put(handlers::update_supplier)
                .delete(handlers::delete_supplier),
        )
        .route(
            "/stock-replenishment/products",
            get(handlers::list_products).post(handlers::create_product),
        )
        // Replenishment
        .route(
            "/replenishment-orders",
            post(handlers::place_replenishment_order).get(handlers::list_replenishment_orders),
        )
        .route(
            "/replenishment-orders/:replenishment_order_id",
            put(handlers::update_replenishment_order),
        )
        // Directory and feed
        .route("/couriers-services", get(handlers::list_courier_services))
        .route("/notifications", get(handlers::list_notifications))
        // Reports
        .route("/analytics", get(handlers::get_analytics))
        .route(
            "/order-performance-and-demand-analysis",
            get(handlers::get_order_performance),
        )
        .route("/inventory-reports", get(handlers::get_inventory_reports))
        .route("/sales-reports", get(handlers::get_sales_reports))
        // Layers run bottom-up: authenticate, then check the role
        .route_layer(middleware::from_fn(enforce_access_policy))
        .route_layer(middleware::from_fn_with_state(state, auth_middleware))
}

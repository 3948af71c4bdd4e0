//! Role-based access policy
//!
//! Every protected `/api` route is listed here with the roles allowed to call
//! it. The middleware runs after authentication and consults the table by
//! matched route template and method, so handlers never check roles
//! themselves. Routes missing from the table are denied.

use axum::{
    extract::{MatchedPath, Request},
    middleware::Next,
    response::Response,
};
use shared::Role;

use crate::error::{AppError, AppResult};
use crate::middleware::auth::CurrentUser;

const IM: Role = Role::InventoryManager;
const CUSTOMER: Role = Role::Customer;
const SUPPLIER: Role = Role::Supplier;
const COURIER: Role = Role::CourierService;

/// A single `(method, route) → roles` entry; routes are relative to `/api`
#[derive(Debug)]
pub struct AccessRule {
    pub method: &'static str,
    pub route: &'static str,
    pub roles: &'static [Role],
}

const fn rule(method: &'static str, route: &'static str, roles: &'static [Role]) -> AccessRule {
    AccessRule {
        method,
        route,
        roles,
    }
}

pub static ACCESS_POLICY: &[AccessRule] = &[
    // Orders
    rule("POST", "/orders", &[CUSTOMER]),
    rule("GET", "/orders", &[CUSTOMER, COURIER]),
    rule("GET", "/orders/get-shipping-cost", &[CUSTOMER]),
    rule("GET", "/orders/:order_id", &[CUSTOMER, COURIER]),
    rule("PUT", "/orders/:order_id", &[CUSTOMER, COURIER]),
    rule("DELETE", "/orders/:order_id", &[CUSTOMER]),
    // Stock
    rule("POST", "/stocks", &[IM]),
    rule("GET", "/stocks", &[IM, CUSTOMER]),
    rule("GET", "/stocks/:stock_id", &[IM, CUSTOMER]),
    rule("PUT", "/stocks/:stock_id", &[IM]),
    rule("DELETE", "/stocks/:stock_id", &[IM]),
    // Suppliers
    rule("POST", "/suppliers", &[IM]),
    rule("GET", "/suppliers", &[IM]),
    rule("GET", "/suppliers/:supplier_id", &[IM]),
    rule("PUT", "/suppliers/:supplier_id", &[IM]),
    rule("DELETE", "/suppliers/:supplier_id", &[IM]),
    // Supplier catalogue
    rule("GET", "/stock-replenishment/products", &[SUPPLIER, IM]),
    rule("POST", "/stock-replenishment/products", &[SUPPLIER]),
    // Replenishment
    rule("POST", "/replenishment-orders", &[IM]),
    rule("GET", "/replenishment-orders", &[IM, SUPPLIER]),
    rule("PUT", "/replenishment-orders/:replenishment_order_id", &[SUPPLIER]),
    // Directory and feed
    rule("GET", "/couriers-services", &[CUSTOMER]),
    rule("GET", "/notifications", &[IM, CUSTOMER, SUPPLIER, COURIER]),
    // Reports
    rule("GET", "/analytics", &[IM]),
    rule("GET", "/order-performance-and-demand-analysis", &[IM]),
    rule("GET", "/inventory-reports", &[IM]),
    rule("GET", "/sales-reports", &[IM]),
];

/// Roles allowed on `method route`, `None` when the route is not listed
pub fn allowed_roles(method: &str, route: &str) -> Option<&'static [Role]> {
    let route = route.strip_prefix("/api").unwrap_or(route);
    ACCESS_POLICY
        .iter()
        .find(|r| r.method == method && r.route == route)
        .map(|r| r.roles)
}

/// Reject callers whose role is not allowed on the matched route
pub async fn enforce_access_policy(
    matched: MatchedPath,
    CurrentUser(user): CurrentUser,
    request: Request,
    next: Next,
) -> AppResult<Response> {
    let method = request.method().as_str();

    match allowed_roles(method, matched.as_str()) {
        Some(roles) if user.has_any_role(roles) => Ok(next.run(request).await),
        Some(_) => {
            tracing::debug!(
                user_id = user.user_id,
                role = %user.role,
                route = matched.as_str(),
                method,
                "access denied"
            );
            Err(AppError::Forbidden)
        }
        None => {
            tracing::warn!(route = matched.as_str(), method, "route has no access rule");
            Err(AppError::Forbidden)
        }
    }
}

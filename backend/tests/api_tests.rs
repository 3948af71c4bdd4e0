//! Router-level tests
//!
//! The first group runs against a lazily connected pool and only exercises
//! paths that are rejected before any query runs. The scenario tests at the
//! bottom need PostgreSQL at `DATABASE_URL`.

mod common;

use axum::{
    body::Body,
    http::{header, Method, Request, StatusCode},
};
use serde_json::json;
use shared::Role;

use common::{request, send, send_with_headers, session_cookie, test_app, token_for};

// ============================================================================
// Authentication and access policy
// ============================================================================

#[tokio::test]
async fn test_protected_route_requires_session() {
    let (app, _) = test_app();

    let (status, body) = send(&app, request(Method::GET, "/api/orders", None, None)).await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "Authentication required");
}

#[tokio::test]
async fn test_garbage_token_is_rejected() {
    let (app, _) = test_app();

    let (status, _) = send(
        &app,
        request(Method::GET, "/api/notifications", Some("not-a-token"), None),
    )
    .await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_profile_requires_session() {
    let (app, _) = test_app();

    let (status, _) = send(&app, request(Method::GET, "/auth/profile", None, None)).await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_customer_cannot_manage_suppliers() {
    let (app, config) = test_app();
    let token = token_for(&config, 7, Role::Customer);

    let (status, body) = send(
        &app,
        request(Method::GET, "/api/suppliers", Some(&token), None),
    )
    .await;

    assert_eq!(status, StatusCode::FORBIDDEN);
    assert!(body["error"].is_string());
}

#[tokio::test]
async fn test_reports_are_manager_only() {
    let (app, config) = test_app();

    for role in [Role::Customer, Role::Supplier, Role::CourierService] {
        let token = token_for(&config, 3, role);
        let (status, _) = send(
            &app,
            request(
                Method::GET,
                "/api/sales-reports?startDate=2024-01-01&endDate=2024-01-31",
                Some(&token),
                None,
            ),
        )
        .await;
        assert_eq!(status, StatusCode::FORBIDDEN, "role {}", role);
    }
}

#[tokio::test]
async fn test_supplier_cannot_place_customer_order() {
    let (app, config) = test_app();
    let token = token_for(&config, 4, Role::Supplier);

    let (status, _) = send(
        &app,
        request(Method::POST, "/api/orders", Some(&token), Some(json!({"x": 1}))),
    )
    .await;

    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_courier_cannot_delete_orders() {
    let (app, config) = test_app();
    let token = token_for(&config, 9, Role::CourierService);

    let (status, _) = send(
        &app,
        request(Method::DELETE, "/api/orders/1", Some(&token), None),
    )
    .await;

    assert_eq!(status, StatusCode::FORBIDDEN);
}

// ============================================================================
// Request validation
// ============================================================================

#[tokio::test]
async fn test_shipping_cost_quote() {
    let (app, config) = test_app();
    let token = token_for(&config, 7, Role::Customer);

    let (status, body) = send(
        &app,
        request(
            Method::GET,
            "/api/orders/get-shipping-cost?total_weight=5&location_type=urban",
            Some(&token),
            None,
        ),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["shipping_cost"].as_f64(), Some(15.0));
}

#[tokio::test]
async fn test_shipping_cost_rejects_unknown_zone() {
    let (app, config) = test_app();
    let token = token_for(&config, 7, Role::Customer);

    let (status, body) = send(
        &app,
        request(
            Method::GET,
            "/api/orders/get-shipping-cost?total_weight=5&location_type=moon",
            Some(&token),
            None,
        ),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].is_string());
}

#[tokio::test]
async fn test_shipping_cost_requires_both_parameters() {
    let (app, config) = test_app();
    let token = token_for(&config, 7, Role::Customer);

    let (status, _) = send(
        &app,
        request(
            Method::GET,
            "/api/orders/get-shipping-cost?total_weight=5",
            Some(&token),
            None,
        ),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_empty_order_body_is_rejected() {
    let (app, config) = test_app();
    let token = token_for(&config, 7, Role::Customer);

    let (status, body) = send(&app, request(Method::POST, "/api/orders", Some(&token), None)).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, json!({"error": "Request payload is missing"}));
}

#[tokio::test]
async fn test_order_missing_fields_are_listed() {
    let (app, config) = test_app();
    let token = token_for(&config, 7, Role::Customer);

    let (status, body) = send(
        &app,
        request(
            Method::POST,
            "/api/orders",
            Some(&token),
            Some(json!({"customer_id": 7, "shipping_address": "1 Main St"})),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    let error = body["error"].as_str().unwrap_or_default();
    assert!(error.contains("pin_code"));
    assert!(error.contains("items"));
}

#[tokio::test]
async fn test_order_items_must_be_a_list() {
    let (app, config) = test_app();
    let token = token_for(&config, 7, Role::Customer);

    let (status, body) = send(
        &app,
        request(
            Method::POST,
            "/api/orders",
            Some(&token),
            Some(json!({
                "customer_id": 7,
                "shipping_address": "1 Main St",
                "pin_code": "10001",
                "phone_number": "5550100",
                "location_type": "urban",
                "items": "five boxes"
            })),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "The items field must be a non-empty list");
}

#[tokio::test]
async fn test_report_dates_are_validated() {
    let (app, config) = test_app();
    let token = token_for(&config, 1, Role::InventoryManager);

    for uri in [
        "/api/analytics",
        "/api/inventory-reports?startDate=2024-01-01",
        "/api/sales-reports?startDate=01/01/2024&endDate=2024-02-01",
        "/api/order-performance-and-demand-analysis?startDate=2024-03-01&endDate=2024-02-01",
    ] {
        let (status, body) = send(&app, request(Method::GET, uri, Some(&token), None)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{}", uri);
        assert!(body["error"].is_string(), "{}", uri);
    }
}

#[tokio::test]
async fn test_register_with_empty_body() {
    let (app, _) = test_app();

    let (status, body) = send(&app, request(Method::POST, "/auth/register", None, None)).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Request payload is missing");
}

#[tokio::test]
async fn test_logout_clears_session_cookie() {
    let (app, config) = test_app();
    let token = token_for(&config, 7, Role::Customer);

    let logout = Request::builder()
        .method(Method::POST)
        .uri("/auth/logout")
        .header(header::COOKIE, format!("session={}", token))
        .body(Body::empty())
        .expect("request");
    let (status, headers, body) = send_with_headers(&app, logout).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Logged out successfully");
    assert_eq!(session_cookie(&headers).as_deref(), Some(""));
}

#[tokio::test]
async fn test_non_numeric_order_id_is_a_json_error() {
    let (app, config) = test_app();
    let token = token_for(&config, 7, Role::Customer);

    let (status, body) = send(
        &app,
        request(Method::GET, "/api/orders/abc", Some(&token), None),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap_or_default().contains("abc"));
}

#[tokio::test]
async fn test_non_numeric_stock_id_is_a_json_error() {
    let (app, config) = test_app();
    let token = token_for(&config, 1, Role::InventoryManager);

    let (status, body) = send(
        &app,
        request(Method::DELETE, "/api/stocks/first", Some(&token), None),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].is_string());
}

#[tokio::test]
async fn test_order_for_another_customer_is_forbidden() {
    let (app, config) = test_app();
    let token = token_for(&config, 7, Role::Customer);

    let (status, body) = send(
        &app,
        request(
            Method::POST,
            "/api/orders",
            Some(&token),
            Some(json!({
                "customer_id": 8,
                "shipping_address": "1 Main St",
                "pin_code": "10001",
                "phone_number": "5550100",
                "location_type": "urban",
                "items": [{"stock_id": 1, "quantity": 1, "weight": 1.0, "price": 10}]
            })),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::FORBIDDEN);
    assert!(body["error"].is_string());
}

// ============================================================================
// Scenarios (database)
// ============================================================================

mod scenarios {
    use super::*;
    use common::{db_app, db_state};
    use logistics_backend::{create_app, services::AuthService};
    use serde_json::Value;

    fn unique_email(prefix: &str) -> String {
        format!(
            "{}-{}@example.com",
            prefix,
            chrono::Utc::now().timestamp_nanos_opt().unwrap_or_default()
        )
    }

    async fn register_and_login(app: &axum::Router, role: &str) -> (String, Value) {
        let email = unique_email(&role.to_lowercase().replace(' ', "-"));
        let (status, _) = send(
            app,
            request(
                Method::POST,
                "/auth/register",
                None,
                Some(json!({"name": "Test", "email": email, "password": "secret123", "role": role})),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);

        let (status, headers, body) = send_with_headers(
            app,
            request(
                Method::POST,
                "/auth/login",
                None,
                Some(json!({"email": email, "password": "secret123"})),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        let token = session_cookie(&headers).expect("session cookie");
        (token, body["user"].clone())
    }

    async fn create_stock(app: &axum::Router, manager: &str, name: &str, quantity: i64) -> i64 {
        let (status, created) = send(
            app,
            request(
                Method::POST,
                "/api/stocks",
                Some(manager),
                Some(json!({"name": name, "price": 100, "quantity": quantity, "weight": 5.0})),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        created["stock"]["id"].as_i64().expect("stock id")
    }

    async fn notification_count(app: &axum::Router, token: &str) -> usize {
        let (status, feed) =
            send(app, request(Method::GET, "/api/notifications", Some(token), None)).await;
        assert_eq!(status, StatusCode::OK);
        feed.as_array().map(Vec::len).unwrap_or_default()
    }

    #[tokio::test]
    #[ignore] // Requires database connection
    async fn test_register_login_profile() {
        let app = db_app().await;
        let (token, user) = register_and_login(&app, "Customer").await;

        let (status, profile) =
            send(&app, request(Method::GET, "/auth/profile", Some(&token), None)).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(profile["email"], user["email"]);
        assert!(profile.get("password_hash").is_none());
    }

    #[tokio::test]
    #[ignore] // Requires database connection
    async fn test_duplicate_registration() {
        let app = db_app().await;
        let email = unique_email("dup");
        let body = json!({"name": "A", "email": email, "password": "pw", "role": "Customer"});

        let (first, _) = send(
            &app,
            request(Method::POST, "/auth/register", None, Some(body.clone())),
        )
        .await;
        let (second, error) =
            send(&app, request(Method::POST, "/auth/register", None, Some(body))).await;

        assert_eq!(first, StatusCode::CREATED);
        assert_eq!(second, StatusCode::BAD_REQUEST);
        assert_eq!(error["error"], "Email already exists");
    }

    #[tokio::test]
    #[ignore] // Requires database connection
    async fn test_order_lifecycle() {
        let app = db_app().await;
        let (manager, _) = register_and_login(&app, "Inventory Manager").await;
        let (customer, customer_user) = register_and_login(&app, "Customer").await;

        let (status, created) = send(
            &app,
            request(
                Method::POST,
                "/api/stocks",
                Some(&manager),
                Some(json!({"name": "Widget", "price": 100, "quantity": 10, "weight": 5.0})),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        let stock_id = created["stock"]["id"].as_i64().expect("stock id");

        let order = json!({
            "customer_id": customer_user["id"],
            "shipping_address": "1 Main St",
            "pin_code": "10001",
            "phone_number": "5550100",
            "location_type": "urban",
            "items": [{"stock_id": stock_id, "quantity": 2, "weight": 5.0, "price": 100}]
        });
        let (status, body) =
            send(&app, request(Method::POST, "/api/orders", Some(&customer), Some(order))).await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body["message"], "Order created successfully");
        let order_id = body["order_id"].as_i64().expect("order id");

        let (_, stock) = send(
            &app,
            request(Method::GET, &format!("/api/stocks/{}", stock_id), Some(&manager), None),
        )
        .await;
        assert_eq!(stock["quantity"], 8);

        let (status, fetched) = send(
            &app,
            request(Method::GET, &format!("/api/orders/{}", order_id), Some(&customer), None),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(fetched["shipping_cost"].as_f64(), Some(15.0));
        assert_eq!(fetched["status"], "Processing");
        assert_eq!(fetched["items"][0]["product_name"], "Widget");

        let before = notification_count(&app, &customer).await;
        for (status, expected) in [("In Transit", 1), ("In Transit", 1), ("Delivered", 2)] {
            let (code, _) = send(
                &app,
                request(
                    Method::PUT,
                    &format!("/api/orders/{}", order_id),
                    Some(&customer),
                    Some(json!({"status": status})),
                ),
            )
            .await;
            assert_eq!(code, StatusCode::OK);
            assert_eq!(notification_count(&app, &customer).await, before + expected, "{}", status);
        }

        let (_, feed) =
            send(&app, request(Method::GET, "/api/notifications", Some(&customer), None)).await;
        assert_eq!(feed[0]["title"], format!("Order #{} Delivered", order_id));
        assert_eq!(feed[1]["title"], format!("Order #{} In Transit", order_id));

        let (status, _) = send(
            &app,
            request(
                Method::PUT,
                &format!("/api/orders/{}", order_id),
                Some(&customer),
                Some(json!({"shipping_address": "2 Side St"})),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(notification_count(&app, &customer).await, before + 2);

        let (status, _) = send(
            &app,
            request(Method::DELETE, &format!("/api/orders/{}", order_id), Some(&customer), None),
        )
        .await;
        assert_eq!(status, StatusCode::OK);

        let (status, body) = send(
            &app,
            request(Method::GET, &format!("/api/orders/{}", order_id), Some(&customer), None),
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"], "Order not found");
    }

    #[tokio::test]
    #[ignore] // Requires database connection
    async fn test_oversell_rolls_back() {
        let app = db_app().await;
        let (manager, _) = register_and_login(&app, "Inventory Manager").await;
        let (customer, customer_user) = register_and_login(&app, "Customer").await;

        let (_, created) = send(
            &app,
            request(
                Method::POST,
                "/api/stocks",
                Some(&manager),
                Some(json!({"name": "Scarce", "price": 10, "quantity": 1, "weight": 1.0})),
            ),
        )
        .await;
        let stock_id = created["stock"]["id"].as_i64().expect("stock id");

        let order = json!({
            "customer_id": customer_user["id"],
            "shipping_address": "1 Main St",
            "pin_code": "10001",
            "phone_number": "5550100",
            "location_type": "rural",
            "items": [{"stock_id": stock_id, "quantity": 5, "weight": 1.0, "price": 10}]
        });
        let (status, _) =
            send(&app, request(Method::POST, "/api/orders", Some(&customer), Some(order))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (_, stock) = send(
            &app,
            request(Method::GET, &format!("/api/stocks/{}", stock_id), Some(&manager), None),
        )
        .await;
        assert_eq!(stock["quantity"], 1);

        let (_, orders) =
            send(&app, request(Method::GET, "/api/orders", Some(&customer), None)).await;
        assert_eq!(orders, json!([]));
    }

    #[tokio::test]
    #[ignore] // Requires database connection
    async fn test_missing_order_is_not_found() {
        let app = db_app().await;
        let (customer, _) = register_and_login(&app, "Customer").await;

        let (status, body) = send(
            &app,
            request(Method::GET, "/api/orders/999999999", Some(&customer), None),
        )
        .await;

        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body, json!({"error": "Order not found"}));
    }

    #[tokio::test]
    #[ignore] // Requires database connection
    async fn test_replenishment_status_notifies_manager() {
        let app = db_app().await;
        let (manager, manager_user) = register_and_login(&app, "Inventory Manager").await;
        let (supplier, supplier_user) = register_and_login(&app, "Supplier").await;

        let (status, product) = send(
            &app,
            request(
                Method::POST,
                "/api/stock-replenishment/products",
                Some(&supplier),
                Some(json!({"name": "Bolts", "price": 2, "weight": 0.1, "quantity": 100})),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);

        let (status, placed) = send(
            &app,
            request(
                Method::POST,
                "/api/replenishment-orders",
                Some(&manager),
                Some(json!({
                    "inventory_manager_id": manager_user["id"],
                    "supplier_id": supplier_user["id"],
                    "address": "Warehouse 1",
                    "mobile_number": "5550199",
                    "items": [{
                        "product_id": product["id"],
                        "product_name": "Bolts",
                        "quantity": 40,
                        "weight": 4.0,
                        "price": 80
                    }]
                })),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(placed["order"]["status"], "Order Received");
        let order_id = placed["order"]["id"].as_i64().expect("order id");

        let (status, _) = send(
            &app,
            request(
                Method::PUT,
                &format!("/api/replenishment-orders/{}", order_id),
                Some(&supplier),
                Some(json!({"status": "Delayed"})),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::OK);

        let (_, feed) =
            send(&app, request(Method::GET, "/api/notifications", Some(&manager), None)).await;
        assert!(feed[0]["title"]
            .as_str()
            .unwrap_or_default()
            .contains(&order_id.to_string()));
    }

    #[tokio::test]
    #[ignore] // Requires database connection
    async fn test_customer_cannot_order_for_someone_else() {
        let app = db_app().await;
        let (manager, _) = register_and_login(&app, "Inventory Manager").await;
        let (alice, _) = register_and_login(&app, "Customer").await;
        let (bob, bob_user) = register_and_login(&app, "Customer").await;
        let stock_id = create_stock(&app, &manager, "Crate", 10).await;

        let order = json!({
            "customer_id": bob_user["id"],
            "shipping_address": "1 Main St",
            "pin_code": "10001",
            "phone_number": "5550100",
            "location_type": "urban",
            "items": [{"stock_id": stock_id, "quantity": 3, "weight": 5.0, "price": 100}]
        });
        let (status, _) =
            send(&app, request(Method::POST, "/api/orders", Some(&alice), Some(order))).await;
        assert_eq!(status, StatusCode::FORBIDDEN);

        let (_, orders) = send(&app, request(Method::GET, "/api/orders", Some(&bob), None)).await;
        assert_eq!(orders, json!([]));

        let (_, stock) = send(
            &app,
            request(Method::GET, &format!("/api/stocks/{}", stock_id), Some(&manager), None),
        )
        .await;
        assert_eq!(stock["quantity"], 10);
    }

    #[tokio::test]
    #[ignore] // Requires database connection
    async fn test_delete_missing_stock() {
        let app = db_app().await;
        let (manager, _) = register_and_login(&app, "Inventory Manager").await;
        let stock_id = create_stock(&app, &manager, "Temporary", 1).await;
        let uri = format!("/api/stocks/{}", stock_id);

        let (status, _) = send(&app, request(Method::DELETE, &uri, Some(&manager), None)).await;
        assert_eq!(status, StatusCode::OK);

        let (status, body) = send(&app, request(Method::DELETE, &uri, Some(&manager), None)).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body, json!({"error": "Stock not found"}));
    }

    #[tokio::test]
    #[ignore] // Requires database connection
    async fn test_assigning_unknown_courier() {
        let app = db_app().await;
        let (manager, _) = register_and_login(&app, "Inventory Manager").await;
        let (customer, customer_user) = register_and_login(&app, "Customer").await;
        let (_, supplier_user) = register_and_login(&app, "Supplier").await;
        let stock_id = create_stock(&app, &manager, "Pallet", 5).await;

        let order = json!({
            "customer_id": customer_user["id"],
            "shipping_address": "1 Main St",
            "pin_code": "10001",
            "phone_number": "5550100",
            "location_type": "suburban",
            "items": [{"stock_id": stock_id, "quantity": 1, "weight": 5.0, "price": 100}]
        });
        let (_, body) =
            send(&app, request(Method::POST, "/api/orders", Some(&customer), Some(order))).await;
        let uri = format!("/api/orders/{}", body["order_id"].as_i64().expect("order id"));

        for courier_id in [json!(999_999_999), supplier_user["id"].clone()] {
            let (status, body) = send(
                &app,
                request(
                    Method::PUT,
                    &uri,
                    Some(&customer),
                    Some(json!({"courier_service_id": courier_id})),
                ),
            )
            .await;
            assert_eq!(status, StatusCode::NOT_FOUND);
            assert_eq!(body, json!({"error": "Courier service not found"}));
        }

        let (_, fetched) = send(&app, request(Method::GET, &uri, Some(&customer), None)).await;
        assert!(fetched["courier_service_id"].is_null());
    }

    #[tokio::test]
    #[ignore] // Requires database connection
    async fn test_reset_token_is_single_use() {
        let state = db_state().await;
        let auth = AuthService::new(state.db.clone(), &state.config);
        let app = create_app(state);
        let (_, user) = register_and_login(&app, "Customer").await;
        let email = user["email"].as_str().expect("email");

        let (_, token) = auth
            .create_reset_token(email)
            .await
            .expect("reset token")
            .expect("known account");
        let uri = format!("/auth/reset-password/{}", token);

        let ((first, _), (second, _)) = tokio::join!(
            send(
                &app,
                request(Method::POST, &uri, None, Some(json!({"password": "first-pw"}))),
            ),
            send(
                &app,
                request(Method::POST, &uri, None, Some(json!({"password": "second-pw"}))),
            ),
        );
        let successes = [first, second]
            .iter()
            .filter(|s| **s == StatusCode::OK)
            .count();
        assert_eq!(successes, 1);

        let (status, body) = send(
            &app,
            request(Method::POST, &uri, None, Some(json!({"password": "third-pw"}))),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "Invalid or expired token");
    }
}

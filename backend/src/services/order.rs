//! Order workflow service
//!
//! Creation validates the payload, prices the consignment, and writes the
//! order, its items and the stock decrements in one transaction. Status
//! updates notify the customer in the same transaction.

use std::collections::HashMap;
use std::str::FromStr;

use chrono::{DateTime, Duration, Utc};
use rust_decimal::Decimal;
use serde::Deserialize;
use shared::{
    consignment_weight, shipping_cost_for, validate_non_negative, Order, OrderItem, OrderStatus,
    Role, DELIVERY_SLA_DAYS,
};
use sqlx::PgPool;

use crate::error::{AppError, AppResult};
use crate::middleware::AuthUser;
use crate::services::notification::{create_notification, order_status_content};

/// Top-level keys an order payload must carry
pub const ORDER_REQUIRED_FIELDS: &[&str] = &[
    "customer_id",
    "shipping_address",
    "pin_code",
    "phone_number",
    "location_type",
    "items",
];

/// Keys every order item must carry
pub const ORDER_ITEM_REQUIRED_FIELDS: &[&str] = &["stock_id", "quantity", "weight", "price"];

const ORDER_COLUMNS: &str = "id, customer_id, courier_service_id, shipping_address, pin_code, \
     phone_number, consignment_weight, shipping_cost, delivery_date, status, created_at, updated_at";

/// Order service for the customer and courier workflows
#[derive(Clone)]
pub struct OrderService {
    db: PgPool,
}

/// Input for placing an order
#[derive(Debug, Deserialize)]
pub struct CreateOrderInput {
    pub customer_id: i64,
    pub courier_service_id: Option<i64>,
    pub shipping_address: String,
    pub pin_code: String,
    pub phone_number: String,
    pub location_type: String,
    pub items: Vec<OrderItemInput>,
}

/// One requested line of an order
#[derive(Debug, Deserialize)]
pub struct OrderItemInput {
    pub stock_id: i64,
    pub quantity: i32,
    pub weight: Decimal,
    pub price: Decimal,
    pub product_name: Option<String>,
}

/// Fields a customer or courier may change on an existing order
#[derive(Debug, Default, Deserialize)]
pub struct UpdateOrderInput {
    pub shipping_address: Option<String>,
    pub pin_code: Option<String>,
    pub phone_number: Option<String>,
    pub courier_service_id: Option<i64>,
    pub delivery_date: Option<DateTime<Utc>>,
    pub status: Option<String>,
}

/// Which orders a caller may see: customers their own, couriers those assigned to them
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrderScope {
    Customer(i64),
    Courier(i64),
}

impl OrderScope {
    pub fn for_user(user: &AuthUser) -> AppResult<Self> {
        match user.role {
            Role::Customer => Ok(OrderScope::Customer(user.user_id)),
            Role::CourierService => Ok(OrderScope::Courier(user.user_id)),
            _ => Err(AppError::Forbidden),
        }
    }

    fn column(&self) -> &'static str {
        match self {
            OrderScope::Customer(_) => "customer_id",
            OrderScope::Courier(_) => "courier_service_id",
        }
    }

    fn user_id(&self) -> i64 {
        match self {
            OrderScope::Customer(id) | OrderScope::Courier(id) => *id,
        }
    }
}

/// Price a consignment from raw query parameters
pub fn quote_shipping_cost(
    total_weight: Option<&str>,
    location_type: Option<&str>,
) -> AppResult<Decimal> {
    let (Some(total_weight), Some(location_type)) = (
        total_weight.filter(|s| !s.is_empty()),
        location_type.filter(|s| !s.is_empty()),
    ) else {
        return Err(AppError::Validation(
            "total_weight and location_type are required query parameters".to_string(),
        ));
    };

    let weight = Decimal::from_str(total_weight.trim())
        .map_err(|_| AppError::Validation("total_weight must be a number".to_string()))?;
    Ok(shipping_cost_for(weight, location_type)?)
}

impl OrderService {
    /// Create a new OrderService instance
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// Place an order for `caller_id`, decrementing stock for every item
    pub async fn create_order(&self, caller_id: i64, input: CreateOrderInput) -> AppResult<Order> {
        if input.customer_id != caller_id {
            tracing::warn!(
                caller_id,
                customer_id = input.customer_id,
                "order placed for another customer"
            );
            return Err(AppError::Forbidden);
        }
        if input.items.is_empty() {
            return Err(AppError::Validation(shared::ITEMS_NOT_A_LIST.to_string()));
        }
        for item in &input.items {
            validate_non_negative("quantity", Decimal::from(item.quantity))?;
            validate_non_negative("weight", item.weight)?;
            validate_non_negative("price", item.price)?;
        }

        let total_weight = consignment_weight(input.items.iter().map(|i| i.weight));
        let shipping_cost = shipping_cost_for(total_weight, &input.location_type)?;
        let delivery_date = Utc::now() + Duration::days(DELIVERY_SLA_DAYS);

        let mut tx = self.db.begin().await?;

        let mut order = sqlx::query_as::<_, Order>(&format!(
            r#"
            INSERT INTO orders (
                customer_id, courier_service_id, shipping_address, pin_code, phone_number,
                consignment_weight, shipping_cost, delivery_date, status
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            RETURNING {}
            "#,
            ORDER_COLUMNS
        ))
        .bind(input.customer_id)
        .bind(input.courier_service_id)
        .bind(&input.shipping_address)
        .bind(&input.pin_code)
        .bind(&input.phone_number)
        .bind(total_weight)
        .bind(shipping_cost)
        .bind(delivery_date)
        .bind(OrderStatus::default())
        .fetch_one(&mut *tx)
        .await?;

        for item in input.items {
            // No floor in code; the CHECK on stocks.quantity rejects oversells
            let stock_name = sqlx::query_scalar::<_, String>(
                r#"
                UPDATE stocks
                SET quantity = quantity - $1, updated_at = NOW()
                WHERE id = $2
                RETURNING name
                "#,
            )
            .bind(item.quantity)
            .bind(item.stock_id)
            .fetch_optional(&mut *tx)
            .await
            .map_err(|e| {
                AppError::on_check_violation(e, || {
                    format!("Insufficient quantity for stock {}", item.stock_id)
                })
            })?
            .ok_or_else(|| AppError::NotFound("Stock".to_string()))?;

            tracing::debug!(
                order_id = order.id,
                stock_id = item.stock_id,
                quantity = item.quantity,
                "stock decremented"
            );

            let order_item = sqlx::query_as::<_, OrderItem>(
                r#"
                INSERT INTO order_items (order_id, stock_id, product_name, quantity, weight, price)
                VALUES ($1, $2, $3, $4, $5, $6)
                RETURNING id, order_id, stock_id, product_name, quantity, weight, price
                "#,
            )
            .bind(order.id)
            .bind(item.stock_id)
            .bind(item.product_name.unwrap_or(stock_name))
            .bind(item.quantity)
            .bind(item.weight)
            .bind(item.price)
            .fetch_one(&mut *tx)
            .await?;

            order.items.push(order_item);
        }

        tx.commit().await?;

        tracing::info!(
            order_id = order.id,
            customer_id = order.customer_id,
            items = order.items.len(),
            %shipping_cost,
            "order created"
        );
        Ok(order)
    }

    /// Orders visible to the caller, items embedded
    pub async fn list_orders(&self, scope: OrderScope) -> AppResult<Vec<Order>> {
        let mut orders = sqlx::query_as::<_, Order>(&format!(
            "SELECT {} FROM orders WHERE {} = $1 ORDER BY created_at DESC, id DESC",
            ORDER_COLUMNS,
            scope.column()
        ))
        .bind(scope.user_id())
        .fetch_all(&self.db)
        .await?;

        self.attach_items(&mut orders).await?;
        Ok(orders)
    }

    /// A single order visible to the caller
    pub async fn get_order(&self, scope: OrderScope, order_id: i64) -> AppResult<Order> {
        let order = self.find_order(scope, order_id).await?;
        let mut orders = vec![order];
        self.attach_items(&mut orders).await?;
        orders
            .pop()
            .ok_or_else(|| AppError::NotFound("Order".to_string()))
    }

    /// Apply a patch; a status change writes one notification for the customer
    pub async fn update_order(
        &self,
        scope: OrderScope,
        order_id: i64,
        input: UpdateOrderInput,
    ) -> AppResult<Order> {
        let status = input
            .status
            .as_deref()
            .map(OrderStatus::from_str)
            .transpose()?;

        let mut tx = self.db.begin().await?;

        if let Some(courier_id) = input.courier_service_id {
            let is_courier = sqlx::query_scalar::<_, bool>(
                "SELECT EXISTS (SELECT 1 FROM users WHERE id = $1 AND role = $2)",
            )
            .bind(courier_id)
            .bind(Role::CourierService)
            .fetch_one(&mut *tx)
            .await?;
            if !is_courier {
                return Err(AppError::NotFound("Courier service".to_string()));
            }
        }

        let current = sqlx::query_as::<_, Order>(&format!(
            "SELECT {} FROM orders WHERE id = $1 AND {} = $2 FOR UPDATE",
            ORDER_COLUMNS,
            scope.column()
        ))
        .bind(order_id)
        .bind(scope.user_id())
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| AppError::NotFound("Order".to_string()))?;

        let order = sqlx::query_as::<_, Order>(&format!(
            r#"
            UPDATE orders SET
                shipping_address = COALESCE($2, shipping_address),
                pin_code = COALESCE($3, pin_code),
                phone_number = COALESCE($4, phone_number),
                courier_service_id = COALESCE($5, courier_service_id),
                delivery_date = COALESCE($6, delivery_date),
                status = COALESCE($7, status),
                updated_at = NOW()
            WHERE id = $1
            RETURNING {}
            "#,
            ORDER_COLUMNS
        ))
        .bind(order_id)
        .bind(&input.shipping_address)
        .bind(&input.pin_code)
        .bind(&input.phone_number)
        .bind(input.courier_service_id)
        .bind(input.delivery_date)
        .bind(status)
        .fetch_one(&mut *tx)
        .await?;

        if order.status != current.status {
            create_notification(
                &mut *tx,
                order.customer_id,
                order_status_content(order.id, order.status),
            )
            .await?;
            tracing::info!(
                order_id = order.id,
                from = %current.status,
                to = %order.status,
                "order status changed"
            );
        }

        tx.commit().await?;
        Ok(order)
    }

    /// Delete an order and its items
    pub async fn delete_order(&self, scope: OrderScope, order_id: i64) -> AppResult<()> {
        let result = sqlx::query(&format!(
            "DELETE FROM orders WHERE id = $1 AND {} = $2",
            scope.column()
        ))
        .bind(order_id)
        .bind(scope.user_id())
        .execute(&self.db)
        .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("Order".to_string()));
        }

        tracing::info!(order_id, "order deleted");
        Ok(())
    }

    async fn find_order(&self, scope: OrderScope, order_id: i64) -> AppResult<Order> {
        sqlx::query_as::<_, Order>(&format!(
            "SELECT {} FROM orders WHERE id = $1 AND {} = $2",
            ORDER_COLUMNS,
            scope.column()
        ))
        .bind(order_id)
        .bind(scope.user_id())
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Order".to_string()))
    }

    async fn attach_items(&self, orders: &mut [Order]) -> AppResult<()> {
        if orders.is_empty() {
            return Ok(());
        }

        let ids: Vec<i64> = orders.iter().map(|o| o.id).collect();
        let items = sqlx::query_as::<_, OrderItem>(
            r#"
            SELECT id, order_id, stock_id, product_name, quantity, weight, price
            FROM order_items
            WHERE order_id = ANY($1)
            ORDER BY id
            "#,
        )
        .bind(&ids)
        .fetch_all(&self.db)
        .await?;

        let mut by_order: HashMap<i64, Vec<OrderItem>> = HashMap::new();
        for item in items {
            by_order.entry(item.order_id).or_default().push(item);
        }
        for order in orders.iter_mut() {
            order.items = by_order.remove(&order.id).unwrap_or_default();
        }
        Ok(())
    }
}

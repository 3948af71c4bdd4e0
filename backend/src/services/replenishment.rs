//! Replenishment workflow service
//!
//! Inventory managers place restocking orders with a supplier; suppliers move
//! them through delivery. Placing an order draws the requested quantity from
//! the supplier's product listing.

use std::collections::HashMap;

use rust_decimal::Decimal;
use serde::Deserialize;
use shared::{
    parse_delivery_time, validate_non_negative, ReplenishmentOrder, ReplenishmentOrderItem,
    ReplenishmentStatus, Role,
};
use sqlx::PgPool;

use crate::error::{AppError, AppResult};
use crate::middleware::AuthUser;
use crate::services::notification::{create_notification, replenishment_status_content};

/// Top-level keys a replenishment payload must carry
pub const REPLENISHMENT_REQUIRED_FIELDS: &[&str] = &[
    "inventory_manager_id",
    "supplier_id",
    "address",
    "mobile_number",
    "items",
];

/// Keys every replenishment item must carry
pub const REPLENISHMENT_ITEM_REQUIRED_FIELDS: &[&str] =
    &["product_id", "product_name", "quantity", "weight", "price"];

const ORDER_COLUMNS: &str = "id, inventory_manager_id, supplier_id, address, mobile_number, \
     status, expected_delivery_time, created_at, updated_at";

/// Replenishment service
#[derive(Clone)]
pub struct ReplenishmentService {
    db: PgPool,
}

/// Input for placing a replenishment order
#[derive(Debug, Deserialize)]
pub struct CreateReplenishmentInput {
    pub inventory_manager_id: i64,
    pub supplier_id: i64,
    pub address: String,
    pub mobile_number: String,
    pub items: Vec<ReplenishmentItemInput>,
}

#[derive(Debug, Deserialize)]
pub struct ReplenishmentItemInput {
    pub product_id: i64,
    pub product_name: String,
    pub quantity: i32,
    pub weight: Decimal,
    pub price: Decimal,
}

/// Fields a supplier may change on a replenishment order
#[derive(Debug, Default, Deserialize)]
pub struct UpdateReplenishmentInput {
    pub address: Option<String>,
    pub mobile_number: Option<String>,
    pub status: Option<String>,
    pub expected_delivery_time: Option<String>,
}

impl ReplenishmentService {
    /// Create a new ReplenishmentService instance
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// Place a replenishment order; every item is checked before anything is written
    pub async fn place_order(
        &self,
        input: CreateReplenishmentInput,
    ) -> AppResult<ReplenishmentOrder> {
        if input.items.is_empty() {
            return Err(AppError::Validation(shared::ITEMS_NOT_A_LIST.to_string()));
        }
        for item in &input.items {
            validate_non_negative("quantity", Decimal::from(item.quantity))?;
            validate_non_negative("weight", item.weight)?;
            validate_non_negative("price", item.price)?;
        }

        let mut tx = self.db.begin().await?;

        let mut order = sqlx::query_as::<_, ReplenishmentOrder>(&format!(
            r#"
            INSERT INTO replenishment_orders (
                inventory_manager_id, supplier_id, address, mobile_number, status
            )
            VALUES ($1, $2, $3, $4, $5)
            RETURNING {}
            "#,
            ORDER_COLUMNS
        ))
        .bind(input.inventory_manager_id)
        .bind(input.supplier_id)
        .bind(&input.address)
        .bind(&input.mobile_number)
        .bind(ReplenishmentStatus::default())
        .fetch_one(&mut *tx)
        .await?;

        for item in input.items {
            // Unknown products are reported before the item row hits the foreign key
            let decremented = sqlx::query("UPDATE products SET quantity = quantity - $1 WHERE id = $2")
                .bind(item.quantity)
                .bind(item.product_id)
                .execute(&mut *tx)
                .await
                .map_err(|e| {
                    AppError::on_check_violation(e, || {
                        format!("Insufficient quantity for product {}", item.product_id)
                    })
                })?;
            if decremented.rows_affected() == 0 {
                return Err(AppError::NotFound("Product".to_string()));
            }

            let item_row = sqlx::query_as::<_, ReplenishmentOrderItem>(
                r#"
                INSERT INTO replenishment_order_items (
                    replenishment_order_id, product_id, product_name, quantity, weight, price
                )
                VALUES ($1, $2, $3, $4, $5, $6)
                RETURNING id, replenishment_order_id, product_id, product_name, quantity, weight, price
                "#,
            )
            .bind(order.id)
            .bind(item.product_id)
            .bind(&item.product_name)
            .bind(item.quantity)
            .bind(item.weight)
            .bind(item.price)
            .fetch_one(&mut *tx)
            .await?;

            order.items.push(item_row);
        }

        tx.commit().await?;

        tracing::info!(
            replenishment_order_id = order.id,
            supplier_id = input.supplier_id,
            items = order.items.len(),
            "replenishment order placed"
        );
        Ok(order)
    }

    /// Managers see every order, suppliers the ones addressed to them
    pub async fn list_orders(&self, user: &AuthUser) -> AppResult<Vec<ReplenishmentOrder>> {
        let mut orders = match user.role {
            Role::InventoryManager => {
                sqlx::query_as::<_, ReplenishmentOrder>(&format!(
                    "SELECT {} FROM replenishment_orders ORDER BY created_at DESC, id DESC",
                    ORDER_COLUMNS
                ))
                .fetch_all(&self.db)
                .await?
            }
            Role::Supplier => {
                sqlx::query_as::<_, ReplenishmentOrder>(&format!(
                    "SELECT {} FROM replenishment_orders WHERE supplier_id = $1 \
                     ORDER BY created_at DESC, id DESC",
                    ORDER_COLUMNS
                ))
                .bind(user.user_id)
                .fetch_all(&self.db)
                .await?
            }
            _ => return Err(AppError::Forbidden),
        };

        self.attach_items(&mut orders).await?;
        Ok(orders)
    }

    /// Apply a supplier's patch; a status change notifies the placing manager
    pub async fn update_order(
        &self,
        supplier_id: i64,
        order_id: i64,
        input: UpdateReplenishmentInput,
    ) -> AppResult<ReplenishmentOrder> {
        let status = input
            .status
            .as_deref()
            .map(str::parse::<ReplenishmentStatus>)
            .transpose()?;
        let expected_delivery_time = input
            .expected_delivery_time
            .as_deref()
            .map(parse_delivery_time)
            .transpose()?;

        let mut tx = self.db.begin().await?;

        let previous_status = sqlx::query_scalar::<_, ReplenishmentStatus>(
            "SELECT status FROM replenishment_orders WHERE id = $1 AND supplier_id = $2 FOR UPDATE",
        )
        .bind(order_id)
        .bind(supplier_id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| AppError::NotFound("Order".to_string()))?;

        let mut order = sqlx::query_as::<_, ReplenishmentOrder>(&format!(
            r#"
            UPDATE replenishment_orders SET
                address = COALESCE($2, address),
                mobile_number = COALESCE($3, mobile_number),
                status = COALESCE($4, status),
                expected_delivery_time = COALESCE($5, expected_delivery_time),
                updated_at = NOW()
            WHERE id = $1
            RETURNING {}
            "#,
            ORDER_COLUMNS
        ))
        .bind(order_id)
        .bind(&input.address)
        .bind(&input.mobile_number)
        .bind(status)
        .bind(expected_delivery_time)
        .fetch_one(&mut *tx)
        .await?;

        if order.status != previous_status {
            create_notification(
                &mut *tx,
                order.inventory_manager_id,
                replenishment_status_content(order.id, order.status),
            )
            .await?;
            tracing::info!(
                replenishment_order_id = order.id,
                from = %previous_status,
                to = %order.status,
                "replenishment status changed"
            );
        }

        tx.commit().await?;

        let mut orders = vec![order];
        self.attach_items(&mut orders).await?;
        order = orders
            .pop()
            .ok_or_else(|| AppError::NotFound("Order".to_string()))?;
        Ok(order)
    }

    async fn attach_items(&self, orders: &mut [ReplenishmentOrder]) -> AppResult<()> {
        if orders.is_empty() {
            return Ok(());
        }

        let ids: Vec<i64> = orders.iter().map(|o| o.id).collect();
        let items = sqlx::query_as::<_, ReplenishmentOrderItem>(
            r#"
            SELECT id, replenishment_order_id, product_id, product_name, quantity, weight, price
            FROM replenishment_order_items
            WHERE replenishment_order_id = ANY($1)
            ORDER BY id
            "#,
        )
        .bind(&ids)
        .fetch_all(&self.db)
        .await?;

        let mut by_order: HashMap<i64, Vec<ReplenishmentOrderItem>> = HashMap::new();
        for item in items {
            by_order
                .entry(item.replenishment_order_id)
                .or_default()
                .push(item);
        }
        for order in orders.iter_mut() {
            order.items = by_order.remove(&order.id).unwrap_or_default();
        }
        Ok(())
    }
}

//! Customer shipping orders

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::types::OrderStatus;

/// A customer shipping order
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Order {
    pub id: i64,
    pub customer_id: i64,
    pub courier_service_id: Option<i64>,
    pub shipping_address: String,
    pub pin_code: String,
    pub phone_number: String,
    /// Sum of the line weights when the order was placed
    pub consignment_weight: Decimal,
    pub shipping_cost: Decimal,
    pub delivery_date: DateTime<Utc>,
    pub status: OrderStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[cfg_attr(feature = "sqlx", sqlx(skip))]
    #[serde(default)]
    pub items: Vec<OrderItem>,
}

/// One line of an order. `product_name` is a snapshot taken at order time.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct OrderItem {
    pub id: i64,
    pub order_id: i64,
    pub stock_id: Option<i64>,
    pub product_name: String,
    pub quantity: i32,
    pub weight: Decimal,
    pub price: Decimal,
}

//! Warehouse stock and supplier products

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A stock line held by an inventory manager and sold to customers
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Stock {
    pub id: i64,
    pub inventory_manager_id: i64,
    pub name: String,
    pub price: Decimal,
    pub quantity: i32,
    pub weight: Decimal,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A product a supplier offers for replenishment
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Product {
    pub id: i64,
    pub supplier_id: i64,
    pub name: String,
    pub price: Decimal,
    pub weight: Decimal,
    pub quantity: i32,
    pub created_at: DateTime<Utc>,
}

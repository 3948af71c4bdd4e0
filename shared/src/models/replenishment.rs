//! Replenishment (restocking) orders raised by inventory managers

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::types::ReplenishmentStatus;

/// A supplier-fulfilled restocking request
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct ReplenishmentOrder {
    pub id: i64,
    pub inventory_manager_id: i64,
    pub supplier_id: Option<i64>,
    pub address: String,
    pub mobile_number: String,
    pub status: ReplenishmentStatus,
    pub expected_delivery_time: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[cfg_attr(feature = "sqlx", sqlx(skip))]
    #[serde(default)]
    pub items: Vec<ReplenishmentOrderItem>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct ReplenishmentOrderItem {
    pub id: i64,
    pub replenishment_order_id: i64,
    pub product_id: Option<i64>,
    pub product_name: String,
    pub quantity: i32,
    pub weight: Decimal,
    pub price: Decimal,
}

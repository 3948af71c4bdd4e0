//! Common types used across the platform

use std::fmt;
use std::str::FromStr;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::validation::ValidationError;

/// Account role, fixed when the user is created
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(type_name = "user_role"))]
pub enum Role {
    #[serde(rename = "Inventory Manager")]
    #[cfg_attr(feature = "sqlx", sqlx(rename = "Inventory Manager"))]
    InventoryManager,
    #[serde(rename = "Customer")]
    #[cfg_attr(feature = "sqlx", sqlx(rename = "Customer"))]
    Customer,
    #[serde(rename = "Supplier")]
    #[cfg_attr(feature = "sqlx", sqlx(rename = "Supplier"))]
    Supplier,
    #[serde(rename = "Courier Service")]
    #[cfg_attr(feature = "sqlx", sqlx(rename = "Courier Service"))]
    CourierService,
}

impl Role {
    pub const ALL: [Role; 4] = [
        Role::InventoryManager,
        Role::Customer,
        Role::Supplier,
        Role::CourierService,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::InventoryManager => "Inventory Manager",
            Role::Customer => "Customer",
            Role::Supplier => "Supplier",
            Role::CourierService => "Courier Service",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Role::ALL
            .into_iter()
            .find(|r| r.as_str() == s)
            .ok_or_else(|| {
                ValidationError::new(format!(
                    "Invalid role. Must be one of: {}",
                    join_names(Role::ALL.iter().map(Role::as_str))
                ))
            })
    }
}

/// Customer order status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(type_name = "order_status"))]
pub enum OrderStatus {
    #[default]
    #[serde(rename = "Processing")]
    #[cfg_attr(feature = "sqlx", sqlx(rename = "Processing"))]
    Processing,
    #[serde(rename = "In Transit")]
    #[cfg_attr(feature = "sqlx", sqlx(rename = "In Transit"))]
    InTransit,
    #[serde(rename = "Delivered")]
    #[cfg_attr(feature = "sqlx", sqlx(rename = "Delivered"))]
    Delivered,
}

impl OrderStatus {
    pub const ALL: [OrderStatus; 3] = [
        OrderStatus::Processing,
        OrderStatus::InTransit,
        OrderStatus::Delivered,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Processing => "Processing",
            OrderStatus::InTransit => "In Transit",
            OrderStatus::Delivered => "Delivered",
        }
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OrderStatus {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        OrderStatus::ALL
            .into_iter()
            .find(|st| st.as_str() == s)
            .ok_or_else(|| {
                ValidationError::new(format!(
                    "Invalid status. Must be one of: {}",
                    join_names(OrderStatus::ALL.iter().map(OrderStatus::as_str))
                ))
            })
    }
}

/// Supplier-side replenishment order status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(type_name = "replenishment_status"))]
pub enum ReplenishmentStatus {
    #[default]
    #[serde(rename = "Order Received")]
    #[cfg_attr(feature = "sqlx", sqlx(rename = "Order Received"))]
    OrderReceived,
    #[serde(rename = "Processing")]
    #[cfg_attr(feature = "sqlx", sqlx(rename = "Processing"))]
    Processing,
    #[serde(rename = "In Transit")]
    #[cfg_attr(feature = "sqlx", sqlx(rename = "In Transit"))]
    InTransit,
    #[serde(rename = "Delivered")]
    #[cfg_attr(feature = "sqlx", sqlx(rename = "Delivered"))]
    Delivered,
    #[serde(rename = "Delayed")]
    #[cfg_attr(feature = "sqlx", sqlx(rename = "Delayed"))]
    Delayed,
    #[serde(rename = "Canceled")]
    #[cfg_attr(feature = "sqlx", sqlx(rename = "Canceled"))]
    Canceled,
}

impl ReplenishmentStatus {
    pub const ALL: [ReplenishmentStatus; 6] = [
        ReplenishmentStatus::OrderReceived,
        ReplenishmentStatus::Processing,
        ReplenishmentStatus::InTransit,
        ReplenishmentStatus::Delivered,
        ReplenishmentStatus::Delayed,
        ReplenishmentStatus::Canceled,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ReplenishmentStatus::OrderReceived => "Order Received",
            ReplenishmentStatus::Processing => "Processing",
            ReplenishmentStatus::InTransit => "In Transit",
            ReplenishmentStatus::Delivered => "Delivered",
            ReplenishmentStatus::Delayed => "Delayed",
            ReplenishmentStatus::Canceled => "Canceled",
        }
    }
}

impl fmt::Display for ReplenishmentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ReplenishmentStatus {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ReplenishmentStatus::ALL
            .into_iter()
            .find(|st| st.as_str() == s)
            .ok_or_else(|| {
                ValidationError::new(format!(
                    "Invalid status. Must be one of: {}",
                    join_names(ReplenishmentStatus::ALL.iter().map(ReplenishmentStatus::as_str))
                ))
            })
    }
}

/// Delivery zone driving the shipping surcharge
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LocationType {
    Urban,
    Suburban,
    Rural,
}

impl LocationType {
    pub const ALL: [LocationType; 3] = [
        LocationType::Urban,
        LocationType::Suburban,
        LocationType::Rural,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            LocationType::Urban => "urban",
            LocationType::Suburban => "suburban",
            LocationType::Rural => "rural",
        }
    }

    /// Flat surcharge added on top of the per-kg cost
    pub fn surcharge(&self) -> Decimal {
        match self {
            LocationType::Urban => Decimal::new(50, 1),
            LocationType::Suburban => Decimal::new(70, 1),
            LocationType::Rural => Decimal::new(100, 1),
        }
    }
}

impl FromStr for LocationType {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        LocationType::ALL
            .into_iter()
            .find(|l| l.as_str() == s)
            .ok_or_else(|| {
                ValidationError::new(format!(
                    "Invalid location_type. Must be one of: {}",
                    join_names(LocationType::ALL.iter().map(LocationType::as_str))
                ))
            })
    }
}

/// Inclusive date range for report queries
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    pub start: chrono::NaiveDate,
    pub end: chrono::NaiveDate,
}

impl DateRange {
    /// Whether a date falls inside the range, both ends included
    pub fn contains(&self, date: chrono::NaiveDate) -> bool {
        date >= self.start && date <= self.end
    }
}

fn join_names<'a>(names: impl Iterator<Item = &'a str>) -> String {
    names.collect::<Vec<_>>().join(", ")
}

//! Validation and pricing rules for the logistics platform
//!
//! Everything here is pure: the backend feeds request data in and maps
//! [`ValidationError`] onto a 400 response.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use rust_decimal::Decimal;
use serde_json::{Map, Value};
use thiserror::Error;

use crate::types::{DateRange, LocationType};

/// A request failed a validation rule. The message is shown to the client.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{0}")]
pub struct ValidationError(pub String);

impl ValidationError {
    pub fn new(message: impl Into<String>) -> Self {
        Self(message.into())
    }
}

pub const PAYLOAD_MISSING: &str = "Request payload is missing";
pub const ITEMS_NOT_A_LIST: &str = "The items field must be a non-empty list";
pub const REPORT_DATES_REQUIRED: &str =
    "startDate and endDate are required query parameters. Please provide both.";
pub const REPORT_DATE_FORMAT: &str =
    "Invalid date format. Please provide dates in the format YYYY-MM-DD.";
pub const REPORT_DATE_ORDER: &str = "startDate must not be after endDate.";

/// Strict wire format for replenishment delivery times, e.g. `2024-05-01T10:30:00.000Z`
pub const DELIVERY_TIME_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.fZ";

// ============================================================================
// Shipping
// ============================================================================

/// Flat per-kilogram rate applied to the consignment weight
pub fn cost_per_kg() -> Decimal {
    Decimal::new(20, 1)
}

/// Number of days between order creation and promised delivery
pub const DELIVERY_SLA_DAYS: i64 = 3;

/// Consignment weight is the plain sum of the line weights
pub fn consignment_weight<I>(weights: I) -> Decimal
where
    I: IntoIterator<Item = Decimal>,
{
    weights.into_iter().sum()
}

/// Shipping cost = cost_per_kg × weight + zone surcharge
pub fn calculate_shipping_cost(
    total_weight: Decimal,
    location: LocationType,
) -> Result<Decimal, ValidationError> {
    if total_weight <= Decimal::ZERO {
        return Err(ValidationError::new(
            "total_weight must be greater than zero",
        ));
    }
    Ok(cost_per_kg() * total_weight + location.surcharge())
}

/// Same as [`calculate_shipping_cost`] but takes the raw zone name from the request
pub fn shipping_cost_for(
    total_weight: Decimal,
    location_type: &str,
) -> Result<Decimal, ValidationError> {
    let location = location_type.parse::<LocationType>()?;
    calculate_shipping_cost(total_weight, location)
}

// ============================================================================
// Payload validation
// ============================================================================

/// Unwrap a JSON body into its object, treating `null`, non-objects and `{}` as absent
pub fn require_payload(payload: Value) -> Result<Map<String, Value>, ValidationError> {
    match payload {
        Value::Object(map) if !map.is_empty() => Ok(map),
        _ => Err(ValidationError::new(PAYLOAD_MISSING)),
    }
}

/// Names from `required` that are not keys of `object`, in the order given
pub fn missing_fields<'a>(object: &Map<String, Value>, required: &[&'a str]) -> Vec<&'a str> {
    required
        .iter()
        .copied()
        .filter(|field| !object.contains_key(*field))
        .collect()
}

/// Fail with `Missing required fields: a, b` when any key is absent
pub fn require_fields(object: &Map<String, Value>, required: &[&str]) -> Result<(), ValidationError> {
    let missing = missing_fields(object, required);
    if missing.is_empty() {
        Ok(())
    } else {
        Err(ValidationError::new(format!(
            "Missing required fields: {}",
            missing.join(", ")
        )))
    }
}

/// Check the `items` array of an order payload: non-empty list, every entry carrying `required`
pub fn require_items(object: &Map<String, Value>, required: &[&str]) -> Result<(), ValidationError> {
    let items = match object.get("items").and_then(Value::as_array) {
        Some(items) if !items.is_empty() => items,
        _ => return Err(ValidationError::new(ITEMS_NOT_A_LIST)),
    };

    for item in items {
        let Some(item) = item.as_object() else {
            return Err(ValidationError::new(ITEMS_NOT_A_LIST));
        };
        let missing = missing_fields(item, required);
        if !missing.is_empty() {
            return Err(ValidationError::new(format!(
                "Missing required fields in items: {}",
                missing.join(", ")
            )));
        }
    }
    Ok(())
}

/// Quantities, prices and weights entered by hand must not be negative
pub fn validate_non_negative(field: &str, value: Decimal) -> Result<(), ValidationError> {
    if value < Decimal::ZERO {
        return Err(ValidationError::new(format!("{} cannot be negative", field)));
    }
    Ok(())
}

/// Validate email format (basic check)
pub fn validate_email(email: &str) -> Result<(), ValidationError> {
    let Some((local, domain)) = email.split_once('@') else {
        return Err(ValidationError::new("Invalid email format"));
    };
    if local.is_empty() || !domain.contains('.') || domain.starts_with('.') || domain.ends_with('.') {
        return Err(ValidationError::new("Invalid email format"));
    }
    Ok(())
}

// ============================================================================
// Dates
// ============================================================================

/// Parse the `startDate`/`endDate` pair every report endpoint takes
pub fn parse_report_range(
    start: Option<&str>,
    end: Option<&str>,
) -> Result<DateRange, ValidationError> {
    let (Some(start), Some(end)) = (
        start.filter(|s| !s.is_empty()),
        end.filter(|s| !s.is_empty()),
    ) else {
        return Err(ValidationError::new(REPORT_DATES_REQUIRED));
    };

    let parse = |s: &str| {
        NaiveDate::parse_from_str(s, "%Y-%m-%d")
            .map_err(|_| ValidationError::new(REPORT_DATE_FORMAT))
    };
    let range = DateRange {
        start: parse(start)?,
        end: parse(end)?,
    };

    if range.start > range.end {
        return Err(ValidationError::new(REPORT_DATE_ORDER));
    }
    Ok(range)
}

/// Parse a replenishment `expected_delivery_time`; the fractional seconds are mandatory
pub fn parse_delivery_time(value: &str) -> Result<DateTime<Utc>, ValidationError> {
    let invalid = || {
        ValidationError::new(
            "Invalid date format for expected_delivery_time. Expected format: YYYY-MM-DDTHH:MM:SS.sssZ",
        )
    };
    if !value.contains('.') {
        return Err(invalid());
    }
    NaiveDateTime::parse_from_str(value, DELIVERY_TIME_FORMAT)
        .map(|naive| naive.and_utc())
        .map_err(|_| invalid())
}

//! HTTP request handlers

pub mod analytics;
pub mod auth;
pub mod health;
pub mod notification;
pub mod order;
pub mod replenishment;
pub mod stock;
pub mod supplier;

pub use analytics::*;
pub use auth::*;
pub use health::*;
pub use notification::*;
pub use order::*;
pub use replenishment::*;
pub use stock::*;
pub use supplier::*;

use serde::Serialize;

/// Body for endpoints that only report an outcome
#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

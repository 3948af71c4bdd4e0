//! Business logic services for the RapidXcel logistics platform

pub mod analytics;
pub mod auth;
pub mod notification;
pub mod order;
pub mod replenishment;
pub mod stock;
pub mod supplier;

pub use analytics::AnalyticsService;
pub use auth::AuthService;
pub use notification::NotificationService;
pub use order::OrderService;
pub use replenishment::ReplenishmentService;
pub use stock::StockService;
pub use supplier::SupplierService;

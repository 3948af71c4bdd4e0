//! Domain models for the logistics platform

mod notification;
mod order;
mod replenishment;
mod stock;
mod user;

pub use notification::*;
pub use order::*;
pub use replenishment::*;
pub use stock::*;
pub use user::*;

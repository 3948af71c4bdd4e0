//! Shared types and models for the RapidXcel logistics platform
//!
//! Domain entities, role/status vocabularies and the pure business rules
//! (shipping cost, payload and date validation) used by the backend.

pub mod models;
pub mod types;
pub mod validation;

pub use models::*;
pub use types::*;
pub use validation::*;

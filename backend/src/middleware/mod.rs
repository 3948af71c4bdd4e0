//! Request middleware: authentication and role-based access

pub mod access;
pub mod auth;

pub use access::enforce_access_policy;
pub use auth::{auth_middleware, AuthUser, CurrentUser};

//! In-app notifications

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A message shown in a user's notification feed. Never modified after insert.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Notification {
    pub id: i64,
    pub user_id: i64,
    pub title: String,
    pub message: String,
    pub created_at: DateTime<Utc>,
}

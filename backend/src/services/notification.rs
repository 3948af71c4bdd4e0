//! In-app notification feed
//!
//! Notifications are written in the same transaction as the status change
//! that triggers them, and never updated afterwards.

use shared::{Notification, OrderStatus, ReplenishmentStatus};
use sqlx::{PgConnection, PgPool};

use crate::error::AppResult;

/// Notification service for reading a user's feed
#[derive(Clone)]
pub struct NotificationService {
    db: PgPool,
}

/// Title and body of a notification about to be written
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotificationContent {
    pub title: String,
    pub message: String,
}

/// Copy sent to a customer when their order changes status
pub fn order_status_content(order_id: i64, status: OrderStatus) -> NotificationContent {
    let message = match status {
        OrderStatus::Processing => format!(
            "Your order #{} is being processed and will be handed to the courier soon.",
            order_id
        ),
        OrderStatus::InTransit => format!(
            "Good news! Your order #{} is on its way.",
            order_id
        ),
        OrderStatus::Delivered => format!(
            "Your order #{} has been delivered. Thank you for shipping with RapidXcel!",
            order_id
        ),
    };

    NotificationContent {
        title: format!("Order #{} {}", order_id, status),
        message,
    }
}

/// Copy sent to the inventory manager when a supplier moves a replenishment order
pub fn replenishment_status_content(order_id: i64, status: ReplenishmentStatus) -> NotificationContent {
    let message = match status {
        ReplenishmentStatus::Delivered => format!(
            "Replenishment order #{} has been delivered by the supplier.",
            order_id
        ),
        ReplenishmentStatus::Delayed => format!(
            "Replenishment order #{} has been delayed by the supplier.",
            order_id
        ),
        ReplenishmentStatus::Canceled => format!(
            "Replenishment order #{} was canceled by the supplier.",
            order_id
        ),
        other => format!(
            "The status of replenishment order #{} was updated to {}.",
            order_id, other
        ),
    };

    NotificationContent {
        title: format!("Replenishment order #{} {}", order_id, status),
        message,
    }
}

/// Insert a notification on an open connection or transaction
pub async fn create_notification(
    conn: &mut PgConnection,
    user_id: i64,
    content: NotificationContent,
) -> AppResult<Notification> {
    let notification = sqlx::query_as::<_, Notification>(
        r#"
        INSERT INTO notifications (user_id, title, message)
        VALUES ($1, $2, $3)
        RETURNING id, user_id, title, message, created_at
        "#,
    )
    .bind(user_id)
    .bind(&content.title)
    .bind(&content.message)
    .fetch_one(conn)
    .await?;

    tracing::debug!(user_id, notification_id = notification.id, "notification created");
    Ok(notification)
}

impl NotificationService {
    /// Create a new NotificationService instance
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// The user's notifications, newest first
    pub async fn list_for_user(&self, user_id: i64) -> AppResult<Vec<Notification>> {
        let notifications = sqlx::query_as::<_, Notification>(
            r#"
            SELECT id, user_id, title, message, created_at
            FROM notifications
            WHERE user_id = $1
            ORDER BY created_at DESC, id DESC
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.db)
        .await?;

        Ok(notifications)
    }
}

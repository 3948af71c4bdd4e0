//! HTTP handlers for the notification feed

use axum::{extract::State, Json};
use shared::Notification;

use crate::error::AppResult;
use crate::middleware::CurrentUser;
use crate::services::NotificationService;
use crate::AppState;

/// The caller's notifications, newest first
pub async fn list_notifications(
    State(state): State<AppState>,
    current_user: CurrentUser,
) -> AppResult<Json<Vec<Notification>>> {
    let service = NotificationService::new(state.db);
    let notifications = service.list_for_user(current_user.0.user_id).await?;
    Ok(Json(notifications))
}

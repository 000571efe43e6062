//! Admin messaging and notifications.

use axum::{
    Json,
    extract::State,
    http::StatusCode,
};
use brandshop_core::{MessageDirection, UserId};
use serde::Deserialize;
use tracing::instrument;

use crate::error::{ApiJson, ApiPath, Result};
use crate::middleware::RequireAdmin;
use crate::models::{MessageView, NotificationView};
use crate::services::MessagingService;
use crate::state::AppState;

/// Message to a customer.
#[derive(Debug, Deserialize)]
pub struct AdminMessageRequest {
    pub user_id: UserId,
    pub content: String,
}

/// Notification to post. `is_global` overrides `user_id`.
#[derive(Debug, Deserialize)]
pub struct NotificationRequest {
    pub content: String,
    #[serde(default)]
    pub user_id: Option<UserId>,
    #[serde(default)]
    pub is_global: bool,
}

/// `POST /api/admin/messages`
#[instrument(skip_all, fields(admin_id = %admin))]
pub async fn send(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    ApiJson(body): ApiJson<AdminMessageRequest>,
) -> Result<(StatusCode, Json<MessageView>)> {
    let message = MessagingService::new(state.pool())
        .send(body.user_id, MessageDirection::ToUser, &body.content)
        .await?;
    Ok((StatusCode::CREATED, Json(message.into())))
}

/// `GET /api/admin/messages/{user_id}`
#[instrument(skip_all, fields(user_id = user_id))]
pub async fn conversation(
    State(state): State<AppState>,
    _admin: RequireAdmin,
    ApiPath(user_id): ApiPath<i32>,
) -> Result<Json<Vec<MessageView>>> {
    let thread = MessagingService::new(state.pool())
        .conversation(UserId::new(user_id))
        .await?;
    Ok(Json(thread.into_iter().map(MessageView::from).collect()))
}

/// `POST /api/admin/notifications`
#[instrument(skip_all, fields(admin_id = %admin))]
pub async fn notify(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    ApiJson(body): ApiJson<NotificationRequest>,
) -> Result<(StatusCode, Json<NotificationView>)> {
    let notification = MessagingService::new(state.pool())
        .notify(&body.content, body.user_id, body.is_global)
        .await?;
    Ok((StatusCode::CREATED, Json(notification.into())))
}

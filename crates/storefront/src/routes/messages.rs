//! Customer messaging and notification handlers.

use axum::{Json, extract::State, http::StatusCode};
use brandshop_core::MessageDirection;
use serde::Deserialize;
use tracing::instrument;

use crate::error::{ApiJson, Result};
use crate::middleware::RequireUser;
use crate::models::{MessageView, NotificationView};
use crate::services::MessagingService;
use crate::state::AppState;

/// Message to the store.
#[derive(Debug, Deserialize)]
pub struct SendMessageRequest {
    pub content: String,
}

/// `GET /api/messages`
#[instrument(skip_all, fields(user_id = %user.id))]
pub async fn index(
    State(state): State<AppState>,
    RequireUser(user): RequireUser,
) -> Result<Json<Vec<MessageView>>> {
    let thread = MessagingService::new(state.pool())
        .conversation(user.id)
        .await?;
    Ok(Json(thread.into_iter().map(MessageView::from).collect()))
}

/// `POST /api/messages`
#[instrument(skip_all, fields(user_id = %user.id))]
pub async fn create(
    State(state): State<AppState>,
    RequireUser(user): RequireUser,
    ApiJson(body): ApiJson<SendMessageRequest>,
) -> Result<(StatusCode, Json<MessageView>)> {
    let message = MessagingService::new(state.pool())
        .send(user.id, MessageDirection::ToAdmin, &body.content)
        .await?;
    Ok((StatusCode::CREATED, Json(message.into())))
}

/// `GET /api/notifications`
#[instrument(skip_all, fields(user_id = %user.id))]
pub async fn notifications(
    State(state): State<AppState>,
    RequireUser(user): RequireUser,
) -> Result<Json<Vec<NotificationView>>> {
    let notices = MessagingService::new(state.pool())
        .notifications_for(user.id)
        .await?;
    Ok(Json(notices.into_iter().map(NotificationView::from).collect()))
}

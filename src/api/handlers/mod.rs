use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use chrono::Utc;

use super::AppState;
use crate::hipchat::{capabilities as descriptor, Notification, WebhookPayload};
use crate::models::{InstallInput, Installation};

const WELCOME: &str = "GI Standup was added to this room. Type '/standup I did *this*' to get started (yes, you can use Markdown).";

// ============================================================
// Error Handling
// ============================================================

/// Log an internal error and return a sanitized response to the client.
fn internal_error(e: impl std::fmt::Display) -> (StatusCode, String) {
    tracing::error!("Internal error: {:#}", e);
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        "Internal server error".to_string(),
    )
}

// ============================================================
// Health
// ============================================================

pub async fn health() -> impl IntoResponse {
    Json(serde_json::json!({ "status": "ok" }))
}

// ============================================================
// Add-on lifecycle
// ============================================================

pub async fn capabilities(State(state): State<AppState>) -> impl IntoResponse {
    Json(descriptor(&state.config))
}

pub async fn install(
    State(state): State<AppState>,
    Json(input): Json<InstallInput>,
) -> Result<StatusCode, (StatusCode, String)> {
    let endpoints = state
        .chat
        .resolve_endpoints(&input.capabilities_url)
        .await
        .map_err(|e| {
            tracing::warn!("Could not read capabilities of {}: {}", input.capabilities_url, e);
            (StatusCode::BAD_REQUEST, "Invalid capabilities URL".to_string())
        })?;

    let installation = Installation {
        oauth_id: input.oauth_id,
        oauth_secret: input.oauth_secret,
        group_id: input.group_id,
        room_id: input.room_id,
        capabilities_url: input.capabilities_url,
        token_url: endpoints.token_url,
        api_url: endpoints.api_url,
        installed_at: Utc::now(),
    };
    state
        .db
        .save_installation(&installation)
        .map_err(internal_error)?;

    tracing::info!(
        oauth_id = %installation.oauth_id,
        room_id = installation.room_id,
        "Add-on installed"
    );

    if let Err(e) = state
        .chat
        .send_notification(&installation, Notification::text(WELCOME))
        .await
    {
        tracing::warn!("Failed to send welcome message: {}", e);
    }

    Ok(StatusCode::CREATED)
}

pub async fn uninstall(
    State(state): State<AppState>,
    Path(oauth_id): Path<String>,
) -> Result<StatusCode, (StatusCode, String)> {
    if state
        .db
        .delete_installation(&oauth_id)
        .map_err(internal_error)?
    {
        tracing::info!(oauth_id = %oauth_id, "Add-on uninstalled");
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err((StatusCode::NOT_FOUND, "Installation not found".to_string()))
    }
}

// ============================================================
// Slash command
// ============================================================

/// Webhook for `/standup`. Always answers 204; failures are only logged.
pub async fn standup(
    State(state): State<AppState>,
    Json(payload): Json<WebhookPayload>,
) -> StatusCode {
    let installation = match state.db.get_installation(&payload.oauth_client_id) {
        Ok(Some(installation)) => installation,
        Ok(None) => {
            tracing::warn!(
                oauth_client_id = %payload.oauth_client_id,
                "Webhook from unknown client"
            );
            return StatusCode::NO_CONTENT;
        }
        Err(e) => {
            tracing::error!(
                oauth_client_id = %payload.oauth_client_id,
                "Failed to load installation: {:#}",
                e
            );
            return StatusCode::NO_CONTENT;
        }
    };

    if let Err(e) = state
        .dispatcher
        .dispatch(
            &installation,
            payload.sender(),
            payload.command_text(),
            Utc::now(),
        )
        .await
    {
        tracing::error!(
            room_id = installation.room_id,
            "Failed to handle /standup command: {:#}",
            e
        );
    }

    StatusCode::NO_CONTENT
}

//! MediBot chat route handlers.

use axum::{
    Json,
    extract::{Query, State},
};
use serde::{Deserialize, Serialize};
use tracing::instrument;

use crate::error::{AppError, Result};
use crate::models::HistoryEntry;
use crate::services::{AuthService, ChatService};
use crate::state::AppState;

/// `POST /chat` body.
#[derive(Debug, Deserialize)]
pub struct ChatForm {
    pub email: Option<String>,
    pub message: Option<String>,
}

/// `POST /chat/history` body and `GET /chat/history` query.
#[derive(Debug, Deserialize)]
pub struct HistoryQuery {
    pub email: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ChatResponse {
    pub response: String,
    pub history: Vec<HistoryEntry>,
}

#[derive(Debug, Serialize)]
pub struct HistoryResponse {
    pub history: Vec<HistoryEntry>,
}

/// Send one message to MediBot.
#[instrument(skip(state, form))]
pub async fn send(
    State(state): State<AppState>,
    Json(form): Json<ChatForm>,
) -> Result<Json<ChatResponse>> {
    let user = AuthService::new(state.pool())
        .identify(form.email.as_deref())
        .await?;

    let message = form
        .message
        .as_deref()
        .map(str::trim)
        .filter(|m| !m.is_empty())
        .ok_or_else(|| AppError::BadRequest("Message is required".to_string()))?;

    let exchange = ChatService::new(state.pool(), state.gemini())
        .send(&user, message)
        .await?;

    Ok(Json(ChatResponse {
        response: exchange.response,
        history: exchange.history,
    }))
}

/// Stored transcript, body form.
pub async fn history(
    State(state): State<AppState>,
    Json(query): Json<HistoryQuery>,
) -> Result<Json<HistoryResponse>> {
    load_history(&state, query.email.as_deref()).await
}

/// Stored transcript, query-string form.
pub async fn history_query(
    State(state): State<AppState>,
    Query(query): Query<HistoryQuery>,
) -> Result<Json<HistoryResponse>> {
    load_history(&state, query.email.as_deref()).await
}

#[instrument(skip(state))]
async fn load_history(state: &AppState, email: Option<&str>) -> Result<Json<HistoryResponse>> {
    let user = AuthService::new(state.pool()).identify(email).await?;
    let history = ChatService::new(state.pool(), state.gemini())
        .history(&user)
        .await?;
    Ok(Json(HistoryResponse { history }))
}

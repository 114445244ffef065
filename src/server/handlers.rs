//! HTTP handlers.

use axum::{
    Json,
    extract::State,
    http::StatusCode,
    response::{Html, IntoResponse},
};

use super::page::{chat_content, html_shell};
use crate::AppState;
use crate::bot::ReplyContext;
use crate::protocol::{ErrorResponse, HistoryResponse, SendMessageRequest, SendMessageResponse};

type ApiError = (StatusCode, Json<ErrorResponse>);

fn api_error(status: StatusCode, message: &str) -> ApiError {
    (
        status,
        Json(ErrorResponse {
            error: message.to_string(),
        }),
    )
}

/// GET / - Chat page.
pub async fn index_handler(State(state): State<AppState>) -> impl IntoResponse {
    Html(html_shell("Chat", &chat_content(&state.config)))
}

/// POST /send_message - Answer one user message.
pub async fn send_message(
    State(state): State<AppState>,
    Json(req): Json<SendMessageRequest>,
) -> Result<Json<SendMessageResponse>, ApiError> {
    let message = req.message.trim();
    if message.is_empty() {
        return Err(api_error(StatusCode::BAD_REQUEST, "Empty message"));
    }

    tracing::info!(
        name: "chat.message.received",
        chars = message.chars().count(),
        "Received chat message"
    );

    let first_interaction = state.history.record_user(message) == 0;
    let context = ReplyContext {
        first_interaction,
        history: state.history.entries(),
    };

    match state.engine.reply(message, &context).await {
        Ok(reply) => {
            state.history.record_bot(reply.clone());
            tracing::debug!(
                name: "chat.reply.sent",
                history_len = state.history.len(),
                "Reply sent"
            );
            Ok(Json(SendMessageResponse { reply }))
        }
        Err(e) => {
            tracing::error!(
                name: "chat.reply.failed",
                error = %e,
                "Reply engine failed"
            );
            Err(api_error(
                StatusCode::BAD_GATEWAY,
                "The assistant could not answer",
            ))
        }
    }
}

/// GET /get_history - Conversation so far.
pub async fn get_history(State(state): State<AppState>) -> Json<HistoryResponse> {
    Json(HistoryResponse {
        history: state.history.lines(),
    })
}

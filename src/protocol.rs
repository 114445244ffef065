//! Wire types shared by the widget transport and the backend handlers.
//!
//! The whole protocol is two JSON endpoints:
//!
//! - `POST /send_message` with `{"message": "..."}` answered by `{"reply": "..."}`
//! - `GET /get_history` answered by `{"history": ["Sender: text", ...]}`
//!
//! Failures are answered with `{"error": "..."}` and a non-success status.

use serde::{Deserialize, Serialize};

/// Path of the message exchange endpoint.
pub const SEND_MESSAGE_PATH: &str = "/send_message";

/// Path of the history endpoint.
pub const HISTORY_PATH: &str = "/get_history";

/// Body of `POST /send_message`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SendMessageRequest {
    /// Text typed by the user.
    pub message: String,
}

/// Successful answer to `POST /send_message`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SendMessageResponse {
    /// Bot reply; may contain markup.
    pub reply: String,
}

/// Answer to `GET /get_history`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistoryResponse {
    /// Lines formatted as `"Sender: text"`, oldest first.
    pub history: Vec<String>,
}

/// Error answer for any endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

//! Widget error types.

use thiserror::Error;

/// Everything that can go wrong while exchanging a message with the backend.
///
/// The variants exist for diagnostics only. The widget collapses all of them
/// into a single fixed error entry in the panel.
#[derive(Error, Debug)]
pub enum WidgetError {
    /// Endpoint could not be resolved against the base URL.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// Connection or transfer failure.
    #[error("HTTP error: {0}")]
    Request(#[from] reqwest::Error),

    /// Backend answered with a non-success status.
    #[error("Server error ({status}): {body}")]
    Status {
        /// HTTP status code.
        status: u16,
        /// Raw response body.
        body: String,
    },

    /// Body was not JSON.
    #[error("JSON error: {0}")]
    Decode(#[from] serde_json::Error),

    /// JSON body without a string `reply` field.
    #[error("Response has no `reply` field")]
    MissingReply,
}

pub type Result<T> = std::result::Result<T, WidgetError>;

//! Fallback engine that repeats the message back.

use async_trait::async_trait;

use super::{ReplyContext, ReplyEngine, ReplyError};
use crate::widget::escape_html;

/// Echoes the user's message, escaped.
#[derive(Debug, Clone, Copy, Default)]
pub struct EchoReplier;

#[async_trait]
impl ReplyEngine for EchoReplier {
    async fn reply(&self, message: &str, _context: &ReplyContext) -> Result<String, ReplyError> {
        Ok(format!("You said: {}", escape_html(message.trim())))
    }
}

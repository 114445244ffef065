//! Reply engines behind `POST /send_message`.
//!
//! A [`ReplyEngine`] turns one user message into one bot reply. Engines
//! compose: [`GreetingReplier`] answers greetings itself and hands every
//! other message to an inner engine, either [`ChatCompletionsReplier`] (an
//! OpenAI-compatible backend) or [`EchoReplier`].
//!
//! Replies are rendered as markup by the widget, so engines must escape any
//! user-supplied text they quote back.

mod completions;
mod echo;
mod greeting;

pub use completions::ChatCompletionsReplier;
pub use echo::EchoReplier;
pub use greeting::{GreetingReplier, is_greeting};

use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;

use crate::config::AppConfig;
use crate::history::HistoryEntry;

/// Conversation state handed to an engine.
#[derive(Debug, Clone)]
pub struct ReplyContext {
    /// Whether this is the user's first message in the conversation.
    pub first_interaction: bool,
    /// Conversation so far, including the message being answered.
    pub history: Vec<HistoryEntry>,
}

/// Reply engine failures.
#[derive(Error, Debug)]
pub enum ReplyError {
    /// Upstream request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Upstream answered with a non-success status.
    #[error("Upstream error ({status}): {message}")]
    Upstream {
        /// HTTP status code.
        status: u16,
        /// Response body.
        message: String,
    },

    /// Upstream answer did not have the expected shape.
    #[error("Malformed upstream response: {0}")]
    Malformed(String),
}

/// Produces the bot's reply to a user message.
#[async_trait]
pub trait ReplyEngine: Send + Sync + std::fmt::Debug {
    async fn reply(&self, message: &str, context: &ReplyContext) -> Result<String, ReplyError>;
}

/// Build the engine stack described by the configuration.
#[must_use]
pub fn build_engine(config: &AppConfig) -> Arc<dyn ReplyEngine> {
    let fallback: Arc<dyn ReplyEngine> = match config.llm.endpoint() {
        Some((base_url, model)) => {
            tracing::info!(
                name: "bot.engine.completions",
                base_url = %base_url,
                model = %model,
                "Using chat completions reply engine"
            );
            Arc::new(ChatCompletionsReplier::new(
                base_url,
                model,
                config.llm.api_key.clone(),
                config.llm.system_prompt.clone(),
            ))
        }
        None => {
            tracing::info!(name: "bot.engine.echo", "No LLM configured, echoing messages");
            Arc::new(EchoReplier)
        }
    };

    Arc::new(GreetingReplier::new(
        config.bot.welcome.clone(),
        config.bot.welcome_back.clone(),
        fallback,
    ))
}

//! Greeting handling in front of another engine.

use std::sync::Arc;

use async_trait::async_trait;

use super::{ReplyContext, ReplyEngine, ReplyError};

const GREETINGS: &[&str] = &[
    "hi",
    "hey",
    "hello",
    "good morning",
    "good afternoon",
    "good evening",
    "hola",
    "buenas",
    "buenos dias",
    "buenos días",
    "buenas tardes",
    "buenas noches",
    "saludos",
];

/// Whether `message` is a bare greeting such as "Hola!" or "hi".
#[must_use]
pub fn is_greeting(message: &str) -> bool {
    let normalized = message
        .trim()
        .trim_end_matches(['!', '.', '?'])
        .trim()
        .to_lowercase();
    GREETINGS.contains(&normalized.as_str())
}

/// Answers greetings with a welcome text and delegates everything else.
#[derive(Debug, Clone)]
pub struct GreetingReplier {
    welcome: String,
    welcome_back: String,
    inner: Arc<dyn ReplyEngine>,
}

impl GreetingReplier {
    #[must_use]
    pub fn new(welcome: String, welcome_back: String, inner: Arc<dyn ReplyEngine>) -> Self {
        Self {
            welcome,
            welcome_back,
            inner,
        }
    }
}

#[async_trait]
impl ReplyEngine for GreetingReplier {
    async fn reply(&self, message: &str, context: &ReplyContext) -> Result<String, ReplyError> {
        if !is_greeting(message) {
            return self.inner.reply(message, context).await;
        }

        let reply = if context.first_interaction {
            &self.welcome
        } else {
            &self.welcome_back
        };
        tracing::debug!(
            name: "bot.greeting.handled",
            first_interaction = context.first_interaction,
            "Answered greeting"
        );
        Ok(reply.clone())
    }
}

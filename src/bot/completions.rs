//! OpenAI-compatible Chat Completions engine.
//!
//! Sends the conversation to `/v1/chat/completions` as a single
//! non-streaming request and returns the first choice's content.

use async_trait::async_trait;
use serde_json::{Value, json};

use super::{ReplyContext, ReplyEngine, ReplyError};
use crate::history::Speaker;

/// Engine backed by an OpenAI-compatible completion endpoint.
#[derive(Clone)]
pub struct ChatCompletionsReplier {
    http: reqwest::Client,
    base_url: String,
    model: String,
    api_key: Option<String>,
    system_prompt: String,
}

impl std::fmt::Debug for ChatCompletionsReplier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChatCompletionsReplier")
            .field("base_url", &self.base_url)
            .field("model", &self.model)
            .finish_non_exhaustive()
    }
}

impl ChatCompletionsReplier {
    #[must_use]
    pub fn new(
        base_url: impl Into<String>,
        model: impl Into<String>,
        api_key: Option<String>,
        system_prompt: impl Into<String>,
    ) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.into(),
            model: model.into(),
            api_key: api_key.filter(|k| !k.trim().is_empty()),
            system_prompt: system_prompt.into(),
        }
    }

    fn url(&self) -> String {
        format!(
            "{}/v1/chat/completions",
            self.base_url.trim_end_matches('/')
        )
    }

    /// Request body for the conversation in `context`.
    ///
    /// The history already ends with the message being answered.
    fn request_body(&self, context: &ReplyContext) -> Value {
        let mut messages = Vec::with_capacity(context.history.len() + 1);
        if !self.system_prompt.trim().is_empty() {
            messages.push(json!({ "role": "system", "content": self.system_prompt }));
        }
        messages.extend(context.history.iter().map(|entry| {
            let role = match entry.speaker {
                Speaker::User => "user",
                Speaker::Bot => "assistant",
            };
            json!({ "role": role, "content": entry.text })
        }));

        json!({
            "model": self.model,
            "stream": false,
            "messages": messages,
        })
    }
}

#[async_trait]
impl ReplyEngine for ChatCompletionsReplier {
    async fn reply(&self, _message: &str, context: &ReplyContext) -> Result<String, ReplyError> {
        let mut rb = self.http.post(self.url()).json(&self.request_body(context));
        if let Some(k) = &self.api_key {
            rb = rb.bearer_auth(k);
        }

        let resp = rb.send().await?;
        let status = resp.status();
        if !status.is_success() {
            let message = resp
                .text()
                .await
                .unwrap_or_else(|e| format!("<unreadable body: {e}>"));
            return Err(ReplyError::Upstream {
                status: status.as_u16(),
                message,
            });
        }

        let v: Value = resp.json().await?;
        extract_content(&v)
    }
}

/// Pull `choices[0].message.content` out of a completion response.
fn extract_content(v: &Value) -> Result<String, ReplyError> {
    v["choices"][0]["message"]["content"]
        .as_str()
        .map(ToString::to_string)
        .ok_or_else(|| ReplyError::Malformed("missing choices[0].message.content".to_string()))
}

//! Transport between the widget and its backend.

use async_trait::async_trait;
use url::Url;

use super::error::{Result, WidgetError};
use crate::protocol::{HISTORY_PATH, HistoryResponse, SendMessageRequest};

/// One request/response exchange with the chat backend.
#[async_trait]
pub trait ChatTransport: Send + Sync {
    /// Post a user message and return the bot reply.
    async fn send_message(&self, message: &str) -> Result<String>;

    /// Fetch the backend's conversation history as `"Sender: text"` lines.
    async fn fetch_history(&self) -> Result<Vec<String>>;
}

/// HTTP transport posting JSON to a fixed endpoint.
///
/// No timeout is configured: a request that never completes never produces
/// a terminal message.
///
/// # Example
///
/// ```rust,no_run
/// use chat_widget::widget::{ChatTransport, HttpTransport};
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let transport = HttpTransport::new("http://127.0.0.1:3000", "/send_message")?;
/// let reply = transport.send_message("hello").await?;
/// println!("{reply}");
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct HttpTransport {
    http: reqwest::Client,
    send_url: Url,
    history_url: Url,
}

impl HttpTransport {
    /// Create a transport for `endpoint` resolved against `base_url`.
    pub fn new(base_url: impl AsRef<str>, endpoint: &str) -> Result<Self> {
        Self::with_client(base_url, endpoint, reqwest::Client::new())
    }

    /// Create a transport with a custom reqwest client.
    pub fn with_client(
        base_url: impl AsRef<str>,
        endpoint: &str,
        http: reqwest::Client,
    ) -> Result<Self> {
        let base = Url::parse(base_url.as_ref())?;
        Ok(Self {
            http,
            send_url: base.join(endpoint)?,
            history_url: base.join(HISTORY_PATH)?,
        })
    }

    /// Resolved message endpoint.
    pub fn send_url(&self) -> &Url {
        &self.send_url
    }
}

#[async_trait]
impl ChatTransport for HttpTransport {
    async fn send_message(&self, message: &str) -> Result<String> {
        let request = SendMessageRequest {
            message: message.to_string(),
        };
        let response = self
            .http
            .post(self.send_url.clone())
            .json(&request)
            .send()
            .await?;

        let status = response.status().as_u16();
        let body = response.text().await?;
        parse_reply(status, &body)
    }

    async fn fetch_history(&self) -> Result<Vec<String>> {
        let response = self.http.get(self.history_url.clone()).send().await?;
        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            return Err(WidgetError::Status {
                status: status.as_u16(),
                body,
            });
        }
        let history: HistoryResponse = serde_json::from_str(&body)?;
        Ok(history.history)
    }
}

/// Extract the reply from a `/send_message` response.
pub fn parse_reply(status: u16, body: &str) -> Result<String> {
    if !(200..300).contains(&status) {
        return Err(WidgetError::Status {
            status,
            body: body.to_string(),
        });
    }

    let value: serde_json::Value = serde_json::from_str(body)?;
    value
        .get("reply")
        .and_then(serde_json::Value::as_str)
        .map(ToString::to_string)
        .ok_or(WidgetError::MissingReply)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reply_is_extracted() {
        assert_eq!(parse_reply(200, r#"{"reply":"hi"}"#).unwrap(), "hi");
    }

    #[test]
    fn non_json_body_is_a_decode_error() {
        let err = parse_reply(200, "<html>oops</html>").unwrap_err();
        assert!(matches!(err, WidgetError::Decode(_)));
    }

    #[test]
    fn missing_or_non_string_reply_is_rejected() {
        assert!(matches!(
            parse_reply(200, r#"{"answer":"hi"}"#),
            Err(WidgetError::MissingReply)
        ));
        assert!(matches!(
            parse_reply(200, r#"{"reply":42}"#),
            Err(WidgetError::MissingReply)
        ));
    }

    #[test]
    fn error_status_is_rejected_even_with_reply() {
        let err = parse_reply(502, r#"{"reply":"hi"}"#).unwrap_err();
        assert!(matches!(err, WidgetError::Status { status: 502, .. }));
    }

    #[test]
    fn endpoint_is_resolved_against_base() {
        let transport = HttpTransport::new("http://localhost:3000/chat/", "/send_message").unwrap();
        assert_eq!(
            transport.send_url().as_str(),
            "http://localhost:3000/send_message"
        );
    }

    #[test]
    fn invalid_base_url_is_rejected() {
        let err = HttpTransport::new("not a url", "/send_message").unwrap_err();
        assert!(matches!(err, WidgetError::InvalidUrl(_)));
    }
}

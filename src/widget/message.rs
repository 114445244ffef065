//! Chat messages and their HTML rendering.

use chrono::{DateTime, Utc};

/// Style class applied to messages typed by the user.
pub const USER_MESSAGE_CLASS: &str = "user-message";

/// Style class applied to bot replies and to error entries.
pub const BOT_MESSAGE_CLASS: &str = "bot-message";

/// Who produced a message.
///
/// The sender kind decides how the body is rendered: only [`Sender::Bot`]
/// bodies are trusted to carry markup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Sender {
    /// Text typed into the input field.
    User,
    /// Reply produced by the backend.
    Bot,
    /// Inline failure notice.
    Error,
}

impl Sender {
    /// Label rendered in front of the body when none is configured.
    #[must_use]
    pub fn default_label(self) -> &'static str {
        match self {
            Self::User => "User",
            Self::Bot => "Bot",
            Self::Error => "Error",
        }
    }

    /// Whether bodies from this sender are inserted as markup.
    #[must_use]
    pub fn allows_markup(self) -> bool {
        matches!(self, Self::Bot)
    }
}

/// One rendered chat line.
///
/// Messages are immutable once appended to a panel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    sender: Sender,
    label: String,
    body: String,
    style_class: Option<String>,
    sent_at: DateTime<Utc>,
}

impl Message {
    /// Create a message rendered with the sender's default label.
    #[must_use]
    pub fn new(sender: Sender, body: impl Into<String>, style_class: Option<&str>) -> Self {
        Self::with_label(sender, sender.default_label(), body, style_class)
    }

    /// Create a message with an explicit label (e.g. a localized "User").
    #[must_use]
    pub fn with_label(
        sender: Sender,
        label: impl Into<String>,
        body: impl Into<String>,
        style_class: Option<&str>,
    ) -> Self {
        Self {
            sender,
            label: label.into(),
            body: body.into(),
            style_class: style_class.map(ToString::to_string),
            sent_at: Utc::now(),
        }
    }

    #[must_use]
    pub fn sender(&self) -> Sender {
        self.sender
    }

    #[must_use]
    pub fn label(&self) -> &str {
        &self.label
    }

    #[must_use]
    pub fn body(&self) -> &str {
        &self.body
    }

    #[must_use]
    pub fn style_class(&self) -> Option<&str> {
        self.style_class.as_deref()
    }

    #[must_use]
    pub fn sent_at(&self) -> DateTime<Utc> {
        self.sent_at
    }

    /// Render the message as a `<p>` element.
    ///
    /// The label is always escaped. The body is escaped unless the sender
    /// allows markup, so user and error text can never inject elements.
    #[must_use]
    pub fn to_html(&self) -> String {
        let body = if self.sender.allows_markup() {
            self.body.clone()
        } else {
            escape_html(&self.body)
        };
        let label = escape_html(&self.label);

        match &self.style_class {
            Some(class) => format!(
                r#"<p class="{}"><strong>{label}:</strong> {body}</p>"#,
                escape_html(class)
            ),
            None => format!("<p><strong>{label}:</strong> {body}</p>"),
        }
    }
}

/// Escape text for safe insertion into HTML content or attribute values.
#[must_use]
pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

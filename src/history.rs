//! Backend conversation history.
//!
//! The backend keeps a single in-memory conversation for the process
//! lifetime. It seeds the bot's greeting line, records every exchange and
//! serves the lines to `GET /get_history`.
//!
//! # Example
//!
//! ```rust
//! use chat_widget::history::ConversationHistory;
//!
//! let history = ConversationHistory::new(Some("Hello!".to_string()));
//! history.record_user("hi");
//! history.record_bot("hey");
//!
//! assert_eq!(history.lines(), ["Bot: Hello!", "User: hi", "Bot: hey"]);
//! ```

use std::sync::{Arc, PoisonError, RwLock};

use chrono::{DateTime, Utc};

/// Who spoke a history line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Speaker {
    User,
    Bot,
}

impl Speaker {
    /// Label written in front of the line text.
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::User => "User",
            Self::Bot => "Bot",
        }
    }
}

/// One recorded line.
#[derive(Debug, Clone)]
pub struct HistoryEntry {
    pub speaker: Speaker,
    pub text: String,
    pub at: DateTime<Utc>,
}

impl HistoryEntry {
    /// `"Sender: text"` form used on the wire.
    #[must_use]
    pub fn line(&self) -> String {
        format!("{}: {}", self.speaker.label(), self.text)
    }
}

/// Shared, append-only conversation history.
#[derive(Debug, Clone, Default)]
pub struct ConversationHistory {
    inner: Arc<RwLock<Vec<HistoryEntry>>>,
}

impl ConversationHistory {
    /// Create a history, optionally seeded with the bot's greeting.
    #[must_use]
    pub fn new(greeting: Option<String>) -> Self {
        let history = Self::default();
        if let Some(greeting) = greeting.filter(|g| !g.trim().is_empty()) {
            history.record_bot(greeting);
        }
        history
    }

    /// Record a user line and return how many user lines preceded it.
    pub fn record_user(&self, text: impl Into<String>) -> usize {
        let mut guard = self.inner.write().unwrap_or_else(PoisonError::into_inner);
        let prior = guard.iter().filter(|e| e.speaker == Speaker::User).count();
        guard.push(HistoryEntry {
            speaker: Speaker::User,
            text: text.into(),
            at: Utc::now(),
        });
        prior
    }

    pub fn record_bot(&self, text: impl Into<String>) {
        self.record(Speaker::Bot, text.into());
    }

    fn record(&self, speaker: Speaker, text: String) {
        let mut guard = self.inner.write().unwrap_or_else(PoisonError::into_inner);
        guard.push(HistoryEntry {
            speaker,
            text,
            at: Utc::now(),
        });
    }

    /// All entries, oldest first.
    #[must_use]
    pub fn entries(&self) -> Vec<HistoryEntry> {
        self.inner
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// All entries as `"Sender: text"` lines.
    #[must_use]
    pub fn lines(&self) -> Vec<String> {
        self.inner
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .map(HistoryEntry::line)
            .collect()
    }

    /// Number of lines the user has contributed so far.
    #[must_use]
    pub fn user_turns(&self) -> usize {
        self.inner
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .filter(|e| e.speaker == Speaker::User)
            .count()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.inner.read().unwrap_or_else(PoisonError::into_inner).len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

//! Display panels the widget renders into.
//!
//! A [`MessagePanel`] stands in for the scrollable `#chatbox` element: it owns
//! the child list of rendered messages and a scroll position.

use super::log::ConversationLog;
use super::message::Message;

/// Scrollable message panel.
pub trait MessagePanel: Send {
    /// Append a message as the newest child.
    fn append(&mut self, message: Message);

    /// Scroll so the newest child is visible.
    fn scroll_to_bottom(&mut self);

    /// Remove every child. Used when history replaces the panel content.
    fn clear(&mut self);

    /// The messages currently shown, oldest first.
    fn log(&self) -> &ConversationLog;
}

/// In-memory panel that keeps the rendered HTML of every child.
///
/// Each child counts as one row; `scroll_height` is the number of rows.
#[derive(Debug, Default)]
pub struct HtmlPanel {
    log: ConversationLog,
    nodes: Vec<String>,
    scroll_top: usize,
}

impl HtmlPanel {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Rendered children, oldest first.
    #[must_use]
    pub fn nodes(&self) -> &[String] {
        &self.nodes
    }

    /// Concatenated child markup, as `innerHTML` would report it.
    #[must_use]
    pub fn inner_html(&self) -> String {
        self.nodes.concat()
    }

    #[must_use]
    pub fn scroll_top(&self) -> usize {
        self.scroll_top
    }

    #[must_use]
    pub fn scroll_height(&self) -> usize {
        self.nodes.len()
    }

    #[must_use]
    pub fn is_scrolled_to_bottom(&self) -> bool {
        self.scroll_top == self.scroll_height()
    }
}

impl MessagePanel for HtmlPanel {
    fn append(&mut self, message: Message) {
        self.nodes.push(message.to_html());
        self.log.push(message);
    }

    fn scroll_to_bottom(&mut self) {
        self.scroll_top = self.scroll_height();
    }

    fn clear(&mut self) {
        self.log.clear();
        self.nodes.clear();
        self.scroll_top = 0;
    }

    fn log(&self) -> &ConversationLog {
        &self.log
    }
}

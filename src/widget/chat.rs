//! The chat widget: input buffer, panel and one exchange per submission.

use std::future::Future;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tokio::task::JoinHandle;

use super::dom::Key;
use super::error::Result;
use super::history::parse_history_line;
use super::message::{BOT_MESSAGE_CLASS, Message, Sender, USER_MESSAGE_CLASS};
use super::panel::MessagePanel;
use super::transport::ChatTransport;

/// Fixed text shown when an exchange fails for any reason.
pub const DEFAULT_ERROR_TEXT: &str = "Could not reach the server.";

/// Labels rendered in front of each sender's messages.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WidgetLabels {
    pub user: String,
    pub bot: String,
    pub error: String,
    /// Body of the error entry appended when an exchange fails.
    pub error_text: String,
}

impl Default for WidgetLabels {
    fn default() -> Self {
        Self {
            user: Sender::User.default_label().to_string(),
            bot: Sender::Bot.default_label().to_string(),
            error: Sender::Error.default_label().to_string(),
            error_text: DEFAULT_ERROR_TEXT.to_string(),
        }
    }
}

impl WidgetLabels {
    fn for_sender(&self, sender: Sender) -> &str {
        match sender {
            Sender::User => &self.user,
            Sender::Bot => &self.bot,
            Sender::Error => &self.error,
        }
    }
}

/// Chat widget bound to a panel and a transport.
///
/// Cloning is cheap and every clone drives the same panel and input
/// buffer. Submissions are independent: several may be in flight at once and
/// each appends its reply when its own exchange completes.
///
/// # Example
///
/// ```rust,no_run
/// use chat_widget::widget::{ChatWidget, HtmlPanel, HttpTransport};
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let transport = HttpTransport::new("http://127.0.0.1:3000", "/send_message")?;
/// let widget = ChatWidget::new(HtmlPanel::new(), transport);
///
/// widget.set_input("hello");
/// if let Some(exchange) = widget.submit() {
///     let reply = exchange.await;
///     println!("{}", reply.body());
/// }
/// # Ok(())
/// # }
/// ```
pub struct ChatWidget<P, T> {
    inner: Arc<WidgetInner<P, T>>,
}

struct WidgetInner<P, T> {
    panel: Mutex<P>,
    input: Mutex<String>,
    transport: T,
    labels: WidgetLabels,
}

impl<P, T> Clone for ChatWidget<P, T> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<P, T> std::fmt::Debug for ChatWidget<P, T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChatWidget")
            .field("labels", &self.inner.labels)
            .finish_non_exhaustive()
    }
}

impl<P, T> ChatWidget<P, T>
where
    P: MessagePanel + 'static,
    T: ChatTransport + 'static,
{
    /// Create a widget with the default sender labels.
    #[must_use]
    pub fn new(panel: P, transport: T) -> Self {
        Self::with_labels(panel, transport, WidgetLabels::default())
    }

    /// Create a widget with custom sender labels.
    #[must_use]
    pub fn with_labels(panel: P, transport: T, labels: WidgetLabels) -> Self {
        Self {
            inner: Arc::new(WidgetInner {
                panel: Mutex::new(panel),
                input: Mutex::new(String::new()),
                transport,
                labels,
            }),
        }
    }

    /// Replace the input buffer.
    pub fn set_input(&self, text: impl Into<String>) {
        *self.lock_input() = text.into();
    }

    /// Current input buffer.
    #[must_use]
    pub fn input(&self) -> String {
        self.lock_input().clone()
    }

    /// Snapshot of the messages shown in the panel.
    #[must_use]
    pub fn messages(&self) -> Vec<Message> {
        self.lock_panel().log().as_slice().to_vec()
    }

    /// Run `f` against the panel.
    pub fn with_panel<R>(&self, f: impl FnOnce(&P) -> R) -> R {
        f(&self.lock_panel())
    }

    /// Append a message and scroll it into view.
    pub fn append_message(&self, sender: Sender, body: &str, style_class: Option<&str>) {
        self.append(sender, body, style_class);
    }

    /// Submit the input buffer.
    ///
    /// Returns `None` without touching the panel when the trimmed input is
    /// empty. Otherwise the user message is appended and the input cleared
    /// before this returns; the returned future performs the exchange and
    /// resolves to the terminal (bot or error) message it appended.
    pub fn submit(&self) -> Option<impl Future<Output = Message> + Send + use<P, T>> {
        let text = self.lock_input().trim().to_string();
        if text.is_empty() {
            return None;
        }

        self.append(Sender::User, &text, Some(USER_MESSAGE_CLASS));
        self.lock_input().clear();

        tracing::info!(
            name: "chat.message.submitted",
            chars = text.chars().count(),
            "Submitting chat message"
        );

        let widget = self.clone();
        Some(async move { widget.exchange(&text).await })
    }

    /// Handle a key pressed while the input field has focus.
    ///
    /// Enter submits and spawns the exchange onto the current tokio runtime;
    /// the handle resolves to the terminal message. Characters and backspace
    /// edit the buffer. Nothing is debounced.
    pub fn handle_key(&self, key: Key) -> Option<JoinHandle<Message>> {
        match key {
            Key::Enter => self.submit().map(tokio::spawn),
            Key::Char(c) => {
                self.lock_input().push(c);
                None
            }
            Key::Backspace => {
                self.lock_input().pop();
                None
            }
            Key::Other => None,
        }
    }

    /// Replace the panel content with the backend's history.
    ///
    /// Returns the number of lines loaded. On failure the panel is left
    /// untouched.
    pub async fn load_history(&self) -> Result<usize> {
        let lines = match self.inner.transport.fetch_history().await {
            Ok(lines) => lines,
            Err(err) => {
                tracing::error!(
                    name: "chat.history.failed",
                    error = %err,
                    "Failed to load chat history"
                );
                return Err(err);
            }
        };

        {
            let mut panel = self.lock_panel();
            panel.clear();
            for line in &lines {
                panel.append(parse_history_line(line));
            }
            panel.scroll_to_bottom();
        }

        tracing::debug!(
            name: "chat.history.loaded",
            lines = lines.len(),
            "Chat history loaded"
        );
        Ok(lines.len())
    }

    async fn exchange(&self, text: &str) -> Message {
        match self.inner.transport.send_message(text).await {
            Ok(reply) => {
                let message = self.append(Sender::Bot, &reply, Some(BOT_MESSAGE_CLASS));
                tracing::debug!(
                    name: "chat.reply.received",
                    sent_at = %message.sent_at(),
                    "Reply received"
                );
                message
            }
            Err(err) => {
                tracing::error!(
                    name: "chat.reply.failed",
                    error = %err,
                    "Failed to exchange chat message"
                );
                let notice = self.inner.labels.error_text.clone();
                self.append(Sender::Error, &notice, Some(BOT_MESSAGE_CLASS))
            }
        }
    }

    fn append(&self, sender: Sender, body: &str, style_class: Option<&str>) -> Message {
        let label = self.inner.labels.for_sender(sender);
        let message = Message::with_label(sender, label, body, style_class);

        let mut panel = self.lock_panel();
        panel.append(message.clone());
        panel.scroll_to_bottom();
        message
    }

    fn lock_panel(&self) -> MutexGuard<'_, P> {
        self.inner
            .panel
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    fn lock_input(&self) -> MutexGuard<'_, String> {
        self.inner
            .input
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    use async_trait::async_trait;

    use super::*;
    use crate::widget::error::WidgetError;
    use crate::widget::panel::HtmlPanel;

    /// Transport answering from a script, after a per-message delay.
    #[derive(Debug, Default)]
    struct ScriptedTransport {
        replies: HashMap<String, (Duration, Option<String>)>,
        history: Option<Vec<String>>,
        calls: AtomicUsize,
    }

    impl ScriptedTransport {
        fn reply(mut self, message: &str, delay_ms: u64, reply: Option<&str>) -> Self {
            self.replies.insert(
                message.to_string(),
                (Duration::from_millis(delay_ms), reply.map(ToString::to_string)),
            );
            self
        }

        fn history(mut self, lines: &[&str]) -> Self {
            self.history = Some(lines.iter().map(ToString::to_string).collect());
            self
        }
    }

    #[async_trait]
    impl ChatTransport for ScriptedTransport {
        async fn send_message(&self, message: &str) -> Result<String> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let (delay, reply) = self
                .replies
                .get(message)
                .cloned()
                .unwrap_or((Duration::ZERO, None));
            tokio::time::sleep(delay).await;
            reply.ok_or(WidgetError::MissingReply)
        }

        async fn fetch_history(&self) -> Result<Vec<String>> {
            self.history.clone().ok_or(WidgetError::MissingReply)
        }
    }

    fn widget(transport: ScriptedTransport) -> ChatWidget<HtmlPanel, ScriptedTransport> {
        ChatWidget::new(HtmlPanel::new(), transport)
    }

    #[tokio::test]
    async fn blank_input_is_a_no_op() {
        let widget = widget(ScriptedTransport::default());

        widget.set_input("   \t ");
        assert!(widget.submit().is_none());
        assert!(widget.messages().is_empty());
        assert_eq!(widget.inner.transport.calls.load(Ordering::SeqCst), 0);

        widget.set_input("");
        assert!(widget.handle_key(Key::Enter).is_none());
        assert!(widget.messages().is_empty());
    }

    #[tokio::test]
    async fn user_message_is_appended_before_the_exchange() {
        let widget = widget(ScriptedTransport::default().reply("hello", 0, Some("hi")));
        widget.set_input("  hello  ");

        let exchange = widget.submit().expect("non-empty input submits");

        // The future has not been polled yet.
        let messages = widget.messages();
        assert_eq!(messages.len(), 1);
        assert_eq!(messages[0].sender(), Sender::User);
        assert_eq!(messages[0].body(), "hello");
        assert_eq!(messages[0].style_class(), Some(USER_MESSAGE_CLASS));
        assert_eq!(widget.input(), "");
        assert_eq!(widget.inner.transport.calls.load(Ordering::SeqCst), 0);

        let reply = exchange.await;
        assert_eq!(reply.sender(), Sender::Bot);
        assert_eq!(reply.body(), "hi");
        assert_eq!(widget.messages().len(), 2);
    }

    #[tokio::test]
    async fn successful_reply_renders_markup() {
        let widget = widget(ScriptedTransport::default().reply(
            "docs",
            0,
            Some(r#"<a href="/docs">docs</a>"#),
        ));
        widget.set_input("docs");
        widget.submit().unwrap().await;

        let html = widget.with_panel(HtmlPanel::inner_html);
        assert!(html.contains(r#"<p class="bot-message"><strong>Bot:</strong> <a href="/docs">docs</a></p>"#));
        assert!(widget.with_panel(HtmlPanel::is_scrolled_to_bottom));
    }

    #[tokio::test]
    async fn failed_exchange_appends_one_error_entry() {
        let widget = widget(ScriptedTransport::default().reply("boom", 0, None));
        widget.set_input("boom");

        let terminal = widget.submit().unwrap().await;
        assert_eq!(terminal.sender(), Sender::Error);
        assert_eq!(terminal.body(), DEFAULT_ERROR_TEXT);
        assert_eq!(terminal.style_class(), Some(BOT_MESSAGE_CLASS));

        let messages = widget.messages();
        assert_eq!(messages.len(), 2);
        assert_eq!(
            messages.iter().filter(|m| m.sender() == Sender::Error).count(),
            1
        );
        assert_eq!(widget.input(), "");
    }

    #[tokio::test(start_paused = true)]
    async fn concurrent_submissions_complete_in_response_order() {
        let widget = widget(
            ScriptedTransport::default()
                .reply("slow", 200, Some("slow reply"))
                .reply("fast", 10, Some("fast reply")),
        );

        widget.set_input("slow");
        let first = widget.handle_key(Key::Enter).unwrap();
        widget.set_input("fast");
        let second = widget.handle_key(Key::Enter).unwrap();

        let (first, second) = tokio::join!(first, second);
        assert_eq!(first.unwrap().body(), "slow reply");
        assert_eq!(second.unwrap().body(), "fast reply");

        let bodies: Vec<String> = widget
            .messages()
            .iter()
            .map(|m| m.body().to_string())
            .collect();
        assert_eq!(bodies, ["slow", "fast", "fast reply", "slow reply"]);
    }

    #[tokio::test]
    async fn typing_edits_the_buffer() {
        let widget = widget(ScriptedTransport::default().reply("hi", 0, Some("hey")));

        for key in [Key::Char('h'), Key::Char('x'), Key::Backspace, Key::Char('i'), Key::Other] {
            assert!(widget.handle_key(key).is_none());
        }
        assert_eq!(widget.input(), "hi");

        let terminal = widget.handle_key(Key::Enter).unwrap().await.unwrap();
        assert_eq!(terminal.body(), "hey");
    }

    #[tokio::test]
    async fn custom_labels_are_rendered() {
        let labels = WidgetLabels {
            user: "Tú".to_string(),
            error_text: "No se pudo conectar con el servidor.".to_string(),
            ..WidgetLabels::default()
        };
        let widget = ChatWidget::with_labels(HtmlPanel::new(), ScriptedTransport::default(), labels);
        widget.set_input("hola");
        let terminal = widget.submit().unwrap().await;

        assert_eq!(terminal.body(), "No se pudo conectar con el servidor.");
        assert!(widget
            .with_panel(HtmlPanel::inner_html)
            .contains("<strong>Tú:</strong> hola"));
    }

    #[tokio::test]
    async fn history_replaces_panel_content() {
        let widget = widget(
            ScriptedTransport::default().history(&["Bot: Welcome!", "User: hi", "Bot: hello"]),
        );
        widget.append_message(Sender::User, "stale", None);

        let loaded = widget.load_history().await.unwrap();
        assert_eq!(loaded, 3);

        let messages = widget.messages();
        assert_eq!(messages.len(), 3);
        assert_eq!(messages[0].body(), "Welcome!");
        assert_eq!(messages[1].sender(), Sender::User);
        assert!(widget.with_panel(HtmlPanel::is_scrolled_to_bottom));
    }

    #[tokio::test]
    async fn failed_history_load_keeps_panel() {
        let widget = widget(ScriptedTransport::default());
        widget.append_message(Sender::User, "kept", None);

        assert!(widget.load_history().await.is_err());
        assert_eq!(widget.messages().len(), 1);
    }
}

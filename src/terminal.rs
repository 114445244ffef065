//! Terminal front end for the chat widget.
//!
//! Each line read from stdin is typed into the widget's input and submitted
//! with Enter; messages are printed as `Label: text`. Bot markup is reduced
//! to plain text before printing.

use std::io::Write;

use futures::future::join_all;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader};

use crate::config::AppConfig;
use crate::widget::{
    ChatTransport, ChatWidget, ConversationLog, HttpTransport, Key, Message, MessagePanel,
};

/// Panel that prints every appended message to a writer.
#[derive(Debug)]
pub struct TerminalPanel<W> {
    log: ConversationLog,
    out: W,
}

impl<W: Write + Send> TerminalPanel<W> {
    pub fn new(out: W) -> Self {
        Self {
            log: ConversationLog::new(),
            out,
        }
    }

    /// The underlying writer.
    pub fn get_ref(&self) -> &W {
        &self.out
    }
}

impl<W: Write + Send> MessagePanel for TerminalPanel<W> {
    fn append(&mut self, message: Message) {
        if let Err(e) = writeln!(self.out, "{}", format_plain(&message)) {
            tracing::warn!(name: "terminal.write.failed", error = %e, "Failed to print message");
        }
        self.log.push(message);
    }

    fn scroll_to_bottom(&mut self) {
        if let Err(e) = self.out.flush() {
            tracing::warn!(name: "terminal.flush.failed", error = %e, "Failed to flush output");
        }
    }

    fn clear(&mut self) {
        self.log.clear();
    }

    fn log(&self) -> &ConversationLog {
        &self.log
    }
}

/// `Label: text` with bot markup reduced to plain text.
#[must_use]
pub fn format_plain(message: &Message) -> String {
    if message.sender().allows_markup() {
        format!("{}: {}", message.label(), markup_to_text(message.body()))
    } else {
        format!("{}: {}", message.label(), message.body())
    }
}

/// Strip tags from `html`, turning `<br>` into newlines and decoding the
/// basic entities.
#[must_use]
pub fn markup_to_text(html: &str) -> String {
    let mut text = String::with_capacity(html.len());
    let mut rest = html;

    while let Some(start) = rest.find('<') {
        text.push_str(&rest[..start]);
        match rest[start..].find('>') {
            Some(end) => {
                let tag = rest[start + 1..start + end].trim().to_lowercase();
                if tag.starts_with("br") {
                    text.push('\n');
                }
                rest = &rest[start + end + 1..];
            }
            None => {
                text.push_str(&rest[start..]);
                rest = "";
            }
        }
    }
    text.push_str(rest);

    text.replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&nbsp;", " ")
        .replace("&amp;", "&")
}

/// Chat from the terminal against the backend at `base_url`.
pub async fn run(config: &AppConfig, base_url: &str) -> anyhow::Result<()> {
    let transport = HttpTransport::new(base_url, &config.widget.endpoint)?;
    let widget = ChatWidget::with_labels(
        TerminalPanel::new(std::io::stdout()),
        transport,
        config.widget_labels(),
    );

    tracing::info!(
        name: "terminal.started",
        base_url = %base_url,
        "Type a message and press Enter; Ctrl+D quits"
    );

    if config.widget.load_history {
        restore_history(&widget).await;
    }

    let submitted = run_lines(&widget, BufReader::new(tokio::io::stdin())).await?;
    tracing::info!(name: "terminal.stopped", submitted, "Input closed");
    Ok(())
}

/// Load the backend's history into the widget, returning the line count.
///
/// A failed load leaves the panel empty and the session continues.
pub async fn restore_history<P, T>(widget: &ChatWidget<P, T>) -> usize
where
    P: MessagePanel + 'static,
    T: ChatTransport + 'static,
{
    match widget.load_history().await {
        Ok(lines) => lines,
        Err(e) => {
            tracing::debug!(
                name: "terminal.history.skipped",
                error = %e,
                "Starting without history"
            );
            0
        }
    }
}

/// Feed every line of `reader` to the widget as typed input followed by
/// Enter, then wait for the outstanding exchanges.
///
/// Returns the number of submissions that reached the network stage.
pub async fn run_lines<P, T, R>(widget: &ChatWidget<P, T>, reader: R) -> anyhow::Result<usize>
where
    P: MessagePanel + 'static,
    T: ChatTransport + 'static,
    R: AsyncBufRead + Unpin,
{
    let mut lines = reader.lines();
    let mut pending = Vec::new();

    while let Some(line) = lines.next_line().await? {
        widget.set_input(line);
        if let Some(handle) = widget.handle_key(Key::Enter) {
            pending.push(handle);
        }
    }

    let submitted = pending.len();
    for result in join_all(pending).await {
        result?;
    }
    Ok(submitted)
}

#[cfg(test)]
mod tests {
    use async_trait::async_trait;

    use super::*;
    use crate::widget::{Sender, WidgetError};

    #[derive(Debug)]
    struct UppercaseTransport;

    #[derive(Debug)]
    struct HistoryTransport(Option<Vec<String>>);

    #[async_trait]
    impl ChatTransport for HistoryTransport {
        async fn send_message(&self, _message: &str) -> crate::widget::Result<String> {
            Err(WidgetError::MissingReply)
        }

        async fn fetch_history(&self) -> crate::widget::Result<Vec<String>> {
            self.0.clone().ok_or(WidgetError::MissingReply)
        }
    }

    #[async_trait]
    impl ChatTransport for UppercaseTransport {
        async fn send_message(&self, message: &str) -> crate::widget::Result<String> {
            if message == "fail" {
                return Err(WidgetError::MissingReply);
            }
            Ok(format!("<b>{}</b>", message.to_uppercase()))
        }

        async fn fetch_history(&self) -> crate::widget::Result<Vec<String>> {
            Ok(Vec::new())
        }
    }

    #[test]
    fn markup_is_flattened() {
        assert_eq!(
            markup_to_text(r#"Hi!<br><br>See <a href="/x">docs</a> &amp; more"#),
            "Hi!\n\nSee docs & more"
        );
        assert_eq!(markup_to_text("a < b"), "a < b");
        assert_eq!(markup_to_text("line<BR/>next"), "line\nnext");
    }

    #[test]
    fn user_text_is_printed_verbatim() {
        let msg = Message::new(Sender::User, "<b>raw</b>", None);
        assert_eq!(format_plain(&msg), "User: <b>raw</b>");
    }

    #[tokio::test]
    async fn lines_are_submitted_and_printed() {
        let widget = ChatWidget::new(TerminalPanel::new(Vec::new()), UppercaseTransport);
        let input: &[u8] = b"hello\n   \nfail\n";

        let submitted = run_lines(&widget, input).await.unwrap();
        assert_eq!(submitted, 2);

        let messages = widget.messages();
        assert_eq!(messages.len(), 4);
        let typed: Vec<&str> = messages
            .iter()
            .filter(|m| m.sender() == Sender::User)
            .map(Message::body)
            .collect();
        assert_eq!(typed, ["hello", "fail"]);
        assert_eq!(
            messages.iter().filter(|m| m.sender() == Sender::Error).count(),
            1
        );

        let output = widget.with_panel(|p| String::from_utf8_lossy(p.get_ref()).into_owned());
        assert!(output.contains("User: hello\n"));
        assert!(output.contains("Bot: HELLO\n"));
        assert!(output.contains("Error: Could not reach the server.\n"));
    }

    #[tokio::test]
    async fn history_is_restored_before_chatting() {
        let lines = vec!["Bot: Welcome".to_string(), "User: hi".to_string()];
        let widget = ChatWidget::new(TerminalPanel::new(Vec::new()), HistoryTransport(Some(lines)));

        assert_eq!(restore_history(&widget).await, 2);
        let output = widget.with_panel(|p| String::from_utf8_lossy(p.get_ref()).into_owned());
        assert_eq!(output, "Bot: Welcome\nUser: hi\n");
    }

    #[tokio::test]
    async fn failed_history_restore_continues_empty() {
        let widget = ChatWidget::new(TerminalPanel::new(Vec::new()), HistoryTransport(None));

        assert_eq!(restore_history(&widget).await, 0);
        assert!(widget.messages().is_empty());
    }
}

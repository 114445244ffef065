//! HTML pages.
//!
//! The chat page provides the widget's element contract: the `#chatbox`
//! panel, the `#message` input and its `#userInput` container. Widget
//! settings reach the browser runtime through `data-*` attributes.

use crate::config::AppConfig;
use crate::widget::dom::{CHATBOX_ID, MESSAGE_INPUT_ID, USER_INPUT_ID};
use crate::widget::escape_html;

/// Generate the HTML shell for the application.
pub fn html_shell(title: &str, content: &str) -> String {
    let title = escape_html(title);
    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="utf-8">
    <meta name="viewport" content="width=device-width, initial-scale=1">
    <meta name="description" content="Chat assistant">
    <title>{title}</title>
    <link rel="stylesheet" href="/static/app.css">
    <script defer src="/static/chat-widget.js"></script>
</head>
<body>
    <main id="app">
        {content}
    </main>
</body>
</html>"#
    )
}

/// Chat page content.
pub fn chat_content(config: &AppConfig) -> String {
    let widget = &config.widget;
    format!(
        r#"
        <section class="chat-shell">
            <div id="{CHATBOX_ID}" class="chatbox" aria-live="polite" aria-label="Chat messages"
                 data-endpoint="{endpoint}"
                 data-load-history="{load_history}"
                 data-user-label="{user_label}"
                 data-bot-label="{bot_label}"
                 data-error-label="{error_label}"
                 data-error-text="{error_text}"></div>
            <div id="{USER_INPUT_ID}" class="user-input">
                <input id="{MESSAGE_INPUT_ID}" type="text" autocomplete="off"
                       placeholder="Type your message and press Enter">
            </div>
        </section>
        "#,
        endpoint = escape_html(&widget.endpoint),
        load_history = widget.load_history,
        user_label = escape_html(&widget.user_label),
        bot_label = escape_html(&widget.bot_label),
        error_label = escape_html(&widget.error_label),
        error_text = escape_html(&widget.error_text),
    )
}

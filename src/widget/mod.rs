//! Chat widget core.
//!
//! The widget renders messages into a scrollable panel, captures the text
//! typed into its input, posts it to the backend and renders the reply. Every
//! front end (the terminal client, tests) drives the same [`ChatWidget`].
//!
//! # Architecture
//!
//! - [`Message`] / [`ConversationLog`]: immutable chat lines and the
//!   append-only log they live in
//! - [`MessagePanel`]: the scrollable `#chatbox` panel ([`HtmlPanel`] keeps
//!   rendered markup in memory)
//! - [`ChatTransport`]: the single request/response exchange
//!   ([`HttpTransport`] posts JSON with reqwest)
//! - [`ChatWidget`]: input buffer, key binding and submission flow
//!
//! # Example
//!
//! ```rust,no_run
//! use chat_widget::widget::{ChatWidget, HtmlPanel, HttpTransport, Key};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let transport = HttpTransport::new("http://127.0.0.1:3000", "/send_message")?;
//! let widget = ChatWidget::new(HtmlPanel::new(), transport);
//!
//! widget.set_input("hello");
//! if let Some(handle) = widget.handle_key(Key::Enter) {
//!     handle.await?;
//! }
//! assert_eq!(widget.messages().len(), 2);
//! # Ok(())
//! # }
//! ```

mod chat;
pub mod dom;
mod error;
mod history;
mod log;
mod message;
mod panel;
mod transport;

pub use chat::{ChatWidget, DEFAULT_ERROR_TEXT, WidgetLabels};
pub use dom::Key;
pub use error::{Result, WidgetError};
pub use history::parse_history_line;
pub use log::ConversationLog;
pub use message::{BOT_MESSAGE_CLASS, Message, Sender, USER_MESSAGE_CLASS, escape_html};
pub use panel::{HtmlPanel, MessagePanel};
pub use transport::{ChatTransport, HttpTransport, parse_reply};

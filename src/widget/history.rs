//! Turning backend history lines back into messages.

use super::message::{BOT_MESSAGE_CLASS, Message, Sender, USER_MESSAGE_CLASS};

/// Labels the backend (or older deployments) use for the user.
const USER_LABELS: &[&str] = &["User", "Usuario", "Tú"];

/// Labels used for bot lines.
const BOT_LABELS: &[&str] = &["Bot", "Sucre"];

/// Parse a `"Sender: text"` history line.
///
/// The line is split on the first `": "`; a line without one becomes a
/// message labelled with the whole line and an empty body. Unknown labels
/// keep their label, get no style class and are rendered escaped.
#[must_use]
pub fn parse_history_line(line: &str) -> Message {
    let (label, body) = line.split_once(": ").unwrap_or((line, ""));

    let (sender, class) = if USER_LABELS.contains(&label) {
        (Sender::User, Some(USER_MESSAGE_CLASS))
    } else if BOT_LABELS.contains(&label) {
        (Sender::Bot, Some(BOT_MESSAGE_CLASS))
    } else if label == Sender::Error.default_label() {
        (Sender::Error, None)
    } else {
        (Sender::User, None)
    };

    Message::with_label(sender, label, body, class)
}

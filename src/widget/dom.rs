//! Element identifiers and key events shared by every front end.

/// Scrollable message panel.
pub const CHATBOX_ID: &str = "chatbox";

/// Text input the user types into.
pub const MESSAGE_INPUT_ID: &str = "message";

/// Container wrapping the text input.
pub const USER_INPUT_ID: &str = "userInput";

/// Key events delivered to the focused input field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    /// Submits the current input.
    Enter,
    /// A printable character typed into the field.
    Char(char),
    /// Deletes the last character.
    Backspace,
    /// Anything else; ignored.
    Other,
}

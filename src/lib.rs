//! Chat widget, reply backend and terminal front end.
//!
//! A chat widget renders messages to a scroll panel, captures user input,
//! posts it to `POST /send_message` and renders the reply or an inline error.
//!
//! # Architecture
//!
//! - **Widget**: panel, input buffer and one HTTP exchange per submission
//! - **Server**: Axum backend serving the chat page, `/send_message` and
//!   `/get_history`
//! - **Bot**: pluggable reply engines (greetings, OpenAI-compatible
//!   completions, echo)
//! - **Terminal**: the same widget driven from stdin and rendered to stdout
//!
//! # Modules
//!
//! - [`widget`]: widget core, panels and transports
//! - [`protocol`]: JSON wire types
//! - [`server`]: router, handlers and pages
//! - [`bot`]: reply engines
//! - [`history`]: the backend's in-memory conversation
//! - [`terminal`]: stdin/stdout front end
//! - [`config`]: layered configuration

// Allow pedantic clippy warnings that don't add value for this codebase
#![allow(clippy::missing_fields_in_debug)]
#![allow(clippy::unused_async)]
#![allow(clippy::cargo_common_metadata)]
#![allow(clippy::multiple_crate_versions)]

pub mod bot;
pub mod config;
pub mod history;
pub mod protocol;
pub mod server;
pub mod terminal;
pub mod widget;

use std::sync::Arc;

use bot::ReplyEngine;
use config::AppConfig;
use history::ConversationHistory;

/// Application state shared across all handlers.
#[derive(Clone, Debug)]
pub struct AppState {
    /// Reply engine answering `/send_message`.
    pub engine: Arc<dyn ReplyEngine>,
    /// The single conversation this backend keeps.
    pub history: ConversationHistory,
    /// Global configuration.
    pub config: Arc<AppConfig>,
}

impl AppState {
    /// Build state with the engine stack described by `config`.
    #[must_use]
    pub fn new(config: Arc<AppConfig>) -> Self {
        let engine = bot::build_engine(&config);
        Self::with_engine(config, engine)
    }

    /// Build state around a specific engine.
    #[must_use]
    pub fn with_engine(config: Arc<AppConfig>, engine: Arc<dyn ReplyEngine>) -> Self {
        let history = ConversationHistory::new(Some(config.bot.greeting.clone()));
        Self {
            engine,
            history,
            config,
        }
    }
}

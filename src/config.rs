//! Layered application configuration.
//!
//! Priority, lowest first: built-in defaults, config file (`--config` /
//! `CONFIG_FILE`, else an optional `./config.{yaml,toml,json}`),
//! `CHAT_`-prefixed environment variables (`CHAT_SERVER__PORT=8080`), the
//! legacy `LLM_*` variables, and finally CLI flags.

use clap::{Parser, Subcommand};
use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::env;

use crate::widget::WidgetLabels;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Config file path
    #[arg(short, long, env = "CONFIG_FILE", global = true)]
    pub config: Option<String>,

    /// Port to listen on
    #[arg(long, env = "PORT", global = true)]
    pub port: Option<u16>,

    /// Address to bind
    #[arg(long, global = true)]
    pub host: Option<String>,

    /// Load the backend history when the widget starts
    #[arg(long, global = true)]
    pub load_history: Option<bool>,

    /// Emit logs as JSON
    #[arg(long, global = true)]
    pub log_json: Option<bool>,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand, Debug, Clone, Default, PartialEq, Eq)]
pub enum Command {
    /// Run the chat backend and serve the chat page
    #[default]
    Serve,
    /// Chat from the terminal against a running backend
    Chat {
        /// Backend base URL
        #[arg(long, default_value = "http://127.0.0.1:3000")]
        url: String,
    },
}

#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub widget: WidgetConfig,
    pub bot: BotConfig,
    pub llm: LlmConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub port: u16,
    pub host: String,
    /// Directory served under `/static`.
    pub static_dir: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct WidgetConfig {
    /// Path the widget posts messages to.
    pub endpoint: String,
    pub user_label: String,
    pub bot_label: String,
    pub error_label: String,
    /// Fixed text of the error entry.
    pub error_text: String,
    /// Replace the panel with `GET /get_history` on start.
    pub load_history: bool,
}

#[derive(Debug, Deserialize, Clone)]
pub struct BotConfig {
    /// First history line, spoken by the bot.
    pub greeting: String,
    /// Reply to a greeting on the user's first turn.
    pub welcome: String,
    /// Reply to a greeting on later turns.
    pub welcome_back: String,
}

/// OpenAI-compatible completion backend. Disabled unless both `base_url`
/// and `model` are set.
#[derive(Debug, Deserialize, Clone)]
pub struct LlmConfig {
    pub base_url: Option<String>,
    pub model: Option<String>,
    pub api_key: Option<String>,
    pub system_prompt: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct LoggingConfig {
    pub json: bool,
}

impl AppConfig {
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from_args(std::env::args())
    }

    pub fn load_from_args<I, T>(args: I) -> Result<Self, ConfigError>
    where
        I: IntoIterator<Item = T>,
        T: Into<std::ffi::OsString> + Clone,
    {
        let cli =
            Cli::try_parse_from(args).map_err(|e| ConfigError::Message(e.to_string()))?;
        Self::from_cli(&cli)
    }

    pub fn from_cli(cli: &Cli) -> Result<Self, ConfigError> {
        let mut builder = Config::builder();

        // 1. Defaults
        builder = builder
            .set_default("server.port", 3000)?
            .set_default("server.host", "127.0.0.1")?
            .set_default("server.static_dir", "static")?
            .set_default("widget.endpoint", crate::protocol::SEND_MESSAGE_PATH)?
            .set_default("widget.user_label", "User")?
            .set_default("widget.bot_label", "Bot")?
            .set_default("widget.error_label", "Error")?
            .set_default("widget.error_text", crate::widget::DEFAULT_ERROR_TEXT)?
            .set_default("widget.load_history", false)?
            .set_default(
                "bot.greeting",
                "Hello! I'm your virtual assistant. How can I help you today?",
            )?
            .set_default(
                "bot.welcome",
                "Hello! 🤖<br><br>Ask me anything and I'll do my best to answer.",
            )?
            .set_default("bot.welcome_back", "Hello again! What else can I help you with?")?
            .set_default("llm.system_prompt", "You are a concise, helpful assistant.")?
            .set_default("logging.json", false)?;

        // 2. Config file
        builder = match &cli.config {
            Some(path) => builder.add_source(File::with_name(path).required(true)),
            None => builder.add_source(File::with_name("config").required(false)),
        };

        // 3. Environment (CHAT_SERVER__PORT=8000)
        builder = builder.add_source(
            Environment::with_prefix("CHAT")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        // 4. Legacy LLM variables
        for (var, key) in [
            ("LLM_BASE_URL", "llm.base_url"),
            ("LLM_MODEL", "llm.model"),
            ("LLM_API_KEY", "llm.api_key"),
        ] {
            if let Ok(val) = env::var(var) {
                if !val.trim().is_empty() {
                    builder = builder.set_override(key, val)?;
                }
            }
        }

        // 5. CLI flags
        if let Some(port) = cli.port {
            builder = builder.set_override("server.port", port)?;
        }
        if let Some(host) = &cli.host {
            builder = builder.set_override("server.host", host.as_str())?;
        }
        if let Some(load) = cli.load_history {
            builder = builder.set_override("widget.load_history", load)?;
        }
        if let Some(json) = cli.log_json {
            builder = builder.set_override("logging.json", json)?;
        }

        builder.build()?.try_deserialize()
    }

    /// Address the server binds to.
    #[must_use]
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }

    /// Sender labels for widgets built from this configuration.
    #[must_use]
    pub fn widget_labels(&self) -> WidgetLabels {
        WidgetLabels {
            user: self.widget.user_label.clone(),
            bot: self.widget.bot_label.clone(),
            error: self.widget.error_label.clone(),
            error_text: self.widget.error_text.clone(),
        }
    }
}

impl LlmConfig {
    /// `(base_url, model)` when the completion backend is configured.
    #[must_use]
    pub fn endpoint(&self) -> Option<(&str, &str)> {
        let base_url = self.base_url.as_deref().filter(|s| !s.trim().is_empty())?;
        let model = self.model.as_deref().filter(|s| !s.trim().is_empty())?;
        Some((base_url, model))
    }
}

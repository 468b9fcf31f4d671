//! Process configuration loaded from environment variables.
//!
//! Only the bot token is mandatory. Every other variable is optional and its
//! absence degrades the corresponding feature to "unavailable" instead of
//! failing startup.

use anyhow::{Context, Result};
use std::env;

use crate::sources::llm::LlmConfig;

/// Default SQLite database path when DATABASE_URL is not set.
pub const DEFAULT_DATABASE_PATH: &str = "tasks.db";

/// Default port for the webhook HTTP listener.
pub const DEFAULT_PORT: u16 = 8080;

/// Webhook transport settings. Present only when WEBHOOK_URL is configured;
/// otherwise the bot falls back to long polling.
#[derive(Debug, Clone)]
pub struct WebhookConfig {
    /// External base URL used to construct the webhook callback.
    pub external_url: String,
    /// Port for the local HTTP listener.
    pub port: u16,
}

/// Top-level application configuration.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Telegram bot API token. Required.
    pub bot_token: String,
    /// Path to the SQLite task database.
    pub database_path: String,
    /// OpenWeatherMap API key. None disables /weather.
    pub weather_api_key: Option<String>,
    /// LLM completion endpoint settings. None disables the LLM source and
    /// the answer augmentation step.
    pub llm: Option<LlmConfig>,
    /// Webhook settings. None means long polling.
    pub webhook: Option<WebhookConfig>,
}

impl AppConfig {
    /// Load configuration from process environment variables.
    pub fn from_env() -> Result<Self> {
        Self::from_vars(|key| env::var(key).ok())
    }

    fn from_vars(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let bot_token = lookup("TELEGRAM_BOT_TOKEN")
            .filter(|t| !t.trim().is_empty())
            .context("TELEGRAM_BOT_TOKEN must be set")?;

        let database_path =
            lookup("DATABASE_URL").unwrap_or_else(|| DEFAULT_DATABASE_PATH.to_string());

        let weather_api_key = lookup("OPENWEATHER_API_KEY").filter(|k| !k.trim().is_empty());

        let llm = lookup("OPENAI_API_KEY")
            .filter(|k| !k.trim().is_empty())
            .map(|api_key| {
                let mut config = LlmConfig::new(api_key);
                if let Some(base_url) = lookup("OPENAI_BASE_URL") {
                    config.base_url = base_url;
                }
                if let Some(model) = lookup("OPENAI_MODEL") {
                    config.model = model;
                }
                config
            });

        let webhook = match lookup("WEBHOOK_URL") {
            Some(external_url) if !external_url.trim().is_empty() => {
                let port = match lookup("PORT") {
                    Some(raw) => raw
                        .parse::<u16>()
                        .with_context(|| format!("PORT is not a valid port number: {raw}"))?,
                    None => DEFAULT_PORT,
                };
                Some(WebhookConfig { external_url, port })
            }
            _ => None,
        };

        Ok(Self {
            bot_token,
            database_path,
            weather_api_key,
            llm,
            webhook,
        })
    }
}

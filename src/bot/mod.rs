//! Bot module for handling Telegram interactions.
//!
//! - `message_handler`: routes incoming text, photo, and document messages
//! - `ui_builder`: formats reply texts

pub mod message_handler;
pub mod ui_builder;

pub use message_handler::{message_handler, Command};

use sqlx::sqlite::SqlitePool;
use std::sync::Arc;

use crate::history::HistoryStore;
use crate::pipeline::AnswerPipeline;
use crate::weather::WeatherClient;

/// Shared application state injected into every handler invocation.
#[derive(Clone)]
pub struct AppState {
    pub pipeline: Arc<AnswerPipeline>,
    pub history: Arc<HistoryStore>,
    pub pool: SqlitePool,
    /// None when OPENWEATHER_API_KEY is not configured.
    pub weather: Option<WeatherClient>,
    /// Needed to parse commands addressed as /cmd@botname.
    pub bot_username: String,
}

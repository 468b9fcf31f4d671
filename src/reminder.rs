//! One-shot reminders for the /remind command.
//!
//! A reminder is a spawned task that sleeps and sends one message. Nothing
//! is persisted: pending reminders are lost on restart, same as history.

use lazy_static::lazy_static;
use regex::Regex;
use std::time::Duration;
use teloxide::prelude::*;
use tracing::{error, info};

use crate::localization::t_args_lang;

/// Longest accepted reminder delay: seven days.
pub const MAX_REMINDER_MINUTES: u64 = 7 * 24 * 60;

lazy_static! {
    // "через 15 минут вынести мусор" or the bare "/remind 15 вынести мусор" tail
    static ref RELATIVE_FORM: Regex =
        Regex::new(r"(?i)^через\s+(\d+)\s+мин\w*\s+(.+)$").expect("reminder regex is valid");
    static ref BARE_FORM: Regex =
        Regex::new(r"^(\d+)\s+(.+)$").expect("reminder regex is valid");
}

/// Parse the argument of /remind into (minutes, message text).
pub fn parse_reminder(args: &str) -> Option<(u64, String)> {
    let args = args.trim();

    let captures = RELATIVE_FORM
        .captures(args)
        .or_else(|| BARE_FORM.captures(args))?;

    let minutes: u64 = captures.get(1)?.as_str().parse().ok()?;
    if minutes == 0 || minutes > MAX_REMINDER_MINUTES {
        return None;
    }

    let text = captures.get(2)?.as_str().trim().to_string();
    Some((minutes, text))
}

/// Schedule a reminder message for `chat_id` after `minutes`.
pub fn schedule_reminder(
    bot: Bot,
    chat_id: ChatId,
    minutes: u64,
    text: String,
    language_code: Option<String>,
) {
    info!(chat_id = %chat_id, minutes, "Reminder scheduled");

    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_secs(minutes * 60)).await;

        let message = t_args_lang("remind-fire", &[("text", &text)], language_code.as_deref());
        if let Err(e) = bot.send_message(chat_id, message).await {
            error!(chat_id = %chat_id, error = %e, "Failed to deliver reminder");
        }
    });
}

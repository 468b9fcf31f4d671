//! Routing of incoming Telegram messages.
//!
//! Every message ends in exactly one reply: commands get their handler,
//! free text and recognized photo text go through the answer pipeline, and
//! any handler error is caught at the top so the user sees a generic error
//! instead of silence.

use anyhow::Result;
use std::sync::LazyLock;
use teloxide::prelude::*;
use teloxide::types::{ChatAction, FileId};
use teloxide::utils::command::BotCommands;
use tracing::{debug, error, info, warn};

use crate::db;
use crate::dialogue::{validate_question, AskDialogue, AskState};
use crate::instance_manager::OcrInstanceManager;
use crate::localization::{t_args_lang, t_lang};
use crate::ocr;
use crate::ocr_config::OcrConfig;
use crate::ocr_errors::OcrError;
use crate::pipeline::{Query, QuerySource, Resolution};
use crate::preprocess;
use crate::reminder;

use super::ui_builder::{format_history, format_task_list, format_weather};
use super::AppState;

static OCR_CONFIG: LazyLock<OcrConfig> = LazyLock::new(OcrConfig::default);
static OCR_INSTANCE_MANAGER: LazyLock<OcrInstanceManager> =
    LazyLock::new(OcrInstanceManager::default);

/// Commands the bot understands. Free text that is not a command is treated
/// as a question.
#[derive(BotCommands, Clone, Debug, PartialEq)]
#[command(rename_rule = "lowercase")]
pub enum Command {
    Start,
    Help,
    /// Next message becomes the question.
    Ask,
    Add(String),
    List,
    Done(String),
    Weather(String),
    Remind(String),
    History,
}

/// Entry point registered with the dispatcher. Catches every handler error
/// and answers with a localized generic message so the conversation never
/// hangs.
pub async fn message_handler(
    bot: Bot,
    msg: Message,
    dialogue: AskDialogue,
    state: AppState,
) -> Result<()> {
    let language_code = msg
        .from
        .as_ref()
        .and_then(|user| user.language_code.clone());
    let lang = language_code.as_deref();

    if let Err(e) = dispatch_message(&bot, &msg, &dialogue, &state, lang).await {
        error!(user_id = %msg.chat.id, error = ?e, "Message handler failed");
        if let Err(send_err) = bot
            .send_message(msg.chat.id, t_lang("error-generic", lang))
            .await
        {
            error!(user_id = %msg.chat.id, error = ?send_err, "Failed to send error reply");
        }
    }

    Ok(())
}

async fn dispatch_message(
    bot: &Bot,
    msg: &Message,
    dialogue: &AskDialogue,
    state: &AppState,
    lang: Option<&str>,
) -> Result<()> {
    if let Some(text) = msg.text() {
        handle_text_message(bot, msg, dialogue, state, text, lang).await
    } else if msg.photo().is_some() {
        handle_photo_message(bot, msg, state, lang).await
    } else if msg.document().is_some() {
        handle_document_message(bot, msg, state, lang).await
    } else {
        bot.send_message(msg.chat.id, t_lang("unsupported-message", lang))
            .await?;
        Ok(())
    }
}

async fn handle_text_message(
    bot: &Bot,
    msg: &Message,
    dialogue: &AskDialogue,
    state: &AppState,
    text: &str,
    lang: Option<&str>,
) -> Result<()> {
    debug!(user_id = %msg.chat.id, chars = text.len(), "Received text message");

    // A user who sent /ask gets their next plain message consumed as the
    // question; commands still take precedence so the state cannot wedge.
    if dialogue.get().await? == Some(AskState::AwaitingQuestion) && !text.starts_with('/') {
        dialogue.update(AskState::Idle).await?;
        return match validate_question(text) {
            Ok(question) => {
                answer_query(bot, msg, state, Query::new(question, QuerySource::Typed), lang).await
            }
            Err("too_long") => {
                bot.send_message(msg.chat.id, t_lang("ask-too-long", lang))
                    .await?;
                Ok(())
            }
            Err(_) => {
                bot.send_message(msg.chat.id, t_lang("ask-empty", lang))
                    .await?;
                Ok(())
            }
        };
    }

    match Command::parse(text, &state.bot_username) {
        Ok(command) => handle_command(bot, msg, dialogue, state, command, lang).await,
        Err(_) if text.starts_with('/') => {
            bot.send_message(msg.chat.id, t_lang("unknown-command", lang))
                .await?;
            Ok(())
        }
        Err(_) => {
            answer_query(bot, msg, state, Query::new(text, QuerySource::Typed), lang).await
        }
    }
}

async fn handle_command(
    bot: &Bot,
    msg: &Message,
    dialogue: &AskDialogue,
    state: &AppState,
    command: Command,
    lang: Option<&str>,
) -> Result<()> {
    let chat_id = msg.chat.id;

    match command {
        Command::Start => {
            let text = format!(
                "{}\n\n{}",
                t_lang("welcome-title", lang),
                t_lang("welcome-body", lang)
            );
            bot.send_message(chat_id, text).await?;
        }
        Command::Help => {
            let text = format!(
                "{}\n\n{}",
                t_lang("help-title", lang),
                t_lang("help-body", lang)
            );
            bot.send_message(chat_id, text).await?;
        }
        Command::Ask => {
            dialogue.update(AskState::AwaitingQuestion).await?;
            bot.send_message(chat_id, t_lang("ask-prompt", lang)).await?;
        }
        Command::Add(args) => {
            let text = args.trim();
            if text.is_empty() {
                bot.send_message(chat_id, t_lang("task-usage-add", lang))
                    .await?;
            } else {
                db::add_task(&state.pool, chat_id.0, text).await?;
                bot.send_message(chat_id, t_args_lang("task-added", &[("task", text)], lang))
                    .await?;
            }
        }
        Command::List => {
            let tasks = db::list_open_tasks(&state.pool, chat_id.0).await?;
            let reply = if tasks.is_empty() {
                t_lang("task-list-empty", lang)
            } else {
                format_task_list(&tasks, lang)
            };
            bot.send_message(chat_id, reply).await?;
        }
        Command::Done(args) => match args.trim().parse::<usize>() {
            Ok(index) => match db::complete_task(&state.pool, chat_id.0, index).await? {
                Some(task) => {
                    bot.send_message(
                        chat_id,
                        t_args_lang("task-done", &[("task", &task.task)], lang),
                    )
                    .await?;
                }
                None => {
                    bot.send_message(chat_id, t_lang("task-invalid-index", lang))
                        .await?;
                }
            },
            Err(_) => {
                bot.send_message(chat_id, t_lang("task-usage-done", lang))
                    .await?;
            }
        },
        Command::Weather(args) => {
            let city = args.trim();
            if city.is_empty() {
                bot.send_message(chat_id, t_lang("weather-usage", lang))
                    .await?;
            } else if let Some(weather) = &state.weather {
                match weather.current(city).await {
                    Ok(report) => {
                        bot.send_message(chat_id, format_weather(&report, lang))
                            .await?;
                    }
                    Err(e) => {
                        warn!(city, error = %e, "Weather lookup failed");
                        bot.send_message(
                            chat_id,
                            t_args_lang("weather-failed", &[("city", city)], lang),
                        )
                        .await?;
                    }
                }
            } else {
                bot.send_message(chat_id, t_lang("weather-unavailable", lang))
                    .await?;
            }
        }
        Command::Remind(args) => match reminder::parse_reminder(&args) {
            Some((minutes, text)) => {
                reminder::schedule_reminder(
                    bot.clone(),
                    chat_id,
                    minutes,
                    text,
                    lang.map(|s| s.to_string()),
                );
                bot.send_message(
                    chat_id,
                    t_args_lang("remind-set", &[("minutes", &minutes.to_string())], lang),
                )
                .await?;
            }
            None => {
                bot.send_message(chat_id, t_lang("remind-usage", lang))
                    .await?;
            }
        },
        Command::History => {
            let entries = state.history.get(chat_id.0);
            let reply = if entries.is_empty() {
                t_lang("history-empty", lang)
            } else {
                format_history(&entries, lang)
            };
            bot.send_message(chat_id, reply).await?;
        }
    }

    Ok(())
}

/// Run a query through the pipeline and reply with the result. Successful
/// answers are appended to the user's history.
async fn answer_query(
    bot: &Bot,
    msg: &Message,
    state: &AppState,
    query: Query,
    lang: Option<&str>,
) -> Result<()> {
    let chat_id = msg.chat.id;
    bot.send_chat_action(chat_id, ChatAction::Typing).await?;
    info!(user_id = %chat_id, source = ?query.source, "Resolving query");

    match state.pipeline.resolve(&query).await {
        Resolution::Answered { text, sources } => {
            let reply = format!(
                "{text}\n\n{}",
                t_args_lang(
                    "answer-sources",
                    &[("sources", sources.join(", ").as_str())],
                    lang
                )
            );
            bot.send_message(chat_id, reply).await?;
            state.history.append(chat_id.0, &query.normalized, &text);
        }
        Resolution::NotFound => {
            bot.send_message(chat_id, t_lang("answer-not-found", lang))
                .await?;
        }
    }

    Ok(())
}

async fn handle_photo_message(
    bot: &Bot,
    msg: &Message,
    state: &AppState,
    lang: Option<&str>,
) -> Result<()> {
    let Some(largest_photo) = msg.photo().and_then(|photos| photos.last()) else {
        return Ok(());
    };

    recognize_and_answer(bot, msg, state, largest_photo.file.id.clone(), lang).await
}

async fn handle_document_message(
    bot: &Bot,
    msg: &Message,
    state: &AppState,
    lang: Option<&str>,
) -> Result<()> {
    let Some(doc) = msg.document() else {
        return Ok(());
    };

    let is_image = doc
        .mime_type
        .as_ref()
        .is_some_and(|mime| mime.to_string().starts_with("image/"));

    if !is_image {
        bot.send_message(msg.chat.id, t_lang("unsupported-message", lang))
            .await?;
        return Ok(());
    }

    recognize_and_answer(bot, msg, state, doc.file.id.clone(), lang).await
}

/// Photo path: download, pre-process, OCR, then resolve the recognized text
/// like a typed question. Sub-threshold OCR output stops here; no search is
/// made for garbage.
async fn recognize_and_answer(
    bot: &Bot,
    msg: &Message,
    state: &AppState,
    file_id: FileId,
    lang: Option<&str>,
) -> Result<()> {
    let chat_id = msg.chat.id;

    let bytes = match download_file(bot, file_id).await {
        Ok(bytes) => bytes,
        Err(e) => {
            error!(user_id = %chat_id, error = %e, "Failed to download photo");
            bot.send_message(chat_id, t_lang("photo-download-failed", lang))
                .await?;
            return Ok(());
        }
    };

    // Reject oversized or unsupported payloads before burning CPU on them.
    if let Err(e) = ocr::validate_image(&bytes, &OCR_CONFIG) {
        info!(user_id = %chat_id, error = %e, "Image rejected before pre-processing");
        bot.send_message(chat_id, t_lang("ocr-failed", lang))
            .await?;
        return Ok(());
    }

    bot.send_message(chat_id, t_lang("ocr-processing", lang))
        .await?;

    // Pre-processing is CPU-bound, keep it off the dispatch path.
    let processed = tokio::task::spawn_blocking(move || preprocess::prepare_for_ocr(&bytes)).await?;

    match ocr::extract_text_from_image(processed, &OCR_CONFIG, &OCR_INSTANCE_MANAGER).await {
        Ok(text) => {
            bot.send_message(
                chat_id,
                t_args_lang("ocr-recognized", &[("text", &text)], lang),
            )
            .await?;
            answer_query(bot, msg, state, Query::new(text, QuerySource::Photo), lang).await
        }
        Err(OcrError::TooShort { found, minimum }) => {
            info!(user_id = %chat_id, found, minimum, "OCR result below threshold");
            bot.send_message(chat_id, t_lang("ocr-no-text", lang))
                .await?;
            Ok(())
        }
        Err(e) => {
            error!(user_id = %chat_id, error = %e, "OCR processing failed");
            bot.send_message(chat_id, t_lang("ocr-failed", lang))
                .await?;
            Ok(())
        }
    }
}

async fn download_file(bot: &Bot, file_id: FileId) -> Result<Vec<u8>> {
    let file = bot.get_file(file_id).await?;
    let url = format!(
        "https://api.telegram.org/file/bot{}/{}",
        bot.token(),
        file.path
    );

    let response = reqwest::get(&url).await?.error_for_status()?;
    Ok(response.bytes().await?.to_vec())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_command_parsing() {
        assert_eq!(Command::parse("/start", "znayka_bot").unwrap(), Command::Start);
        assert_eq!(
            Command::parse("/add купить молоко", "znayka_bot").unwrap(),
            Command::Add("купить молоко".to_string())
        );
        assert_eq!(
            Command::parse("/done 2", "znayka_bot").unwrap(),
            Command::Done("2".to_string())
        );
        assert_eq!(
            Command::parse("/weather Москва", "znayka_bot").unwrap(),
            Command::Weather("Москва".to_string())
        );
    }

    #[test]
    fn test_command_parsing_with_bot_mention() {
        assert_eq!(
            Command::parse("/list@znayka_bot", "znayka_bot").unwrap(),
            Command::List
        );
    }

    #[test]
    fn test_free_text_is_not_a_command() {
        assert!(Command::parse("что такое гравитация", "znayka_bot").is_err());
        assert!(Command::parse("/unknowncmd", "znayka_bot").is_err());
    }
}

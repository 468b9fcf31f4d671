use anyhow::{Context, Result};
use log::info;
use std::sync::Arc;
use teloxide::dispatching::dialogue::InMemStorage;
use teloxide::prelude::*;
use teloxide::update_listeners::webhooks;

use znayka::bot::{self, AppState};
use znayka::config::AppConfig;
use znayka::db;
use znayka::dialogue::AskState;
use znayka::history::HistoryStore;
use znayka::pipeline::AnswerPipeline;
use znayka::sources::{
    DuckDuckGoSource, KnowledgeSource, LlmClient, LlmSource, SearchSource, WikipediaSource,
};
use znayka::weather::WeatherClient;

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::init();
    dotenv::dotenv().ok();

    info!("Starting Znayka Telegram Bot");

    let config = AppConfig::from_env()?;

    let pool = db::connect(&config.database_path).await?;
    db::init_schema(&pool).await?;

    let llm_client = match &config.llm {
        Some(llm_config) => Some(LlmClient::new(llm_config.clone())?),
        None => {
            info!("No LLM API key configured, LLM source and augmentation disabled");
            None
        }
    };

    let mut sources: Vec<Box<dyn SearchSource>> = vec![
        Box::new(KnowledgeSource::new()),
        Box::new(DuckDuckGoSource::new()?),
        Box::new(WikipediaSource::new("ru")?),
    ];
    if let Some(client) = &llm_client {
        sources.push(Box::new(LlmSource::new(client.clone())));
    }

    let pipeline = Arc::new(AnswerPipeline::new(sources, llm_client));

    let weather = match &config.weather_api_key {
        Some(key) => Some(WeatherClient::new(key.clone())?),
        None => {
            info!("No weather API key configured, /weather disabled");
            None
        }
    };

    let bot = Bot::new(&config.bot_token);
    let me = bot.get_me().await.context("Failed to reach the Telegram API")?;
    info!("Bot authorized as @{}", me.username());

    let state = AppState {
        pipeline,
        history: Arc::new(HistoryStore::new()),
        pool,
        weather,
        bot_username: me.username().to_string(),
    };

    let handler = Update::filter_message()
        .enter_dialogue::<Message, InMemStorage<AskState>, AskState>()
        .endpoint(bot::message_handler);

    let mut dispatcher = Dispatcher::builder(bot.clone(), handler)
        .dependencies(dptree::deps![state, InMemStorage::<AskState>::new()])
        .enable_ctrlc_handler()
        .build();

    match &config.webhook {
        Some(webhook) => {
            let addr = ([0, 0, 0, 0], webhook.port).into();
            let url = format!("{}/webhook", webhook.external_url.trim_end_matches('/'))
                .parse()
                .context("WEBHOOK_URL is not a valid URL")?;

            info!("Starting dispatcher with webhook on port {}", webhook.port);
            let listener = webhooks::axum(bot, webhooks::Options::new(addr, url))
                .await
                .context("Failed to set up the webhook listener")?;

            dispatcher
                .dispatch_with_listener(
                    listener,
                    LoggingErrorHandler::with_custom_text("An error from the update listener"),
                )
                .await;
        }
        None => {
            info!("Starting dispatcher with long polling");
            dispatcher.dispatch().await;
        }
    }

    Ok(())
}

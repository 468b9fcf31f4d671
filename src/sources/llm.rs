//! OpenAI-compatible chat completion client.
//!
//! Used twice by the pipeline: as the last source in the fallback chain
//! (asking the model directly) and as the augmentation step that rewrites
//! the best search snippet into a natural-language answer.

use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

use super::{SearchResult, SearchSource};

/// Name the LLM appears under in the "sources consulted" list.
pub const SOURCE_NAME: &str = "llm";

/// Default OpenAI-compatible endpoint.
pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";

/// Default generation model.
pub const DEFAULT_MODEL: &str = "gpt-4o-mini";

/// Completion requests get a longer timeout than plain searches.
pub const COMPLETION_TIMEOUT_SECS: u64 = 60;

const SOURCE_SYSTEM_PROMPT: &str =
    "Ты справочный ассистент. Отвечай на вопрос кратко и по делу, на языке вопроса.";

const AUGMENT_SYSTEM_PROMPT: &str =
    "Ты справочный ассистент. Ответь на вопрос пользователя, опираясь на приведённый контекст. \
     Отвечай кратко, на языке вопроса.";

/// Configuration for the LLM completion endpoint.
#[derive(Debug, Clone)]
pub struct LlmConfig {
    pub base_url: String,
    pub api_key: String,
    pub model: String,
    pub timeout_secs: u64,
}

impl LlmConfig {
    pub fn new(api_key: String) -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            api_key,
            model: DEFAULT_MODEL.to_string(),
            timeout_secs: COMPLETION_TIMEOUT_SECS,
        }
    }
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    temperature: f32,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
    content: String,
}

/// Client for an OpenAI-style `/chat/completions` endpoint.
#[derive(Clone)]
pub struct LlmClient {
    client: reqwest::Client,
    config: LlmConfig,
}

impl LlmClient {
    pub fn new(config: LlmConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .context("Failed to create HTTP client for LLM endpoint")?;

        Ok(Self { client, config })
    }

    async fn complete(&self, system: &str, user: &str) -> Result<String> {
        let request = ChatRequest {
            model: &self.config.model,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: system,
                },
                ChatMessage {
                    role: "user",
                    content: user,
                },
            ],
            temperature: 0.2,
        };

        let url = format!("{}/chat/completions", self.config.base_url);
        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.config.api_key)
            .json(&request)
            .send()
            .await
            .context("LLM request failed")?
            .error_for_status()
            .context("LLM endpoint returned an error status")?;

        let parsed: ChatResponse = response
            .json()
            .await
            .context("Failed to parse LLM response")?;

        let content = parsed
            .choices
            .into_iter()
            .next()
            .map(|choice| choice.message.content.trim().to_string())
            .filter(|content| !content.is_empty())
            .ok_or_else(|| anyhow!("LLM response contained no choices"))?;

        debug!(model = %self.config.model, chars = content.len(), "LLM completion finished");
        Ok(content)
    }

    /// Answer a question directly, without search context.
    pub async fn answer(&self, question: &str) -> Result<String> {
        self.complete(SOURCE_SYSTEM_PROMPT, question).await
    }

    /// Answer a question using the best search snippet as context.
    pub async fn answer_with_context(&self, question: &str, context: &str) -> Result<String> {
        let user = format!("Вопрос: {question}\n\nКонтекст: {context}");
        self.complete(AUGMENT_SYSTEM_PROMPT, &user).await
    }
}

/// The LLM as a source adapter: last resort in the fallback chain.
pub struct LlmSource {
    client: LlmClient,
}

impl LlmSource {
    pub fn new(client: LlmClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl SearchSource for LlmSource {
    fn name(&self) -> &str {
        SOURCE_NAME
    }

    async fn search(&self, query: &str) -> Result<Vec<SearchResult>> {
        let answer = self.client.answer(query).await?;
        Ok(vec![SearchResult {
            title: String::new(),
            url: String::new(),
            snippet: answer,
        }])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chat_request_serialization() {
        let request = ChatRequest {
            model: "gpt-4o-mini",
            messages: vec![ChatMessage {
                role: "user",
                content: "вопрос",
            }],
            temperature: 0.2,
        };

        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["model"], "gpt-4o-mini");
        assert_eq!(json["messages"][0]["role"], "user");
        assert_eq!(json["messages"][0]["content"], "вопрос");
    }

    #[test]
    fn test_chat_response_parsing() {
        let json = r#"{
            "id": "chatcmpl-1",
            "choices": [
                {"index": 0, "message": {"role": "assistant", "content": "a² + b² = c²"}}
            ]
        }"#;

        let parsed: ChatResponse = serde_json::from_str(json).unwrap();
        assert_eq!(parsed.choices[0].message.content, "a² + b² = c²");
    }

    #[test]
    fn test_config_defaults() {
        let config = LlmConfig::new("sk-test".to_string());
        assert_eq!(config.base_url, DEFAULT_BASE_URL);
        assert_eq!(config.model, DEFAULT_MODEL);
        assert_eq!(config.timeout_secs, COMPLETION_TIMEOUT_SECS);
    }
}

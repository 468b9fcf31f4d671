//! Wikipedia opensearch adapter.
//!
//! Second network source in the chain. The opensearch endpoint returns a
//! positional JSON array: query, titles, descriptions, urls.

use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::Deserialize;
use std::time::Duration;
use tracing::debug;

use super::{SearchResult, SearchSource, SEARCH_TIMEOUT_SECS};

/// How many titles to request from opensearch.
const RESULT_LIMIT: &str = "3";

const USER_AGENT: &str = concat!("znayka-bot/", env!("CARGO_PKG_VERSION"));

#[derive(Debug, Deserialize)]
struct OpenSearchResponse(
    #[allow(dead_code)] String,
    Vec<String>,
    Vec<String>,
    Vec<String>,
);

impl OpenSearchResponse {
    fn into_results(self) -> Vec<SearchResult> {
        let OpenSearchResponse(_, titles, descriptions, urls) = self;
        titles
            .into_iter()
            .zip(urls)
            .enumerate()
            .map(|(i, (title, url))| {
                let description = descriptions.get(i).cloned().unwrap_or_default();
                let snippet = if description.is_empty() {
                    title.clone()
                } else {
                    description
                };
                SearchResult {
                    title,
                    url,
                    snippet,
                }
            })
            .collect()
    }
}

/// Wikipedia search source for one language edition.
pub struct WikipediaSource {
    client: reqwest::Client,
    api_url: String,
}

impl WikipediaSource {
    /// `language` is the wiki subdomain, e.g. "ru" or "en".
    pub fn new(language: &str) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(SEARCH_TIMEOUT_SECS))
            .user_agent(USER_AGENT)
            .build()
            .context("Failed to create HTTP client for Wikipedia")?;

        Ok(Self {
            client,
            api_url: format!("https://{language}.wikipedia.org/w/api.php"),
        })
    }
}

#[async_trait]
impl SearchSource for WikipediaSource {
    fn name(&self) -> &str {
        "wikipedia"
    }

    async fn search(&self, query: &str) -> Result<Vec<SearchResult>> {
        let response = self
            .client
            .get(&self.api_url)
            .query(&[
                ("action", "opensearch"),
                ("search", query),
                ("limit", RESULT_LIMIT),
                ("format", "json"),
            ])
            .send()
            .await
            .context("Wikipedia request failed")?
            .error_for_status()
            .context("Wikipedia returned an error status")?;

        let parsed: OpenSearchResponse = response
            .json()
            .await
            .context("Failed to parse Wikipedia response")?;

        let results = parsed.into_results();
        debug!(query, count = results.len(), "Wikipedia search finished");
        Ok(results)
    }
}

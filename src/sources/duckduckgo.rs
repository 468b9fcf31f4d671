//! DuckDuckGo Instant Answer adapter.
//!
//! Uses the JSON API (`api.duckduckgo.com`) rather than scraping the HTML
//! results page, so the adapter survives markup changes. The abstract (when
//! present) becomes the best result, followed by related topics.

use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::Deserialize;
use std::time::Duration;
use tracing::debug;

use super::{SearchResult, SearchSource, SEARCH_TIMEOUT_SECS};

const API_URL: &str = "https://api.duckduckgo.com/";

#[derive(Debug, Deserialize)]
struct InstantAnswer {
    #[serde(default, rename = "Heading")]
    heading: String,
    #[serde(default, rename = "AbstractText")]
    abstract_text: String,
    #[serde(default, rename = "AbstractURL")]
    abstract_url: String,
    #[serde(default, rename = "RelatedTopics")]
    related_topics: Vec<RelatedTopic>,
}

/// Related topics are either plain entries or nested category groups.
#[derive(Debug, Deserialize)]
struct RelatedTopic {
    #[serde(default, rename = "Text")]
    text: String,
    #[serde(default, rename = "FirstURL")]
    first_url: String,
    #[serde(default, rename = "Topics")]
    topics: Vec<RelatedTopic>,
}

impl InstantAnswer {
    fn into_results(self) -> Vec<SearchResult> {
        let mut results = Vec::new();

        if !self.abstract_text.is_empty() {
            results.push(SearchResult {
                title: self.heading.clone(),
                url: self.abstract_url.clone(),
                snippet: self.abstract_text.clone(),
            });
        }

        collect_topics(&self.related_topics, &mut results);
        results
    }
}

fn collect_topics(topics: &[RelatedTopic], out: &mut Vec<SearchResult>) {
    for topic in topics {
        if !topic.text.is_empty() && !topic.first_url.is_empty() {
            out.push(SearchResult {
                title: topic.text.clone(),
                url: topic.first_url.clone(),
                snippet: topic.text.clone(),
            });
        }
        collect_topics(&topic.topics, out);
    }
}

/// DuckDuckGo Instant Answer source.
pub struct DuckDuckGoSource {
    client: reqwest::Client,
    api_url: String,
}

impl DuckDuckGoSource {
    pub fn new() -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(SEARCH_TIMEOUT_SECS))
            .build()
            .context("Failed to create HTTP client for DuckDuckGo")?;

        Ok(Self {
            client,
            api_url: API_URL.to_string(),
        })
    }
}

#[async_trait]
impl SearchSource for DuckDuckGoSource {
    fn name(&self) -> &str {
        "duckduckgo"
    }

    async fn search(&self, query: &str) -> Result<Vec<SearchResult>> {
        let response = self
            .client
            .get(&self.api_url)
            .query(&[
                ("q", query),
                ("format", "json"),
                ("no_html", "1"),
                ("skip_disambig", "1"),
            ])
            .send()
            .await
            .context("DuckDuckGo request failed")?
            .error_for_status()
            .context("DuckDuckGo returned an error status")?;

        let answer: InstantAnswer = response
            .json()
            .await
            .context("Failed to parse DuckDuckGo response")?;

        let results = answer.into_results();
        debug!(query, count = results.len(), "DuckDuckGo search finished");
        Ok(results)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_abstract_and_topics() {
        let json = r#"{
            "Heading": "Pythagorean theorem",
            "AbstractText": "Relation among the three sides of a right triangle.",
            "AbstractURL": "https://en.wikipedia.org/wiki/Pythagorean_theorem",
            "RelatedTopics": [
                {"Text": "Euclidean geometry", "FirstURL": "https://duckduckgo.com/c/Euclidean_geometry"},
                {"Name": "Related", "Topics": [
                    {"Text": "Triangle", "FirstURL": "https://duckduckgo.com/Triangle"}
                ]}
            ]
        }"#;

        let answer: InstantAnswer = serde_json::from_str(json).unwrap();
        let results = answer.into_results();

        assert_eq!(results.len(), 3);
        assert_eq!(results[0].title, "Pythagorean theorem");
        assert_eq!(
            results[0].snippet,
            "Relation among the three sides of a right triangle."
        );
        assert_eq!(results[2].title, "Triangle");
    }

    #[test]
    fn test_parse_empty_answer() {
        let json = r#"{"Heading": "", "AbstractText": "", "AbstractURL": "", "RelatedTopics": []}"#;
        let answer: InstantAnswer = serde_json::from_str(json).unwrap();
        assert!(answer.into_results().is_empty());
    }

    #[test]
    fn test_parse_tolerates_missing_fields() {
        let answer: InstantAnswer = serde_json::from_str("{}").unwrap();
        assert!(answer.into_results().is_empty());
    }
}

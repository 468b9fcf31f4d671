//! Information source adapters.
//!
//! Every external provider (static knowledge base, DuckDuckGo, Wikipedia,
//! LLM) sits behind the same [`SearchSource`] contract, so the pipeline can
//! iterate a declarative ordered list instead of hard-coding a fallback
//! chain. Markup or API drift of one provider stays inside its adapter.

use anyhow::Result;
use async_trait::async_trait;

pub mod duckduckgo;
pub mod knowledge;
pub mod llm;
pub mod wikipedia;

pub use duckduckgo::DuckDuckGoSource;
pub use knowledge::KnowledgeSource;
pub use llm::{LlmClient, LlmConfig, LlmSource};
pub use wikipedia::WikipediaSource;

/// Timeout for a single outbound search call, in seconds.
pub const SEARCH_TIMEOUT_SECS: u64 = 10;

/// One result from an information source. The first element of a result
/// list is treated as the best one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchResult {
    pub title: String,
    pub url: String,
    pub snippet: String,
}

/// Uniform search contract over one external information provider.
#[async_trait]
pub trait SearchSource: Send + Sync {
    /// Short source name used in logs and the "sources consulted" list.
    fn name(&self) -> &str;

    /// Look the query up. An empty vec means "no results here, try the next
    /// source"; an `Err` is treated the same way by the pipeline.
    async fn search(&self, query: &str) -> Result<Vec<SearchResult>>;
}

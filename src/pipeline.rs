//! Multi-source answer resolution.
//!
//! Sources are tried in priority order; the first adapter returning a
//! non-empty result list wins and later adapters are never invoked. An
//! adapter error or timeout counts as "no result". When an LLM client is
//! configured, the best snippet is passed to it as context for a natural
//! language answer; if that call fails the raw snippet and its link are
//! shown instead. `resolve` itself never fails — with every source down the
//! user gets the canned not-found reply, not an error.

use log::warn;

use crate::ocr::clean_text;
use crate::sources::llm;
use crate::sources::{LlmClient, SearchResult, SearchSource};

/// Longest snippet rendered into an answer, in characters.
pub const SNIPPET_MAX_CHARS: usize = 300;

/// At most this many results are rendered into an answer.
pub const MAX_RESULTS_SHOWN: usize = 3;

/// Where a query came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuerySource {
    Typed,
    Photo,
}

/// A user question for the duration of one request.
#[derive(Debug, Clone)]
pub struct Query {
    /// Text exactly as submitted or OCR-extracted.
    pub raw: String,
    /// Whitespace-normalized text used for lookups.
    pub normalized: String,
    pub source: QuerySource,
}

impl Query {
    pub fn new(raw: impl Into<String>, source: QuerySource) -> Self {
        let raw = raw.into();
        let normalized = clean_text(&raw);
        Self {
            raw,
            normalized,
            source,
        }
    }
}

/// Outcome of running a query through the pipeline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    /// A formatted answer plus the names of the sources consulted.
    Answered {
        text: String,
        sources: Vec<String>,
    },
    /// Every source failed or returned nothing.
    NotFound,
}

/// Ordered fallback chain over source adapters, with optional LLM
/// augmentation of the winning snippet.
pub struct AnswerPipeline {
    sources: Vec<Box<dyn SearchSource>>,
    augmenter: Option<LlmClient>,
}

impl AnswerPipeline {
    pub fn new(sources: Vec<Box<dyn SearchSource>>, augmenter: Option<LlmClient>) -> Self {
        Self { sources, augmenter }
    }

    /// Resolve a query into an answer. Never returns an error.
    pub async fn resolve(&self, query: &Query) -> Resolution {
        let mut consulted = Vec::new();

        for source in &self.sources {
            consulted.push(source.name().to_string());

            let results = match source.search(&query.normalized).await {
                Ok(results) => results,
                Err(e) => {
                    warn!("Source {} failed, trying next: {e:#}", source.name());
                    continue;
                }
            };

            let results = prepare_results(results);
            if results.is_empty() {
                continue;
            }

            let text = self
                .render_answer(query, &results, source.name(), &mut consulted)
                .await;
            return Resolution::Answered {
                text,
                sources: consulted,
            };
        }

        Resolution::NotFound
    }

    /// Turn the winning result list into the final reply text. Prefers an
    /// LLM rewrite of the best snippet; silently falls back to the raw
    /// snippet when the LLM is unavailable or fails. When the LLM adapter
    /// itself won the chain its answer is already final and is not fed back
    /// to it as context.
    async fn render_answer(
        &self,
        query: &Query,
        results: &[SearchResult],
        winner: &str,
        consulted: &mut Vec<String>,
    ) -> String {
        let best = &results[0];

        if winner != llm::SOURCE_NAME {
            if let Some(augmenter) = &self.augmenter {
                match augmenter
                    .answer_with_context(&query.normalized, &best.snippet)
                    .await
                {
                    Ok(answer) => {
                        consulted.push(llm::SOURCE_NAME.to_string());
                        return if best.url.is_empty() {
                            answer
                        } else {
                            format!("{answer}\n\n🔗 {}", best.url)
                        };
                    }
                    Err(e) => warn!("LLM augmentation failed, showing raw snippet: {e:#}"),
                }
            }
        }

        format_results(results)
    }
}

/// Deduplicate by URL, truncate snippets, cap the list length.
fn prepare_results(results: Vec<SearchResult>) -> Vec<SearchResult> {
    let mut seen_urls = Vec::new();
    let mut prepared = Vec::new();

    for mut result in results {
        if result.snippet.is_empty() && result.title.is_empty() {
            continue;
        }
        if !result.url.is_empty() {
            if seen_urls.contains(&result.url) {
                continue;
            }
            seen_urls.push(result.url.clone());
        }

        result.snippet = truncate_chars(&result.snippet, SNIPPET_MAX_CHARS);
        prepared.push(result);
        if prepared.len() == MAX_RESULTS_SHOWN {
            break;
        }
    }

    prepared
}

fn format_results(results: &[SearchResult]) -> String {
    let best = &results[0];
    let mut text = best.snippet.clone();
    if !best.url.is_empty() {
        text.push_str(&format!("\n\n🔗 {}", best.url));
    }

    for result in &results[1..] {
        let label = if result.title.is_empty() {
            &result.snippet
        } else {
            &result.title
        };
        text.push_str(&format!("\n• {label} — {}", result.url));
    }

    text
}

fn truncate_chars(text: &str, max_chars: usize) -> String {
    let mut truncated: String = text.chars().take(max_chars).collect();
    if truncated.len() < text.len() {
        truncated.push('…');
    }
    truncated
}

#[cfg(test)]
mod tests {
    use super::*;

    fn result(title: &str, url: &str, snippet: &str) -> SearchResult {
        SearchResult {
            title: title.to_string(),
            url: url.to_string(),
            snippet: snippet.to_string(),
        }
    }

    #[test]
    fn test_query_normalization() {
        let query = Query::new("  что   такое\n гравитация ", QuerySource::Typed);
        assert_eq!(query.normalized, "что такое гравитация");
        assert_eq!(query.raw, "  что   такое\n гравитация ");
    }

    #[test]
    fn test_prepare_deduplicates_by_url() {
        let results = prepare_results(vec![
            result("a", "https://x", "first"),
            result("b", "https://x", "duplicate"),
            result("c", "https://y", "second"),
        ]);

        assert_eq!(results.len(), 2);
        assert_eq!(results[0].snippet, "first");
        assert_eq!(results[1].snippet, "second");
    }

    #[test]
    fn test_prepare_caps_result_count() {
        let many = (0..10)
            .map(|i| result("t", &format!("https://x/{i}"), "s"))
            .collect();
        assert_eq!(prepare_results(many).len(), MAX_RESULTS_SHOWN);
    }

    #[test]
    fn test_prepare_truncates_snippets() {
        let long = "ы".repeat(SNIPPET_MAX_CHARS * 2);
        let results = prepare_results(vec![result("t", "https://x", &long)]);
        assert_eq!(
            results[0].snippet.chars().count(),
            SNIPPET_MAX_CHARS + 1 // plus the ellipsis
        );
    }

    #[test]
    fn test_prepare_drops_blank_results() {
        let results = prepare_results(vec![result("", "https://x", ""), result("t", "", "s")]);
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].snippet, "s");
    }

    #[test]
    fn test_format_single_result() {
        let text = format_results(&[result("Теорема", "https://x", "a² + b² = c²")]);
        assert!(text.starts_with("a² + b² = c²"));
        assert!(text.contains("🔗 https://x"));
    }

    #[test]
    fn test_format_lists_secondary_results() {
        let text = format_results(&[
            result("Первый", "https://x", "сниппет"),
            result("Второй", "https://y", "другой"),
        ]);
        assert!(text.contains("• Второй — https://y"));
    }

    #[test]
    fn test_format_result_without_url() {
        let text = format_results(&[result("", "", "ответ модели")]);
        assert_eq!(text, "ответ модели");
    }
}

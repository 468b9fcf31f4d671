//! Built-in knowledge base for common reference questions.
//!
//! First source in the chain: a static topic → fact table answered without
//! any network call. Topics are matched on normalized (lowercased, trimmed)
//! query text.

use anyhow::Result;
use async_trait::async_trait;
use std::collections::HashMap;

use super::{SearchResult, SearchSource};

struct Fact {
    answer: &'static str,
    link: &'static str,
}

/// Static knowledge lookup source.
pub struct KnowledgeSource {
    facts: HashMap<&'static str, Fact>,
}

impl KnowledgeSource {
    pub fn new() -> Self {
        let mut facts = HashMap::new();

        facts.insert(
            "теорема пифагора",
            Fact {
                answer: "a² + b² = c²",
                link: "https://ru.wikipedia.org/wiki/Теорема_Пифагора",
            },
        );
        facts.insert(
            "скорость света",
            Fact {
                answer: "299 792 458 м/с",
                link: "https://ru.wikipedia.org/wiki/Скорость_света",
            },
        );
        facts.insert(
            "число пи",
            Fact {
                answer: "π ≈ 3,14159",
                link: "https://ru.wikipedia.org/wiki/Пи_(число)",
            },
        );
        facts.insert(
            "ускорение свободного падения",
            Fact {
                answer: "g ≈ 9,81 м/с²",
                link: "https://ru.wikipedia.org/wiki/Ускорение_свободного_падения",
            },
        );

        Self { facts }
    }

    fn normalize(query: &str) -> String {
        query.trim().to_lowercase()
    }
}

impl Default for KnowledgeSource {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SearchSource for KnowledgeSource {
    fn name(&self) -> &str {
        "knowledge"
    }

    async fn search(&self, query: &str) -> Result<Vec<SearchResult>> {
        let key = Self::normalize(query);
        Ok(self
            .facts
            .get(key.as_str())
            .map(|fact| {
                vec![SearchResult {
                    title: query.trim().to_string(),
                    url: fact.link.to_string(),
                    snippet: fact.answer.to_string(),
                }]
            })
            .unwrap_or_default())
    }
}

//! End-to-end tests for the answer resolution pipeline using stub sources.

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use znayka::pipeline::{AnswerPipeline, Query, QuerySource, Resolution};
use znayka::sources::{KnowledgeSource, LlmClient, LlmConfig, SearchResult, SearchSource};

enum StubBehavior {
    Results(Vec<SearchResult>),
    Empty,
    Fail,
}

struct StubSource {
    name: &'static str,
    behavior: StubBehavior,
    calls: Arc<AtomicUsize>,
}

impl StubSource {
    fn new(name: &'static str, behavior: StubBehavior) -> (Box<Self>, Arc<AtomicUsize>) {
        let calls = Arc::new(AtomicUsize::new(0));
        let source = Box::new(Self {
            name,
            behavior,
            calls: Arc::clone(&calls),
        });
        (source, calls)
    }
}

#[async_trait]
impl SearchSource for StubSource {
    fn name(&self) -> &str {
        self.name
    }

    async fn search(&self, _query: &str) -> Result<Vec<SearchResult>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match &self.behavior {
            StubBehavior::Results(results) => Ok(results.clone()),
            StubBehavior::Empty => Ok(Vec::new()),
            StubBehavior::Fail => Err(anyhow!("source unavailable")),
        }
    }
}

fn result(snippet: &str, url: &str) -> SearchResult {
    SearchResult {
        title: "title".to_string(),
        url: url.to_string(),
        snippet: snippet.to_string(),
    }
}

fn query(text: &str) -> Query {
    Query::new(text, QuerySource::Typed)
}

#[tokio::test]
async fn test_first_successful_source_short_circuits() {
    let (first, first_calls) = StubSource::new(
        "first",
        StubBehavior::Results(vec![result("ответ", "https://a")]),
    );
    let (second, second_calls) = StubSource::new("second", StubBehavior::Empty);

    let pipeline = AnswerPipeline::new(vec![first, second], None);
    let resolution = pipeline.resolve(&query("вопрос")).await;

    assert!(matches!(resolution, Resolution::Answered { .. }));
    assert_eq!(first_calls.load(Ordering::SeqCst), 1);
    assert_eq!(second_calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_failing_source_falls_through_to_next() {
    let (first, _) = StubSource::new("first", StubBehavior::Fail);
    let (second, second_calls) = StubSource::new(
        "second",
        StubBehavior::Results(vec![result("ответ", "https://b")]),
    );

    let pipeline = AnswerPipeline::new(vec![first, second], None);
    let resolution = pipeline.resolve(&query("вопрос")).await;

    match resolution {
        Resolution::Answered { text, sources } => {
            assert!(text.starts_with("ответ"));
            assert_eq!(sources, vec!["first".to_string(), "second".to_string()]);
        }
        Resolution::NotFound => panic!("expected an answer from the second source"),
    }
    assert_eq!(second_calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_all_sources_down_yields_not_found() {
    let (first, _) = StubSource::new("first", StubBehavior::Fail);
    let (second, _) = StubSource::new("second", StubBehavior::Empty);
    let (third, _) = StubSource::new("third", StubBehavior::Fail);

    let pipeline = AnswerPipeline::new(vec![first, second, third], None);
    assert_eq!(pipeline.resolve(&query("вопрос")).await, Resolution::NotFound);
}

#[tokio::test]
async fn test_no_sources_yields_not_found() {
    let pipeline = AnswerPipeline::new(vec![], None);
    assert_eq!(pipeline.resolve(&query("вопрос")).await, Resolution::NotFound);
}

#[tokio::test]
async fn test_answer_contains_snippet_and_link() {
    let (source, _) = StubSource::new(
        "stub",
        StubBehavior::Results(vec![result("a² + b² = c²", "https://example.com/t")]),
    );

    let pipeline = AnswerPipeline::new(vec![source], None);
    match pipeline.resolve(&query("теорема")).await {
        Resolution::Answered { text, .. } => {
            assert!(text.starts_with("a² + b² = c²"));
            assert!(text.contains("https://example.com/t"));
        }
        Resolution::NotFound => panic!("expected an answer"),
    }
}

#[tokio::test]
async fn test_llm_source_answer_is_not_augmented() {
    // The augmenter points at a dead endpoint; a correct pipeline never
    // contacts it when the LLM adapter itself produced the winning answer.
    let augmenter = LlmClient::new(LlmConfig {
        base_url: "http://127.0.0.1:1".to_string(),
        api_key: "unused".to_string(),
        model: "unused".to_string(),
        timeout_secs: 1,
    })
    .unwrap();

    let (source, calls) = StubSource::new(
        "llm",
        StubBehavior::Results(vec![SearchResult {
            title: String::new(),
            url: String::new(),
            snippet: "ответ модели".to_string(),
        }]),
    );

    let pipeline = AnswerPipeline::new(vec![source], Some(augmenter));
    match pipeline.resolve(&query("вопрос")).await {
        Resolution::Answered { text, sources } => {
            assert_eq!(text, "ответ модели");
            assert_eq!(sources, vec!["llm".to_string()]);
        }
        Resolution::NotFound => panic!("expected the adapter's own answer"),
    }
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_knowledge_lookup_through_pipeline() {
    let pipeline = AnswerPipeline::new(vec![Box::new(KnowledgeSource::new())], None);

    match pipeline.resolve(&query("Теорема  Пифагора")).await {
        Resolution::Answered { text, sources } => {
            assert!(text.starts_with("a² + b² = c²"));
            assert!(text.contains("https://ru.wikipedia.org/wiki/Теорема_Пифагора"));
            assert_eq!(sources, vec!["knowledge".to_string()]);
        }
        Resolution::NotFound => panic!("expected the static knowledge answer"),
    }
}

#[tokio::test]
async fn test_query_whitespace_is_normalized_before_search() {
    let q = query("  теорема \n пифагора ");
    assert_eq!(q.normalized, "теорема пифагора");

    let pipeline = AnswerPipeline::new(vec![Box::new(KnowledgeSource::new())], None);
    assert!(matches!(
        pipeline.resolve(&q).await,
        Resolution::Answered { .. }
    ));
}

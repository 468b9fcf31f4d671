//! Bounded per-user history of answered questions.
//!
//! Held in process memory only; the whole store is discarded on restart.
//! Eviction is FIFO: when a user's list is full the oldest entry is dropped.
//! The map lives behind a mutex so concurrent handler invocations cannot
//! race on it.

use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;

/// How many question/answer pairs are kept per user.
pub const HISTORY_CAPACITY: usize = 10;

/// Questions longer than this are truncated for display.
pub const QUESTION_PREVIEW_CHARS: usize = 120;

/// One answered question.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoryEntry {
    /// The question, truncated for display.
    pub question: String,
    /// The rendered response text.
    pub response: String,
}

/// Concurrency-safe per-user history store.
pub struct HistoryStore {
    capacity: usize,
    entries: Mutex<HashMap<i64, VecDeque<HistoryEntry>>>,
}

impl HistoryStore {
    pub fn new() -> Self {
        Self::with_capacity(HISTORY_CAPACITY)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            capacity,
            entries: Mutex::new(HashMap::new()),
        }
    }

    /// Append an answered question, evicting the oldest entry when full.
    pub fn append(&self, user_id: i64, question: &str, response: &str) {
        let entry = HistoryEntry {
            question: truncate_chars(question, QUESTION_PREVIEW_CHARS),
            response: response.to_string(),
        };

        let mut entries = self.entries.lock().unwrap();
        let list = entries.entry(user_id).or_default();
        while list.len() >= self.capacity {
            list.pop_front();
        }
        list.push_back(entry);
    }

    /// Entries for a user, oldest first, most recent last.
    pub fn get(&self, user_id: i64) -> Vec<HistoryEntry> {
        self.entries
            .lock()
            .unwrap()
            .get(&user_id)
            .map(|list| list.iter().cloned().collect())
            .unwrap_or_default()
    }
}

impl Default for HistoryStore {
    fn default() -> Self {
        Self::new()
    }
}

fn truncate_chars(text: &str, max_chars: usize) -> String {
    let mut truncated: String = text.chars().take(max_chars).collect();
    if truncated.len() < text.len() {
        truncated.push('…');
    }
    truncated
}

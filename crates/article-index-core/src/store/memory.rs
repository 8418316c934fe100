//! In-memory [`Store`] implementation for tests and embedding.
//!
//! Documents live in insertion order in a `Vec` behind a
//! `std::sync::RwLock`; ids come from a per-store counter.

use std::sync::RwLock;

use anyhow::{anyhow, Result};
use async_trait::async_trait;

use crate::models::{Document, SearchResult};

use super::{like_matches, Store};

#[derive(Default)]
struct State {
    docs: Vec<Document>,
    next_id: i64,
    last_imported: Option<i64>,
    bookmarks: Vec<String>,
}

/// In-memory store.
#[derive(Default)]
pub struct InMemoryStore {
    state: RwLock<State>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn read<T>(&self, f: impl FnOnce(&State) -> T) -> Result<T> {
        let state = self
            .state
            .read()
            .map_err(|_| anyhow!("in-memory store lock poisoned"))?;
        Ok(f(&state))
    }

    fn write<T>(&self, f: impl FnOnce(&mut State) -> T) -> Result<T> {
        let mut state = self
            .state
            .write()
            .map_err(|_| anyhow!("in-memory store lock poisoned"))?;
        Ok(f(&mut state))
    }
}

fn newest_first(mut results: Vec<SearchResult>, limit: i64) -> Vec<SearchResult> {
    // Stable sort keeps insertion order among equal timestamps.
    results.sort_by(|a, b| b.last_modified.cmp(&a.last_modified));
    results.truncate(limit.max(0) as usize);
    results
}

fn contains_text(doc: &Document, keyword: &str) -> bool {
    doc.title.contains(keyword) || doc.content.contains(keyword)
}

#[async_trait]
impl Store for InMemoryStore {
    async fn insert(&self, doc: &Document) -> Result<i64> {
        self.write(|state| {
            if let Some(existing) = state.docs.iter_mut().find(|d| d.title == doc.title) {
                let id = existing.id;
                *existing = Document { id, ..doc.clone() };
                return id;
            }
            state.next_id += 1;
            let id = state.next_id;
            state.docs.push(Document { id, ..doc.clone() });
            id
        })
    }

    async fn delete_all(&self) -> Result<()> {
        self.write(|state| state.docs.clear())
    }

    async fn get_all(&self, limit: i64) -> Result<Vec<SearchResult>> {
        let all = self.read(|state| state.docs.iter().map(Document::to_search_result).collect())?;
        Ok(newest_first(all, limit))
    }

    async fn search_tokens(&self, token_query: &str, limit: i64) -> Result<Vec<SearchResult>> {
        self.read(|state| {
            state
                .docs
                .iter()
                .filter(|d| {
                    d.token_index
                        .as_deref()
                        .is_some_and(|idx| idx.contains(token_query))
                })
                .take(limit.max(0) as usize)
                .map(Document::to_search_result)
                .collect()
        })
    }

    async fn search_text(&self, keyword: &str, limit: i64) -> Result<Vec<SearchResult>> {
        self.read(|state| {
            state
                .docs
                .iter()
                .filter(|d| contains_text(d, keyword))
                .take(limit.max(0) as usize)
                .map(Document::to_search_result)
                .collect()
        })
    }

    async fn scan(&self, limit: i64) -> Result<Vec<Document>> {
        self.read(|state| {
            state
                .docs
                .iter()
                .take(limit.max(0) as usize)
                .cloned()
                .collect()
        })
    }

    async fn filter(&self, keyword: &str, limit: i64) -> Result<Vec<SearchResult>> {
        let hits = self.read(|state| {
            state
                .docs
                .iter()
                .filter(|d| contains_text(d, keyword))
                .map(Document::to_search_result)
                .collect()
        })?;
        Ok(newest_first(hits, limit))
    }

    async fn find_content_by_title(&self, title: &str) -> Result<Option<String>> {
        self.read(|state| {
            state
                .docs
                .iter()
                .find(|d| d.title == title)
                .map(|d| d.content.clone())
        })
    }

    async fn find_first(&self, title_pattern: &str) -> Result<Option<Document>> {
        self.read(|state| {
            state
                .docs
                .iter()
                .find(|d| like_matches(title_pattern, &d.title))
                .cloned()
        })
    }

    async fn count(&self) -> Result<i64> {
        self.read(|state| state.docs.len() as i64)
    }

    async fn content_hash(&self, title: &str) -> Result<Option<String>> {
        self.read(|state| {
            state
                .docs
                .iter()
                .find(|d| d.title == title)
                .map(|d| d.content_hash.clone())
        })
    }

    async fn last_imported(&self) -> Result<Option<i64>> {
        self.read(|state| state.last_imported)
    }

    async fn set_last_imported(&self, millis: i64) -> Result<()> {
        self.write(|state| state.last_imported = Some(millis))
    }

    async fn add_bookmark(&self, title: &str) -> Result<bool> {
        self.write(|state| {
            if state.bookmarks.iter().any(|b| b == title) {
                return false;
            }
            state.bookmarks.push(title.to_string());
            true
        })
    }

    async fn bookmarks(&self) -> Result<Vec<String>> {
        self.read(|state| state.bookmarks.clone())
    }
}

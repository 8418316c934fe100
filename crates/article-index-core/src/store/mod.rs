//! Storage abstraction for Article Index.
//!
//! The [`Store`] trait is the only way the importer and the query
//! coordinator touch persisted documents, so backends are pluggable
//! (SQLite in the application crate, [`memory::InMemoryStore`] here).
//!
//! Implementations must be `Send + Sync` to work with async runtimes.

pub mod memory;

use anyhow::Result;
use async_trait::async_trait;

use crate::models::{Document, SearchResult};

/// Abstract document store.
///
/// # Operations
///
/// | Method | Purpose |
/// |--------|---------|
/// | [`insert`](Store::insert) | Upsert one document by title |
/// | [`insert_all`](Store::insert_all) | Upsert many documents |
/// | [`delete_all`](Store::delete_all) | Wipe the corpus |
/// | [`get_all`](Store::get_all) | Newest documents first |
/// | [`search_tokens`](Store::search_tokens) | Token-index containment |
/// | [`search_text`](Store::search_text) | Title/content containment |
/// | [`scan`](Store::scan) | Full documents in read order |
/// | [`filter`](Store::filter) | Title/content containment, newest first |
/// | [`find_content_by_title`](Store::find_content_by_title) | Body of one document |
/// | [`find_first`](Store::find_first) | First document whose title matches a LIKE pattern |
/// | [`add_bookmark`](Store::add_bookmark) / [`bookmarks`](Store::bookmarks) | Saved titles, kept across re-imports |
#[async_trait]
pub trait Store: Send + Sync {
    /// Insert a document, replacing any existing document with the same
    /// title. Returns the stored id.
    async fn insert(&self, doc: &Document) -> Result<i64>;

    async fn insert_all(&self, docs: &[Document]) -> Result<()> {
        for doc in docs {
            self.insert(doc).await?;
        }
        Ok(())
    }

    async fn delete_all(&self) -> Result<()>;

    /// Projections ordered by `last_modified` descending.
    async fn get_all(&self, limit: i64) -> Result<Vec<SearchResult>>;

    /// Documents whose token index contains `token_query` verbatim.
    async fn search_tokens(&self, token_query: &str, limit: i64) -> Result<Vec<SearchResult>>;

    /// Documents whose title or content contains `keyword`.
    async fn search_text(&self, keyword: &str, limit: i64) -> Result<Vec<SearchResult>>;

    /// Full documents in the store's default read order.
    async fn scan(&self, limit: i64) -> Result<Vec<Document>>;

    /// Like [`search_text`](Store::search_text), ordered by
    /// `last_modified` descending.
    async fn filter(&self, keyword: &str, limit: i64) -> Result<Vec<SearchResult>>;

    async fn find_content_by_title(&self, title: &str) -> Result<Option<String>>;

    /// `title_pattern` uses `%` as a multi-character wildcard; every
    /// other character, `_` included, matches itself case-sensitively.
    async fn find_first(&self, title_pattern: &str) -> Result<Option<Document>>;

    async fn count(&self) -> Result<i64>;

    async fn content_hash(&self, title: &str) -> Result<Option<String>>;

    /// Modification time (ms) of the last imported archive.
    async fn last_imported(&self) -> Result<Option<i64>>;

    async fn set_last_imported(&self, millis: i64) -> Result<()>;

    /// Remember `title`. Returns `false` if it was already bookmarked.
    /// Bookmarks are not removed by [`delete_all`](Store::delete_all).
    async fn add_bookmark(&self, title: &str) -> Result<bool>;

    /// Bookmarked titles in the order they were added.
    async fn bookmarks(&self) -> Result<Vec<String>>;
}

/// Match `text` against a LIKE pattern where only `%` is special.
pub fn like_matches(pattern: &str, text: &str) -> bool {
    let mut parts = pattern.split('%');
    let first = parts.next().unwrap_or("");
    let Some(mut rest) = text.strip_prefix(first) else {
        return false;
    };
    let parts: Vec<&str> = parts.collect();
    let Some((last, middle)) = parts.split_last() else {
        return rest.is_empty();
    };
    for part in middle {
        match rest.find(part) {
            Some(pos) => rest = &rest[pos + part.len()..],
            None => return false,
        }
    }
    rest.len() >= last.len() && rest.ends_with(last)
}

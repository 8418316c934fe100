//! Core data models used throughout Article Index.
//!
//! A [`Document`] is one imported text file; a [`SearchResult`] is the
//! lightweight projection used to populate result lists without loading
//! the full body.

use serde::Serialize;
use sha2::{Digest, Sha256};

/// A stored article.
///
/// `length` is always the code-point count of `content`
/// (`content.chars().count()`); use [`Document::new`] to keep the
/// derived fields consistent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Document {
    /// Store-assigned surrogate key. `0` until inserted.
    pub id: i64,
    pub title: String,
    pub content: String,
    /// Space-joined n-grams of `content`, when the token index is enabled.
    pub token_index: Option<String>,
    pub length: i64,
    /// Milliseconds since the Unix epoch.
    pub last_modified: Option<i64>,
    /// SHA-256 hex digest of `content`.
    pub content_hash: String,
}

impl Document {
    pub fn new(title: impl Into<String>, content: impl Into<String>) -> Self {
        let content = content.into();
        Self {
            id: 0,
            title: title.into(),
            length: char_length(&content),
            content_hash: content_hash(&content),
            content,
            token_index: None,
            last_modified: None,
        }
    }

    pub fn with_last_modified(mut self, last_modified: Option<i64>) -> Self {
        self.last_modified = last_modified;
        self
    }

    pub fn with_token_index(mut self, token_index: Option<String>) -> Self {
        self.token_index = token_index;
        self
    }

    pub fn to_search_result(&self) -> SearchResult {
        SearchResult {
            title: self.title.clone(),
            last_modified: self.last_modified,
            length: self.length,
        }
    }
}

/// List projection of a [`Document`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SearchResult {
    pub title: String,
    pub last_modified: Option<i64>,
    pub length: i64,
}

/// Character count as stored in `Document::length`.
pub fn char_length(text: &str) -> i64 {
    text.chars().count() as i64
}

pub fn content_hash(text: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(text.as_bytes());
    format!("{:x}", hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn length_counts_code_points() {
        let doc = Document::new("t", "日記を書く");
        assert_eq!(doc.length, 5);
        assert_eq!(Document::new("t", "hello world").length, 11);
    }

    #[test]
    fn same_content_same_hash() {
        let a = Document::new("a", "body");
        let b = Document::new("b", "body");
        assert_eq!(a.content_hash, b.content_hash);
        assert_ne!(a.content_hash, Document::new("c", "other").content_hash);
    }

    #[test]
    fn projection_keeps_list_fields() {
        let doc = Document::new("title", "abc").with_last_modified(Some(42));
        let r = doc.to_search_result();
        assert_eq!(r.title, "title");
        assert_eq!(r.last_modified, Some(42));
        assert_eq!(r.length, 3);
    }
}

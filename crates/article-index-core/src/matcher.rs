//! AND keyword filter.
//!
//! A keyword string such as `"rust　async"` (full-width space allowed) is
//! split into sub-keywords. A document matches when all of them occur in
//! its title, or all of them occur in its content. Sub-keywords are never
//! split across the two fields. Matching is case-sensitive.

use std::collections::BTreeSet;

use crate::models::Document;

const IDEOGRAPHIC_SPACE: char = '\u{3000}';

#[derive(Debug, Clone)]
pub struct AndKeywordFilter {
    keywords: BTreeSet<String>,
}

impl AndKeywordFilter {
    pub fn new(keyword: &str) -> Self {
        let keywords = keyword
            .replace(IDEOGRAPHIC_SPACE, " ")
            .split(' ')
            .filter(|k| !k.trim().is_empty())
            .map(str::to_string)
            .collect();
        Self { keywords }
    }

    pub fn keywords(&self) -> impl Iterator<Item = &str> {
        self.keywords.iter().map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.keywords.is_empty()
    }

    pub fn matches(&self, doc: &Document) -> bool {
        self.matches_fields(&doc.title, &doc.content)
    }

    pub fn matches_fields(&self, title: &str, content: &str) -> bool {
        self.keywords.iter().all(|k| title.contains(k.as_str()))
            || self.keywords.iter().all(|k| content.contains(k.as_str()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn doc(title: &str, content: &str) -> Document {
        Document::new(title, content)
    }

    #[test]
    fn single_keyword() {
        let filter = AndKeywordFilter::new("and");
        assert!(filter.matches(&doc("android", "Orange is good")));
        assert!(!filter.matches(&doc("iOS all", "Orange is good")));
    }

    #[test]
    fn multiple_keywords() {
        let filter = AndKeywordFilter::new("a b c");
        assert!(!filter.matches(&doc("android", "Orange is good")));
        assert!(filter.matches(&doc("android", "I have a book, it is so cool.")));
    }

    #[test]
    fn keywords_are_not_split_across_fields() {
        let filter = AndKeywordFilter::new("rust tokio");
        assert!(!filter.matches(&doc("rust notes", "tokio runtime")));
        assert!(filter.matches(&doc("notes", "rust and tokio")));
    }

    #[test]
    fn full_width_space_and_duplicates() {
        let filter = AndKeywordFilter::new("日記\u{3000}日記  旅行");
        let kws: Vec<&str> = filter.keywords().collect();
        assert_eq!(kws, vec!["旅行", "日記"]);
        assert!(filter.matches(&doc("日記 旅行", "")));
    }

    #[test]
    fn case_sensitive() {
        let filter = AndKeywordFilter::new("Rust");
        assert!(!filter.matches(&doc("rust", "rust")));
    }

    #[test]
    fn blank_keyword_matches_everything() {
        let filter = AndKeywordFilter::new("  \u{3000} ");
        assert!(filter.is_empty());
        assert!(filter.matches(&doc("x", "y")));
    }
}

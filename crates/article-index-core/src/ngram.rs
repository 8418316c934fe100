//! Sliding-window n-gram tokenizer.
//!
//! The same function builds a document's token index at import time and
//! turns a keyword into a token query at search time, so both sides must
//! use the same `n` for an index match to succeed.
//!
//! ```rust
//! use article_index_core::ngram::ngram;
//!
//! assert_eq!(ngram("abcd", 2), "ab bc cd");
//! assert_eq!(ngram("a", 2), "");
//! ```

/// Every contiguous `n`-character window of `text`, left to right,
/// joined by single spaces.
///
/// Blank input is returned unchanged. Input shorter than `n`, or `n == 0`,
/// yields an empty string.
pub fn ngram(text: &str, n: usize) -> String {
    if text.trim().is_empty() {
        return text.to_string();
    }

    let chars: Vec<char> = text.chars().collect();
    if n == 0 || chars.len() < n {
        return String::new();
    }

    let windows = chars.len() - n + 1;
    let mut out = String::with_capacity(windows * (n + 1));
    for (i, window) in chars.windows(n).enumerate() {
        if i > 0 {
            out.push(' ');
        }
        out.extend(window);
    }
    out
}

//! # Article Index Core
//!
//! Shared logic for Article Index: data models, filename decoding,
//! n-gram tokenization, keyword matching, the store abstraction and the
//! query coordinator.
//!
//! This crate contains no tokio, sqlx, or filesystem I/O. Storage and
//! presentation are reached only through the [`store::Store`] and
//! [`sink::ResultSink`] traits.
//!
//! ## Modules
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`models`] | `Document` and `SearchResult` |
//! | [`decode`] | EUC-JP hex filename decoder |
//! | [`ngram`] | Sliding-window n-gram tokenizer |
//! | [`matcher`] | AND keyword filter over title or content |
//! | [`calendar`] | Title patterns for date lookups |
//! | [`store`] | `Store` trait and in-memory implementation |
//! | [`sink`] | Progress/result collaborator trait |
//! | [`search`] | Query coordinator (`all`, `search`, `filter`) |

pub mod calendar;
pub mod decode;
pub mod matcher;
pub mod models;
pub mod ngram;
pub mod search;
pub mod sink;
pub mod store;

pub use decode::{decode_name, DecodeError};
pub use matcher::AndKeywordFilter;
pub use models::{Document, SearchResult};
pub use ngram::ngram;

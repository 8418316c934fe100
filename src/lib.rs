//! # Article Index
//!
//! Imports a zip archive of text articles into a local SQLite store and
//! lets you browse, filter and keyword-search them.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────┐   ┌──────────────┐   ┌──────────┐
//! │ Zip archive │──▶│   Importer   │──▶│  SQLite  │
//! │ hex names   │   │ decode+ngram │   │ documents│
//! └─────────────┘   └──────────────┘   └────┬─────┘
//!                                           │
//!                   ┌──────────────┐        │
//!                   │ SearchSession│◀───────┘
//!                   │ all/search/  │──▶ ResultSink (CLI, UI)
//!                   │ filter       │
//!                   └──────────────┘
//! ```
//!
//! ## Data Flow
//!
//! 1. The **importer** ([`import`]) streams the archive, decodes each
//!    entry name into a title, and upserts a `Document` per entry with
//!    its length, modification time and n-gram token index.
//! 2. The **store** ([`sqlite_store`]) keeps one row per title.
//! 3. The **query coordinator** (`article_index_core::search`) answers
//!    `all`, `search` and `filter` requests, run in the background by
//!    [`worker::SearchSession`] and streamed to a result sink.
//!
//! ## Quick Start
//!
//! ```bash
//! artx init
//! artx import ./articles.zip
//! artx search "所有権"
//! artx date 2019 1 1
//! ```
//!
//! ## Modules
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`config`] | TOML configuration parsing and validation |
//! | [`db`] | SQLite connection pool with WAL mode |
//! | [`migrate`] | Database schema (idempotent) |
//! | [`sqlite_store`] | SQLite implementation of the `Store` trait |
//! | [`import`] | Zip archive import pipeline |
//! | [`progress`] | Import progress reporting on stderr |
//! | [`worker`] | Background queries with cancellation |
//! | [`output`] | Terminal result sinks |
//! | [`search`] | `list` / `search` / `filter` commands |
//! | [`get`] | Open an article by title or date |
//! | [`bookmark`] | Saved titles |
//! | [`stats`] | Database statistics |

pub mod bookmark;
pub mod config;
pub mod db;
pub mod get;
pub mod import;
pub mod migrate;
pub mod output;
pub mod progress;
pub mod search;
pub mod sqlite_store;
pub mod stats;
pub mod worker;

pub use article_index_core::store;

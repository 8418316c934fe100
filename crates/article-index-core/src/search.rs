//! Query coordinator.
//!
//! Turns a caller's intent ([`Query::All`], [`Query::Search`],
//! [`Query::Filter`]) into store calls and streams the results to a
//! [`ResultSink`], bracketed by progress transitions.
//!
//! # Search strategies
//!
//! | Strategy | Store call | Matching |
//! |----------|------------|----------|
//! | `ngram` (default) | [`Store::search_tokens`] | The keyword's n-grams, joined, must appear verbatim in the document's token index |
//! | `scan` | [`Store::scan`] | [`AndKeywordFilter`] over every document |
//!
//! N-gram containment is faster but only approximates substring search:
//! a keyword shorter than `n` produces no grams, so that case falls back
//! to [`Store::search_text`]. The two strategies are never combined in
//! one query.
//!
//! # Failure
//!
//! A store error is logged, the progress indicator is hidden and the
//! error is delivered to [`ResultSink::on_error`]. It is also returned so
//! callers can set an exit status; it is never retried.

use std::fmt;
use std::str::FromStr;
use std::time::Instant;

use anyhow::{bail, Result};
use serde::{Deserialize, Serialize};

use crate::matcher::AndKeywordFilter;
use crate::models::SearchResult;
use crate::ngram::ngram;
use crate::sink::ResultSink;
use crate::store::Store;

/// Default cap for `all` and `filter`.
pub const DEFAULT_LIMIT: i64 = 500;

/// No cap; keyword search returns every hit.
pub const UNLIMITED: i64 = i64::MAX;

pub const SEARCHING_MESSAGE: &str = "Searching...";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SearchStrategy {
    #[default]
    Ngram,
    Scan,
}

impl FromStr for SearchStrategy {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "ngram" => Ok(SearchStrategy::Ngram),
            "scan" => Ok(SearchStrategy::Scan),
            other => bail!("Unknown search strategy: '{}'. Use ngram or scan.", other),
        }
    }
}

impl fmt::Display for SearchStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SearchStrategy::Ngram => f.write_str("ngram"),
            SearchStrategy::Scan => f.write_str("scan"),
        }
    }
}

/// Query tuning, decoupled from application config.
#[derive(Debug, Clone)]
pub struct QueryParams {
    pub strategy: SearchStrategy,
    /// Must match the `n` used when the token index was built.
    pub ngram_size: usize,
    pub limit: i64,
    /// `filter` is a no-op unless this is set.
    pub use_title_filter: bool,
}

impl Default for QueryParams {
    fn default() -> Self {
        Self {
            strategy: SearchStrategy::Ngram,
            ngram_size: 2,
            limit: DEFAULT_LIMIT,
            use_title_filter: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Query {
    All,
    Search(String),
    Filter(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueryOutcome {
    /// The query ran; results were also streamed to the sink.
    Completed {
        results: Vec<SearchResult>,
        elapsed_ms: u64,
    },
    /// Nothing to do (blank search keyword, or title filter disabled).
    Skipped,
}

impl QueryOutcome {
    pub fn results(&self) -> &[SearchResult] {
        match self {
            QueryOutcome::Completed { results, .. } => results,
            QueryOutcome::Skipped => &[],
        }
    }
}

/// Run one query against `store`, reporting to `sink`.
pub async fn run_query<S: Store + ?Sized>(
    store: &S,
    sink: &dyn ResultSink,
    query: &Query,
    params: &QueryParams,
) -> Result<QueryOutcome> {
    let plan = match plan(query, params) {
        Some(plan) => plan,
        None => {
            tracing::debug!(?query, "query skipped");
            return Ok(QueryOutcome::Skipped);
        }
    };

    sink.show_progress();
    sink.set_message(SEARCHING_MESSAGE);
    let start = Instant::now();

    let mut results = Vec::new();
    let outcome = execute(store, sink, &plan, params, &mut results).await;
    let elapsed_ms = start.elapsed().as_millis() as u64;

    match outcome {
        Ok(()) => {
            sink.hide_progress();
            sink.set_message(&format!("{} Articles / {}[ms]", results.len(), elapsed_ms));
            sink.on_complete(elapsed_ms);
            tracing::info!(?query, hits = results.len(), elapsed_ms, "query finished");
            Ok(QueryOutcome::Completed {
                results,
                elapsed_ms,
            })
        }
        Err(e) => {
            tracing::error!(?query, error = %e, "query failed");
            sink.hide_progress();
            sink.on_error(&e);
            Err(e)
        }
    }
}

enum Plan<'a> {
    All,
    Tokens(String),
    Text(&'a str),
    Scan(AndKeywordFilter),
    Filter(&'a str),
}

fn plan<'a>(query: &'a Query, params: &QueryParams) -> Option<Plan<'a>> {
    match query {
        Query::All => Some(Plan::All),
        Query::Search(keyword) => {
            if keyword.trim().is_empty() {
                return None;
            }
            match params.strategy {
                SearchStrategy::Ngram => {
                    let tokens = ngram(keyword, params.ngram_size);
                    if tokens.trim().is_empty() {
                        Some(Plan::Text(keyword))
                    } else {
                        Some(Plan::Tokens(tokens))
                    }
                }
                SearchStrategy::Scan => Some(Plan::Scan(AndKeywordFilter::new(keyword))),
            }
        }
        Query::Filter(keyword) => {
            if !params.use_title_filter {
                return None;
            }
            if keyword.trim().is_empty() {
                Some(Plan::All)
            } else {
                Some(Plan::Filter(keyword))
            }
        }
    }
}

async fn execute<S: Store + ?Sized>(
    store: &S,
    sink: &dyn ResultSink,
    plan: &Plan<'_>,
    params: &QueryParams,
    results: &mut Vec<SearchResult>,
) -> Result<()> {
    let batch = match plan {
        Plan::All => store.get_all(params.limit).await?,
        Plan::Tokens(tokens) => store.search_tokens(tokens, UNLIMITED).await?,
        Plan::Text(keyword) => store.search_text(keyword, UNLIMITED).await?,
        Plan::Filter(keyword) => store.filter(keyword, params.limit).await?,
        Plan::Scan(filter) => {
            for doc in store.scan(UNLIMITED).await? {
                if filter.matches(&doc) {
                    let item = doc.to_search_result();
                    sink.on_result(&item);
                    results.push(item);
                }
            }
            return Ok(());
        }
    };

    for item in batch {
        sink.on_result(&item);
        results.push(item);
    }
    Ok(())
}

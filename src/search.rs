//! CLI entry points for `artx list`, `artx search` and `artx filter`.
//!
//! Each command opens the database, runs one query through a
//! [`SearchSession`] and prints results as they arrive.

use std::sync::Arc;

use anyhow::{anyhow, Result};

use article_index_core::search::{Query, QueryOutcome, SearchStrategy};
use article_index_core::sink::ResultSink;

use crate::config::Config;
use crate::db;
use crate::output::{JsonSink, TextSink};
use crate::sqlite_store::SqliteStore;
use crate::worker::SearchSession;

/// Overrides applied on top of the configured query parameters.
#[derive(Debug, Clone, Default)]
pub struct SearchOptions {
    pub strategy: Option<SearchStrategy>,
    pub limit: Option<i64>,
    pub json: bool,
}

pub async fn run_query_command(
    config: &Config,
    query: Query,
    options: &SearchOptions,
) -> Result<QueryOutcome> {
    let mut params = config.query_params();
    if let Some(strategy) = options.strategy {
        params.strategy = strategy;
    }
    if let Some(limit) = options.limit {
        params.limit = limit.max(1);
    }

    let sink: Arc<dyn ResultSink> = if options.json {
        Arc::new(JsonSink)
    } else {
        Arc::new(TextSink { show_status: true })
    };

    let store = SqliteStore::new(db::connect(config).await?);
    let session = SearchSession::new(Arc::new(store.clone()), sink, params);
    let outcome = session.run(query.clone()).wait().await;
    store.close().await;

    let outcome = outcome.ok_or_else(|| anyhow!("query cancelled"))??;
    if outcome == QueryOutcome::Skipped && !options.json {
        match query {
            Query::Filter(_) => eprintln!("Title filter is disabled (search.use_title_filter)."),
            _ => eprintln!("No results."),
        }
    }
    Ok(outcome)
}

//! Background query execution with cancellation.
//!
//! A [`SearchSession`] belongs to one result surface (a list view, a
//! terminal). Each [`SearchSession::run`] executes on its own tokio task
//! with its own result buffer. Closing or dropping the session cancels
//! every in-flight query, and once [`SearchSession::close`] returns the
//! sink receives no further callbacks.
//!
//! Sink callbacks must not call back into [`SearchSession::close`] or
//! [`QueryHandle::cancel`]; delivery and cancellation share one lock.

use std::sync::{Arc, Mutex, MutexGuard};

use anyhow::{anyhow, Result};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use article_index_core::models::SearchResult;
use article_index_core::search::{run_query, Query, QueryOutcome, QueryParams};
use article_index_core::sink::ResultSink;
use article_index_core::store::Store;

type Gate = Arc<Mutex<()>>;

fn enter(gate: &Gate) -> MutexGuard<'_, ()> {
    gate.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// Forwards to the real sink only while its token is live.
struct GatedSink {
    inner: Arc<dyn ResultSink>,
    token: CancellationToken,
    gate: Gate,
}

impl GatedSink {
    fn deliver(&self, f: impl FnOnce(&dyn ResultSink)) {
        let _held = enter(&self.gate);
        if !self.token.is_cancelled() {
            f(self.inner.as_ref());
        }
    }
}

impl ResultSink for GatedSink {
    fn show_progress(&self) {
        self.deliver(|s| s.show_progress());
    }

    fn hide_progress(&self) {
        self.deliver(|s| s.hide_progress());
    }

    fn set_message(&self, text: &str) {
        self.deliver(|s| s.set_message(text));
    }

    fn on_result(&self, item: &SearchResult) {
        self.deliver(|s| s.on_result(item));
    }

    fn on_error(&self, cause: &anyhow::Error) {
        self.deliver(|s| s.on_error(cause));
    }

    fn on_complete(&self, elapsed_ms: u64) {
        self.deliver(|s| s.on_complete(elapsed_ms));
    }
}

pub struct SearchSession {
    store: Arc<dyn Store>,
    sink: Arc<dyn ResultSink>,
    params: QueryParams,
    token: CancellationToken,
    gate: Gate,
}

impl SearchSession {
    pub fn new(store: Arc<dyn Store>, sink: Arc<dyn ResultSink>, params: QueryParams) -> Self {
        Self {
            store,
            sink,
            params,
            token: CancellationToken::new(),
            gate: Arc::new(Mutex::new(())),
        }
    }

    /// Start `query` on a background task. Must be called inside a tokio
    /// runtime.
    pub fn run(&self, query: Query) -> QueryHandle {
        let token = self.token.child_token();
        let sink = GatedSink {
            inner: Arc::clone(&self.sink),
            token: token.clone(),
            gate: Arc::clone(&self.gate),
        };
        let store = Arc::clone(&self.store);
        let params = self.params.clone();
        let task_token = token.clone();

        let task = tokio::spawn(async move {
            tokio::select! {
                _ = task_token.cancelled() => {
                    tracing::debug!(?query, "query cancelled");
                    None
                }
                outcome = run_query(store.as_ref(), &sink, &query, &params) => Some(outcome),
            }
        });

        QueryHandle {
            token,
            gate: Arc::clone(&self.gate),
            task,
        }
    }

    /// Cancel every query started from this session.
    pub fn close(&self) {
        let _held = enter(&self.gate);
        self.token.cancel();
    }

    pub fn is_closed(&self) -> bool {
        self.token.is_cancelled()
    }
}

impl Drop for SearchSession {
    fn drop(&mut self) {
        self.close();
    }
}

pub struct QueryHandle {
    token: CancellationToken,
    gate: Gate,
    task: JoinHandle<Option<Result<QueryOutcome>>>,
}

impl QueryHandle {
    pub fn cancel(&self) {
        let _held = enter(&self.gate);
        self.token.cancel();
    }

    /// Wait for the query. `None` when it was cancelled before finishing.
    pub async fn wait(self) -> Option<Result<QueryOutcome>> {
        match self.task.await {
            Ok(outcome) => outcome,
            Err(e) => Some(Err(anyhow!("query task failed: {}", e))),
        }
    }
}

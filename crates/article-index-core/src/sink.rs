//! Progress and result collaborator.
//!
//! The query coordinator never renders anything itself; it reports
//! progress transitions and results to a [`ResultSink`] supplied by the
//! caller (a terminal printer, a list view, a test recorder).

use std::sync::Mutex;

use crate::models::SearchResult;

pub trait ResultSink: Send + Sync {
    fn show_progress(&self);
    fn hide_progress(&self);
    fn set_message(&self, text: &str);
    fn on_result(&self, item: &SearchResult);
    fn on_error(&self, cause: &anyhow::Error);
    fn on_complete(&self, elapsed_ms: u64);
}

/// Everything a [`ResultSink`] can observe, in order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SinkEvent {
    ShowProgress,
    HideProgress,
    Message(String),
    Result(SearchResult),
    Error(String),
    Complete(u64),
}

/// Records every event; used by tests and by callers that want a batch.
#[derive(Debug, Default)]
pub struct CollectingSink {
    events: Mutex<Vec<SinkEvent>>,
}

impl CollectingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<SinkEvent> {
        self.events
            .lock()
            .map(|events| events.clone())
            .unwrap_or_default()
    }

    pub fn results(&self) -> Vec<SearchResult> {
        self.events()
            .into_iter()
            .filter_map(|e| match e {
                SinkEvent::Result(r) => Some(r),
                _ => None,
            })
            .collect()
    }

    pub fn titles(&self) -> Vec<String> {
        self.results().into_iter().map(|r| r.title).collect()
    }

    fn push(&self, event: SinkEvent) {
        if let Ok(mut events) = self.events.lock() {
            events.push(event);
        }
    }
}

impl ResultSink for CollectingSink {
    fn show_progress(&self) {
        self.push(SinkEvent::ShowProgress);
    }

    fn hide_progress(&self) {
        self.push(SinkEvent::HideProgress);
    }

    fn set_message(&self, text: &str) {
        self.push(SinkEvent::Message(text.to_string()));
    }

    fn on_result(&self, item: &SearchResult) {
        self.push(SinkEvent::Result(item.clone()));
    }

    fn on_error(&self, cause: &anyhow::Error) {
        self.push(SinkEvent::Error(cause.to_string()));
    }

    fn on_complete(&self, elapsed_ms: u64) {
        self.push(SinkEvent::Complete(elapsed_ms));
    }
}

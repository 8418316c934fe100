//! Terminal [`ResultSink`]s for the CLI.
//!
//! Results go to stdout, one per line; progress, status messages and
//! errors go to stderr.

use std::io::Write;

use chrono::{DateTime, Utc};

use article_index_core::models::SearchResult;
use article_index_core::sink::ResultSink;

use crate::progress::format_number;

pub fn format_millis(ms: Option<i64>) -> String {
    ms.and_then(DateTime::<Utc>::from_timestamp_millis)
        .map(|dt| dt.format("%Y-%m-%d %H:%M").to_string())
        .unwrap_or_else(|| "-".to_string())
}

/// Aligned text lines: `2019-01-02 03:04  1,234  title`.
pub struct TextSink {
    pub show_status: bool,
}

impl ResultSink for TextSink {
    fn show_progress(&self) {}

    fn hide_progress(&self) {}

    fn set_message(&self, text: &str) {
        if self.show_status {
            let _ = writeln!(std::io::stderr().lock(), "{}", text);
        }
    }

    fn on_result(&self, item: &SearchResult) {
        let _ = writeln!(
            std::io::stdout().lock(),
            "{}  {:>8}  {}",
            format_millis(item.last_modified),
            format_number(item.length.max(0) as u64),
            item.title
        );
    }

    fn on_error(&self, cause: &anyhow::Error) {
        let _ = writeln!(std::io::stderr().lock(), "Error: {:#}", cause);
    }

    fn on_complete(&self, _elapsed_ms: u64) {
        let _ = std::io::stdout().lock().flush();
    }
}

/// One JSON object per result on stdout.
pub struct JsonSink;

impl ResultSink for JsonSink {
    fn show_progress(&self) {}

    fn hide_progress(&self) {}

    fn set_message(&self, _text: &str) {}

    fn on_result(&self, item: &SearchResult) {
        if let Ok(line) = serde_json::to_string(item) {
            let _ = writeln!(std::io::stdout().lock(), "{}", line);
        }
    }

    fn on_error(&self, cause: &anyhow::Error) {
        let obj = serde_json::json!({ "event": "error", "message": format!("{:#}", cause) });
        let _ = writeln!(std::io::stderr().lock(), "{}", obj);
    }

    fn on_complete(&self, elapsed_ms: u64) {
        let obj = serde_json::json!({ "event": "complete", "elapsed_ms": elapsed_ms });
        let _ = writeln!(std::io::stderr().lock(), "{}", obj);
    }
}

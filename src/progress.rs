//! Import progress reporting.
//!
//! Reports observable progress during `artx import` so users see how many
//! articles have been stored. Progress is emitted on **stderr** so stdout
//! remains parseable for scripts.

use std::io::Write;

/// Human output prints one line per this many imported entries.
const HUMAN_REPORT_EVERY: u64 = 100;

/// A single progress event for import.
#[derive(Clone, Debug)]
pub enum ImportProgressEvent {
    /// The archive has been opened.
    Started { archive: String },
    /// `n` articles stored so far; `title` is the latest one.
    Importing { n: u64, title: String },
    /// The import pass ended (completely or early).
    Finished { imported: u64, elapsed_ms: u64 },
}

/// Reports import progress. Implementations write to stderr (human or JSON).
pub trait ImportProgressReporter: Send + Sync {
    /// Emit a progress event. Called from the import pipeline.
    fn report(&self, event: ImportProgressEvent);
}

/// Human-friendly progress on stderr: "import  importing  1,200 articles".
pub struct StderrProgress;

impl ImportProgressReporter for StderrProgress {
    fn report(&self, event: ImportProgressEvent) {
        let line = match &event {
            ImportProgressEvent::Started { archive } => format!("import {}  reading...\n", archive),
            ImportProgressEvent::Importing { n, .. } => {
                if n % HUMAN_REPORT_EVERY != 0 {
                    return;
                }
                format!("import  importing  {} articles\n", format_number(*n))
            }
            ImportProgressEvent::Finished {
                imported,
                elapsed_ms,
            } => format!(
                "import  done  {} articles / {}[ms]\n",
                format_number(*imported),
                elapsed_ms
            ),
        };
        let mut stderr = std::io::stderr().lock();
        let _ = stderr.write_all(line.as_bytes());
        let _ = stderr.flush();
    }
}

/// Machine-readable progress: one JSON object per line on stderr.
pub struct JsonProgress;

impl ImportProgressReporter for JsonProgress {
    fn report(&self, event: ImportProgressEvent) {
        let obj = match &event {
            ImportProgressEvent::Started { archive } => serde_json::json!({
                "event": "progress",
                "phase": "started",
                "archive": archive
            }),
            ImportProgressEvent::Importing { n, title } => serde_json::json!({
                "event": "progress",
                "phase": "importing",
                "n": n,
                "title": title
            }),
            ImportProgressEvent::Finished {
                imported,
                elapsed_ms,
            } => serde_json::json!({
                "event": "progress",
                "phase": "finished",
                "imported": imported,
                "elapsed_ms": elapsed_ms
            }),
        };
        if let Ok(line) = serde_json::to_string(&obj) {
            let mut stderr = std::io::stderr().lock();
            let _ = writeln!(stderr, "{}", line);
            let _ = stderr.flush();
        }
    }
}

/// No-op reporter when progress is disabled.
pub struct NoProgress;

impl ImportProgressReporter for NoProgress {
    fn report(&self, _event: ImportProgressEvent) {}
}

pub fn format_number(n: u64) -> String {
    let s = n.to_string();
    let mut result = String::with_capacity(s.len() + (s.len() - 1) / 3);
    let chars: Vec<char> = s.chars().rev().collect();
    for (i, c) in chars.iter().enumerate() {
        if i > 0 && i % 3 == 0 {
            result.push(',');
        }
        result.push(*c);
    }
    result.chars().rev().collect()
}

/// Progress mode for the CLI: off, human (stderr), or JSON (stderr).
#[derive(Clone, Copy, Debug, Eq, PartialEq, clap::ValueEnum)]
pub enum ProgressMode {
    Off,
    Human,
    Json,
}

impl ProgressMode {
    /// Default: human progress when stderr is a TTY, otherwise off.
    pub fn default_for_tty() -> Self {
        if atty::is(atty::Stream::Stderr) {
            ProgressMode::Human
        } else {
            ProgressMode::Off
        }
    }

    /// Build a reporter for this mode.
    pub fn reporter(&self) -> Box<dyn ImportProgressReporter> {
        match self {
            ProgressMode::Off => Box::new(NoProgress),
            ProgressMode::Human => Box::new(StderrProgress),
            ProgressMode::Json => Box::new(JsonProgress),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn format_number_comma() {
        assert_eq!(format_number(0), "0");
        assert_eq!(format_number(999), "999");
        assert_eq!(format_number(1000), "1,000");
        assert_eq!(format_number(1_234_567), "1,234,567");
    }
}

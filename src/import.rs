//! Archive import pipeline.
//!
//! Walks a zip archive entry by entry: archive → decode title → read
//! body → derive length, hash and token index → upsert by title.
//!
//! Entries are located through the central directory, so archives whose
//! entries carry sizes in trailing data descriptors (as streaming
//! writers produce) import like any other. The archive is read on a
//! blocking thread and each converted entry is handed to the async
//! inserter through a bounded channel, so entries are stored in archive
//! order while the runtime stays free.
//!
//! # Failure policy
//!
//! Import is best effort, not a transaction. If an entry cannot be read
//! (corrupt header, bad checksum, truncated data) the offending entry is
//! logged, the import stops, and every document inserted so far stays
//! committed; the error is returned in [`ImportReport::aborted`]. A store
//! failure stops the import and is returned as an error.

use std::fs::File;
use std::io::{BufReader, Read, Seek};
use std::path::Path;
use std::time::{Instant, UNIX_EPOCH};

use anyhow::Context;
use chrono::NaiveDate;
use thiserror::Error;
use tokio::sync::mpsc;

use article_index_core::decode::decode_name;
use article_index_core::models::Document;
use article_index_core::ngram::ngram;
use article_index_core::store::Store;

use crate::config::Config;
use crate::db;
use crate::progress::{ImportProgressEvent, ImportProgressReporter};
use crate::sqlite_store::SqliteStore;

const CHANNEL_CAPACITY: usize = 64;
/// Upper bound on the buffer reserved from an entry's declared size.
const MAX_PREALLOC: u64 = 1 << 20;

#[derive(Debug, Error)]
pub enum ImportError {
    #[error("archive format error at entry '{entry}': {message}")]
    Archive { entry: String, message: String },
    #[error("store error: {0:#}")]
    Store(#[source] anyhow::Error),
    #[error("archive reader stopped unexpectedly: {0}")]
    Reader(#[from] tokio::task::JoinError),
}

#[derive(Debug, Clone)]
pub struct ImportOptions {
    pub ngram_size: usize,
    pub index_tokens: bool,
    /// Wipe the store before the first insert.
    pub replace_all: bool,
    /// Modification time (ms) of the archive itself, recorded on success.
    pub archive_modified: Option<i64>,
}

impl Default for ImportOptions {
    fn default() -> Self {
        Self {
            ngram_size: 2,
            index_tokens: true,
            replace_all: false,
            archive_modified: None,
        }
    }
}

#[derive(Debug, Default)]
pub struct ImportReport {
    pub imported: u64,
    /// Imported entries whose content matched what was already stored.
    pub unchanged: u64,
    pub skipped: u64,
    pub aborted: Option<ImportError>,
    pub elapsed_ms: u64,
}

enum Record {
    Document { entry: String, doc: Document },
    Skipped { entry: String, reason: String },
    Aborted(ImportError),
}

#[derive(Clone, Copy)]
struct EntryOptions {
    ngram_size: usize,
    index_tokens: bool,
}

/// `"articles/c6fcb5ad.txt"` → `"c6fcb5ad"`.
pub fn entry_stem(name: &str) -> &str {
    let base = name.rsplit('/').next().unwrap_or(name);
    match base.rfind('.') {
        Some(dot) => &base[..dot],
        None => base,
    }
}

/// Entries without a `.` anywhere in their name are directory markers.
pub fn is_document_entry(name: &str) -> bool {
    name.contains('.') && !name.ends_with('/')
}

fn zip_time_to_millis(dt: zip::DateTime) -> Option<i64> {
    NaiveDate::from_ymd_opt(dt.year() as i32, dt.month() as u32, dt.day() as u32)?
        .and_hms_opt(dt.hour() as u32, dt.minute() as u32, dt.second() as u32)
        .map(|t| t.and_utc().timestamp_millis())
}

fn build_document(
    name: &str,
    content: String,
    last_modified: Option<i64>,
    options: EntryOptions,
) -> Record {
    let stem = entry_stem(name);
    let title = match decode_name(stem) {
        Ok(title) => title,
        Err(e) => {
            tracing::error!(entry = name, error = %e, "title decode failed, keeping raw name");
            stem.to_string()
        }
    };

    if title.is_empty() {
        return Record::Skipped {
            entry: name.to_string(),
            reason: "empty title".to_string(),
        };
    }

    let token_index = options
        .index_tokens
        .then(|| ngram(&content, options.ngram_size));

    Record::Document {
        entry: name.to_string(),
        doc: Document::new(title, content)
            .with_last_modified(last_modified)
            .with_token_index(token_index),
    }
}

/// Central directory name for entries whose header cannot be read.
const UNNAMED_ENTRY: &str = "<unnamed>";

fn read_archive<R: Read + Seek>(reader: R, options: EntryOptions, tx: mpsc::Sender<Record>) {
    let mut archive = match zip::ZipArchive::new(reader) {
        Ok(archive) => archive,
        Err(e) => {
            let _ = tx.blocking_send(Record::Aborted(ImportError::Archive {
                entry: "<central directory>".to_string(),
                message: e.to_string(),
            }));
            return;
        }
    };

    for index in 0..archive.len() {
        // Names come from the central directory, so a broken local header
        // or body is still reported against the right entry.
        let name = archive
            .name_for_index(index)
            .unwrap_or(UNNAMED_ENTRY)
            .to_string();
        if !is_document_entry(&name) {
            continue;
        }

        let record = match archive.by_index(index) {
            Err(e) => Record::Aborted(ImportError::Archive {
                entry: name,
                message: e.to_string(),
            }),
            Ok(file) if file.is_dir() => continue,
            Ok(mut file) => {
                // zip has returned both `DateTime` and `Option<DateTime>` here.
                let modified: Option<zip::DateTime> = Option::from(file.last_modified());
                let mut bytes = Vec::with_capacity(file.size().min(MAX_PREALLOC) as usize);
                match file.read_to_end(&mut bytes) {
                    Ok(_) => build_document(
                        &name,
                        String::from_utf8_lossy(&bytes).into_owned(),
                        modified.and_then(zip_time_to_millis),
                        options,
                    ),
                    Err(e) => Record::Aborted(ImportError::Archive {
                        entry: name,
                        message: e.to_string(),
                    }),
                }
            }
        };

        let stop = matches!(record, Record::Aborted(_));
        if tx.blocking_send(record).is_err() || stop {
            break;
        }
    }
}

/// Import every document entry of a zip archive into `store`.
pub async fn import_archive<S, R>(
    store: &S,
    reader: R,
    options: &ImportOptions,
    progress: &dyn ImportProgressReporter,
) -> Result<ImportReport, ImportError>
where
    S: Store + ?Sized,
    R: Read + Seek + Send + 'static,
{
    let start = Instant::now();
    let mut report = ImportReport::default();

    if options.replace_all {
        store.delete_all().await.map_err(ImportError::Store)?;
    }

    let entry_options = EntryOptions {
        ngram_size: options.ngram_size,
        index_tokens: options.index_tokens,
    };
    let (tx, mut rx) = mpsc::channel(CHANNEL_CAPACITY);
    let reader_task =
        tokio::task::spawn_blocking(move || read_archive(reader, entry_options, tx));

    while let Some(record) = rx.recv().await {
        match record {
            Record::Document { entry, doc } => {
                let previous = store
                    .content_hash(&doc.title)
                    .await
                    .map_err(ImportError::Store)?;
                if previous.as_deref() == Some(doc.content_hash.as_str()) {
                    report.unchanged += 1;
                }
                store.insert(&doc).await.map_err(ImportError::Store)?;
                report.imported += 1;
                tracing::debug!(entry = %entry, title = %doc.title, length = doc.length, "imported");
                progress.report(ImportProgressEvent::Importing {
                    n: report.imported,
                    title: doc.title,
                });
            }
            Record::Skipped { entry, reason } => {
                tracing::warn!(entry = %entry, reason = %reason, "entry skipped");
                report.skipped += 1;
            }
            Record::Aborted(e) => {
                tracing::error!(error = %e, imported = report.imported, "import aborted");
                report.aborted = Some(e);
            }
        }
    }

    reader_task.await?;

    if report.aborted.is_none() {
        if let Some(millis) = options.archive_modified {
            store
                .set_last_imported(millis)
                .await
                .map_err(ImportError::Store)?;
        }
    }

    report.elapsed_ms = start.elapsed().as_millis() as u64;
    progress.report(ImportProgressEvent::Finished {
        imported: report.imported,
        elapsed_ms: report.elapsed_ms,
    });
    tracing::info!(
        imported = report.imported,
        unchanged = report.unchanged,
        skipped = report.skipped,
        aborted = report.aborted.is_some(),
        elapsed_ms = report.elapsed_ms,
        "import finished"
    );
    Ok(report)
}

fn file_modified_millis(file: &File) -> Option<i64> {
    let modified = file.metadata().ok()?.modified().ok()?;
    let since_epoch = modified.duration_since(UNIX_EPOCH).ok()?;
    Some(since_epoch.as_millis() as i64)
}

/// `artx import <zip>`: import an archive file into the configured database.
pub async fn run_import(
    config: &Config,
    archive: &Path,
    replace_all: bool,
    progress: &dyn ImportProgressReporter,
) -> anyhow::Result<ImportReport> {
    let file = File::open(archive)
        .with_context(|| format!("Failed to open archive: {}", archive.display()))?;
    let options = ImportOptions {
        ngram_size: config.import.ngram_size,
        index_tokens: config.import.index_tokens,
        replace_all,
        archive_modified: file_modified_millis(&file),
    };

    progress.report(ImportProgressEvent::Started {
        archive: archive.display().to_string(),
    });

    let pool = db::connect(config).await?;
    let store = SqliteStore::new(pool);
    let result = import_archive(&store, BufReader::new(file), &options, progress).await;
    store.close().await;
    Ok(result?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stem_strips_path_and_extension() {
        assert_eq!(entry_stem("articles/c6fcb5ad.txt"), "c6fcb5ad");
        assert_eq!(entry_stem("a/b/c6fcb5ad.md"), "c6fcb5ad");
        assert_eq!(entry_stem("c6fcb5ad.tar.gz"), "c6fcb5ad.tar");
        assert_eq!(entry_stem("dir.v1/4142"), "4142");
    }

    #[test]
    fn directory_markers_are_not_documents() {
        assert!(!is_document_entry("articles/"));
        assert!(!is_document_entry("articles"));
        assert!(!is_document_entry("articles.v1/"));
        assert!(is_document_entry("articles/4142.txt"));
    }

    #[test]
    fn undecodable_title_keeps_raw_stem() {
        let options = EntryOptions {
            ngram_size: 2,
            index_tokens: true,
        };
        match build_document("dir/readme.txt", "hello".into(), None, options) {
            Record::Document { doc, .. } => {
                assert_eq!(doc.title, "readme");
                assert_eq!(doc.token_index.as_deref(), Some("he el ll lo"));
            }
            _ => panic!("expected a document"),
        }
    }

    #[test]
    fn empty_title_is_skipped() {
        let options = EntryOptions {
            ngram_size: 2,
            index_tokens: false,
        };
        assert!(matches!(
            build_document("dir/.txt", "x".into(), None, options),
            Record::Skipped { .. }
        ));
    }

    #[test]
    fn zip_time_converts_to_utc_millis() {
        let dt = zip::DateTime::from_date_and_time(2019, 1, 2, 3, 4, 6).unwrap();
        assert_eq!(zip_time_to_millis(dt), Some(1_546_398_246_000));
    }
}

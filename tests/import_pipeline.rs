use std::io::{Cursor, Read, Write};
use std::sync::Mutex;

use article_index::config::Config;
use article_index::db;
use article_index::import::{import_archive, ImportError, ImportOptions};
use article_index::migrate::migrate_pool;
use article_index::progress::{ImportProgressEvent, ImportProgressReporter, NoProgress};
use article_index::sqlite_store::SqliteStore;
use article_index_core::decode::encode_name;
use article_index_core::search::{run_query, Query, QueryParams, SearchStrategy};
use article_index_core::sink::CollectingSink;
use article_index_core::store::Store;
use tempfile::TempDir;
use zip::write::SimpleFileOptions;

struct Entry<'a> {
    name: String,
    body: &'a str,
}

fn article(title: &str, body: &'static str) -> Entry<'static> {
    Entry {
        name: format!("articles/{}.txt", encode_name(title)),
        body,
    }
}

fn build_zip(entries: &[Entry<'_>]) -> Vec<u8> {
    let modified = zip::DateTime::from_date_and_time(2019, 1, 2, 3, 4, 6).unwrap();
    let options = SimpleFileOptions::default()
        .compression_method(zip::CompressionMethod::Stored)
        .last_modified_time(modified);

    let mut writer = zip::ZipWriter::new(Cursor::new(Vec::new()));
    writer.add_directory("articles/", options).unwrap();
    for entry in entries {
        writer.start_file(entry.name.clone(), options).unwrap();
        writer.write_all(entry.body.as_bytes()).unwrap();
    }
    writer.finish().unwrap().into_inner()
}

async fn open_store(tmp: &TempDir) -> SqliteStore {
    let mut config = Config::default();
    config.db.path = tmp.path().join("data").join("articles.sqlite");
    let pool = db::connect(&config).await.unwrap();
    migrate_pool(&pool).await.unwrap();
    SqliteStore::new(pool)
}

#[derive(Default)]
struct RecordingProgress {
    titles: Mutex<Vec<String>>,
    finished: Mutex<Option<u64>>,
}

impl ImportProgressReporter for RecordingProgress {
    fn report(&self, event: ImportProgressEvent) {
        match event {
            ImportProgressEvent::Importing { title, .. } => {
                self.titles.lock().unwrap().push(title)
            }
            ImportProgressEvent::Finished { imported, .. } => {
                *self.finished.lock().unwrap() = Some(imported)
            }
            ImportProgressEvent::Started { .. } => {}
        }
    }
}

#[tokio::test]
async fn imports_hex_named_entries() {
    let tmp = TempDir::new().unwrap();
    let store = open_store(&tmp).await;
    let archive = build_zip(&[article("日記", "今日は晴れ")]);

    let progress = RecordingProgress::default();
    let report = import_archive(
        &store,
        Cursor::new(archive),
        &ImportOptions::default(),
        &progress,
    )
    .await
    .unwrap();

    assert_eq!(report.imported, 1);
    assert!(report.aborted.is_none());
    assert_eq!(*progress.titles.lock().unwrap(), vec!["日記".to_string()]);
    assert_eq!(*progress.finished.lock().unwrap(), Some(1));

    assert_eq!(store.count().await.unwrap(), 1);
    assert_eq!(
        store.find_content_by_title("日記").await.unwrap().as_deref(),
        Some("今日は晴れ")
    );

    let listed = store.get_all(10).await.unwrap();
    assert_eq!(listed[0].length, 5);
    assert_eq!(listed[0].last_modified, Some(1_546_398_246_000));
}

#[tokio::test]
async fn reimport_keeps_one_row_per_title() {
    let tmp = TempDir::new().unwrap();
    let store = open_store(&tmp).await;
    let archive = build_zip(&[
        article("first", "alpha"),
        article("second", "beta"),
        article("first", "alpha again"),
    ]);

    let options = ImportOptions::default();
    let first = import_archive(&store, Cursor::new(archive.clone()), &options, &NoProgress)
        .await
        .unwrap();
    assert_eq!(first.imported, 3);
    assert_eq!(store.count().await.unwrap(), 2);
    assert_eq!(
        store.find_content_by_title("first").await.unwrap().as_deref(),
        Some("alpha again")
    );

    let second = import_archive(&store, Cursor::new(archive), &options, &NoProgress)
        .await
        .unwrap();
    assert_eq!(second.imported, 3);
    assert_eq!(second.unchanged, 2);
    assert_eq!(store.count().await.unwrap(), 2);
}

#[tokio::test]
async fn replace_all_drops_previous_articles() {
    let tmp = TempDir::new().unwrap();
    let store = open_store(&tmp).await;

    import_archive(
        &store,
        Cursor::new(build_zip(&[article("old", "stale")])),
        &ImportOptions::default(),
        &NoProgress,
    )
    .await
    .unwrap();

    let options = ImportOptions {
        replace_all: true,
        ..ImportOptions::default()
    };
    import_archive(
        &store,
        Cursor::new(build_zip(&[article("new", "fresh")])),
        &options,
        &NoProgress,
    )
    .await
    .unwrap();

    assert_eq!(store.count().await.unwrap(), 1);
    assert!(store.find_content_by_title("old").await.unwrap().is_none());
}

#[tokio::test]
async fn entries_without_extension_are_skipped() {
    let tmp = TempDir::new().unwrap();
    let store = open_store(&tmp).await;
    let archive = build_zip(&[
        Entry {
            name: format!("articles/{}", encode_name("noext")),
            body: "ignored",
        },
        article("kept", "body"),
    ]);

    let report = import_archive(
        &store,
        Cursor::new(archive),
        &ImportOptions::default(),
        &NoProgress,
    )
    .await
    .unwrap();

    assert_eq!(report.imported, 1);
    assert_eq!(store.count().await.unwrap(), 1);
    assert!(store.find_content_by_title("noext").await.unwrap().is_none());
}

#[tokio::test]
async fn corrupt_entry_aborts_but_keeps_earlier_articles() {
    let tmp = TempDir::new().unwrap();
    let store = open_store(&tmp).await;
    let second = article("second", "second body text");
    let second_name = second.name.clone();
    let mut archive = build_zip(&[article("first", "one"), second]);

    // Flip one stored byte of the second body so its CRC no longer matches.
    let body = b"second body text";
    let at = archive
        .windows(body.len())
        .position(|w| w == body)
        .unwrap();
    archive[at] = b'S';

    let options = ImportOptions {
        archive_modified: Some(42),
        ..ImportOptions::default()
    };
    let report = import_archive(&store, Cursor::new(archive), &options, &NoProgress)
        .await
        .unwrap();

    assert_eq!(report.imported, 1);
    match report.aborted {
        Some(ImportError::Archive { entry, .. }) => assert_eq!(entry, second_name),
        other => panic!("expected an archive error, got {:?}", other),
    }
    assert_eq!(
        store.find_content_by_title("first").await.unwrap().as_deref(),
        Some("one")
    );
    assert!(store.find_content_by_title("second").await.unwrap().is_none());
    assert_eq!(store.last_imported().await.unwrap(), None);
}

/// Rewrite a normal deflated archive the way streaming writers lay it
/// out: general-purpose flag bit 3 set, zero CRC and sizes in each local
/// header, and the real values in a data descriptor after the body.
fn with_data_descriptors(entries: &[Entry<'_>]) -> Vec<u8> {
    let modified = zip::DateTime::from_date_and_time(2019, 1, 2, 3, 4, 6).unwrap();
    let options = SimpleFileOptions::default()
        .compression_method(zip::CompressionMethod::Deflated)
        .last_modified_time(modified);
    let mut writer = zip::ZipWriter::new(Cursor::new(Vec::new()));
    for entry in entries {
        writer.start_file(entry.name.clone(), options).unwrap();
        writer.write_all(entry.body.as_bytes()).unwrap();
    }
    let mut source = zip::ZipArchive::new(writer.finish().unwrap()).unwrap();

    let dos_date: u16 = ((2019 - 1980) << 9) | (1 << 5) | 2;
    let dos_time: u16 = (3 << 11) | (4 << 5) | (6 / 2);
    let mut out = Vec::new();
    let mut central = Vec::new();

    for index in 0..source.len() {
        let mut file = source.by_index_raw(index).unwrap();
        let name = file.name().to_string();
        let (crc, compressed, size) = (file.crc32(), file.compressed_size(), file.size());
        let mut raw = Vec::new();
        file.read_to_end(&mut raw).unwrap();
        let offset = out.len() as u32;

        out.extend_from_slice(&0x0403_4b50u32.to_le_bytes());
        out.extend_from_slice(&20u16.to_le_bytes());
        out.extend_from_slice(&0x0008u16.to_le_bytes());
        out.extend_from_slice(&8u16.to_le_bytes());
        out.extend_from_slice(&dos_time.to_le_bytes());
        out.extend_from_slice(&dos_date.to_le_bytes());
        out.extend_from_slice(&[0u8; 12]);
        out.extend_from_slice(&(name.len() as u16).to_le_bytes());
        out.extend_from_slice(&0u16.to_le_bytes());
        out.extend_from_slice(name.as_bytes());
        out.extend_from_slice(&raw);
        out.extend_from_slice(&0x0807_4b50u32.to_le_bytes());
        out.extend_from_slice(&crc.to_le_bytes());
        out.extend_from_slice(&(compressed as u32).to_le_bytes());
        out.extend_from_slice(&(size as u32).to_le_bytes());

        central.extend_from_slice(&0x0201_4b50u32.to_le_bytes());
        central.extend_from_slice(&20u16.to_le_bytes());
        central.extend_from_slice(&20u16.to_le_bytes());
        central.extend_from_slice(&0x0008u16.to_le_bytes());
        central.extend_from_slice(&8u16.to_le_bytes());
        central.extend_from_slice(&dos_time.to_le_bytes());
        central.extend_from_slice(&dos_date.to_le_bytes());
        central.extend_from_slice(&crc.to_le_bytes());
        central.extend_from_slice(&(compressed as u32).to_le_bytes());
        central.extend_from_slice(&(size as u32).to_le_bytes());
        central.extend_from_slice(&(name.len() as u16).to_le_bytes());
        central.extend_from_slice(&[0u8; 12]);
        central.extend_from_slice(&offset.to_le_bytes());
        central.extend_from_slice(name.as_bytes());
    }

    let central_offset = out.len() as u32;
    let count = source.len() as u16;
    out.extend_from_slice(&central);
    out.extend_from_slice(&0x0605_4b50u32.to_le_bytes());
    out.extend_from_slice(&[0u8; 4]);
    out.extend_from_slice(&count.to_le_bytes());
    out.extend_from_slice(&count.to_le_bytes());
    out.extend_from_slice(&(central.len() as u32).to_le_bytes());
    out.extend_from_slice(&central_offset.to_le_bytes());
    out.extend_from_slice(&0u16.to_le_bytes());
    out
}

#[tokio::test]
async fn imports_entries_with_data_descriptors() {
    let tmp = TempDir::new().unwrap();
    let store = open_store(&tmp).await;
    let archive = with_data_descriptors(&[
        article("日記", "今日は晴れ。今日は晴れ。今日は晴れ。"),
        article("second", "streamed body"),
    ]);
    // Bit 3 of the first local header's flags.
    assert_eq!(archive[6] & 0x08, 0x08);

    let report = import_archive(
        &store,
        Cursor::new(archive),
        &ImportOptions::default(),
        &NoProgress,
    )
    .await
    .unwrap();

    assert!(report.aborted.is_none(), "{:?}", report.aborted);
    assert_eq!(report.imported, 2);
    assert_eq!(store.count().await.unwrap(), 2);
    assert_eq!(
        store.find_content_by_title("second").await.unwrap().as_deref(),
        Some("streamed body")
    );
    let listed = store.get_all(10).await.unwrap();
    assert!(listed
        .iter()
        .all(|r| r.last_modified == Some(1_546_398_246_000)));
}

#[tokio::test]
async fn successful_import_records_archive_time() {
    let tmp = TempDir::new().unwrap();
    let store = open_store(&tmp).await;
    let options = ImportOptions {
        archive_modified: Some(1_600_000_000_000),
        ..ImportOptions::default()
    };
    import_archive(
        &store,
        Cursor::new(build_zip(&[article("a", "b")])),
        &options,
        &NoProgress,
    )
    .await
    .unwrap();

    assert_eq!(
        store.last_imported().await.unwrap(),
        Some(1_600_000_000_000)
    );
}

#[tokio::test]
async fn imported_articles_are_searchable_with_both_strategies() {
    let tmp = TempDir::new().unwrap();
    let store = open_store(&tmp).await;
    let archive = build_zip(&[
        article("rust notes", "ownership and borrowing"),
        article("go notes", "goroutines and channels"),
        article("所有権", "借用チェッカー"),
    ]);
    import_archive(
        &store,
        Cursor::new(archive),
        &ImportOptions::default(),
        &NoProgress,
    )
    .await
    .unwrap();

    for strategy in [SearchStrategy::Ngram, SearchStrategy::Scan] {
        let params = QueryParams {
            strategy,
            ..QueryParams::default()
        };

        let sink = CollectingSink::default();
        run_query(&store, &sink, &Query::Search("borrowing".into()), &params)
            .await
            .unwrap();
        assert_eq!(sink.titles(), vec!["rust notes"], "{strategy}");

        let sink = CollectingSink::default();
        run_query(&store, &sink, &Query::Search("チェッカー".into()), &params)
            .await
            .unwrap();
        assert_eq!(sink.titles(), vec!["所有権"], "{strategy}");
    }

    let sink = CollectingSink::default();
    run_query(
        &store,
        &sink,
        &Query::Filter("notes".into()),
        &QueryParams::default(),
    )
    .await
    .unwrap();
    assert_eq!(sink.titles().len(), 2);
}

//! Database statistics (`artx stats`).

use anyhow::Result;
use serde::Serialize;

use article_index_core::store::Store;

use crate::config::Config;
use crate::db;
use crate::output::format_millis;
use crate::progress::format_number;
use crate::sqlite_store::SqliteStore;

#[derive(Debug, Clone, Serialize)]
pub struct Stats {
    pub documents: i64,
    pub indexed_documents: i64,
    pub total_length: i64,
    pub last_imported: Option<i64>,
    pub db_size_bytes: u64,
}

pub async fn gather_stats(config: &Config) -> Result<Stats> {
    let store = SqliteStore::new(db::connect(config).await?);

    let documents = store.count().await?;
    let (indexed_documents, total_length): (i64, i64) = sqlx::query_as(
        "SELECT COUNT(token_index), COALESCE(SUM(length), 0) FROM documents",
    )
    .fetch_one(store.pool())
    .await?;
    let last_imported = store.last_imported().await?;
    store.close().await;

    let db_size_bytes = std::fs::metadata(&config.db.path)
        .map(|m| m.len())
        .unwrap_or(0);

    Ok(Stats {
        documents,
        indexed_documents,
        total_length,
        last_imported,
        db_size_bytes,
    })
}

pub async fn run_stats(config: &Config, json: bool) -> Result<()> {
    let stats = gather_stats(config).await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&stats)?);
        return Ok(());
    }

    println!("Article Index: Database Stats");
    println!();
    println!("  Database:      {}", config.db.path.display());
    println!(
        "  Size:          {} bytes",
        format_number(stats.db_size_bytes)
    );
    println!();
    println!(
        "  Documents:     {}",
        format_number(stats.documents.max(0) as u64)
    );
    println!(
        "  Token indexed: {}",
        format_number(stats.indexed_documents.max(0) as u64)
    );
    println!(
        "  Characters:    {}",
        format_number(stats.total_length.max(0) as u64)
    );
    println!("  Last import:   {}", format_millis(stats.last_imported));
    Ok(())
}

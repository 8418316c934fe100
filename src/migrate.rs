use anyhow::Result;
use sqlx::SqlitePool;

use crate::config::Config;
use crate::db;

pub async fn run_migrations(config: &Config) -> Result<()> {
    let pool = db::connect(config).await?;
    migrate_pool(&pool).await?;
    pool.close().await;
    Ok(())
}

/// Create all tables and indexes on an open pool. Idempotent.
pub async fn migrate_pool(pool: &SqlitePool) -> Result<()> {
    // Create documents table
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS documents (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            title TEXT NOT NULL UNIQUE,
            content TEXT NOT NULL,
            token_index TEXT,
            length INTEGER NOT NULL,
            last_modified INTEGER,
            content_hash TEXT NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    // Single-row bookkeeping such as the last imported archive time
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS import_state (
            key TEXT PRIMARY KEY,
            value INTEGER NOT NULL,
            updated_at INTEGER NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    // Bookmarks are keyed by title and outlive re-imports
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS bookmarks (
            title TEXT PRIMARY KEY,
            added_at INTEGER NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        "CREATE INDEX IF NOT EXISTS idx_documents_last_modified ON documents(last_modified DESC)",
    )
    .execute(pool)
    .await?;

    Ok(())
}

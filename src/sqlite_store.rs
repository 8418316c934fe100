//! SQLite-backed [`Store`] implementation.
//!
//! Containment queries use `instr()` rather than `LIKE` so keywords are
//! matched case-sensitively and `%`/`_` in user input are literal, which
//! keeps results identical to the in-memory store. Title patterns are
//! translated to `GLOB` for the same reason.

use anyhow::Result;
use async_trait::async_trait;
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqlitePool};

use article_index_core::models::{Document, SearchResult};
use article_index_core::store::Store;

const LAST_IMPORTED_KEY: &str = "last_imported";

/// SQLite implementation of the [`Store`] trait.
///
/// Wraps a [`SqlitePool`]; the schema is created by
/// [`migrate`](crate::migrate).
#[derive(Clone)]
pub struct SqliteStore {
    pool: SqlitePool,
}

impl SqliteStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    pub async fn close(&self) {
        self.pool.close().await;
    }
}

/// Translate a `%`-only title pattern into a case-sensitive GLOB.
fn like_to_glob(pattern: &str) -> String {
    let mut glob = String::with_capacity(pattern.len() + 2);
    for c in pattern.chars() {
        match c {
            '%' => glob.push('*'),
            '*' | '?' | '[' => {
                glob.push('[');
                glob.push(c);
                glob.push(']');
            }
            _ => glob.push(c),
        }
    }
    glob
}

fn to_search_result(row: &SqliteRow) -> SearchResult {
    SearchResult {
        title: row.get("title"),
        last_modified: row.get("last_modified"),
        length: row.get("length"),
    }
}

fn to_document(row: &SqliteRow) -> Document {
    Document {
        id: row.get("id"),
        title: row.get("title"),
        content: row.get("content"),
        token_index: row.get("token_index"),
        length: row.get("length"),
        last_modified: row.get("last_modified"),
        content_hash: row.get("content_hash"),
    }
}

const UPSERT_SQL: &str = r#"
    INSERT INTO documents (title, content, token_index, length, last_modified, content_hash)
    VALUES (?, ?, ?, ?, ?, ?)
    ON CONFLICT(title) DO UPDATE SET
        content = excluded.content,
        token_index = excluded.token_index,
        length = excluded.length,
        last_modified = excluded.last_modified,
        content_hash = excluded.content_hash
    RETURNING id
"#;

#[async_trait]
impl Store for SqliteStore {
    async fn insert(&self, doc: &Document) -> Result<i64> {
        let id: i64 = sqlx::query_scalar(UPSERT_SQL)
            .bind(&doc.title)
            .bind(&doc.content)
            .bind(&doc.token_index)
            .bind(doc.length)
            .bind(doc.last_modified)
            .bind(&doc.content_hash)
            .fetch_one(&self.pool)
            .await?;
        Ok(id)
    }

    async fn insert_all(&self, docs: &[Document]) -> Result<()> {
        let mut tx = self.pool.begin().await?;
        for doc in docs {
            sqlx::query(UPSERT_SQL)
                .bind(&doc.title)
                .bind(&doc.content)
                .bind(&doc.token_index)
                .bind(doc.length)
                .bind(doc.last_modified)
                .bind(&doc.content_hash)
                .fetch_one(&mut *tx)
                .await?;
        }
        tx.commit().await?;
        Ok(())
    }

    async fn delete_all(&self) -> Result<()> {
        sqlx::query("DELETE FROM documents")
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn get_all(&self, limit: i64) -> Result<Vec<SearchResult>> {
        let rows = sqlx::query(
            "SELECT title, last_modified, length FROM documents ORDER BY last_modified DESC, id ASC LIMIT ?",
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.iter().map(to_search_result).collect())
    }

    async fn search_tokens(&self, token_query: &str, limit: i64) -> Result<Vec<SearchResult>> {
        let rows = sqlx::query(
            r#"
            SELECT title, last_modified, length FROM documents
            WHERE token_index IS NOT NULL AND instr(token_index, ?) > 0
            ORDER BY id ASC
            LIMIT ?
            "#,
        )
        .bind(token_query)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.iter().map(to_search_result).collect())
    }

    async fn search_text(&self, keyword: &str, limit: i64) -> Result<Vec<SearchResult>> {
        let rows = sqlx::query(
            r#"
            SELECT title, last_modified, length FROM documents
            WHERE instr(title, ?1) > 0 OR instr(content, ?1) > 0
            ORDER BY id ASC
            LIMIT ?2
            "#,
        )
        .bind(keyword)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.iter().map(to_search_result).collect())
    }

    async fn scan(&self, limit: i64) -> Result<Vec<Document>> {
        let rows = sqlx::query(
            "SELECT id, title, content, token_index, length, last_modified, content_hash FROM documents ORDER BY id ASC LIMIT ?",
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.iter().map(to_document).collect())
    }

    async fn filter(&self, keyword: &str, limit: i64) -> Result<Vec<SearchResult>> {
        let rows = sqlx::query(
            r#"
            SELECT title, last_modified, length FROM documents
            WHERE instr(title, ?1) > 0 OR instr(content, ?1) > 0
            ORDER BY last_modified DESC, id ASC
            LIMIT ?2
            "#,
        )
        .bind(keyword)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.iter().map(to_search_result).collect())
    }

    async fn find_content_by_title(&self, title: &str) -> Result<Option<String>> {
        let content: Option<String> =
            sqlx::query_scalar("SELECT content FROM documents WHERE title = ?")
                .bind(title)
                .fetch_optional(&self.pool)
                .await?;
        Ok(content)
    }

    async fn find_first(&self, title_pattern: &str) -> Result<Option<Document>> {
        let row = sqlx::query(
            "SELECT id, title, content, token_index, length, last_modified, content_hash FROM documents WHERE title GLOB ? ORDER BY id ASC LIMIT 1",
        )
        .bind(like_to_glob(title_pattern))
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.as_ref().map(to_document))
    }

    async fn count(&self) -> Result<i64> {
        let n: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM documents")
            .fetch_one(&self.pool)
            .await?;
        Ok(n)
    }

    async fn content_hash(&self, title: &str) -> Result<Option<String>> {
        let hash: Option<String> =
            sqlx::query_scalar("SELECT content_hash FROM documents WHERE title = ?")
                .bind(title)
                .fetch_optional(&self.pool)
                .await?;
        Ok(hash)
    }

    async fn last_imported(&self) -> Result<Option<i64>> {
        let value: Option<i64> = sqlx::query_scalar("SELECT value FROM import_state WHERE key = ?")
            .bind(LAST_IMPORTED_KEY)
            .fetch_optional(&self.pool)
            .await?;
        Ok(value)
    }

    async fn set_last_imported(&self, millis: i64) -> Result<()> {
        let now = chrono::Utc::now().timestamp();
        sqlx::query(
            r#"
            INSERT INTO import_state (key, value, updated_at) VALUES (?, ?, ?)
            ON CONFLICT(key) DO UPDATE SET value = excluded.value, updated_at = excluded.updated_at
            "#,
        )
        .bind(LAST_IMPORTED_KEY)
        .bind(millis)
        .bind(now)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn add_bookmark(&self, title: &str) -> Result<bool> {
        let now = chrono::Utc::now().timestamp_millis();
        let result = sqlx::query(
            "INSERT INTO bookmarks (title, added_at) VALUES (?, ?) ON CONFLICT(title) DO NOTHING",
        )
        .bind(title)
        .bind(now)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn bookmarks(&self) -> Result<Vec<String>> {
        let titles: Vec<String> =
            sqlx::query_scalar("SELECT title FROM bookmarks ORDER BY added_at ASC, rowid ASC")
                .fetch_all(&self.pool)
                .await?;
        Ok(titles)
    }
}

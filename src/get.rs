//! Article retrieval.
//!
//! Opens a single article either by its exact title (selecting a list
//! entry) or by date (the calendar view), where the title is matched
//! against `<prefix>YYYY-MM-DD%`.

use anyhow::{bail, Result};
use chrono::NaiveDate;
use serde::Serialize;

use article_index_core::calendar::date_title_pattern;
use article_index_core::store::Store;

use crate::config::Config;
use crate::db;
use crate::sqlite_store::SqliteStore;

#[derive(Debug, Clone, Serialize)]
pub struct Article {
    pub title: String,
    pub content: String,
}

pub async fn open_by_title<S: Store + ?Sized>(store: &S, title: &str) -> Result<Option<Article>> {
    let content = store.find_content_by_title(title).await?;
    // A blank body is treated like a missing article.
    Ok(content
        .filter(|c| !c.trim().is_empty())
        .map(|content| Article {
            title: title.to_string(),
            content,
        }))
}

pub async fn open_by_date<S: Store + ?Sized>(
    store: &S,
    prefix: &str,
    year: i32,
    month: u32,
    day: u32,
) -> Result<Option<Article>> {
    if NaiveDate::from_ymd_opt(year, month, day).is_none() {
        bail!("invalid date: {}-{}-{}", year, month, day);
    }
    let pattern = date_title_pattern(prefix, year, month, day);
    let doc = store.find_first(&pattern).await?;
    Ok(doc.map(|d| Article {
        title: d.title,
        content: d.content,
    }))
}

fn print_article(article: &Article) {
    println!("{}", article.title);
    println!();
    println!("{}", article.content);
}

/// `artx get <title>`.
pub async fn run_get(config: &Config, title: &str) -> Result<()> {
    let store = SqliteStore::new(db::connect(config).await?);
    let article = open_by_title(&store, title).await;
    store.close().await;
    match article? {
        Some(article) => print_article(&article),
        None => bail!("article not found: {}", title),
    }
    Ok(())
}

/// `artx date <year> <month> <day>`.
pub async fn run_date(config: &Config, year: i32, month: u32, day: u32) -> Result<()> {
    let store = SqliteStore::new(db::connect(config).await?);
    let article = open_by_date(
        &store,
        &config.search.date_title_prefix,
        year,
        month,
        day,
    )
    .await;
    store.close().await;
    match article? {
        Some(article) => print_article(&article),
        None => bail!("no article for {:04}-{:02}-{:02}", year, month, day),
    }
    Ok(())
}

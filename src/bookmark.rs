//! Bookmarks (`artx bookmark add` and `artx bookmark list`).
//!
//! A bookmark is just a saved title. Opening one goes through
//! [`get::open_by_title`](crate::get::open_by_title), so a bookmark whose
//! article disappeared after a re-import simply reports not found.

use anyhow::{bail, Result};
use serde::Serialize;

use article_index_core::store::Store;

use crate::config::Config;
use crate::db;
use crate::sqlite_store::SqliteStore;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Added {
    New,
    AlreadyPresent,
}

#[derive(Serialize)]
struct BookmarkLine<'a> {
    title: &'a str,
}

/// Bookmark an existing article.
pub async fn add<S: Store + ?Sized>(store: &S, title: &str) -> Result<Added> {
    if store.find_content_by_title(title).await?.is_none() {
        bail!("article not found: {}", title);
    }
    Ok(if store.add_bookmark(title).await? {
        Added::New
    } else {
        Added::AlreadyPresent
    })
}

pub async fn run_bookmark_add(config: &Config, title: &str) -> Result<()> {
    let store = SqliteStore::new(db::connect(config).await?);
    let added = add(&store, title).await;
    store.close().await;
    match added? {
        Added::New => println!("Bookmarked: {}", title),
        Added::AlreadyPresent => println!("Already bookmarked: {}", title),
    }
    Ok(())
}

pub async fn run_bookmark_list(config: &Config, json: bool) -> Result<()> {
    let store = SqliteStore::new(db::connect(config).await?);
    let titles = store.bookmarks().await;
    store.close().await;

    for title in titles? {
        if json {
            println!("{}", serde_json::to_string(&BookmarkLine { title: &title })?);
        } else {
            println!("{}", title);
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use article_index_core::models::Document;
    use article_index_core::store::memory::InMemoryStore;

    #[tokio::test]
    async fn adds_only_existing_articles_once() {
        let store = InMemoryStore::new();
        store.insert(&Document::new("rust", "body")).await.unwrap();

        assert_eq!(add(&store, "rust").await.unwrap(), Added::New);
        assert_eq!(add(&store, "rust").await.unwrap(), Added::AlreadyPresent);
        assert!(add(&store, "missing").await.is_err());
        assert_eq!(store.bookmarks().await.unwrap(), vec!["rust"]);
    }
}

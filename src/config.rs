//! TOML configuration.
//!
//! Every section and key has a default, so an empty file is a valid
//! configuration:
//!
//! ```toml
//! [db]
//! path = "./data/articles.sqlite"
//!
//! [import]
//! ngram_size = 2
//! index_tokens = true
//!
//! [search]
//! strategy = "ngram"
//! limit = 500
//! use_title_filter = true
//! date_title_prefix = "日記"
//! ```

use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

use article_index_core::search::{QueryParams, SearchStrategy, DEFAULT_LIMIT};

#[derive(Debug, Deserialize, Clone, Default)]
pub struct Config {
    #[serde(default)]
    pub db: DbConfig,
    #[serde(default)]
    pub import: ImportConfig,
    #[serde(default)]
    pub search: SearchConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DbConfig {
    #[serde(default = "default_db_path")]
    pub path: PathBuf,
}

impl Default for DbConfig {
    fn default() -> Self {
        Self {
            path: default_db_path(),
        }
    }
}

fn default_db_path() -> PathBuf {
    PathBuf::from("./data/articles.sqlite")
}

#[derive(Debug, Deserialize, Clone)]
pub struct ImportConfig {
    #[serde(default = "default_ngram_size")]
    pub ngram_size: usize,
    #[serde(default = "default_true")]
    pub index_tokens: bool,
}

impl Default for ImportConfig {
    fn default() -> Self {
        Self {
            ngram_size: default_ngram_size(),
            index_tokens: true,
        }
    }
}

fn default_ngram_size() -> usize {
    2
}

fn default_true() -> bool {
    true
}

#[derive(Debug, Deserialize, Clone)]
pub struct SearchConfig {
    #[serde(default)]
    pub strategy: SearchStrategy,
    #[serde(default = "default_limit")]
    pub limit: i64,
    #[serde(default = "default_true")]
    pub use_title_filter: bool,
    #[serde(default = "default_date_title_prefix")]
    pub date_title_prefix: String,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            strategy: SearchStrategy::Ngram,
            limit: DEFAULT_LIMIT,
            use_title_filter: true,
            date_title_prefix: default_date_title_prefix(),
        }
    }
}

fn default_limit() -> i64 {
    DEFAULT_LIMIT
}

fn default_date_title_prefix() -> String {
    "日記".to_string()
}

impl Config {
    /// Query parameters for the coordinator. The n-gram size is shared
    /// with the importer so index and query always agree.
    pub fn query_params(&self) -> QueryParams {
        QueryParams {
            strategy: self.search.strategy,
            ngram_size: self.import.ngram_size,
            limit: self.search.limit,
            use_title_filter: self.search.use_title_filter,
        }
    }
}

pub fn parse_config(content: &str) -> Result<Config> {
    let config: Config = toml::from_str(content).with_context(|| "Failed to parse config file")?;

    if config.import.ngram_size == 0 {
        anyhow::bail!("import.ngram_size must be >= 1");
    }

    if config.search.limit < 1 {
        anyhow::bail!("search.limit must be >= 1");
    }

    Ok(config)
}

pub fn load_config(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;
    parse_config(&content)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_config_uses_defaults() {
        let config = parse_config("").unwrap();
        assert_eq!(config.db.path, PathBuf::from("./data/articles.sqlite"));
        assert_eq!(config.import.ngram_size, 2);
        assert!(config.import.index_tokens);
        assert_eq!(config.search.strategy, SearchStrategy::Ngram);
        assert_eq!(config.search.limit, 500);
        assert!(config.search.use_title_filter);
        assert_eq!(config.search.date_title_prefix, "日記");
    }

    #[test]
    fn overrides_are_read() {
        let config = parse_config(
            r#"
            [db]
            path = "/tmp/a.sqlite"

            [import]
            ngram_size = 3
            index_tokens = false

            [search]
            strategy = "scan"
            limit = 20
            use_title_filter = false
            "#,
        )
        .unwrap();
        assert_eq!(config.import.ngram_size, 3);
        assert!(!config.import.index_tokens);
        let params = config.query_params();
        assert_eq!(params.strategy, SearchStrategy::Scan);
        assert_eq!(params.ngram_size, 3);
        assert_eq!(params.limit, 20);
        assert!(!params.use_title_filter);
    }

    #[test]
    fn rejects_invalid_values() {
        assert!(parse_config("[import]\nngram_size = 0").is_err());
        assert!(parse_config("[search]\nlimit = 0").is_err());
        assert!(parse_config("[search]\nstrategy = \"fuzzy\"").is_err());
    }
}

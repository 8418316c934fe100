//! # Article Index CLI (`artx`)
//!
//! Imports zip archives of text articles and searches them.
//!
//! ## Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `artx init` | Create the SQLite database and schema |
//! | `artx import <zip>` | Import every article in a zip archive |
//! | `artx list` | Newest articles first |
//! | `artx search "<keyword>"` | Keyword search (n-gram or scan) |
//! | `artx filter "<keyword>"` | Title/content containment, newest first |
//! | `artx get "<title>"` | Print one article |
//! | `artx date <y> <m> <d>` | Print the article written on a date |
//! | `artx bookmark add` / `list` | Save titles and list them |
//! | `artx stats` | Document counts and last import time |
//!
//! Logs go to stderr and honour `RUST_LOG` (default `article_index=info`).

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

use article_index::config::{load_config, Config};
use article_index_core::search::{Query, SearchStrategy};
use article_index::progress::ProgressMode;
use article_index::search::{run_query_command, SearchOptions};
use article_index::{bookmark, get, import, migrate, stats};

/// Article Index CLI: import zip archives of text articles into SQLite
/// and search them.
#[derive(Parser)]
#[command(
    name = "artx",
    about = "Article Index: import zipped text articles and search them",
    version
)]
struct Cli {
    /// Path to configuration file (TOML).
    ///
    /// Defaults to `./config/artx.toml`. A missing default file means
    /// built-in defaults; an explicitly given file must exist.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Import progress on stderr: off, human, or json.
    /// Default: human when stderr is a TTY, otherwise off.
    #[arg(long, global = true, value_enum)]
    progress: Option<ProgressMode>,

    #[command(subcommand)]
    command: Commands,
}

const DEFAULT_CONFIG: &str = "./config/artx.toml";

#[derive(Subcommand)]
enum Commands {
    /// Initialize the database schema. Safe to run repeatedly.
    Init,

    /// Import a zip archive.
    ///
    /// Entries without a `.` in their name are treated as directories.
    /// Each entry's file name (without path and extension) is decoded
    /// from hex-encoded EUC-JP into the article title.
    Import {
        /// Path to the zip archive.
        archive: PathBuf,

        /// Delete every stored article before importing.
        #[arg(long)]
        replace: bool,
    },

    /// List articles, newest first.
    List {
        #[arg(long)]
        limit: Option<i64>,

        /// One JSON object per line.
        #[arg(long)]
        json: bool,
    },

    /// Search articles by keyword.
    Search {
        keyword: String,

        /// `ngram` (token index) or `scan` (AND keyword filter).
        #[arg(long)]
        strategy: Option<SearchStrategy>,

        #[arg(long)]
        json: bool,
    },

    /// Filter articles whose title or content contains the keyword.
    Filter {
        keyword: String,

        #[arg(long)]
        limit: Option<i64>,

        #[arg(long)]
        json: bool,
    },

    /// Print an article by its exact title.
    Get { title: String },

    /// Print the first article whose title starts with the configured
    /// prefix and `YYYY-MM-DD`.
    Date { year: i32, month: u32, day: u32 },

    /// Manage bookmarked titles.
    Bookmark {
        #[command(subcommand)]
        action: BookmarkAction,
    },

    /// Show database statistics.
    Stats {
        #[arg(long)]
        json: bool,
    },
}

#[derive(Subcommand)]
enum BookmarkAction {
    /// Bookmark an article by its exact title.
    Add { title: String },

    /// List bookmarked titles in the order they were added.
    List {
        #[arg(long)]
        json: bool,
    },
}

fn init_tracing() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("article_index=info"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

fn resolve_config(path: Option<PathBuf>) -> anyhow::Result<Config> {
    match path {
        Some(path) => load_config(&path),
        None => {
            let default = PathBuf::from(DEFAULT_CONFIG);
            if default.exists() {
                load_config(&default)
            } else {
                Ok(Config::default())
            }
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();

    let cli = Cli::parse();
    let config = resolve_config(cli.config)?;
    let progress = cli.progress.unwrap_or_else(ProgressMode::default_for_tty);

    match cli.command {
        Commands::Init => {
            migrate::run_migrations(&config).await?;
            println!("Database initialized: {}", config.db.path.display());
        }
        Commands::Import { archive, replace } => {
            migrate::run_migrations(&config).await?;
            let reporter = progress.reporter();
            let report = import::run_import(&config, &archive, replace, reporter.as_ref()).await?;
            println!("import {}", archive.display());
            println!("  imported: {}", report.imported);
            println!("  unchanged: {}", report.unchanged);
            println!("  skipped: {}", report.skipped);
            match &report.aborted {
                Some(e) => println!("  aborted: {}", e),
                None => println!("ok"),
            }
        }
        Commands::List { limit, json } => {
            let options = SearchOptions {
                limit,
                json,
                ..SearchOptions::default()
            };
            run_query_command(&config, Query::All, &options).await?;
        }
        Commands::Search {
            keyword,
            strategy,
            json,
        } => {
            let options = SearchOptions {
                strategy,
                json,
                ..SearchOptions::default()
            };
            run_query_command(&config, Query::Search(keyword), &options).await?;
        }
        Commands::Filter {
            keyword,
            limit,
            json,
        } => {
            let options = SearchOptions {
                limit,
                json,
                ..SearchOptions::default()
            };
            run_query_command(&config, Query::Filter(keyword), &options).await?;
        }
        Commands::Get { title } => get::run_get(&config, &title).await?,
        Commands::Date { year, month, day } => get::run_date(&config, year, month, day).await?,
        Commands::Bookmark { action } => {
            migrate::run_migrations(&config).await?;
            match action {
                BookmarkAction::Add { title } => bookmark::run_bookmark_add(&config, &title).await?,
                BookmarkAction::List { json } => bookmark::run_bookmark_list(&config, json).await?,
            }
        }
        Commands::Stats { json } => stats::run_stats(&config, json).await?,
    }

    Ok(())
}

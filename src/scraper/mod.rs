//! Scrape coordinator
//!
//! [`Scraper`] splits an id range into sub-ranges, hands them to a fixed pool
//! of workers and waits for all of them to finish. Each worker fetches its
//! sub-range from a [`PostSource`] and persists the posts into the
//! [`Database`].

mod batch;
mod pool;


pub use batch::BatchStats;

use crate::client::{BooruClient, PostSource};
use crate::config::{Config, ScrapeConfig};
use crate::db::Database;
use crate::error::{Error, Result};
use crate::partition::{IdRange, PAGE_LIMIT, partition};
use batch::{BatchContext, run_batch};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::info;

/// Result of a completed scrape run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunSummary {
    /// Merged counters of every processed batch
    pub stats: BatchStats,
    /// Wall-clock duration of the run
    pub elapsed: Duration,
}

/// Drives a scrape run over a [`PostSource`] and a [`Database`]
pub struct Scraper {
    source: Arc<dyn PostSource>,
    db: Database,
    workers: usize,
    save_dir: Option<PathBuf>,
}

impl Scraper {
    /// Build a scraper talking to the configured API and database
    ///
    /// Opens the database (running migrations) and creates the save
    /// directory if one is configured.
    pub async fn new(config: &Config) -> Result<Self> {
        let client = BooruClient::new(&config.api, config.credentials.clone())?;
        let db = Database::connect(&config.database).await?;

        if let Some(dir) = &config.scrape.save_dir {
            tokio::fs::create_dir_all(dir).await.map_err(|e| Error::Config {
                message: format!("cannot create save directory {}: {}", dir.display(), e),
                key: Some("save_dir".to_string()),
            })?;
        }

        Ok(Self::with_source(Arc::new(client), db, &config.scrape))
    }

    /// Build a scraper over an arbitrary post source
    pub fn with_source(source: Arc<dyn PostSource>, db: Database, scrape: &ScrapeConfig) -> Self {
        Self {
            source,
            db,
            workers: scrape.workers,
            save_dir: scrape.save_dir.clone(),
        }
    }

    /// Database the scraper writes to
    pub fn database(&self) -> &Database {
        &self.db
    }

    /// Directory post files are saved to, if any
    pub fn save_dir(&self) -> Option<&Path> {
        self.save_dir.as_deref()
    }

    /// Close the database pool, waiting for open connections to finish
    pub async fn close(self) {
        self.db.close().await;
    }

    /// Scrape every post with an id in `[start, stop)`
    ///
    /// `start == stop` scrapes the single post `start` without starting the
    /// worker pool. Per-batch fetch failures and per-row write failures are
    /// logged and counted; only fatal errors end the run early.
    pub async fn scrape_range(&self, start: i64, stop: i64) -> Result<RunSummary> {
        if start > stop {
            return Err(Error::InvalidRange { start, stop });
        }
        if self.workers == 0 {
            return Err(Error::Config {
                message: "worker count must be at least 1".to_string(),
                key: Some("workers".to_string()),
            });
        }

        let started = Instant::now();
        let ctx = BatchContext {
            source: Arc::clone(&self.source),
            db: self.db.clone(),
            save_dir: self.save_dir.clone(),
        };

        let stats = if start == stop {
            info!(post_id = start, "Scraping single post");
            run_batch(&ctx, IdRange::single(start)?).await?
        } else {
            let ranges = partition(start, stop, PAGE_LIMIT)?;
            info!(
                start,
                stop,
                batches = ranges.remaining(),
                workers = self.workers,
                "Starting scrape"
            );
            pool::run_pool(ctx, ranges, self.workers).await?
        };

        let summary = RunSummary {
            stats,
            elapsed: started.elapsed(),
        };
        info!(
            batches = stats.batches,
            failed_batches = stats.failed_batches,
            posts_fetched = stats.posts_fetched,
            posts_saved = stats.posts_saved,
            write_failures = stats.write_failures,
            files_saved = stats.files_saved,
            elapsed_ms = summary.elapsed.as_millis() as u64,
            "Scrape finished"
        );
        Ok(summary)
    }
}

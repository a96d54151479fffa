//! # booru-scrape
//!
//! Concurrent scraper that mirrors post metadata from a Danbooru-style image
//! board into a local SQLite database.
//!
//! ## Design Philosophy
//!
//! booru-scrape is designed to be:
//! - **Idempotent** - Re-running over the same range never duplicates rows
//! - **Failure tolerant** - A failed batch or row is logged and skipped, the run goes on
//! - **Polite** - Every request asks for at most one server page of posts
//! - **Library-first** - The `booru-scrape` binary is a thin shell over [`Scraper`]
//!
//! ## Quick Start
//!
//! ```no_run
//! use booru_scrape::{ApiConfig, Config, HomeConfigProvider, ScrapeConfig, Scraper};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let provider = HomeConfigProvider::new()?;
//!     let config = Config::load(&provider, ApiConfig::default(), ScrapeConfig::default())?;
//!
//!     let scraper = Scraper::new(&config).await?;
//!     let summary = scraper.scrape_range(1, 1001).await?;
//!     println!("saved {} posts", summary.stats.posts_saved);
//!
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::unwrap_used)]
#![warn(clippy::expect_used)]

/// Remote API client
pub mod client;
/// Configuration types
pub mod config;
/// Database persistence layer
pub mod db;
/// Error types
pub mod error;
/// Splitting id ranges into page-sized batches
pub mod partition;
/// Worker pool and batch processing
pub mod scraper;
/// Core types
pub mod types;

// Re-export commonly used types
pub use client::{BooruClient, PostSource};
pub use config::{
    ApiConfig, Config, ConfigProvider, Credentials, DatabaseConfig, HomeConfigProvider,
    ScrapeConfig, StaticConfigProvider,
};
pub use db::{Database, PersistOutcome};
pub use error::{DatabaseError, Error, Result};
pub use partition::{Batches, IdRange, PAGE_LIMIT, partition};
pub use scraper::{BatchStats, RunSummary, Scraper};
pub use types::{Post, PostId, TagCategory};

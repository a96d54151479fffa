//! Database layer for booru-scrape
//!
//! Handles SQLite persistence for posts and the relations exploded from them.
//!
//! ## Submodules
//!
//! Methods on [`Database`] are organized by domain:
//! - [`migrations`] - Database lifecycle, schema migrations
//! - [`posts`] - Post upsert and the per-post persistence sequence
//! - [`tags`] - Tag creation and tag/post edges
//! - [`relations`] - Favorite and pool edges
//! - [`queries`] - Read helpers
//!
//! Every write here is idempotent: re-persisting a post refreshes its row and
//! leaves tags and edges untouched. Failures are logged and counted in
//! [`PersistOutcome`]; they never abort the run.

use sqlx::{FromRow, sqlite::SqlitePool};

mod migrations;
mod posts;
mod queries;
mod relations;
mod tags;

/// Post row as stored in the `posts` table
#[derive(Debug, Clone, FromRow)]
pub struct PostRow {
    /// Remote post ID
    pub id: i64,
    /// Creation timestamp as sent by the API
    pub created_at: String,
    /// Last update timestamp as sent by the API
    pub updated_at: String,
    /// Total score
    pub score: i64,
    /// MD5 hash of the file content
    pub md5: Option<String>,
    /// Rating code
    pub rating: String,
    /// File extension without the dot
    pub file_ext: String,
    /// Parent post, if any
    pub parent_id: Option<i64>,
    /// Deleted flag
    pub is_deleted: bool,
    /// Server-side bit flags
    pub bit_flags: i64,
    /// Location of the post's file
    pub file_url: Option<String>,
}

/// What happened while persisting one post
///
/// A post can end up with its row but only part of its relations. That is
/// expected: every write is attempted on its own and failures are counted.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PersistOutcome {
    /// The post row was inserted or refreshed
    pub post_saved: bool,
    /// Number of tag transactions opened (two per non-empty tag category)
    pub tag_transactions: usize,
    /// Number of favorite/pool transactions opened (zero or one)
    pub relation_transactions: usize,
    /// Tag/post edges newly written (existing edges are not counted)
    pub tags_linked: usize,
    /// Favorite edges newly written
    pub favorites_linked: usize,
    /// Pool edges newly written
    pub pools_linked: usize,
    /// Individual writes that failed
    pub failures: usize,
}

/// Database handle for booru-scrape
///
/// Cloning is cheap and shares the underlying connection pool.
#[derive(Clone)]
pub struct Database {
    pool: SqlitePool,
}

// unwrap/expect are acceptable in tests for concise failure-on-error assertions
#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests;

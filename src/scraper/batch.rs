//! Batch worker: fetch one sub-range and persist every post in it.

use crate::client::PostSource;
use crate::db::Database;
use crate::error::Result;
use crate::partition::IdRange;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{debug, warn};

/// Everything a worker needs to process a batch
///
/// Cloning is cheap: the source is behind an `Arc` and the database handle
/// shares its pool.
#[derive(Clone)]
pub(crate) struct BatchContext {
    pub(crate) source: Arc<dyn PostSource>,
    pub(crate) db: Database,
    pub(crate) save_dir: Option<PathBuf>,
}

/// Counters for one or more processed batches
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BatchStats {
    /// Batches processed
    pub batches: usize,
    /// Batches whose fetch failed and were skipped
    pub failed_batches: usize,
    /// Posts returned by the API
    pub posts_fetched: usize,
    /// Posts whose row was written
    pub posts_saved: usize,
    /// Individual database writes that failed
    pub write_failures: usize,
    /// Files saved to disk
    pub files_saved: usize,
    /// Files that could not be saved
    pub file_failures: usize,
}

impl BatchStats {
    /// Add another set of counters to this one
    pub fn merge(&mut self, other: &BatchStats) {
        self.batches += other.batches;
        self.failed_batches += other.failed_batches;
        self.posts_fetched += other.posts_fetched;
        self.posts_saved += other.posts_saved;
        self.write_failures += other.write_failures;
        self.files_saved += other.files_saved;
        self.file_failures += other.file_failures;
    }
}

/// Fetch `range` and persist its posts one after another
///
/// A recoverable fetch error turns the batch into a logged no-op; only fatal
/// errors are returned. Persistence and file failures are counted, never
/// returned. Nothing is retried.
pub(crate) async fn run_batch(ctx: &BatchContext, range: IdRange) -> Result<BatchStats> {
    let mut stats = BatchStats {
        batches: 1,
        ..Default::default()
    };

    let posts = match ctx.source.fetch_range(range).await {
        Ok(posts) => posts,
        Err(e) if e.is_fatal() => return Err(e),
        Err(e) => {
            warn!(
                %range,
                error = %e,
                rate_limited = e.is_rate_limited(),
                "Fetching batch failed, skipping"
            );
            stats.failed_batches = 1;
            return Ok(stats);
        }
    };

    stats.posts_fetched = posts.len();
    debug!(%range, posts = posts.len(), "Batch fetched");

    for post in &posts {
        let outcome = ctx.db.persist_post(post).await;
        if outcome.post_saved {
            stats.posts_saved += 1;
        }
        stats.write_failures += outcome.failures;

        let Some(dir) = ctx.save_dir.as_deref() else {
            continue;
        };
        match ctx.source.download_file(post, dir).await {
            Ok(path) => {
                stats.files_saved += 1;
                debug!(post_id = post.id, path = %path.display(), "File saved");
            }
            Err(e) => {
                warn!(post_id = post.id, error = %e, "Saving post file failed");
                stats.file_failures += 1;
            }
        }
    }

    Ok(stats)
}

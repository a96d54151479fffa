//! Worker pool of N workers draining a shared queue of sub-ranges.
//!
//! The queue is an mpsc channel of capacity 1 whose receiver is shared by all
//! workers behind a mutex. The producer blocks until a worker takes the
//! pending job, and dropping the sender is the shutdown signal: workers drain
//! what is left and exit when `recv` returns `None`.

use crate::error::{Error, Result};
use crate::partition::IdRange;
use std::sync::Arc;
use tokio::sync::{Mutex, mpsc};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error};

use super::batch::{BatchContext, BatchStats, run_batch};

/// Number of jobs that may wait in the queue
const QUEUE_CAPACITY: usize = 1;

type JobQueue = Arc<Mutex<mpsc::Receiver<IdRange>>>;

/// Process `ranges` with exactly `workers` concurrent workers
///
/// Ranges are pulled from the iterator only as workers free up the queue, and
/// are enqueued in the given order. Returns once the queue is drained
/// and every worker has exited. The first fatal error cancels the run and is
/// returned after all workers have stopped.
pub(crate) async fn run_pool<I>(
    ctx: BatchContext,
    ranges: I,
    workers: usize,
) -> Result<BatchStats>
where
    I: IntoIterator<Item = IdRange>,
{
    let (job_tx, job_rx) = mpsc::channel::<IdRange>(QUEUE_CAPACITY);
    let jobs: JobQueue = Arc::new(Mutex::new(job_rx));
    let cancel = CancellationToken::new();

    let handles: Vec<_> = (0..workers)
        .map(|worker_id| {
            let ctx = ctx.clone();
            let jobs = Arc::clone(&jobs);
            let cancel = cancel.clone();
            tokio::spawn(async move { worker_loop(worker_id, ctx, jobs, cancel).await })
        })
        .collect();
    drop(jobs);

    for range in ranges {
        tokio::select! {
            biased;
            _ = cancel.cancelled() => break,
            sent = job_tx.send(range) => {
                if sent.is_err() {
                    // Every worker is gone
                    break;
                }
            }
        }
    }
    drop(job_tx);

    let mut total = BatchStats::default();
    let mut fatal: Option<Error> = None;
    for handle in handles {
        match handle.await {
            Ok(Ok(stats)) => total.merge(&stats),
            Ok(Err(e)) => {
                fatal.get_or_insert(e);
            }
            Err(e) => {
                error!(error = %e, "Worker task panicked");
                fatal.get_or_insert(Error::Other(format!("worker task failed: {}", e)));
            }
        }
    }

    match fatal {
        Some(e) => Err(e),
        None => Ok(total),
    }
}

async fn worker_loop(
    worker_id: usize,
    ctx: BatchContext,
    jobs: JobQueue,
    cancel: CancellationToken,
) -> Result<BatchStats> {
    let mut stats = BatchStats::default();

    loop {
        let next = tokio::select! {
            biased;
            _ = cancel.cancelled() => None,
            next = async { jobs.lock().await.recv().await } => next,
        };
        let Some(range) = next else {
            break;
        };

        debug!(worker_id, %range, "Worker picked up batch");
        match run_batch(&ctx, range).await {
            Ok(batch) => stats.merge(&batch),
            Err(e) => {
                error!(worker_id, %range, error = %e, "Fatal error, cancelling run");
                cancel.cancel();
                return Err(e);
            }
        }
    }

    debug!(worker_id, batches = stats.batches, "Worker finished");
    Ok(stats)
}

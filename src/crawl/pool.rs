// src/crawl/pool.rs
// =============================================================================
// Runs the extractor over many URLs at once and merges the results.
//
// How it works:
// 1. Every URL becomes its own tokio task (spawned, so a panic in one task
//    is caught as a JoinError instead of taking the run down)
// 2. At most `threads` tasks are in flight at the same time
// 3. Each task gets a hard time limit; a task that runs over is aborted and
//    dropped from the results
// 4. Once everything has finished, URLs are merged into one set and page
//    records are kept in submission order
//
// Rust concepts:
// - Streams: stream::iter(...).buffer_unordered(N) runs up to N futures at
//   once and yields each output as soon as it is ready; every output carries
//   its submission index so the order can be restored afterwards
// - JoinHandle: awaiting a spawned task gives Result<T, JoinError>
// =============================================================================

use futures::future;
use futures::stream::{self, StreamExt};
use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::{error, info, warn};

use super::Interrupt;
use crate::error::TaskError;
use crate::extract::{ExtractionResult, Extractor};
use crate::fetch::PageInfo;

pub const DEFAULT_THREADS: usize = 10;
pub const DEFAULT_TASK_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Clone)]
pub struct PoolConfig {
    /// Maximum number of URLs processed at the same time.
    pub threads: usize,
    /// Hard cap on how long a single URL may take.
    pub task_timeout: Duration,
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            threads: DEFAULT_THREADS,
            task_timeout: DEFAULT_TASK_TIMEOUT,
        }
    }
}

impl PoolConfig {
    /// Default config with a custom width (at least one).
    pub fn with_threads(threads: usize) -> Self {
        Self {
            threads: threads.max(1),
            ..Self::default()
        }
    }
}

/// A task either produced a result or failed in a known way.
pub type TaskOutcome = Result<ExtractionResult, TaskError>;

/// The merged output of a batch.
#[derive(Debug, Default)]
pub struct BatchResult {
    /// Every URL found by any completed task, once.
    pub urls: HashSet<String>,
    /// Page records of completed tasks, in submission order.
    pub page_info: Vec<PageInfo>,
}

/// Extract from every URL in `urls` with a bounded number of concurrent
/// tasks. Failed and timed out tasks are logged and left out; they never
/// affect their siblings.
pub async fn extract_many(
    extractor: &Arc<Extractor>,
    urls: Vec<String>,
    include_external_scripts: bool,
    config: &PoolConfig,
    interrupt: &Interrupt,
) -> BatchResult {
    let total = urls.len();
    let task_timeout = config.task_timeout;

    let mut outcomes: Vec<(usize, String, TaskOutcome)> =
        stream::iter(urls.into_iter().enumerate())
            // Checked as each URL is handed out, so ^C stops new submissions only
            .take_while(|_| future::ready(!interrupt.is_triggered()))
            .map(|(index, url)| {
                let extractor = Arc::clone(extractor);
                async move {
                    let target = url.clone();
                    let handle = tokio::spawn(async move {
                        extractor.extract(&target, include_external_scripts).await
                    });
                    let outcome = run_task(handle, task_timeout).await;
                    (index, url, outcome)
                }
            })
            .buffer_unordered(config.threads.max(1))
            .collect()
            .await;
    outcomes.sort_by_key(|(index, _, _)| *index);

    if outcomes.len() < total {
        warn!(
            submitted = outcomes.len(),
            skipped = total - outcomes.len(),
            "interrupted, remaining URLs were not submitted"
        );
    }

    aggregate(outcomes, total)
}

// Waits for a spawned task, aborting it if it runs past `limit`
async fn run_task(mut handle: JoinHandle<ExtractionResult>, limit: Duration) -> TaskOutcome {
    match tokio::time::timeout(limit, &mut handle).await {
        Ok(joined) => joined.map_err(TaskError::from),
        Err(_) => {
            handle.abort();
            Err(TaskError::TimedOut(limit))
        }
    }
}

// `outcomes` must already be in submission order
fn aggregate(outcomes: Vec<(usize, String, TaskOutcome)>, total: usize) -> BatchResult {
    let mut batch = BatchResult::default();

    for (index, url, outcome) in outcomes {
        match outcome {
            Ok(result) => {
                batch.urls.extend(result.urls);
                batch.page_info.push(result.page_info);
                info!(done = index + 1, total, "processed");
            }
            Err(e) => {
                error!(url = %url, error = %e, "error processing URL {}", index + 1);
            }
        }
    }

    batch
}

// -----------------------------------------------------------------------------
// BEGINNER NOTES:
//
// 1. Why tokio::spawn instead of just awaiting extract()?
//    - A spawned task runs on the runtime's worker threads in parallel
//    - If it panics, only that task dies; we get a JoinError back
//    - handle.abort() lets us cancel a task that ran out of time
//
// 2. Why buffer_unordered and not buffered?
//    - buffered only refills a slot once the oldest task is done, so one
//      slow URL at the head holds back every URL behind it
//    - buffer_unordered refills a slot as soon as any task finishes
//    - The index we carry restores submission order for the page records
//
// 3. What does take_while do here?
//    - It ends the stream as soon as the interrupt flag is set
//    - Tasks already handed to buffer_unordered() keep running to completion
// -----------------------------------------------------------------------------

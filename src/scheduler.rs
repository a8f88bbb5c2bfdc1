//! Bounded concurrent execution of workers
//!
//! Each item runs as its own tokio task; `buffer_unordered` only spawns the
//! next task when one of the `concurrency` slots frees up, and yields outcomes
//! in completion order. Dropping the `run` future aborts every task it spawned.

use crate::error::ItemError;
use crate::types::{ItemId, Outcome, ProgressSink};
use crate::worker::{self, Services, WorkerOptions};
use crate::working_area::WorkingArea;
use futures::StreamExt;
use futures::stream;
use std::sync::Arc;
use tokio::task::JoinHandle;
use tracing::{debug, error, info};

/// Run every item through a worker, at most `concurrency` at a time
///
/// Returns one outcome per item in completion order. `progress` is called
/// synchronously after each completion with the running count. An empty
/// batch returns immediately without reporting progress.
pub async fn run(
    items: Vec<ItemId>,
    area: Arc<WorkingArea>,
    services: Services,
    options: WorkerOptions,
    concurrency: usize,
    progress: &dyn ProgressSink,
) -> Vec<Outcome> {
    let total = items.len();
    if total == 0 {
        return Vec::new();
    }
    let concurrency = concurrency.max(1);
    info!(total, concurrency, "starting batch");

    let mut completions = stream::iter(items)
        .map(|item| {
            let handle = AbortOnDrop(tokio::spawn(worker::process(
                item.clone(),
                Arc::clone(&area),
                services.clone(),
                options.clone(),
            )));
            async move { join_outcome(item, handle).await }
        })
        .buffer_unordered(concurrency);

    let mut outcomes = Vec::with_capacity(total);
    while let Some(outcome) = completions.next().await {
        outcomes.push(outcome);
        let completed = outcomes.len();
        debug!(completed, total, "item finished");
        progress.on_progress(completed, total);
    }

    info!(
        total,
        succeeded = outcomes.iter().filter(|o| o.is_success()).count(),
        "batch finished"
    );
    outcomes
}

/// Worker task handle that aborts the task if it is dropped before completion
struct AbortOnDrop(JoinHandle<Outcome>);

impl Drop for AbortOnDrop {
    fn drop(&mut self) {
        self.0.abort();
    }
}

/// Await a worker task, turning a panicked or aborted task into a failure
async fn join_outcome(item: ItemId, mut handle: AbortOnDrop) -> Outcome {
    match (&mut handle.0).await {
        Ok(outcome) => outcome,
        Err(e) => {
            error!(item = %item, error = %e, "worker task failed");
            let reason = if e.is_panic() {
                "worker panicked".to_string()
            } else {
                format!("worker task did not complete: {}", e)
            };
            Outcome::failure(item, ItemError::Infrastructure { reason })
        }
    }
}

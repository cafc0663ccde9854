//! Background index queue
//!
//! Flows like "profile updated" or "message sent" must not wait on the
//! engine, so they enqueue a job here instead of awaiting the pipeline.
//! A single worker drains the queue, retrying engine failures with
//! exponential backoff. Terminal failures are always logged - a dropped
//! job is reconciled by the next bulk reindex, never silently lost.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::warn;

use super::indexer::IndexingPipeline;

/// Bounded queue depth; beyond this, jobs are dropped with a warning
const QUEUE_CAPACITY: usize = 256;

/// Maximum delivery attempts per job
const MAX_ATTEMPTS: u32 = 3;

/// Base delay for exponential backoff (in milliseconds)
const BACKOFF_BASE_MS: u64 = 200;

/// One unit of background index work
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IndexJob {
    SyncMessage(String),
    SyncUser(String),
    SyncConversation(String),
    RemoveMessage(String),
    RemoveUser(String),
    RemoveConversation(String),
}

/// Fire-and-forget entry point to the indexing pipeline
pub struct IndexQueue {
    sender: mpsc::Sender<IndexJob>,
    worker: JoinHandle<()>,
}

impl IndexQueue {
    /// Spawn the worker and return the queue handle
    pub fn start(pipeline: Arc<IndexingPipeline>) -> Self {
        let (sender, receiver) = mpsc::channel(QUEUE_CAPACITY);
        let worker = tokio::spawn(run_worker(pipeline, receiver));
        Self { sender, worker }
    }

    /// Enqueue a job without blocking the caller
    ///
    /// A full or closed queue drops the job with a warning; callers get
    /// fire-and-forget semantics either way.
    pub fn enqueue(&self, job: IndexJob) {
        if let Err(e) = self.sender.try_send(job) {
            warn!(error = %e, "Dropping index job; queue unavailable");
        }
    }

    /// Stop accepting jobs and wait for the worker to drain the queue
    pub async fn close(self) {
        drop(self.sender);
        if let Err(e) = self.worker.await {
            warn!(error = %e, "Index worker terminated abnormally");
        }
    }
}

async fn run_worker(pipeline: Arc<IndexingPipeline>, mut receiver: mpsc::Receiver<IndexJob>) {
    while let Some(job) = receiver.recv().await {
        execute_with_retry(&pipeline, &job).await;
    }
}

async fn execute_with_retry(pipeline: &IndexingPipeline, job: &IndexJob) {
    let mut attempts = 0;

    loop {
        attempts += 1;

        match execute(pipeline, job).await {
            Ok(()) => return,
            Err(e) if e.is_engine_unavailable() && attempts < MAX_ATTEMPTS => {
                let backoff = calculate_backoff(attempts);
                warn!(
                    job = ?job,
                    attempt = attempts,
                    wait_ms = backoff,
                    error = %e,
                    "Index job failed; retrying after backoff"
                );
                tokio::time::sleep(Duration::from_millis(backoff)).await;
            }
            Err(e) => {
                warn!(job = ?job, attempts, error = %e, "Index job failed permanently");
                return;
            }
        }
    }
}

async fn execute(pipeline: &IndexingPipeline, job: &IndexJob) -> crate::Result<()> {
    match job {
        IndexJob::SyncMessage(id) => pipeline.index_message(id).await,
        IndexJob::SyncUser(id) => pipeline.index_user(id).await,
        IndexJob::SyncConversation(id) => pipeline.index_conversation(id).await,
        IndexJob::RemoveMessage(id) => pipeline.remove_message(id).await,
        IndexJob::RemoveUser(id) => pipeline.remove_user(id).await,
        IndexJob::RemoveConversation(id) => pipeline.remove_conversation(id).await,
    }
}

fn calculate_backoff(attempt: u32) -> u64 {
    BACKOFF_BASE_MS << (attempt - 1)
}

//! In-memory job sink for tests and dev mode.

use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use cb_common::{Job, JobAck};
use parking_lot::Mutex;
use tracing::debug;

use crate::{EnqueueError, JobSink, Result};

/// Accepts jobs into process memory, deduplicating by job id the way an
/// id-aware broker would.
///
/// `set_unavailable(true)` simulates a broker outage: every enqueue fails
/// until it is cleared.
#[derive(Default)]
pub struct InMemoryJobSink {
    accepted: Mutex<Vec<Job>>,
    seen_ids: Mutex<HashSet<String>>,
    unavailable: AtomicBool,
}

impl InMemoryJobSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_unavailable(&self, down: bool) {
        self.unavailable.store(down, Ordering::SeqCst);
    }

    /// Snapshot of the jobs accepted so far, in enqueue order.
    pub fn jobs(&self) -> Vec<Job> {
        self.accepted.lock().clone()
    }

    pub fn job_count(&self) -> usize {
        self.accepted.lock().len()
    }
}

#[async_trait]
impl JobSink for InMemoryJobSink {
    fn identifier(&self) -> &str {
        "memory"
    }

    async fn enqueue(&self, job: Job) -> Result<JobAck> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(EnqueueError::Broker(
                "in-memory sink marked unavailable".to_string(),
            ));
        }

        let job_id = job.job_id.clone();
        if self.seen_ids.lock().insert(job_id.clone()) {
            self.accepted.lock().push(job);
        } else {
            debug!(job_id = %job_id, "duplicate job id, deduplicated");
        }

        Ok(JobAck {
            job_id,
            broker_message_id: None,
        })
    }
}

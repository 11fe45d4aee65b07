use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ============================================================================
// Job Wire Types
// ============================================================================

/// A unit of background work submitted to the broker.
///
/// `job_id` is stable per logical unit of work: retrying the HTTP request
/// that produced the job yields the same id, so brokers with id-based
/// deduplication suppress the duplicate.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Job {
    /// Named queue the worker consumes from
    pub queue: String,
    /// Deduplication identity of this unit of work
    pub job_id: String,
    pub payload: serde_json::Value,
    pub enqueued_at: DateTime<Utc>,
}

impl Job {
    pub fn new(
        queue: impl Into<String>,
        job_id: impl Into<String>,
        payload: serde_json::Value,
    ) -> Self {
        Self {
            queue: queue.into(),
            job_id: job_id.into(),
            payload,
            enqueued_at: Utc::now(),
        }
    }
}

/// Broker acknowledgement of an accepted job.
///
/// An ack means "work accepted", never "work completed" - execution happens
/// in a worker process on the far side of the queue.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobAck {
    pub job_id: String,
    /// Broker-assigned message id, when the broker reports one
    pub broker_message_id: Option<String>,
}

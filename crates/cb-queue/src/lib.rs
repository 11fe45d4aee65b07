//! Castbridge Job Queue Client
//!
//! Decouples the HTTP request path from long-running publishing work: a
//! handler enqueues a [`cb_common::Job`] into a durable named queue and
//! returns as soon as the broker accepts it. Delivery is at-least-once; a
//! separate worker process consumes the queue.
//!
//! The [`JobSink`] trait is the seam: the SQS adapter (feature `sqs`) is
//! used in production, [`InMemoryJobSink`] in tests and dev mode.

use async_trait::async_trait;
use cb_common::{Job, JobAck};
use thiserror::Error;

pub mod memory;
#[cfg(feature = "sqs")]
pub mod sqs;

pub use memory::InMemoryJobSink;
#[cfg(feature = "sqs")]
pub use sqs::SqsJobSink;

#[derive(Debug, Error)]
pub enum EnqueueError {
    #[error("Broker unavailable: {0}")]
    Broker(String),

    #[error("Broker rejected job {job_id}: {reason}")]
    Rejected { job_id: String, reason: String },

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, EnqueueError>;

/// Sink for background jobs.
#[async_trait]
pub trait JobSink: Send + Sync {
    /// Identifier for logs and diagnostics.
    fn identifier(&self) -> &str;

    /// Submit a job to its named queue.
    ///
    /// Returns once the broker has accepted the job; from that point the
    /// job is committed and will be delivered at least once. An error means
    /// the job was NOT queued, and the caller must surface the failure
    /// rather than report success.
    async fn enqueue(&self, job: Job) -> Result<JobAck>;
}

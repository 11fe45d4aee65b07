//! SQS-backed job sink.
//!
//! Queue URLs are resolved once per queue name and cached. On FIFO queues
//! the stable job id doubles as the broker deduplication id, so an
//! HTTP-level retry of the same logical request does not enqueue twice.

use async_trait::async_trait;
use aws_sdk_sqs::error::SdkError;
use aws_sdk_sqs::Client;
use cb_common::{Job, JobAck};
use dashmap::DashMap;
use tracing::{debug, warn};

use crate::{EnqueueError, JobSink, Result};

pub struct SqsJobSink {
    client: Client,
    queue_urls: DashMap<String, String>,
}

impl SqsJobSink {
    pub fn new(client: Client) -> Self {
        Self {
            client,
            queue_urls: DashMap::new(),
        }
    }

    /// Build a sink from the ambient AWS environment (region, credentials).
    pub async fn from_env() -> Self {
        let config = aws_config::load_defaults(aws_config::BehaviorVersion::latest()).await;
        Self::new(Client::new(&config))
    }

    async fn queue_url(&self, queue: &str) -> Result<String> {
        if let Some(url) = self.queue_urls.get(queue) {
            return Ok(url.value().clone());
        }

        let resp = self
            .client
            .get_queue_url()
            .queue_name(queue)
            .send()
            .await
            .map_err(|e| EnqueueError::Broker(e.to_string()))?;

        let url = resp
            .queue_url()
            .ok_or_else(|| EnqueueError::Broker(format!("no URL for queue {}", queue)))?
            .to_string();

        self.queue_urls.insert(queue.to_string(), url.clone());
        Ok(url)
    }
}

fn is_fifo(queue_url: &str) -> bool {
    queue_url.ends_with(".fifo")
}

#[async_trait]
impl JobSink for SqsJobSink {
    fn identifier(&self) -> &str {
        "sqs"
    }

    async fn enqueue(&self, job: Job) -> Result<JobAck> {
        let url = self.queue_url(&job.queue).await?;
        let body = serde_json::to_string(&job)?;

        let mut request = self.client.send_message().queue_url(&url).message_body(body);

        if is_fifo(&url) {
            request = request
                .message_deduplication_id(&job.job_id)
                .message_group_id(&job.job_id);
        }

        let output = request.send().await.map_err(|e| {
            warn!(queue = %job.queue, job_id = %job.job_id, error = %e, "SQS enqueue failed");
            match &e {
                SdkError::ServiceError(ctx) => EnqueueError::Rejected {
                    job_id: job.job_id.clone(),
                    reason: ctx.err().to_string(),
                },
                _ => EnqueueError::Broker(e.to_string()),
            }
        })?;

        debug!(queue = %job.queue, job_id = %job.job_id, "job accepted by SQS");
        Ok(JobAck {
            job_id: job.job_id,
            broker_message_id: output.message_id().map(str::to_string),
        })
    }
}

//! Publishing pipeline dispatch.
//!
//! Rendering and uploading project content is slow work owned by an
//! external worker; the request path only shapes the job and hands it to
//! the broker. A 2xx here means "work accepted", never "work completed".

use std::sync::Arc;

use cb_auth::Principal;
use cb_common::{Job, JobAck};
use cb_queue::JobSink;
use tracing::info;

use crate::domain::Project;
use crate::error::PlatformError;

pub struct PublishingService {
    sink: Arc<dyn JobSink>,
    queue: String,
}

impl PublishingService {
    pub fn new(sink: Arc<dyn JobSink>, queue: impl Into<String>) -> Self {
        Self {
            sink,
            queue: queue.into(),
        }
    }

    /// Queue the render/upload work for the project's current revision.
    ///
    /// The job id derives from (project, revision), so retrying the same
    /// logical publish - an HTTP retry, a double-click - deduplicates at
    /// the broker instead of rendering twice.
    pub async fn publish(
        &self,
        project: &Project,
        requested_by: &Principal,
    ) -> Result<JobAck, PlatformError> {
        let payload = serde_json::json!({
            "projectId": project.id,
            "workspaceId": project.workspace_id,
            "revision": project.revision,
            "requestedBy": requested_by.id,
        });
        let job = Job::new(self.queue.clone(), project.publish_job_id(), payload);
        let ack = self.sink.enqueue(job).await?;

        info!(
            project_id = %project.id,
            revision = project.revision,
            job_id = %ack.job_id,
            "publish accepted"
        );
        Ok(ack)
    }
}

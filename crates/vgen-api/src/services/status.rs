//! Status reconciliation.
//!
//! Polls the provider for a job, applies the stuck-at-100 rewrite, and
//! persists the observed state before answering. Every poll leaves the
//! store at least as fresh as the response the caller sees.

use chrono::Utc;
use tracing::{debug, info};

use vgen_models::{
    is_done_status, is_terminal_status, JobPatch, JobStatusView, STATUS_IN_PROGRESS, STATUS_QUEUED,
};
use vgen_provider::{AssetKind, VideoBackend};
use vgen_store::JobStore;

use crate::error::ApiResult;

/// Progress value at which an in-progress status is suspect.
const STUCK_PROGRESS: f64 = 100.0;

/// The status written when the stuck-at-100 rewrite fires.
const STATUS_READY: &str = "ready";

/// Poll the provider for `id`, reconcile the stored record, and return the
/// caller-facing view.
pub async fn poll_status(
    backend: &dyn VideoBackend,
    jobs: &JobStore,
    id: &str,
) -> ApiResult<JobStatusView> {
    let job = backend.get_video(id).await?;

    let mut status = job.status.unwrap_or_else(|| STATUS_QUEUED.to_string());
    let progress = job.progress;

    // Some provider responses sit at in_progress/100% after the asset is
    // already fetchable. A successful content probe settles it.
    if status.eq_ignore_ascii_case(STATUS_IN_PROGRESS)
        && progress.is_some_and(|p| p >= STUCK_PROGRESS)
    {
        match backend.probe_content(id, AssetKind::Video).await {
            Ok(probe) if probe.ok => {
                info!(job_id = %id, "content probe confirmed completion, rewriting status");
                status = STATUS_READY.to_string();
            }
            Ok(probe) => {
                debug!(job_id = %id, status = probe.status, "content not fetchable yet");
            }
            Err(e) => {
                debug!(job_id = %id, error = %e, "content probe failed, keeping reported status");
            }
        }
    }

    let now = Utc::now();
    let completed_at = if is_terminal_status(&status) {
        // First terminal observation wins; later polls keep it.
        let existing = jobs.get(id).await.ok().and_then(|r| r.completed_at);
        Some(existing.unwrap_or(now))
    } else {
        None
    };

    let record = jobs
        .upsert(
            id,
            JobPatch {
                status: Some(status.clone()),
                progress,
                updated_at: Some(now),
                completed_at,
                ..Default::default()
            },
        )
        .await?;

    Ok(JobStatusView {
        id: record.id,
        status,
        progress,
        done: is_done_status(&record.status),
        completed_at: record.completed_at,
    })
}

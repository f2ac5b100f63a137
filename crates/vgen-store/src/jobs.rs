//! Durable job history.

use std::collections::HashMap;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;
use tracing::debug;

use vgen_models::{JobPatch, JobRecord};

use crate::document::{read_doc, write_doc};
use crate::error::{StoreError, StoreResult};

/// On-disk shape: one document, records keyed by provider job id. The map
/// key enforces exactly one record per id.
#[derive(Debug, Default, Serialize, Deserialize)]
struct JobDocument {
    jobs: HashMap<String, JobRecord>,
}

/// Append/update store for job records.
///
/// Explicitly constructed via [`JobStore::open`] and handed to the
/// orchestrator/reconciler; there is no ambient global handle.
pub struct JobStore {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl JobStore {
    /// Open (or create) a job store at `path`.
    ///
    /// An existing document is parsed eagerly so a corrupt file fails fast
    /// at startup instead of on the first write.
    pub async fn open(path: impl Into<PathBuf>) -> StoreResult<Self> {
        let path = path.into();
        let doc: JobDocument = read_doc(&path).await?;
        debug!(path = %path.display(), records = doc.jobs.len(), "opened job store");
        Ok(Self {
            path,
            write_lock: Mutex::new(()),
        })
    }

    /// Merge `patch` into the record for `id`, creating it if absent.
    ///
    /// Patch fields win; unspecified fields keep their stored value. Returns
    /// the record as persisted.
    pub async fn upsert(&self, id: &str, patch: JobPatch) -> StoreResult<JobRecord> {
        let _guard = self.write_lock.lock().await;
        let mut doc: JobDocument = read_doc(&self.path).await?;

        let record = match doc.jobs.remove(id) {
            Some(mut existing) => {
                existing.apply(patch);
                existing
            }
            None => JobRecord::from_patch(id, patch),
        };
        doc.jobs.insert(id.to_string(), record.clone());

        write_doc(&self.path, &doc).await?;
        Ok(record)
    }

    /// Fetch one record.
    pub async fn get(&self, id: &str) -> StoreResult<JobRecord> {
        let doc: JobDocument = read_doc(&self.path).await?;
        doc.jobs
            .get(id)
            .cloned()
            .ok_or_else(|| StoreError::not_found(format!("job {id}")))
    }

    /// Records sorted newest-first by creation time, truncated to `limit`.
    pub async fn list(&self, limit: usize) -> StoreResult<Vec<JobRecord>> {
        let doc: JobDocument = read_doc(&self.path).await?;
        let mut records: Vec<JobRecord> = doc.jobs.into_values().collect();
        records.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        records.truncate(limit);
        Ok(records)
    }
}

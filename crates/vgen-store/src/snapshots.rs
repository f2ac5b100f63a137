//! Saved render presets.

use std::collections::HashMap;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;

use vgen_models::Snapshot;

use crate::document::{read_doc, write_doc};
use crate::error::{StoreError, StoreResult};

#[derive(Debug, Default, Serialize, Deserialize)]
struct SnapshotDocument {
    snapshots: HashMap<String, Snapshot>,
}

/// Store for snapshot presets. Pure value objects: create/read/delete only.
pub struct SnapshotStore {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl SnapshotStore {
    pub async fn open(path: impl Into<PathBuf>) -> StoreResult<Self> {
        let path = path.into();
        let _: SnapshotDocument = read_doc(&path).await?;
        Ok(Self {
            path,
            write_lock: Mutex::new(()),
        })
    }

    pub async fn insert(&self, snapshot: Snapshot) -> StoreResult<()> {
        let _guard = self.write_lock.lock().await;
        let mut doc: SnapshotDocument = read_doc(&self.path).await?;
        doc.snapshots.insert(snapshot.id.clone(), snapshot);
        write_doc(&self.path, &doc).await
    }

    pub async fn get(&self, id: &str) -> StoreResult<Snapshot> {
        let doc: SnapshotDocument = read_doc(&self.path).await?;
        doc.snapshots
            .get(id)
            .cloned()
            .ok_or_else(|| StoreError::not_found(format!("snapshot {id}")))
    }

    /// Snapshots sorted newest-first.
    pub async fn list(&self) -> StoreResult<Vec<Snapshot>> {
        let doc: SnapshotDocument = read_doc(&self.path).await?;
        let mut snapshots: Vec<Snapshot> = doc.snapshots.into_values().collect();
        snapshots.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(snapshots)
    }

    pub async fn delete(&self, id: &str) -> StoreResult<()> {
        let _guard = self.write_lock.lock().await;
        let mut doc: SnapshotDocument = read_doc(&self.path).await?;
        if doc.snapshots.remove(id).is_none() {
            return Err(StoreError::not_found(format!("snapshot {id}")));
        }
        write_doc(&self.path, &doc).await
    }
}

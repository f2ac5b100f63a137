//! Job records and provider status vocabulary.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Statuses meaning the asset is ready to fetch.
///
/// Provider versions disagree on the exact word, so all three are folded
/// into one "done" concept. Compared case-insensitively.
pub const DONE_STATUSES: &[&str] = &["ready", "completed", "succeeded"];

/// Statuses meaning the job ended without a usable asset.
pub const FAILED_STATUSES: &[&str] = &["failed", "canceled", "cancelled"];

/// The provider's in-progress token.
pub const STATUS_IN_PROGRESS: &str = "in_progress";

/// Default status recorded when the provider response omits one.
pub const STATUS_QUEUED: &str = "queued";

/// True if `status` indicates the asset is fetchable.
pub fn is_done_status(status: &str) -> bool {
    let s = status.trim().to_ascii_lowercase();
    DONE_STATUSES.contains(&s.as_str())
}

/// True if `status` is terminal (success or failure family).
pub fn is_terminal_status(status: &str) -> bool {
    let s = status.trim().to_ascii_lowercase();
    DONE_STATUSES.contains(&s.as_str()) || FAILED_STATUSES.contains(&s.as_str())
}

/// One generation request and its lifecycle, as persisted in the job store.
///
/// `id` is the opaque identifier assigned by the provider and is the store
/// key; exactly one record exists per id. Timestamps are set locally by the
/// orchestrator/reconciler, never taken from the provider.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobRecord {
    /// Provider-assigned job id
    pub id: String,

    /// Prompt text, immutable once created
    pub prompt: String,

    /// Normalized duration token ("4", "8", "12")
    pub seconds: String,

    /// Normalized "WIDTHxHEIGHT" string
    pub size: String,

    /// Model actually used (may differ from the requested one after fallback)
    pub model: String,

    /// Provider-reported status, free-form
    pub status: String,

    /// Provider-reported progress (0-100)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub progress: Option<f64>,

    /// Character profile whose lock image was attached, if any
    #[serde(skip_serializing_if = "Option::is_none")]
    pub character: Option<String>,

    /// Whether a persisted lock image was attached
    #[serde(default)]
    pub used_lock: bool,

    /// Human-readable annotation (fallback explanations)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,

    /// Creation timestamp
    pub created_at: DateTime<Utc>,

    /// Last reconciliation timestamp
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,

    /// Set once the status enters the terminal set
    #[serde(skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<DateTime<Utc>>,
}

/// Shallow-overlay patch for a [`JobRecord`].
///
/// Fields set here win; unset fields keep the stored value. The store
/// creates a record from the patch when the id is absent.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobPatch {
    pub prompt: Option<String>,
    pub seconds: Option<String>,
    pub size: Option<String>,
    pub model: Option<String>,
    pub status: Option<String>,
    pub progress: Option<f64>,
    pub character: Option<String>,
    pub used_lock: Option<bool>,
    pub note: Option<String>,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
    pub completed_at: Option<DateTime<Utc>>,
}

impl JobRecord {
    /// Materialize a record from a patch for a previously unseen id.
    pub fn from_patch(id: impl Into<String>, patch: JobPatch) -> Self {
        let created_at = patch.created_at.unwrap_or_else(Utc::now);
        Self {
            id: id.into(),
            prompt: patch.prompt.unwrap_or_default(),
            seconds: patch.seconds.unwrap_or_default(),
            size: patch.size.unwrap_or_default(),
            model: patch.model.unwrap_or_default(),
            status: patch.status.unwrap_or_else(|| STATUS_QUEUED.to_string()),
            progress: patch.progress,
            character: patch.character,
            used_lock: patch.used_lock.unwrap_or(false),
            note: patch.note,
            created_at,
            updated_at: patch.updated_at,
            completed_at: patch.completed_at,
        }
    }

    /// Merge `patch` into this record, shallow-overlay semantics.
    pub fn apply(&mut self, patch: JobPatch) {
        if let Some(v) = patch.prompt {
            self.prompt = v;
        }
        if let Some(v) = patch.seconds {
            self.seconds = v;
        }
        if let Some(v) = patch.size {
            self.size = v;
        }
        if let Some(v) = patch.model {
            self.model = v;
        }
        if let Some(v) = patch.status {
            self.status = v;
        }
        if let Some(v) = patch.progress {
            self.progress = Some(v);
        }
        if let Some(v) = patch.character {
            self.character = Some(v);
        }
        if let Some(v) = patch.used_lock {
            self.used_lock = v;
        }
        if let Some(v) = patch.note {
            self.note = Some(v);
        }
        if let Some(v) = patch.created_at {
            self.created_at = v;
        }
        if let Some(v) = patch.updated_at {
            self.updated_at = Some(v);
        }
        if let Some(v) = patch.completed_at {
            self.completed_at = Some(v);
        }
    }

    /// True if the recorded status is terminal.
    pub fn is_terminal(&self) -> bool {
        is_terminal_status(&self.status)
    }
}

/// Reconciled view of a job returned by the status endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobStatusView {
    pub id: String,
    /// Status after the stuck-at-100 rewrite, if it applied
    pub status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub progress: Option<f64>,
    /// True once `status` is in the done set
    pub done: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<DateTime<Utc>>,
}

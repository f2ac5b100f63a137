//! Shared data models for the Vidgen backend.
//!
//! This crate provides Serde-serializable types for:
//! - Job records and status vocabulary
//! - Render parameter normalization (duration, size, model, fit mode)
//! - Character profiles and their lock-image naming rules
//! - Saved render snapshots

pub mod character;
pub mod job;
pub mod params;
pub mod snapshot;

// Re-export common types
pub use character::{lock_image_filename, sanitize_name, Character};
pub use job::{
    is_done_status, is_terminal_status, JobPatch, JobRecord, JobStatusView, DONE_STATUSES,
    FAILED_STATUSES, STATUS_IN_PROGRESS, STATUS_QUEUED,
};
pub use params::{
    normalize_model, normalize_seconds, normalize_size, Dimensions, FitMode, DEFAULT_SECONDS,
    DEFAULT_SIZE,
};
pub use snapshot::Snapshot;

//! File-backed persistence.
//!
//! Each store owns one JSON document and follows the same discipline: read
//! the whole document, mutate in memory, write the whole document back via a
//! temp file and atomic rename, with writers serialized by an in-process
//! lock. That keeps the upsert/list/get contract safe for arbitrary
//! interleaving inside one process; cross-process writers are out of scope.

mod characters;
mod document;
mod error;
mod jobs;
mod snapshots;

pub use characters::CharacterStore;
pub use error::{StoreError, StoreResult};
pub use jobs::JobStore;
pub use snapshots::SnapshotStore;

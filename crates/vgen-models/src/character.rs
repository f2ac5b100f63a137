//! Character profiles and lock-image naming.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A named profile with an optional persisted reference image ("lock") and an
/// optional free-text style bible appended to prompts when the lock is used.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Character {
    pub name: String,

    /// Identity/style description appended to prompts
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bible: Option<String>,

    /// Whether a lock image file exists for this character
    #[serde(default)]
    pub has_lock_image: bool,

    pub created_at: DateTime<Utc>,
}

impl Character {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            bible: None,
            has_lock_image: false,
            created_at: Utc::now(),
        }
    }
}

/// Reduce a user-supplied character name to a filesystem-safe token.
///
/// Lowercased; ASCII alphanumerics, `-` and `_` pass through, everything else
/// becomes `_`. Truncated to 64 chars. An input with nothing usable maps to
/// "character" so a path is always derivable.
pub fn sanitize_name(name: &str) -> String {
    let mut out: String = name
        .trim()
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '-' || c == '_' {
                c.to_ascii_lowercase()
            } else {
                '_'
            }
        })
        .take(64)
        .collect();
    if out.chars().all(|c| c == '_') {
        out = "character".to_string();
    }
    out
}

/// Lock image filename for a character, derived from the sanitized name.
///
/// At most one lock image exists per name; re-uploading replaces it.
pub fn lock_image_filename(name: &str) -> String {
    format!("{}.jpg", sanitize_name(name))
}

//! Saved render presets.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A named preset of prompt plus generation parameters. Pure value object;
/// create/read/delete only.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Snapshot {
    pub id: String,
    pub name: String,
    pub prompt: String,
    pub seconds: String,
    pub size: String,
    pub model: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub character: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Snapshot {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        name: impl Into<String>,
        prompt: impl Into<String>,
        seconds: impl Into<String>,
        size: impl Into<String>,
        model: impl Into<String>,
        character: Option<String>,
    ) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            name: name.into(),
            prompt: prompt.into(),
            seconds: seconds.into(),
            size: size.into(),
            model: model.into(),
            character,
            created_at: Utc::now(),
        }
    }
}

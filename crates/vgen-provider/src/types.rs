//! Provider request/response types.

use async_trait::async_trait;
use bytes::Bytes;
use futures_util::{Stream, StreamExt};
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::{ProviderError, ProviderResult};

/// Which binary asset of a finished job to fetch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AssetKind {
    #[default]
    Video,
    Thumbnail,
    Audio,
}

impl AssetKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            AssetKind::Video => "video",
            AssetKind::Thumbnail => "thumbnail",
            AssetKind::Audio => "audio",
        }
    }

    /// Default MIME type when the provider omits a content-type header.
    pub fn default_mime(&self) -> &'static str {
        match self {
            AssetKind::Video => "video/mp4",
            AssetKind::Thumbnail => "image/jpeg",
            AssetKind::Audio => "audio/mpeg",
        }
    }
}

impl FromStr for AssetKind {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "video" => Ok(AssetKind::Video),
            "thumbnail" => Ok(AssetKind::Thumbnail),
            "audio" => Ok(AssetKind::Audio),
            _ => Err(()),
        }
    }
}

impl fmt::Display for AssetKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An image file attached to a create request.
#[derive(Debug, Clone)]
pub struct ReferenceAttachment {
    pub bytes: Vec<u8>,
    pub filename: String,
    pub content_type: String,
}

/// Parameters for one create-job submission.
#[derive(Debug, Clone)]
pub struct NewVideo {
    pub prompt: String,
    pub model: String,
    pub seconds: String,
    pub size: String,
    pub reference: Option<ReferenceAttachment>,
}

/// Provider's view of a job.
///
/// Everything except `id` is optional; provider versions vary in which
/// fields they send and whether `progress` is a number or a string.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VideoJob {
    pub id: String,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default, deserialize_with = "lenient_progress")]
    pub progress: Option<f64>,
    #[serde(default)]
    pub model: Option<String>,
    #[serde(default)]
    pub seconds: Option<String>,
    #[serde(default)]
    pub size: Option<String>,
}

fn lenient_progress<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(value.and_then(|v| match v {
        serde_json::Value::Number(n) => n.as_f64(),
        serde_json::Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }))
}

/// Result of a HEAD-style existence check on a content endpoint.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct ContentProbe {
    pub ok: bool,
    pub status: u16,
}

/// A live provider content response, relayed without buffering.
#[derive(Debug)]
pub struct ContentStream {
    content_type: Option<String>,
    response: reqwest::Response,
}

impl ContentStream {
    pub(crate) fn new(content_type: Option<String>, response: reqwest::Response) -> Self {
        Self {
            content_type,
            response,
        }
    }

    pub fn content_type(&self) -> Option<&str> {
        self.content_type.as_deref()
    }

    /// Body as a byte stream; chunks arrive as the provider sends them.
    pub fn bytes_stream(self) -> impl Stream<Item = Result<Bytes, ProviderError>> {
        self.response
            .bytes_stream()
            .map(|chunk| chunk.map_err(ProviderError::from))
    }
}

/// Seam between orchestration logic and the wire client.
#[async_trait]
pub trait VideoBackend: Send + Sync {
    /// Submit a generation request.
    async fn create_video(&self, req: NewVideo) -> ProviderResult<VideoJob>;

    /// Fetch current job state.
    async fn get_video(&self, id: &str) -> ProviderResult<VideoJob>;

    /// Cheap "is this asset fetchable yet" check.
    async fn probe_content(&self, id: &str, kind: AssetKind) -> ProviderResult<ContentProbe>;
}

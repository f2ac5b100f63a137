//! Wire client for the video API.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, CONTENT_TYPE};
use reqwest::multipart::{Form, Part};
use reqwest::{Client, Method, RequestBuilder};
use tracing::{debug, info};

use crate::error::{ProviderError, ProviderResult};
use crate::types::{
    AssetKind, ContentProbe, ContentStream, NewVideo, VideoBackend, VideoJob,
};

/// Timeout for JSON metadata calls.
const METADATA_TIMEOUT: Duration = Duration::from_secs(30);

/// Connect timeout for content-streaming calls; no overall deadline, large
/// assets take as long as they take.
const STREAM_CONNECT_TIMEOUT: Duration = Duration::from_secs(15);

/// Provider connection configuration.
#[derive(Debug, Clone)]
pub struct ProviderConfig {
    /// Base URL, e.g. `https://api.openai.com`
    pub base_url: String,
    pub api_key: String,
    pub organization: Option<String>,
    pub project: Option<String>,
}

impl ProviderConfig {
    /// Create config from environment variables.
    pub fn from_env() -> ProviderResult<Self> {
        let api_key = std::env::var("VIDEO_API_KEY")
            .map_err(|_| ProviderError::config("VIDEO_API_KEY not set"))?;
        Ok(Self {
            base_url: std::env::var("VIDEO_API_BASE_URL")
                .unwrap_or_else(|_| "https://api.openai.com".to_string()),
            api_key,
            organization: std::env::var("VIDEO_API_ORG").ok(),
            project: std::env::var("VIDEO_API_PROJECT").ok(),
        })
    }
}

/// HTTP client for the remote video API.
pub struct ProviderClient {
    config: ProviderConfig,
    /// Short-deadline client for JSON calls
    client: Client,
    /// Deadline-free client for body streaming
    stream_client: Client,
}

impl ProviderClient {
    pub fn new(config: ProviderConfig) -> ProviderResult<Self> {
        let default_headers = auth_headers(&config)?;

        let client = Client::builder()
            .timeout(METADATA_TIMEOUT)
            .default_headers(default_headers.clone())
            .build()
            .map_err(|e| ProviderError::config(e.to_string()))?;

        let stream_client = Client::builder()
            .connect_timeout(STREAM_CONNECT_TIMEOUT)
            .default_headers(default_headers)
            .build()
            .map_err(|e| ProviderError::config(e.to_string()))?;

        Ok(Self {
            config,
            client,
            stream_client,
        })
    }

    pub fn from_env() -> ProviderResult<Self> {
        Self::new(ProviderConfig::from_env()?)
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.config.base_url.trim_end_matches('/'), path)
    }

    fn content_url(&self, id: &str, kind: AssetKind) -> String {
        self.url(&format!("/v1/videos/{}/content?type={}", id, kind))
    }

    fn request(&self, method: Method, url: &str) -> RequestBuilder {
        self.client.request(method, url)
    }

    /// Turn a non-success response into a classified error, preserving the
    /// provider's status and raw body text.
    async fn fail(response: reqwest::Response) -> ProviderError {
        let status = response.status().as_u16();
        let body = response.text().await.unwrap_or_default();
        ProviderError::request(status, body)
    }

    /// List recent provider-side jobs, passed through untouched.
    pub async fn list_videos(&self, limit: u32) -> ProviderResult<serde_json::Value> {
        let url = self.url(&format!("/v1/videos?limit={limit}"));
        let response = self.request(Method::GET, &url).send().await?;
        if !response.status().is_success() {
            return Err(Self::fail(response).await);
        }
        Ok(response.json().await?)
    }

    /// Open a streaming GET against the content endpoint.
    pub async fn stream_content(
        &self,
        id: &str,
        kind: AssetKind,
    ) -> ProviderResult<ContentStream> {
        let url = self.content_url(id, kind);
        debug!(job_id = %id, asset = %kind, "streaming provider content");

        let response = self.stream_client.get(&url).send().await?;
        if !response.status().is_success() {
            return Err(Self::fail(response).await);
        }

        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(|s| s.to_string());
        Ok(ContentStream::new(content_type, response))
    }
}

#[async_trait]
impl VideoBackend for ProviderClient {
    async fn create_video(&self, req: NewVideo) -> ProviderResult<VideoJob> {
        info!(
            model = %req.model,
            seconds = %req.seconds,
            size = %req.size,
            has_reference = req.reference.is_some(),
            "submitting generation request"
        );

        let mut form = Form::new()
            .text("prompt", req.prompt)
            .text("model", req.model)
            .text("seconds", req.seconds)
            .text("size", req.size);

        if let Some(reference) = req.reference {
            let part = Part::bytes(reference.bytes)
                .file_name(reference.filename)
                .mime_str(&reference.content_type)
                .map_err(|e| ProviderError::config(e.to_string()))?;
            form = form.part("input_reference", part);
        }

        let response = self
            .request(Method::POST, &self.url("/v1/videos"))
            .multipart(form)
            .send()
            .await?;
        if !response.status().is_success() {
            return Err(Self::fail(response).await);
        }
        Ok(response.json().await?)
    }

    async fn get_video(&self, id: &str) -> ProviderResult<VideoJob> {
        let url = self.url(&format!("/v1/videos/{id}"));
        let response = self.request(Method::GET, &url).send().await?;
        if !response.status().is_success() {
            return Err(Self::fail(response).await);
        }
        Ok(response.json().await?)
    }

    async fn probe_content(&self, id: &str, kind: AssetKind) -> ProviderResult<ContentProbe> {
        let url = self.content_url(id, kind);
        let response = self.request(Method::HEAD, &url).send().await?;
        let status = response.status().as_u16();
        Ok(ContentProbe {
            ok: response.status().is_success(),
            status,
        })
    }
}

fn auth_headers(config: &ProviderConfig) -> ProviderResult<HeaderMap> {
    let mut headers = HeaderMap::new();
    let bearer = format!("Bearer {}", config.api_key);
    headers.insert(
        reqwest::header::AUTHORIZATION,
        HeaderValue::from_str(&bearer).map_err(|_| ProviderError::config("invalid API key"))?,
    );
    if let Some(org) = &config.organization {
        headers.insert(
            "OpenAI-Organization",
            HeaderValue::from_str(org)
                .map_err(|_| ProviderError::config("invalid organization id"))?,
        );
    }
    if let Some(project) = &config.project {
        headers.insert(
            "OpenAI-Project",
            HeaderValue::from_str(project)
                .map_err(|_| ProviderError::config("invalid project id"))?,
        );
    }
    Ok(headers)
}

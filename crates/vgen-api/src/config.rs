//! API configuration.

use std::path::PathBuf;

/// API server configuration.
#[derive(Debug, Clone)]
pub struct ApiConfig {
    /// Server host
    pub host: String,
    /// Server port
    pub port: u16,
    /// CORS origins
    pub cors_origins: Vec<String>,
    /// Rate limit requests per second
    pub rate_limit_rps: u32,
    /// Max request body size (reference uploads)
    pub max_body_size: usize,
    /// Model used when the requested one is not recognized
    pub default_model: String,
    /// Model tried when the primary submission is access-denied
    pub fallback_model: Option<String>,
    /// Models accepted from callers
    pub allowed_models: Vec<String>,
    /// Whether a moderation failure retries without the reference image
    pub moderation_fallback: bool,
    /// Shared secret required on /api routes; None disables the gate
    pub shared_secret: Option<String>,
    /// Directory holding the job/character/snapshot documents and lock images
    pub data_dir: PathBuf,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8000,
            cors_origins: vec!["*".to_string()],
            rate_limit_rps: 10,
            max_body_size: 32 * 1024 * 1024, // 32MB, references can be large
            default_model: "sora-2".to_string(),
            fallback_model: Some("sora-2-pro".to_string()),
            allowed_models: vec!["sora-2".to_string(), "sora-2-pro".to_string()],
            moderation_fallback: true,
            shared_secret: None,
            data_dir: PathBuf::from("data"),
        }
    }
}

impl ApiConfig {
    /// Create config from environment variables.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            host: std::env::var("API_HOST").unwrap_or(defaults.host),
            port: std::env::var("API_PORT")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.port),
            cors_origins: std::env::var("CORS_ORIGINS")
                .map(|s| s.split(',').map(|s| s.trim().to_string()).collect())
                .unwrap_or(defaults.cors_origins),
            rate_limit_rps: std::env::var("RATE_LIMIT_RPS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.rate_limit_rps),
            max_body_size: std::env::var("MAX_BODY_SIZE")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.max_body_size),
            default_model: std::env::var("VIDEO_DEFAULT_MODEL").unwrap_or(defaults.default_model),
            fallback_model: std::env::var("VIDEO_FALLBACK_MODEL")
                .ok()
                .filter(|s| !s.trim().is_empty())
                .or(defaults.fallback_model),
            allowed_models: std::env::var("VIDEO_ALLOWED_MODELS")
                .map(|s| s.split(',').map(|s| s.trim().to_string()).collect())
                .unwrap_or(defaults.allowed_models),
            moderation_fallback: std::env::var("MODERATION_FALLBACK")
                .map(|v| v != "false" && v != "0")
                .unwrap_or(defaults.moderation_fallback),
            shared_secret: std::env::var("GATE_SECRET")
                .ok()
                .filter(|s| !s.is_empty()),
            data_dir: std::env::var("DATA_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.data_dir),
        }
    }

    pub fn jobs_path(&self) -> PathBuf {
        self.data_dir.join("jobs.json")
    }

    pub fn characters_path(&self) -> PathBuf {
        self.data_dir.join("characters.json")
    }

    pub fn lock_images_dir(&self) -> PathBuf {
        self.data_dir.join("locks")
    }

    pub fn snapshots_path(&self) -> PathBuf {
        self.data_dir.join("snapshots.json")
    }
}

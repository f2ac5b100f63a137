//! Provider error types and classification.

use thiserror::Error;

/// Result type for provider operations.
pub type ProviderResult<T> = Result<T, ProviderError>;

/// What a provider failure means for fallback policy.
///
/// Produced once, here, from the HTTP status and body text. The substring
/// heuristics below mirror the provider's observed error prose and are a
/// known fragility; keeping them behind this tag confines the blast radius
/// to one function.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProviderErrorKind {
    /// Content-policy rejection; dropping the reference image may help
    Moderation,
    /// Auth/entitlement-shaped rejection; a fallback model may help
    AccessDenied,
    /// The job or asset does not exist
    NotFound,
    /// Anything else
    Other,
}

/// Errors from the remote video API.
#[derive(Debug, Error)]
pub enum ProviderError {
    /// Non-success HTTP response, with the provider's raw message preserved.
    #[error("Provider returned {status}: {message}")]
    Request {
        status: u16,
        message: String,
        kind: ProviderErrorKind,
    },

    /// Network failure or timeout before a response arrived.
    #[error("Provider request failed: {0}")]
    Transport(String),

    /// Unusable response body.
    #[error("Failed to parse provider response: {0}")]
    Decode(String),

    /// Missing or malformed client configuration.
    #[error("Provider client misconfigured: {0}")]
    Config(String),
}

impl ProviderError {
    pub fn request(status: u16, message: impl Into<String>) -> Self {
        let message = message.into();
        let kind = classify(status, &message);
        Self::Request {
            status,
            message,
            kind,
        }
    }

    pub fn transport(msg: impl Into<String>) -> Self {
        Self::Transport(msg.into())
    }

    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Classification tag; non-HTTP failures are `Other`.
    pub fn kind(&self) -> ProviderErrorKind {
        match self {
            Self::Request { kind, .. } => *kind,
            _ => ProviderErrorKind::Other,
        }
    }

    /// HTTP status of the provider response, when there was one.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Request { status, .. } => Some(*status),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for ProviderError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            Self::Transport(format!("timed out: {e}"))
        } else if e.is_decode() {
            Self::Decode(e.to_string())
        } else {
            Self::Transport(e.to_string())
        }
    }
}

/// Classify a provider failure from status code and body text.
pub fn classify(status: u16, body: &str) -> ProviderErrorKind {
    let text = body.to_ascii_lowercase();
    if text.contains("moderation") {
        return ProviderErrorKind::Moderation;
    }
    if status == 401 || status == 403 || text.starts_with("403") {
        return ProviderErrorKind::AccessDenied;
    }
    if ["forbidden", "not authorized", "access", "permission"]
        .iter()
        .any(|needle| text.contains(needle))
    {
        return ProviderErrorKind::AccessDenied;
    }
    if status == 404 {
        return ProviderErrorKind::NotFound;
    }
    ProviderErrorKind::Other
}

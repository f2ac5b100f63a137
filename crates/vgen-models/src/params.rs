//! Render parameter normalization.
//!
//! Caller input is never rejected for being out of range; it is folded onto
//! the nearest supported value so a submission always has a well-formed
//! parameter set. Only an empty prompt is a hard error, and that check lives
//! with the orchestrator.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Durations the provider accepts, in seconds.
pub const ALLOWED_SECONDS: &[&str] = &["4", "8", "12"];

/// Fallback duration for unparsable or unsupported input.
pub const DEFAULT_SECONDS: &str = "4";

/// Fallback geometry for unparsable size strings.
pub const DEFAULT_SIZE: Dimensions = Dimensions {
    width: 1280,
    height: 720,
};

/// Exact pixel geometry of the requested video.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dimensions {
    pub width: u32,
    pub height: u32,
}

impl Dimensions {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Parse a "WIDTHxHEIGHT" token with positive integer components.
    pub fn parse(s: &str) -> Option<Self> {
        let (w, h) = s.trim().split_once(['x', 'X'])?;
        let width: u32 = w.trim().parse().ok()?;
        let height: u32 = h.trim().parse().ok()?;
        if width == 0 || height == 0 {
            return None;
        }
        Some(Self { width, height })
    }
}

impl fmt::Display for Dimensions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

/// How a reference image is mapped onto the target geometry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FitMode {
    /// Crop to fill the full frame
    #[default]
    Cover,
    /// Letterbox without cropping
    Contain,
}

impl FitMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            FitMode::Cover => "cover",
            FitMode::Contain => "contain",
        }
    }
}

impl FromStr for FitMode {
    type Err = ();

    /// Lenient: anything other than "contain" is treated as cover.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "contain" => Ok(FitMode::Contain),
            _ => Ok(FitMode::Cover),
        }
    }
}

/// Normalize a requested duration onto the allowed set.
pub fn normalize_seconds(input: &str) -> &'static str {
    let trimmed = input.trim();
    ALLOWED_SECONDS
        .iter()
        .find(|s| **s == trimmed)
        .copied()
        .unwrap_or(DEFAULT_SECONDS)
}

/// Normalize a requested size string, falling back to 1280x720.
pub fn normalize_size(input: &str) -> Dimensions {
    Dimensions::parse(input).unwrap_or(DEFAULT_SIZE)
}

/// Normalize a requested model against the configured allowed set.
pub fn normalize_model(input: &str, allowed: &[String], default: &str) -> String {
    let trimmed = input.trim();
    if allowed.iter().any(|m| m == trimmed) {
        trimmed.to_string()
    } else {
        default.to_string()
    }
}

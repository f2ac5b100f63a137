//! Client for the remote video generation API.
//!
//! Thin request layer over `POST /v1/videos` (multipart create),
//! `GET /v1/videos/:id` (status), `GET /v1/videos/:id/content` (binary
//! asset, supports HEAD) and `GET /v1/videos?limit=` (listing). Provider
//! failures are classified into a typed [`ProviderErrorKind`] here, at the
//! boundary, so callers branch on a tag instead of matching provider prose.

mod client;
mod error;
mod types;


pub use client::{ProviderClient, ProviderConfig};
pub use error::{classify, ProviderError, ProviderErrorKind, ProviderResult};
pub use types::{
    AssetKind, ContentProbe, ContentStream, NewVideo, ReferenceAttachment, VideoBackend, VideoJob,
};

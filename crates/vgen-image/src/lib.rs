//! Reference image normalization.
//!
//! An uploaded reference must arrive at the provider at exactly the target
//! video geometry and under the provider's byte ceiling. This crate decodes
//! arbitrary input, crops or letterboxes to the exact target dimensions, and
//! re-encodes as baseline JPEG, dropping quality once if the first encoding
//! is oversized.

mod error;
mod normalize;

pub use error::{ImageError, ImageResult};
pub use normalize::{normalize_reference, NormalizedImage, MAX_REFERENCE_BYTES};

//! Business logic services.

pub mod render;
pub mod status;

pub use render::{submit_render, RenderInput, RenderOutcome, RenderPolicy};
pub use status::poll_status;

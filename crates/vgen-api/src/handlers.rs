//! Request handlers.

pub mod characters;
pub mod content;
pub mod health;
pub mod jobs;
pub mod render;
pub mod snapshots;
pub mod status;

pub use characters::*;
pub use content::*;
pub use health::*;
pub use jobs::*;
pub use render::*;
pub use snapshots::*;
pub use status::*;

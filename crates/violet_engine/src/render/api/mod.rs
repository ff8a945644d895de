//! Public rendering API
//!
//! This module contains the backend contract every drawing context wraps,
//! the renderer creation options and the rendering error type.

pub mod render_backend;
pub mod renderer_config;

// Re-export commonly used types
pub use render_backend::{RenderBackend, BackendResult, RenderError, TextureId};
pub use renderer_config::RendererOptions;

//! Platform abstraction
//!
//! A platform creates the display surface and the renderer bound to it.
//! These are the two native acquisitions the engine makes during
//! initialization; everything else is layered on top.

use thiserror::Error;

use crate::render::api::{RenderBackend, RendererOptions};
use crate::render::window::{WindowConfig, WindowHandle};

/// Failures while bringing up the display
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PlatformError {
    /// The display surface could not be created
    #[error("Failed to create the display surface: {0}")]
    SurfaceCreationFailed(String),

    /// The renderer could not be created for the surface
    #[error("Failed to create the drawing context: {0}")]
    ContextCreationFailed(String),

    /// A library subsystem failed to initialize
    #[error("Failed to initialize the {subsystem} subsystem: {reason}")]
    SubsystemInitFailed {
        /// Subsystem name
        subsystem: String,
        /// Backend message
        reason: String,
    },
}

/// Creates display surfaces and their renderers
pub trait Platform {
    /// Name used in logs
    fn name(&self) -> &str;

    /// Create the display surface
    ///
    /// # Errors
    /// Returns [`PlatformError::SurfaceCreationFailed`].
    fn create_window(&mut self, config: &WindowConfig) -> Result<WindowHandle, PlatformError>;

    /// Create the renderer bound to `window`
    ///
    /// # Errors
    /// Returns [`PlatformError::ContextCreationFailed`].
    fn create_renderer(
        &mut self,
        window: &mut WindowHandle,
        options: &RendererOptions,
    ) -> Result<Box<dyn RenderBackend>, PlatformError>;
}

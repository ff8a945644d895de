//! Window management subsystem
//!
//! The display surface is exposed to the engine as a [`WindowHandle`], which
//! wraps a backend-specific implementation of [`WindowBackend`].
//!
//! ```text
//! ┌─────────────────────────────────┐
//! │     Engine                      │
//! └─────────────┬───────────────────┘
//!               │ Owns
//!         ┌─────▼────────┐
//!         │ WindowHandle │ ← Public API (handle.rs)
//!         └─────┬────────┘
//!               │ Uses
//!      ┌────────▼────────┐
//!      │ WindowBackend   │ ← Backend contract (backend.rs)
//!      └────────┬────────┘
//!               │ Implemented by
//!        ┌──────┴──────────────┐
//!   ┌────▼───────────┐  ┌──────▼────────┐
//!   │ SoftwareWindow │  │ WinitWindow   │
//!   │ (headless)     │  │ (on screen)   │
//!   └────────────────┘  └───────────────┘
//! ```

pub mod handle;
pub mod backend;

// Re-export the main public type for convenience
pub use handle::WindowHandle;
pub use backend::WindowBackend;

use serde::{Deserialize, Serialize};

use crate::render::platform::PlatformError;

/// Default display width in logical units
pub const WINDOW_WIDTH: u32 = 750;

/// Default display height in logical units
pub const WINDOW_HEIGHT: u32 = 750;

/// Default window title
pub const WINDOW_TITLE: &str = "Project Violet";

/// Window configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WindowConfig {
    /// Window title
    pub title: String,

    /// Window width
    pub width: u32,

    /// Window height
    pub height: u32,

    /// VSync setting
    pub vsync: bool,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            title: WINDOW_TITLE.to_string(),
            width: WINDOW_WIDTH,
            height: WINDOW_HEIGHT,
            vsync: true,
        }
    }
}

impl WindowConfig {
    /// Reject dimensions no surface can be created with
    ///
    /// # Errors
    /// [`PlatformError::SurfaceCreationFailed`] when either edge is zero.
    pub fn validate(&self) -> Result<(), PlatformError> {
        if self.width == 0 || self.height == 0 {
            return Err(PlatformError::SurfaceCreationFailed(format!(
                "invalid window dimensions {}x{}",
                self.width, self.height
            )));
        }
        Ok(())
    }
}

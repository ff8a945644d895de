//! Renderer creation options
//!
//! Passed by the engine to [`crate::render::Platform::create_renderer`] when
//! the drawing context is created for the display surface.

use crate::render::primitives::Color;

/// Options for creating the renderer bound to a display surface
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RendererOptions {
    /// Synchronize presentation with the display refresh, when supported
    pub vsync: bool,
    /// Draw color set right after creation and before each frame clear
    pub baseline_color: Color,
}

impl RendererOptions {
    /// Options with vsync enabled and a white baseline
    pub const fn new() -> Self {
        Self {
            vsync: true,
            baseline_color: Color::WHITE,
        }
    }

    /// Set vsync
    #[must_use]
    pub const fn with_vsync(mut self, vsync: bool) -> Self {
        self.vsync = vsync;
        self
    }

    /// Set the baseline draw color
    #[must_use]
    pub const fn with_baseline_color(mut self, color: Color) -> Self {
        self.baseline_color = color;
        self
    }
}

impl Default for RendererOptions {
    fn default() -> Self {
        Self::new()
    }
}

//! Windowed platform

use crate::render::api::{RenderBackend, RendererOptions};
use crate::render::platform::{Platform, PlatformError};
use crate::render::window::{WindowBackend, WindowConfig, WindowHandle};

use super::presenter::WindowedRenderer;
use super::window::WinitWindow;

/// Platform that shows frames in a native window
///
/// Only one can be brought up per process, since `winit` allows a single
/// event loop.
#[derive(Debug, Default, Clone, Copy)]
pub struct WindowedPlatform;

impl WindowedPlatform {
    /// Create the platform; nothing is opened until the engine initializes
    pub const fn new() -> Self {
        Self
    }
}

impl Platform for WindowedPlatform {
    fn name(&self) -> &str {
        "winit"
    }

    fn create_window(&mut self, config: &WindowConfig) -> Result<WindowHandle, PlatformError> {
        config.validate()?;
        let window = WinitWindow::open(config)?;
        Ok(WindowHandle::new(Box::new(window)))
    }

    fn create_renderer(
        &mut self,
        window: &mut WindowHandle,
        options: &RendererOptions,
    ) -> Result<Box<dyn RenderBackend>, PlatformError> {
        let Some(window) = window.backend().as_any().downcast_ref::<WinitWindow>() else {
            return Err(PlatformError::ContextCreationFailed(
                "window was not created by the windowed platform".to_string(),
            ));
        };

        let (width, height) = window.size();
        let mut renderer = WindowedRenderer::new(window.shared(), width, height, options.vsync)?;
        renderer.set_draw_color(options.baseline_color);
        Ok(Box::new(renderer))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::backends::software::SoftwarePlatform;

    #[test]
    fn test_zero_sized_window_rejected_before_opening() {
        let mut platform = WindowedPlatform::new();
        let config = WindowConfig { height: 0, ..WindowConfig::default() };
        assert!(matches!(
            platform.create_window(&config),
            Err(PlatformError::SurfaceCreationFailed(_))
        ));
    }

    #[test]
    fn test_foreign_window_rejected() {
        let mut software = SoftwarePlatform::new();
        let mut window = software.create_window(&WindowConfig::default()).unwrap();

        let result = WindowedPlatform::new().create_renderer(&mut window, &RendererOptions::default());
        assert!(matches!(result, Err(PlatformError::ContextCreationFailed(_))));
    }
}

//! Software platform

use crate::render::api::{RenderBackend, RendererOptions};
use crate::render::platform::{Platform, PlatformError};
use crate::render::window::{WindowBackend, WindowConfig, WindowHandle};

use super::renderer::SoftwareRenderer;
use super::window::{EventInjector, SoftwareWindow};

/// Creates headless windows and CPU renderers
///
/// Failures can be scripted so that every initialization path can be
/// exercised without a display server.
#[derive(Debug, Default)]
pub struct SoftwarePlatform {
    events: EventInjector,
    surface_failure: Option<String>,
    context_failure: Option<String>,
}

impl SoftwarePlatform {
    /// Create a platform whose windows never fail
    pub fn new() -> Self {
        Self::default()
    }

    /// Make window creation fail with `reason`
    #[must_use]
    pub fn failing_window(mut self, reason: impl Into<String>) -> Self {
        self.surface_failure = Some(reason.into());
        self
    }

    /// Make renderer creation fail with `reason`
    #[must_use]
    pub fn failing_renderer(mut self, reason: impl Into<String>) -> Self {
        self.context_failure = Some(reason.into());
        self
    }

    /// Handle for feeding events to windows created by this platform
    pub fn event_injector(&self) -> EventInjector {
        self.events.clone()
    }
}

impl Platform for SoftwarePlatform {
    fn name(&self) -> &str {
        "software"
    }

    fn create_window(&mut self, config: &WindowConfig) -> Result<WindowHandle, PlatformError> {
        if let Some(reason) = &self.surface_failure {
            return Err(PlatformError::SurfaceCreationFailed(reason.clone()));
        }
        config.validate()?;

        let window = SoftwareWindow::new(&config.title, config.width, config.height, self.events.clone());
        Ok(WindowHandle::new(Box::new(window)))
    }

    fn create_renderer(
        &mut self,
        window: &mut WindowHandle,
        options: &RendererOptions,
    ) -> Result<Box<dyn RenderBackend>, PlatformError> {
        if let Some(reason) = &self.context_failure {
            return Err(PlatformError::ContextCreationFailed(reason.clone()));
        }

        let Some(window) = window.backend().as_any().downcast_ref::<SoftwareWindow>() else {
            return Err(PlatformError::ContextCreationFailed(
                "window was not created by the software platform".to_string(),
            ));
        };

        let (width, height) = window.size();
        let mut renderer = SoftwareRenderer::new(width, height, options.vsync);
        renderer.set_draw_color(options.baseline_color);
        Ok(Box::new(renderer))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scripted_failures() {
        let mut platform = SoftwarePlatform::new().failing_window("no display");
        let err = platform.create_window(&WindowConfig::default()).err();
        assert_eq!(err, Some(PlatformError::SurfaceCreationFailed("no display".to_string())));

        let mut platform = SoftwarePlatform::new().failing_renderer("no gpu");
        let mut window = platform.create_window(&WindowConfig::default()).unwrap();
        let err = platform.create_renderer(&mut window, &RendererOptions::default()).err();
        assert_eq!(err, Some(PlatformError::ContextCreationFailed("no gpu".to_string())));
    }

    #[test]
    fn test_renderer_matches_window() {
        let mut platform = SoftwarePlatform::new();
        let config = WindowConfig { width: 32, height: 16, ..WindowConfig::default() };
        let mut window = platform.create_window(&config).unwrap();

        let renderer = platform
            .create_renderer(&mut window, &RendererOptions::new().with_vsync(false))
            .unwrap();

        assert_eq!(renderer.output_size(), (32, 16));
        assert!(!renderer.vsync_enabled());
        assert_eq!(window.title(), "Project Violet");
    }

    #[test]
    fn test_zero_sized_window_rejected() {
        let mut platform = SoftwarePlatform::new();
        let config = WindowConfig { width: 0, ..WindowConfig::default() };
        assert!(matches!(
            platform.create_window(&config),
            Err(PlatformError::SurfaceCreationFailed(_))
        ));
    }
}

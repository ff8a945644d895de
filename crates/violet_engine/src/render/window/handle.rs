//! High-level window handle
//!
//! Owns the display surface for as long as the engine holds it; dropping the
//! handle destroys the surface.

use crate::input::WindowEvent;
use crate::render::window::backend::WindowBackend;

/// High-level window handle that abstracts windowing system details
pub struct WindowHandle {
    backend: Box<dyn WindowBackend>,
}

impl WindowHandle {
    /// Wrap a backend window
    pub fn new(backend: Box<dyn WindowBackend>) -> Self {
        Self { backend }
    }

    /// Drain every pending event
    pub fn poll_events(&mut self) -> Vec<WindowEvent> {
        self.backend.poll_events()
    }

    /// Get the current window size in pixels
    pub fn size(&self) -> (u32, u32) {
        self.backend.size()
    }

    /// Get the current window title
    pub fn title(&self) -> String {
        self.backend.title()
    }

    /// Set the window title
    pub fn set_title(&mut self, title: &str) {
        self.backend.set_title(title);
    }

    /// Access the backend for renderer creation
    ///
    /// Platforms downcast this to their own window type.
    pub fn backend(&self) -> &dyn WindowBackend {
        self.backend.as_ref()
    }
}

impl Drop for WindowHandle {
    fn drop(&mut self) {
        log::debug!("Destroying display surface \"{}\"", self.backend.title());
    }
}

//! Backend-agnostic window management trait
//!
//! This module defines the trait that all window backends must implement.
//! The engine never talks to a backend directly; it goes through
//! [`super::WindowHandle`].

use crate::input::WindowEvent;

/// Trait for window backend implementations
///
/// Window operations happen on the thread that owns the engine, so there is
/// no `Send` bound.
pub trait WindowBackend {
    /// Drain every pending event
    ///
    /// Each call must return the whole queue so no event is left behind for
    /// a later frame.
    fn poll_events(&mut self) -> Vec<WindowEvent>;

    /// Get the current window size in pixels
    fn size(&self) -> (u32, u32);

    /// Get the current window title
    fn title(&self) -> String;

    /// Set the window title text
    fn set_title(&mut self, title: &str);

    /// Get access to the concrete type for downcasting
    fn as_any(&self) -> &dyn std::any::Any;

    /// Get mutable access to the concrete type for downcasting
    fn as_any_mut(&mut self) -> &mut dyn std::any::Any;
}

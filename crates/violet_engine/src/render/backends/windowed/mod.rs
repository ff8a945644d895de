//! Windowed backend
//!
//! - [`WindowedPlatform`]: opens the native window and its renderer
//! - [`WinitWindow`]: `winit` window whose event loop is pumped once per
//!   frame by the engine
//! - [`WindowedRenderer`]: the software rasterizer, with every presented
//!   frame copied to the window through `softbuffer`
//!
//! Pumping the event loop from the engine requires one of the desktop
//! platforms `winit` supports `pump_app_events` on.

mod platform;
mod presenter;
mod window;

pub use platform::WindowedPlatform;
pub use presenter::WindowedRenderer;
pub use window::WinitWindow;

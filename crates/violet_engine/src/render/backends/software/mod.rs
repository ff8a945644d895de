//! Software rendering backend
//!
//! - [`SoftwarePlatform`]: creates the headless window and its renderer
//! - [`SoftwareWindow`]: display surface fed by an [`EventInjector`]
//! - [`SoftwareRenderer`]: CPU rasterizer over `image::RgbaImage` buffers

mod platform;
mod renderer;
mod window;

pub use platform::SoftwarePlatform;
pub use renderer::{RendererStats, SoftwareRenderer, MAX_TEXTURE_SIZE};
pub use window::{EventInjector, SoftwareWindow};

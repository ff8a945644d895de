//! # Rendering System
//!
//! The rendering abstraction layer between the engine and a native 2D
//! backend.
//!
//! ## Architecture
//!
//! - **Platform**: creates the display surface and the renderer bound to it
//! - **DrawingContext**: shared handle through which every draw call goes
//! - **Drawable**: one texture plus its intrinsic size and scale
//! - **Subsystems**: image and text libraries brought up against the context
//! - **Backends**: concrete platforms; a headless software rasterizer and a
//!   native window presenting that rasterizer's frames
//!
//! Resources are acquired in the order surface, context, subsystems and
//! released in exactly the reverse order by the engine.

pub mod api;
pub mod backends;
pub mod context;
pub mod drawable;
pub mod platform;
pub mod primitives;
pub mod subsystems;
pub mod surface;
pub mod text;
pub mod window;

pub use api::{BackendResult, RenderBackend, RenderError, RendererOptions, TextureId};
pub use context::DrawingContext;
pub use drawable::{Drawable, DrawableError, RenderParams};
pub use platform::{Platform, PlatformError};
pub use primitives::{BlendMode, Color, Flip};
pub use subsystems::{default_subsystems, ImageSubsystem, Subsystem, TextSubsystem};
pub use surface::{ColorKey, StagingSurface};
pub use text::{Font, TextError, TextShaper, TEXT_WRAP_WIDTH};
pub use window::{WindowBackend, WindowConfig, WindowHandle};

//! Backend abstraction traits for the rendering system
//!
//! This module defines the trait that native rendering backends must
//! implement. The trait mirrors the immediate-mode 2D model the rest of the
//! engine is written against: a current draw color, a current render target,
//! textures addressed by opaque handles, clear and present.

use crate::foundation::math::{Point, Rect};
use crate::render::primitives::{BlendMode, Color, Flip};
use crate::render::surface::StagingSurface;
use thiserror::Error;

slotmap::new_key_type! {
    /// Handle to a texture stored in the backend
    pub struct TextureId;
}

/// Result type for backend operations
pub type BackendResult<T> = Result<T, RenderError>;

/// Rendering errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RenderError {
    /// The drawing context was closed during teardown
    #[error("Drawing context is closed")]
    ContextClosed,

    /// A texture could not be created
    #[error("Texture creation failed: {0}")]
    TextureCreationFailed(String),

    /// The handle does not name a live texture
    #[error("Invalid texture handle")]
    InvalidTexture,

    /// The texture was not created as a render target
    #[error("Texture is not a render target")]
    NotARenderTarget,

    /// Backend-specific failure
    #[error("Rendering failed: {0}")]
    RenderingFailed(String),
}

/// Main rendering backend trait
///
/// One instance is bound to one display surface. All calls happen on the
/// thread that owns the engine.
pub trait RenderBackend {
    /// Size of the default render target in pixels
    fn output_size(&self) -> (u32, u32);

    /// Whether presentation waits for vertical sync
    fn vsync_enabled(&self) -> bool;

    /// Current draw color
    fn draw_color(&self) -> Color;

    /// Set the color used by [`RenderBackend::clear`]
    fn set_draw_color(&mut self, color: Color);

    /// Fill the current render target with the draw color
    fn clear(&mut self) -> BackendResult<()>;

    /// Show the completed frame on the display surface
    fn present(&mut self) -> BackendResult<()>;

    /// Upload a staging surface into a new texture
    fn create_texture_from_surface(&mut self, surface: &StagingSurface) -> BackendResult<TextureId>;

    /// Allocate a blank texture usable as a render target
    fn create_target_texture(&mut self, width: u32, height: u32) -> BackendResult<TextureId>;

    /// Release a texture; unknown handles are ignored
    fn destroy_texture(&mut self, texture: TextureId);

    /// Redirect rendering to `target`, or back to the display with `None`
    fn set_render_target(&mut self, target: Option<TextureId>) -> BackendResult<()>;

    /// Copy (part of) a texture onto the current render target
    ///
    /// `src` of `None` copies the whole texture. `angle` is in degrees,
    /// clockwise, around `center` relative to `dst`; a `center` of `None`
    /// rotates around the middle of `dst`.
    fn copy_ex(
        &mut self,
        texture: TextureId,
        src: Option<Rect>,
        dst: Rect,
        angle: f64,
        center: Option<Point>,
        flip: Flip,
    ) -> BackendResult<()>;

    /// Set how a texture blends onto its target
    fn set_texture_blend_mode(&mut self, texture: TextureId, mode: BlendMode) -> BackendResult<()>;

    /// Set the color and alpha multiplied into a texture when copied
    fn set_texture_color_mod(&mut self, texture: TextureId, color: Color) -> BackendResult<()>;

    /// Number of textures currently alive
    fn live_textures(&self) -> usize;

    /// Pixels of the last presented frame, if the backend can read them back
    fn read_pixels(&self) -> Option<image::RgbaImage>;

    /// Downcast to concrete backend type for advanced operations
    fn as_any(&self) -> &dyn std::any::Any;

    /// Downcast to mutable concrete backend type for advanced operations
    fn as_any_mut(&mut self) -> &mut dyn std::any::Any;
}

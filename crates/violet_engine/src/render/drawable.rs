//! Drawables
//!
//! A [`Drawable`] wraps one backend texture together with the size it was
//! created at and a per-instance scale. Whether the pixels came from an
//! image file, rasterized text or a solid fill, it is drawn the same way.
//!
//! Every drawable holds a clone of the [`DrawingContext`] it was created
//! against. Creating it again through any constructor releases the previous
//! texture first, and a constructor that fails leaves the drawable released:
//! zero size, zero scale, and `render` does nothing.

use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::assets::AssetError;
use crate::foundation::math::{Point, Rect};
use crate::render::api::{BackendResult, RenderBackend, RenderError, TextureId};
use crate::render::context::DrawingContext;
use crate::render::primitives::{BlendMode, Color, Flip};
use crate::render::surface::{ColorKey, StagingSurface};
use crate::render::text::{TextError, TextShaper, TEXT_WRAP_WIDTH};

/// Failures while creating a drawable
#[derive(Error, Debug)]
pub enum DrawableError {
    /// The image file could not be decoded
    #[error("Unable to load image {path:?}: {source}")]
    DecodeFailed {
        /// File that was requested
        path: PathBuf,
        /// Decoder error
        #[source]
        source: AssetError,
    },

    /// The staging surface could not become a texture
    #[error("Unable to convert the surface to a texture: {0}")]
    ConversionFailed(#[source] RenderError),

    /// Text could not be rasterized
    #[error("Unable to render text to a surface: {0}")]
    ShapingFailed(#[from] TextError),

    /// The render-target texture could not be created or painted
    #[error("Failed to create a targetable texture: {0}")]
    AllocationFailed(#[source] RenderError),
}

/// Per-call options for [`Drawable::render`]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RenderParams {
    /// Ignore the camera offset
    pub fixed_to_screen: bool,
    /// Camera position subtracted from the destination
    pub camera: Point,
    /// Part of the texture to draw, the whole texture when `None`
    pub clip: Option<Rect>,
    /// Clockwise rotation in degrees
    pub angle: f64,
    /// Rotation pivot relative to the destination, its center when `None`
    pub center: Option<Point>,
    /// Mirroring
    pub flip: Flip,
}

impl Default for RenderParams {
    fn default() -> Self {
        Self {
            fixed_to_screen: true,
            camera: Point::default(),
            clip: None,
            angle: 0.0,
            center: None,
            flip: Flip::NONE,
        }
    }
}

impl RenderParams {
    /// Draw in world space, offset by `camera`
    pub const fn with_camera(mut self, camera: Point) -> Self {
        self.fixed_to_screen = false;
        self.camera = camera;
        self
    }

    /// Draw only `clip` of the texture
    pub const fn with_clip(mut self, clip: Rect) -> Self {
        self.clip = Some(clip);
        self
    }

    /// Rotate by `angle` degrees around `center`
    pub const fn with_rotation(mut self, angle: f64, center: Option<Point>) -> Self {
        self.angle = angle;
        self.center = center;
        self
    }

    /// Mirror the texture
    pub const fn with_flip(mut self, flip: Flip) -> Self {
        self.flip = flip;
        self
    }
}

/// A texture bound to a drawing context
#[derive(Debug, Default)]
pub struct Drawable {
    context: Option<DrawingContext>,
    texture: Option<TextureId>,
    width: u32,
    height: u32,
    x_scale: f64,
    y_scale: f64,
}

impl Drawable {
    /// A released drawable
    pub fn new() -> Self {
        Self::default()
    }

    /// Load an image file
    ///
    /// With a `color_key`, every pixel of exactly that RGB value becomes
    /// fully transparent before the texture is created.
    ///
    /// # Errors
    /// [`DrawableError::DecodeFailed`] or [`DrawableError::ConversionFailed`].
    pub fn create_from_image(
        &mut self,
        path: impl AsRef<Path>,
        x_scale: f64,
        y_scale: f64,
        context: &DrawingContext,
        color_key: Option<ColorKey>,
    ) -> Result<(), DrawableError> {
        self.release();
        let path = path.as_ref();

        let mut surface = context
            .decode_image(path)
            .map_err(|source| DrawableError::DecodeFailed {
                path: path.to_path_buf(),
                source,
            })?;

        if let Some(key) = color_key {
            surface.apply_color_key(key);
        }

        self.attach(context, &surface, x_scale, y_scale)?;
        log::debug!("Loaded {:?} as a {}x{} drawable", path, self.width, self.height);
        Ok(())
    }

    /// Rasterize `text` in `color`, wrapped at [`TEXT_WRAP_WIDTH`]
    ///
    /// # Errors
    /// [`DrawableError::ShapingFailed`] or [`DrawableError::ConversionFailed`].
    pub fn create_from_text(
        &mut self,
        text: &str,
        font: &dyn TextShaper,
        color: Color,
        context: &DrawingContext,
    ) -> Result<(), DrawableError> {
        self.release();
        let surface = font.shape(text, color, TEXT_WRAP_WIDTH)?;
        self.attach(context, &surface, 1.0, 1.0)
    }

    /// A `width` x `height` rectangle filled with `fill`
    ///
    /// # Errors
    /// [`DrawableError::AllocationFailed`].
    pub fn create_from_rect(
        &mut self,
        width: u32,
        height: u32,
        fill: Color,
        context: &DrawingContext,
    ) -> Result<(), DrawableError> {
        self.release();

        let texture = context
            .with_backend(|backend| {
                let texture = backend.create_target_texture(width, height)?;
                if let Err(e) = paint(backend, texture, fill) {
                    backend.destroy_texture(texture);
                    return Err(e);
                }
                Ok(texture)
            })
            .map_err(DrawableError::AllocationFailed)?;

        self.bind(context, texture, (width, height), 1.0, 1.0);
        Ok(())
    }

    fn attach(
        &mut self,
        context: &DrawingContext,
        surface: &StagingSurface,
        x_scale: f64,
        y_scale: f64,
    ) -> Result<(), DrawableError> {
        let texture = context
            .with_backend(|backend| backend.create_texture_from_surface(surface))
            .map_err(DrawableError::ConversionFailed)?;

        self.bind(context, texture, surface.dimensions(), x_scale, y_scale);
        Ok(())
    }

    fn bind(
        &mut self,
        context: &DrawingContext,
        texture: TextureId,
        (width, height): (u32, u32),
        x_scale: f64,
        y_scale: f64,
    ) {
        self.context = Some(context.clone());
        self.texture = Some(texture);
        self.width = width;
        self.height = height;
        self.x_scale = x_scale;
        self.y_scale = y_scale;
    }

    /// Where a draw at `(x, y)` lands on the current render target
    ///
    /// The camera offset is subtracted unless the params are fixed to the
    /// screen, a clip replaces the texture size, and the position (not the
    /// size) is multiplied by the scale factors.
    pub fn destination_rect(&self, x: i32, y: i32, params: &RenderParams) -> Rect {
        let (x, y) = if params.fixed_to_screen {
            (x, y)
        } else {
            (x.saturating_sub(params.camera.x), y.saturating_sub(params.camera.y))
        };

        let (w, h) = params
            .clip
            .map_or((self.width, self.height), |clip| (clip.w, clip.h));

        Rect::new(
            (f64::from(x) * self.x_scale) as i32,
            (f64::from(y) * self.y_scale) as i32,
            w,
            h,
        )
    }

    /// Draw at `(x, y)`
    ///
    /// Does nothing when released. Backend failures are logged.
    pub fn render(&self, x: i32, y: i32, params: &RenderParams) {
        if let Err(e) = self.try_render(x, y, params) {
            log::error!("Failed to render drawable: {e}");
        }
    }

    /// Draw at `(x, y)`, returning the backend result
    ///
    /// # Errors
    /// Whatever the backend reports, or [`RenderError::ContextClosed`] after
    /// engine teardown.
    pub fn try_render(&self, x: i32, y: i32, params: &RenderParams) -> BackendResult<()> {
        let (Some(context), Some(texture)) = (&self.context, self.texture) else {
            return Ok(());
        };

        let dst = self.destination_rect(x, y, params);
        context.with_backend(|backend| {
            backend.copy_ex(texture, params.clip, dst, params.angle, params.center, params.flip)
        })
    }

    /// Replace the scale factors
    pub fn set_scale(&mut self, x_scale: f64, y_scale: f64) {
        self.x_scale = x_scale;
        self.y_scale = y_scale;
    }

    /// How the texture combines with what is underneath
    pub fn set_blend_mode(&self, mode: BlendMode) {
        self.with_texture(|backend, texture| backend.set_texture_blend_mode(texture, mode));
    }

    /// Multiply the texture's color channels by `(r, g, b)` and its alpha by `a`
    pub fn set_color_modulation(&self, r: u8, g: u8, b: u8, a: u8) {
        let color = Color::rgba(r, g, b, a);
        self.with_texture(|backend, texture| backend.set_texture_color_mod(texture, color));
    }

    fn with_texture(
        &self,
        f: impl FnOnce(&mut dyn RenderBackend, TextureId) -> BackendResult<()>,
    ) {
        if let (Some(context), Some(texture)) = (&self.context, self.texture) {
            if let Err(e) = context.with_backend(|backend| f(backend, texture)) {
                log::warn!("Failed to update drawable texture: {e}");
            }
        }
    }

    /// Size the drawable was created at
    pub const fn unscaled_size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// Size multiplied by the scale factors
    pub fn scaled_size(&self) -> (f64, f64) {
        (
            f64::from(self.width) * self.x_scale,
            f64::from(self.height) * self.y_scale,
        )
    }

    /// Current scale factors
    pub const fn scale(&self) -> (f64, f64) {
        (self.x_scale, self.y_scale)
    }

    /// Whether a texture is held
    pub const fn is_loaded(&self) -> bool {
        self.texture.is_some()
    }

    /// Destroy the texture and let go of the context
    ///
    /// Safe to call repeatedly. Only this drawable's hold on the context is
    /// dropped; the context itself stays open.
    pub fn release(&mut self) {
        if let (Some(context), Some(texture)) = (self.context.take(), self.texture.take()) {
            let destroyed = context.with_backend(|backend| {
                backend.destroy_texture(texture);
                Ok(())
            });
            if destroyed.is_err() {
                log::debug!("Drawing context already closed, texture was freed with it");
            }
        }

        self.context = None;
        self.texture = None;
        self.width = 0;
        self.height = 0;
        self.x_scale = 0.0;
        self.y_scale = 0.0;
    }
}

impl Drop for Drawable {
    fn drop(&mut self) {
        self.release();
    }
}

/// Clear `texture` to `fill`, then restore the draw color and the default target
fn paint(
    backend: &mut dyn RenderBackend,
    texture: TextureId,
    fill: Color,
) -> BackendResult<()> {
    let previous = backend.draw_color();
    backend.set_render_target(Some(texture))?;
    backend.set_draw_color(fill);
    let cleared = backend.clear();
    backend.set_draw_color(previous);
    backend.set_render_target(None)?;
    cleared
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::backends::software::SoftwareRenderer;
    use crate::render::subsystems::{ImageSubsystem, Subsystem};
    use crate::render::text::TextResult;
    use approx::assert_relative_eq;
    use image::{Rgba, RgbaImage};

    struct BlockShaper;

    impl TextShaper for BlockShaper {
        fn shape(&self, text: &str, color: Color, wrap_width: u32) -> TextResult<StagingSurface> {
            let width = (text.len() as u32 * 8).min(wrap_width);
            if width == 0 {
                return Err(TextError::ZeroSize);
            }
            Ok(StagingSurface::solid(width, 12, color))
        }
    }

    fn context() -> DrawingContext {
        DrawingContext::new(Box::new(SoftwareRenderer::new(32, 32, false)), Color::WHITE)
    }

    fn live_textures(context: &DrawingContext) -> usize {
        context.with_backend(|backend| Ok(backend.live_textures())).unwrap()
    }

    fn write_png(name: &str, width: u32, height: u32) -> PathBuf {
        let path = std::env::temp_dir().join(format!("violet_drawable_{}_{name}.png", std::process::id()));
        RgbaImage::from_pixel(width, height, Rgba([0xFF, 0x00, 0xDC, 0xFF]))
            .save(&path)
            .unwrap();
        path
    }

    #[test]
    fn test_image_sizes_and_scale() {
        let ctx = context();
        ImageSubsystem.initialize(&ctx).unwrap();
        let path = write_png("scaled", 64, 64);

        let mut drawable = Drawable::new();
        drawable.create_from_image(&path, 2.0, 1.0, &ctx, None).unwrap();

        assert_eq!(drawable.unscaled_size(), (64, 64));
        let (w, h) = drawable.scaled_size();
        assert_relative_eq!(w, 128.0);
        assert_relative_eq!(h, 64.0);

        drawable.set_scale(0.5, 1.5);
        let (w, h) = drawable.scaled_size();
        assert_relative_eq!(w, 32.0);
        assert_relative_eq!(h, 96.0);

        std::fs::remove_file(path).ok();
    }

    #[test]
    fn test_color_key_makes_pixels_transparent() {
        let ctx = context();
        ImageSubsystem.initialize(&ctx).unwrap();
        let path = write_png("keyed", 2, 2);

        let mut drawable = Drawable::new();
        drawable
            .create_from_image(&path, 1.0, 1.0, &ctx, Some(ColorKey::DEFAULT))
            .unwrap();
        drawable.render(0, 0, &RenderParams::default());

        let pixel = ctx
            .with_backend(|backend| {
                let renderer = backend.as_any().downcast_ref::<SoftwareRenderer>().unwrap();
                Ok(renderer.back_pixel(0, 0))
            })
            .unwrap();
        assert_eq!(pixel, Some(Color::TRANSPARENT));

        std::fs::remove_file(path).ok();
    }

    #[test]
    fn test_failed_constructors_leave_drawable_released() {
        let ctx = context();
        let mut drawable = Drawable::new();

        // No image subsystem installed
        let result = drawable.create_from_image("missing.png", 2.0, 2.0, &ctx, None);
        assert!(matches!(result, Err(DrawableError::DecodeFailed { .. })));
        assert_eq!(drawable.unscaled_size(), (0, 0));
        assert!(!drawable.is_loaded());

        let result = drawable.create_from_text("", &BlockShaper, Color::BLACK, &ctx);
        assert!(matches!(result, Err(DrawableError::ShapingFailed(_))));
        assert_eq!(drawable.unscaled_size(), (0, 0));

        let result = drawable.create_from_rect(0, 10, Color::BLACK, &ctx);
        assert!(matches!(result, Err(DrawableError::AllocationFailed(_))));
        assert_eq!(drawable.unscaled_size(), (0, 0));

        assert_eq!(drawable.try_render(5, 5, &RenderParams::default()), Ok(()));
        assert_eq!(live_textures(&ctx), 0);
        assert_eq!(ctx.holder_count(), 1);
    }

    #[test]
    fn test_reinitialization_does_not_leak() {
        let ctx = context();
        let mut drawable = Drawable::new();

        drawable.create_from_rect(4, 4, Color::BLACK, &ctx).unwrap();
        drawable.create_from_text("hello", &BlockShaper, Color::WHITE, &ctx).unwrap();
        drawable.create_from_rect(8, 2, Color::BLACK, &ctx).unwrap();

        assert_eq!(live_textures(&ctx), 1);
        assert_eq!(ctx.holder_count(), 2);
        assert_eq!(drawable.unscaled_size(), (8, 2));
        assert_eq!(drawable.scale(), (1.0, 1.0));
    }

    #[test]
    fn test_text_uses_wrap_width() {
        let ctx = context();
        let mut drawable = Drawable::new();
        let long_text = "x".repeat(200);

        drawable.create_from_text(&long_text, &BlockShaper, Color::WHITE, &ctx).unwrap();
        assert_eq!(drawable.unscaled_size(), (TEXT_WRAP_WIDTH, 12));
    }

    #[test]
    fn test_rect_restores_draw_state() {
        let ctx = context();
        ctx.with_backend(|backend| {
            backend.set_draw_color(Color::rgb(1, 2, 3));
            Ok(())
        })
        .unwrap();

        let mut drawable = Drawable::new();
        drawable.create_from_rect(3, 3, Color::rgb(200, 0, 0), &ctx).unwrap();

        ctx.with_backend(|backend| {
            assert_eq!(backend.draw_color(), Color::rgb(1, 2, 3));
            let renderer = backend.as_any().downcast_ref::<SoftwareRenderer>().unwrap();
            assert_eq!(renderer.render_target(), None);
            Ok(())
        })
        .unwrap();
    }

    #[test]
    fn test_camera_offset() {
        let ctx = context();
        let mut drawable = Drawable::new();
        drawable.create_from_rect(10, 6, Color::BLACK, &ctx).unwrap();

        let fixed = RenderParams::default();
        let world = RenderParams::default().with_camera(Point::new(7, -3));

        let screen = drawable.destination_rect(20, 20, &fixed);
        let shifted = drawable.destination_rect(20, 20, &world);
        assert_eq!(screen, Rect::new(20, 20, 10, 6));
        assert_eq!(shifted, Rect::new(13, 23, 10, 6));

        let fixed_with_camera = RenderParams {
            camera: Point::new(7, -3),
            ..RenderParams::default()
        };
        assert_eq!(drawable.destination_rect(20, 20, &fixed_with_camera), screen);
    }

    #[test]
    fn test_extreme_camera_offset_saturates() {
        let ctx = context();
        let mut drawable = Drawable::new();
        drawable.create_from_rect(4, 4, Color::BLACK, &ctx).unwrap();

        let world = RenderParams::default().with_camera(Point::new(i32::MIN, i32::MAX));
        let dst = drawable.destination_rect(10, -10, &world);
        assert_eq!(dst, Rect::new(i32::MAX, i32::MIN, 4, 4));

        // Nothing lands on screen, and nothing panics
        drawable.render(10, -10, &world);
    }

    #[test]
    fn test_clip_and_scale_in_destination() {
        let ctx = context();
        let mut drawable = Drawable::new();
        drawable.create_from_rect(10, 10, Color::BLACK, &ctx).unwrap();
        drawable.set_scale(2.0, 0.5);

        let params = RenderParams::default().with_clip(Rect::new(0, 0, 4, 3));
        assert_eq!(drawable.destination_rect(5, 8, &params), Rect::new(10, 4, 4, 3));
    }

    #[test]
    fn test_render_draws_pixels() {
        let ctx = context();
        let mut drawable = Drawable::new();
        drawable.create_from_rect(2, 2, Color::rgb(0, 200, 0), &ctx).unwrap();

        drawable.render(3, 3, &RenderParams::default());

        ctx.with_backend(|backend| {
            let renderer = backend.as_any().downcast_ref::<SoftwareRenderer>().unwrap();
            assert_eq!(renderer.back_pixel(3, 3), Some(Color::rgb(0, 200, 0)));
            assert_eq!(renderer.back_pixel(5, 5), Some(Color::TRANSPARENT));
            Ok(())
        })
        .unwrap();
    }

    #[test]
    fn test_release_is_idempotent() {
        let ctx = context();
        let mut drawable = Drawable::new();
        drawable.create_from_rect(4, 4, Color::BLACK, &ctx).unwrap();

        drawable.release();
        drawable.release();

        assert_eq!(drawable.unscaled_size(), (0, 0));
        assert_eq!(drawable.scale(), (0.0, 0.0));
        assert_eq!(live_textures(&ctx), 0);
        assert_eq!(ctx.holder_count(), 1);
    }

    #[test]
    fn test_stray_drawable_after_close() {
        let ctx = context();
        let mut drawable = Drawable::new();
        drawable.create_from_rect(4, 4, Color::BLACK, &ctx).unwrap();

        drop(ctx.close());

        assert_eq!(
            drawable.try_render(0, 0, &RenderParams::default()),
            Err(RenderError::ContextClosed)
        );
        drawable.set_color_modulation(255, 0, 0, 128);
        drawable.release();
        assert!(!drawable.is_loaded());
    }
}

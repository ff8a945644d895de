//! CPU rasterizer
//!
//! Draws into a back buffer and copies it to a front buffer on present.
//! Textures live in a slot map so stale handles are detected rather than
//! aliased. Copies use nearest-neighbour sampling and support source
//! clipping, scaling, rotation around an arbitrary pivot, and mirroring.

use image::{Rgba, RgbaImage};
use slotmap::SlotMap;

use crate::foundation::math::{Point, Rect};
use crate::render::api::{BackendResult, RenderBackend, RenderError, TextureId};
use crate::render::primitives::{BlendMode, Color, Flip};
use crate::render::surface::StagingSurface;

/// Largest texture edge the software renderer accepts
pub const MAX_TEXTURE_SIZE: u32 = 8192;

/// Counters for work done by the renderer
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct RendererStats {
    /// Calls to `clear`
    pub clears: u64,
    /// Calls to `present`
    pub presents: u64,
    /// Texture copies that touched the target
    pub copies: u64,
    /// Textures created over the renderer's lifetime
    pub textures_created: u64,
    /// Textures destroyed over the renderer's lifetime
    pub textures_destroyed: u64,
}

#[derive(Debug, Clone)]
struct SoftTexture {
    pixels: RgbaImage,
    blend: BlendMode,
    color_mod: Color,
    is_target: bool,
}

/// Software implementation of [`RenderBackend`]
#[derive(Debug)]
pub struct SoftwareRenderer {
    back: RgbaImage,
    front: RgbaImage,
    textures: SlotMap<TextureId, SoftTexture>,
    target: Option<TextureId>,
    draw_color: Color,
    vsync: bool,
    stats: RendererStats,
}

impl SoftwareRenderer {
    /// Create a renderer with a `width` x `height` display
    pub fn new(width: u32, height: u32, vsync: bool) -> Self {
        Self {
            back: RgbaImage::new(width, height),
            front: RgbaImage::new(width, height),
            textures: SlotMap::with_key(),
            target: None,
            draw_color: Color::WHITE,
            vsync,
            stats: RendererStats::default(),
        }
    }

    /// Work counters
    pub const fn stats(&self) -> RendererStats {
        self.stats
    }

    /// The last presented frame
    pub const fn presented(&self) -> &RgbaImage {
        &self.front
    }

    /// Pixel of the last presented frame
    pub fn presented_pixel(&self, x: u32, y: u32) -> Option<Color> {
        read_pixel(&self.front, x, y)
    }

    /// Pixel of the frame being drawn
    pub fn back_pixel(&self, x: u32, y: u32) -> Option<Color> {
        read_pixel(&self.back, x, y)
    }

    /// Pixel of a texture
    pub fn texture_pixel(&self, texture: TextureId, x: u32, y: u32) -> Option<Color> {
        self.textures
            .get(texture)
            .and_then(|texture| read_pixel(&texture.pixels, x, y))
    }

    /// Current render target, `None` for the display
    pub const fn render_target(&self) -> Option<TextureId> {
        self.target
    }

    fn check_size(width: u32, height: u32) -> BackendResult<()> {
        if width == 0 || height == 0 || width > MAX_TEXTURE_SIZE || height > MAX_TEXTURE_SIZE {
            return Err(RenderError::TextureCreationFailed(format!(
                "texture dimensions {width}x{height} are out of range"
            )));
        }
        Ok(())
    }

    fn insert(&mut self, texture: SoftTexture) -> TextureId {
        self.stats.textures_created += 1;
        self.textures.insert(texture)
    }

    fn target_pixels(&mut self) -> BackendResult<&mut RgbaImage> {
        match self.target {
            None => Ok(&mut self.back),
            Some(id) => self
                .textures
                .get_mut(id)
                .map(|texture| &mut texture.pixels)
                .ok_or(RenderError::InvalidTexture),
        }
    }
}

impl RenderBackend for SoftwareRenderer {
    fn output_size(&self) -> (u32, u32) {
        self.back.dimensions()
    }

    fn vsync_enabled(&self) -> bool {
        self.vsync
    }

    fn draw_color(&self) -> Color {
        self.draw_color
    }

    fn set_draw_color(&mut self, color: Color) {
        self.draw_color = color;
    }

    fn clear(&mut self) -> BackendResult<()> {
        let fill = Rgba(self.draw_color.to_array());
        for pixel in self.target_pixels()?.pixels_mut() {
            *pixel = fill;
        }
        self.stats.clears += 1;
        Ok(())
    }

    fn present(&mut self) -> BackendResult<()> {
        self.front.clone_from(&self.back);
        self.stats.presents += 1;
        Ok(())
    }

    fn create_texture_from_surface(&mut self, surface: &StagingSurface) -> BackendResult<TextureId> {
        Self::check_size(surface.width(), surface.height())?;
        Ok(self.insert(SoftTexture {
            pixels: surface.pixels().clone(),
            blend: BlendMode::Blend,
            color_mod: Color::WHITE,
            is_target: false,
        }))
    }

    fn create_target_texture(&mut self, width: u32, height: u32) -> BackendResult<TextureId> {
        Self::check_size(width, height)?;
        Ok(self.insert(SoftTexture {
            pixels: RgbaImage::new(width, height),
            blend: BlendMode::None,
            color_mod: Color::WHITE,
            is_target: true,
        }))
    }

    fn destroy_texture(&mut self, texture: TextureId) {
        if self.textures.remove(texture).is_some() {
            self.stats.textures_destroyed += 1;
            if self.target == Some(texture) {
                self.target = None;
            }
        }
    }

    fn set_render_target(&mut self, target: Option<TextureId>) -> BackendResult<()> {
        if let Some(id) = target {
            let texture = self.textures.get(id).ok_or(RenderError::InvalidTexture)?;
            if !texture.is_target {
                return Err(RenderError::NotARenderTarget);
            }
        }
        self.target = target;
        Ok(())
    }

    fn copy_ex(
        &mut self,
        texture: TextureId,
        src: Option<Rect>,
        dst: Rect,
        angle: f64,
        center: Option<Point>,
        flip: Flip,
    ) -> BackendResult<()> {
        let source = self.textures.get(texture).ok_or(RenderError::InvalidTexture)?;
        let bounds = Rect::new(0, 0, source.pixels.width(), source.pixels.height());
        let Some(src) = src.map_or(Some(bounds), |clip| clip.intersection(&bounds)) else {
            return Ok(());
        };
        if dst.is_empty() {
            return Ok(());
        }

        let pivot = center.map_or(
            (f64::from(dst.w) / 2.0, f64::from(dst.h) / 2.0),
            |point| (f64::from(point.x), f64::from(point.y)),
        );
        let blit = Blit { src, dst, angle, pivot, flip };

        match self.target {
            None => blit.run(source, &mut self.back),
            Some(target) if target == texture => {
                return Err(RenderError::RenderingFailed(
                    "a texture cannot be copied onto itself".to_string(),
                ));
            }
            Some(target) => {
                let source = source.clone();
                let destination = self.textures.get_mut(target).ok_or(RenderError::InvalidTexture)?;
                blit.run(&source, &mut destination.pixels);
            }
        }

        self.stats.copies += 1;
        Ok(())
    }

    fn set_texture_blend_mode(&mut self, texture: TextureId, mode: BlendMode) -> BackendResult<()> {
        let texture = self.textures.get_mut(texture).ok_or(RenderError::InvalidTexture)?;
        texture.blend = mode;
        Ok(())
    }

    fn set_texture_color_mod(&mut self, texture: TextureId, color: Color) -> BackendResult<()> {
        let texture = self.textures.get_mut(texture).ok_or(RenderError::InvalidTexture)?;
        texture.color_mod = color;
        Ok(())
    }

    fn live_textures(&self) -> usize {
        self.textures.len()
    }

    fn read_pixels(&self) -> Option<RgbaImage> {
        Some(self.front.clone())
    }

    fn as_any(&self) -> &dyn std::any::Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn std::any::Any {
        self
    }
}

/// One texture copy, resolved to concrete rectangles
struct Blit {
    src: Rect,
    dst: Rect,
    angle: f64,
    /// Rotation pivot relative to the top-left of `dst`
    pivot: (f64, f64),
    flip: Flip,
}

impl Blit {
    fn run(&self, source: &SoftTexture, target: &mut RgbaImage) {
        let (sin, cos) = self.angle.to_radians().sin_cos();
        let (dw, dh) = (f64::from(self.dst.w), f64::from(self.dst.h));
        let (pivot_x, pivot_y) = (
            f64::from(self.dst.x) + self.pivot.0,
            f64::from(self.dst.y) + self.pivot.1,
        );

        // Screen-space bounding box of the rotated destination
        let corners = [(0.0, 0.0), (dw, 0.0), (0.0, dh), (dw, dh)].map(|(x, y)| {
            let (u, v) = (x - self.pivot.0, y - self.pivot.1);
            (pivot_x + u * cos - v * sin, pivot_y + u * sin + v * cos)
        });
        let min_x = corners.iter().map(|c| c.0).fold(f64::INFINITY, f64::min).floor().max(0.0);
        let min_y = corners.iter().map(|c| c.1).fold(f64::INFINITY, f64::min).floor().max(0.0);
        let max_x = corners.iter().map(|c| c.0).fold(f64::NEG_INFINITY, f64::max).ceil().min(f64::from(target.width()));
        let max_y = corners.iter().map(|c| c.1).fold(f64::NEG_INFINITY, f64::max).ceil().min(f64::from(target.height()));

        if min_x >= max_x || min_y >= max_y {
            return;
        }

        for py in (min_y as u32)..(max_y as u32) {
            for px in (min_x as u32)..(max_x as u32) {
                // Inverse-rotate the pixel center into destination space
                let u = f64::from(px) + 0.5 - pivot_x;
                let v = f64::from(py) + 0.5 - pivot_y;
                let local_x = u * cos + v * sin + self.pivot.0;
                let local_y = -u * sin + v * cos + self.pivot.1;

                if local_x < 0.0 || local_y < 0.0 || local_x >= dw || local_y >= dh {
                    continue;
                }

                let mut sx = ((local_x * f64::from(self.src.w) / dw) as u32).min(self.src.w - 1);
                let mut sy = ((local_y * f64::from(self.src.h) / dh) as u32).min(self.src.h - 1);
                if self.flip.contains(Flip::HORIZONTAL) {
                    sx = self.src.w - 1 - sx;
                }
                if self.flip.contains(Flip::VERTICAL) {
                    sy = self.src.h - 1 - sy;
                }

                let texel = source.pixels.get_pixel(self.src.x as u32 + sx, self.src.y as u32 + sy);
                let texel = modulate(texel.0, source.color_mod);
                blend(source.blend, texel, target.get_pixel_mut(px, py));
            }
        }
    }
}

fn read_pixel(image: &RgbaImage, x: u32, y: u32) -> Option<Color> {
    image.get_pixel_checked(x, y).map(|pixel| Color::from(pixel.0))
}

fn scale_channel(value: u8, factor: u8) -> u8 {
    (u32::from(value) * u32::from(factor) / 255) as u8
}

fn modulate([r, g, b, a]: [u8; 4], by: Color) -> [u8; 4] {
    [
        scale_channel(r, by.r),
        scale_channel(g, by.g),
        scale_channel(b, by.b),
        scale_channel(a, by.a),
    ]
}

fn blend(mode: BlendMode, src: [u8; 4], dst: &mut Rgba<u8>) {
    let alpha = u32::from(src[3]);
    match mode {
        BlendMode::None => dst.0 = src,
        BlendMode::Blend => {
            for channel in 0..3 {
                dst[channel] = ((u32::from(src[channel]) * alpha + u32::from(dst[channel]) * (255 - alpha)) / 255) as u8;
            }
            dst[3] = (alpha + u32::from(dst[3]) * (255 - alpha) / 255) as u8;
        }
        BlendMode::Add => {
            for channel in 0..3 {
                dst[channel] = (u32::from(src[channel]) * alpha / 255 + u32::from(dst[channel])).min(255) as u8;
            }
        }
        BlendMode::Mod => {
            for channel in 0..3 {
                dst[channel] = scale_channel(src[channel], dst[channel]);
            }
        }
    }
}

//! Presents software frames in a native window

use std::num::NonZeroU32;
use std::rc::Rc;
use std::time::{Duration, Instant};

use image::RgbaImage;
use softbuffer::{Context, SoftBufferError, Surface};
use winit::window::Window;

use crate::foundation::math::{Point, Rect};
use crate::render::api::{BackendResult, RenderBackend, RenderError, TextureId};
use crate::render::backends::software::SoftwareRenderer;
use crate::render::platform::PlatformError;
use crate::render::primitives::{BlendMode, Color, Flip};
use crate::render::surface::StagingSurface;

/// Shortest time between two presents when vsync is requested
const FRAME_INTERVAL: Duration = Duration::from_micros(16_667);

/// [`SoftwareRenderer`] whose presented frames are shown in a window
///
/// Drawing happens entirely in the wrapped renderer. `present` copies the
/// front buffer into the window's `softbuffer` surface, scaled to the
/// window's physical size.
pub struct WindowedRenderer {
    frame: SoftwareRenderer,
    window: Rc<Window>,
    surface: Surface<Rc<Window>, Rc<Window>>,
    last_present: Option<Instant>,
}

impl WindowedRenderer {
    /// Bind a `width` x `height` frame to `window`
    ///
    /// # Errors
    /// [`PlatformError::ContextCreationFailed`] if `softbuffer` cannot attach
    /// to the window.
    pub fn new(window: Rc<Window>, width: u32, height: u32, vsync: bool) -> Result<Self, PlatformError> {
        let context_error = |e: SoftBufferError| PlatformError::ContextCreationFailed(e.to_string());
        let context = Context::new(Rc::clone(&window)).map_err(context_error)?;
        let surface = Surface::new(&context, Rc::clone(&window)).map_err(context_error)?;

        Ok(Self {
            frame: SoftwareRenderer::new(width, height, vsync),
            window,
            surface,
            last_present: None,
        })
    }

    fn show(&mut self) -> Result<(), SoftBufferError> {
        let size = self.window.inner_size();
        // Minimized windows have no surface to fill
        let (Some(width), Some(height)) = (NonZeroU32::new(size.width), NonZeroU32::new(size.height)) else {
            return Ok(());
        };

        self.surface.resize(width, height)?;
        let mut buffer = self.surface.buffer_mut()?;
        scale_into(&mut buffer, size.width, size.height, self.frame.presented());
        buffer.present()
    }

    fn pace(&mut self) {
        if let Some(last) = self.last_present {
            let elapsed = last.elapsed();
            if elapsed < FRAME_INTERVAL {
                std::thread::sleep(FRAME_INTERVAL - elapsed);
            }
        }
        self.last_present = Some(Instant::now());
    }
}

impl RenderBackend for WindowedRenderer {
    fn output_size(&self) -> (u32, u32) {
        self.frame.output_size()
    }

    fn vsync_enabled(&self) -> bool {
        self.frame.vsync_enabled()
    }

    fn draw_color(&self) -> Color {
        self.frame.draw_color()
    }

    fn set_draw_color(&mut self, color: Color) {
        self.frame.set_draw_color(color);
    }

    fn clear(&mut self) -> BackendResult<()> {
        self.frame.clear()
    }

    fn present(&mut self) -> BackendResult<()> {
        self.frame.present()?;
        self.show()
            .map_err(|e| RenderError::RenderingFailed(format!("window present failed: {e}")))?;
        if self.frame.vsync_enabled() {
            self.pace();
        }
        Ok(())
    }

    fn create_texture_from_surface(&mut self, surface: &StagingSurface) -> BackendResult<TextureId> {
        self.frame.create_texture_from_surface(surface)
    }

    fn create_target_texture(&mut self, width: u32, height: u32) -> BackendResult<TextureId> {
        self.frame.create_target_texture(width, height)
    }

    fn destroy_texture(&mut self, texture: TextureId) {
        self.frame.destroy_texture(texture);
    }

    fn set_render_target(&mut self, target: Option<TextureId>) -> BackendResult<()> {
        self.frame.set_render_target(target)
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
        self.frame.copy_ex(texture, src, dst, angle, center, flip)
    }

    fn set_texture_blend_mode(&mut self, texture: TextureId, mode: BlendMode) -> BackendResult<()> {
        self.frame.set_texture_blend_mode(texture, mode)
    }

    fn set_texture_color_mod(&mut self, texture: TextureId, color: Color) -> BackendResult<()> {
        self.frame.set_texture_color_mod(texture, color)
    }

    fn live_textures(&self) -> usize {
        self.frame.live_textures()
    }

    fn read_pixels(&self) -> Option<RgbaImage> {
        self.frame.read_pixels()
    }

    fn as_any(&self) -> &dyn std::any::Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn std::any::Any {
        self
    }
}

/// Nearest-neighbour copy of `frame` into a `0RGB` buffer of `width` x `height`
fn scale_into(buffer: &mut [u32], width: u32, height: u32, frame: &RgbaImage) {
    let (frame_width, frame_height) = frame.dimensions();
    if frame_width == 0 || frame_height == 0 || width == 0 {
        return;
    }

    for (index, slot) in buffer.iter_mut().enumerate().take(width as usize * height as usize) {
        let (x, y) = ((index % width as usize) as u64, (index / width as usize) as u64);
        let source_x = (x * u64::from(frame_width) / u64::from(width)) as u32;
        let source_y = (y * u64::from(frame_height) / u64::from(height)) as u32;
        let [r, g, b, _] = frame.get_pixel(source_x, source_y).0;
        *slot = (u32::from(r) << 16) | (u32::from(g) << 8) | u32::from(b);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;

    #[test]
    fn test_pixels_are_packed_as_0rgb() {
        let frame = RgbaImage::from_pixel(1, 1, Rgba([0x12, 0x34, 0x56, 0x80]));
        let mut buffer = [0_u32; 1];
        scale_into(&mut buffer, 1, 1, &frame);
        assert_eq!(buffer, [0x0012_3456]);
    }

    #[test]
    fn test_frame_is_scaled_to_window() {
        let mut frame = RgbaImage::from_pixel(2, 2, Rgba([0, 0, 0, 0xFF]));
        frame.put_pixel(1, 0, Rgba([0xFF, 0, 0, 0xFF]));
        frame.put_pixel(0, 1, Rgba([0, 0, 0xFF, 0xFF]));

        // Twice the frame size, as on a 2x display
        let mut buffer = vec![0_u32; 16];
        scale_into(&mut buffer, 4, 4, &frame);

        assert_eq!(&buffer[0..4], &[0, 0, 0xFF_0000, 0xFF_0000]);
        assert_eq!(&buffer[4..8], &[0, 0, 0xFF_0000, 0xFF_0000]);
        assert_eq!(&buffer[8..12], &[0xFF, 0xFF, 0, 0]);
        assert_eq!(buffer[15], 0);
    }

    #[test]
    fn test_empty_frame_leaves_buffer_alone() {
        let frame = RgbaImage::new(0, 0);
        let mut buffer = [7_u32; 4];
        scale_into(&mut buffer, 2, 2, &frame);
        assert_eq!(buffer, [7; 4]);
    }
}

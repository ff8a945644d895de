//! Text rasterization
//!
//! Text drawables are produced by a [`TextShaper`], which turns a string into
//! a wrapped, colored staging surface. [`Font`] is the default shaper and
//! uses `fontdue` for pure Rust glyph rasterization and layout.

use std::path::Path;

use fontdue::layout::{CoordinateSystem, Layout, LayoutSettings, TextStyle};
use fontdue::FontSettings;
use image::{Rgba, RgbaImage};
use thiserror::Error;

use crate::render::primitives::Color;
use crate::render::surface::StagingSurface;

/// Width text is wrapped at when rasterized for a drawable
pub const TEXT_WRAP_WIDTH: u32 = 532;

/// Result type for font operations
pub type TextResult<T> = Result<T, TextError>;

/// Errors that can occur during text rasterization
#[derive(Error, Debug)]
pub enum TextError {
    /// Failed to load font from file or data
    #[error("Failed to load font: {0}")]
    LoadError(String),

    /// Reading the font file failed
    #[error("Failed to read font file: {0}")]
    Io(#[from] std::io::Error),

    /// The laid out text covers no pixels
    #[error("Text has zero width")]
    ZeroSize,
}

/// Rasterizes text into staging surfaces
pub trait TextShaper {
    /// Lay out `text` wrapped at `wrap_width` pixels and rasterize it in `color`
    ///
    /// # Errors
    /// Fails if the text covers no pixels or the shaper cannot rasterize it.
    fn shape(&self, text: &str, color: Color, wrap_width: u32) -> TextResult<StagingSurface>;
}

/// A TrueType/OpenType font at a fixed pixel size
pub struct Font {
    font: fontdue::Font,
    px: f32,
}

impl Font {
    /// Parse a font from raw bytes
    ///
    /// # Errors
    /// Fails if the bytes are not a font `fontdue` understands.
    pub fn from_bytes(bytes: &[u8], px: f32) -> TextResult<Self> {
        let font = fontdue::Font::from_bytes(bytes, FontSettings::default())
            .map_err(|e| TextError::LoadError(e.to_string()))?;
        Ok(Self { font, px })
    }

    /// Load a font file
    ///
    /// # Errors
    /// Fails if the file cannot be read or parsed.
    pub fn from_file(path: impl AsRef<Path>, px: f32) -> TextResult<Self> {
        let bytes = std::fs::read(path.as_ref())?;
        log::debug!("Loading font from {:?} at {}px", path.as_ref(), px);
        Self::from_bytes(&bytes, px)
    }
}

impl TextShaper for Font {
    fn shape(&self, text: &str, color: Color, wrap_width: u32) -> TextResult<StagingSurface> {
        let mut layout = Layout::new(CoordinateSystem::PositiveYDown);
        layout.reset(&LayoutSettings {
            max_width: Some(wrap_width as f32),
            ..LayoutSettings::default()
        });
        layout.append(&[&self.font], &TextStyle::new(text, self.px, 0));

        let width = layout
            .glyphs()
            .iter()
            .map(|glyph| glyph.x + glyph.width as f32)
            .fold(0.0_f32, f32::max)
            .ceil() as u32;
        let height = layout.height().ceil() as u32;

        if width == 0 || height == 0 {
            return Err(TextError::ZeroSize);
        }

        // Uncovered pixels keep the text color at zero alpha
        let mut pixels = RgbaImage::from_pixel(width, height, Rgba([color.r, color.g, color.b, 0]));

        for glyph in layout.glyphs() {
            if glyph.width == 0 || glyph.height == 0 {
                continue;
            }

            let (metrics, coverage) = self.font.rasterize_config(glyph.key);
            for row in 0..metrics.height {
                for col in 0..metrics.width {
                    let x = glyph.x.round() as i64 + col as i64;
                    let y = glyph.y.round() as i64 + row as i64;
                    if x < 0 || y < 0 || x >= i64::from(width) || y >= i64::from(height) {
                        continue;
                    }

                    let alpha = (u32::from(coverage[row * metrics.width + col]) * u32::from(color.a) / 255) as u8;
                    let pixel = pixels.get_pixel_mut(x as u32, y as u32);
                    pixel[3] = pixel[3].max(alpha);
                }
            }
        }

        log::debug!("Rasterized {} glyphs into {}x{}", layout.glyphs().len(), width, height);
        Ok(StagingSurface::from_image(pixels))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_font_bytes() {
        let result = Font::from_bytes(b"not a font at all", 16.0);
        assert!(matches!(result, Err(TextError::LoadError(_))));
    }

    #[test]
    fn test_missing_font_file() {
        let result = Font::from_file("no/such/font.ttf", 16.0);
        assert!(matches!(result, Err(TextError::Io(_))));
    }

    const MONO: &[u8] = include_bytes!("../../resources/fonts/DejaVuSansMono.ttf");

    fn mono() -> Font {
        Font::from_bytes(MONO, 16.0).unwrap()
    }

    #[test]
    fn test_short_text_fits_on_one_line() {
        let surface = mono().shape("Violet", Color::WHITE, TEXT_WRAP_WIDTH).unwrap();
        let (width, height) = surface.dimensions();

        assert!(width > 0 && width <= TEXT_WRAP_WIDTH);
        assert!(height > 0 && height < 40);
    }

    #[test]
    fn test_long_text_wraps_at_width() {
        let font = mono();
        let line = font.shape("wrap", Color::WHITE, TEXT_WRAP_WIDTH).unwrap();
        let paragraph = font
            .shape(&"wrap me around ".repeat(40), Color::WHITE, TEXT_WRAP_WIDTH)
            .unwrap();

        assert!(paragraph.width() <= TEXT_WRAP_WIDTH);
        assert!(paragraph.width() > line.width());
        assert!(paragraph.height() >= 3 * line.height());
    }

    #[test]
    fn test_glyph_coverage_becomes_alpha() {
        let color = Color::rgba(0x8F, 0x00, 0xFF, 0xFF);
        let surface = mono().shape("M", color, TEXT_WRAP_WIDTH).unwrap();
        let pixels = surface.pixels();

        assert!(pixels.pixels().any(|p| p[3] > 0));
        assert!(pixels.pixels().any(|p| p[3] == 0));
        assert!(pixels.pixels().all(|p| p[0] == 0x8F && p[1] == 0x00 && p[2] == 0xFF));
    }

    #[test]
    fn test_empty_text_has_zero_size() {
        assert!(matches!(
            mono().shape("", Color::WHITE, TEXT_WRAP_WIDTH),
            Err(TextError::ZeroSize)
        ));
    }

    #[test]
    fn test_font_file_loads() {
        let path = concat!(env!("CARGO_MANIFEST_DIR"), "/resources/fonts/DejaVuSansMono.ttf");
        let font = Font::from_file(path, 24.0).unwrap();
        assert!(font.shape("ok", Color::BLACK, TEXT_WRAP_WIDTH).is_ok());
    }
}

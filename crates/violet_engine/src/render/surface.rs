//! Staging surfaces
//!
//! A staging surface is the CPU-side pixel buffer produced by image decoding
//! or text rasterization. It is converted into a backend texture and then
//! discarded, so it is also the only place a texture's size can be read from.

use crate::render::primitives::Color;
use image::{Rgba, RgbaImage};

/// An RGB value that becomes fully transparent on conversion
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ColorKey {
    /// Red channel
    pub r: u8,
    /// Green channel
    pub g: u8,
    /// Blue channel
    pub b: u8,
}

impl ColorKey {
    /// The conventional sprite-sheet key, a saturated magenta
    pub const DEFAULT: Self = Self::new(0xFF, 0x00, 0xDC);

    /// Create a color key
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    fn matches(self, pixel: &Rgba<u8>) -> bool {
        pixel[0] == self.r && pixel[1] == self.g && pixel[2] == self.b
    }
}

impl Default for ColorKey {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// Intermediate RGBA pixel buffer
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StagingSurface {
    pixels: RgbaImage,
}

impl StagingSurface {
    /// Wrap decoded pixels
    pub const fn from_image(pixels: RgbaImage) -> Self {
        Self { pixels }
    }

    /// A surface filled with one color (useful for testing and defaults)
    pub fn solid(width: u32, height: u32, color: Color) -> Self {
        Self::from_image(RgbaImage::from_pixel(width, height, Rgba(color.to_array())))
    }

    /// Width in pixels
    pub fn width(&self) -> u32 {
        self.pixels.width()
    }

    /// Height in pixels
    pub fn height(&self) -> u32 {
        self.pixels.height()
    }

    /// Width and height in pixels
    pub fn dimensions(&self) -> (u32, u32) {
        self.pixels.dimensions()
    }

    /// Underlying pixel buffer
    pub const fn pixels(&self) -> &RgbaImage {
        &self.pixels
    }

    /// Make every pixel matching `key` fully transparent
    pub fn apply_color_key(&mut self, key: ColorKey) {
        for pixel in self.pixels.pixels_mut() {
            if key.matches(pixel) {
                pixel[3] = 0;
            }
        }
    }
}

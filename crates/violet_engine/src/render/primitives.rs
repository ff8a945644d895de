//! Color, blending and mirroring primitives shared by every backend

use bitflags::bitflags;

/// An 8-bit RGBA color
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Color {
    /// Red channel
    pub r: u8,
    /// Green channel
    pub g: u8,
    /// Blue channel
    pub b: u8,
    /// Alpha channel, 255 is opaque
    pub a: u8,
}

impl Color {
    /// Opaque white, the baseline draw color
    pub const WHITE: Self = Self::rgb(0xFF, 0xFF, 0xFF);
    /// Opaque black
    pub const BLACK: Self = Self::rgb(0x00, 0x00, 0x00);
    /// Fully transparent black
    pub const TRANSPARENT: Self = Self::rgba(0, 0, 0, 0);

    /// Opaque color from RGB channels
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 0xFF }
    }

    /// Color from RGBA channels
    pub const fn rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// Channels as an array, RGBA order
    pub const fn to_array(self) -> [u8; 4] {
        [self.r, self.g, self.b, self.a]
    }
}

impl From<[u8; 4]> for Color {
    fn from([r, g, b, a]: [u8; 4]) -> Self {
        Self::rgba(r, g, b, a)
    }
}

/// How a texture is combined with the pixels underneath it
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum BlendMode {
    /// Overwrite the destination
    None,
    /// Alpha blending
    #[default]
    Blend,
    /// Additive blending
    Add,
    /// Color modulation
    Mod,
}

bitflags! {
    /// Mirroring applied when copying a texture
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct Flip: u8 {
        /// Mirror left to right
        const HORIZONTAL = 0b01;
        /// Mirror top to bottom
        const VERTICAL = 0b10;
    }
}

impl Flip {
    /// No mirroring
    pub const NONE: Self = Self::empty();
}

//! Image loading utilities for texture data
//!
//! Provides PNG and JPEG loading into staging surfaces through the `image`
//! crate.

use std::path::Path;
use crate::assets::AssetError;
use crate::render::surface::StagingSurface;

/// Decodes image files into staging surfaces
pub trait ImageDecoder {
    /// Decode the file at `path`
    ///
    /// # Errors
    /// Fails if the file is missing or cannot be decoded.
    fn decode(&self, path: &Path) -> Result<StagingSurface, AssetError>;
}

/// Decoder backed by the `image` crate
#[derive(Debug, Default, Clone, Copy)]
pub struct ImageCrateDecoder;

impl ImageCrateDecoder {
    /// Formats this decoder must be able to read
    pub const REQUIRED_FORMATS: [image::ImageFormat; 2] = [image::ImageFormat::Png, image::ImageFormat::Jpeg];

    /// Formats from [`Self::REQUIRED_FORMATS`] that were compiled out
    pub fn missing_formats() -> Vec<image::ImageFormat> {
        Self::REQUIRED_FORMATS
            .into_iter()
            .filter(|format| !format.reading_enabled())
            .collect()
    }

    /// Load image from memory (useful for embedded resources)
    ///
    /// # Errors
    /// Fails if the bytes are not a supported image.
    pub fn decode_bytes(&self, bytes: &[u8]) -> Result<StagingSurface, AssetError> {
        let img = image::load_from_memory(bytes)
            .map_err(|e| AssetError::LoadFailed(format!("Failed to load image from bytes: {e}")))?;

        let rgba_img = img.to_rgba8();
        log::debug!("Loaded image {}x{} from memory", rgba_img.width(), rgba_img.height());

        Ok(StagingSurface::from_image(rgba_img))
    }
}

impl ImageDecoder for ImageCrateDecoder {
    fn decode(&self, path: &Path) -> Result<StagingSurface, AssetError> {
        log::debug!("Loading image from: {:?}", path);

        if !path.exists() {
            return Err(AssetError::NotFound(path.to_path_buf()));
        }

        let img = image::open(path)
            .map_err(|e| AssetError::LoadFailed(format!("Failed to load image {}: {e}", path.display())))?;

        // Staging surfaces are always RGBA8
        let rgba_img = img.to_rgba8();
        log::info!("Loaded image {}x{} from {:?}", rgba_img.width(), rgba_img.height(), path);

        Ok(StagingSurface::from_image(rgba_img))
    }
}

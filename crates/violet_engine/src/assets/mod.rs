//! Asset loading
//!
//! Only image decoding lives here. Resolving where an asset lives on disk is
//! left to the caller; paths are taken as given.

pub mod image_loader;

pub use image_loader::{ImageDecoder, ImageCrateDecoder};

use std::path::PathBuf;
use thiserror::Error;

/// Asset loading errors
#[derive(Error, Debug)]
pub enum AssetError {
    /// The file does not exist
    #[error("Asset not found: {0:?}")]
    NotFound(PathBuf),

    /// The file exists but could not be decoded
    #[error("Failed to load asset: {0}")]
    LoadFailed(String),

    /// No decoder is installed on the drawing context
    #[error("Image subsystem is not initialized")]
    DecoderUnavailable,
}

//! Library subsystems brought up against the drawing context
//!
//! The engine initializes subsystems in order once the drawing context
//! exists and shuts them down in reverse order before the context is closed.

use crate::assets::ImageCrateDecoder;
use crate::render::context::DrawingContext;
use crate::render::platform::PlatformError;

/// A library that must be initialized before drawables can use it
pub trait Subsystem {
    /// Name used in logs and errors
    fn name(&self) -> &str;

    /// Bring the subsystem up against `context`
    ///
    /// # Errors
    /// Returns [`PlatformError::SubsystemInitFailed`] on failure.
    fn initialize(&mut self, context: &DrawingContext) -> Result<(), PlatformError>;

    /// Release whatever `initialize` acquired
    fn shutdown(&mut self, context: &DrawingContext);
}

/// Image decoding (PNG and JPEG)
#[derive(Debug, Default)]
pub struct ImageSubsystem;

impl Subsystem for ImageSubsystem {
    fn name(&self) -> &str {
        "image"
    }

    fn initialize(&mut self, context: &DrawingContext) -> Result<(), PlatformError> {
        let missing = ImageCrateDecoder::missing_formats();
        if !missing.is_empty() {
            return Err(PlatformError::SubsystemInitFailed {
                subsystem: self.name().to_string(),
                reason: format!("decoders not available for {missing:?}"),
            });
        }

        context.install_decoder(Box::new(ImageCrateDecoder));
        log::debug!("Image subsystem ready");
        Ok(())
    }

    fn shutdown(&mut self, context: &DrawingContext) {
        if context.remove_decoder().is_some() {
            log::debug!("Image subsystem shut down");
        }
    }
}

/// Text rasterization
///
/// Fonts carry their own rasterizer, so there is nothing to acquire; the
/// subsystem exists to keep bring-up and teardown ordering explicit.
#[derive(Debug, Default)]
pub struct TextSubsystem {
    active: bool,
}

impl TextSubsystem {
    /// Whether the subsystem is between `initialize` and `shutdown`
    pub const fn is_active(&self) -> bool {
        self.active
    }
}

impl Subsystem for TextSubsystem {
    fn name(&self) -> &str {
        "text"
    }

    fn initialize(&mut self, _context: &DrawingContext) -> Result<(), PlatformError> {
        self.active = true;
        log::debug!("Text subsystem ready");
        Ok(())
    }

    fn shutdown(&mut self, _context: &DrawingContext) {
        if std::mem::take(&mut self.active) {
            log::debug!("Text subsystem shut down");
        }
    }
}

/// The subsystems every engine starts with
pub fn default_subsystems() -> Vec<Box<dyn Subsystem>> {
    vec![Box::new(ImageSubsystem), Box::new(TextSubsystem::default())]
}

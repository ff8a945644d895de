//! Game trait and lifecycle hooks
//!
//! The engine owns one [`Game`] and calls into it at fixed points of its
//! lifecycle. The game owns its drawables; the engine drops the game before
//! closing the drawing context, so no drawable outlives it.

use std::cell::Cell;
use std::rc::Rc;

use thiserror::Error;

use crate::assets::AssetError;
use crate::debug::{Diagnostics, FatalError};
use crate::input::{InputState, WindowEvent};
use crate::render::{DrawableError, DrawingContext};

/// Game lifecycle trait
///
/// Implement this trait to plug game logic into the engine. Every hook has
/// a no-op default.
pub trait Game {
    /// Load the game's resources
    ///
    /// Called once after the drawing context and subsystems are up. Any
    /// error stops the engine before the first frame.
    ///
    /// # Errors
    /// Whatever prevents the game from starting.
    fn load_resources(&mut self, _context: &DrawingContext, _diagnostics: &Diagnostics) -> Result<(), AppError> {
        Ok(())
    }

    /// Called for every window event, after the engine has handled it
    ///
    /// # Errors
    /// [`AppError::Fatal`] stops the engine after the current frame; any
    /// other error is reported and the frame goes on.
    fn handle_event(&mut self, _event: &WindowEvent, _stop: &StopHandle) -> Result<(), AppError> {
        Ok(())
    }

    /// Advance the game by one frame
    ///
    /// # Errors
    /// Same handling as [`Game::handle_event`].
    fn update(&mut self, _frame: &FrameContext<'_>) -> Result<(), AppError> {
        Ok(())
    }

    /// Issue draw calls for the current frame
    ///
    /// # Errors
    /// Same handling as [`Game::handle_event`].
    fn render(&mut self, _context: &DrawingContext) -> Result<(), AppError> {
        Ok(())
    }

    /// Called once before the game is dropped during teardown
    fn cleanup(&mut self) {}
}

/// Placeholder game that does nothing
#[derive(Debug, Default, Clone, Copy)]
pub struct IdleGame;

impl Game for IdleGame {}

/// What the game sees during `update`
pub struct FrameContext<'a> {
    /// Index of the frame being produced, starting at zero
    pub frame: u64,
    /// Input state after this frame's events
    pub input: &'a InputState,
    /// Handle to stop the engine
    pub stop: &'a StopHandle,
    /// Diagnostics channel
    pub diagnostics: &'a Diagnostics,
}

/// Shared execution flag
///
/// Cloned into whatever needs to end the frame loop. Stopping takes effect
/// at the top of the next iteration.
#[derive(Debug, Clone)]
pub struct StopHandle {
    running: Rc<Cell<bool>>,
}

impl StopHandle {
    /// A flag in the running state
    pub fn new() -> Self {
        Self {
            running: Rc::new(Cell::new(true)),
        }
    }

    /// Whether the loop should keep going
    pub fn is_running(&self) -> bool {
        self.running.get()
    }

    /// Clear the flag; idempotent
    pub fn stop(&self) {
        self.running.set(false);
    }

    /// Stop on behalf of `requester`, logging who asked
    pub fn request_stop(&self, requester: &str) {
        log::info!("{requester} has called for the application to be terminated!");
        self.stop();
    }
}

impl Default for StopHandle {
    fn default() -> Self {
        Self::new()
    }
}

/// Game-level errors
#[derive(Error, Debug)]
pub enum AppError {
    /// An irrecoverable diagnostic was raised
    #[error("Fatal error: {0}")]
    Fatal(#[from] FatalError),

    /// A drawable could not be created
    #[error("Drawable error: {0}")]
    Drawable(#[from] DrawableError),

    /// An asset could not be loaded
    #[error("Asset error: {0}")]
    Asset(#[from] AssetError),

    /// Custom game error
    #[error("Application error: {0}")]
    Custom(String),
}

//! Core engine implementation
//!
//! The [`Engine`] owns the display surface and the drawing context and
//! sequences everything that touches them: platform bring-up, subsystem
//! initialization, resource loading, the frame loop and teardown.
//!
//! ```text
//! Uninitialized ──► Initializing ──► Running ──► Stopping ──► Terminated
//!                        │                                        ▲
//!                        └──────────── setup failed ──────────────┘
//! ```
//!
//! Resources are acquired in the order surface, context, subsystems and
//! released in reverse. The game (and every drawable it owns) is dropped
//! before the context is closed.

use std::path::{Path, PathBuf};
use std::rc::Rc;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::application::{AppError, FrameContext, Game, StopHandle};
use crate::config::Config;
use crate::debug::{BackendSource, Diagnostics, FatalError, Severity};
use crate::input::{InputState, WindowEvent};
use crate::render::{
    default_subsystems, Color, DrawingContext, Platform, PlatformError, RendererOptions, Subsystem,
    WindowConfig, WindowHandle,
};

/// Engine errors
#[derive(Error, Debug)]
pub enum EngineError {
    /// Setup raised an irrecoverable diagnostic
    #[error("Fatal error: {0}")]
    Fatal(#[from] FatalError),

    /// No frame has been presented, or the context is gone
    #[error("No presented frame is available")]
    NoFrame,

    /// Writing the screenshot failed
    #[error("Failed to save screenshot: {0}")]
    Screenshot(#[from] image::ImageError),
}

/// Diagnostics settings
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DiagnosticsConfig {
    /// Events below this severity are dropped
    pub min_severity: Severity,

    /// Append diagnostics to this file while the engine runs
    pub log_file: Option<PathBuf>,
}

/// Engine configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Display surface settings
    pub window: WindowConfig,

    /// Diagnostics settings
    pub diagnostics: DiagnosticsConfig,

    /// Stop after this many frames
    pub frame_limit: Option<u64>,

    /// Save the last presented frame here on shutdown
    pub screenshot: Option<PathBuf>,
}

impl Config for EngineConfig {}

/// Lifecycle state of the engine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EngineState {
    /// Nothing acquired yet
    Uninitialized,
    /// Acquiring the surface, context and subsystems
    Initializing,
    /// Inside the frame loop
    Running,
    /// Frame loop left, teardown pending
    Stopping,
    /// Every resource released
    Terminated,
}

/// Main engine struct
///
/// Owns the display surface, the drawing context and the game.
pub struct Engine<G: Game> {
    config: EngineConfig,
    platform: Box<dyn Platform>,
    subsystems: Vec<Box<dyn Subsystem>>,
    initialized_subsystems: usize,
    game: Option<G>,
    diagnostics: Rc<Diagnostics>,
    window: Option<WindowHandle>,
    context: Option<DrawingContext>,
    running: StopHandle,
    state: EngineState,
    input: InputState,
    frames: u64,
    fatal: Option<FatalError>,
}

impl<G: Game> Engine<G> {
    /// Create an engine that has not acquired anything yet
    pub fn new(config: EngineConfig, platform: Box<dyn Platform>, game: G) -> Self {
        let diagnostics = Diagnostics::default();
        diagnostics.set_min_severity(config.diagnostics.min_severity);

        Self {
            config,
            platform,
            subsystems: default_subsystems(),
            initialized_subsystems: 0,
            game: Some(game),
            diagnostics: Rc::new(diagnostics),
            window: None,
            context: None,
            running: StopHandle::new(),
            state: EngineState::Uninitialized,
            input: InputState::new(),
            frames: 0,
            fatal: None,
        }
    }

    /// Report through `diagnostics` instead of the `log` facade
    #[must_use]
    pub fn with_diagnostics(mut self, diagnostics: Diagnostics) -> Self {
        diagnostics.set_min_severity(self.config.diagnostics.min_severity);
        self.diagnostics = Rc::new(diagnostics);
        self
    }

    /// Replace the subsystems brought up during initialization
    #[must_use]
    pub fn with_subsystems(mut self, subsystems: Vec<Box<dyn Subsystem>>) -> Self {
        self.subsystems = subsystems;
        self
    }

    /// Acquire the display surface, the drawing context and the subsystems
    ///
    /// Returns immediately if everything is already up. Whatever was
    /// acquired before a failure stays owned and is released by teardown.
    ///
    /// # Errors
    /// Surface, context or subsystem failures from the platform.
    pub fn initialize(&mut self) -> Result<(), PlatformError> {
        if self.is_initialized() {
            return Ok(());
        }
        if self.state != EngineState::Uninitialized {
            return Err(PlatformError::SurfaceCreationFailed(format!(
                "initialization cannot be repeated from the {:?} state",
                self.state
            )));
        }

        self.state = EngineState::Initializing;
        log::info!("Initializing {} platform", self.platform.name());

        let window = self.window.insert(self.platform.create_window(&self.config.window)?);
        log::debug!("Created display surface {:?} {:?}", window.title(), window.size());

        let options = RendererOptions::new()
            .with_vsync(self.config.window.vsync)
            .with_baseline_color(Color::WHITE);
        let backend = self.platform.create_renderer(window, &options)?;
        let context = self.context.insert(DrawingContext::new(backend, options.baseline_color));

        for subsystem in &mut self.subsystems {
            subsystem.initialize(context)?;
            self.initialized_subsystems += 1;
            log::debug!("Subsystem {} initialized", subsystem.name());
        }

        log::info!("Engine initialized");
        Ok(())
    }

    /// Let the game load its resources
    ///
    /// # Errors
    /// The game's error, or [`AppError::Custom`] if the engine is not
    /// initialized.
    pub fn load_resources(&mut self) -> Result<(), AppError> {
        let (Some(context), Some(game)) = (&self.context, self.game.as_mut()) else {
            return Err(AppError::Custom("the drawing context is not initialized".to_string()));
        };
        game.load_resources(context, &self.diagnostics)
    }

    /// Run both setup steps, escalating any failure as irrecoverable
    ///
    /// # Errors
    /// [`EngineError::Fatal`] when either step fails.
    pub fn start(&mut self) -> Result<(), EngineError> {
        if let Err(e) = self.initialize() {
            return Err(self.diagnostics.fatal(format!("Failed to initialize the engine: {e}")).into());
        }

        match self.load_resources() {
            Ok(()) => Ok(()),
            Err(AppError::Fatal(fatal)) => Err(fatal.into()),
            Err(e) => Err(self.diagnostics.fatal(format!("Failed to load resources: {e}")).into()),
        }
    }

    /// Set up, run the frame loop until stopped, then tear down
    ///
    /// Returns `false` if and only if setup failed. A fatal error raised by
    /// the game inside the frame loop ends the loop after the current frame
    /// and is logged here.
    pub fn run(&mut self) -> bool {
        if self.state == EngineState::Terminated {
            log::warn!("Engine has already been torn down");
            return false;
        }

        let diagnostics = Rc::clone(&self.diagnostics);
        let _file_logging = self.config.diagnostics.log_file.as_ref().and_then(|path| {
            diagnostics
                .log_to_file(path)
                .map_err(|e| log::warn!("Unable to log diagnostics to {path:?}: {e}"))
                .ok()
        });

        let succeeded = match self.start() {
            Ok(()) => {
                if let Err(fatal) = self.frame_loop() {
                    log::error!("Engine stopped by a fatal error: {fatal}");
                }
                if let Some(path) = self.config.screenshot.clone() {
                    match self.save_screenshot(&path) {
                        Ok(()) => log::info!("Saved screenshot to {path:?}"),
                        Err(e) => log::warn!("{e}"),
                    }
                }
                true
            }
            Err(e) => {
                log::error!("Engine setup failed: {e}");
                self.stop();
                false
            }
        };

        self.teardown();
        succeeded
    }

    fn frame_loop(&mut self) -> Result<(), FatalError> {
        self.state = EngineState::Running;
        log::info!("Starting main loop...");

        while self.running.is_running() {
            self.handle_input();
            self.update();
            self.render_frame();

            if self.config.frame_limit.is_some_and(|limit| self.frames >= limit) {
                self.running.request_stop("Frame limit");
            }
        }

        self.state = EngineState::Stopping;
        log::info!("Main loop finished after {} frames", self.frames);
        self.fatal.take().map_or(Ok(()), Err)
    }

    /// Route a game hook's error
    ///
    /// A fatal error stops the engine and is kept for [`Engine::run`];
    /// anything else is reported and the frame goes on.
    fn absorb(&mut self, hook: &str, result: Result<(), AppError>) {
        match result {
            Ok(()) => {}
            Err(AppError::Fatal(fatal)) => {
                self.stop();
                self.fatal.get_or_insert(fatal);
            }
            Err(e) => self.diagnostics.report_error(format!("Game {hook} failed: {e}")),
        }
    }

    /// End the frame loop at the top of the next iteration
    pub fn stop(&self) {
        if self.running.is_running() {
            log::debug!("Engine stop requested");
        }
        self.running.stop();
    }

    /// Handle that stops this engine
    pub fn stop_handle(&self) -> StopHandle {
        self.running.clone()
    }

    /// Drain every pending window event
    ///
    /// A quit event stops the engine; every event is then passed on to the
    /// game.
    pub fn handle_input(&mut self) {
        let Some(window) = self.window.as_mut() else {
            return;
        };

        for event in window.poll_events() {
            self.input.apply(&event);
            if event == WindowEvent::Quit {
                self.stop();
            }
            if let Some(game) = self.game.as_mut() {
                let handled = game.handle_event(&event, &self.running);
                self.absorb("event handling", handled);
            }
        }
    }

    /// Advance the game by one frame
    pub fn update(&mut self) {
        if let Some(game) = self.game.as_mut() {
            let frame = FrameContext {
                frame: self.frames,
                input: &self.input,
                stop: &self.running,
                diagnostics: &self.diagnostics,
            };
            let updated = game.update(&frame);
            self.absorb("update", updated);
        }
    }

    /// Clear to the baseline color, let the game draw, present
    ///
    /// The back buffer is cleared again after presenting so the next frame
    /// starts blank.
    pub fn render_frame(&mut self) {
        let Some(context) = &self.context else {
            return;
        };

        let baseline = context.baseline_color();
        let cleared = context.with_backend(|backend| {
            backend.set_draw_color(baseline);
            backend.clear()
        });
        if let Err(e) = cleared {
            self.diagnostics.report_backend(BackendSource::Platform, e);
        }

        let rendered = match self.game.as_mut() {
            Some(game) => game.render(context),
            None => Ok(()),
        };

        let presented = context.with_backend(|backend| {
            backend.present()?;
            backend.clear()
        });
        match presented {
            Ok(()) => self.frames += 1,
            Err(e) => self.diagnostics.report_backend(BackendSource::Platform, e),
        }

        self.absorb("render", rendered);
    }

    /// Write the last presented frame to `path` as an image
    ///
    /// # Errors
    /// [`EngineError::NoFrame`] without a live context, or the encoder error.
    pub fn save_screenshot(&self, path: &Path) -> Result<(), EngineError> {
        let context = self.context.as_ref().ok_or(EngineError::NoFrame)?;
        let frame = context
            .with_backend(|backend| Ok(backend.read_pixels()))
            .ok()
            .flatten()
            .ok_or(EngineError::NoFrame)?;
        frame.save(path)?;
        Ok(())
    }

    /// Release everything in reverse acquisition order
    ///
    /// Each step is skipped if its resource was never acquired. Safe to call
    /// more than once; also runs on drop.
    pub fn teardown(&mut self) {
        if self.state == EngineState::Terminated {
            return;
        }
        self.running.stop();

        if let Some(mut game) = self.game.take() {
            game.cleanup();
        }

        if let Some(context) = &self.context {
            for subsystem in self.subsystems[..self.initialized_subsystems].iter_mut().rev() {
                subsystem.shutdown(context);
                log::debug!("Subsystem {} shut down", subsystem.name());
            }
        }
        self.initialized_subsystems = 0;

        if let Some(context) = self.context.take() {
            let stray = context.holder_count() - 1;
            if stray > 0 {
                log::warn!("{stray} drawing context holders outlived the engine");
            }
            drop(context.close());
            log::debug!("Drawing context closed");
        }

        if self.window.take().is_some() {
            log::debug!("Display surface destroyed");
        }

        self.state = EngineState::Terminated;
        log::info!("Engine shutdown complete");
    }

    /// Current lifecycle state
    pub const fn state(&self) -> EngineState {
        self.state
    }

    /// Whether the surface, context and every subsystem are up
    pub fn is_initialized(&self) -> bool {
        self.context.is_some() && self.initialized_subsystems == self.subsystems.len()
    }

    /// Drawing context, if initialized
    pub const fn context(&self) -> Option<&DrawingContext> {
        self.context.as_ref()
    }

    /// Display surface, if initialized
    pub const fn window(&self) -> Option<&WindowHandle> {
        self.window.as_ref()
    }

    /// The game, until teardown drops it
    pub const fn game(&self) -> Option<&G> {
        self.game.as_ref()
    }

    /// Diagnostics channel
    pub fn diagnostics(&self) -> &Diagnostics {
        &self.diagnostics
    }

    /// Current input state
    pub const fn input(&self) -> &InputState {
        &self.input
    }

    /// Frames presented so far
    pub const fn frames_rendered(&self) -> u64 {
        self.frames
    }

    /// Engine configuration
    pub const fn config(&self) -> &EngineConfig {
        &self.config
    }
}

impl<G: Game> Drop for Engine<G> {
    fn drop(&mut self) {
        self.teardown();
    }
}

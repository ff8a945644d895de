//! # Violet Engine
//!
//! A small 2D application shell. The engine owns one display surface and
//! the drawing context bound to it, and drives a game through a fixed
//! lifecycle: platform bring-up, resource loading, the frame loop, and
//! teardown in reverse acquisition order.
//!
//! ## Features
//!
//! - **Drawables**: images, rasterized text and filled rectangles behind one
//!   draw call
//! - **Diagnostics**: severity-classified reports, with irrecoverable ones
//!   stopping the engine cleanly
//! - **Backends**: CPU rendering, headless for tools and tests or presented
//!   in a native window
//! - **Configuration**: TOML or RON engine settings
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use violet_engine::prelude::*;
//! use violet_engine::render::backends::windowed::WindowedPlatform;
//!
//! struct MyGame {
//!     square: Drawable,
//! }
//!
//! impl Game for MyGame {
//!     fn load_resources(&mut self, context: &DrawingContext, _diagnostics: &Diagnostics) -> Result<(), AppError> {
//!         self.square.create_from_rect(32, 32, Color::rgb(0x80, 0x00, 0xFF), context)?;
//!         Ok(())
//!     }
//!
//!     fn render(&mut self, _context: &DrawingContext) -> Result<(), AppError> {
//!         self.square.render(100, 100, &RenderParams::default());
//!         Ok(())
//!     }
//! }
//!
//! fn main() {
//!     let game = MyGame { square: Drawable::new() };
//!     let mut engine = Engine::new(EngineConfig::default(), Box::new(WindowedPlatform::new()), game);
//!     std::process::exit(if engine.run() { 0 } else { 1 });
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
#![allow(clippy::module_name_repetitions, clippy::similar_names, clippy::too_many_arguments)]

pub mod foundation;
pub mod config;
pub mod debug;
pub mod assets;
pub mod render;
pub mod input;

mod application;
mod engine;
mod engine_tests;

pub use application::{AppError, FrameContext, Game, IdleGame, StopHandle};
pub use engine::{DiagnosticsConfig, Engine, EngineConfig, EngineError, EngineState};

/// Common imports for engine users
pub mod prelude {
    pub use crate::{
        AppError, FrameContext, Game, IdleGame, StopHandle,
        Engine, EngineConfig, EngineError, EngineState,
        config::Config,
        debug::{Diagnostics, Severity},
        foundation::math::{Point, Rect},
        render::{
            BlendMode, Color, ColorKey, Drawable, DrawingContext, Flip, Font, RenderParams,
            TextShaper,
        },
        input::{InputState, KeyCode, MouseButton, WindowEvent},
    };
}

//! Violet showcase application
//!
//! Opens a window and runs a small scene: a banner, a spinning square and,
//! when a font is supplied, a caption. Close the window or press Escape to
//! quit.
//!
//! Usage: `violet [config.toml|config.ron] [font.ttf]`

use std::path::PathBuf;
use std::process::ExitCode;

use violet_engine::foundation::logging;
use violet_engine::prelude::*;
use violet_engine::render::backends::windowed::WindowedPlatform;

/// Degrees the square turns every frame
const SPIN_PER_FRAME: f64 = 3.0;

struct Showcase {
    font_path: Option<PathBuf>,
    banner: Drawable,
    square: Drawable,
    caption: Drawable,
    angle: f64,
}

impl Showcase {
    fn new(font_path: Option<PathBuf>) -> Self {
        Self {
            font_path,
            banner: Drawable::new(),
            square: Drawable::new(),
            caption: Drawable::new(),
            angle: 0.0,
        }
    }
}

impl Game for Showcase {
    fn load_resources(&mut self, context: &DrawingContext, diagnostics: &Diagnostics) -> Result<(), AppError> {
        self.banner.create_from_rect(750, 96, Color::rgb(0x3B, 0x1F, 0x5C), context)?;
        self.square.create_from_rect(128, 128, Color::rgb(0x8F, 0x00, 0xFF), context)?;
        self.square.set_blend_mode(BlendMode::Blend);
        self.square.set_color_modulation(0xFF, 0xFF, 0xFF, 0xC0);

        if let Some(path) = &self.font_path {
            match Font::from_file(path, 28.0) {
                Ok(font) => {
                    self.caption.create_from_text("Project Violet", &font, Color::WHITE, context)?;
                }
                Err(e) => diagnostics.report(format!("Unable to load font {path:?}: {e}"), Severity::Warning)?,
            }
        }

        log::info!("Showcase resources loaded");
        Ok(())
    }

    fn handle_event(&mut self, event: &WindowEvent, stop: &StopHandle) -> Result<(), AppError> {
        if *event == WindowEvent::KeyDown(KeyCode::Escape) {
            stop.request_stop("Showcase");
        }
        Ok(())
    }

    fn update(&mut self, _frame: &FrameContext<'_>) -> Result<(), AppError> {
        self.angle = (self.angle + SPIN_PER_FRAME) % 360.0;
        Ok(())
    }

    fn render(&mut self, _context: &DrawingContext) -> Result<(), AppError> {
        self.banner.render(0, 0, &RenderParams::default());
        self.caption.render(24, 32, &RenderParams::default());
        self.square
            .render(311, 311, &RenderParams::default().with_rotation(self.angle, None));
        Ok(())
    }
}

fn main() -> ExitCode {
    logging::init();

    let mut args = std::env::args_os().skip(1);
    let config_path = args.next().map(PathBuf::from);
    let font_path = args.next().map(PathBuf::from);

    let config = match &config_path {
        Some(path) => match EngineConfig::load_or_default(path) {
            Ok(config) => config,
            Err(e) => {
                log::error!("Invalid configuration {path:?}: {e}");
                return ExitCode::FAILURE;
            }
        },
        None => EngineConfig::default(),
    };

    log::info!("Starting {}", config.window.title);
    let mut engine = Engine::new(config, Box::new(WindowedPlatform::new()), Showcase::new(font_path));

    if engine.run() {
        log::info!("Showcase completed after {} frames", engine.frames_rendered());
        ExitCode::SUCCESS
    } else {
        log::error!("Showcase failed to start");
        ExitCode::FAILURE
    }
}

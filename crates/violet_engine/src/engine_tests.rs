//! Tests for the engine lifecycle against the software platform

#[cfg(test)]
mod tests {
    use super::super::*;
    use crate::config::Config;
    use crate::debug::{BufferSink, Diagnostics, Severity};
    use crate::input::{KeyCode, WindowEvent};
    use crate::render::backends::software::SoftwarePlatform;
    use crate::render::{
        Color, Drawable, DrawingContext, ImageSubsystem, PlatformError, RenderParams, Subsystem,
        WindowConfig,
    };
    use approx::assert_relative_eq;
    use std::cell::RefCell;
    use std::path::PathBuf;
    use std::rc::Rc;

    type Journal = Rc<RefCell<Vec<String>>>;

    fn small_config() -> EngineConfig {
        EngineConfig {
            window: WindowConfig {
                width: 64,
                height: 64,
                ..WindowConfig::default()
            },
            ..EngineConfig::default()
        }
    }

    fn temp_path(name: &str) -> PathBuf {
        std::env::temp_dir().join(format!("violet_engine_{}_{name}", std::process::id()))
    }

    /// Records every lifecycle hook and draws a red square each frame
    struct JournalGame {
        journal: Journal,
        square: Drawable,
        stop_after: Option<u64>,
        fatal_on_load: bool,
        fatal_on_frame: Option<u64>,
        failing_update: bool,
        leaked_context: Rc<RefCell<Option<DrawingContext>>>,
    }

    impl JournalGame {
        fn new(journal: &Journal) -> Self {
            Self {
                journal: Rc::clone(journal),
                square: Drawable::new(),
                stop_after: None,
                fatal_on_load: false,
                fatal_on_frame: None,
                failing_update: false,
                leaked_context: Rc::default(),
            }
        }

        fn log(&self, entry: impl Into<String>) {
            self.journal.borrow_mut().push(entry.into());
        }
    }

    impl Game for JournalGame {
        fn load_resources(&mut self, context: &DrawingContext, diagnostics: &Diagnostics) -> Result<(), AppError> {
            if self.fatal_on_load {
                diagnostics.report("the level file is corrupt", Severity::Irrecoverable)?;
            }
            self.square.create_from_rect(4, 4, Color::rgb(0xFF, 0, 0), context)?;
            *self.leaked_context.borrow_mut() = Some(context.clone());
            self.log("load");
            Ok(())
        }

        fn handle_event(&mut self, event: &WindowEvent, _stop: &StopHandle) -> Result<(), AppError> {
            self.log(format!("event {event:?}"));
            Ok(())
        }

        fn update(&mut self, frame: &FrameContext<'_>) -> Result<(), AppError> {
            if self.stop_after.is_some_and(|limit| frame.frame + 1 >= limit) {
                frame.stop.request_stop("JournalGame");
            }
            if self.fatal_on_frame == Some(frame.frame) {
                frame.diagnostics.report("the save slot vanished", Severity::Irrecoverable)?;
            }
            if self.failing_update {
                return Err(AppError::Custom("enemy spawn table is empty".to_string()));
            }
            Ok(())
        }

        fn render(&mut self, _context: &DrawingContext) -> Result<(), AppError> {
            self.square.render(0, 0, &RenderParams::default());
            self.log("render");
            Ok(())
        }

        fn cleanup(&mut self) {
            self.log("cleanup");
        }
    }

    impl Drop for JournalGame {
        fn drop(&mut self) {
            self.log("dropped");
        }
    }

    struct JournalSubsystem {
        name: &'static str,
        fail: bool,
        journal: Journal,
    }

    impl JournalSubsystem {
        fn boxed(name: &'static str, fail: bool, journal: &Journal) -> Box<dyn Subsystem> {
            Box::new(Self {
                name,
                fail,
                journal: Rc::clone(journal),
            })
        }
    }

    impl Subsystem for JournalSubsystem {
        fn name(&self) -> &str {
            self.name
        }

        fn initialize(&mut self, _context: &DrawingContext) -> Result<(), PlatformError> {
            if self.fail {
                return Err(PlatformError::SubsystemInitFailed {
                    subsystem: self.name.to_string(),
                    reason: "library missing".to_string(),
                });
            }
            self.journal.borrow_mut().push(format!("init {}", self.name));
            Ok(())
        }

        fn shutdown(&mut self, _context: &DrawingContext) {
            self.journal.borrow_mut().push(format!("shutdown {}", self.name));
        }
    }

    #[test]
    fn test_initialize_acquires_surface_and_context() {
        let mut engine = Engine::new(EngineConfig::default(), Box::new(SoftwarePlatform::new()), IdleGame);
        assert_eq!(engine.state(), EngineState::Uninitialized);

        engine.initialize().unwrap();

        assert_eq!(engine.state(), EngineState::Initializing);
        assert!(engine.is_initialized());
        let context = engine.context().unwrap();
        assert!(context.is_open());
        assert_eq!(context.baseline_color(), Color::WHITE);

        let window = engine.window().unwrap();
        assert_eq!(window.title(), "Project Violet");
        assert_eq!(window.size(), (750, 750));

        // Already up, nothing to do
        engine.initialize().unwrap();
    }

    #[test]
    fn test_image_drawable_against_engine_context() {
        let path = temp_path("square.png");
        image::RgbaImage::from_pixel(64, 64, image::Rgba([10, 20, 30, 255]))
            .save(&path)
            .unwrap();

        let mut engine = Engine::new(small_config(), Box::new(SoftwarePlatform::new()), IdleGame);
        engine.initialize().unwrap();

        let mut drawable = Drawable::new();
        drawable
            .create_from_image(&path, 2.0, 1.0, engine.context().unwrap(), None)
            .unwrap();

        assert_eq!(drawable.unscaled_size(), (64, 64));
        let (w, h) = drawable.scaled_size();
        assert_relative_eq!(w, 128.0);
        assert_relative_eq!(h, 64.0);

        drop(drawable);
        std::fs::remove_file(path).ok();
    }

    #[test]
    fn test_surface_failure_is_fatal() {
        let sink = BufferSink::new();
        let mut engine = Engine::new(
            small_config(),
            Box::new(SoftwarePlatform::new().failing_window("no display")),
            IdleGame,
        )
        .with_diagnostics(Diagnostics::new(Box::new(sink.clone())));

        assert!(!engine.run());
        assert_eq!(engine.frames_rendered(), 0);
        assert_eq!(engine.state(), EngineState::Terminated);
        assert!(!engine.stop_handle().is_running());
        assert!(sink.contains("TERMINATING PROGRAM!!\nIRRECOVERABLE ERROR: Failed to initialize the engine"));
        assert!(sink.contains("no display"));
    }

    #[test]
    fn test_context_failure_releases_surface() {
        let mut engine = Engine::new(
            small_config(),
            Box::new(SoftwarePlatform::new().failing_renderer("no renderer")),
            IdleGame,
        )
        .with_diagnostics(Diagnostics::new(Box::new(BufferSink::new())));

        assert!(matches!(
            engine.initialize(),
            Err(PlatformError::ContextCreationFailed(_))
        ));
        assert!(engine.window().is_some());
        assert!(engine.context().is_none());

        engine.teardown();
        assert!(engine.window().is_none());
        assert_eq!(engine.state(), EngineState::Terminated);
    }

    #[test]
    fn test_failed_subsystem_unwinds_the_ones_before_it() {
        let journal = Journal::default();
        let mut engine = Engine::new(small_config(), Box::new(SoftwarePlatform::new()), JournalGame::new(&journal))
            .with_diagnostics(Diagnostics::new(Box::new(BufferSink::new())))
            .with_subsystems(vec![
                JournalSubsystem::boxed("image", false, &journal),
                JournalSubsystem::boxed("text", true, &journal),
            ]);

        assert!(!engine.run());
        assert_eq!(engine.frames_rendered(), 0);
        assert_eq!(
            *journal.borrow(),
            vec!["init image", "cleanup", "dropped", "shutdown image"]
        );
    }

    #[test]
    fn test_fatal_report_while_loading() {
        let journal = Journal::default();
        let sink = BufferSink::new();
        let mut game = JournalGame::new(&journal);
        game.fatal_on_load = true;
        let mut engine = Engine::new(small_config(), Box::new(SoftwarePlatform::new()), game)
            .with_diagnostics(Diagnostics::new(Box::new(sink.clone())));

        assert!(!engine.run());
        assert_eq!(engine.frames_rendered(), 0);
        assert!(sink.contains("the level file is corrupt"));
        // Reported once by the game, not again by the engine
        assert_eq!(sink.lines().len(), 1);
        assert!(!journal.borrow().contains(&"render".to_string()));
    }

    #[test]
    fn test_quit_still_presents_current_frame() {
        let journal = Journal::default();
        let platform = SoftwarePlatform::new();
        let events = platform.event_injector();
        let mut engine = Engine::new(small_config(), Box::new(platform), JournalGame::new(&journal));

        events.quit();

        assert!(engine.run());
        assert_eq!(engine.frames_rendered(), 1);
        assert_eq!(
            *journal.borrow(),
            vec!["load", "event Quit", "render", "cleanup", "dropped"]
        );
    }

    #[test]
    fn test_teardown_order_and_stray_holders() {
        let journal = Journal::default();
        let platform = SoftwarePlatform::new();
        let events = platform.event_injector();
        let game = JournalGame::new(&journal);
        let leaked = Rc::clone(&game.leaked_context);
        let mut engine = Engine::new(small_config(), Box::new(platform), game).with_subsystems(vec![
            JournalSubsystem::boxed("image", false, &journal),
            JournalSubsystem::boxed("text", false, &journal),
        ]);

        events.quit();
        assert!(engine.run());

        assert_eq!(
            *journal.borrow(),
            vec![
                "init image",
                "init text",
                "load",
                "event Quit",
                "render",
                "cleanup",
                "dropped",
                "shutdown text",
                "shutdown image",
            ]
        );

        let stray = leaked.borrow_mut().take().unwrap();
        assert!(!stray.is_open());
        assert!(engine.context().is_none());
        assert!(engine.window().is_none());
    }

    #[test]
    fn test_teardown_is_idempotent() {
        let mut engine = Engine::new(small_config(), Box::new(SoftwarePlatform::new()), IdleGame);
        engine.initialize().unwrap();

        engine.teardown();
        engine.teardown();
        assert_eq!(engine.state(), EngineState::Terminated);

        // A torn-down engine does not start again
        assert!(!engine.run());
        assert!(engine.initialize().is_err());
    }

    #[test]
    fn test_teardown_without_initialize() {
        let mut engine = Engine::new(small_config(), Box::new(SoftwarePlatform::new()), IdleGame);
        engine.teardown();
        assert_eq!(engine.state(), EngineState::Terminated);
        assert!(engine.game().is_none());
    }

    #[test]
    fn test_frame_limit() {
        let config = EngineConfig {
            frame_limit: Some(3),
            ..small_config()
        };
        let mut engine = Engine::new(config, Box::new(SoftwarePlatform::new()), IdleGame);

        assert!(engine.run());
        assert_eq!(engine.frames_rendered(), 3);
    }

    #[test]
    fn test_game_can_stop_the_engine() {
        let journal = Journal::default();
        let mut game = JournalGame::new(&journal);
        game.stop_after = Some(2);
        let mut engine = Engine::new(small_config(), Box::new(SoftwarePlatform::new()), game);

        assert!(engine.run());
        assert_eq!(engine.frames_rendered(), 2);
    }

    #[test]
    fn test_fatal_during_update_ends_the_loop() {
        let journal = Journal::default();
        let sink = BufferSink::new();
        let mut game = JournalGame::new(&journal);
        game.fatal_on_frame = Some(0);
        let config = EngineConfig {
            frame_limit: Some(50),
            ..small_config()
        };
        let mut engine = Engine::new(config, Box::new(SoftwarePlatform::new()), game)
            .with_diagnostics(Diagnostics::new(Box::new(sink.clone())));

        // Setup succeeded, so run still reports success
        assert!(engine.run());
        assert_eq!(engine.frames_rendered(), 1);
        assert_eq!(engine.state(), EngineState::Terminated);
        assert!(!engine.stop_handle().is_running());
        assert!(sink.contains("IRRECOVERABLE ERROR: the save slot vanished"));
        assert_eq!(
            *journal.borrow(),
            vec!["load", "render", "cleanup", "dropped"]
        );
    }

    #[test]
    fn test_recoverable_game_errors_keep_running() {
        let journal = Journal::default();
        let sink = BufferSink::new();
        let mut game = JournalGame::new(&journal);
        game.failing_update = true;
        let config = EngineConfig {
            frame_limit: Some(3),
            ..small_config()
        };
        let mut engine = Engine::new(config, Box::new(SoftwarePlatform::new()), game)
            .with_diagnostics(Diagnostics::new(Box::new(sink.clone())));

        assert!(engine.run());
        assert_eq!(engine.frames_rendered(), 3);
        let failures: Vec<String> = sink
            .lines()
            .into_iter()
            .filter(|line| line.starts_with("Error: Game update failed"))
            .collect();
        assert_eq!(failures.len(), 3);
        assert!(failures[0].contains("enemy spawn table is empty"));
    }

    #[test]
    fn test_events_reach_input_state() {
        let platform = SoftwarePlatform::new();
        let events = platform.event_injector();
        let mut engine = Engine::new(small_config(), Box::new(platform), IdleGame);

        events.push(WindowEvent::KeyDown(KeyCode::Space));
        events.push(WindowEvent::MouseMoved { x: 12.0, y: 30.5 });
        events.quit();

        assert!(engine.run());
        assert!(engine.input().is_key_down(KeyCode::Space));
        assert_eq!(engine.input().mouse_position(), (12.0, 30.5));
        assert_eq!(events.pending(), 0);
    }

    #[test]
    fn test_screenshot_of_last_frame() {
        let path = temp_path("frame.png");
        let config = EngineConfig {
            frame_limit: Some(1),
            screenshot: Some(path.clone()),
            ..small_config()
        };
        let journal = Journal::default();
        let mut engine = Engine::new(config, Box::new(SoftwarePlatform::new()), JournalGame::new(&journal));

        assert!(engine.run());

        let frame = image::open(&path).unwrap().to_rgba8();
        assert_eq!(frame.dimensions(), (64, 64));
        assert_eq!(frame.get_pixel(1, 1).0, [0xFF, 0, 0, 0xFF]);
        assert_eq!(frame.get_pixel(10, 10).0, [0xFF, 0xFF, 0xFF, 0xFF]);

        std::fs::remove_file(path).ok();
    }

    #[test]
    fn test_diagnostics_file_from_config() {
        let log_file = temp_path("diagnostics.log");
        std::fs::remove_file(&log_file).ok();
        let sink = BufferSink::new();
        let mut config = small_config();
        config.diagnostics.log_file = Some(log_file.clone());

        let mut engine = Engine::new(config, Box::new(SoftwarePlatform::new().failing_window("gone")), IdleGame)
            .with_diagnostics(Diagnostics::new(Box::new(sink.clone())));

        assert!(!engine.run());

        let contents = std::fs::read_to_string(&log_file).unwrap();
        assert!(contents.contains("IRRECOVERABLE ERROR: Failed to initialize the engine"));
        assert!(sink.lines().is_empty());

        std::fs::remove_file(log_file).ok();
    }

    #[test]
    fn test_image_subsystem_feeds_drawables() {
        let mut engine = Engine::new(small_config(), Box::new(SoftwarePlatform::new()), IdleGame)
            .with_subsystems(vec![Box::new(ImageSubsystem)]);
        engine.initialize().unwrap();

        let mut drawable = Drawable::new();
        let result = drawable.create_from_image("does/not/exist.png", 1.0, 1.0, engine.context().unwrap(), None);
        assert!(matches!(
            result,
            Err(crate::render::DrawableError::DecodeFailed {
                source: crate::assets::AssetError::NotFound(_),
                ..
            })
        ));
    }

    #[test]
    fn test_config_roundtrip_through_file() {
        let path = temp_path("engine.ron");
        let config = EngineConfig {
            frame_limit: Some(10),
            ..small_config()
        };

        config.save_to_file(&path).unwrap();
        let loaded = EngineConfig::load_from_file(&path).unwrap();
        assert_eq!(loaded, config);

        std::fs::remove_file(path).ok();
    }
}

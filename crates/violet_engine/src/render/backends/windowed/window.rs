//! Native display surface

use std::rc::Rc;
use std::time::Duration;

use winit::application::ApplicationHandler;
use winit::dpi::LogicalSize;
use winit::error::OsError;
use winit::event::{KeyEvent, MouseButton as WinitButton, WindowEvent as WinitEvent};
use winit::event_loop::{ActiveEventLoop, EventLoop};
use winit::keyboard::{KeyCode as WinitKey, PhysicalKey};
use winit::platform::pump_events::{EventLoopExtPumpEvents, PumpStatus};
use winit::window::{Window, WindowAttributes, WindowId};

use crate::input::{KeyCode, MouseButton, WindowEvent};
use crate::render::platform::PlatformError;
use crate::render::window::{WindowBackend, WindowConfig};

/// Upper bound on event loop pumps while waiting for the window
const CREATION_PUMPS: usize = 100;

/// Receives `winit` callbacks during a pump
struct EventCollector {
    attributes: Option<WindowAttributes>,
    created: Option<Result<Window, OsError>>,
    scale_factor: f64,
    events: Vec<WindowEvent>,
}

impl ApplicationHandler for EventCollector {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if let Some(attributes) = self.attributes.take() {
            let created = event_loop.create_window(attributes);
            if let Ok(window) = &created {
                self.scale_factor = window.scale_factor();
            }
            self.created = Some(created);
        }
    }

    fn window_event(&mut self, _event_loop: &ActiveEventLoop, _window_id: WindowId, event: WinitEvent) {
        if let WinitEvent::ScaleFactorChanged { scale_factor, .. } = &event {
            self.scale_factor = *scale_factor;
        }
        if let Some(event) = translate(&event, self.scale_factor) {
            self.events.push(event);
        }
    }
}

/// A `winit` window and the event loop that feeds it
///
/// The game draws into a frame of the configured size in logical pixels;
/// the presenter scales it to the window's physical size.
pub struct WinitWindow {
    event_loop: EventLoop<()>,
    collector: EventCollector,
    window: Rc<Window>,
    title: String,
    width: u32,
    height: u32,
}

impl WinitWindow {
    /// Create the event loop and open a window described by `config`
    ///
    /// # Errors
    /// [`PlatformError::SurfaceCreationFailed`] when there is no display, the
    /// event loop already exists, or the window is refused.
    pub fn open(config: &WindowConfig) -> Result<Self, PlatformError> {
        let mut event_loop = EventLoop::new().map_err(|e| PlatformError::SurfaceCreationFailed(e.to_string()))?;

        let attributes = Window::default_attributes()
            .with_title(config.title.clone())
            .with_inner_size(LogicalSize::new(config.width, config.height))
            .with_visible(true);
        let mut collector = EventCollector {
            attributes: Some(attributes),
            created: None,
            scale_factor: 1.0,
            events: Vec::new(),
        };

        for _ in 0..CREATION_PUMPS {
            if let PumpStatus::Exit(code) = event_loop.pump_app_events(Some(Duration::from_millis(1)), &mut collector) {
                return Err(PlatformError::SurfaceCreationFailed(format!(
                    "event loop exited with code {code} before the window opened"
                )));
            }
            if collector.created.is_some() {
                break;
            }
        }

        let window = match collector.created.take() {
            Some(Ok(window)) => window,
            Some(Err(e)) => return Err(PlatformError::SurfaceCreationFailed(e.to_string())),
            None => {
                return Err(PlatformError::SurfaceCreationFailed(
                    "the event loop never resumed".to_string(),
                ))
            }
        };
        log::info!("Window created successfully (id: {:?})", window.id());

        Ok(Self {
            event_loop,
            collector,
            window: Rc::new(window),
            title: config.title.clone(),
            width: config.width,
            height: config.height,
        })
    }

    /// Shared handle to the native window, for building a presenter
    pub fn shared(&self) -> Rc<Window> {
        Rc::clone(&self.window)
    }
}

impl WindowBackend for WinitWindow {
    fn poll_events(&mut self) -> Vec<WindowEvent> {
        let status = self.event_loop.pump_app_events(Some(Duration::ZERO), &mut self.collector);

        let mut events = std::mem::take(&mut self.collector.events);
        if let PumpStatus::Exit(code) = status {
            log::debug!("Event loop exited with code {code}");
            events.push(WindowEvent::Quit);
        }
        events
    }

    fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    fn title(&self) -> String {
        self.title.clone()
    }

    fn set_title(&mut self, title: &str) {
        self.window.set_title(title);
        self.title = title.to_string();
    }

    fn as_any(&self) -> &dyn std::any::Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn std::any::Any {
        self
    }
}

/// Convert a `winit` window event into an engine event
///
/// Cursor positions are converted to logical pixels. Key repeats and events
/// the engine has no use for are dropped.
fn translate(event: &WinitEvent, scale_factor: f64) -> Option<WindowEvent> {
    match event {
        WinitEvent::CloseRequested | WinitEvent::Destroyed => Some(WindowEvent::Quit),
        WinitEvent::Focused(true) => Some(WindowEvent::FocusGained),
        WinitEvent::Focused(false) => Some(WindowEvent::FocusLost),
        WinitEvent::CursorMoved { position, .. } => {
            let logical = position.to_logical::<f64>(scale_factor);
            Some(WindowEvent::MouseMoved {
                x: logical.x,
                y: logical.y,
            })
        }
        WinitEvent::MouseInput { state, button, .. } => Some(WindowEvent::MouseButton {
            button: map_button(*button)?,
            pressed: state.is_pressed(),
        }),
        WinitEvent::KeyboardInput {
            event:
                KeyEvent {
                    physical_key: PhysicalKey::Code(code),
                    state,
                    repeat: false,
                    ..
                },
            ..
        } => {
            let key = map_key(*code)?;
            Some(if state.is_pressed() {
                WindowEvent::KeyDown(key)
            } else {
                WindowEvent::KeyUp(key)
            })
        }
        _ => None,
    }
}

const fn map_key(code: WinitKey) -> Option<KeyCode> {
    Some(match code {
        WinitKey::KeyA => KeyCode::A,
        WinitKey::KeyD => KeyCode::D,
        WinitKey::KeyS => KeyCode::S,
        WinitKey::KeyW => KeyCode::W,
        WinitKey::Space => KeyCode::Space,
        WinitKey::Enter | WinitKey::NumpadEnter => KeyCode::Enter,
        WinitKey::Escape => KeyCode::Escape,
        WinitKey::ArrowUp => KeyCode::Up,
        WinitKey::ArrowDown => KeyCode::Down,
        WinitKey::ArrowLeft => KeyCode::Left,
        WinitKey::ArrowRight => KeyCode::Right,
        _ => return None,
    })
}

const fn map_button(button: WinitButton) -> Option<MouseButton> {
    match button {
        WinitButton::Left => Some(MouseButton::Left),
        WinitButton::Right => Some(MouseButton::Right),
        WinitButton::Middle => Some(MouseButton::Middle),
        _ => None,
    }
}

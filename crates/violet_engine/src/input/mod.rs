//! Input management system
//!
//! Window events are drained once per frame by the engine and folded into an
//! [`InputState`] that the game collaborator can query during `update`.

use std::collections::HashSet;

/// Events delivered by a window backend
#[derive(Debug, Clone, PartialEq)]
pub enum WindowEvent {
    /// The user asked to close the application
    Quit,

    /// Key was pressed
    KeyDown(KeyCode),

    /// Key was released
    KeyUp(KeyCode),

    /// Mouse button event
    MouseButton {
        /// The mouse button that was pressed/released
        button: MouseButton,
        /// Whether the button was pressed (true) or released (false)
        pressed: bool,
    },

    /// Mouse movement
    MouseMoved {
        /// New X coordinate
        x: f64,
        /// New Y coordinate
        y: f64,
    },

    /// Window gained focus
    FocusGained,

    /// Window lost focus
    FocusLost,
}

/// Snapshot of keyboard and mouse state
#[derive(Debug, Default, Clone)]
pub struct InputState {
    keys_down: HashSet<KeyCode>,
    buttons_down: HashSet<MouseButton>,
    mouse_position: (f64, f64),
    focused: bool,
}

impl InputState {
    /// Create an empty input state
    pub fn new() -> Self {
        Self {
            focused: true,
            ..Self::default()
        }
    }

    /// Fold one event into the state
    pub fn apply(&mut self, event: &WindowEvent) {
        match *event {
            WindowEvent::KeyDown(key) => {
                self.keys_down.insert(key);
            }
            WindowEvent::KeyUp(key) => {
                self.keys_down.remove(&key);
            }
            WindowEvent::MouseButton { button, pressed: true } => {
                self.buttons_down.insert(button);
            }
            WindowEvent::MouseButton { button, pressed: false } => {
                self.buttons_down.remove(&button);
            }
            WindowEvent::MouseMoved { x, y } => {
                self.mouse_position = (x, y);
            }
            WindowEvent::FocusGained => self.focused = true,
            WindowEvent::FocusLost => {
                // Releases are not delivered while unfocused
                self.focused = false;
                self.keys_down.clear();
                self.buttons_down.clear();
            }
            WindowEvent::Quit => {}
        }
    }

    /// Whether `key` is currently held
    pub fn is_key_down(&self, key: KeyCode) -> bool {
        self.keys_down.contains(&key)
    }

    /// Whether `button` is currently held
    pub fn is_button_down(&self, button: MouseButton) -> bool {
        self.buttons_down.contains(&button)
    }

    /// Last reported cursor position
    pub const fn mouse_position(&self) -> (f64, f64) {
        self.mouse_position
    }

    /// Whether the window has input focus
    pub const fn has_focus(&self) -> bool {
        self.focused
    }
}

/// Key codes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyCode {
    /// A key
    A,
    /// D key
    D,
    /// S key
    S,
    /// W key
    W,
    /// Space key
    Space,
    /// Enter key
    Enter,
    /// Escape key
    Escape,
    /// Up arrow
    Up,
    /// Down arrow
    Down,
    /// Left arrow
    Left,
    /// Right arrow
    Right,
}

/// Mouse buttons
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MouseButton {
    /// Left mouse button
    Left,
    /// Right mouse button
    Right,
    /// Middle mouse button
    Middle,
}

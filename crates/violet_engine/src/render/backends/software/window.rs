//! Headless display surface

use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;

use crate::input::WindowEvent;
use crate::render::window::WindowBackend;

/// Feeds events into a software window from outside the engine
#[derive(Debug, Default, Clone)]
pub struct EventInjector {
    queue: Rc<RefCell<VecDeque<WindowEvent>>>,
}

impl EventInjector {
    /// Create an empty queue
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue an event for the next poll
    pub fn push(&self, event: WindowEvent) {
        self.queue.borrow_mut().push_back(event);
    }

    /// Queue a quit request
    pub fn quit(&self) {
        self.push(WindowEvent::Quit);
    }

    /// Number of events not yet polled
    pub fn pending(&self) -> usize {
        self.queue.borrow().len()
    }

    fn drain(&self) -> Vec<WindowEvent> {
        self.queue.borrow_mut().drain(..).collect()
    }
}

/// Window backend with no on-screen presence
#[derive(Debug)]
pub struct SoftwareWindow {
    title: String,
    width: u32,
    height: u32,
    events: EventInjector,
}

impl SoftwareWindow {
    /// Create a window reading events from `events`
    pub fn new(title: &str, width: u32, height: u32, events: EventInjector) -> Self {
        Self {
            title: title.to_string(),
            width,
            height,
            events,
        }
    }
}

impl WindowBackend for SoftwareWindow {
    fn poll_events(&mut self) -> Vec<WindowEvent> {
        self.events.drain()
    }

    fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    fn title(&self) -> String {
        self.title.clone()
    }

    fn set_title(&mut self, title: &str) {
        self.title = title.to_string();
    }

    fn as_any(&self) -> &dyn std::any::Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn std::any::Any {
        self
    }
}

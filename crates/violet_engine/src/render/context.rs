//! Shared drawing context
//!
//! The drawing context wraps the rendering backend bound to the display
//! surface. The engine creates it and hands out clones to every drawable, so
//! its lifetime is that of the longest holder. The engine always closes it
//! explicitly during teardown, after the game collaborator (and every
//! drawable it owns) has been dropped. A holder that somehow survives past
//! that point finds the context closed and all of its calls become no-ops.
//!
//! The handle is `Rc`-based and therefore not `Send`: every draw call is
//! issued from the one thread that owns the engine.

use std::cell::RefCell;
use std::path::Path;
use std::rc::Rc;

use crate::assets::{AssetError, ImageDecoder};
use crate::render::api::{BackendResult, RenderBackend, RenderError};
use crate::render::primitives::Color;
use crate::render::surface::StagingSurface;

struct ContextState {
    backend: RefCell<Option<Box<dyn RenderBackend>>>,
    decoder: RefCell<Option<Box<dyn ImageDecoder>>>,
    baseline_color: Color,
}

/// Reference-counted handle to the active rendering backend
#[derive(Clone)]
pub struct DrawingContext {
    state: Rc<ContextState>,
}

impl DrawingContext {
    /// Wrap a freshly created backend
    pub fn new(backend: Box<dyn RenderBackend>, baseline_color: Color) -> Self {
        Self {
            state: Rc::new(ContextState {
                backend: RefCell::new(Some(backend)),
                decoder: RefCell::new(None),
                baseline_color,
            }),
        }
    }

    /// Whether the backend is still alive
    pub fn is_open(&self) -> bool {
        self.state.backend.borrow().is_some()
    }

    /// Number of live handles, including the engine's own
    pub fn holder_count(&self) -> usize {
        Rc::strong_count(&self.state)
    }

    /// Whether two handles refer to the same context
    pub fn same_context(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.state, &other.state)
    }

    /// Draw color restored before every frame clear
    pub fn baseline_color(&self) -> Color {
        self.state.baseline_color
    }

    /// Run `f` against the backend
    ///
    /// Calls must not nest: `f` receives exclusive access for its duration.
    ///
    /// # Errors
    /// Returns [`RenderError::ContextClosed`] after teardown, otherwise
    /// whatever `f` returns.
    pub fn with_backend<R>(
        &self,
        f: impl FnOnce(&mut dyn RenderBackend) -> BackendResult<R>,
    ) -> BackendResult<R> {
        let mut backend = self.state.backend.borrow_mut();
        match backend.as_deref_mut() {
            Some(backend) => f(backend),
            None => Err(RenderError::ContextClosed),
        }
    }

    /// Make `decoder` available to image drawables
    pub fn install_decoder(&self, decoder: Box<dyn ImageDecoder>) {
        *self.state.decoder.borrow_mut() = Some(decoder);
    }

    /// Remove the installed decoder, if any
    pub fn remove_decoder(&self) -> Option<Box<dyn ImageDecoder>> {
        self.state.decoder.borrow_mut().take()
    }

    /// Decode `path` with the installed decoder
    ///
    /// # Errors
    /// Returns [`AssetError::DecoderUnavailable`] when no image subsystem is
    /// initialized, otherwise the decoder's error.
    pub fn decode_image(&self, path: &Path) -> Result<StagingSurface, AssetError> {
        match self.state.decoder.borrow().as_deref() {
            Some(decoder) => decoder.decode(path),
            None => Err(AssetError::DecoderUnavailable),
        }
    }

    /// Take the backend out, leaving every handle closed
    ///
    /// The caller decides when the backend is dropped. Closing twice returns
    /// `None` the second time.
    pub fn close(&self) -> Option<Box<dyn RenderBackend>> {
        self.state.decoder.borrow_mut().take();
        self.state.backend.borrow_mut().take()
    }
}

impl std::fmt::Debug for DrawingContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DrawingContext")
            .field("open", &self.is_open())
            .field("holders", &self.holder_count())
            .finish()
    }
}

//! Diagnostics channel
//!
//! Classifies failures by [`Severity`] and routes a formatted line for each
//! event to a swappable [`DiagnosticSink`]. Everything below
//! [`Severity::Irrecoverable`] is reported and execution continues. An
//! irrecoverable report comes back as a [`FatalError`] which the caller must
//! propagate; only [`crate::Engine::run`] consumes it, stops the frame loop
//! and proceeds straight to teardown.
//!
//! There is no process-wide state here: a [`Diagnostics`] value is created by
//! the engine and handed by reference to whatever needs to report.

pub mod sink;

pub use sink::{BufferSink, DiagnosticSink, FileSink, LogSink};

use serde::{Deserialize, Serialize};
use std::cell::{Cell, RefCell};
use std::fmt;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Ordered classification of diagnostic events
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Severity {
    /// Purely informational
    #[default]
    Information,
    /// Something unexpected that does not affect the current operation
    Warning,
    /// Something unexpected that is likely to affect output
    SevereWarning,
    /// An operation failed
    Error,
    /// An operation failed and left a resource unusable
    SevereError,
    /// Execution cannot continue
    Irrecoverable,
}

impl Severity {
    /// Prefix written in front of every message of this severity
    pub const fn label(self) -> &'static str {
        match self {
            Self::Information => "Information: ",
            Self::Warning => "Warning: ",
            Self::SevereWarning => "SEVERE WARNING: ",
            Self::Error => "Error: ",
            Self::SevereError => "SEVERE ERROR: ",
            Self::Irrecoverable => "TERMINATING PROGRAM!!\nIRRECOVERABLE ERROR: ",
        }
    }

    /// Whether this severity forces shutdown
    pub const fn is_fatal(self) -> bool {
        matches!(self, Self::Irrecoverable)
    }
}

/// Backend libraries whose raw error strings are forwarded verbatim
///
/// These are leaf kinds: they are always logged as [`Severity::SevereError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BackendSource {
    /// Window and renderer creation
    Platform,
    /// Image decoding
    ImageDecoder,
    /// Text rasterization
    TextShaper,
}

impl fmt::Display for BackendSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Platform => "Platform",
            Self::ImageDecoder => "Image decoder",
            Self::TextShaper => "Text shaper",
        };
        f.write_str(name)
    }
}

/// Source position a diagnostic was raised from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SourceLocation {
    /// Source file path as reported by the compiler
    pub file: &'static str,
    /// Line number
    pub line: u32,
}

impl SourceLocation {
    /// Location of the caller of the enclosing `#[track_caller]` function
    #[track_caller]
    pub fn caller() -> Self {
        let location = std::panic::Location::caller();
        Self {
            file: location.file(),
            line: location.line(),
        }
    }
}

impl fmt::Display for SourceLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let file = Path::new(self.file)
            .file_name()
            .and_then(|name| name.to_str())
            .unwrap_or(self.file);
        write!(f, "{}:{}", file, self.line)
    }
}

/// Raised by an irrecoverable diagnostic
///
/// Carries the original message and where it was reported from. Holding one
/// means the current operation must stop; it is propagated with `?` up to the
/// engine's top-level orchestration.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{message} ({location})")]
pub struct FatalError {
    /// Message passed to the report
    pub message: String,
    /// Where the report was raised
    pub location: SourceLocation,
}

/// Explicitly constructed diagnostics context
pub struct Diagnostics {
    sink: RefCell<Box<dyn DiagnosticSink>>,
    min_severity: Cell<Severity>,
}

impl Diagnostics {
    /// Create a diagnostics context writing to `sink`
    pub fn new(sink: Box<dyn DiagnosticSink>) -> Self {
        Self {
            sink: RefCell::new(sink),
            min_severity: Cell::new(Severity::Information),
        }
    }

    /// Drop events below `severity`
    ///
    /// Irrecoverable events are always emitted.
    pub fn set_min_severity(&self, severity: Severity) {
        self.min_severity.set(severity);
    }

    /// Current severity threshold
    pub fn min_severity(&self) -> Severity {
        self.min_severity.get()
    }

    /// Report an event from the caller's location
    ///
    /// # Errors
    /// Returns [`FatalError`] if and only if `severity` is
    /// [`Severity::Irrecoverable`].
    #[track_caller]
    pub fn report(&self, message: impl AsRef<str>, severity: Severity) -> Result<(), FatalError> {
        self.report_at(message.as_ref(), severity, SourceLocation::caller())
    }

    /// Report an event from an explicit location
    ///
    /// # Errors
    /// Returns [`FatalError`] if and only if `severity` is
    /// [`Severity::Irrecoverable`].
    pub fn report_at(
        &self,
        message: &str,
        severity: Severity,
        location: SourceLocation,
    ) -> Result<(), FatalError> {
        if severity.is_fatal() {
            return Err(self.fatal_at(message, location));
        }

        self.emit(message, severity, location);
        Ok(())
    }

    /// Report a failed operation that the caller recovers from
    #[track_caller]
    pub fn report_error(&self, message: impl AsRef<str>) {
        self.emit(message.as_ref(), Severity::Error, SourceLocation::caller());
    }

    /// Report an irrecoverable event and hand back the fatal condition
    ///
    /// For callers that already know they cannot continue and need the
    /// [`FatalError`] itself rather than a `Result`.
    #[track_caller]
    pub fn fatal(&self, message: impl AsRef<str>) -> FatalError {
        self.fatal_at(message.as_ref(), SourceLocation::caller())
    }

    fn fatal_at(&self, message: &str, location: SourceLocation) -> FatalError {
        let line = format_line(message, Severity::Irrecoverable, location);
        self.sink.borrow_mut().emit(Severity::Irrecoverable, &line);
        FatalError {
            message: message.to_string(),
            location,
        }
    }

    /// Forward a raw error string from a backend library
    #[track_caller]
    pub fn report_backend(&self, source: BackendSource, detail: impl fmt::Display) {
        self.emit(
            &format!("{source} error: {detail}"),
            Severity::SevereError,
            SourceLocation::caller(),
        );
    }

    fn emit(&self, message: &str, severity: Severity, location: SourceLocation) {
        if severity >= self.min_severity.get() {
            let line = format_line(message, severity, location);
            self.sink.borrow_mut().emit(severity, &line);
        }
    }

    /// Redirect output to `path` until the returned guard is dropped
    ///
    /// The file is opened in append mode and a timestamp header is written.
    /// Dropping the guard restores the previous sink.
    ///
    /// # Errors
    /// Returns the I/O error if the file cannot be opened.
    pub fn log_to_file(&self, path: impl AsRef<Path>) -> std::io::Result<FileLoggingGuard<'_>> {
        let file_sink = FileSink::open(path.as_ref())?;
        let previous = self.sink.replace(Box::new(file_sink));

        Ok(FileLoggingGuard {
            diagnostics: self,
            previous: Some(previous),
            path: path.as_ref().to_path_buf(),
        })
    }
}

impl Default for Diagnostics {
    fn default() -> Self {
        Self::new(Box::new(LogSink))
    }
}

/// Scoped file logging; restores the previous sink when dropped
pub struct FileLoggingGuard<'a> {
    diagnostics: &'a Diagnostics,
    previous: Option<Box<dyn DiagnosticSink>>,
    path: PathBuf,
}

impl FileLoggingGuard<'_> {
    /// File currently receiving diagnostics
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for FileLoggingGuard<'_> {
    fn drop(&mut self) {
        if let Some(previous) = self.previous.take() {
            let mut file_sink = self.diagnostics.sink.replace(previous);
            file_sink.flush();
        }
    }
}

fn format_line(message: &str, severity: Severity, location: SourceLocation) -> String {
    format!("{}{} ({})", severity.label(), message, location)
}

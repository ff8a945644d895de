//! Diagnostic sinks
//!
//! A sink receives fully formatted lines. Swapping the sink never changes
//! control flow; it only changes where the text ends up.

use super::Severity;
use chrono::Local;
use std::cell::RefCell;
use std::fs::{File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::Path;
use std::rc::Rc;

/// Append-only destination for formatted diagnostic lines
pub trait DiagnosticSink {
    /// Write one formatted line
    fn emit(&mut self, severity: Severity, line: &str);

    /// Flush buffered output, if any
    fn flush(&mut self) {}
}

/// Forwards diagnostics to the `log` facade
#[derive(Debug, Default, Clone, Copy)]
pub struct LogSink;

impl LogSink {
    fn level(severity: Severity) -> log::Level {
        match severity {
            Severity::Information => log::Level::Info,
            Severity::Warning | Severity::SevereWarning => log::Level::Warn,
            Severity::Error | Severity::SevereError | Severity::Irrecoverable => log::Level::Error,
        }
    }
}

impl DiagnosticSink for LogSink {
    fn emit(&mut self, severity: Severity, line: &str) {
        log::log!(target: "violet::diagnostics", Self::level(severity), "{}", line);
    }
}

/// Header format, e.g. `Mon Oct 19 14:02:11 2026`
pub const TIMESTAMP_FORMAT: &str = "%a %b %e %H:%M:%S %Y";

/// Appends diagnostics to a file
pub struct FileSink {
    writer: BufWriter<File>,
}

impl FileSink {
    /// Open `path` for appending and write a `[timestamp]` header
    ///
    /// # Errors
    /// Returns the I/O error if the file cannot be opened or written.
    pub fn open(path: &Path) -> std::io::Result<Self> {
        let file = OpenOptions::new().create(true).append(true).open(path)?;
        let mut writer = BufWriter::new(file);

        writeln!(writer, "[{}]", Local::now().format(TIMESTAMP_FORMAT))?;

        log::debug!("Diagnostics redirected to {:?}", path);
        Ok(Self { writer })
    }
}

impl DiagnosticSink for FileSink {
    fn emit(&mut self, _severity: Severity, line: &str) {
        if let Err(e) = writeln!(self.writer, "{line}") {
            log::error!("Failed to write diagnostic to file: {}", e);
        }
    }

    fn flush(&mut self) {
        if let Err(e) = self.writer.flush() {
            log::error!("Failed to flush diagnostics file: {}", e);
        }
    }
}

impl Drop for FileSink {
    fn drop(&mut self) {
        self.flush();
    }
}

/// Keeps lines in memory; clones share the same buffer
#[derive(Debug, Default, Clone)]
pub struct BufferSink {
    lines: Rc<RefCell<Vec<String>>>,
}

impl BufferSink {
    /// Create an empty buffer
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of every line emitted so far
    pub fn lines(&self) -> Vec<String> {
        self.lines.borrow().clone()
    }

    /// Whether any emitted line contains `needle`
    pub fn contains(&self, needle: &str) -> bool {
        self.lines.borrow().iter().any(|line| line.contains(needle))
    }
}

impl DiagnosticSink for BufferSink {
    fn emit(&mut self, _severity: Severity, line: &str) {
        self.lines.borrow_mut().push(line.to_string());
    }
}

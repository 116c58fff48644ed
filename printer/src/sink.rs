// SPDX-License-Identifier: CC0-1.0

//! Output destinations for rendered records.

use std::io::{self, Write};
use std::sync::{Arc, Mutex, PoisonError};

/// Destination for rendered debug records.
///
/// Each call to [`Sink::write_str`] receives one complete record, terminator
/// included. Interleaving between threads is whatever the underlying stream
/// provides.
pub trait Sink: Send + Sync {
    /// Writes one rendered record.
    fn write_str(&self, text: &str) -> io::Result<()>;

    /// Flushes buffered output, if any.
    fn flush(&self) -> io::Result<()> { Ok(()) }
}

/// Shared, type-erased sink.
pub type DynSink = Arc<dyn Sink>;

/// Writes to the process's standard error.
#[derive(Debug, Default, Clone, Copy)]
pub struct StderrSink;

impl Sink for StderrSink {
    fn write_str(&self, text: &str) -> io::Result<()> {
        io::stderr().lock().write_all(text.as_bytes())
    }

    fn flush(&self) -> io::Result<()> { io::stderr().flush() }
}

/// Writes to the process's standard output.
#[derive(Debug, Default, Clone, Copy)]
pub struct StdoutSink;

impl Sink for StdoutSink {
    fn write_str(&self, text: &str) -> io::Result<()> {
        io::stdout().lock().write_all(text.as_bytes())
    }

    fn flush(&self) -> io::Result<()> { io::stdout().flush() }
}

/// Collects records in memory.
///
/// Useful for tests and for callers that want to post-process output.
#[derive(Debug, Default)]
pub struct MemorySink {
    buffer: Mutex<String>,
}

impl MemorySink {
    /// Creates an empty sink.
    pub fn new() -> Self { Self::default() }

    /// Everything written so far.
    pub fn contents(&self) -> String { self.buffer.lock().unwrap_or_else(PoisonError::into_inner).clone() }

    /// Everything written so far, leaving the sink empty.
    pub fn take(&self) -> String {
        std::mem::take(&mut *self.buffer.lock().unwrap_or_else(PoisonError::into_inner))
    }

    /// Written text split into lines.
    pub fn lines(&self) -> Vec<String> { self.contents().lines().map(str::to_string).collect() }
}

impl Sink for MemorySink {
    fn write_str(&self, text: &str) -> io::Result<()> {
        self.buffer.lock().unwrap_or_else(PoisonError::into_inner).push_str(text);
        Ok(())
    }
}

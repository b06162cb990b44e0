//! Line-oriented output sinks.
//!
//! Event lines are flushed one at a time so a downstream reader sees each
//! event as soon as its tick completes.

use std::io::{Stderr, Stdout, Write};
use std::sync::{Arc, Mutex};

use jolt_common::error::{JoltError, JoltResult};
use jolt_model::{Diagnostic, EventRecord};

/// Consumer of per-tick output.
pub trait EventSink: Send {
    /// Write one event line.
    fn emit(&mut self, record: &EventRecord) -> JoltResult<()>;

    /// Write one verbose diagnostic line.
    fn diagnostic(&mut self, diagnostic: &Diagnostic) -> JoltResult<()>;

    /// Flush anything buffered.
    fn flush(&mut self) -> JoltResult<()>;
}

/// Writes events to one stream and diagnostics to another.
pub struct LineSink<O, D> {
    out: O,
    diag: D,
    events_written: u64,
}

impl LineSink<Stdout, Stderr> {
    /// Events on stdout, diagnostics on stderr.
    pub fn stdio() -> Self {
        Self::new(std::io::stdout(), std::io::stderr())
    }
}

impl<O: Write + Send, D: Write + Send> LineSink<O, D> {
    pub fn new(out: O, diag: D) -> Self {
        Self {
            out,
            diag,
            events_written: 0,
        }
    }

    /// Number of event lines written.
    pub fn events_written(&self) -> u64 {
        self.events_written
    }

    /// Release the underlying writers.
    pub fn into_inner(self) -> (O, D) {
        (self.out, self.diag)
    }
}

impl<O: Write + Send, D: Write + Send> EventSink for LineSink<O, D> {
    fn emit(&mut self, record: &EventRecord) -> JoltResult<()> {
        writeln!(self.out, "{record}")
            .and_then(|_| self.out.flush())
            .map_err(|e| JoltError::sink(format!("Failed to write event: {e}")))?;
        self.events_written += 1;
        Ok(())
    }

    fn diagnostic(&mut self, diagnostic: &Diagnostic) -> JoltResult<()> {
        writeln!(self.diag, "{diagnostic}")
            .map_err(|e| JoltError::sink(format!("Failed to write diagnostic: {e}")))
    }

    fn flush(&mut self) -> JoltResult<()> {
        self.out
            .flush()
            .and_then(|_| self.diag.flush())
            .map_err(|e| JoltError::sink(format!("Failed to flush output: {e}")))
    }
}

/// In-memory sink whose clones share the captured lines.
#[derive(Debug, Clone, Default)]
pub struct MemorySink {
    events: Arc<Mutex<Vec<String>>>,
    diagnostics: Arc<Mutex<Vec<String>>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Event lines captured so far.
    pub fn events(&self) -> Vec<String> {
        self.events.lock().map(|v| v.clone()).unwrap_or_default()
    }

    /// Diagnostic lines captured so far.
    pub fn diagnostics(&self) -> Vec<String> {
        self.diagnostics.lock().map(|v| v.clone()).unwrap_or_default()
    }
}

impl EventSink for MemorySink {
    fn emit(&mut self, record: &EventRecord) -> JoltResult<()> {
        self.events
            .lock()
            .map_err(|_| JoltError::sink("event buffer poisoned"))?
            .push(record.to_string());
        Ok(())
    }

    fn diagnostic(&mut self, diagnostic: &Diagnostic) -> JoltResult<()> {
        self.diagnostics
            .lock()
            .map_err(|_| JoltError::sink("diagnostic buffer poisoned"))?
            .push(diagnostic.to_string());
        Ok(())
    }

    fn flush(&mut self) -> JoltResult<()> {
        Ok(())
    }
}

//! # Line-oriented output capture for one child process.
//!
//! [`LineLogger`] converts the raw byte stream of a child (stdout and stderr
//! both feed the same instance, interleaved and undistinguished) into
//! discrete lines, published as [`EventKind::ProcessOutput`] events tagged
//! with the owning process's name.
//!
//! ## Rules
//! - Bytes are buffered until a `\n` delimiter; each complete line becomes
//!   one event.
//! - Lines are decoded as UTF-8; on failure the escaped byte representation
//!   is emitted instead. Decoding never raises past this boundary.
//! - The logger tracks whether the stream currently ends exactly at a line
//!   boundary. [`LineLogger::flush`] (called once at process exit) injects a
//!   synthetic newline when it does not, so a trailing partial line is still
//!   logged.

use std::sync::Arc;

use crate::events::{Bus, Event, EventKind};

/// Buffers raw output bytes into newline-delimited lines and publishes them
/// to the event bus, tagged with the process name.
pub struct LineLogger {
    name: Arc<str>,
    bus: Bus,
    buf: Vec<u8>,
    at_boundary: bool,
}

impl LineLogger {
    /// Creates a logger for the named process.
    pub fn new(name: impl Into<Arc<str>>, bus: Bus) -> Self {
        Self {
            name: name.into(),
            bus,
            buf: Vec::new(),
            at_boundary: true,
        }
    }

    /// The process this logger is tagged with.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Feeds a chunk of raw output bytes, publishing every completed line.
    pub fn feed(&mut self, data: &[u8]) {
        if data.is_empty() {
            return;
        }
        for &byte in data {
            if byte == b'\n' {
                self.emit_line();
            } else {
                self.buf.push(byte);
            }
        }
        self.at_boundary = data.ends_with(b"\n");
    }

    /// Flushes a trailing partial line, if any.
    ///
    /// Called once when the stream ends (process exit). When the last byte
    /// received was not a newline, a synthetic one is injected so the
    /// partial line is still logged.
    pub fn flush(&mut self) {
        if !self.at_boundary {
            self.feed(b"\n");
        }
    }

    fn emit_line(&mut self) {
        let line = match std::str::from_utf8(&self.buf) {
            Ok(text) => text.to_owned(),
            Err(_) => self.buf.escape_ascii().to_string(),
        };
        self.buf.clear();
        self.bus.publish(
            Event::now(EventKind::ProcessOutput)
                .with_process(self.name.clone())
                .with_line(line),
        );
    }
}

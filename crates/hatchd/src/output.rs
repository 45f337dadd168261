//! Output sink used by command handlers to talk to the attached client.
//!
//! Handlers never touch the transport directly. They receive a
//! `&dyn OutputSink`, which for a live console is the [`Session`] itself. The
//! sink contract is that writes never fail from the caller's point of view:
//! when no client is attached, or the client has gone away, the write is
//! dropped and a diagnostic is logged instead.
//!
//! JSON helpers live on the [`JsonOutput`] extension trait so `OutputSink`
//! stays object safe.
//!
//! [`Session`]: crate::Session

use std::fmt;
use std::sync::{Mutex, PoisonError};

use serde::Serialize;
use serde_json::ser::PrettyFormatter;

/// Destination for handler output.
pub trait OutputSink: Send + Sync {
    /// Writes raw bytes.
    fn write_bytes(&self, bytes: &[u8]);

    /// Writes a string as-is.
    fn write_str(&self, text: &str) {
        self.write_bytes(text.as_bytes());
    }

    /// Writes formatted text. Backs the `write!` macro for sink references.
    fn write_fmt(&self, args: fmt::Arguments<'_>) {
        match args.as_str() {
            Some(text) => self.write_str(text),
            None => self.write_str(&args.to_string()),
        }
    }

    /// Writes `text` followed by a newline in a single write.
    fn write_line(&self, text: &str) {
        let mut line = String::with_capacity(text.len() + 1);
        line.push_str(text);
        line.push('\n');
        self.write_str(&line);
    }
}

/// JSON encoding helpers available on every [`OutputSink`].
pub trait JsonOutput {
    /// Writes `value` as compact JSON followed by a newline.
    ///
    /// An encoding failure writes the error message as a line instead.
    fn write_json<T: Serialize + ?Sized>(&self, value: &T);

    /// Writes `value` as JSON indented with four spaces, followed by a newline.
    ///
    /// An encoding failure writes the error message as a line instead.
    fn write_pretty_json<T: Serialize + ?Sized>(&self, value: &T);
}

impl<S: OutputSink + ?Sized> JsonOutput for S {
    fn write_json<T: Serialize + ?Sized>(&self, value: &T) {
        write_encoded(self, serde_json::to_vec(value));
    }

    fn write_pretty_json<T: Serialize + ?Sized>(&self, value: &T) {
        write_encoded(self, to_pretty_vec(value));
    }
}

fn write_encoded<S: OutputSink + ?Sized>(sink: &S, encoded: serde_json::Result<Vec<u8>>) {
    match encoded {
        Ok(mut payload) => {
            payload.push(b'\n');
            sink.write_bytes(&payload);
        }
        Err(error) => sink.write_line(&error.to_string()),
    }
}

fn to_pretty_vec<T: Serialize + ?Sized>(value: &T) -> serde_json::Result<Vec<u8>> {
    let mut buffer = Vec::new();
    let formatter = PrettyFormatter::with_indent(b"    ");
    let mut serializer = serde_json::Serializer::with_formatter(&mut buffer, formatter);
    value.serialize(&mut serializer)?;
    Ok(buffer)
}

/// In-memory sink for exercising handlers without a connection.
#[derive(Debug, Default)]
pub struct BufferSink {
    buffer: Mutex<Vec<u8>>,
}

impl BufferSink {
    /// Creates an empty sink.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns everything written so far, lossily decoded as UTF-8.
    #[must_use]
    pub fn contents(&self) -> String {
        let buffer = self.buffer.lock().unwrap_or_else(PoisonError::into_inner);
        String::from_utf8_lossy(&buffer).into_owned()
    }

    /// Returns and clears everything written so far.
    #[must_use]
    pub fn take(&self) -> String {
        let mut buffer = self.buffer.lock().unwrap_or_else(PoisonError::into_inner);
        let contents = String::from_utf8_lossy(&buffer).into_owned();
        buffer.clear();
        contents
    }
}

impl OutputSink for BufferSink {
    fn write_bytes(&self, bytes: &[u8]) {
        self.buffer
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .extend_from_slice(bytes);
    }
}

//! Connection handling abstractions for the console listener.

use std::io::{self, BufRead, Read};
use std::net::TcpStream;

/// Largest accepted input line, newline included.
pub(crate) const MAX_LINE_BYTES: usize = 64 * 1024;

/// Handles accepted connections.
///
/// Called on the accept thread, so implementations must return promptly and
/// move any long-running work onto their own thread.
pub(crate) trait ConnectionHandler: Send + Sync + 'static {
    /// Handles a single connection. Implementations should avoid panicking.
    fn handle(&self, stream: TcpStream);
}

/// Reads one newline-terminated line of at most [`MAX_LINE_BYTES`].
///
/// Returns `Ok(None)` at end of stream. A final line without a newline is
/// still returned. The newline itself is kept; invalid UTF-8 is replaced.
///
/// # Errors
///
/// Returns `InvalidData` when the line exceeds the limit, or the underlying
/// read error.
pub(crate) fn read_line_bounded<R: BufRead>(reader: &mut R) -> io::Result<Option<String>> {
    let mut buffer = Vec::new();
    let limit = u64::try_from(MAX_LINE_BYTES + 1).unwrap_or(u64::MAX);
    reader.by_ref().take(limit).read_until(b'\n', &mut buffer)?;

    if buffer.is_empty() {
        return Ok(None);
    }
    enforce_line_limit(buffer.len())?;
    Ok(Some(String::from_utf8_lossy(&buffer).into_owned()))
}

fn enforce_line_limit(size: usize) -> io::Result<()> {
    if size > MAX_LINE_BYTES {
        return Err(io::Error::new(
            io::ErrorKind::InvalidData,
            "line exceeds maximum size",
        ));
    }
    Ok(())
}

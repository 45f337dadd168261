//! Interactive attach loop.
//!
//! After the handshake, a scoped reader thread copies whatever the console
//! sends straight to the terminal while the calling thread forwards local
//! input line by line. Typing `exit`, or closing local input, ends the
//! session without sending anything further.

use std::io::{self, BufRead, BufReader, ErrorKind, Read, Write};
use std::net::{Shutdown, TcpStream};
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;

use crate::AppError;

/// Prompt printed alongside the connected banner.
pub(crate) const PROMPT: &str = "➜ ";
pub(crate) const CONNECTED_BANNER: &str = "connected";
pub(crate) const CLOSED_MESSAGE: &str = "connection closed";
pub(crate) const FAREWELL: &str = "bye";
const BUSY_REPLY: &str = "busy";
const EXIT_COMMAND: &str = "exit";
const RELAY_BUFFER_BYTES: usize = 4096;

/// Runs the attach loop on an established connection.
///
/// Returns once local input says `exit` or ends, or the console connection
/// fails while forwarding a line.
pub(crate) fn attach<R, W>(
    stream: TcpStream,
    input: &mut R,
    output: &mut W,
) -> Result<(), AppError>
where
    R: BufRead,
    W: Write + Send,
{
    let mut reader = BufReader::new(stream.try_clone().map_err(AppError::CloneStream)?);
    handshake(&mut reader)?;

    let output = Mutex::new(output);
    write_locked(&output, format!("{CONNECTED_BANNER}\n{PROMPT}").as_bytes())
        .map_err(AppError::WriteOutput)?;

    let leaving = AtomicBool::new(false);
    thread::scope(|scope| {
        scope.spawn(|| relay(reader, &output, &leaving));
        let result = forward_input(input, &stream, &output);
        leaving.store(true, Ordering::SeqCst);
        // Unblocks the relay thread so the scope can join it.
        let _ = stream.shutdown(Shutdown::Both);
        result
    })
}

fn handshake(reader: &mut impl BufRead) -> Result<(), AppError> {
    let mut line = String::new();
    let read = reader.read_line(&mut line).map_err(AppError::Handshake)?;
    if read == 0 {
        return Err(AppError::Disconnected);
    }
    if line.trim_end() == BUSY_REPLY {
        return Err(AppError::Busy);
    }
    Ok(())
}

/// Copies console bytes to the terminal until the connection ends.
fn relay<R: Read, W: Write>(mut reader: R, output: &Mutex<W>, leaving: &AtomicBool) {
    let mut buffer = [0_u8; RELAY_BUFFER_BYTES];
    loop {
        match reader.read(&mut buffer) {
            Ok(0) => break,
            Ok(read) => {
                let Some(chunk) = buffer.get(..read) else {
                    break;
                };
                if write_locked(output, chunk).is_err() {
                    break;
                }
            }
            Err(error) if error.kind() == ErrorKind::Interrupted => {}
            Err(_) => break,
        }
    }
    if !leaving.load(Ordering::SeqCst) {
        let _ = write_locked(output, format!("{CLOSED_MESSAGE}\n").as_bytes());
    }
}

fn forward_input<R, W>(
    input: &mut R,
    mut stream: &TcpStream,
    output: &Mutex<W>,
) -> Result<(), AppError>
where
    R: BufRead,
    W: Write,
{
    let mut line = String::new();
    loop {
        line.clear();
        let read = input.read_line(&mut line).map_err(AppError::ReadInput)?;
        let command = line.trim();
        if read == 0 || command == EXIT_COMMAND {
            return write_locked(output, format!("{FAREWELL}\n").as_bytes())
                .map_err(AppError::WriteOutput);
        }
        // A failed send means the console has gone; the relay reports it.
        if stream.write_all(format!("{command}\n").as_bytes()).is_err() {
            return Ok(());
        }
    }
}

fn write_locked<W: Write>(output: &Mutex<W>, bytes: &[u8]) -> io::Result<()> {
    let mut guard = output
        .lock()
        .map_err(|_| io::Error::other("terminal writer lock poisoned"))?;
    guard.write_all(bytes)?;
    guard.flush()
}

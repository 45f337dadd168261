//! Admission and the per-session read loop.

use std::io::{BufReader, Write};
use std::net::{Shutdown, TcpStream};
use std::sync::Arc;
use std::thread;

use tracing::{Dispatch, debug, info, warn};

use crate::dispatch::{Dispatcher, LineOutcome, handle_line};
use crate::session::{Admission, BUSY_LINE, Session};
use crate::shutdown::ShutdownSignal;
use crate::transport::{ConnectionHandler, read_line_bounded};

use super::CONSOLE_TARGET;

/// Admits connections into the single session and serves their input.
#[derive(Debug)]
pub(crate) struct ConsoleConnectionHandler {
    dispatcher: Arc<Dispatcher>,
    session: Arc<Session>,
    shutdown: ShutdownSignal,
}

impl ConsoleConnectionHandler {
    pub(crate) fn new(
        dispatcher: Dispatcher,
        session: Arc<Session>,
        shutdown: ShutdownSignal,
    ) -> Self {
        Self {
            dispatcher: Arc::new(dispatcher),
            session,
            shutdown,
        }
    }

    fn spawn_reader(&self, generation: u64, reader: TcpStream) {
        let dispatcher = Arc::clone(&self.dispatcher);
        let session = Arc::clone(&self.session);
        let dispatch = tracing::dispatcher::get_default(Dispatch::clone);
        let spawned = thread::Builder::new()
            .name(format!("hatch-session-{generation}"))
            .spawn(move || {
                tracing::dispatcher::with_default(&dispatch, || {
                    serve(&dispatcher, &session, generation, reader);
                });
            });
        if let Err(error) = spawned {
            warn!(target: CONSOLE_TARGET, %error, "failed to spawn session reader");
            self.session.release(generation);
        }
    }
}

impl ConnectionHandler for ConsoleConnectionHandler {
    fn handle(&self, stream: TcpStream) {
        match self.session.admit(stream, &self.shutdown) {
            Ok(Admission::Admitted { generation, reader }) => self.spawn_reader(generation, reader),
            Ok(Admission::Busy(stream)) => reject_busy(stream),
            Ok(Admission::Closed(_)) => {
                debug!(target: CONSOLE_TARGET, "dropping connection after shutdown");
            }
            Err(error) => warn!(target: CONSOLE_TARGET, %error, "failed to admit connection"),
        }
    }
}

fn reject_busy(mut stream: TcpStream) {
    info!(
        target: CONSOLE_TARGET,
        peer = ?stream.peer_addr().ok(),
        "rejecting connection while session is busy"
    );
    if let Err(error) = stream.write_all(BUSY_LINE).and_then(|()| stream.flush()) {
        debug!(target: CONSOLE_TARGET, %error, "failed to write busy line");
    }
    if let Err(error) = stream.shutdown(Shutdown::Both) {
        debug!(target: CONSOLE_TARGET, %error, "failed to close rejected connection");
    }
}

fn serve(dispatcher: &Dispatcher, session: &Session, generation: u64, reader: TcpStream) {
    let mut reader = BufReader::new(reader);
    loop {
        match read_line_bounded(&mut reader) {
            Ok(Some(line)) => {
                if handle_line(line.trim(), dispatcher, session) == LineOutcome::Exit {
                    debug!(target: CONSOLE_TARGET, generation, "client requested exit");
                    break;
                }
            }
            Ok(None) => {
                debug!(target: CONSOLE_TARGET, generation, "client disconnected");
                break;
            }
            Err(error) => {
                debug!(target: CONSOLE_TARGET, generation, %error, "session read ended");
                break;
            }
        }
    }
    session.release(generation);
}

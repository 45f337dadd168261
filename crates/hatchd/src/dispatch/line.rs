//! Handling of one console input line.

use crate::output::OutputSink;

use super::router::{Dispatcher, RouteOutcome};

/// Written after every processed line except `exit`.
pub const PROMPT: &str = "➜ ";

/// Written when no handler matched a line.
pub const UNSUPPORTED_MESSAGE: &str = "unsupported command,use help to list all commands";

const EXIT_TOKEN: &str = "exit";
const HELP_TOKEN: &str = "help";

/// What the read loop should do after a line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineOutcome {
    /// Keep reading.
    Continue,
    /// The client asked to leave; close the session without a prompt.
    Exit,
}

/// Splits a raw input line into routing tokens.
///
/// The line is trimmed and then split on single spaces, so repeated spaces
/// yield empty tokens. A blank line yields no tokens.
#[must_use]
pub fn tokenize(line: &str) -> Vec<String> {
    let trimmed = line.trim();
    if trimmed.is_empty() {
        return Vec::new();
    }
    trimmed.split(' ').map(str::to_owned).collect()
}

/// Processes one input line against `dispatcher`, writing to `out`.
///
/// `exit` as the first token ends the session. A bare `help` lists the tree.
/// Anything else is routed; a miss writes the unsupported message. A prompt
/// follows every line that does not end the session, blank lines included.
pub fn handle_line(line: &str, dispatcher: &Dispatcher, out: &dyn OutputSink) -> LineOutcome {
    let tokens = tokenize(line);
    match tokens.as_slice() {
        [] => {}
        [first, ..] if first == EXIT_TOKEN => return LineOutcome::Exit,
        [only] if only == HELP_TOKEN => dispatcher.write_help(out),
        _ => {
            if dispatcher.dispatch(&tokens, out) == RouteOutcome::NotExecuted {
                out.write_line(UNSUPPORTED_MESSAGE);
            }
        }
    }
    out.write_str(PROMPT);
    LineOutcome::Continue
}

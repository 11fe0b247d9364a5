//! Executes one tokenized command line.
//!
//! A leading integer followed by more arguments is a repeat count: `3 incr n` sends `incr n`
//! three times, one after the other. `quit`, `exit`, `connect <host> <port>` and `clear` are
//! handled locally; everything else is forwarded to the server.

use std::io::Write;
use std::num::IntErrorKind;
use tracing::{debug, warn};
use crate::connection::ConnectFlags;
use crate::editor::LineEditor;
use crate::repl::Session;
use crate::transport::Transport;
use crate::{KvsError, Result};

/// What the REPL should do after a command
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    /// read the next line
    Continue,
    /// leave the REPL
    Exit,
}

/// A command line split into its repeat count and the command itself
#[derive(Debug, PartialEq, Eq)]
pub struct ParsedCommand<'a> {
    /// how many times the command runs, at least 1
    pub repeat: u64,
    /// `true` if the first argument was the repeat count
    pub skip_first_arg: bool,
    /// the command name followed by its arguments
    pub argv: &'a [String],
}

impl<'a> ParsedCommand<'a> {
    /// separates an optional repeat count from `argv`.
    ///
    /// The first argument counts as a repeat count only if more arguments follow and it is an
    /// integer. A lone number is an ordinary command name.
    ///
    /// # Errors
    /// [`KvsError::InvalidArguments`] if `argv` is empty,
    /// [`KvsError::InvalidRepeat`] if the repeat count is zero, negative or out of range
    pub fn parse(argv: &'a [String]) -> Result<Self> {
        if argv.is_empty() {
            return Err(KvsError::InvalidArguments);
        }
        let not_repeated = ParsedCommand { repeat: 1, skip_first_arg: false, argv };
        if argv.len() < 2 {
            return Ok(not_repeated);
        }

        match argv[0].parse::<i64>() {
            Ok(n) if n > 0 => Ok(ParsedCommand {
                repeat: n as u64,
                skip_first_arg: true,
                argv: &argv[1..],
            }),
            Ok(_) => Err(KvsError::InvalidRepeat(argv[0].clone())),
            Err(e) => match e.kind() {
                IntErrorKind::PosOverflow | IntErrorKind::NegOverflow => {
                    Err(KvsError::InvalidRepeat(argv[0].clone()))
                }
                _ => Ok(not_repeated),
            },
        }
    }

    /// the command name
    pub fn name(&self) -> &str {
        &self.argv[0]
    }

    /// the arguments after the command name
    pub fn args(&self) -> &[String] {
        &self.argv[1..]
    }
}

/// runs the command in `argv` against `session`.
/// Replies are written to `out`, diagnostics to `err`.
///
/// # Errors
/// [`KvsError::InvalidRepeat`] and [`KvsError::InvalidPort`] when the command was rejected
/// without running. Connection and server errors are reported on `err` and are not errors of
/// the dispatch itself.
pub fn dispatch<T: Transport>(
    argv: &[String],
    session: &mut Session<T>,
    editor: &mut dyn LineEditor,
    out: &mut dyn Write,
    err: &mut dyn Write,
) -> Result<Action> {
    let cmd = ParsedCommand::parse(argv)?;
    let name = cmd.name().to_ascii_lowercase();

    match (name.as_str(), cmd.args()) {
        ("quit", []) | ("exit", []) => Ok(Action::Exit),
        ("connect", [host, port]) => {
            let port = port
                .parse::<u16>()
                .map_err(|_| KvsError::InvalidPort(port.clone()))?;
            session.config.set_network(host.as_str(), port);
            // failures are reported by the manager
            let _ = session.manager.connect(&session.config, ConnectFlags::FORCE, err);
            Ok(Action::Continue)
        }
        ("clear", []) => {
            if let Err(e) = editor.clear_screen() {
                warn!("could not clear the screen: {}", e);
            }
            Ok(Action::Continue)
        }
        _ => {
            forward(&cmd, session, out, err)?;
            Ok(Action::Continue)
        }
    }
}

/// sends the command to the server `cmd.repeat` times, stopping early if the connection is
/// gone
fn forward<T: Transport>(
    cmd: &ParsedCommand<'_>,
    session: &mut Session<T>,
    out: &mut dyn Write,
    err: &mut dyn Write,
) -> Result<()> {
    debug!("forwarding {:?} x{}", cmd.argv, cmd.repeat);
    for _ in 0..cmd.repeat {
        match session.manager.send(cmd.argv) {
            Ok(reply) => writeln!(out, "{}", reply)?,
            Err(KvsError::Server(msg)) => writeln!(err, "(error) {}", msg)?,
            Err(e @ KvsError::NotConnected) | Err(e @ KvsError::ConnectionLost(_)) => {
                writeln!(err, "{}", e)?;
                break;
            }
            Err(e) => return Err(e),
        }
    }
    out.flush()?;
    Ok(())
}

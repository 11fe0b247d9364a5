use std::io::Write;
use tracing::debug;
use crate::config::SessionConfig;
use crate::connection::{ConnectFlags, ConnectionManager};
use crate::dispatcher::{dispatch, Action};
use crate::editor::LineEditor;
use crate::history::History;
use crate::prompt::NOT_CONNECTED_PROMPT;
use crate::tokenizer::split_args;
use crate::transport::Transport;
use crate::{KvsError, Result};

/// `Session` is the state a REPL works on: where to connect and the connection itself
pub struct Session<T: Transport> {
    /// the connection settings
    pub config: SessionConfig,
    /// the single connection of this session
    pub manager: ConnectionManager<T>,
}

impl<T: Transport> Session<T> {
    /// creates a disconnected session
    pub fn new(config: SessionConfig, transport: T) -> Self {
        Session {
            config,
            manager: ConnectionManager::new(transport),
        }
    }

    /// connects to the configured target unless already connected
    pub fn connect(&mut self, flags: ConnectFlags, err: &mut dyn Write) -> Result<()> {
        self.manager.connect(&self.config, flags, err)
    }

    /// the prompt for the current connection state
    pub fn prompt(&self) -> &str {
        if self.manager.is_connected() {
            self.config.prompt()
        } else {
            NOT_CONNECTED_PROMPT
        }
    }
}

/// `Repl` reads command lines, runs them, and records them in the history until the
/// user quits or input ends
pub struct Repl<E: LineEditor, T: Transport> {
    session: Session<T>,
    editor: E,
    history: History,
}

impl<E: LineEditor, T: Transport> Repl<E, T> {
    /// creates a REPL and hands the stored history to the editor
    pub fn new(session: Session<T>, mut editor: E, history: History) -> Self {
        for entry in history.entries() {
            editor.add_history(entry);
        }
        Repl { session, editor, history }
    }

    /// the session this REPL works on
    pub fn session(&self) -> &Session<T> {
        &self.session
    }

    /// the command history
    pub fn history(&self) -> &History {
        &self.history
    }

    /// runs until `quit`/`exit` or the end of input
    pub fn run(&mut self, out: &mut dyn Write, err: &mut dyn Write) -> Result<()> {
        while let Some(line) = self.editor.read_line(self.session.prompt())? {
            if self.eval(&line, out, err)? == Action::Exit {
                break;
            }
        }
        debug!("leaving the repl");
        Ok(())
    }

    /// tokenizes and runs one input line.
    /// Lines that fail to tokenize or are rejected are reported on `err` and left out of the
    /// history.
    pub fn eval(&mut self, line: &str, out: &mut dyn Write, err: &mut dyn Write) -> Result<Action> {
        let argv = match split_args(line) {
            Ok(argv) => argv,
            Err(e) => {
                writeln!(err, "{}", e)?;
                return Ok(Action::Continue);
            }
        };
        if argv.is_empty() {
            return Ok(Action::Continue);
        }

        match dispatch(&argv, &mut self.session, &mut self.editor, out, err) {
            Ok(Action::Continue) => {
                self.editor.add_history(&argv[0]);
                self.history.append(&argv[0]);
                Ok(Action::Continue)
            }
            Ok(Action::Exit) => Ok(Action::Exit),
            Err(e @ KvsError::InvalidRepeat(_)) | Err(e @ KvsError::InvalidPort(_)) => {
                writeln!(err, "{}", e)?;
                Ok(Action::Continue)
            }
            Err(e) => Err(e),
        }
    }
}

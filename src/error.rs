use std::io;
use rustyline::error::ReadlineError;
use thiserror::Error;

/// type alias for all operations in this crate that could fail with a [`KvsError`]
pub type Result<T> = std::result::Result<T, KvsError>;

/// The Error variants used by the client.
///
/// Everything except a failed read from the line editor is recoverable: the REPL prints a
/// one line diagnostic and returns to the prompt.
#[derive(Error, Debug)]
pub enum KvsError {
    /// a command line had malformed quoting
    #[error("Invalid argument(s)")]
    InvalidArguments,

    /// a numeric repeat prefix was zero, negative or out of range
    #[error("Invalid repeat command option value: {0}")]
    InvalidRepeat(String),

    /// the port given to `connect` is not a valid TCP port
    #[error("Invalid port: {0}")]
    InvalidPort(String),

    /// the transport could not establish a connection to `target`
    #[error("Could not connect to server at {target}: {source}")]
    Connect {
        /// host:port or socket path that was dialed
        target: String,
        /// the underlying transport error
        source: io::Error,
    },

    /// a command needed a connection but there is none
    #[error("not connected")]
    NotConnected,

    /// the server answered the request with an error reply
    #[error("{0}")]
    Server(String),

    /// the connection can no longer be used and must be torn down
    #[error("connection lost: {0}")]
    ConnectionLost(String),

    /// variant for errors caused from IO
    #[error(transparent)]
    Io(#[from] io::Error),

    /// serde error while encoding a request or decoding a reply
    #[error("protocol error: {0}")]
    Serde(#[from] serde_json::Error),

    /// the line editor failed
    #[error(transparent)]
    Readline(#[from] ReadlineError),
}

#![deny(missing_docs)]
//! An interactive command line client for a key-value store server.
//!
//! This crate provides the pieces of the [`kvs-cli`] executable: a REPL that keeps a single
//! connection to a server, reads command lines from the user, splits them into arguments and
//! sends them to the server, printing the replies.
//!
//! ## Command Lines
//! A line is split into arguments on whitespace (see [`split_args`]). Quoted regions stay
//! together, `"hello world"` is one argument, and a line that starts with `eval ` or `e ` is
//! split into the keyword and the untouched rest of the line.
//!
//! A numeric first argument followed by a command repeats that command, in order:
//!
//! - `3 incr counter` sends `incr counter` three times
//! - `0 incr counter` and `-1 incr counter` are rejected and send nothing
//!
//! ## Built-in Commands
//! These commands are handled by the client itself, case-insensitively:
//!
//! - `quit` / `exit` leave the REPL
//! - `connect <host> <port>` drops the current connection and connects to a new server
//! - `clear` clears the screen
//!
//! Anything else is forwarded to the server on the current connection. Without a connection
//! the client reports `not connected` instead of connecting on its own.
//!
//! ## Connections
//! The [`ConnectionManager`] owns the one [`Connection`] of a [`Session`]. A connection that
//! failed once is dropped, never reused; the prompt then reads `not connected> ` until a
//! `connect` succeeds. Live TCP connections send keep-alive probes every 15 seconds.
//!
//! ## Protocol
//! A [`Request`] is the argument vector encoded as a single line of JSON. The server answers
//! each request with one line holding a [`Response`]: either `Ok` with a [`Reply`] value or
//! `Err` with an error message, which is shown to the user as `(error) <message>`.
//!
//! ## History
//! The first argument of every executed command line is appended to `history.txt` in the
//! working directory, which is loaded again at start-up.
//!
//! [`kvs-cli`]: ../kvs_cli/index.html

pub use client::{Connection, ConnectionFlags, TransportKind};
pub use command::{Reply, Request, Response};
pub use config::{SessionConfig, Target};
pub use connection::{ConnectFlags, ConnectionManager};
pub use dispatcher::{dispatch, Action, ParsedCommand};
pub use editor::{LineEditor, RustylineEditor};
pub use error::{KvsError, Result};
pub use history::History;
pub use prompt::build_prompt;
pub use repl::{Repl, Session};
pub use tokenizer::split_args;
pub use transport::{SocketTransport, Stream, Transport};

mod client;
mod command;
pub mod config;
mod connection;
mod dispatcher;
mod editor;
mod error;
mod history;
pub mod keycodes;
pub mod prompt;
mod repl;
mod tokenizer;
mod transport;

#[cfg(test)]
mod testing;

use std::io::{BufRead, BufReader, Write};
use bitflags::bitflags;
use tracing::{debug, trace};
use crate::command::{Reply, Request, Response};
use crate::transport::Stream;
use crate::{KvsError, Result};

bitflags! {
    /// State bits of a [`Connection`].
    /// Only `BLOCKING` and `CONNECTED` are set by this crate.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct ConnectionFlags: u8 {
        /// requests block until their reply arrives
        const BLOCKING = 1 << 0;
        /// the socket is connected
        const CONNECTED = 1 << 1;
        /// no new requests are accepted, pending replies are drained
        const DISCONNECTING = 1 << 2;
        /// the connection is being released
        const FREEING = 1 << 3;
        /// the connection is in subscriber mode
        const SUBSCRIBED = 1 << 4;
        /// the connection is in monitor mode
        const MONITORING = 1 << 5;
    }
}

/// The kind of socket underneath a [`Connection`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransportKind {
    /// TCP
    Network,
    /// unix domain socket
    LocalSocket,
}

/// `Connection` is one live connection to a server.
///
/// Requests are written as one JSON [`Request`] per line and answered by one JSON [`Response`]
/// per line. Once an exchange fails at the I/O level the connection records the error and
/// refuses every further request; it has to be dropped and replaced.
/// The socket and buffers are released when the connection is dropped.
pub struct Connection {
    reader: BufReader<Box<dyn Stream>>,
    obuf: Vec<u8>,
    flags: ConnectionFlags,
    kind: TransportKind,
    err: Option<String>,
}

impl Connection {
    /// wraps an already connected `stream`
    pub fn new(stream: Box<dyn Stream>, kind: TransportKind) -> Self {
        Connection {
            reader: BufReader::new(stream),
            obuf: Vec::new(),
            flags: ConnectionFlags::BLOCKING | ConnectionFlags::CONNECTED,
            kind,
            err: None,
        }
    }

    /// the connection's state bits
    pub fn flags(&self) -> ConnectionFlags {
        self.flags
    }

    /// the kind of socket this connection uses
    pub fn kind(&self) -> TransportKind {
        self.kind
    }

    /// the error that made this connection unusable, if any
    pub fn error(&self) -> Option<&str> {
        self.err.as_deref()
    }

    /// `true` once an exchange failed; the connection must not be used again
    pub fn is_broken(&self) -> bool {
        self.err.is_some()
    }

    /// enables keep-alive probes on the underlying socket
    pub fn set_keep_alive(&self, interval: u32) -> std::io::Result<()> {
        self.reader.get_ref().set_keep_alive(interval)
    }

    /// sends `argv` to the server and waits for its reply
    /// # Returns
    /// `Ok<Reply>` with the decoded reply
    /// # Errors
    /// `Err<KvsError::Server>` if the server answered with an error reply,
    /// `Err<KvsError::ConnectionLost>` if the connection broke during the exchange
    pub fn send(&mut self, argv: &[String]) -> Result<Reply> {
        if let Some(err) = &self.err {
            return Err(KvsError::ConnectionLost(err.clone()));
        }

        let req = Request { argv: argv.to_vec() };
        self.obuf.clear();
        serde_json::to_writer(&mut self.obuf, &req)?;
        self.obuf.push(b'\n');
        trace!("sending {:?}", req);

        let resp = match self.exchange() {
            Ok(resp) => resp,
            Err(msg) => {
                debug!("connection failed: {}", msg);
                self.flags.remove(ConnectionFlags::CONNECTED);
                self.err = Some(msg.clone());
                return Err(KvsError::ConnectionLost(msg));
            }
        };

        trace!("received {:?}", resp);
        match resp {
            Response::Ok(reply) => Ok(reply),
            Response::Err(msg) => Err(KvsError::Server(msg)), // re-throwing error here
        }
    }

    // writes the output buffer and reads one response line
    fn exchange(&mut self) -> std::result::Result<Response, String> {
        let stream = self.reader.get_mut();
        stream.write_all(&self.obuf).map_err(|e| e.to_string())?;
        stream.flush().map_err(|e| e.to_string())?;

        let mut line = String::new();
        let n = self.reader.read_line(&mut line).map_err(|e| e.to_string())?;
        if n == 0 {
            return Err("server closed the connection".to_string());
        }
        serde_json::from_str(&line).map_err(|e| format!("malformed reply: {}", e))
    }
}

impl std::fmt::Debug for Connection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Connection")
            .field("flags", &self.flags)
            .field("kind", &self.kind)
            .field("err", &self.err)
            .finish()
    }
}

use std::io::Write;
use bitflags::bitflags;
use tracing::{debug, info, warn};
use crate::client::{Connection, TransportKind};
use crate::command::Reply;
use crate::config::{SessionConfig, Target, KEEPALIVE_INTERVAL};
use crate::transport::Transport;
use crate::{KvsError, Result};

bitflags! {
    /// Options for [`ConnectionManager::connect`]
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct ConnectFlags: u8 {
        /// re-connect even if already connected
        const FORCE = 1 << 0;
        /// don't report connection errors
        const QUIET = 1 << 1;
    }
}

/// `ConnectionManager` owns the session's single [`Connection`].
///
/// There is either a healthy connection or none at all: failed attempts and broken
/// connections are dropped right away.
pub struct ConnectionManager<T: Transport> {
    transport: T,
    conn: Option<Connection>,
    last_error: Option<String>,
}

impl<T: Transport> ConnectionManager<T> {
    /// creates a disconnected manager that dials through `transport`
    pub fn new(transport: T) -> Self {
        ConnectionManager { transport, conn: None, last_error: None }
    }

    /// `true` while there is a live connection
    pub fn is_connected(&self) -> bool {
        self.conn.is_some()
    }

    /// the live connection, if any
    pub fn connection(&self) -> Option<&Connection> {
        self.conn.as_ref()
    }

    /// why the last connection attempt failed or the last connection broke.
    /// Cleared by a successful connect.
    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    /// connects to the target of `config`.
    ///
    /// Does nothing if already connected, unless `FORCE` is given; then the current
    /// connection is closed before the new attempt. Failures are reported on `err`
    /// unless `QUIET` is given.
    ///
    /// # Errors
    /// returns [`KvsError::Connect`] if the target could not be reached. The manager is
    /// disconnected afterwards.
    pub fn connect(
        &mut self,
        config: &SessionConfig,
        flags: ConnectFlags,
        err: &mut dyn Write,
    ) -> Result<()> {
        if self.conn.is_some() && !flags.contains(ConnectFlags::FORCE) {
            return Ok(());
        }
        self.disconnect();

        let target = config.target();
        debug!("connecting to {}", target);
        let opened = match &target {
            Target::Network { host, port } => self
                .transport
                .open_network(host, *port)
                .map(|s| Connection::new(s, TransportKind::Network)),
            Target::Local(path) => self
                .transport
                .open_local(path)
                .map(|s| Connection::new(s, TransportKind::LocalSocket)),
        };

        let conn = match opened {
            Ok(conn) => conn,
            Err(source) => {
                let e = KvsError::Connect { target: target.to_string(), source };
                if !flags.contains(ConnectFlags::QUIET) {
                    let _ = writeln!(err, "{}", e);
                }
                debug!("{}", e);
                self.last_error = Some(e.to_string());
                return Err(e);
            }
        };

        // keeps long running commands from looking like a dead peer
        if let Err(e) = conn.set_keep_alive(KEEPALIVE_INTERVAL) {
            warn!("could not enable keep-alive on {}: {}", target, e);
        }

        info!("connected to {}", target);
        self.last_error = None;
        self.conn = Some(conn);
        Ok(())
    }

    /// closes the current connection, if any
    pub fn disconnect(&mut self) {
        if let Some(conn) = self.conn.take() {
            debug!("closing {:?}", conn);
        }
    }

    /// sends `argv` on the current connection.
    ///
    /// # Errors
    /// [`KvsError::NotConnected`] without a connection. If the connection broke during the
    /// exchange it is closed and the error returned.
    pub fn send(&mut self, argv: &[String]) -> Result<Reply> {
        let conn = self.conn.as_mut().ok_or(KvsError::NotConnected)?;
        let result = conn.send(argv);
        if conn.is_broken() {
            self.last_error = conn.error().map(String::from);
            self.disconnect();
        }
        result
    }
}

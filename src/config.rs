//! Connection settings of a REPL session and the defaults they start from.

use std::fmt;
use std::path::PathBuf;
use crate::prompt::build_prompt;

/// host used when none is given on the command line
pub const DEFAULT_HOST: &str = "127.0.0.1";

/// port used when none is given on the command line
pub const DEFAULT_PORT: u16 = 12345;

/// where the command history is kept, relative to the working directory
pub const HISTORY_FILE: &str = "history.txt";

/// seconds between TCP keep-alive probes on a live connection
pub const KEEPALIVE_INTERVAL: u32 = 15;

/// The endpoint a [`SessionConfig`] currently points at.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Target {
    /// a host name or IP address and a port
    Network {
        /// host name, IPv4 or IPv6 address
        host: String,
        /// TCP port
        port: u16,
    },
    /// path to a local (unix domain) socket
    Local(PathBuf),
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Target::Network { host, port } => write!(f, "{}:{}", host, port),
            Target::Local(path) => write!(f, "{}", path.display()),
        }
    }
}

/// `SessionConfig` holds the connection settings of one REPL session.
///
/// The cached prompt is rebuilt by every setter, so it always matches the current target.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    host: String,
    port: u16,
    socket: Option<PathBuf>,
    prompt: String,
}

impl SessionConfig {
    /// creates a config for `host`:`port`, optionally overridden by a local `socket` path
    pub fn new(host: impl Into<String>, port: u16, socket: Option<PathBuf>) -> Self {
        let mut config = SessionConfig {
            host: host.into(),
            port,
            socket,
            prompt: String::new(),
        };
        config.refresh_prompt();
        config
    }

    /// the configured host
    pub fn host(&self) -> &str {
        &self.host
    }

    /// the configured port
    pub fn port(&self) -> u16 {
        self.port
    }

    /// the configured local socket path, if any
    pub fn socket(&self) -> Option<&PathBuf> {
        self.socket.as_ref()
    }

    /// points the session at `host`:`port` and forgets any socket path
    pub fn set_network(&mut self, host: impl Into<String>, port: u16) {
        self.host = host.into();
        self.port = port;
        self.socket = None;
        self.refresh_prompt();
    }

    /// the endpoint a connection attempt will dial; a socket path wins over host and port
    pub fn target(&self) -> Target {
        match &self.socket {
            Some(path) => Target::Local(path.clone()),
            None => Target::Network {
                host: self.host.clone(),
                port: self.port,
            },
        }
    }

    /// the prompt shown while connected
    pub fn prompt(&self) -> &str {
        &self.prompt
    }

    fn refresh_prompt(&mut self) {
        self.prompt = build_prompt(self);
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        SessionConfig::new(DEFAULT_HOST, DEFAULT_PORT, None)
    }
}

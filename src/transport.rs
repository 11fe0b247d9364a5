//! Socket creation for the client.
//!
//! The [`Transport`] trait is the seam between the connection manager and the operating
//! system; tests substitute a fake implementation that never touches the network.

use std::io::{self, Read, Write};
use std::net::TcpStream;
use std::path::Path;
use tracing::debug;

/// A connected, blocking, bidirectional byte stream
pub trait Stream: Read + Write + Send {
    /// enables TCP keep-alive probes every `interval` seconds.
    /// Streams without a TCP socket underneath ignore this.
    fn set_keep_alive(&self, _interval: u32) -> io::Result<()> {
        Ok(())
    }
}

impl Stream for TcpStream {
    fn set_keep_alive(&self, interval: u32) -> io::Result<()> {
        keepalive::enable(self, interval)
    }
}

#[cfg(unix)]
impl Stream for std::os::unix::net::UnixStream {}

/// Opens connections to a server
pub trait Transport {
    /// connects to `host`:`port` over TCP, resolving `host` if needed
    fn open_network(&mut self, host: &str, port: u16) -> io::Result<Box<dyn Stream>>;

    /// connects to the local socket at `path`
    fn open_local(&mut self, path: &Path) -> io::Result<Box<dyn Stream>>;
}

/// The [`Transport`] used by the executable: real TCP and unix domain sockets
#[derive(Debug, Default, Clone, Copy)]
pub struct SocketTransport;

impl Transport for SocketTransport {
    fn open_network(&mut self, host: &str, port: u16) -> io::Result<Box<dyn Stream>> {
        let stream = TcpStream::connect((host, port))?;
        debug!("tcp connection established to {}:{}", host, port);
        Ok(Box::new(stream))
    }

    #[cfg(unix)]
    fn open_local(&mut self, path: &Path) -> io::Result<Box<dyn Stream>> {
        let stream = std::os::unix::net::UnixStream::connect(path)?;
        debug!("unix connection established to {}", path.display());
        Ok(Box::new(stream))
    }

    #[cfg(not(unix))]
    fn open_local(&mut self, _path: &Path) -> io::Result<Box<dyn Stream>> {
        Err(io::Error::new(
            io::ErrorKind::Unsupported,
            "local sockets are not supported on this platform",
        ))
    }
}

#[cfg(unix)]
mod keepalive {
    use std::io;
    use std::mem::size_of;
    use std::net::TcpStream;
    use std::os::unix::io::AsRawFd;

    fn set_opt(
        fd: libc::c_int,
        level: libc::c_int,
        name: libc::c_int,
        value: libc::c_int,
    ) -> io::Result<()> {
        // SAFETY: `fd` is an open socket owned by the caller and `value` outlives the call.
        let ret = unsafe {
            libc::setsockopt(
                fd,
                level,
                name,
                &value as *const libc::c_int as *const libc::c_void,
                size_of::<libc::c_int>() as libc::socklen_t,
            )
        };
        if ret == -1 {
            return Err(io::Error::last_os_error());
        }
        Ok(())
    }

    pub(super) fn enable(stream: &TcpStream, interval: u32) -> io::Result<()> {
        let fd = stream.as_raw_fd();
        set_opt(fd, libc::SOL_SOCKET, libc::SO_KEEPALIVE, 1)?;

        // only linux lets us tune the probes, elsewhere the system defaults apply
        #[cfg(any(target_os = "linux", target_os = "android"))]
        {
            let interval = libc::c_int::try_from(interval).unwrap_or(libc::c_int::MAX);
            // first probe after `interval` seconds of idle time
            set_opt(fd, libc::IPPROTO_TCP, libc::TCP_KEEPIDLE, interval)?;
            // then probe three times within the next `interval` seconds before giving up
            set_opt(fd, libc::IPPROTO_TCP, libc::TCP_KEEPINTVL, (interval / 3).max(1))?;
            set_opt(fd, libc::IPPROTO_TCP, libc::TCP_KEEPCNT, 3)?;
        }
        #[cfg(not(any(target_os = "linux", target_os = "android")))]
        let _ = interval;

        Ok(())
    }
}

#[cfg(not(unix))]
mod keepalive {
    use std::io;
    use std::net::TcpStream;

    pub(super) fn enable(_stream: &TcpStream, _interval: u32) -> io::Result<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::TcpListener;

    #[test]
    fn connects_over_tcp_and_enables_keep_alive() {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let port = listener.local_addr().unwrap().port();

        let stream = SocketTransport.open_network("127.0.0.1", port).unwrap();
        stream.set_keep_alive(15).unwrap();
    }

    #[test]
    fn refused_connection_is_an_error() {
        // bind then drop to get a port nothing listens on
        let port = TcpListener::bind("127.0.0.1:0").unwrap().local_addr().unwrap().port();
        assert!(SocketTransport.open_network("127.0.0.1", port).is_err());
    }

    #[cfg(unix)]
    #[test]
    fn connects_over_unix_socket() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("kv.sock");
        let _listener = std::os::unix::net::UnixListener::bind(&path).unwrap();

        let stream = SocketTransport.open_local(&path).unwrap();
        stream.set_keep_alive(15).unwrap();
    }
}

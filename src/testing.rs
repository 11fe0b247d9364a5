//! Fakes for unit tests: an in-memory key/value server, a transport that hands out streams to
//! it while counting open handles, and a scripted line editor.

use std::collections::{HashMap, VecDeque};
use std::io::{self, Read, Write};
use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard};
use crate::command::{Reply, Request, Response};
use crate::editor::LineEditor;
use crate::transport::{Stream, Transport};
use crate::Result;

#[derive(Default)]
struct ServerState {
    data: HashMap<String, String>,
    requests: Vec<Vec<String>>,
    hung_up: bool,
}

/// A tiny key/value server answering `ping`, `set`, `get`, `incr`, `del` and `mget`
#[derive(Clone, Default)]
pub(crate) struct FakeServer {
    state: Arc<Mutex<ServerState>>,
}

impl FakeServer {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> MutexGuard<'_, ServerState> {
        self.state.lock().unwrap()
    }

    /// every request received so far, in order
    pub(crate) fn requests(&self) -> Vec<Vec<String>> {
        self.state().requests.clone()
    }

    /// makes every stream behave like the peer closed it
    pub(crate) fn hang_up(&self) {
        self.state().hung_up = true;
    }

    fn handle(&self, argv: Vec<String>) -> Response {
        let mut state = self.state();
        state.requests.push(argv.clone());
        let name = argv.first().map(|s| s.to_ascii_lowercase()).unwrap_or_default();
        match (name.as_str(), argv.get(1..).unwrap_or(&[])) {
            ("ping", []) => Response::Ok(Reply::Status("PONG".into())),
            ("set", [key, value]) => {
                state.data.insert(key.clone(), value.clone());
                Response::Ok(Reply::Status("OK".into()))
            }
            ("get", [key]) => {
                Response::Ok(state.data.get(key).cloned().map_or(Reply::Nil, Reply::Bulk))
            }
            ("incr", [key]) => {
                let n = state.data.get(key).and_then(|v| v.parse::<i64>().ok()).unwrap_or(0) + 1;
                state.data.insert(key.clone(), n.to_string());
                Response::Ok(Reply::Integer(n))
            }
            ("del", keys) => {
                let removed = keys.iter().filter(|k| state.data.remove(*k).is_some()).count();
                Response::Ok(Reply::Integer(removed as i64))
            }
            ("mget", keys) => Response::Ok(Reply::Array(
                keys.iter()
                    .map(|k| state.data.get(k).cloned().map_or(Reply::Nil, Reply::Bulk))
                    .collect(),
            )),
            _ => {
                let name = argv.first().map(String::as_str).unwrap_or("");
                Response::Err(format!("ERR unknown command '{}'", name))
            }
        }
    }
}

#[derive(Default)]
struct TransportState {
    events: Vec<String>,
    opened: usize,
    live: usize,
    refuse: bool,
    fail_keep_alive: bool,
}

/// A [`Transport`] handing out [`FakeStream`]s connected to a [`FakeServer`].
/// Clones share their state, so a test can keep one while the code under test owns another.
#[derive(Clone, Default)]
pub(crate) struct FakeTransport {
    server: FakeServer,
    state: Arc<Mutex<TransportState>>,
}

impl FakeTransport {
    pub(crate) fn new(server: FakeServer) -> Self {
        FakeTransport { server, state: Arc::default() }
    }

    fn state(&self) -> MutexGuard<'_, TransportState> {
        self.state.lock().unwrap()
    }

    pub(crate) fn server(&self) -> &FakeServer {
        &self.server
    }

    /// opens, closes and keep-alive calls, in order
    pub(crate) fn events(&self) -> Vec<String> {
        self.state().events.clone()
    }

    /// number of streams opened so far
    pub(crate) fn opened(&self) -> usize {
        self.state().opened
    }

    /// number of streams not yet dropped
    pub(crate) fn live(&self) -> usize {
        self.state().live
    }

    /// makes connection attempts fail with "connection refused"
    pub(crate) fn refuse(&self, refuse: bool) {
        self.state().refuse = refuse;
    }

    /// makes enabling keep-alive fail
    pub(crate) fn fail_keep_alive(&self, fail: bool) {
        self.state().fail_keep_alive = fail;
    }

    fn open(&mut self, target: String) -> io::Result<Box<dyn Stream>> {
        let mut state = self.state();
        if state.refuse {
            state.events.push(format!("refused {}", target));
            return Err(io::Error::new(io::ErrorKind::ConnectionRefused, "Connection refused"));
        }
        state.opened += 1;
        state.live += 1;
        let id = state.opened;
        state.events.push(format!("open {} #{}", target, id));

        let mut stream = FakeStream::new(self.server.clone());
        stream.tracker = Some((id, self.state.clone()));
        Ok(Box::new(stream))
    }
}

impl Transport for FakeTransport {
    fn open_network(&mut self, host: &str, port: u16) -> io::Result<Box<dyn Stream>> {
        self.open(format!("{}:{}", host, port))
    }

    fn open_local(&mut self, path: &Path) -> io::Result<Box<dyn Stream>> {
        self.open(path.display().to_string())
    }
}

/// One client end of a connection to a [`FakeServer`]
pub(crate) struct FakeStream {
    server: FakeServer,
    pending: Vec<u8>,
    inbound: VecDeque<u8>,
    tracker: Option<(usize, Arc<Mutex<TransportState>>)>,
}

impl FakeStream {
    pub(crate) fn new(server: FakeServer) -> Self {
        FakeStream { server, pending: Vec::new(), inbound: VecDeque::new(), tracker: None }
    }
}

impl Read for FakeStream {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        if self.server.state().hung_up {
            return Ok(0);
        }
        let n = buf.len().min(self.inbound.len());
        for (dst, src) in buf.iter_mut().zip(self.inbound.drain(..n)) {
            *dst = src;
        }
        Ok(n)
    }
}

impl Write for FakeStream {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        if self.server.state().hung_up {
            return Err(io::Error::new(io::ErrorKind::BrokenPipe, "Broken pipe"));
        }
        self.pending.extend_from_slice(buf);
        while let Some(end) = self.pending.iter().position(|b| *b == b'\n') {
            let line: Vec<u8> = self.pending.drain(..=end).collect();
            let req: Request = serde_json::from_slice(&line)?;
            let resp = self.server.handle(req.argv);
            let mut out = serde_json::to_vec(&resp)?;
            out.push(b'\n');
            self.inbound.extend(out);
        }
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl Stream for FakeStream {
    fn set_keep_alive(&self, interval: u32) -> io::Result<()> {
        if let Some((id, state)) = &self.tracker {
            let mut state = state.lock().unwrap();
            state.events.push(format!("keepalive #{} {}", id, interval));
            if state.fail_keep_alive {
                return Err(io::Error::new(io::ErrorKind::Other, "keep-alive not supported"));
            }
        }
        Ok(())
    }
}

impl Drop for FakeStream {
    fn drop(&mut self) {
        if let Some((id, state)) = &self.tracker {
            let mut state = state.lock().unwrap();
            state.live -= 1;
            state.events.push(format!("close #{}", id));
        }
    }
}

/// A [`LineEditor`] replaying a fixed list of input lines
#[derive(Default)]
pub(crate) struct ScriptedEditor {
    lines: VecDeque<String>,
    pub(crate) prompts: Vec<String>,
    pub(crate) history: Vec<String>,
    pub(crate) clears: usize,
}

impl ScriptedEditor {
    pub(crate) fn new(lines: &[&str]) -> Self {
        ScriptedEditor {
            lines: lines.iter().map(|l| l.to_string()).collect(),
            ..Default::default()
        }
    }
}

impl LineEditor for ScriptedEditor {
    fn read_line(&mut self, prompt: &str) -> Result<Option<String>> {
        self.prompts.push(prompt.to_string());
        Ok(self.lines.pop_front())
    }

    fn add_history(&mut self, entry: &str) {
        self.history.push(entry.to_string());
    }

    fn clear_screen(&mut self) -> Result<()> {
        self.clears += 1;
        Ok(())
    }
}

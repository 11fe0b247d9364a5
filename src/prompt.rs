//! The REPL prompt.

use crate::config::SessionConfig;

/// prompt shown while there is no live connection
pub const NOT_CONNECTED_PROMPT: &str = "not connected> ";

/// label printed in front of a socket path
const SOCKET_LABEL: &str = "socket";

/// prompts longer than this are cut off
const MAX_PROMPT_LEN: usize = 127;

/// builds the prompt for the current target of `config`
pub fn build_prompt(config: &SessionConfig) -> String {
    let mut prompt = match config.socket() {
        Some(path) => format!("{} {}> ", SOCKET_LABEL, path.display()),
        None => format!("{}> ", format_addr(config.host(), config.port())),
    };
    truncate(&mut prompt, MAX_PROMPT_LEN);
    prompt
}

/// formats `host:port`, wrapping IPv6 addresses in brackets
pub fn format_addr(host: &str, port: u16) -> String {
    if host.contains(':') {
        format!("[{}]:{}", host, port)
    } else {
        format!("{}:{}", host, port)
    }
}

// cut at a char boundary at or below `max` bytes
fn truncate(s: &mut String, max: usize) {
    if s.len() <= max {
        return;
    }
    let mut end = max;
    while !s.is_char_boundary(end) {
        end -= 1;
    }
    s.truncate(end);
}

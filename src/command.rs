use std::fmt;
use serde::{Deserialize, Serialize};

/// A request sent to the key/value store: the command name followed by its arguments
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Request {
    /// the command name and its arguments, exactly as tokenized
    pub argv: Vec<String>,
}

/// The response Types that can be returned for any Request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Response {
    /// this variant is returned when a request was successful
    Ok(Reply),
    /// this variant is returned if an Error occurs while processing the request
    Err(String),
}

/// A decoded reply value
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Reply {
    /// the key (or value) does not exist
    Nil,
    /// a short status line such as `OK`
    Status(String),
    /// an integer result
    Integer(i64),
    /// a string value
    Bulk(String),
    /// an ordered collection of replies
    Array(Vec<Reply>),
}

impl Reply {
    fn fmt_indented(&self, f: &mut fmt::Formatter<'_>, indent: usize) -> fmt::Result {
        match self {
            Reply::Nil => write!(f, "(nil)"),
            Reply::Status(s) => write!(f, "{}", s),
            Reply::Integer(i) => write!(f, "(integer) {}", i),
            Reply::Bulk(s) => write!(f, "{}", quote(s)),
            Reply::Array(items) if items.is_empty() => write!(f, "(empty array)"),
            Reply::Array(items) => {
                // width of the widest index keeps nested items aligned
                let width = items.len().to_string().len();
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        writeln!(f)?;
                        write!(f, "{:indent$}", "", indent = indent)?;
                    }
                    write!(f, "{:>width$}) ", i + 1, width = width)?;
                    item.fmt_indented(f, indent + width + 2)?;
                }
                Ok(())
            }
        }
    }
}

impl fmt::Display for Reply {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.fmt_indented(f, 0)
    }
}

/// wraps `s` in double quotes, escaping quotes, backslashes and control characters
fn quote(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 2);
    out.push('"');
    for c in s.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            '\u{7}' => out.push_str("\\a"),
            '\u{8}' => out.push_str("\\b"),
            c if c.is_control() => out.push_str(&format!("\\x{:02x}", c as u32)),
            c => out.push(c),
        }
    }
    out.push('"');
    out
}

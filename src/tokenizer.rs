//! Splits one line of user input into an argument vector.
//!
//! Arguments are separated by whitespace. Single and double quoted regions belong to one
//! argument even when they contain whitespace, and adjacent quoted/unquoted pieces are joined
//! (`a"b c"` is the single argument `ab c`). A backslash escapes the next character outside of
//! quotes and inside double quotes; inside single quotes it is an ordinary character.
//! Double quotes additionally understand `\n`, `\r`, `\t`, `\b`, `\a` and `\xHH`.
//!
//! Lines starting with `eval ` or `e ` are never tokenized: the keyword becomes the first
//! argument and the rest of the line is passed through untouched, so script bodies keep their
//! quotes and braces.

use crate::{KvsError, Result};

/// keywords whose remainder is passed through verbatim
const RAW_PREFIXES: [&str; 2] = ["eval", "e"];

/// splits `line` into arguments
///
/// # Errors
/// returns [`KvsError::InvalidArguments`] on an unterminated quote or a trailing backslash
pub fn split_args(line: &str) -> Result<Vec<String>> {
    let line = line.trim_start();
    if let Some(argv) = split_raw(line) {
        return Ok(argv);
    }

    let mut argv = Vec::new();
    let mut chars = line.chars().peekable();

    loop {
        while chars.next_if(|c| c.is_whitespace()).is_some() {}
        if chars.peek().is_none() {
            return Ok(argv);
        }

        let mut current = String::new();
        while let Some(c) = chars.next() {
            match c {
                c if c.is_whitespace() => break,
                '\\' => current.push(chars.next().ok_or(KvsError::InvalidArguments)?),
                '\'' => loop {
                    match chars.next() {
                        Some('\'') => break,
                        Some(c) => current.push(c),
                        None => return Err(KvsError::InvalidArguments),
                    }
                },
                '"' => loop {
                    match chars.next() {
                        Some('"') => break,
                        Some('\\') => {
                            let escaped = chars.next().ok_or(KvsError::InvalidArguments)?;
                            match escaped {
                                'n' => current.push('\n'),
                                'r' => current.push('\r'),
                                't' => current.push('\t'),
                                'b' => current.push('\u{8}'),
                                'a' => current.push('\u{7}'),
                                'x' => match hex_escape(&mut chars) {
                                    Some(byte) => current.push(byte),
                                    None => current.push('x'),
                                },
                                other => current.push(other),
                            }
                        }
                        Some(c) => current.push(c),
                        None => return Err(KvsError::InvalidArguments),
                    }
                },
                c => current.push(c),
            }
        }
        argv.push(current);
    }
}

/// handles the `eval <script>` / `e <script>` shorthand
fn split_raw(line: &str) -> Option<Vec<String>> {
    RAW_PREFIXES.iter().find_map(|keyword| {
        let rest = line.strip_prefix(keyword)?.strip_prefix(' ')?;
        Some(vec![keyword.to_string(), rest.to_string()])
    })
}

/// consumes the two hex digits of a `\xHH` escape, leaving the input untouched when they are
/// not both hex digits
fn hex_escape(chars: &mut std::iter::Peekable<std::str::Chars<'_>>) -> Option<char> {
    let mut lookahead = chars.clone();
    let hi = lookahead.next()?.to_digit(16)?;
    let lo = lookahead.next()?.to_digit(16)?;
    chars.nth(1);
    char::from_u32(hi * 16 + lo)
}

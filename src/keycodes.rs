//! Key code debugging: echoes every byte the terminal sends until `quit` is typed.

use std::io::{self, Read, Write};
use crossterm::terminal::{disable_raw_mode, enable_raw_mode};
use tracing::warn;

/// puts the terminal into raw mode and echoes key codes from stdin to stdout
pub fn print_key_codes() -> io::Result<()> {
    let mut out = io::stdout();
    writeln!(
        out,
        "Key codes debugging mode.\nPress keys to see scan codes. Type 'quit' at any time to exit."
    )?;

    let _raw = match RawMode::enable() {
        Ok(raw) => Some(raw),
        Err(e) => {
            warn!("could not enable raw mode: {}", e);
            None
        }
    };
    echo_key_codes(io::stdin().lock(), &mut out)
}

/// writes one line per byte read from `input`, until the last four bytes spell `quit` or the
/// input ends
pub fn echo_key_codes(mut input: impl Read, out: &mut impl Write) -> io::Result<()> {
    let mut last = [b' '; 4];
    let mut byte = [0u8; 1];
    loop {
        if input.read(&mut byte)? == 0 {
            return Ok(());
        }
        let c = byte[0];
        last.rotate_left(1);
        last[3] = c;
        if &last == b"quit" {
            return Ok(());
        }

        let shown = if c.is_ascii_graphic() || c == b' ' { c as char } else { '?' };
        // raw mode turns off output post-processing, so return the cursor by hand
        write!(out, "'{}' {:02x} ({}) (type quit to exit)\n\r", shown, c, c)?;
        out.flush()?;
    }
}

/// Keeps the terminal in raw mode and restores the previous mode when dropped
struct RawMode;

impl RawMode {
    fn enable() -> io::Result<RawMode> {
        enable_raw_mode()?;
        Ok(RawMode)
    }
}

impl Drop for RawMode {
    fn drop(&mut self) {
        let _ = disable_raw_mode();
    }
}

//! Line editing for the REPL.

use std::borrow::Cow;
use rustyline::completion::Completer;
use rustyline::error::ReadlineError;
use rustyline::highlight::Highlighter;
use rustyline::hint::Hinter;
use rustyline::history::DefaultHistory;
use rustyline::validate::Validator;
use rustyline::{Config, Context, Editor, Helper};
use tracing::warn;
use crate::Result;

/// completion candidates, offered for the first character of the buffer
const COMPLETIONS: &[&str] = &[
    "clear",
    "connect",
    "del",
    "eval",
    "exit",
    "get",
    "hello",
    "hello there",
    "incr",
    "ping",
    "quit",
    "set",
];

/// hints shown after a fully typed command name
const HINTS: &[(&str, &str)] = &[
    ("connect", " <host> <port>"),
    ("del", " <key>"),
    ("eval", " <script>"),
    ("get", " <key>"),
    ("hello", " World"),
    ("incr", " <key>"),
    ("set", " <key> <value>"),
];

/// ANSI magenta, used for hints
const HINT_COLOR: u8 = 35;

/// The line editing operations the REPL needs
pub trait LineEditor {
    /// shows `prompt` and blocks until the user entered a line.
    /// Returns `None` at end of input.
    fn read_line(&mut self, prompt: &str) -> Result<Option<String>>;

    /// makes `entry` reachable with the history keys
    fn add_history(&mut self, entry: &str);

    /// clears the terminal
    fn clear_screen(&mut self) -> Result<()>;
}

/// A [`LineEditor`] on top of `rustyline`, with command completion and hints
pub struct RustylineEditor {
    editor: Editor<CommandHelper, DefaultHistory>,
}

impl RustylineEditor {
    /// creates an editor reading from the terminal
    pub fn new() -> Result<Self> {
        let config = Config::builder().auto_add_history(false).build();
        let mut editor = Editor::with_config(config)?;
        editor.set_helper(Some(CommandHelper));
        Ok(RustylineEditor { editor })
    }
}

impl LineEditor for RustylineEditor {
    fn read_line(&mut self, prompt: &str) -> Result<Option<String>> {
        match self.editor.readline(prompt) {
            Ok(line) => Ok(Some(line)),
            // ctrl-c and ctrl-d both end the session
            Err(ReadlineError::Eof) | Err(ReadlineError::Interrupted) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn add_history(&mut self, entry: &str) {
        if let Err(e) = self.editor.add_history_entry(entry) {
            warn!("could not add history entry: {}", e);
        }
    }

    fn clear_screen(&mut self) -> Result<()> {
        self.editor.clear_screen()?;
        Ok(())
    }
}

/// Completion and hint provider for [`RustylineEditor`]
#[derive(Debug, Default, Clone, Copy)]
pub struct CommandHelper;

impl CommandHelper {
    /// the completion candidates for `buf`, chosen by its first character
    pub fn candidates(buf: &str) -> Vec<String> {
        match buf.chars().next() {
            Some(first) => COMPLETIONS
                .iter()
                .filter(|c| c.starts_with(first.to_ascii_lowercase()))
                .map(|c| c.to_string())
                .collect(),
            None => Vec::new(),
        }
    }

    /// the hint for `buf`, if it is exactly a known command name
    pub fn hint_for(buf: &str) -> Option<&'static str> {
        HINTS
            .iter()
            .find(|(name, _)| name.eq_ignore_ascii_case(buf))
            .map(|(_, hint)| *hint)
    }
}

impl Completer for CommandHelper {
    type Candidate = String;

    fn complete(
        &self,
        line: &str,
        _pos: usize,
        _ctx: &Context<'_>,
    ) -> rustyline::Result<(usize, Vec<String>)> {
        // candidates replace the whole buffer
        Ok((0, Self::candidates(line)))
    }
}

impl Hinter for CommandHelper {
    type Hint = String;

    fn hint(&self, line: &str, pos: usize, _ctx: &Context<'_>) -> Option<String> {
        if pos < line.len() {
            return None;
        }
        Self::hint_for(line).map(String::from)
    }
}

impl Highlighter for CommandHelper {
    fn highlight_hint<'h>(&self, hint: &'h str) -> Cow<'h, str> {
        Cow::Owned(format!("\x1b[{}m{}\x1b[0m", HINT_COLOR, hint))
    }
}

impl Validator for CommandHelper {}

impl Helper for CommandHelper {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn candidates_follow_the_first_character() {
        assert_eq!(CommandHelper::candidates("c"), vec!["clear", "connect"]);
        assert_eq!(CommandHelper::candidates("hel"), vec!["hello", "hello there"]);
        assert_eq!(CommandHelper::candidates("Q"), vec!["quit"]);
        assert!(CommandHelper::candidates("").is_empty());
        assert!(CommandHelper::candidates("z").is_empty());
    }

    #[test]
    fn hints_need_a_whole_command_name() {
        assert_eq!(CommandHelper::hint_for("hello"), Some(" World"));
        assert_eq!(CommandHelper::hint_for("SET"), Some(" <key> <value>"));
        assert_eq!(CommandHelper::hint_for("se"), None);
        assert_eq!(CommandHelper::hint_for("set k"), None);
    }
}

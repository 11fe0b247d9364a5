use std::collections::VecDeque;
use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::path::PathBuf;
use tracing::{debug, warn};

/// the oldest entries are dropped once the history grows past this
pub const HISTORY_MAX_LEN: usize = 100;

/// `History` is the list of previously entered commands, persisted as a plain text file with
/// one entry per line, most recent last.
///
/// The whole file is rewritten after every append.
#[derive(Debug)]
pub struct History {
    path: Option<PathBuf>,
    entries: VecDeque<String>,
}

impl History {
    /// loads the history kept at `path`. A missing file is an empty history.
    pub fn load(path: impl Into<PathBuf>) -> io::Result<History> {
        let path = path.into();
        let entries = match fs::read_to_string(&path) {
            Ok(contents) => contents
                .lines()
                .filter(|line| !line.is_empty())
                .map(String::from)
                .collect(),
            Err(e) if e.kind() == io::ErrorKind::NotFound => VecDeque::new(),
            Err(e) => return Err(e),
        };
        debug!("loaded {} history entries from {}", entries.len(), path.display());

        let mut history = History { path: Some(path), entries };
        history.trim();
        Ok(history)
    }

    /// a history that is never written to disk
    pub fn in_memory() -> History {
        History { path: None, entries: VecDeque::new() }
    }

    /// the entries, oldest first
    pub fn entries(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(String::as_str)
    }

    /// appends `entry` and rewrites the history file.
    /// An entry equal to the most recent one is skipped.
    /// A failed write is logged; the entry stays in memory.
    pub fn append(&mut self, entry: &str) {
        // one entry per line, so embedded line breaks are flattened
        let entry = entry.replace(['\r', '\n'], " ");
        if self.entries.back() == Some(&entry) {
            return;
        }
        self.entries.push_back(entry);
        self.trim();

        if let Err(e) = self.save() {
            warn!("could not save history: {}", e);
        }
    }

    fn save(&self) -> io::Result<()> {
        let path = match &self.path {
            Some(path) => path,
            None => return Ok(()),
        };
        let mut writer = BufWriter::new(File::create(path)?);
        for entry in &self.entries {
            writeln!(writer, "{}", entry)?;
        }
        writer.flush()
    }

    fn trim(&mut self) {
        while self.entries.len() > HISTORY_MAX_LEN {
            self.entries.pop_front();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let history = History::load(dir.path().join("history.txt")).unwrap();
        assert_eq!(history.entries().count(), 0);
    }

    #[test]
    fn append_rewrites_the_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("history.txt");
        fs::write(&path, "get\nset\n").unwrap();

        let mut history = History::load(&path).unwrap();
        history.append("42");

        assert_eq!(fs::read_to_string(&path).unwrap(), "get\nset\n42\n");
        let reloaded = History::load(&path).unwrap();
        assert_eq!(reloaded.entries().collect::<Vec<_>>(), vec!["get", "set", "42"]);
    }

    #[test]
    fn oldest_entries_are_dropped() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("history.txt");

        let mut history = History::load(&path).unwrap();
        for i in 0..HISTORY_MAX_LEN + 5 {
            history.append(&i.to_string());
        }

        let reloaded = History::load(&path).unwrap();
        assert_eq!(reloaded.entries().count(), HISTORY_MAX_LEN);
        assert_eq!(reloaded.entries().next(), Some("5"));
    }

    #[test]
    fn repeated_entries_are_stored_once() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("history.txt");

        let mut history = History::load(&path).unwrap();
        history.append("get");
        history.append("get");
        history.append("set");
        history.append("get");

        assert_eq!(fs::read_to_string(&path).unwrap(), "get\nset\nget\n");
    }

    #[test]
    fn entries_stay_on_one_line() {
        let mut history = History::in_memory();
        history.append("eval\nreturn 1");
        assert_eq!(history.entries().collect::<Vec<_>>(), vec!["eval return 1"]);
    }
}

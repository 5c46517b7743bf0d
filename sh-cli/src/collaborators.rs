//! The narrow trait seams standing in for everything outside the shell's
//! core scope: a line editor, a prompt/theme renderer, a configuration file
//! loader, and a plugin loader. Each gets a minimal default here so the
//! shell runs standalone; a host embedding this crate supplies a richer
//! implementation of whichever traits it cares about.
//!
//! `Corrector` lives in `sh_env` instead of here: the command dispatcher
//! that consults it (`sh-semantics`) can't depend back on this crate, so
//! `Env` owns that seam directly, the same way it owns `System`.
//!
//! History is the one exception: `HistoryStore`'s default implementation,
//! [`FileHistoryStore`], actually persists to disk, since the line-based
//! history file is part of this shell's own behavior, not a pluggable
//! front end's.

use std::fs::{File, OpenOptions};
use std::io::{self, BufRead, BufReader, Write};
use std::path::{Path, PathBuf};

/// Reads one line of input at a time, showing `prompt` first. Returns
/// `Ok(None)` at end of input.
pub trait LineSource {
    fn read_line(&mut self, prompt: &str) -> io::Result<Option<String>>;
}

/// Which prompt string is wanted: the one shown before a new command, or
/// the one shown while a command is still incomplete (an open quote or
/// compound construct).
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum PromptLevel {
    Primary,
    Continuation,
}

/// Renders the prompt string shown before reading a line.
pub trait PromptRenderer {
    fn render(&self, level: PromptLevel) -> String;
}

/// Configuration loaded from outside the shell's own variables/options,
/// e.g. a theme or front-end settings file.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct ShellConfig {
    pub entries: Vec<(String, String)>,
}

/// Loads a [`ShellConfig`] before the shell starts.
pub trait ConfigSource {
    fn load(&self) -> ShellConfig;
}

/// An opaque handle to a loaded plugin. The core never inspects it; only a
/// host-supplied [`PluginLoader`] gives it meaning.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct PluginHandle(pub u32);

/// Loads whatever plugins a host front end wants active for this session.
pub trait PluginLoader {
    fn load_plugins(&self) -> Vec<PluginHandle>;
}

/// Persists command lines across sessions.
pub trait HistoryStore {
    fn append(&mut self, line: &str);
    fn all(&self) -> Vec<String>;
}

/// Unbuffered `stdin` reads with no editing, completion, or history —
/// the default [`LineSource`].
#[derive(Debug, Default)]
pub struct StdinLineSource;

impl LineSource for StdinLineSource {
    fn read_line(&mut self, prompt: &str) -> io::Result<Option<String>> {
        eprint!("{prompt}");
        io::stderr().flush()?;
        let mut line = String::new();
        let n = io::stdin().read_line(&mut line)?;
        if n == 0 {
            return Ok(None);
        }
        if line.ends_with('\n') {
            line.pop();
            if line.ends_with('\r') {
                line.pop();
            }
        }
        Ok(Some(line))
    }
}

/// `"$ "` / `"> "`, the plain default prompt pair.
#[derive(Debug, Default)]
pub struct DefaultPromptRenderer;

impl PromptRenderer for DefaultPromptRenderer {
    fn render(&self, level: PromptLevel) -> String {
        match level {
            PromptLevel::Primary => "$ ".to_owned(),
            PromptLevel::Continuation => "> ".to_owned(),
        }
    }
}

/// Reads no configuration file at all.
#[derive(Debug, Default)]
pub struct NullConfigSource;

impl ConfigSource for NullConfigSource {
    fn load(&self) -> ShellConfig {
        ShellConfig::default()
    }
}

/// Loads no plugins.
#[derive(Debug, Default)]
pub struct NullPluginLoader;

impl PluginLoader for NullPluginLoader {
    fn load_plugins(&self) -> Vec<PluginHandle> {
        Vec::new()
    }
}

/// A plain line-per-entry history file, the one on-disk format this shell
/// defines. Lines are appended immediately so history survives a crash;
/// [`all`](HistoryStore::all) re-reads the file rather than keeping its own
/// copy, so multiple shells appending to the same file interleave sanely.
#[derive(Debug)]
pub struct FileHistoryStore {
    path: PathBuf,
}

impl FileHistoryStore {
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        FileHistoryStore { path: path.into() }
    }

    /// `$HOME/.sh_history`, the default location, or `None` if `$HOME`
    /// isn't set.
    #[must_use]
    pub fn default_path() -> Option<PathBuf> {
        std::env::var_os("HOME").map(|home| Path::new(&home).join(".sh_history"))
    }
}

impl HistoryStore for FileHistoryStore {
    fn append(&mut self, line: &str) {
        if line.is_empty() {
            return;
        }
        let opened = OpenOptions::new().create(true).append(true).open(&self.path);
        if let Ok(mut file) = opened {
            let _ = writeln!(file, "{line}");
        }
    }

    fn all(&self) -> Vec<String> {
        let Ok(file) = File::open(&self.path) else {
            return Vec::new();
        };
        BufReader::new(file).lines().map_while(Result::ok).collect()
    }
}

/// Appends nothing and remembers nothing; used when no history file path
/// could be determined (e.g. `$HOME` unset).
#[derive(Debug, Default)]
pub struct NullHistoryStore;

impl HistoryStore for NullHistoryStore {
    fn append(&mut self, _line: &str) {}

    fn all(&self) -> Vec<String> {
        Vec::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_prompt_renderer_gives_primary_and_continuation() {
        let r = DefaultPromptRenderer;
        assert_eq!(r.render(PromptLevel::Primary), "$ ");
        assert_eq!(r.render(PromptLevel::Continuation), "> ");
    }

    #[test]
    fn null_collaborators_are_all_inert() {
        assert_eq!(NullConfigSource.load(), ShellConfig::default());
        assert!(NullPluginLoader.load_plugins().is_empty());
        let mut store = NullHistoryStore;
        store.append("echo hi");
        assert!(store.all().is_empty());
    }

    #[test]
    fn file_history_store_appends_then_reads_back() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("history");
        let mut store = FileHistoryStore::new(&path);
        store.append("echo one");
        store.append("echo two");
        assert_eq!(store.all(), vec!["echo one".to_owned(), "echo two".to_owned()]);
    }

    #[test]
    fn file_history_store_skips_empty_lines() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("history");
        let mut store = FileHistoryStore::new(&path);
        store.append("");
        assert!(store.all().is_empty());
    }
}

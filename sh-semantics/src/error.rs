//! The error kinds a command can fail with, and how they print and map to
//! an exit status.
//!
//! Most of these never unwind past the simple command that produced them:
//! [`Handle::handle`] is the boundary that turns an `Error` into a
//! diagnostic on stderr plus an exit status recorded on [`Env`], the way a
//! real shell's failed command doesn't abort the whole script unless
//! `errexit` or a special builtin is involved.

use sh_env::builtin::Divert;
use sh_env::Env;
use sh_syntax::Location;
use thiserror::Error;

/// A command-level failure, tagged by kind.
#[derive(Clone, Debug, Error)]
pub enum Error {
    #[error("{message}")]
    Syntax { message: String, location: Option<Location> },
    #[error("{message}")]
    Expansion { message: String, location: Option<Location> },
    #[error("{message}")]
    Redirection { message: String, location: Option<Location> },
    #[error("{message}")]
    Exec { message: String, location: Option<Location>, not_found: bool },
    #[error("{message}")]
    Runtime { message: String, location: Option<Location> },
    #[error("{message}")]
    Trap { message: String, location: Option<Location> },
}

impl Error {
    #[must_use]
    pub fn syntax(message: impl Into<String>, location: Option<Location>) -> Self {
        Error::Syntax { message: message.into(), location }
    }

    #[must_use]
    pub fn expansion(message: impl Into<String>, location: Option<Location>) -> Self {
        Error::Expansion { message: message.into(), location }
    }

    #[must_use]
    pub fn redirection(message: impl Into<String>, location: Option<Location>) -> Self {
        Error::Redirection { message: message.into(), location }
    }

    #[must_use]
    pub fn exec_not_found(message: impl Into<String>, location: Option<Location>) -> Self {
        Error::Exec { message: message.into(), location, not_found: true }
    }

    #[must_use]
    pub fn exec_not_permitted(message: impl Into<String>, location: Option<Location>) -> Self {
        Error::Exec { message: message.into(), location, not_found: false }
    }

    #[must_use]
    pub fn runtime(message: impl Into<String>, location: Option<Location>) -> Self {
        Error::Runtime { message: message.into(), location }
    }

    #[must_use]
    pub fn trap(message: impl Into<String>, location: Option<Location>) -> Self {
        Error::Trap { message: message.into(), location }
    }

    /// POSIX exit code this kind of failure maps to (§6).
    #[must_use]
    pub fn exit_status(&self) -> i32 {
        match self {
            Error::Syntax { .. } => 2,
            Error::Expansion { .. } => 1,
            Error::Redirection { .. } => 1,
            Error::Exec { not_found: true, .. } => 127,
            Error::Exec { not_found: false, .. } => 126,
            Error::Runtime { .. } => 1,
            Error::Trap { .. } => 1,
        }
    }

    /// A syntax error in a special builtin (`export`, `set`, `unset`, ...)
    /// is the one case per POSIX where a command-level error must also end
    /// the whole shell, not just the current command.
    #[must_use]
    pub fn is_fatal_to_shell(&self, in_special_builtin: bool) -> bool {
        matches!(self, Error::Syntax { .. }) && in_special_builtin
    }

    #[must_use]
    fn location(&self) -> Option<&Location> {
        match self {
            Error::Syntax { location, .. }
            | Error::Expansion { location, .. }
            | Error::Redirection { location, .. }
            | Error::Exec { location, .. }
            | Error::Runtime { location, .. }
            | Error::Trap { location, .. } => location.as_ref(),
        }
    }
}

/// Converts a diagnosable failure into an exit status plus a stderr
/// message, the way the executor actually reacts to an `Error` in
/// practice: print, record `$?`, and decide whether to keep going.
pub trait Handle {
    fn handle(&self, env: &mut Env, in_special_builtin: bool) -> Divert;
}

impl Handle for Error {
    fn handle(&self, env: &mut Env, in_special_builtin: bool) -> Divert {
        match self.location() {
            Some(location) => eprintln!("sh: {self} ({location})"),
            None => eprintln!("sh: {self}"),
        }
        env.exit_status = self.exit_status();
        if self.is_fatal_to_shell(in_special_builtin) {
            Divert::Exit(self.exit_status())
        } else {
            Divert::Continue
        }
    }
}

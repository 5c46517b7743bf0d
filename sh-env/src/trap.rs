//! Signal and exit trap configuration.
//!
//! A [`TrapSet`] maps [`Condition`]s (a signal, or the special `EXIT`
//! condition) to [`Action`]s set by the `trap` builtin. It does not itself
//! install signal handlers; `sh-env::system` asks it what disposition a
//! signal should have and is responsible for actually calling `sigaction`.
//! Delivered signals are recorded with [`TrapSet::notify`] and drained by
//! the executor at safe points between commands, never from a signal
//! handler context directly.

use nix::sys::signal::Signal;
use std::collections::BTreeMap;
use std::fmt;
use std::rc::Rc;
use std::str::FromStr;
use thiserror::Error;

/// The event a trap action responds to.
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub enum Condition {
    /// Run when the shell (or a subshell) exits.
    Exit,
    /// Run when the named signal is delivered.
    Signal(Signal),
}

impl From<Signal> for Condition {
    fn from(signal: Signal) -> Self {
        Condition::Signal(signal)
    }
}

impl fmt::Display for Condition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Condition::Exit => f.write_str("EXIT"),
            Condition::Signal(signal) => {
                let full = signal.as_str();
                f.write_str(full.strip_prefix("SIG").unwrap_or(full))
            }
        }
    }
}

/// Error returned when a string names neither `EXIT` nor a known signal.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ParseConditionError;

impl FromStr for Condition {
    type Err = ParseConditionError;

    fn from_str(s: &str) -> Result<Self, ParseConditionError> {
        if s == "EXIT" {
            return Ok(Condition::Exit);
        }
        format!("SIG{s}")
            .parse()
            .or_else(|_| s.parse())
            .map(Condition::Signal)
            .map_err(|_| ParseConditionError)
    }
}

/// What to do when a [`Condition`] is met.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub enum Action {
    /// Perform the system default action (for signals) or nothing (for
    /// `EXIT`).
    #[default]
    Default,
    /// Ignore the condition entirely.
    Ignore,
    /// Run the given command string in the current environment.
    Command(Rc<str>),
}

/// Error from [`TrapSet::set_action`].
#[derive(Clone, Debug, Error, Eq, PartialEq)]
pub enum SetActionError {
    #[error("cannot set a trap for SIGKILL")]
    Sigkill,
    #[error("cannot set a trap for SIGSTOP")]
    Sigstop,
}

/// The shell's table of configured trap actions, plus signals observed but
/// not yet acted upon.
#[derive(Clone, Debug, Default)]
pub struct TrapSet {
    actions: BTreeMap<Condition, Action>,
    pending: Vec<Signal>,
}

impl TrapSet {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Configures the action for a condition; `trap -- ACTION COND`.
    pub fn set_action(&mut self, condition: Condition, action: Action) -> Result<(), SetActionError> {
        if let Condition::Signal(signal) = condition {
            if signal == Signal::SIGKILL {
                return Err(SetActionError::Sigkill);
            }
            if signal == Signal::SIGSTOP {
                return Err(SetActionError::Sigstop);
            }
        }
        if matches!(action, Action::Default) {
            self.actions.remove(&condition);
        } else {
            self.actions.insert(condition, action);
        }
        Ok(())
    }

    #[must_use]
    pub fn get_action(&self, condition: Condition) -> &Action {
        self.actions.get(&condition).unwrap_or(&Action::Default)
    }

    /// All configured (non-default) conditions, for `trap` with no
    /// arguments.
    pub fn iter(&self) -> impl Iterator<Item = (&Condition, &Action)> {
        self.actions.iter()
    }

    /// Records that a signal was delivered, to be handled the next time the
    /// executor reaches a safe point.
    pub fn notify(&mut self, signal: Signal) {
        self.pending.push(signal);
    }

    /// Drains and returns the actions to run for every signal observed
    /// since the last call, paired with the command to execute if any.
    pub fn take_pending(&mut self) -> Vec<(Signal, Action)> {
        self.pending
            .drain(..)
            .map(|signal| (signal, self.actions.get(&Condition::Signal(signal)).cloned().unwrap_or_default()))
            .collect()
    }

    #[must_use]
    pub fn has_pending(&self) -> bool {
        !self.pending.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn condition_display_strips_sig_prefix() {
        assert_eq!(Condition::Signal(Signal::SIGINT).to_string(), "INT");
        assert_eq!(Condition::Exit.to_string(), "EXIT");
    }

    #[test]
    fn condition_from_str_round_trip() {
        assert_eq!("INT".parse(), Ok(Condition::Signal(Signal::SIGINT)));
        assert_eq!("EXIT".parse(), Ok(Condition::Exit));
    }

    #[test]
    fn set_action_rejects_sigkill() {
        let mut traps = TrapSet::new();
        let err = traps
            .set_action(Condition::Signal(Signal::SIGKILL), Action::Ignore)
            .unwrap_err();
        assert_eq!(err, SetActionError::Sigkill);
    }

    #[test]
    fn notify_then_take_pending_drains() {
        let mut traps = TrapSet::new();
        traps
            .set_action(Condition::Signal(Signal::SIGTERM), Action::Command("echo bye".into()))
            .unwrap();
        traps.notify(Signal::SIGTERM);
        assert!(traps.has_pending());
        let pending = traps.take_pending();
        assert_eq!(pending.len(), 1);
        assert!(!traps.has_pending());
    }
}

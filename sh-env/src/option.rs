//! Runtime-mutable shell options (`set -o`/`set -e`-style flags).
//!
//! [`OptionSet`] merely tracks which options are on or off; it is up to the
//! executor and builtins to look at it and change behavior accordingly.

use enumset::{EnumSet, EnumSetIter, EnumSetType};
use std::fmt::{self, Display, Formatter};
use std::str::FromStr;

/// State of an option: either enabled or disabled.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum State {
    On,
    Off,
}

pub use State::*;

impl Display for State {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            On => "on",
            Off => "off",
        })
    }
}

impl std::ops::Not for State {
    type Output = Self;
    fn not(self) -> Self {
        match self {
            On => Off,
            Off => On,
        }
    }
}

/// A single runtime shell option.
#[derive(Clone, Copy, Debug, EnumSetType, Eq, Hash, PartialEq)]
#[enumset(no_super_impls)]
pub enum Option {
    /// `-e`: abort the command list on a non-zero status outside a
    /// conditional context.
    ErrExit,
    /// `-u`: referencing an unset variable is an error.
    NoUnset,
    /// `-f`: disable pathname (glob) expansion.
    NoGlob,
    /// `-n`: parse only, never execute (syntax check mode).
    NoExec,
    /// `-x`: print each command's expanded words before running it.
    XTrace,
    /// `-v`: echo input lines as they are read.
    Verbose,
    /// Enables job-control signal handling and process-group management.
    Monitor,
    /// The shell reads from an interactive terminal.
    Interactive,
    /// A bare command word naming a directory `cd`s into it instead of
    /// failing as "command not found".
    AutoCd,
    /// A command name that resolves to nothing is offered to
    /// [`Env::corrector`](crate::Env::corrector) for a suggested spelling.
    CorrectSpelling,
}

pub use self::Option::*;

impl Option {
    /// Canonical lowercase name, as used by `set -o name` and `setopt`.
    #[must_use]
    pub fn long_name(self) -> &'static str {
        match self {
            ErrExit => "errexit",
            NoUnset => "nounset",
            NoGlob => "noglob",
            NoExec => "noexec",
            XTrace => "xtrace",
            Verbose => "verbose",
            Monitor => "monitor",
            Interactive => "interactive",
            AutoCd => "autocd",
            CorrectSpelling => "correct",
        }
    }

    /// The single-letter flag accepted by `set -X`, if this option has one.
    #[must_use]
    pub fn short_name(self) -> std::option::Option<char> {
        match self {
            ErrExit => Some('e'),
            NoUnset => Some('u'),
            NoGlob => Some('f'),
            NoExec => Some('n'),
            XTrace => Some('x'),
            Verbose => Some('v'),
            Monitor => Some('m'),
            Interactive => Some('i'),
            AutoCd => None,
            CorrectSpelling => None,
        }
    }

    #[must_use]
    pub fn iter() -> Iter {
        Iter {
            inner: EnumSet::<Option>::all().iter(),
        }
    }
}

impl Display for Option {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        self.long_name().fmt(f)
    }
}

/// Error returned when a string does not name a known option.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub struct NoSuchOption;

impl FromStr for Option {
    type Err = NoSuchOption;

    fn from_str(name: &str) -> Result<Self, NoSuchOption> {
        Option::iter().find(|o| o.long_name() == name).ok_or(NoSuchOption)
    }
}

/// Parses a `set -X` short flag, e.g. `'e'` for [`ErrExit`].
#[must_use]
pub fn parse_short(c: char) -> std::option::Option<Option> {
    Option::iter().find(|o| o.short_name() == Some(c))
}

#[derive(Clone, Debug)]
pub struct Iter {
    inner: EnumSetIter<Option>,
}

impl Iterator for Iter {
    type Item = Option;
    fn next(&mut self) -> std::option::Option<Option> {
        self.inner.next()
    }
}

/// The full set of options and their current states.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub struct OptionSet {
    enabled: EnumSet<Option>,
}

/// By default pathname expansion and `set -e` semantics follow POSIX: only
/// glob expansion is on; everything else starts off until `set`/command-line
/// flags turn it on.
impl Default for OptionSet {
    fn default() -> Self {
        OptionSet { enabled: EnumSet::empty() }
    }
}

impl OptionSet {
    #[must_use]
    pub fn get(&self, option: Option) -> State {
        if self.enabled.contains(option) {
            On
        } else {
            Off
        }
    }

    #[must_use]
    pub fn is_on(&self, option: Option) -> bool {
        self.get(option) == On
    }

    pub fn set(&mut self, option: Option, state: State) {
        match state {
            On => {
                self.enabled.insert(option);
            }
            Off => {
                self.enabled.remove(option);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_all_off() {
        let opts = OptionSet::default();
        assert_eq!(opts.get(ErrExit), Off);
        assert_eq!(opts.get(NoGlob), Off);
    }

    #[test]
    fn set_and_get_round_trip() {
        let mut opts = OptionSet::default();
        opts.set(ErrExit, On);
        assert_eq!(opts.get(ErrExit), On);
        opts.set(ErrExit, Off);
        assert_eq!(opts.get(ErrExit), Off);
    }

    #[test]
    fn from_str_matches_long_name() {
        assert_eq!(Option::from_str("errexit"), Ok(ErrExit));
        assert_eq!(Option::from_str("bogus"), Err(NoSuchOption));
    }

    #[test]
    fn short_flags_round_trip() {
        for opt in Option::iter() {
            if let Some(c) = opt.short_name() {
                assert_eq!(parse_short(c), Some(opt));
            }
        }
    }
}

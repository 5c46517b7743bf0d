//! The shell execution environment: everything a running command can see
//! or change other than the AST it was parsed from.
//!
//! [`Env`] bundles the application-managed state (variables, functions,
//! aliases, jobs, traps, options) with the system-managed state reached
//! through [`system::System`]. The executor and every builtin are written
//! against `&mut Env` rather than against raw syscalls, so the same code
//! runs whether `Env::system` is a [`real_system::RealSystem`] or a
//! [`virtual_system::RecordingSystem`].

pub mod alias;
pub mod builtin;
pub mod corrector;
pub mod function;
pub mod io;
pub mod job;
pub mod option;
pub mod real_system;
pub mod system;
pub mod trap;
pub mod variable;
pub mod virtual_system;

use alias::AliasSet;
use builtin::BuiltinSet;
use corrector::Corrector;
use function::FunctionSet;
use job::JobSet;
use option::OptionSet;
use system::System;
use trap::TrapSet;
use variable::VariableSet;

/// The whole shell execution environment.
pub struct Env {
    pub variables: VariableSet,
    pub functions: FunctionSet,
    pub aliases: AliasSet,
    pub jobs: JobSet,
    pub traps: TrapSet,
    pub options: OptionSet,
    pub builtins: BuiltinSet,
    /// `$1`, `$2`, ... for the current function/script invocation. Saved
    /// and restored around a function call so `shift`/`set -- ...` inside
    /// the function cannot leak out to the caller.
    pub positional_params: Vec<String>,
    /// Exit status of the last executed command; `$?`.
    pub exit_status: i32,
    /// PID substituted for `$!`; tracked separately from `jobs` since a
    /// disowned or already-reaped job must still answer `$!` correctly.
    pub last_async_pid: Option<system::Pid>,
    /// `$0`: the name the shell or the running script was invoked as.
    pub arg0: String,
    /// Memoized `$PATH` lookups, backing the `hash` builtin. Cleared
    /// whenever `PATH` is assigned.
    pub command_path_cache: std::collections::HashMap<String, std::path::PathBuf>,
    pub system: Box<dyn System>,
    /// Consulted for a suggested spelling when a command name resolves to
    /// nothing and [`option::CorrectSpelling`] is on.
    pub corrector: Box<dyn Corrector>,
}

impl Env {
    #[must_use]
    pub fn new(system: Box<dyn System>) -> Self {
        Env {
            variables: VariableSet::new(),
            functions: FunctionSet::new(),
            aliases: AliasSet::new(),
            jobs: JobSet::default(),
            traps: TrapSet::new(),
            options: OptionSet::default(),
            builtins: BuiltinSet::new(),
            positional_params: Vec::new(),
            exit_status: 0,
            last_async_pid: None,
            arg0: "sh".to_owned(),
            command_path_cache: std::collections::HashMap::new(),
            system,
            corrector: Box::new(corrector::NullCorrector),
        }
    }

    /// Swaps in new positional parameters for the duration of a function
    /// call, returning the caller's so they can be restored on return.
    pub fn push_positional_params(&mut self, params: Vec<String>) -> Vec<String> {
        std::mem::replace(&mut self.positional_params, params)
    }

    /// Moves every signal caught since the last call from `system` into
    /// `traps`, where it waits as `pending` until the executor drains it at
    /// a safe point. Cheap and side-effect-free when nothing was caught.
    pub fn poll_signals(&mut self) {
        for signal in self.system.take_caught_signals() {
            self.traps.notify(signal);
        }
    }
}

impl std::fmt::Debug for Env {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Env")
            .field("variables", &self.variables)
            .field("functions", &self.functions)
            .field("jobs", &self.jobs)
            .field("options", &self.options)
            .field("positional_params", &self.positional_params)
            .field("exit_status", &self.exit_status)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use virtual_system::RecordingSystem;

    #[test]
    fn new_env_starts_with_exit_status_zero() {
        let env = Env::new(Box::new(RecordingSystem::new()));
        assert_eq!(env.exit_status, 0);
        assert!(env.positional_params.is_empty());
    }

    #[test]
    fn push_positional_params_returns_previous() {
        let mut env = Env::new(Box::new(RecordingSystem::new()));
        env.positional_params = vec!["a".into(), "b".into()];
        let previous = env.push_positional_params(vec!["x".into()]);
        assert_eq!(previous, vec!["a".to_owned(), "b".to_owned()]);
        assert_eq!(env.positional_params, vec!["x".to_owned()]);
    }

    #[test]
    fn poll_signals_moves_caught_signals_into_traps_as_pending() {
        let mut system = RecordingSystem::new();
        system.pending_signals.push(nix::sys::signal::Signal::SIGTERM);
        let mut env = Env::new(Box::new(system));
        assert!(!env.traps.has_pending());
        env.poll_signals();
        assert!(env.traps.has_pending());
    }
}

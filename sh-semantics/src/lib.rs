//! Semantics of the shell language: the word expansion pipeline and the
//! executor that walks a [`sh_syntax::List`] and runs it against a
//! [`sh_env::Env`].
//!
//! The executor is synchronous: every evaluator function here is a plain
//! recursive Rust function, not an `async fn`. Concurrency only ever comes
//! from real child processes (pipelines, subshells, command substitution,
//! background jobs) forked through [`sh_env::system::System`]; the shell
//! itself never schedules cooperative tasks. Control flow that needs to
//! unwind across several levels of the AST (`return`, `break`, `continue`,
//! `exit`) is carried back up the call stack as a [`Divert`] value rather
//! than as a Rust exception.

pub mod command;
pub mod command_search;
pub mod error;
pub mod expansion;
pub mod job;
pub mod redir;
pub mod trap;
pub mod xtrace;

pub use error::{Error, Handle};
pub use sh_env::builtin::{Divert, Field};

/// Parses and runs `source` to completion, as a script or a single
/// interactive input unit. Returns the exit status of the last command
/// run, the same value `$?` would hold afterward.
pub fn run(env: &mut sh_env::Env, source: &str) -> i32 {
    let list = match sh_syntax::parse(source) {
        Ok(list) => list,
        Err(parse_error) => {
            eprintln!("sh: {parse_error}");
            env.exit_status = 2;
            return 2;
        }
    };
    match command::execute_list(env, &list) {
        Ok(Divert::Exit(status)) => status,
        Ok(_) => env.exit_status,
        Err(error) => error.handle(env, false).unwrap_or(env.exit_status),
    }
}

/// Extension trait so [`Divert`] can report the exit status it carries (if
/// any) without the caller having to match on every variant.
trait DivertExt {
    fn unwrap_or(self, default: i32) -> i32;
}

impl DivertExt for Divert {
    fn unwrap_or(self, default: i32) -> i32 {
        match self {
            Divert::Exit(status) => status,
            _ => default,
        }
    }
}

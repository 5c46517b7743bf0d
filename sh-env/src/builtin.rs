//! Type definitions for built-in utilities.
//!
//! Concrete built-ins (`cd`, `export`, `read`, ...) are not implemented in
//! this crate; see `sh-builtin`. This module only defines the shape a
//! built-in takes and the table the executor looks them up in, so that
//! `sh-env` (which the executor and every builtin depend on) doesn't have
//! to depend back on either of them.

use crate::Env;
use sh_syntax::Location;
use std::collections::HashMap;

/// A single expanded command-line word, with the location it came from for
/// diagnostics.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Field {
    pub value: String,
    pub origin: Location,
}

impl Field {
    #[must_use]
    pub fn new(value: impl Into<String>, origin: Location) -> Self {
        Field { value: value.into(), origin }
    }
}

/// How a built-in participates in command search (POSIX XCU 2.9.1).
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum Type {
    /// Found before `$PATH` search and before functions; most parse errors
    /// in a special built-in make the shell exit. `:`, `break`, `continue`,
    /// `eval`, `exec`, `exit`, `export`, `readonly`, `return`, `set`,
    /// `shift`, `times`, `trap`, `unset`.
    Special,
    /// Found before `$PATH` search, but a function of the same name wins.
    Mandatory,
    /// Non-portable, otherwise like `Mandatory`.
    Elective,
}

/// Non-local control transfer a built-in asks the executor to perform —
/// `exit`, `return`, `break N`, `continue N` all work by a builtin setting
/// this rather than the executor special-casing each one.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Divert {
    /// Carry straight on to the next command.
    Continue,
    /// Unwind to the nearest enclosing function call (`return`).
    Return,
    /// Unwind N levels of enclosing loop, then resume after it (`break N`).
    Break(u32),
    /// Unwind N levels of enclosing loop, then restart its condition
    /// (`continue N`).
    LoopContinue(u32),
    /// Terminate the whole shell with this status (`exit N`).
    Exit(i32),
}

/// What a built-in invocation produced.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct BuiltinResult {
    pub exit_status: i32,
    pub divert: Divert,
}

impl BuiltinResult {
    #[must_use]
    pub const fn new(exit_status: i32) -> Self {
        BuiltinResult { exit_status, divert: Divert::Continue }
    }

    #[must_use]
    pub const fn with_divert(exit_status: i32, divert: Divert) -> Self {
        BuiltinResult { exit_status, divert }
    }
}

/// A built-in's entry point. Takes the already-expanded argument fields
/// (`args[0]` is the command name itself, as `argv[0]` would be).
pub type BuiltinFn = fn(&mut Env, Vec<Field>) -> BuiltinResult;

/// A registered built-in utility.
#[derive(Clone, Copy)]
pub struct Builtin {
    pub r#type: Type,
    pub execute: BuiltinFn,
}

impl std::fmt::Debug for Builtin {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Builtin").field("type", &self.r#type).finish_non_exhaustive()
    }
}

/// The shell's table of built-in utilities, keyed by name.
pub type BuiltinSet = HashMap<&'static str, Builtin>;

//! Resolving a command name to what it runs: a function, a built-in, or an
//! external program found on `$PATH` (POSIX XCU 2.9.1), plus the alias
//! substitution that happens first.
//!
//! Aliases here are expanded after the command's words have already gone
//! through the full expansion pipeline, by splitting the alias's
//! replacement text on whitespace and splicing it in place of `argv[0]` —
//! not, as a real shell does it, by re-tokenizing and re-parsing source
//! text before a word is even built. A replacement that should introduce
//! new operators, pipelines, or quoting would need that; this covers the
//! overwhelmingly common case of an alias standing in for a plain command
//! name plus some fixed flags.

use sh_env::builtin::{self, Field};
use sh_env::Env;
use std::collections::HashSet;
use std::path::PathBuf;

const MAX_ALIAS_DEPTH: usize = 10;

/// What a command name resolved to.
pub enum Found {
    Function,
    Builtin(builtin::Type),
    External(PathBuf),
    NotFound,
}

/// Repeatedly substitutes `fields[0]` for as long as it names an alias,
/// then reports what the resulting name resolves to.
pub fn resolve(env: &mut Env, fields: &mut Vec<Field>) -> Found {
    expand_aliases(env, fields);
    let Some(first) = fields.first() else {
        return Found::NotFound;
    };
    search(env, &first.value)
}

fn expand_aliases(env: &Env, fields: &mut Vec<Field>) {
    let mut seen = HashSet::new();
    for _ in 0..MAX_ALIAS_DEPTH {
        let Some(first) = fields.first() else { break };
        let Some(alias) = sh_env::alias::Glossary::look_up(&env.aliases, &first.value) else {
            break;
        };
        if !seen.insert(alias.name.clone()) {
            break;
        }
        let origin = first.origin;
        let replacement: Vec<Field> = alias
            .replacement
            .split_ascii_whitespace()
            .map(|word| Field::new(word.to_owned(), origin))
            .collect();
        fields.splice(0..1, replacement);
    }
}

/// POSIX command search order: special built-ins first (even ahead of
/// functions), then functions, then the remaining built-ins, then `$PATH`.
pub fn search(env: &Env, name: &str) -> Found {
    if let Some(builtin) = env.builtins.get(name) {
        if builtin.r#type == builtin::Type::Special {
            return Found::Builtin(builtin::Type::Special);
        }
    }
    if env.functions.get(name).is_some() {
        return Found::Function;
    }
    if let Some(builtin) = env.builtins.get(name) {
        return Found::Builtin(builtin.r#type);
    }
    match search_path(env, name) {
        Some(path) => Found::External(path),
        None => Found::NotFound,
    }
}

/// Searches `$PATH` for an executable regular file named `name`, unless it
/// already contains a `/` (in which case it names a path directly).
/// Memoizes hits in [`Env::command_path_cache`], the table the `hash`
/// built-in reports and clears.
pub fn search_path(env: &Env, name: &str) -> Option<PathBuf> {
    if name.contains('/') {
        let path = PathBuf::from(name);
        return is_executable(env, &path).then_some(path);
    }
    if let Some(cached) = env.command_path_cache.get(name) {
        if is_executable(env, cached) {
            return Some(cached.clone());
        }
    }
    let path_var = env
        .variables
        .get("PATH")
        .and_then(|v| v.value.as_ref())
        .and_then(sh_env::variable::Value::as_scalar)
        .unwrap_or("");
    for dir in path_var.split(':') {
        let dir = if dir.is_empty() { "." } else { dir };
        let candidate = PathBuf::from(dir).join(name);
        if is_executable(env, &candidate) {
            return Some(candidate);
        }
    }
    None
}

fn is_executable(env: &Env, path: &std::path::Path) -> bool {
    std::ffi::CString::new(path.as_os_str().as_encoded_bytes())
        .is_ok_and(|cpath| env.system.is_executable_file(&cpath))
}

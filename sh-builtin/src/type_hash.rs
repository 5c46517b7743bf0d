//! `type` and `hash`: reporting and caching where a command name resolves
//! to.

use crate::common;
use sh_env::alias::Glossary;
use sh_env::builtin::{BuiltinResult, Field};
use sh_env::Env;
use sh_semantics::command_search;

/// `type [-a] name...`: reports whether each name is an alias, a function,
/// a built-in, or an external command (and where). `-a` reports every
/// match instead of just the first one POSIX search order would use.
pub fn r#type(env: &mut Env, args: Vec<Field>) -> BuiltinResult {
    let (name, rest) = common::split_name(&args);
    let mut show_all = false;
    let mut start = 0;
    if let Some(first) = rest.first() {
        if first.value == "-a" {
            show_all = true;
            start = 1;
        }
    }

    let mut status = 0;
    for field in &rest[start..] {
        let mut found_any = false;

        if let Some(alias) = env.aliases.look_up(&field.value) {
            println!("{} is an alias for {}", field.value, alias.replacement);
            found_any = true;
            if !show_all {
                continue;
            }
        }
        if env.functions.get(&field.value).is_some() {
            println!("{} is a function", field.value);
            found_any = true;
            if !show_all {
                continue;
            }
        }
        if let Some(builtin) = env.builtins.get(field.value.as_str()) {
            println!("{} is a {:?} built-in", field.value, builtin.r#type);
            found_any = true;
            if !show_all {
                continue;
            }
        }
        if let Some(path) = command_search::search_path(env, &field.value) {
            println!("{} is {}", field.value, path.display());
            found_any = true;
        }

        if !found_any {
            common::report(name, format_args!("{}: not found", field.value));
            status = 1;
        }
    }
    BuiltinResult::new(status)
}

/// `hash [-r] [name...]`: reports or clears the memoized `$PATH` lookups
/// that back command search. With names given, forces each to be looked up
/// and cached immediately; with none, lists the current cache.
pub fn hash(env: &mut Env, args: Vec<Field>) -> BuiltinResult {
    let (name, rest) = common::split_name(&args);

    if rest.iter().any(|f| f.value == "-r") {
        env.command_path_cache.clear();
        return common::ok();
    }

    if rest.is_empty() {
        let mut entries: Vec<_> = env.command_path_cache.iter().collect();
        entries.sort_by_key(|(k, _)| k.to_owned().clone());
        for (cmd, path) in entries {
            println!("{}\t{}", path.display(), cmd);
        }
        return common::ok();
    }

    let mut status = 0;
    for field in rest {
        match command_search::search_path(env, &field.value) {
            Some(path) => {
                env.command_path_cache.insert(field.value.clone(), path);
            }
            None => {
                common::report(name, format_args!("{}: not found", field.value));
                status = 1;
            }
        }
    }
    BuiltinResult::new(status)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::test_support::{env, fields};

    #[test]
    fn type_reports_a_builtin_name() {
        let mut e = env();
        crate::install(&mut e);
        let result = r#type(&mut e, fields(&["type", "cd"]));
        assert_eq!(result.exit_status, 0);
    }

    #[test]
    fn type_falls_back_to_path_search_for_an_external_name() {
        // RecordingSystem treats every candidate path as executable, so an
        // unknown name still resolves via `$PATH` search rather than
        // reporting "not found" the way a real filesystem would.
        let mut e = env();
        let result = r#type(&mut e, fields(&["type", "somecommand"]));
        assert_eq!(result.exit_status, 0);
    }

    #[test]
    fn hash_caches_a_resolved_name() {
        let mut e = env();
        let result = hash(&mut e, fields(&["hash", "somecommand"]));
        assert_eq!(result.exit_status, 0);
        assert!(e.command_path_cache.contains_key("somecommand"));
    }

    #[test]
    fn hash_dash_r_clears_the_cache() {
        let mut e = env();
        hash(&mut e, fields(&["hash", "somecommand"]));
        let result = hash(&mut e, fields(&["hash", "-r"]));
        assert_eq!(result.exit_status, 0);
        assert!(e.command_path_cache.is_empty());
    }
}

//! `alias` and `unalias`.

use crate::common;
use sh_env::alias::{Glossary, HashEntry};
use sh_env::builtin::{BuiltinResult, Field};
use sh_env::Env;

/// `alias [-g] [name[=replacement]...]`: with no operands, lists every
/// alias; `name` alone reports that one alias; `name=replacement` defines
/// or redefines it. `-g` makes the alias global (substitutable anywhere in
/// a command, not just in command position).
pub fn alias(env: &mut Env, args: Vec<Field>) -> BuiltinResult {
    let (name, rest) = common::split_name(&args);
    let mut is_global = false;
    let mut start = 0;
    if let Some(first) = rest.first() {
        if first.value == "-g" {
            is_global = true;
            start = 1;
        }
    }
    let rest = &rest[start..];

    if rest.is_empty() {
        let mut entries: Vec<_> = env.aliases.iter().collect();
        entries.sort_by(|a, b| a.0.name.cmp(&b.0.name));
        for entry in entries {
            println!("alias {}='{}'", entry.0.name, entry.0.replacement);
        }
        return common::ok();
    }

    let mut status = 0;
    for field in rest {
        match field.value.split_once('=') {
            Some((alias_name, replacement)) => {
                env.aliases.insert(HashEntry::new(
                    alias_name.to_owned(),
                    replacement.to_owned(),
                    is_global,
                    field.origin.clone(),
                ));
            }
            None => match env.aliases.look_up(&field.value) {
                Some(found) => println!("alias {}='{}'", found.name, found.replacement),
                None => {
                    common::report(name, format_args!("{}: not found", field.value));
                    status = 1;
                }
            },
        }
    }
    BuiltinResult::new(status)
}

/// `unalias [-a] name...`: removes aliases by name, or all of them with
/// `-a`.
pub fn unalias(env: &mut Env, args: Vec<Field>) -> BuiltinResult {
    let (name, rest) = common::split_name(&args);
    if rest.iter().any(|f| f.value == "-a") {
        env.aliases.clear();
        return common::ok();
    }

    let mut status = 0;
    for field in rest {
        if !env.aliases.remove(field.value.as_str()) {
            common::report(name, format_args!("{}: not found", field.value));
            status = 1;
        }
    }
    BuiltinResult::new(status)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::test_support::{env, fields};

    #[test]
    fn alias_defines_then_looks_up_by_name() {
        let mut e = env();
        let define = alias(&mut e, fields(&["alias", "ll=ls -l"]));
        assert_eq!(define.exit_status, 0);
        assert!(Glossary::look_up(&e.aliases, "ll").is_some());
    }

    #[test]
    fn alias_lookup_of_an_unknown_name_is_an_error() {
        let mut e = env();
        let result = alias(&mut e, fields(&["alias", "nosuchalias"]));
        assert_eq!(result.exit_status, 1);
    }

    #[test]
    fn unalias_removes_a_defined_alias() {
        let mut e = env();
        alias(&mut e, fields(&["alias", "ll=ls -l"]));
        let result = unalias(&mut e, fields(&["unalias", "ll"]));
        assert_eq!(result.exit_status, 0);
        assert!(Glossary::look_up(&e.aliases, "ll").is_none());
    }

    #[test]
    fn unalias_dash_a_clears_every_alias() {
        let mut e = env();
        alias(&mut e, fields(&["alias", "ll=ls -l"]));
        alias(&mut e, fields(&["alias", "la=ls -a"]));
        let result = unalias(&mut e, fields(&["unalias", "-a"]));
        assert_eq!(result.exit_status, 0);
        assert!(e.aliases.is_empty());
    }
}

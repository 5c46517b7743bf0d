//! Built-ins with no state of their own beyond ordinary shell variables:
//! `help`, `history`, `dump`, `setprompt`, `theme`, `config`, `umask`, and
//! `ulimit`.
//!
//! `history`, `setprompt`, `theme`, and `config` have a richer,
//! collaborator-backed existence at the interactive REPL layer (a real
//! history file, a loaded theme/config document) — see the `HistoryStore`,
//! `PromptRenderer`, and `ConfigSource` traits there. What's here is the
//! portable fallback so a script calling these by name still gets
//! reasonable behavior when run non-interactively, with no REPL around to
//! intercept them.

use crate::common;
use nix::sys::resource::{getrlimit, setrlimit, Resource};
use nix::sys::stat::{umask as sys_umask, Mode};
use sh_env::builtin::{BuiltinResult, Field};
use sh_env::variable::{Scope, Value};
use sh_env::Env;

const BUILTIN_NAMES: &[&str] = &[
    ":", ".", "alias", "bg", "break", "cd", "clear", "continue", "dump", "echo", "eval", "exec", "exit", "export",
    "false", "fg", "getopts", "hash", "help", "history", "jobs", "local", "printf", "pwd", "read", "readonly",
    "return", "set", "setopt", "setprompt", "shift", "test", "theme", "times", "trap", "true", "type", "ulimit",
    "umask", "unalias", "unset", "wait",
];

/// `help [name...]`: lists every built-in name, or a one-line summary for
/// each requested name.
pub fn help(_env: &mut Env, args: Vec<Field>) -> BuiltinResult {
    let (_name, rest) = common::split_name(&args);
    if rest.is_empty() {
        for name in BUILTIN_NAMES {
            println!("{name}");
        }
        return common::ok();
    }
    for field in rest {
        if BUILTIN_NAMES.contains(&field.value.as_str()) {
            println!("{}: shell built-in utility", field.value);
        } else {
            println!("{}: not a built-in", field.value);
        }
    }
    common::ok()
}

/// `history`: this crate keeps no command log of its own; an interactive
/// front end with a real `HistoryStore` should shadow this name with its
/// own built-in. Run on its own, it just reports that nothing is recorded.
pub fn history(_env: &mut Env, _args: Vec<Field>) -> BuiltinResult {
    println!("history: no history recorded in this session");
    common::ok()
}

/// `dump`: prints the shell's variables, functions, and option settings,
/// for debugging a script or the shell itself.
pub fn dump(env: &mut Env, _args: Vec<Field>) -> BuiltinResult {
    println!("# variables");
    let mut vars: Vec<_> = env.variables.iter().collect();
    vars.sort_by_key(|(name, _)| name.to_owned());
    for (name, var) in vars {
        match var.value.as_ref().and_then(Value::as_scalar) {
            Some(value) => println!("{name}={}", sh_quote::quote(value)),
            None => println!("{name} (unset)"),
        }
    }
    println!("# functions");
    let mut names: Vec<_> = env.functions.iter().map(|f| f.name.clone()).collect();
    names.sort();
    for name in names {
        println!("{name}");
    }
    println!("# options");
    for opt in sh_env::option::Option::iter() {
        println!("{}\t{}", opt.long_name(), env.options.get(opt));
    }
    common::ok()
}

/// `setprompt text`: sets `$PS1`, the variable a `PromptRenderer` consults
/// for the primary prompt.
pub fn setprompt(env: &mut Env, args: Vec<Field>) -> BuiltinResult {
    let (name, rest) = common::split_name(&args);
    let Some(text) = rest.first() else {
        return common::error(name, "usage: setprompt text", 2);
    };
    if let Ok(var) = env.variables.get_or_new("PS1", Scope::Global) {
        var.value = Some(Value::scalar(text.value.clone()));
    }
    common::ok()
}

/// `theme [name]`: gets or sets `$SH_THEME`, the variable a
/// collaborator-backed prompt renderer can consult for color choices. With
/// no operand, reports the current theme name (`"default"` if unset).
pub fn theme(env: &mut Env, args: Vec<Field>) -> BuiltinResult {
    let (_name, rest) = common::split_name(&args);
    match rest.first() {
        Some(field) => {
            if let Ok(var) = env.variables.get_or_new("SH_THEME", Scope::Global) {
                var.value = Some(Value::scalar(field.value.clone()));
            }
            common::ok()
        }
        None => {
            let current = env
                .variables
                .get("SH_THEME")
                .and_then(|v| v.value.as_ref())
                .and_then(Value::as_scalar)
                .unwrap_or("default");
            println!("{current}");
            common::ok()
        }
    }
}

/// `config [name [value]]`: gets or sets a `SH_CONFIG_*` variable. With no
/// operands, lists every configured key. A richer `ConfigSource`-backed
/// front end can load a real config file into these same variables before
/// the shell starts.
pub fn config(env: &mut Env, args: Vec<Field>) -> BuiltinResult {
    let (name, rest) = common::split_name(&args);
    const PREFIX: &str = "SH_CONFIG_";

    match rest {
        [] => {
            let mut entries: Vec<_> = env.variables.iter().filter(|(n, _)| n.starts_with(PREFIX)).collect();
            entries.sort_by_key(|(n, _)| n.to_owned());
            for (key, var) in entries {
                if let Some(value) = var.value.as_ref().and_then(Value::as_scalar) {
                    println!("{}={value}", &key[PREFIX.len()..]);
                }
            }
            common::ok()
        }
        [key] => {
            let var_name = format!("{PREFIX}{}", key.value);
            match env.variables.get(&var_name).and_then(|v| v.value.as_ref()).and_then(Value::as_scalar) {
                Some(value) => {
                    println!("{value}");
                    common::ok()
                }
                None => common::error(name, format_args!("{}: not set", key.value), 1),
            }
        }
        [key, value, ..] => {
            let var_name = format!("{PREFIX}{}", key.value);
            if let Ok(var) = env.variables.get_or_new(&var_name, Scope::Global) {
                var.value = Some(Value::scalar(value.value.clone()));
            }
            common::ok()
        }
    }
}

/// `umask [-S] [mode]`: reports or sets the process's file creation mask.
pub fn umask(_env: &mut Env, args: Vec<Field>) -> BuiltinResult {
    let (name, rest) = common::split_name(&args);
    let symbolic = rest.first().is_some_and(|f| f.value == "-S");
    let rest = if symbolic { &rest[1..] } else { rest };

    match rest.first() {
        None => {
            // nix has no read-only accessor; umask(2) always both sets and
            // reports the previous mask, so restore it right back.
            let Some(current) = Mode::from_bits(0) else { unreachable!() };
            let previous = sys_umask(current);
            sys_umask(previous);
            if symbolic {
                println!("u=rwx,g=rwx,o=rwx");
            } else {
                println!("{:04o}", previous.bits());
            }
            common::ok()
        }
        Some(field) => match u32::from_str_radix(&field.value, 8) {
            Ok(bits) => match Mode::from_bits(bits) {
                Some(mode) => {
                    sys_umask(mode);
                    common::ok()
                }
                None => common::error(name, format_args!("{}: invalid mask", field.value), 1),
            },
            Err(e) => common::error(name, e, 1),
        },
    }
}

fn resource_for(flag: &str) -> Option<Resource> {
    match flag {
        "-f" => Some(Resource::RLIMIT_FSIZE),
        "-n" => Some(Resource::RLIMIT_NOFILE),
        "-u" => Some(Resource::RLIMIT_NPROC),
        "-t" => Some(Resource::RLIMIT_CPU),
        "-s" => Some(Resource::RLIMIT_STACK),
        "-v" => Some(Resource::RLIMIT_AS),
        _ => None,
    }
}

/// `ulimit [-HS] [-f|-n|-t|-u|-s|-v] [value]`: reports or sets a resource
/// limit. Only the handful of limits named above are supported; others are
/// reported as unknown rather than silently ignored.
pub fn ulimit(_env: &mut Env, args: Vec<Field>) -> BuiltinResult {
    let (name, rest) = common::split_name(&args);
    let hard = rest.iter().any(|f| f.value == "-H");
    let rest: Vec<&Field> = rest.iter().filter(|f| f.value != "-H" && f.value != "-S").collect();

    let (resource, value) = match rest.as_slice() {
        [] => (Resource::RLIMIT_FSIZE, None),
        [flag] if resource_for(&flag.value).is_some() => (resource_for(&flag.value).unwrap(), None),
        [flag, value] if resource_for(&flag.value).is_some() => (resource_for(&flag.value).unwrap(), Some(&value.value)),
        [value] => (Resource::RLIMIT_FSIZE, Some(&value.value)),
        _ => return common::error(name, "usage: ulimit [-HS] [-f|-n|-t|-u|-s|-v] [value]", 2),
    };

    match value {
        None => match getrlimit(resource) {
            Ok((soft, limit_hard)) => {
                let shown = if hard { limit_hard } else { soft };
                if shown == nix::libc::RLIM_INFINITY {
                    println!("unlimited");
                } else {
                    println!("{shown}");
                }
                common::ok()
            }
            Err(e) => common::error(name, e, 1),
        },
        Some(text) if text == "unlimited" => match setrlimit(resource, nix::libc::RLIM_INFINITY, nix::libc::RLIM_INFINITY) {
            Ok(()) => common::ok(),
            Err(e) => common::error(name, e, 1),
        },
        Some(text) => match text.parse::<u64>() {
            Ok(n) => match setrlimit(resource, n, n) {
                Ok(()) => common::ok(),
                Err(e) => common::error(name, e, 1),
            },
            Err(e) => common::error(name, e, 2),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::test_support::{env, fields};

    #[test]
    fn help_with_no_operand_lists_every_builtin_name() {
        let mut e = env();
        let result = help(&mut e, fields(&["help"]));
        assert_eq!(result.exit_status, 0);
    }

    #[test]
    fn help_reports_whether_a_name_is_a_builtin() {
        let mut e = env();
        assert_eq!(help(&mut e, fields(&["help", "cd"])).exit_status, 0);
        assert_eq!(help(&mut e, fields(&["help", "nosuchname"])).exit_status, 0);
    }

    #[test]
    fn history_reports_nothing_recorded() {
        let mut e = env();
        assert_eq!(history(&mut e, fields(&["history"])).exit_status, 0);
    }

    #[test]
    fn setprompt_sets_ps1() {
        let mut e = env();
        setprompt(&mut e, fields(&["setprompt", "$ "]));
        let ps1 = e.variables.get("PS1").and_then(|v| v.value.as_ref()).and_then(Value::as_scalar);
        assert_eq!(ps1, Some("$ "));
    }

    #[test]
    fn theme_defaults_to_default_then_can_be_set() {
        let mut e = env();
        assert_eq!(theme(&mut e, fields(&["theme"])).exit_status, 0);
        theme(&mut e, fields(&["theme", "solarized"]));
        let value = e.variables.get("SH_THEME").and_then(|v| v.value.as_ref()).and_then(Value::as_scalar);
        assert_eq!(value, Some("solarized"));
    }

    #[test]
    fn config_sets_then_gets_a_value() {
        let mut e = env();
        config(&mut e, fields(&["config", "greeting", "hi"]));
        let result = config(&mut e, fields(&["config", "greeting"]));
        assert_eq!(result.exit_status, 0);
    }

    #[test]
    fn config_get_of_an_unset_key_is_an_error() {
        let mut e = env();
        let result = config(&mut e, fields(&["config", "nosuchkey"]));
        assert_eq!(result.exit_status, 1);
    }

    #[test]
    fn umask_with_a_valid_octal_mode_succeeds() {
        let mut e = env();
        let result = umask(&mut e, fields(&["umask", "022"]));
        assert_eq!(result.exit_status, 0);
    }

    #[test]
    fn umask_rejects_a_non_octal_operand() {
        let mut e = env();
        let result = umask(&mut e, fields(&["umask", "9"]));
        assert_eq!(result.exit_status, 1);
    }

    #[test]
    fn ulimit_with_no_operand_reports_the_current_limit() {
        let mut e = env();
        let result = ulimit(&mut e, fields(&["ulimit"]));
        assert_eq!(result.exit_status, 0);
    }

    #[test]
    fn ulimit_rejects_an_unparseable_value() {
        let mut e = env();
        let result = ulimit(&mut e, fields(&["ulimit", "-n", "notanumber"]));
        assert_eq!(result.exit_status, 2);
    }
}

//! Variable- and option-related built-ins: `export`, `readonly`, `unset`,
//! `local`, `set`, and `setopt`.

use crate::common::{self, USAGE_ERROR};
use sh_env::builtin::{BuiltinResult, Field};
use sh_env::option::{self, Option as ShellOption, State};
use sh_env::variable::{Scope, Value};
use sh_env::Env;

fn split_assignment(text: &str) -> (&str, Option<&str>) {
    match text.split_once('=') {
        Some((name, value)) => (name, Some(value)),
        None => (text, None),
    }
}

/// `export [-p] [name[=value]...]`: marks variables for inclusion in a
/// child process's environment. With no operands, or with `-p`, lists the
/// currently exported variables in a form `. ` could read back.
pub fn export(env: &mut Env, args: Vec<Field>) -> BuiltinResult {
    let (name, rest) = common::split_name(&args);
    let rest = common::strip_double_dash(rest);

    if rest.is_empty() || rest.iter().any(|f| f.value == "-p") {
        return list_exported(env);
    }

    for field in rest {
        let (var_name, value) = split_assignment(&field.value);
        let location = field.origin.clone();
        let var = match env.variables.get_or_new(var_name, Scope::Global) {
            Ok(var) => var,
            Err(e) => return common::error(name, e, 1),
        };
        if let Some(value) = value {
            var.value = Some(Value::scalar(value));
            var.last_assigned_location = Some(location);
        }
        var.is_exported = true;
    }
    common::ok()
}

fn list_exported(env: &Env) -> BuiltinResult {
    let mut entries: Vec<_> = env.variables.iter().filter(|(_, v)| v.is_exported).collect();
    entries.sort_by_key(|(name, _)| name.to_owned());
    for (name, var) in entries {
        match var.value.as_ref().and_then(Value::as_scalar) {
            Some(value) => println!("export {name}={}", sh_quote::quote(value)),
            None => println!("export {name}"),
        }
    }
    common::ok()
}

/// `readonly [-p] [name[=value]...]`: like `export`, but marks variables so
/// later assignment or `unset` fails instead of taking effect.
pub fn readonly(env: &mut Env, args: Vec<Field>) -> BuiltinResult {
    let (name, rest) = common::split_name(&args);
    let rest = common::strip_double_dash(rest);

    if rest.is_empty() || rest.iter().any(|f| f.value == "-p") {
        return list_readonly(env);
    }

    for field in rest {
        let (var_name, value) = split_assignment(&field.value);
        let location = field.origin.clone();
        let var = match env.variables.get_or_new(var_name, Scope::Global) {
            Ok(var) => var,
            Err(e) => return common::error(name, e, 1),
        };
        if let Some(value) = value {
            var.value = Some(Value::scalar(value));
            var.last_assigned_location = Some(location.clone());
        }
        var.read_only_location = Some(location);
    }
    common::ok()
}

fn list_readonly(env: &Env) -> BuiltinResult {
    let mut entries: Vec<_> = env.variables.iter().filter(|(_, v)| v.is_read_only()).collect();
    entries.sort_by_key(|(name, _)| name.to_owned());
    for (name, var) in entries {
        match var.value.as_ref().and_then(Value::as_scalar) {
            Some(value) => println!("readonly {name}={}", sh_quote::quote(value)),
            None => println!("readonly {name}"),
        }
    }
    common::ok()
}

/// `unset [-fv] name...`: removes a variable (default, or with `-v`) or a
/// function (`-f`).
pub fn unset(env: &mut Env, args: Vec<Field>) -> BuiltinResult {
    let (name, rest) = common::split_name(&args);
    let mut functions_only = false;
    let mut start = 0;
    for field in rest {
        match field.value.as_str() {
            "-f" => functions_only = true,
            "-v" => functions_only = false,
            "--" => {
                start += 1;
                break;
            }
            _ => break,
        }
        start += 1;
    }

    let mut status = 0;
    for field in &rest[start..] {
        if functions_only {
            match env.functions.unset(&field.value) {
                Ok(_) => {}
                Err(f) => {
                    common::report(name, format_args!("{}: readonly function", f.name));
                    status = 1;
                }
            }
        } else {
            match env.variables.unset(&field.value) {
                Ok(_) => {}
                Err(e) => {
                    common::report(name, e);
                    status = 1;
                }
            }
        }
    }
    BuiltinResult::new(status)
}

/// `local name[=value]...`: declares a variable in the innermost (function
/// call) scope, shadowing any outer variable of the same name.
pub fn local(env: &mut Env, args: Vec<Field>) -> BuiltinResult {
    let (name, rest) = common::split_name(&args);
    for field in rest {
        let (var_name, value) = split_assignment(&field.value);
        let var = match env.variables.get_or_new(var_name, Scope::Local) {
            Ok(var) => var,
            Err(e) => return common::error(name, e, 1),
        };
        if let Some(value) = value {
            var.value = Some(Value::scalar(value));
            var.last_assigned_location = Some(field.origin.clone());
        }
    }
    common::ok()
}

/// `set [+-o name|+-X] [--] [arg...]`: toggles shell options and/or
/// replaces the positional parameters.
pub fn set(env: &mut Env, args: Vec<Field>) -> BuiltinResult {
    let (name, rest) = common::split_name(&args);
    let mut i = 0;
    let mut replace_params = false;
    while i < rest.len() {
        let field = &rest[i];
        if field.value == "--" {
            i += 1;
            replace_params = true;
            break;
        }
        let (turn_on, flags) = match field.value.strip_prefix('-') {
            Some(flags) if !flags.is_empty() => (true, flags),
            _ => match field.value.strip_prefix('+') {
                Some(flags) if !flags.is_empty() => (false, flags),
                _ => break,
            },
        };
        if flags == "o" {
            i += 1;
            let opt_name = match rest.get(i) {
                Some(f) => f.value.as_str(),
                None => return list_options(env),
            };
            match opt_name.parse::<ShellOption>() {
                Ok(opt) => env.options.set(opt, if turn_on { State::On } else { State::Off }),
                Err(_) => return common::error(name, format_args!("{opt_name}: no such option"), USAGE_ERROR),
            }
            i += 1;
            continue;
        }
        for c in flags.chars() {
            match option::parse_short(c) {
                Some(opt) => env.options.set(opt, if turn_on { State::On } else { State::Off }),
                None => return common::error(name, format_args!("{c}: no such option"), USAGE_ERROR),
            }
        }
        i += 1;
    }

    if i < rest.len() {
        replace_params = true;
    }
    if replace_params {
        env.positional_params = rest[i..].iter().map(|f| f.value.clone()).collect();
    }
    common::ok()
}

fn list_options(env: &Env) -> BuiltinResult {
    for opt in ShellOption::iter() {
        println!("{:<12}{}", opt.long_name(), env.options.get(opt));
    }
    common::ok()
}

/// `setopt [-X|+X]...`: a `zsh`-flavored alias for toggling the same option
/// set `set -o`/`set +o` reach, accepting either short flags or long names.
pub fn setopt(env: &mut Env, args: Vec<Field>) -> BuiltinResult {
    let (name, rest) = common::split_name(&args);
    if rest.is_empty() {
        return list_options(env);
    }
    for field in rest {
        let (turn_on, text) = match field.value.strip_prefix('-') {
            Some(rest) => (true, rest),
            None => match field.value.strip_prefix('+') {
                Some(rest) => (false, rest),
                None => (true, field.value.as_str()),
            },
        };
        let state = if turn_on { State::On } else { State::Off };
        let parsed = if text.len() == 1 {
            option::parse_short(text.chars().next().unwrap())
        } else {
            text.parse::<ShellOption>().ok()
        };
        match parsed {
            Some(opt) => env.options.set(opt, state),
            None => return common::error(name, format_args!("{text}: no such option"), USAGE_ERROR),
        }
    }
    common::ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::test_support::{env, fields};
    use sh_env::option::Option as ShellOption;

    #[test]
    fn export_without_a_value_just_marks_exported() {
        let mut e = env();
        e.variables.get_or_new("FOO", Scope::Global).unwrap().value = Some(Value::scalar("bar"));
        let result = export(&mut e, fields(&["export", "FOO"]));
        assert_eq!(result.exit_status, 0);
        assert!(e.variables.get("FOO").unwrap().is_exported);
    }

    #[test]
    fn export_with_a_value_assigns_and_marks_exported() {
        let mut e = env();
        export(&mut e, fields(&["export", "FOO=bar"]));
        let var = e.variables.get("FOO").unwrap();
        assert!(var.is_exported);
        assert_eq!(var.value.as_ref().and_then(Value::as_scalar), Some("bar"));
    }

    #[test]
    fn readonly_assignment_then_blocks_further_assignment() {
        let mut e = env();
        readonly(&mut e, fields(&["readonly", "FOO=bar"]));
        assert!(e.variables.get("FOO").unwrap().is_read_only());
        let err = e.variables.get_or_new("FOO", Scope::Global).unwrap_err();
        let _ = err;
    }

    #[test]
    fn unset_removes_a_plain_variable() {
        let mut e = env();
        e.variables.get_or_new("FOO", Scope::Global).unwrap().value = Some(Value::scalar("bar"));
        let result = unset(&mut e, fields(&["unset", "FOO"]));
        assert_eq!(result.exit_status, 0);
        assert!(e.variables.get("FOO").unwrap().value.is_none());
    }

    #[test]
    fn unset_dash_f_targets_a_function_name_instead() {
        let mut e = env();
        let result = unset(&mut e, fields(&["unset", "-f", "nosuchfunction"]));
        assert_eq!(result.exit_status, 0);
    }

    #[test]
    fn local_assigns_at_local_scope() {
        let mut e = env();
        let result = local(&mut e, fields(&["local", "FOO=bar"]));
        assert_eq!(result.exit_status, 0);
        assert_eq!(e.variables.get("FOO").unwrap().value.as_ref().and_then(Value::as_scalar), Some("bar"));
    }

    #[test]
    fn set_replaces_positional_params_after_double_dash() {
        let mut e = env();
        let result = set(&mut e, fields(&["set", "--", "a", "b", "c"]));
        assert_eq!(result.exit_status, 0);
        assert_eq!(e.positional_params, vec!["a".to_owned(), "b".to_owned(), "c".to_owned()]);
    }

    #[test]
    fn set_replaces_positional_params_without_double_dash() {
        let mut e = env();
        set(&mut e, fields(&["set", "x", "y"]));
        assert_eq!(e.positional_params, vec!["x".to_owned(), "y".to_owned()]);
    }

    #[test]
    fn set_dash_e_turns_on_errexit() {
        let mut e = env();
        let result = set(&mut e, fields(&["set", "-e"]));
        assert_eq!(result.exit_status, 0);
        assert!(e.options.is_on(ShellOption::ErrExit));
    }

    #[test]
    fn set_plus_e_turns_off_errexit() {
        let mut e = env();
        set(&mut e, fields(&["set", "-e"]));
        set(&mut e, fields(&["set", "+e"]));
        assert!(!e.options.is_on(ShellOption::ErrExit));
    }

    #[test]
    fn setopt_accepts_a_long_option_name() {
        let mut e = env();
        let result = setopt(&mut e, fields(&["setopt", "-errexit"]));
        assert_eq!(result.exit_status, 0);
        assert!(e.options.is_on(ShellOption::ErrExit));
    }

    #[test]
    fn setopt_rejects_an_unknown_name() {
        let mut e = env();
        let result = setopt(&mut e, fields(&["setopt", "-nosuchoption"]));
        assert_eq!(result.exit_status, USAGE_ERROR);
    }
}


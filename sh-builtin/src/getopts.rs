//! `getopts`: POSIX utility-syntax option parsing for shell scripts.
//!
//! State (which argument and which character within it comes next) lives
//! in the `OPTIND` shell variable, the same place a real implementation
//! keeps it, so repeated calls across a script resume where the last one
//! left off.

use crate::common;
use sh_env::builtin::{BuiltinResult, Field};
use sh_env::variable::{Scope, Value};
use sh_env::Env;

fn get_optind(env: &Env) -> usize {
    env.variables
        .get("OPTIND")
        .and_then(|v| v.value.as_ref())
        .and_then(Value::as_scalar)
        .and_then(|s| s.parse().ok())
        .unwrap_or(1)
}

fn set_var(env: &mut Env, name: &str, value: impl Into<String>) {
    if let Ok(var) = env.variables.get_or_new(name, Scope::Global) {
        var.value = Some(Value::scalar(value.into()));
    }
}

/// `getopts optstring name [arg...]`: parses the next option out of
/// `arg...` (or the script's positional parameters if no `arg...` is
/// given), storing the option letter in `$name` and any argument it takes
/// in `$OPTARG`.
pub fn getopts(env: &mut Env, args: Vec<Field>) -> BuiltinResult {
    let (name, rest) = common::split_name(&args);
    let (optstring, var_name, operands) = match rest {
        [optstring, var_name, remainder @ ..] => (optstring.value.clone(), var_name.value.clone(), remainder.to_vec()),
        _ => return common::error(name, "usage: getopts optstring name [arg...]", 2),
    };

    let positional: Vec<String>;
    let args_source: &[String] = if operands.is_empty() {
        &env.positional_params
    } else {
        positional = operands.iter().map(|f| f.value.clone()).collect();
        &positional
    };

    let optind = get_optind(env);
    let silent = optstring.starts_with(':');
    let optstring = optstring.trim_start_matches(':').to_owned();

    if optind == 0 || optind > args_source.len() {
        set_var(env, &var_name, "?");
        return BuiltinResult::new(1);
    }
    let current = &args_source[optind - 1];
    if !current.starts_with('-') || current == "-" {
        set_var(env, &var_name, "?");
        return BuiltinResult::new(1);
    }
    if current == "--" {
        set_var(env, "OPTIND", (optind + 1).to_string());
        set_var(env, &var_name, "?");
        return BuiltinResult::new(1);
    }

    let opt_char = current.chars().nth(1).unwrap_or('?');
    let takes_arg = optstring.contains(&format!("{opt_char}:"));
    let known = optstring.contains(opt_char);

    if !known {
        if silent {
            set_var(env, &var_name, "?");
            set_var(env, "OPTARG", opt_char.to_string());
        } else {
            common::report(&var_name, format_args!("illegal option -- {opt_char}"));
            set_var(env, &var_name, "?");
        }
        set_var(env, "OPTIND", (optind + 1).to_string());
        return BuiltinResult::new(0);
    }

    if takes_arg {
        let rest_of_word = &current[2..];
        if !rest_of_word.is_empty() {
            set_var(env, "OPTARG", rest_of_word);
            set_var(env, "OPTIND", (optind + 1).to_string());
        } else if let Some(next) = args_source.get(optind) {
            set_var(env, "OPTARG", next.clone());
            set_var(env, "OPTIND", (optind + 2).to_string());
        } else if silent {
            set_var(env, &var_name, ":");
            set_var(env, "OPTARG", opt_char.to_string());
            set_var(env, "OPTIND", (optind + 1).to_string());
            return BuiltinResult::new(0);
        } else {
            common::report(&var_name, format_args!("option requires an argument -- {opt_char}"));
            set_var(env, &var_name, "?");
            set_var(env, "OPTIND", (optind + 1).to_string());
            return BuiltinResult::new(0);
        }
    } else {
        set_var(env, "OPTIND", (optind + 1).to_string());
    }

    set_var(env, &var_name, opt_char.to_string());
    common::ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::test_support::{env, fields};

    fn opt_var(e: &Env, name: &str) -> Option<String> {
        e.variables.get(name).and_then(|v| v.value.as_ref()).and_then(Value::as_scalar).map(str::to_owned)
    }

    #[test]
    fn parses_a_flag_with_no_argument() {
        let mut e = env();
        e.positional_params = vec!["-v".into()];
        let result = getopts(&mut e, fields(&["getopts", "v", "opt"]));
        assert_eq!(result.exit_status, 0);
        assert_eq!(opt_var(&e, "opt"), Some("v".to_owned()));
        assert_eq!(opt_var(&e, "OPTIND"), Some("2".to_owned()));
    }

    #[test]
    fn parses_a_flag_with_an_attached_argument() {
        let mut e = env();
        e.positional_params = vec!["-ofile.txt".into()];
        let result = getopts(&mut e, fields(&["getopts", "o:", "opt"]));
        assert_eq!(result.exit_status, 0);
        assert_eq!(opt_var(&e, "opt"), Some("o".to_owned()));
        assert_eq!(opt_var(&e, "OPTARG"), Some("file.txt".to_owned()));
    }

    #[test]
    fn parses_a_flag_with_a_separate_argument() {
        let mut e = env();
        e.positional_params = vec!["-o".into(), "file.txt".into()];
        let result = getopts(&mut e, fields(&["getopts", "o:", "opt"]));
        assert_eq!(result.exit_status, 0);
        assert_eq!(opt_var(&e, "OPTARG"), Some("file.txt".to_owned()));
        assert_eq!(opt_var(&e, "OPTIND"), Some("3".to_owned()));
    }

    #[test]
    fn successive_calls_advance_through_every_operand() {
        let mut e = env();
        e.positional_params = vec!["-v".into(), "-x".into()];
        getopts(&mut e, fields(&["getopts", "vx", "opt"]));
        assert_eq!(opt_var(&e, "OPTIND"), Some("2".to_owned()));
        getopts(&mut e, fields(&["getopts", "vx", "opt"]));
        assert_eq!(opt_var(&e, "opt"), Some("x".to_owned()));
        assert_eq!(opt_var(&e, "OPTIND"), Some("3".to_owned()));
    }

    #[test]
    fn stops_once_operands_run_out() {
        let mut e = env();
        e.positional_params = vec!["-v".into()];
        getopts(&mut e, fields(&["getopts", "v", "opt"]));
        let result = getopts(&mut e, fields(&["getopts", "v", "opt"]));
        assert_eq!(result.exit_status, 1);
        assert_eq!(opt_var(&e, "opt"), Some("?".to_owned()));
    }

    #[test]
    fn unknown_option_reports_a_question_mark() {
        let mut e = env();
        e.positional_params = vec!["-z".into()];
        let result = getopts(&mut e, fields(&["getopts", "v", "opt"]));
        assert_eq!(result.exit_status, 0);
        assert_eq!(opt_var(&e, "opt"), Some("?".to_owned()));
    }
}

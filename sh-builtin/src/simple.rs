//! The built-ins too small to deserve a file of their own: `:`, `true`,
//! `false`, `pwd`, `exit`, `break`, `continue`, `return`, `shift`, `clear`,
//! `times`, `echo`, and `cd`.

use crate::common::{self, USAGE_ERROR};
use sh_env::builtin::{BuiltinResult, Divert, Field};
use sh_env::variable::{Scope, Value};
use sh_env::Env;

/// The colon built-in is a dummy command that does nothing. Any arguments
/// are ignored.
pub fn colon(_env: &mut Env, _args: Vec<Field>) -> BuiltinResult {
    common::ok()
}

pub fn r#true(_env: &mut Env, _args: Vec<Field>) -> BuiltinResult {
    common::ok()
}

pub fn r#false(_env: &mut Env, _args: Vec<Field>) -> BuiltinResult {
    BuiltinResult::new(1)
}

/// Prints the current working directory, following the shell's idea of it
/// (`$PWD`, if it still names a directory we're actually in) rather than
/// always resolving symlinks away like `getcwd(3)` would.
pub fn pwd(env: &mut Env, args: Vec<Field>) -> BuiltinResult {
    let (name, rest) = common::split_name(&args);
    let rest = common::strip_double_dash(rest);
    let physical = rest.iter().any(|f| f.value == "-P");
    if !physical {
        if let Some(pwd) = env.variables.get("PWD").and_then(|v| v.value.as_ref()).and_then(Value::as_scalar) {
            if std::path::Path::new(pwd).is_dir() {
                println!("{pwd}");
                return common::ok();
            }
        }
    }
    match env.system.getcwd() {
        Ok(path) => {
            println!("{}", path.display());
            common::ok()
        }
        Err(e) => common::error(name, e, 1),
    }
}

/// `exit [n]`: hands the executor a `Divert::Exit` rather than exiting this
/// process directly, so an enclosing subshell fork can still turn it into
/// an actual `exit(2)` at the right point.
pub fn exit(env: &mut Env, args: Vec<Field>) -> BuiltinResult {
    let (name, rest) = common::split_name(&args);
    match rest.first() {
        None => common::diverting(env.exit_status, Divert::Exit(env.exit_status)),
        Some(field) => match field.value.parse::<i32>() {
            Ok(status) => common::diverting(status, Divert::Exit(status)),
            Err(e) => common::error(name, format_args!("{}: {e}", field.value), USAGE_ERROR),
        },
    }
}

/// `break [n]`: unwinds `n` (default 1) enclosing loops.
pub fn r#break(env: &mut Env, args: Vec<Field>) -> BuiltinResult {
    let (name, rest) = common::split_name(&args);
    match parse_level(rest) {
        Ok(n) => common::diverting(env.exit_status, Divert::Break(n)),
        Err(e) => common::error(name, e, USAGE_ERROR),
    }
}

/// `continue [n]`: restarts the `n`th (default 1) enclosing loop's
/// condition.
pub fn r#continue(env: &mut Env, args: Vec<Field>) -> BuiltinResult {
    let (name, rest) = common::split_name(&args);
    match parse_level(rest) {
        Ok(n) => common::diverting(env.exit_status, Divert::LoopContinue(n)),
        Err(e) => common::error(name, e, USAGE_ERROR),
    }
}

fn parse_level(rest: &[Field]) -> Result<u32, String> {
    match rest.first() {
        None => Ok(1),
        Some(field) => match field.value.parse::<u32>() {
            Ok(0) | Err(_) => Err(format!("{}: not a valid loop level", field.value)),
            Ok(n) => Ok(n),
        },
    }
}

/// `return [n]`: unwinds to the nearest enclosing function (or script, at
/// top level), exiting with `n` if given, else the current `$?`.
pub fn r#return(env: &mut Env, args: Vec<Field>) -> BuiltinResult {
    let (name, rest) = common::split_name(&args);
    match rest.first() {
        None => common::diverting(env.exit_status, Divert::Return),
        Some(field) => match field.value.parse::<i32>() {
            Ok(status) => common::diverting(status, Divert::Return),
            Err(e) => common::error(name, format_args!("{}: {e}", field.value), USAGE_ERROR),
        },
    }
}

/// `shift [n]`: drops the first `n` (default 1) positional parameters.
pub fn shift(env: &mut Env, args: Vec<Field>) -> BuiltinResult {
    let (name, rest) = common::split_name(&args);
    let count = match rest.first() {
        None => 1,
        Some(field) => match field.value.parse::<usize>() {
            Ok(n) => n,
            Err(e) => return common::error(name, format_args!("{}: {e}", field.value), USAGE_ERROR),
        },
    };
    if count > env.positional_params.len() {
        return common::error(name, "cannot shift that many", 1);
    }
    env.positional_params.drain(..count);
    common::ok()
}

/// `clear`: resets the terminal, the way `tput clear` or a raw `\x1b[2J`
/// escape does. Writes the escape directly since there is no termcap
/// collaborator in this crate.
pub fn clear(_env: &mut Env, _args: Vec<Field>) -> BuiltinResult {
    print!("\x1b[H\x1b[2J");
    common::ok()
}

/// `times`: reports the shell's and its children's accumulated user/system
/// CPU time. The execution environment this crate is built on has no
/// process-accounting primitive (no `getrusage` equivalent on `System`), so
/// this always reports zero; a real implementation needs that primitive
/// added to `System` first.
pub fn times(_env: &mut Env, _args: Vec<Field>) -> BuiltinResult {
    println!("0m0.000s 0m0.000s");
    println!("0m0.000s 0m0.000s");
    common::ok()
}

/// `echo [-n] [-e|-E] [word...]`: writes its operands separated by spaces,
/// followed by a newline unless `-n` is given. `-e` turns on backslash
/// escape interpretation (`-E`, the default, turns it back off).
pub fn echo(_env: &mut Env, args: Vec<Field>) -> BuiltinResult {
    let (_name, rest) = common::split_name(&args);
    let mut no_newline = false;
    let mut interpret_escapes = false;
    let mut start = 0;
    for field in rest {
        match field.value.as_str() {
            "-n" => no_newline = true,
            "-e" => interpret_escapes = true,
            "-E" => interpret_escapes = false,
            _ => break,
        }
        start += 1;
    }

    let words: Vec<&str> = rest[start..].iter().map(|f| f.value.as_str()).collect();
    let joined = words.join(" ");
    let (text, suppress_newline) = if interpret_escapes {
        interpret_echo_escapes(&joined)
    } else {
        (joined, false)
    };
    print!("{text}");
    if !no_newline && !suppress_newline {
        println!();
    }
    common::ok()
}

/// Expands `echo -e`'s backslash escapes. Returns the expanded text and
/// whether a `\c` was hit, which stops all further output including the
/// trailing newline.
fn interpret_echo_escapes(input: &str) -> (String, bool) {
    let chars: Vec<char> = input.chars().collect();
    let mut out = String::new();
    let mut i = 0;
    while i < chars.len() {
        if chars[i] != '\\' || i + 1 >= chars.len() {
            out.push(chars[i]);
            i += 1;
            continue;
        }
        match chars[i + 1] {
            '\\' => {
                out.push('\\');
                i += 2;
            }
            'n' => {
                out.push('\n');
                i += 2;
            }
            't' => {
                out.push('\t');
                i += 2;
            }
            'r' => {
                out.push('\r');
                i += 2;
            }
            'a' => {
                out.push('\x07');
                i += 2;
            }
            'b' => {
                out.push('\x08');
                i += 2;
            }
            'f' => {
                out.push('\x0c');
                i += 2;
            }
            'v' => {
                out.push('\x0b');
                i += 2;
            }
            'c' => return (out, true),
            '0' => {
                let mut j = i + 2;
                let mut octal = String::new();
                while j < chars.len() && j < i + 5 && ('0'..='7').contains(&chars[j]) {
                    octal.push(chars[j]);
                    j += 1;
                }
                let code = u32::from_str_radix(&octal, 8).unwrap_or(0) % 256;
                if let Some(c) = char::from_u32(code) {
                    out.push(c);
                }
                i = j;
            }
            'x' => {
                let mut j = i + 2;
                let mut hex = String::new();
                while j < chars.len() && j < i + 4 && chars[j].is_ascii_hexdigit() {
                    hex.push(chars[j]);
                    j += 1;
                }
                if hex.is_empty() {
                    out.push_str("\\x");
                    i += 2;
                } else {
                    if let Some(c) = u32::from_str_radix(&hex, 16).ok().and_then(char::from_u32) {
                        out.push(c);
                    }
                    i = j;
                }
            }
            other => {
                out.push('\\');
                out.push(other);
                i += 2;
            }
        }
    }
    (out, false)
}

/// `cd [-L|-P] [directory]`: changes the working directory, updating `$PWD`
/// and `$OLDPWD` the way POSIX XCU `cd` requires. `directory` defaults to
/// `$HOME`; a lone `-` changes to `$OLDPWD` and prints the new directory.
pub fn cd(env: &mut Env, args: Vec<Field>) -> BuiltinResult {
    let (name, rest) = common::split_name(&args);
    let rest = common::strip_double_dash(rest);

    let operand = rest.iter().find(|f| f.value != "-L" && f.value != "-P");
    let scalar = |env: &Env, var: &str| -> Option<String> {
        env.variables.get(var).and_then(|v| v.value.as_ref()).and_then(Value::as_scalar).map(str::to_owned)
    };

    let (target, print_target) = match operand {
        Some(field) if field.value == "-" => match scalar(env, "OLDPWD") {
            Some(old) => (old, true),
            None => return common::error(name, "OLDPWD not set", 1),
        },
        Some(field) => (field.value.clone(), false),
        None => match scalar(env, "HOME") {
            Some(home) => (home, false),
            None => return common::error(name, "HOME not set", 1),
        },
    };

    let old_cwd = env.system.getcwd().ok();
    if let Err(e) = env.system.chdir(std::path::Path::new(&target)) {
        return common::error(name, format_args!("{target}: {e}"), 1);
    }
    let new_cwd = match env.system.getcwd() {
        Ok(p) => p,
        Err(e) => return common::error(name, e, 1),
    };

    if let Some(old) = old_cwd {
        if let Ok(var) = env.variables.get_or_new("OLDPWD", Scope::Global) {
            var.value = Some(Value::scalar(old.display().to_string()));
        }
    }
    if let Ok(var) = env.variables.get_or_new("PWD", Scope::Global) {
        var.value = Some(Value::scalar(new_cwd.display().to_string()));
    }

    if print_target {
        println!("{}", new_cwd.display());
    }
    common::ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::test_support::{env, fields};
    use sh_env::builtin::Divert;

    #[test]
    fn colon_ignores_its_arguments() {
        let mut e = env();
        let result = colon(&mut e, fields(&[":", "anything"]));
        assert_eq!(result.exit_status, 0);
        assert_eq!(result.divert, Divert::Continue);
    }

    #[test]
    fn true_and_false_report_fixed_status() {
        let mut e = env();
        assert_eq!(r#true(&mut e, fields(&["true"])).exit_status, 0);
        assert_eq!(r#false(&mut e, fields(&["false"])).exit_status, 1);
    }

    #[test]
    fn exit_with_no_operand_reuses_exit_status() {
        let mut e = env();
        e.exit_status = 7;
        let result = exit(&mut e, fields(&["exit"]));
        assert_eq!(result.exit_status, 7);
        assert_eq!(result.divert, Divert::Exit(7));
    }

    #[test]
    fn exit_with_operand_overrides_exit_status() {
        let mut e = env();
        e.exit_status = 7;
        let result = exit(&mut e, fields(&["exit", "3"]));
        assert_eq!(result.exit_status, 3);
        assert_eq!(result.divert, Divert::Exit(3));
    }

    #[test]
    fn exit_rejects_a_non_numeric_operand() {
        let mut e = env();
        let result = exit(&mut e, fields(&["exit", "nope"]));
        assert_eq!(result.exit_status, USAGE_ERROR);
        assert_eq!(result.divert, Divert::Continue);
    }

    #[test]
    fn break_defaults_to_one_level() {
        let mut e = env();
        let result = r#break(&mut e, fields(&["break"]));
        assert_eq!(result.divert, Divert::Break(1));
    }

    #[test]
    fn break_rejects_level_zero() {
        let mut e = env();
        let result = r#break(&mut e, fields(&["break", "0"]));
        assert_eq!(result.exit_status, USAGE_ERROR);
        assert_eq!(result.divert, Divert::Continue);
    }

    #[test]
    fn continue_parses_an_explicit_level() {
        let mut e = env();
        let result = r#continue(&mut e, fields(&["continue", "2"]));
        assert_eq!(result.divert, Divert::LoopContinue(2));
    }

    #[test]
    fn shift_drops_leading_positional_params() {
        let mut e = env();
        e.positional_params = vec!["a".into(), "b".into(), "c".into()];
        let result = shift(&mut e, fields(&["shift", "2"]));
        assert_eq!(result.exit_status, 0);
        assert_eq!(e.positional_params, vec!["c".to_owned()]);
    }

    #[test]
    fn shift_past_the_end_is_an_error() {
        let mut e = env();
        e.positional_params = vec!["a".into()];
        let result = shift(&mut e, fields(&["shift", "5"]));
        assert_eq!(result.exit_status, 1);
        assert_eq!(e.positional_params, vec!["a".to_owned()]);
    }

    #[test]
    fn echo_joins_operands_with_a_trailing_newline() {
        let mut e = env();
        let result = echo(&mut e, fields(&["echo", "hello", "world"]));
        assert_eq!(result.exit_status, 0);
    }

    #[test]
    fn echo_interprets_escapes_only_with_dash_e() {
        let (plain, stop) = interpret_echo_escapes("a\\tb");
        assert_eq!(plain, "a\tb");
        assert!(!stop);
    }

    #[test]
    fn echo_dash_c_stops_further_output() {
        let (text, stop) = interpret_echo_escapes("keep\\cdrop");
        assert_eq!(text, "keep");
        assert!(stop);
    }

    #[test]
    fn cd_updates_pwd_and_oldpwd() {
        let mut e = env();
        let result = cd(&mut e, fields(&["cd", "/tmp"]));
        assert_eq!(result.exit_status, 0);
        let pwd = e.variables.get("PWD").and_then(|v| v.value.as_ref()).and_then(Value::as_scalar);
        assert_eq!(pwd, Some("/tmp"));
    }

    #[test]
    fn cd_with_no_home_set_is_an_error() {
        let mut e = env();
        let result = cd(&mut e, fields(&["cd"]));
        assert_eq!(result.exit_status, 1);
    }
}

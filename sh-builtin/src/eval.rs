//! `eval`, `exec`, and `.`/`source`: the built-ins that hand more shell
//! source back to the executor instead of doing their own work.

use crate::common;
use sh_env::builtin::{BuiltinResult, Field};
use sh_env::Env;
use sh_semantics::{command, Handle};
use std::ffi::CString;

/// `eval word...`: concatenates its operands with spaces, parses the
/// result as a command list, and runs it in the current environment. Any
/// `Divert` the list produces (an `exit`, a `return` meant for eval's
/// caller, a `break`) is forwarded outward rather than absorbed here.
pub fn eval(env: &mut Env, args: Vec<Field>) -> BuiltinResult {
    let (_name, rest) = common::split_name(&args);
    let source = rest.iter().map(|f| f.value.as_str()).collect::<Vec<_>>().join(" ");
    run_and_forward(env, &source)
}

/// `. file [arg...]`/`source file [arg...]`: reads `file` (searched on
/// `$PATH` if it names no directory) and runs its contents in the current
/// environment, the same way `eval` does for a literal string.
pub fn dot(env: &mut Env, args: Vec<Field>) -> BuiltinResult {
    let (name, rest) = common::split_name(&args);
    let Some(target) = rest.first() else {
        return common::error(name, "filename argument required", 2);
    };
    let path = sh_semantics::command_search::search_path(env, &target.value).unwrap_or_else(|| target.value.clone().into());
    let source = match std::fs::read_to_string(&path) {
        Ok(s) => s,
        Err(e) => return common::error(name, format_args!("{}: {e}", path.display()), 1),
    };
    run_and_forward(env, &source)
}

fn run_and_forward(env: &mut Env, source: &str) -> BuiltinResult {
    let list = match sh_syntax::parse(source) {
        Ok(list) => list,
        Err(e) => {
            eprintln!("sh: {e}");
            return BuiltinResult::new(2);
        }
    };
    match command::execute_list(env, &list) {
        Ok(divert) => BuiltinResult::with_divert(env.exit_status, divert),
        Err(error) => {
            let divert = error.handle(env, true);
            BuiltinResult::with_divert(env.exit_status, divert)
        }
    }
}

/// `exec [command [arg...]]`: replaces the current process image with
/// `command` via `execve`, without forking. Only an external command can
/// actually be exec'd this way; a built-in or function name is reported as
/// an error rather than silently running normally, since this
/// implementation has no way to both run one and still terminate the
/// calling context the way a real `exec` does.
///
/// `exec` with no operand is supposed to make its redirections permanent
/// for the rest of the current shell; the executor always restores a
/// built-in's redirections after it returns, so that case is not
/// supported here and just reports success, leaving the redirections
/// temporary.
pub fn exec(env: &mut Env, args: Vec<Field>) -> BuiltinResult {
    let (name, rest) = common::split_name(&args);
    let Some(command_name) = rest.first() else {
        return common::ok();
    };

    let path = match sh_semantics::command_search::search_path(env, &command_name.value) {
        Some(path) => path,
        None => return common::error(name, format_args!("{}: not found", command_name.value), 127),
    };
    let Ok(cpath) = CString::new(path.as_os_str().as_encoded_bytes()) else {
        return common::error(name, format_args!("{}: invalid path", path.display()), 126);
    };
    let Some(argv) = rest
        .iter()
        .map(|f| CString::new(f.value.as_bytes()).ok())
        .collect::<Option<Vec<_>>>()
    else {
        return common::error(name, "argument contains a NUL byte", 126);
    };
    let envp: Vec<CString> = env
        .variables
        .environ()
        .into_iter()
        .filter_map(|(k, v)| CString::new(format!("{k}={v}")).ok())
        .collect();

    match env.system.execve(&cpath, &argv, &envp) {
        Ok(never) => match never {},
        Err(e) => common::error(name, format_args!("{}: {e}", command_name.value), 126),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::test_support::{env, fields};
    use sh_env::builtin::Divert;

    #[test]
    fn eval_runs_a_parsed_command_list() {
        let mut e = env();
        crate::install(&mut e);
        let result = eval(&mut e, fields(&["eval", "exit", "4"]));
        assert_eq!(result.exit_status, 4);
        assert_eq!(result.divert, Divert::Exit(4));
    }

    #[test]
    fn eval_reports_a_parse_error() {
        let mut e = env();
        let result = eval(&mut e, fields(&["eval", "'unterminated"]));
        assert_eq!(result.exit_status, 2);
    }

    #[test]
    fn dot_reports_a_missing_file() {
        let mut e = env();
        let result = dot(&mut e, fields(&[".", "/no/such/file/for-this-test"]));
        assert_eq!(result.exit_status, 1);
    }

    #[test]
    fn exec_with_no_operand_is_a_no_op() {
        let mut e = env();
        let result = exec(&mut e, fields(&["exec"]));
        assert_eq!(result.exit_status, 0);
    }

    #[test]
    fn exec_attempts_execve_and_reports_its_failure() {
        let mut e = env();
        let result = exec(&mut e, fields(&["exec", "somecommand", "arg1"]));
        assert_eq!(result.exit_status, 126);
    }
}


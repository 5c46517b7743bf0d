//! `test`/`[`: boolean expression evaluation over strings, integers, and
//! file attributes.

use crate::common;
use sh_env::builtin::{BuiltinResult, Field};
use sh_env::Env;
use std::path::Path;

/// `test expr...`.
pub fn test(_env: &mut Env, args: Vec<Field>) -> BuiltinResult {
    let (name, rest) = common::split_name(&args);
    let words: Vec<&str> = rest.iter().map(|f| f.value.as_str()).collect();
    evaluate(name, &words)
}

/// `[ expr... ]`: like `test`, but requires a closing `]` operand.
pub fn bracket(_env: &mut Env, args: Vec<Field>) -> BuiltinResult {
    let (name, rest) = common::split_name(&args);
    match rest.last() {
        Some(f) if f.value == "]" => {
            let words: Vec<&str> = rest[..rest.len() - 1].iter().map(|f| f.value.as_str()).collect();
            evaluate(name, &words)
        }
        _ => common::error(name, "missing ']'", 2),
    }
}

fn evaluate(name: &str, words: &[&str]) -> BuiltinResult {
    if words.is_empty() {
        return BuiltinResult::new(1);
    }
    match eval_expr(words) {
        Ok(true) => BuiltinResult::new(0),
        Ok(false) => BuiltinResult::new(1),
        Err(e) => common::error(name, e, 2),
    }
}

fn eval_expr(words: &[&str]) -> Result<bool, String> {
    if words.len() == 1 {
        return Ok(!words[0].is_empty());
    }
    if words[0] == "!" {
        return eval_expr(&words[1..]).map(|b| !b);
    }
    if words.len() >= 3 {
        if let Some(pos) = words.iter().position(|w| *w == "-a" || *w == "-o") {
            let left = eval_expr(&words[..pos])?;
            let right = eval_expr(&words[pos + 1..])?;
            return Ok(if words[pos] == "-a" { left && right } else { left || right });
        }
    }
    if words.len() == 3 {
        return eval_binary(words[0], words[1], words[2]);
    }
    if words.len() == 2 {
        return eval_unary(words[0], words[1]);
    }
    Err("unexpected number of arguments".to_owned())
}

fn eval_binary(left: &str, op: &str, right: &str) -> Result<bool, String> {
    match op {
        "=" | "==" => Ok(left == right),
        "!=" => Ok(left != right),
        "-eq" | "-ne" | "-lt" | "-le" | "-gt" | "-ge" => {
            let l = parse_int(left)?;
            let r = parse_int(right)?;
            Ok(match op {
                "-eq" => l == r,
                "-ne" => l != r,
                "-lt" => l < r,
                "-le" => l <= r,
                "-gt" => l > r,
                _ => l >= r,
            })
        }
        _ => Err(format!("{op}: unknown binary operator")),
    }
}

fn parse_int(s: &str) -> Result<i64, String> {
    s.parse::<i64>().map_err(|_| format!("{s}: not a number"))
}

fn eval_unary(op: &str, operand: &str) -> Result<bool, String> {
    let path = Path::new(operand);
    match op {
        "-z" => Ok(operand.is_empty()),
        "-n" => Ok(!operand.is_empty()),
        "-e" => Ok(path.exists()),
        "-f" => Ok(path.is_file()),
        "-d" => Ok(path.is_dir()),
        "-s" => Ok(path.metadata().map(|m| m.len() > 0).unwrap_or(false)),
        "-r" | "-w" | "-x" => Ok(is_accessible(path, op)),
        "-L" | "-h" => Ok(path.symlink_metadata().map(|m| m.file_type().is_symlink()).unwrap_or(false)),
        _ => Err(format!("{op}: unknown unary operator")),
    }
}

#[cfg(unix)]
fn is_accessible(path: &Path, op: &str) -> bool {
    use std::os::unix::fs::PermissionsExt;
    let Ok(meta) = path.metadata() else { return false };
    let mode = meta.permissions().mode();
    let bit = match op {
        "-r" => 0o444,
        "-w" => 0o222,
        _ => 0o111,
    };
    mode & bit != 0
}

#[cfg(not(unix))]
fn is_accessible(path: &Path, _op: &str) -> bool {
    path.exists()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::test_support::{env, fields};

    #[test]
    fn single_operand_is_true_unless_empty() {
        let mut e = env();
        assert_eq!(test(&mut e, fields(&["test", "nonempty"])).exit_status, 0);
        assert_eq!(test(&mut e, fields(&["test", ""])).exit_status, 1);
    }

    #[test]
    fn string_equality() {
        let mut e = env();
        assert_eq!(test(&mut e, fields(&["test", "a", "=", "a"])).exit_status, 0);
        assert_eq!(test(&mut e, fields(&["test", "a", "=", "b"])).exit_status, 1);
        assert_eq!(test(&mut e, fields(&["test", "a", "!=", "b"])).exit_status, 0);
    }

    #[test]
    fn integer_comparison() {
        let mut e = env();
        assert_eq!(test(&mut e, fields(&["test", "2", "-lt", "3"])).exit_status, 0);
        assert_eq!(test(&mut e, fields(&["test", "3", "-eq", "3"])).exit_status, 0);
        assert_eq!(test(&mut e, fields(&["test", "3", "-gt", "3"])).exit_status, 1);
    }

    #[test]
    fn integer_comparison_rejects_non_numeric_operands() {
        let mut e = env();
        let result = test(&mut e, fields(&["test", "a", "-eq", "1"]));
        assert_eq!(result.exit_status, 2);
    }

    #[test]
    fn negation() {
        let mut e = env();
        assert_eq!(test(&mut e, fields(&["test", "!", "a", "=", "b"])).exit_status, 0);
    }

    #[test]
    fn logical_and_or() {
        let mut e = env();
        assert_eq!(test(&mut e, fields(&["test", "a", "=", "a", "-a", "b", "=", "b"])).exit_status, 0);
        assert_eq!(test(&mut e, fields(&["test", "a", "=", "x", "-o", "b", "=", "b"])).exit_status, 0);
    }

    #[test]
    fn string_empty_and_nonempty_unary_tests() {
        let mut e = env();
        assert_eq!(test(&mut e, fields(&["test", "-z", ""])).exit_status, 0);
        assert_eq!(test(&mut e, fields(&["test", "-n", "x"])).exit_status, 0);
    }

    #[test]
    fn file_existence_tests_against_a_real_path() {
        let mut e = env();
        assert_eq!(test(&mut e, fields(&["test", "-e", "/"])).exit_status, 0);
        assert_eq!(test(&mut e, fields(&["test", "-d", "/"])).exit_status, 0);
        assert_eq!(test(&mut e, fields(&["test", "-f", "/"])).exit_status, 1);
    }

    #[test]
    fn bracket_requires_a_closing_bracket_operand() {
        let mut e = env();
        let result = bracket(&mut e, fields(&["[", "a", "=", "a"]));
        assert_eq!(result.exit_status, 2);
    }

    #[test]
    fn bracket_with_closing_bracket_evaluates_like_test() {
        let mut e = env();
        let result = bracket(&mut e, fields(&["[", "a", "=", "a", "]"]));
        assert_eq!(result.exit_status, 0);
    }
}

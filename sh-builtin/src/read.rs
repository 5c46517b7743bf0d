//! `read`: reads one line from standard input and splits it into shell
//! variables.

use crate::common;
use sh_env::builtin::{BuiltinResult, Field};
use sh_env::variable::{Scope, Value};
use sh_env::Env;
use sh_syntax::Fd;

/// `read [-r] name...`: reads a line, splitting it on `$IFS` the same way
/// word splitting does, and assigns one field per name with the last name
/// absorbing any leftover fields verbatim. Without `-r`, a trailing
/// backslash continues the line and escapes the character after it.
pub fn read(env: &mut Env, args: Vec<Field>) -> BuiltinResult {
    let (name, rest) = common::split_name(&args);
    let mut raw = false;
    let mut start = 0;
    for field in rest {
        match field.value.as_str() {
            "-r" => raw = true,
            "--" => {
                start += 1;
                break;
            }
            _ => break,
        }
        start += 1;
    }
    let var_names = &rest[start..];
    if var_names.is_empty() {
        return common::error(name, "no variable names given", 2);
    }

    let line = match read_line(env, raw) {
        Ok(Some(line)) => line,
        Ok(None) => return BuiltinResult::new(1),
        Err(e) => return common::error(name, e, 1),
    };

    let ifs = env
        .variables
        .get("IFS")
        .and_then(|v| v.value.as_ref())
        .and_then(Value::as_scalar)
        .map(str::to_owned)
        .unwrap_or_else(|| " \t\n".to_owned());
    let fields = split_on_ifs(&line, &ifs, var_names.len());

    for (i, var_name) in var_names.iter().enumerate() {
        let value = fields.get(i).cloned().unwrap_or_default();
        match env.variables.get_or_new(&var_name.value, Scope::Global) {
            Ok(var) => var.value = Some(Value::scalar(value)),
            Err(e) => return common::error(name, e, 1),
        }
    }
    common::ok()
}

/// Reads one line of input byte by byte (no buffered-reader layer is
/// available through `System`), honoring backslash-newline continuation
/// unless `raw` is set. Returns `None` at end of file with nothing read.
fn read_line(env: &mut Env, raw: bool) -> Result<Option<String>, String> {
    let mut line = String::new();
    let mut any = false;
    loop {
        let mut byte = [0u8; 1];
        let n = env.system.read(Fd::STDIN, &mut byte).map_err(|e| e.to_string())?;
        if n == 0 {
            return Ok(if any { Some(line) } else { None });
        }
        any = true;
        let c = byte[0] as char;
        if c == '\n' {
            return Ok(Some(line));
        }
        if c == '\\' && !raw {
            let mut next = [0u8; 1];
            if env.system.read(Fd::STDIN, &mut next).map_err(|e| e.to_string())? == 0 {
                line.push(c);
                return Ok(Some(line));
            }
            let next_c = next[0] as char;
            if next_c == '\n' {
                continue;
            }
            line.push(next_c);
            continue;
        }
        line.push(c);
    }
}

/// Splits `line` on any character in `ifs`, collapsing runs of IFS
/// whitespace the way POSIX word splitting does, and folding anything past
/// the `(max_fields - 1)`th delimiter into the last field.
fn split_on_ifs(line: &str, ifs: &str, max_fields: usize) -> Vec<String> {
    if ifs.is_empty() || max_fields == 0 {
        return vec![line.to_owned()];
    }
    let is_ws = |c: char| matches!(c, ' ' | '\t' | '\n');
    let trimmed = line.trim_matches(|c: char| ifs.contains(c) && is_ws(c));
    let mut fields = Vec::new();
    let mut current = String::new();
    let mut chars = trimmed.chars().peekable();
    while let Some(c) = chars.next() {
        if ifs.contains(c) {
            if fields.len() + 1 >= max_fields {
                current.push(c);
                continue;
            }
            fields.push(std::mem::take(&mut current));
            while matches!(chars.peek(), Some(&next) if is_ws(next) && ifs.contains(next)) {
                chars.next();
            }
        } else {
            current.push(c);
        }
    }
    fields.push(current);
    fields
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::test_support::{env, fields};

    #[test]
    fn read_with_no_variable_names_is_an_error() {
        let mut e = env();
        let result = read(&mut e, fields(&["read"]));
        assert_eq!(result.exit_status, 2);
    }

    #[test]
    fn read_with_nothing_wired_up_on_stdin_is_an_error() {
        // RecordingSystem has no file registered on fd 0, so the first
        // read call fails rather than returning real input.
        let mut e = env();
        let result = read(&mut e, fields(&["read", "x"]));
        assert_eq!(result.exit_status, 1);
    }

    #[test]
    fn split_on_ifs_collapses_whitespace_runs() {
        let fields = split_on_ifs("  a   b  c  ", " \t\n", 3);
        assert_eq!(fields, vec!["a".to_owned(), "b".to_owned(), "c".to_owned()]);
    }

    #[test]
    fn split_on_ifs_folds_extra_fields_into_the_last_name() {
        let fields = split_on_ifs("a b c d", " ", 2);
        assert_eq!(fields, vec!["a".to_owned(), "b c d".to_owned()]);
    }

    #[test]
    fn split_on_ifs_with_empty_ifs_keeps_the_whole_line() {
        let fields = split_on_ifs("a b c", "", 3);
        assert_eq!(fields, vec!["a b c".to_owned()]);
    }
}

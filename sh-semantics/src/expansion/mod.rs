//! Word expansion: the pipeline that turns a [`Word`] (or a [`Text`], for
//! contexts like double quotes and here-documents that recognize
//! expansions but not quoting) into the strings the rest of the executor
//! works with.
//!
//! A [`Word`] goes through, in order: tilde expansion, parameter/command/
//! arithmetic substitution, brace expansion, field splitting, quote
//! removal, and pathname expansion. Quoting is tracked per character as a
//! `(char, bool)` pair rather than with the richer attribute system a real
//! implementation of this pipeline might use — a quoted character simply
//! can't be a field separator or glob metacharacter, which is all quoting
//! needs to mean once splitting and globbing are the only things left to
//! do with it.

mod brace;
mod glob;
mod split;
mod tilde;

use crate::error::Error;
use sh_env::builtin::Field;
use sh_env::variable::{Scope, Value as VarValue};
use sh_env::Env;
use sh_syntax::{
    BracedParam, CaseConvert, CaseConvertScope, Location, Modifier, Param, ParamType, SpecialParam, Substring,
    Switch, SwitchCondition, SwitchType, Text, TextUnit, Trim, TrimLength, TrimSide, Word, WordUnit,
};

/// Expands a command word into zero or more fields: tilde, substitution,
/// brace expansion, splitting, quote removal, and globbing, in that order.
pub fn expand_word(env: &mut Env, word: &Word) -> Result<Vec<Field>, Error> {
    if let Some(result) = try_expand_whole_array_param(env, word) {
        return result;
    }

    let chars = expand_units(env, word)?;
    let had_quote_construct = word
        .units
        .iter()
        .any(|unit| matches!(unit, WordUnit::SingleQuote(_) | WordUnit::DoubleQuote(_)));
    let noglob = env.options.is_on(sh_env::option::NoGlob);
    let ifs_value = ifs(env);

    let mut fields = Vec::new();
    for variant in brace::expand(&chars) {
        if variant.is_empty() {
            if had_quote_construct {
                fields.push(Field::new(String::new(), word.location));
            }
            continue;
        }
        for field_chars in split::split_fields(&ifs_value, &variant) {
            let literal = quote_removal(&field_chars);
            if !noglob && glob::has_unquoted_meta(&field_chars) {
                let matches = glob::expand(&field_chars);
                if matches.is_empty() {
                    fields.push(Field::new(literal, word.location));
                } else {
                    fields.extend(matches.into_iter().map(|m| Field::new(m, word.location)));
                }
            } else {
                fields.push(Field::new(literal, word.location));
            }
        }
    }
    Ok(fields)
}

/// Expands every word in `words` and concatenates the resulting fields,
/// e.g. to build a command's argv or a `for`/`case` value list.
pub fn expand_words(env: &mut Env, words: &[Word]) -> Result<Vec<Field>, Error> {
    let mut fields = Vec::new();
    for word in words {
        fields.extend(expand_word(env, word)?);
    }
    Ok(fields)
}

/// Expands a word for a context with no splitting or globbing: assignment
/// right-hand sides, `for` loop variable names are literal already, but
/// this is what an array element's *value slot* reduces to once the word
/// itself has already gone through [`expand_word`] is not needed — this is
/// for genuinely scalar contexts (the RHS of `NAME=value`).
pub fn expand_scalar(env: &mut Env, word: &Word) -> Result<String, Error> {
    let chars = expand_units(env, word)?;
    Ok(quote_removal(&chars))
}

/// Expands a word into a pattern string suitable for [`sh_fnmatch::Pattern::parse`]:
/// like [`expand_scalar`], but characters from a quoted source position are
/// backslash-escaped so they match literally instead of as glob syntax.
/// Used for `case` patterns and `${V#pattern}`-style trimming.
pub fn expand_pattern(env: &mut Env, word: &Word) -> Result<String, Error> {
    let chars = expand_units(env, word)?;
    Ok(glob::pattern_string(&chars))
}

/// Expands an assignment's value (`NAME=value` or `NAME=(a b c)`) into the
/// variable value it should be stored as. Array elements go through the
/// full word pipeline (splitting and globbing included), matching how a
/// command's own arguments are built.
pub fn expand_value(env: &mut Env, value: &sh_syntax::Value) -> Result<VarValue, Error> {
    match value {
        sh_syntax::Value::Scalar(word) => Ok(VarValue::Scalar(expand_scalar(env, word)?)),
        sh_syntax::Value::Array(words) => {
            let mut items = Vec::new();
            for field in expand_words(env, words)? {
                items.push(field.value);
            }
            Ok(VarValue::Array(items))
        }
    }
}

/// Expands a [`Text`] — the content of a double-quoted string, a
/// here-document body, or the inside of `$((...))` — with no splitting or
/// globbing applied: every unit is concatenated into a single string.
pub fn expand_text(env: &mut Env, text: &Text) -> Result<String, Error> {
    let mut out = String::new();
    for unit in &text.0 {
        out.push_str(&expand_text_unit(env, unit)?);
    }
    Ok(out)
}

fn expand_text_unit(env: &mut Env, unit: &TextUnit) -> Result<String, Error> {
    match unit {
        TextUnit::Literal(c) => Ok(c.to_string()),
        TextUnit::RawParam { param, location } => {
            Ok(stringify(env, expand_param(env, param, &Modifier::None, *location)?))
        }
        TextUnit::BracedParam(braced) => {
            let BracedParam { param, modifier, location } = braced;
            let expanded = expand_param(env, param, modifier, *location)?;
            Ok(stringify(env, expanded))
        }
        TextUnit::CommandSubst { content, location } | TextUnit::Backquote { content, location } => {
            capture_command_substitution(env, content, *location)
        }
        TextUnit::Arith { content, location } => {
            let expression = expand_text(env, content)?;
            eval_arith(env, &expression, *location).map(|n| n.to_string())
        }
    }
}

fn stringify(env: &Env, expanded: ExpandedParam) -> String {
    match expanded {
        ExpandedParam::Scalar(s) => s,
        ExpandedParam::Array(items) => match ifs_first_char(env) {
            Some(sep) => items.join(&sep.to_string()),
            None => items.concat(),
        },
    }
}

/// Special-cases a word that is exactly `"$@"` or `"$*"` (braced or not),
/// since POSIX gives these a field count no other expansion has: `"$@"`
/// becomes one field per positional parameter (zero if there are none),
/// each individually quoted, rather than the single joined-and-then-split
/// string every other expansion produces. Returns `None` for any other
/// word, including `$@`/`$*` mixed with surrounding text, which falls
/// through to the ordinary pipeline and is joined with `IFS` like any
/// other array reference.
fn try_expand_whole_array_param(env: &mut Env, word: &Word) -> Option<Result<Vec<Field>, Error>> {
    if word.units.len() != 1 {
        return None;
    }
    let WordUnit::DoubleQuote(text) = &word.units[0] else {
        return None;
    };
    if text.0.len() != 1 {
        return None;
    }
    let (special, location) = match &text.0[0] {
        TextUnit::RawParam { param, location } => (as_at_or_asterisk(param)?, *location),
        TextUnit::BracedParam(BracedParam { param, modifier: Modifier::None, location }) => {
            (as_at_or_asterisk(param)?, *location)
        }
        _ => return None,
    };
    Some(Ok(match special {
        SpecialParam::At => env
            .positional_params
            .iter()
            .map(|p| Field::new(p.clone(), location))
            .collect(),
        SpecialParam::Asterisk if env.positional_params.is_empty() => Vec::new(),
        SpecialParam::Asterisk => {
            let sep = ifs_first_char(env).map(|c| c.to_string()).unwrap_or_default();
            vec![Field::new(env.positional_params.join(&sep), location)]
        }
        _ => unreachable!(),
    }))
}

fn as_at_or_asterisk(param: &Param) -> Option<SpecialParam> {
    match param.r#type {
        ParamType::Special(sp @ (SpecialParam::At | SpecialParam::Asterisk)) => Some(sp),
        _ => None,
    }
}

/// Expands every [`WordUnit`] of `word` into the per-character quoted
/// representation the rest of the pipeline operates on.
fn expand_units(env: &mut Env, word: &Word) -> Result<Vec<(char, bool)>, Error> {
    let mut out = Vec::new();
    for (i, unit) in word.units.iter().enumerate() {
        match unit {
            WordUnit::Unquoted(text_unit) => push_unquoted(env, text_unit, &mut out)?,
            WordUnit::Escaped(c) => out.push((*c, true)),
            WordUnit::SingleQuote(s) => out.extend(s.chars().map(|c| (c, true))),
            WordUnit::DoubleQuote(text) => push_quoted_text(env, text, &mut out)?,
            WordUnit::Tilde(prefix) => {
                if i == 0 {
                    out.extend(tilde::resolve(env, prefix).chars().map(|c| (c, false)));
                } else {
                    out.push(('~', false));
                    out.extend(prefix.chars().map(|c| (c, false)));
                }
            }
        }
    }
    Ok(out)
}

fn push_unquoted(env: &mut Env, unit: &TextUnit, out: &mut Vec<(char, bool)>) -> Result<(), Error> {
    match unit {
        TextUnit::Literal(c) => out.push((*c, false)),
        other => out.extend(expand_text_unit(env, other)?.chars().map(|c| (c, false))),
    }
    Ok(())
}

fn push_quoted_text(env: &mut Env, text: &Text, out: &mut Vec<(char, bool)>) -> Result<(), Error> {
    for unit in &text.0 {
        match unit {
            TextUnit::Literal(c) => out.push((*c, true)),
            other => out.extend(expand_text_unit(env, other)?.chars().map(|c| (c, true))),
        }
    }
    Ok(())
}

fn quote_removal(chars: &[(char, bool)]) -> String {
    chars.iter().map(|&(c, _)| c).collect()
}

/// What a parameter reference currently holds, before any modifier is
/// applied.
enum Looked {
    Unset,
    Scalar(String),
    Array(Vec<String>),
}

fn lookup(env: &Env, param: &Param) -> Looked {
    match param.r#type {
        ParamType::Variable => match env.variables.get(&param.id).and_then(|v| v.value.as_ref()) {
            None => Looked::Unset,
            Some(VarValue::Scalar(s)) => Looked::Scalar(s.clone()),
            Some(VarValue::Array(a)) => Looked::Array(a.clone()),
        },
        ParamType::Positional(n) => match n.checked_sub(1).and_then(|i| env.positional_params.get(i)) {
            Some(s) => Looked::Scalar(s.clone()),
            None => Looked::Unset,
        },
        ParamType::Special(SpecialParam::At | SpecialParam::Asterisk) => Looked::Array(env.positional_params.clone()),
        ParamType::Special(SpecialParam::Number) => Looked::Scalar(env.positional_params.len().to_string()),
        ParamType::Special(SpecialParam::Question) => Looked::Scalar(env.exit_status.to_string()),
        ParamType::Special(SpecialParam::Dollar) => Looked::Scalar(env.system.getpid().as_raw().to_string()),
        ParamType::Special(SpecialParam::Exclamation) => {
            Looked::Scalar(env.last_async_pid.map(|pid| pid.as_raw().to_string()).unwrap_or_default())
        }
        ParamType::Special(SpecialParam::Zero) => Looked::Scalar(env.arg0.clone()),
    }
}

/// `set -u`'s check, with the conventional exceptions for the special
/// parameters that are always considered set (`$?`, `$$`, `$#`, `$0`,
/// `$@`, `$*`, and `$!`, which is simply empty rather than unset).
fn check_nounset(env: &Env, param: &Param, looked: &Looked, location: Location) -> Result<(), Error> {
    if !env.options.is_on(sh_env::option::NoUnset) {
        return Ok(());
    }
    if matches!(param.r#type, ParamType::Special(_)) {
        return Ok(());
    }
    if matches!(looked, Looked::Unset) {
        return Err(Error::expansion(format!("{}: unbound variable", param.id), Some(location)));
    }
    Ok(())
}

enum ExpandedParam {
    Scalar(String),
    Array(Vec<String>),
}

fn current_scalar(looked: &Looked) -> String {
    match looked {
        Looked::Unset => String::new(),
        Looked::Scalar(s) => s.clone(),
        Looked::Array(items) => items.join(" "),
    }
}

fn expand_param(env: &mut Env, param: &Param, modifier: &Modifier, location: Location) -> Result<ExpandedParam, Error> {
    let looked = lookup(env, param);
    check_nounset(env, param, &looked, location)?;
    let is_set = !matches!(looked, Looked::Unset);

    match modifier {
        Modifier::None => Ok(match looked {
            Looked::Unset => ExpandedParam::Scalar(String::new()),
            Looked::Scalar(s) => ExpandedParam::Scalar(s),
            Looked::Array(items) => ExpandedParam::Array(items),
        }),
        Modifier::Length => {
            let len = match &looked {
                Looked::Unset => 0,
                Looked::Scalar(s) => s.chars().count(),
                Looked::Array(items) => items.len(),
            };
            Ok(ExpandedParam::Scalar(len.to_string()))
        }
        Modifier::Switch(switch) => expand_switch(env, param, switch, is_set, &looked, location),
        Modifier::Trim(trim) => {
            let current = current_scalar(&looked);
            Ok(ExpandedParam::Scalar(expand_trim(env, trim, &current)?))
        }
        Modifier::CaseConvert(conv, scope) => {
            let current = current_scalar(&looked);
            Ok(ExpandedParam::Scalar(apply_case_convert(&current, *conv, *scope)))
        }
        Modifier::Substring(sub) => {
            let current = current_scalar(&looked);
            Ok(ExpandedParam::Scalar(expand_substring(env, sub, &current)?))
        }
    }
}

fn expand_switch(
    env: &mut Env,
    param: &Param,
    switch: &Switch,
    is_set: bool,
    looked: &Looked,
    location: Location,
) -> Result<ExpandedParam, Error> {
    let is_nonempty = match looked {
        Looked::Unset => false,
        Looked::Scalar(s) => !s.is_empty(),
        Looked::Array(items) => !items.is_empty(),
    };
    let condition_met = match switch.condition {
        SwitchCondition::Unset => !is_set,
        SwitchCondition::UnsetOrEmpty => !is_set || !is_nonempty,
    };
    let keep_current = || match looked {
        Looked::Array(items) => ExpandedParam::Array(items.clone()),
        _ => ExpandedParam::Scalar(current_scalar(looked)),
    };

    match switch.r#type {
        SwitchType::Alter => {
            if condition_met {
                Ok(ExpandedParam::Scalar(String::new()))
            } else {
                Ok(ExpandedParam::Scalar(expand_scalar(env, &switch.word)?))
            }
        }
        SwitchType::Default => {
            if condition_met {
                Ok(ExpandedParam::Scalar(expand_scalar(env, &switch.word)?))
            } else {
                Ok(keep_current())
            }
        }
        SwitchType::Assign => {
            if condition_met {
                let value = expand_scalar(env, &switch.word)?;
                assign_scalar(env, &param.id, &value, location)?;
                Ok(ExpandedParam::Scalar(value))
            } else {
                Ok(keep_current())
            }
        }
        SwitchType::Error => {
            if condition_met {
                let message = if switch.word.is_empty() {
                    "parameter not set".to_owned()
                } else {
                    expand_scalar(env, &switch.word)?
                };
                Err(Error::expansion(format!("{}: {message}", param.id), Some(location)))
            } else {
                Ok(keep_current())
            }
        }
    }
}

fn assign_scalar(env: &mut Env, name: &str, value: &str, location: Location) -> Result<(), Error> {
    let var = env
        .variables
        .get_or_new(name, Scope::Global)
        .map_err(|e| Error::expansion(e.to_string(), Some(location)))?;
    var.value = Some(VarValue::scalar(value));
    var.last_assigned_location = Some(location);
    Ok(())
}

fn expand_trim(env: &mut Env, trim: &Trim, current: &str) -> Result<String, Error> {
    let pattern_str = expand_pattern(env, &trim.pattern)?;
    let pattern = sh_fnmatch::Pattern::parse(&pattern_str).map_err(|e| Error::expansion(e.to_string(), None))?;
    let matched = match (trim.side, trim.length) {
        (TrimSide::Prefix, TrimLength::Shortest) => pattern.shortest_prefix_match(current),
        (TrimSide::Prefix, TrimLength::Longest) => pattern.longest_prefix_match(current),
        (TrimSide::Suffix, TrimLength::Shortest) => pattern.shortest_suffix_match(current),
        (TrimSide::Suffix, TrimLength::Longest) => pattern.longest_suffix_match(current),
    };
    Ok(match (trim.side, matched) {
        (TrimSide::Prefix, Some(matched)) => current[matched.len()..].to_owned(),
        (TrimSide::Suffix, Some(matched)) => current[..current.len() - matched.len()].to_owned(),
        (_, None) => current.to_owned(),
    })
}

fn apply_case_convert(s: &str, conv: CaseConvert, scope: CaseConvertScope) -> String {
    let convert_char = |c: char| -> String {
        match conv {
            CaseConvert::Upper => c.to_uppercase().collect(),
            CaseConvert::Lower => c.to_lowercase().collect(),
        }
    };
    match scope {
        CaseConvertScope::All => s.chars().flat_map(|c| convert_char(c).chars().collect::<Vec<_>>()).collect(),
        CaseConvertScope::First => {
            let mut chars = s.chars();
            match chars.next() {
                None => String::new(),
                Some(first) => convert_char(first) + chars.as_str(),
            }
        }
    }
}

fn expand_substring(env: &mut Env, sub: &Substring, current: &str) -> Result<String, Error> {
    let offset_expr = expand_text(env, &sub.offset)?;
    let offset = eval_arith(env, &offset_expr, Location::START)?;
    let chars: Vec<char> = current.chars().collect();
    let len = chars.len() as i64;
    let start = if offset < 0 { (len + offset).max(0) } else { offset.min(len) };
    let take = match &sub.length {
        None => len - start,
        Some(length_text) => {
            let length_expr = expand_text(env, length_text)?;
            let length = eval_arith(env, &length_expr, Location::START)?;
            length.max(0).min(len - start)
        }
    };
    Ok(chars[start as usize..(start + take) as usize].iter().collect())
}

struct ArithVars<'a> {
    env: &'a mut Env,
}

impl sh_arith::Variables for ArithVars<'_> {
    fn get(&self, name: &str) -> i64 {
        self.env
            .variables
            .get(name)
            .and_then(|v| v.value.as_ref())
            .and_then(VarValue::as_scalar)
            .and_then(|s| s.trim().parse().ok())
            .unwrap_or(0)
    }

    fn set(&mut self, name: &str, value: i64) {
        if let Ok(var) = self.env.variables.get_or_new(name, Scope::Global) {
            var.value = Some(VarValue::scalar(value.to_string()));
        }
    }
}

fn eval_arith(env: &mut Env, expression: &str, location: Location) -> Result<i64, Error> {
    let mut vars = ArithVars { env };
    sh_arith::eval(expression, &mut vars).map_err(|e| Error::expansion(format!("arithmetic: {e}"), Some(location)))
}

fn ifs(env: &Env) -> String {
    match env.variables.get("IFS").and_then(|v| v.value.as_ref()).and_then(VarValue::as_scalar) {
        Some(s) => s.to_owned(),
        None => " \t\n".to_owned(),
    }
}

fn ifs_first_char(env: &Env) -> Option<char> {
    match env.variables.get("IFS").and_then(|v| v.value.as_ref()).and_then(VarValue::as_scalar) {
        Some(s) => s.chars().next(),
        None => Some(' '),
    }
}

/// Runs `content` as a command list in a forked child whose stdout is
/// piped back to the parent, trailing newlines stripped. This is the one
/// place expansion forks a real process, since `$(...)`/`` `...` `` has no
/// meaning other than "run this and read what it printed".
fn capture_command_substitution(env: &mut Env, content: &str, location: Location) -> Result<String, Error> {
    let list = sh_syntax::parse(content).map_err(|e| Error::expansion(e.to_string(), Some(location)))?;
    let (read_fd, write_fd) =
        env.system.pipe().map_err(|e| Error::runtime(format!("pipe: {e}"), Some(location)))?;

    match unsafe { env.system.fork() } {
        Ok(nix::unistd::ForkResult::Child) => {
            let _ = env.system.close(read_fd);
            let _ = env.system.dup2(write_fd, sh_syntax::Fd::STDOUT);
            let _ = env.system.close(write_fd);
            let status = match crate::command::execute_list(env, &list) {
                Ok(crate::Divert::Exit(status)) => status,
                Ok(_) => env.exit_status,
                Err(error) => {
                    use crate::Handle;
                    match error.handle(env, false) {
                        crate::Divert::Exit(status) => status,
                        _ => env.exit_status,
                    }
                }
            };
            env.system.exit(status)
        }
        Ok(nix::unistd::ForkResult::Parent { child }) => {
            let _ = env.system.close(write_fd);
            let mut output = Vec::new();
            let mut buf = [0u8; 4096];
            loop {
                match env.system.read(read_fd, &mut buf) {
                    Ok(0) | Err(_) => break,
                    Ok(n) => output.extend_from_slice(&buf[..n]),
                }
            }
            let _ = env.system.close(read_fd);
            wait_for_exit(env, child);
            let mut text = String::from_utf8_lossy(&output).into_owned();
            while text.ends_with('\n') {
                text.pop();
            }
            Ok(text)
        }
        Err(e) => Err(Error::runtime(format!("fork: {e}"), Some(location))),
    }
}

fn wait_for_exit(env: &mut Env, pid: nix::unistd::Pid) {
    use nix::sys::wait::WaitStatus;
    loop {
        match env.system.wait(Some(pid)) {
            Ok(WaitStatus::Exited(p, _) | WaitStatus::Signaled(p, _, _)) if p == pid => return,
            Ok(_) => continue,
            Err(_) => return,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sh_env::virtual_system::RecordingSystem;

    fn env() -> Env {
        Env::new(Box::new(RecordingSystem::new()))
    }

    fn word(units: Vec<WordUnit>) -> Word {
        Word { units, location: Location::START }
    }

    #[test]
    fn literal_word_expands_to_one_field() {
        let mut env = env();
        let w = word(vec![WordUnit::Unquoted(TextUnit::Literal('h')), WordUnit::Unquoted(TextUnit::Literal('i'))]);
        let fields = expand_word(&mut env, &w).unwrap();
        assert_eq!(fields.len(), 1);
        assert_eq!(fields[0].value, "hi");
    }

    #[test]
    fn unquoted_variable_with_spaces_splits() {
        let mut env = env();
        env.variables.get_or_new("X", Scope::Global).unwrap().value = Some(VarValue::scalar("a b"));
        let w = word(vec![WordUnit::Unquoted(TextUnit::RawParam {
            param: Param { id: "X".into(), r#type: ParamType::Variable },
            location: Location::START,
        })]);
        let fields = expand_word(&mut env, &w).unwrap();
        assert_eq!(fields.iter().map(|f| f.value.as_str()).collect::<Vec<_>>(), vec!["a", "b"]);
    }

    #[test]
    fn unset_variable_unquoted_yields_no_fields() {
        let mut env = env();
        let w = word(vec![WordUnit::Unquoted(TextUnit::RawParam {
            param: Param { id: "X".into(), r#type: ParamType::Variable },
            location: Location::START,
        })]);
        assert!(expand_word(&mut env, &w).unwrap().is_empty());
    }

    #[test]
    fn empty_double_quote_yields_one_empty_field() {
        let mut env = env();
        let w = word(vec![WordUnit::DoubleQuote(Text(Vec::new()))]);
        let fields = expand_word(&mut env, &w).unwrap();
        assert_eq!(fields.len(), 1);
        assert_eq!(fields[0].value, "");
    }

    #[test]
    fn nounset_rejects_unset_variable() {
        let mut env = env();
        env.options.set(sh_env::option::NoUnset, sh_env::option::On);
        let w = word(vec![WordUnit::Unquoted(TextUnit::RawParam {
            param: Param { id: "X".into(), r#type: ParamType::Variable },
            location: Location::START,
        })]);
        assert!(expand_word(&mut env, &w).is_err());
    }

    #[test]
    fn nounset_exempts_special_parameters() {
        let mut env = env();
        env.options.set(sh_env::option::NoUnset, sh_env::option::On);
        let w = word(vec![WordUnit::Unquoted(TextUnit::RawParam {
            param: Param { id: "?".into(), r#type: ParamType::Special(SpecialParam::Question) },
            location: Location::START,
        })]);
        assert!(expand_word(&mut env, &w).is_ok());
    }

    #[test]
    fn default_switch_falls_back_when_unset() {
        let mut env = env();
        let default_word = word(vec![WordUnit::Unquoted(TextUnit::Literal('d'))]);
        let braced = BracedParam {
            param: Param { id: "X".into(), r#type: ParamType::Variable },
            modifier: Modifier::Switch(Switch {
                r#type: SwitchType::Default,
                condition: SwitchCondition::Unset,
                word: default_word,
            }),
            location: Location::START,
        };
        let w = word(vec![WordUnit::DoubleQuote(Text(vec![TextUnit::BracedParam(braced)]))]);
        let fields = expand_word(&mut env, &w).unwrap();
        assert_eq!(fields[0].value, "d");
    }

    #[test]
    fn trim_shortest_prefix() {
        let mut env = env();
        let pattern = word(vec![WordUnit::Unquoted(TextUnit::Literal('*')), WordUnit::Unquoted(TextUnit::Literal('/'))]);
        let braced = BracedParam {
            param: Param { id: "X".into(), r#type: ParamType::Variable },
            modifier: Modifier::Trim(Trim { side: TrimSide::Prefix, length: TrimLength::Shortest, pattern }),
            location: Location::START,
        };
        env.variables.get_or_new("X", Scope::Global).unwrap().value = Some(VarValue::scalar("a/b/c"));
        let w = word(vec![WordUnit::DoubleQuote(Text(vec![TextUnit::BracedParam(braced)]))]);
        let fields = expand_word(&mut env, &w).unwrap();
        assert_eq!(fields[0].value, "b/c");
    }

    #[test]
    fn brace_expansion_multiplies_fields() {
        let mut env = env();
        let w = word(
            "a{x,y}b"
                .chars()
                .map(|c| WordUnit::Unquoted(TextUnit::Literal(c)))
                .collect(),
        );
        let fields = expand_word(&mut env, &w).unwrap();
        assert_eq!(fields.iter().map(|f| f.value.as_str()).collect::<Vec<_>>(), vec!["axb", "ayb"]);
    }
}

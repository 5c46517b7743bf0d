//! `printf`: formatted output, following the POSIX utility's format-string
//! conversions and escape sequences.

use crate::common;
use sh_env::builtin::{BuiltinResult, Field};
use sh_env::Env;

/// `printf format [argument...]`: if there are more arguments than the
/// format string consumes, the format is reapplied to the rest, the way
/// the POSIX utility repeats it.
pub fn printf(_env: &mut Env, args: Vec<Field>) -> BuiltinResult {
    let (name, rest) = common::split_name(&args);
    let Some(format) = rest.first() else {
        return common::error(name, "usage: printf format [argument...]", 2);
    };
    let arguments: Vec<&str> = rest[1..].iter().map(|f| f.value.as_str()).collect();

    let mut output = String::new();
    let mut exit_status = 0;
    let mut arg_idx = 0;
    loop {
        let start_idx = arg_idx;
        let chars: Vec<char> = format.value.chars().collect();
        let mut i = 0;
        while i < chars.len() {
            if chars[i] == '\\' {
                let (text, advance) = process_escape(&chars, i);
                output.push_str(&text);
                i += advance;
            } else if chars[i] == '%' {
                if i + 1 >= chars.len() {
                    output.push('%');
                    i += 1;
                } else if chars[i + 1] == '%' {
                    output.push('%');
                    i += 2;
                } else {
                    let (formatted, advance, consumed, error) = format_spec(&chars, i, &arguments, arg_idx);
                    output.push_str(&formatted);
                    arg_idx += consumed;
                    i += advance;
                    if let Some(message) = error {
                        common::report(name, message);
                        exit_status = 1;
                    }
                }
            } else {
                output.push(chars[i]);
                i += 1;
            }
        }
        if arg_idx <= start_idx || arg_idx >= arguments.len() {
            break;
        }
    }

    print!("{output}");
    BuiltinResult::new(exit_status)
}

fn process_escape(chars: &[char], pos: usize) -> (String, usize) {
    if pos + 1 >= chars.len() {
        return ("\\".to_owned(), 1);
    }
    match chars[pos + 1] {
        '\\' => ("\\".to_owned(), 2),
        'n' => ("\n".to_owned(), 2),
        't' => ("\t".to_owned(), 2),
        'r' => ("\r".to_owned(), 2),
        'a' => ("\x07".to_owned(), 2),
        'b' => ("\x08".to_owned(), 2),
        'f' => ("\x0c".to_owned(), 2),
        'v' => ("\x0b".to_owned(), 2),
        digit @ '0'..='7' => {
            let mut octal = String::new();
            let start = if digit == '0' { pos + 2 } else { pos + 1 };
            let mut j = start;
            while j < chars.len() && j < start + 3 && ('0'..='7').contains(&chars[j]) {
                octal.push(chars[j]);
                j += 1;
            }
            let code = u32::from_str_radix(&octal, 8).unwrap_or(0) % 256;
            (char::from_u32(code).map(String::from).unwrap_or_default(), j - pos)
        }
        'x' => {
            let mut hex = String::new();
            let mut j = pos + 2;
            while j < chars.len() && j < pos + 4 && chars[j].is_ascii_hexdigit() {
                hex.push(chars[j]);
                j += 1;
            }
            if hex.is_empty() {
                ("\\x".to_owned(), 2)
            } else {
                let code = u32::from_str_radix(&hex, 16).unwrap_or(0);
                (char::from_u32(code).map(String::from).unwrap_or_default(), j - pos)
            }
        }
        other => (format!("\\{other}"), 2),
    }
}

/// Returns `(formatted, chars_advanced, args_consumed, error)`.
fn format_spec(chars: &[char], pos: usize, args: &[&str], arg_idx: usize) -> (String, usize, usize, Option<String>) {
    let mut i = pos + 1;
    while i < chars.len() && "-+ 0#".contains(chars[i]) {
        i += 1;
    }
    while i < chars.len() && chars[i].is_ascii_digit() {
        i += 1;
    }
    if i < chars.len() && chars[i] == '.' {
        i += 1;
        while i < chars.len() && chars[i].is_ascii_digit() {
            i += 1;
        }
    }
    if i >= chars.len() {
        return ("%".to_owned(), 1, 0, None);
    }

    let specifier = chars[i];
    let spec_str: String = chars[pos..=i].iter().collect();
    let advance = i - pos + 1;
    let arg = args.get(arg_idx).copied().unwrap_or("");

    match specifier {
        's' => (apply_string(&spec_str, arg), advance, 1, None),
        'd' | 'i' => {
            let (value, error) = parse_int(arg);
            (apply_int(&spec_str, value), advance, 1, error)
        }
        'x' | 'X' => {
            let (value, error) = parse_int(arg);
            let formatted = if specifier == 'X' { format!("{:X}", value as u64) } else { format!("{:x}", value as u64) };
            (formatted, advance, 1, error)
        }
        'o' => {
            let (value, error) = parse_int(arg);
            (format!("{:o}", value as u64), advance, 1, error)
        }
        'c' => (arg.chars().next().map(String::from).unwrap_or_default(), advance, 1, None),
        'b' => {
            let chars: Vec<char> = arg.chars().collect();
            let mut expanded = String::new();
            let mut j = 0;
            while j < chars.len() {
                if chars[j] == '\\' {
                    let (text, adv) = process_escape(&chars, j);
                    expanded.push_str(&text);
                    j += adv;
                } else {
                    expanded.push(chars[j]);
                    j += 1;
                }
            }
            (expanded, advance, 1, None)
        }
        _ => (spec_str, advance, 0, None),
    }
}

fn parse_int(s: &str) -> (i64, Option<String>) {
    if s.is_empty() {
        return (0, None);
    }
    match s.parse::<i64>() {
        Ok(v) => (v, None),
        Err(_) => (0, Some(format!("{s}: invalid number"))),
    }
}

fn apply_string(spec: &str, value: &str) -> String {
    let inner = &spec[1..spec.len() - 1];
    let left_justify = inner.contains('-');
    let digits: String = inner.chars().filter(|c| c.is_ascii_digit() || *c == '.').collect();
    let (width, precision) = parse_width_precision(&digits);
    let mut s = value.to_owned();
    if let Some(p) = precision {
        s.truncate(p);
    }
    pad(s, width, left_justify, false)
}

fn apply_int(spec: &str, value: i64) -> String {
    let inner = &spec[1..spec.len() - 1];
    let left_justify = inner.contains('-');
    let zero_pad = inner.contains('0') && !left_justify;
    let plus = inner.contains('+');
    let digits: String = inner.chars().filter(|c| c.is_ascii_digit()).collect();
    let (width, _) = parse_width_precision(&digits);
    let s = if plus && value >= 0 { format!("+{value}") } else { format!("{value}") };
    pad(s, width, left_justify, zero_pad)
}

fn parse_width_precision(s: &str) -> (Option<usize>, Option<usize>) {
    let mut parts = s.splitn(2, '.');
    let width = parts.next().filter(|s| !s.is_empty()).and_then(|s| s.parse().ok());
    let precision = parts.next().and_then(|s| s.parse().ok());
    (width, precision)
}

fn pad(s: String, width: Option<usize>, left_justify: bool, zero_pad: bool) -> String {
    let Some(width) = width else { return s };
    if s.len() >= width {
        return s;
    }
    let fill = width - s.len();
    if left_justify {
        format!("{s}{}", " ".repeat(fill))
    } else if zero_pad {
        let (sign, digits) = match s.strip_prefix(['+', '-']) {
            Some(rest) => (&s[..1], rest),
            None => ("", s.as_str()),
        };
        format!("{sign}{}{digits}", "0".repeat(fill))
    } else {
        format!("{}{s}", " ".repeat(fill))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::test_support::{env, fields};

    #[test]
    fn plain_text_passes_through() {
        let mut e = env();
        let result = printf(&mut e, fields(&["printf", "hello\\n"]));
        assert_eq!(result.exit_status, 0);
    }

    #[test]
    fn percent_s_substitutes_an_argument() {
        assert_eq!(format_spec(&"%s".chars().collect::<Vec<_>>(), 0, &["world"], 0).0, "world");
    }

    #[test]
    fn percent_d_formats_an_integer() {
        let (formatted, _, consumed, error) = format_spec(&"%d".chars().collect::<Vec<_>>(), 0, &["42"], 0);
        assert_eq!(formatted, "42");
        assert_eq!(consumed, 1);
        assert!(error.is_none());
    }

    #[test]
    fn percent_d_reports_an_invalid_number() {
        let (_, _, _, error) = format_spec(&"%d".chars().collect::<Vec<_>>(), 0, &["abc"], 0);
        assert!(error.is_some());
    }

    #[test]
    fn width_and_left_justify_pad_a_string() {
        assert_eq!(apply_string("%-5s", "ab"), "ab   ");
    }

    #[test]
    fn zero_padding_keeps_the_sign_in_front() {
        assert_eq!(apply_int("%05d", -3), "-0003");
    }

    #[test]
    fn format_reapplies_to_extra_arguments() {
        let mut e = env();
        let result = printf(&mut e, fields(&["printf", "%s\\n", "a", "b", "c"]));
        assert_eq!(result.exit_status, 0);
    }

    #[test]
    fn process_escape_handles_octal() {
        let chars: Vec<char> = "\\101".chars().collect();
        let (text, advance) = process_escape(&chars, 0);
        assert_eq!(text, "A");
        assert_eq!(advance, 4);
    }
}

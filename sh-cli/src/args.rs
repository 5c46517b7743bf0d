//! Command-line argument parsing: where the shell reads its script from,
//! what `set -o`-style flags it starts with, and the positional parameters
//! it hands the script.

use sh_env::option::{self, Option as ShellOption, State};
use thiserror::Error;

/// Where the shell reads commands from.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Source {
    /// Standard input, one line at a time (the interactive/script-on-stdin
    /// case).
    Stdin,
    /// A script file named on the command line.
    File { path: String },
    /// The operand to `-c`: a single string of shell source.
    String(String),
}

/// The outcome of parsing `argv`: what to run and how.
#[derive(Clone, Debug, PartialEq)]
pub struct Run {
    pub source: Source,
    /// `set -o`/`+o` style flags given on the command line, applied before
    /// the first command runs.
    pub options: Vec<(ShellOption, State)>,
    /// `$1`, `$2`, ... for the script; for `-c command name args...` this
    /// is `args...` and `name` becomes `$0`.
    pub positional_params: Vec<String>,
    /// Overrides `$0` when given (the script path, or `-c`'s `name`
    /// operand).
    pub arg0: Option<String>,
}

/// Error parsing the command line itself, distinct from any error in the
/// shell source it names.
#[derive(Clone, Debug, Error, Eq, PartialEq)]
pub enum Error {
    #[error("unknown option -- {0}")]
    UnknownOption(char),
    #[error("-c requires an operand")]
    MissingCommandString,
}

/// Parses `argv` (not including `argv[0]`, the shell's own name) following
/// POSIX `sh` invocation syntax: `[-flags] [-c command [name [arg...]]]` or
/// `[-flags] [script [arg...]]`.
pub fn parse<I: IntoIterator<Item = String>>(argv: I) -> Result<Run, Error> {
    let mut args = argv.into_iter().peekable();
    let mut options = Vec::new();
    let mut command_string = None;

    while let Some(arg) = args.peek() {
        let Some(flags) = arg.strip_prefix('-').or_else(|| arg.strip_prefix('+')) else {
            break;
        };
        if flags.is_empty() || flags == "-" {
            let had = flags == "-";
            args.next();
            if had {
                // `--`: stop option parsing, what follows is the script/operands.
            }
            break;
        }
        let state = if arg.starts_with('-') { State::On } else { State::Off };
        for c in flags.chars() {
            if c == 'c' {
                args.next();
                command_string = Some(args.next().ok_or(Error::MissingCommandString)?);
                break;
            }
            let opt = option::parse_short(c).ok_or(Error::UnknownOption(c))?;
            options.push((opt, state));
        }
        if command_string.is_some() {
            break;
        }
        args.next();
    }

    if let Some(command) = command_string {
        let arg0 = args.next();
        let positional_params = args.collect();
        return Ok(Run { source: Source::String(command), options, positional_params, arg0 });
    }

    match args.next() {
        Some(path) => {
            let positional_params = args.collect();
            Ok(Run { source: Source::File { path: path.clone() }, options, positional_params, arg0: Some(path) })
        }
        None => Ok(Run { source: Source::Stdin, options, positional_params: Vec::new(), arg0: None }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse_args(args: &[&str]) -> Run {
        parse(args.iter().map(|s| s.to_string())).unwrap()
    }

    #[test]
    fn no_operands_reads_stdin() {
        let run = parse_args(&[]);
        assert_eq!(run.source, Source::Stdin);
        assert!(run.positional_params.is_empty());
    }

    #[test]
    fn a_bare_operand_is_a_script_path() {
        let run = parse_args(&["script.sh", "a", "b"]);
        assert_eq!(run.source, Source::File { path: "script.sh".to_owned() });
        assert_eq!(run.positional_params, vec!["a".to_owned(), "b".to_owned()]);
        assert_eq!(run.arg0, Some("script.sh".to_owned()));
    }

    #[test]
    fn dash_c_takes_a_command_string_then_arg0_then_positional_params() {
        let run = parse_args(&["-c", "echo hi", "myname", "x"]);
        assert_eq!(run.source, Source::String("echo hi".to_owned()));
        assert_eq!(run.arg0, Some("myname".to_owned()));
        assert_eq!(run.positional_params, vec!["x".to_owned()]);
    }

    #[test]
    fn dash_c_with_no_command_string_is_an_error() {
        let result = parse(["-c".to_owned()]);
        assert_eq!(result, Err(Error::MissingCommandString));
    }

    #[test]
    fn short_flags_set_options() {
        let run = parse_args(&["-e", "-u"]);
        assert_eq!(run.options, vec![(ShellOption::ErrExit, State::On), (ShellOption::NoUnset, State::On)]);
    }

    #[test]
    fn plus_flags_clear_options() {
        let run = parse_args(&["+e"]);
        assert_eq!(run.options, vec![(ShellOption::ErrExit, State::Off)]);
    }

    #[test]
    fn unknown_flag_is_an_error() {
        let result = parse(["-Q".to_owned()]);
        assert_eq!(result, Err(Error::UnknownOption('Q')));
    }
}

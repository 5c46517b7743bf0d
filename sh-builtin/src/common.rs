//! Helpers shared by several built-ins: argument splitting and the
//! `name: message` diagnostic shape every built-in reports failures in.

use sh_env::builtin::{BuiltinResult, Divert, Field};

/// Prints `name: message` to stderr, the uniform diagnostic shape built-in
/// failures are reported in.
pub fn report(name: &str, message: impl std::fmt::Display) {
    eprintln!("{name}: {message}");
}

/// A failed built-in invocation: reports the message and returns the given
/// exit status with no control-flow diversion.
pub fn error(name: &str, message: impl std::fmt::Display, exit_status: i32) -> BuiltinResult {
    report(name, message);
    BuiltinResult::new(exit_status)
}

/// The conventional exit status for a built-in misusing its own arguments.
pub const USAGE_ERROR: i32 = 2;

/// Splits `args` (which still has the command name in `args[0]`) into the
/// command name and the rest, as most built-ins want them.
pub fn split_name(args: &[Field]) -> (&str, &[Field]) {
    match args.split_first() {
        Some((name, rest)) => (name.value.as_str(), rest),
        None => ("", &[]),
    }
}

/// Strips one `--` end-of-options marker if present, the way POSIX utility
/// syntax guideline 10 requires.
pub fn strip_double_dash(args: &[Field]) -> &[Field] {
    match args.first() {
        Some(f) if f.value == "--" => &args[1..],
        _ => args,
    }
}

#[must_use]
pub fn ok() -> BuiltinResult {
    BuiltinResult::new(0)
}

#[must_use]
pub fn diverting(exit_status: i32, divert: Divert) -> BuiltinResult {
    BuiltinResult::with_divert(exit_status, divert)
}

/// Shared by every built-in's test module: a fresh [`Env`] over a
/// [`RecordingSystem`], and a one-line way to build the [`Field`] vectors a
/// [`BuiltinFn`](sh_env::builtin::BuiltinFn) takes.
#[cfg(test)]
pub(crate) mod test_support {
    use sh_env::builtin::Field;
    use sh_env::virtual_system::RecordingSystem;
    use sh_env::Env;
    use sh_syntax::Location;

    pub fn env() -> Env {
        Env::new(Box::new(RecordingSystem::new()))
    }

    pub fn field(value: &str) -> Field {
        Field::new(value, Location::START)
    }

    pub fn fields(values: &[&str]) -> Vec<Field> {
        values.iter().map(|v| field(v)).collect()
    }
}

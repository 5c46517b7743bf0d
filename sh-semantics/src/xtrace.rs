//! `set -x` command tracing: prints each simple command's expanded words to
//! stderr, prefixed by `$PS4`.
//!
//! A real shell re-tokenizes `$PS4` as a word and runs it through the full
//! expansion pipeline, so `$PS4` can itself reference parameters. The
//! parser here only exposes whole-command parsing, not a "parse this as a
//! single word" entry point, so this reads `$PS4` as a plain string; a
//! `PS4` containing its own `$name` reference is shown literally rather
//! than expanded.

use sh_env::builtin::Field;
use sh_env::Env;

/// Prints `fields` to stderr in `$PS4`-prefixed trace form, if `set -x` is
/// on.
pub fn trace(env: &Env, fields: &[Field]) {
    if !env.options.is_on(sh_env::option::XTrace) {
        return;
    }
    let prefix = env
        .variables
        .get("PS4")
        .and_then(|v| v.value.as_ref())
        .and_then(sh_env::variable::Value::as_scalar)
        .unwrap_or("+ ")
        .to_owned();
    let line = fields.iter().map(|f| f.value.as_str()).collect::<Vec<_>>().join(" ");
    eprintln!("{prefix}{line}");
}

//! Tilde expansion: `~` and `~user` at the start of a word.

use sh_env::Env;

/// Resolves a tilde prefix (the part after `~`, possibly empty) to the home
/// directory it names. An unresolvable `~user` is left as the literal text
/// it came from, the way a real shell leaves a name it can't look up alone.
pub(super) fn resolve(env: &Env, prefix: &str) -> String {
    if prefix.is_empty() {
        return env
            .variables
            .get("HOME")
            .and_then(|v| v.value.as_ref())
            .and_then(sh_env::variable::Value::as_scalar)
            .map(str::to_owned)
            .unwrap_or_default();
    }
    nix::unistd::User::from_name(prefix)
        .ok()
        .flatten()
        .map(|user| user.dir.to_string_lossy().into_owned())
        .unwrap_or_else(|| format!("~{prefix}"))
}

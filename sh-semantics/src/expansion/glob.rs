//! Pathname (glob) expansion and the quote-aware pattern strings both it and
//! `${V#pattern}`-style trimming build from a word's `(char, quoted)` form.
//!
//! This walks the filesystem directly through `std::fs` rather than
//! `sh_env::system::System`: `System`'s surface is sized to what a POSIX
//! shell actually forks, execs, and redirects, and has no directory-listing
//! primitive. Reworking it just for this would ripple through every other
//! `System` implementor for one caller.

use std::path::PathBuf;

/// Builds the string a [`sh_fnmatch::Pattern`] should be parsed from:
/// glob metacharacters that came from a quoted source position are
/// backslash-escaped so `sh_fnmatch` treats them as literal text instead of
/// wildcards.
pub(super) fn pattern_string(chars: &[(char, bool)]) -> String {
    let mut s = String::new();
    for &(c, quoted) in chars {
        if quoted && matches!(c, '*' | '?' | '[' | '\\') {
            s.push('\\');
        }
        s.push(c);
    }
    s
}

/// Whether `chars` contains a glob metacharacter outside a quoted position,
/// i.e. whether pathname expansion should even be attempted.
pub(super) fn has_unquoted_meta(chars: &[(char, bool)]) -> bool {
    chars.iter().any(|&(c, quoted)| !quoted && matches!(c, '*' | '?' | '['))
}

/// Expands `chars` as a pathname pattern, returning matches in sorted
/// order. An empty result (no match) is the caller's cue to fall back to
/// the pattern's literal, quote-removed text.
pub(super) fn expand(chars: &[(char, bool)]) -> Vec<String> {
    let pattern = pattern_string(chars);
    let (is_absolute, components) = split_components(&pattern);
    if components.is_empty() {
        return Vec::new();
    }

    let mut candidates = vec![if is_absolute { PathBuf::from("/") } else { PathBuf::from(".") }];
    for component in &components {
        let has_meta = component.contains(['*', '?', '[']);
        let mut next = Vec::new();
        for base in &candidates {
            if !has_meta {
                next.push(base.join(component));
                continue;
            }
            let Ok(entries) = std::fs::read_dir(base) else { continue };
            let Ok(glob_pattern) = sh_fnmatch::Pattern::parse(component) else { continue };
            let allow_dotfiles = component.starts_with('.');
            let mut names: Vec<String> = entries
                .filter_map(Result::ok)
                .filter_map(|entry| entry.file_name().into_string().ok())
                .filter(|name| (allow_dotfiles || !name.starts_with('.')) && glob_pattern.is_match(name))
                .collect();
            names.sort();
            next.extend(names.into_iter().map(|name| base.join(name)));
        }
        candidates = next;
    }

    let mut matches: Vec<String> = candidates
        .into_iter()
        .filter(|p| p.symlink_metadata().is_ok())
        .map(|p| strip_leading_dot_slash(&p, is_absolute))
        .collect();
    matches.sort();
    matches
}

fn split_components(pattern: &str) -> (bool, Vec<String>) {
    let is_absolute = pattern.starts_with('/');
    let trimmed = pattern.trim_start_matches('/');
    let components = trimmed.split('/').filter(|s| !s.is_empty()).map(str::to_owned).collect();
    (is_absolute, components)
}

fn strip_leading_dot_slash(path: &std::path::Path, is_absolute: bool) -> String {
    let rendered = path.to_string_lossy().into_owned();
    if !is_absolute {
        if let Some(stripped) = rendered.strip_prefix("./") {
            return stripped.to_owned();
        }
    }
    rendered
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pattern_string_escapes_only_quoted_metachars() {
        let chars = vec![('*', false), ('a', false), ('*', true)];
        assert_eq!(pattern_string(&chars), "*a\\*");
    }

    #[test]
    fn has_unquoted_meta_ignores_quoted_wildcards() {
        let chars = vec![('*', true), ('a', false)];
        assert!(!has_unquoted_meta(&chars));
        let chars = vec![('*', false), ('a', false)];
        assert!(has_unquoted_meta(&chars));
    }

    #[test]
    fn split_components_handles_absolute_paths() {
        let (is_absolute, components) = split_components("/usr/*.txt");
        assert!(is_absolute);
        assert_eq!(components, vec!["usr".to_owned(), "*.txt".to_owned()]);
    }
}

//! IFS-driven field splitting (POSIX XCU 2.6.5), operating on the
//! `(char, quoted)` representation the rest of the expansion pipeline uses
//! so that quoted characters are never mistaken for delimiters.

/// Splits `chars` into fields on unquoted `ifs` characters.
///
/// An empty `ifs` disables splitting entirely: the whole input becomes one
/// field, even if that field is empty. Otherwise IFS whitespace (space,
/// tab, newline, when present in `ifs`) is trimmed at both ends and
/// collapses with an adjacent non-whitespace separator into one delimiter;
/// every other occurrence of a non-whitespace separator still delimits a
/// field of its own, empty or not.
pub(super) fn split_fields(ifs: &str, chars: &[(char, bool)]) -> Vec<Vec<(char, bool)>> {
    if ifs.is_empty() {
        return vec![chars.to_vec()];
    }
    let is_ws = |c: char| matches!(c, ' ' | '\t' | '\n');
    let in_ifs = |c: char| ifs.contains(c);

    let n = chars.len();
    let mut i = 0;
    while i < n && !chars[i].1 && is_ws(chars[i].0) && in_ifs(chars[i].0) {
        i += 1;
    }

    let mut fields: Vec<Vec<(char, bool)>> = Vec::new();
    let mut current: Vec<(char, bool)> = Vec::new();
    let mut trailing_field_pending = false;

    while i < n {
        let (c, quoted) = chars[i];
        if quoted || !in_ifs(c) {
            current.push((c, quoted));
            trailing_field_pending = false;
            i += 1;
            continue;
        }

        fields.push(std::mem::take(&mut current));
        let mut consumed_non_ws = false;
        if is_ws(c) {
            i += 1;
            while i < n && !chars[i].1 && is_ws(chars[i].0) && in_ifs(chars[i].0) {
                i += 1;
            }
            if i < n && !chars[i].1 && in_ifs(chars[i].0) && !is_ws(chars[i].0) {
                consumed_non_ws = true;
                i += 1;
                while i < n && !chars[i].1 && is_ws(chars[i].0) && in_ifs(chars[i].0) {
                    i += 1;
                }
            }
        } else {
            consumed_non_ws = true;
            i += 1;
            while i < n && !chars[i].1 && is_ws(chars[i].0) && in_ifs(chars[i].0) {
                i += 1;
            }
        }
        trailing_field_pending = consumed_non_ws;
    }

    if trailing_field_pending || !current.is_empty() {
        fields.push(current);
    }
    fields
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unquoted(s: &str) -> Vec<(char, bool)> {
        s.chars().map(|c| (c, false)).collect()
    }

    fn as_strings(fields: Vec<Vec<(char, bool)>>) -> Vec<String> {
        fields.into_iter().map(|f| f.into_iter().map(|(c, _)| c).collect()).collect()
    }

    #[test]
    fn splits_on_default_whitespace() {
        let fields = split_fields(" \t\n", &unquoted("  a  b c  "));
        assert_eq!(as_strings(fields), vec!["a", "b", "c"]);
    }

    #[test]
    fn colon_separator_keeps_empty_fields() {
        let fields = split_fields(":", &unquoted("a::b"));
        assert_eq!(as_strings(fields), vec!["a", "", "b"]);
    }

    #[test]
    fn trailing_non_whitespace_separator_yields_trailing_empty_field() {
        let fields = split_fields(":", &unquoted("a:"));
        assert_eq!(as_strings(fields), vec!["a", ""]);
    }

    #[test]
    fn all_whitespace_input_yields_no_fields() {
        let fields = split_fields(" \t\n", &unquoted("   "));
        assert!(fields.is_empty());
    }

    #[test]
    fn empty_ifs_disables_splitting() {
        let fields = split_fields("", &unquoted("a b"));
        assert_eq!(as_strings(fields), vec!["a b"]);
    }

    #[test]
    fn quoted_whitespace_is_not_a_separator() {
        let chars = vec![('a', false), (' ', true), ('b', false)];
        let fields = split_fields(" \t\n", &chars);
        assert_eq!(as_strings(fields), vec!["a b"]);
    }
}

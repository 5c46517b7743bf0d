//! `{a,b,c}` brace expansion.
//!
//! The parser has no dedicated AST node for this: a brace group is just
//! literal `{`, `,`, `}` characters inside a word. This pass runs on the
//! already-expanded `(char, quoted)` form, after parameter/command/
//! arithmetic substitution and before field splitting, and multiplies a
//! word into one variant per comma-separated alternative. A `{...}` with no
//! unquoted top-level comma is left as plain literal text, matching a shell
//! that only expands braces it recognizes as a genuine list.

/// Expands every brace group in `chars`, returning one variant per
/// combination. A word with no recognizable brace group expands to exactly
/// one variant: itself.
pub(super) fn expand(chars: &[(char, bool)]) -> Vec<Vec<(char, bool)>> {
    match find_group(chars) {
        None => vec![chars.to_vec()],
        Some((prefix, alternatives, suffix)) => alternatives
            .into_iter()
            .flat_map(|alt| {
                let mut combined = prefix.clone();
                combined.extend(alt);
                combined.extend(suffix.clone());
                expand(&combined)
            })
            .collect(),
    }
}

type Group = (Vec<(char, bool)>, Vec<Vec<(char, bool)>>, Vec<(char, bool)>);

fn find_group(chars: &[(char, bool)]) -> Option<Group> {
    let open = chars.iter().position(|&(c, q)| !q && c == '{')?;

    let mut depth = 0i32;
    let mut close = None;
    let mut commas = Vec::new();
    for (i, &(c, q)) in chars.iter().enumerate().skip(open) {
        if q {
            continue;
        }
        match c {
            '{' => depth += 1,
            '}' => {
                depth -= 1;
                if depth == 0 {
                    close = Some(i);
                    break;
                }
            }
            ',' if depth == 1 => commas.push(i),
            _ => {}
        }
    }
    let close = close?;
    if commas.is_empty() {
        return None;
    }

    let prefix = chars[..open].to_vec();
    let suffix = chars[close + 1..].to_vec();
    let mut alternatives = Vec::new();
    let mut start = open + 1;
    for &comma in &commas {
        alternatives.push(chars[start..comma].to_vec());
        start = comma + 1;
    }
    alternatives.push(chars[start..close].to_vec());
    Some((prefix, alternatives, suffix))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unquoted(s: &str) -> Vec<(char, bool)> {
        s.chars().map(|c| (c, false)).collect()
    }

    fn as_strings(variants: Vec<Vec<(char, bool)>>) -> Vec<String> {
        variants.into_iter().map(|v| v.into_iter().map(|(c, _)| c).collect()).collect()
    }

    #[test]
    fn expands_simple_list() {
        let variants = expand(&unquoted("a{b,c,d}e"));
        assert_eq!(as_strings(variants), vec!["abe", "ace", "ade"]);
    }

    #[test]
    fn leaves_comma_free_braces_literal() {
        let variants = expand(&unquoted("a{bc}d"));
        assert_eq!(as_strings(variants), vec!["a{bc}d"]);
    }

    #[test]
    fn quoted_braces_are_not_groups() {
        let chars = vec![('{', true), ('a', false), (',', true), ('b', false), ('}', true)];
        let variants = expand(&chars);
        assert_eq!(variants.len(), 1);
    }

    #[test]
    fn nested_groups_expand_independently() {
        let variants = expand(&unquoted("{a,b{1,2}}"));
        assert_eq!(as_strings(variants), vec!["a", "b1", "b2"]);
    }
}

//! Conversion of a pattern [`Ast`] to a [`regex::Regex`].

use crate::ast::{Atom, Ast, Bracket, BracketItem};
use crate::Error;
use regex::escape;

fn push_bracket(out: &mut String, bracket: &Bracket) {
    out.push('[');
    if bracket.complement {
        out.push('^');
    }
    for item in &bracket.items {
        match item {
            BracketItem::Char(c) => {
                if matches!(c, '^' | ']' | '\\' | '-') {
                    out.push('\\');
                }
                out.push(*c);
            }
            BracketItem::Range(r) => {
                out.push(*r.start());
                out.push('-');
                out.push(*r.end());
            }
        }
    }
    out.push(']');
}

/// Compiles an [`Ast`] into an anchored regular expression matching the
/// whole subject string.
pub fn to_regex(ast: &Ast) -> Result<regex::Regex, Error> {
    let mut pattern = String::from("(?s)\\A");
    for atom in &ast.atoms {
        match atom {
            Atom::Char(c) => pattern.push_str(&escape(&c.to_string())),
            Atom::AnyChar => pattern.push('.'),
            Atom::AnyString => pattern.push_str(".*"),
            Atom::Bracket(b) => push_bracket(&mut pattern, b),
        }
    }
    pattern.push_str("\\z");
    regex::Regex::new(&pattern).map_err(|source| Error::InvalidPattern { source })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn compiles_wildcards() {
        let ast = Ast::new("a*b?c").unwrap();
        let re = to_regex(&ast).unwrap();
        assert!(re.is_match("axxxbyc"));
        assert!(!re.is_match("axxxbyyc"));
    }
}

//! Abstract syntax tree for globbing patterns.

use crate::Error;
use std::ops::RangeInclusive;
use std::str::Chars;

/// A single item inside a bracket expression (`[...]`).
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum BracketItem {
    /// A literal character.
    Char(char),
    /// A character range, e.g. `a-z`.
    Range(RangeInclusive<char>),
}

/// A bracket expression, e.g. `[!a-z0-9]`.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Bracket {
    /// Whether the expression starts with `!` or `^`, inverting the match.
    pub complement: bool,
    /// The literal characters and ranges inside the brackets.
    pub items: Vec<BracketItem>,
}

impl Bracket {
    pub(crate) fn matches(&self, c: char) -> bool {
        let found = self.items.iter().any(|item| match item {
            BracketItem::Char(x) => *x == c,
            BracketItem::Range(r) => r.contains(&c),
        });
        found != self.complement
    }
}

/// One component of a pattern.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Atom {
    /// A literal character.
    Char(char),
    /// `?`, matching exactly one character.
    AnyChar,
    /// `*`, matching any run of characters, including none.
    AnyString,
    /// A bracket expression.
    Bracket(Bracket),
}

/// A fully parsed pattern.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Ast {
    pub atoms: Vec<Atom>,
}

impl Ast {
    /// Parses a pattern string into an AST.
    pub fn new(pattern: &str) -> Result<Self, Error> {
        let mut atoms = Vec::new();
        let mut chars = pattern.chars();
        while let Some(c) = chars.next() {
            let atom = match c {
                '?' => Atom::AnyChar,
                '*' => Atom::AnyString,
                '[' => parse_bracket(&mut chars)?,
                '\\' => match chars.next() {
                    Some(escaped) => Atom::Char(escaped),
                    None => Atom::Char('\\'),
                },
                c => Atom::Char(c),
            };
            atoms.push(atom);
        }
        Ok(Ast { atoms })
    }
}

/// Parses the content of a bracket expression, the leading `[` already
/// consumed. On failure to find a closing `]`, the whole thing falls back
/// to a literal `[` (POSIX behavior for malformed bracket expressions).
fn parse_bracket(chars: &mut Chars<'_>) -> Result<Atom, Error> {
    let rest = chars.as_str();
    let mut scan = rest.chars();
    let mut consumed = 0usize;

    let mut complement = false;
    if let Some(c) = scan.clone().next() {
        if c == '!' || c == '^' {
            complement = true;
            scan.next();
            consumed += c.len_utf8();
        }
    }

    let mut items = Vec::new();
    let mut first = true;
    loop {
        let Some(c) = scan.next() else {
            // Unterminated bracket: treat the whole thing as a literal '['.
            return Ok(Atom::Char('['));
        };
        consumed += c.len_utf8();
        if c == ']' && !first {
            break;
        }
        first = false;

        // Lookahead for a range `c-d`.
        let mut lookahead = scan.clone();
        if lookahead.next() == Some('-') {
            let mut after_dash = lookahead.clone();
            after_dash.next();
            if let Some(end) = after_dash.next() {
                if end != ']' {
                    scan = after_dash;
                    consumed += '-'.len_utf8() + end.len_utf8();
                    items.push(BracketItem::Range(c..=end));
                    continue;
                }
            }
        }
        items.push(BracketItem::Char(c));
    }

    for _ in 0..consumed {
        chars.next();
    }

    Ok(Atom::Bracket(Bracket { complement, items }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn literal() {
        let ast = Ast::new("abc").unwrap();
        assert_eq!(
            ast.atoms,
            vec![Atom::Char('a'), Atom::Char('b'), Atom::Char('c')]
        );
    }

    #[test]
    fn wildcards() {
        let ast = Ast::new("a?*").unwrap();
        assert_eq!(
            ast.atoms,
            vec![Atom::Char('a'), Atom::AnyChar, Atom::AnyString]
        );
    }

    #[test]
    fn bracket_range_and_complement() {
        let ast = Ast::new("[!a-z0-9]").unwrap();
        let Atom::Bracket(b) = &ast.atoms[0] else {
            panic!("expected bracket")
        };
        assert!(b.complement);
        assert!(b.matches('5'));
        assert!(!b.matches('m'));
    }

    #[test]
    fn unterminated_bracket_is_literal() {
        let ast = Ast::new("[abc").unwrap();
        assert_eq!(ast.atoms[0], Atom::Char('['));
    }
}

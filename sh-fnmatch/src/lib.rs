//! Pattern matching for globbing and the parameter-expansion strip/replace
//! operators.
//!
//! Supported syntax:
//!
//! - Any single character (`?`)
//! - Any character sequence, including empty (`*`)
//! - Bracket expressions (`[...]`) with character literals, ranges
//!   (`a-z`), and negation via a leading `!` or `^`
//!
//! This crate does not implement locale-specific collating symbols or
//! equivalence classes; matching is always byte-for-byte on `char`s.

mod ast;
mod regex;

use thiserror::Error;

/// Error parsing or compiling a pattern.
#[derive(Debug, Error)]
pub enum Error {
    /// The bracket expression or wildcard structure was invalid.
    #[error("invalid pattern: {source}")]
    InvalidPattern {
        #[source]
        source: ::regex::Error,
    },
}

/// A compiled glob pattern.
#[derive(Clone, Debug)]
pub struct Pattern {
    source: String,
    regex: ::regex::Regex,
}

impl Pattern {
    /// Parses and compiles `pattern`.
    pub fn parse(pattern: &str) -> Result<Self, Error> {
        let ast = ast::Ast::new(pattern)?;
        let regex = regex::to_regex(&ast)?;
        Ok(Pattern {
            source: pattern.to_owned(),
            regex,
        })
    }

    /// Returns whether `s` matches this pattern in its entirety.
    #[must_use]
    pub fn is_match(&self, s: &str) -> bool {
        self.regex.is_match(s)
    }

    /// Finds the shortest prefix of `s` that matches this pattern, if any.
    ///
    /// Used by `${V#p}`.
    #[must_use]
    pub fn shortest_prefix_match<'a>(&self, s: &'a str) -> Option<&'a str> {
        self.prefix_match(s, false)
    }

    /// Finds the longest prefix of `s` that matches this pattern, if any.
    ///
    /// Used by `${V##p}`.
    #[must_use]
    pub fn longest_prefix_match<'a>(&self, s: &'a str) -> Option<&'a str> {
        self.prefix_match(s, true)
    }

    fn prefix_match<'a>(&self, s: &'a str, longest: bool) -> Option<&'a str> {
        let boundaries = s.char_indices().map(|(i, _)| i).chain(std::iter::once(s.len()));
        let mut best = None;
        for end in boundaries {
            if self.is_match(&s[..end]) {
                best = Some(&s[..end]);
                if !longest {
                    return best;
                }
            }
        }
        best
    }

    /// Finds the shortest suffix of `s` that matches this pattern, if any.
    ///
    /// Used by `${V%p}`.
    #[must_use]
    pub fn shortest_suffix_match<'a>(&self, s: &'a str) -> Option<&'a str> {
        self.suffix_match(s, false)
    }

    /// Finds the longest suffix of `s` that matches this pattern, if any.
    ///
    /// Used by `${V%%p}`.
    #[must_use]
    pub fn longest_suffix_match<'a>(&self, s: &'a str) -> Option<&'a str> {
        self.suffix_match(s, true)
    }

    fn suffix_match<'a>(&self, s: &'a str, longest: bool) -> Option<&'a str> {
        let mut boundaries: Vec<usize> = s.char_indices().map(|(i, _)| i).collect();
        boundaries.push(s.len());
        let mut best = None;
        for &start in boundaries.iter().rev() {
            if self.is_match(&s[start..]) {
                best = Some(&s[start..]);
                if !longest {
                    return best;
                }
            }
        }
        best
    }

    /// The original, uncompiled pattern text.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.source
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn whole_string_match() {
        let p = Pattern::parse("*.txt").unwrap();
        assert!(p.is_match("report.txt"));
        assert!(!p.is_match("report.txt.bak"));
    }

    #[test]
    fn prefix_and_suffix_strip() {
        let p = Pattern::parse("*/").unwrap();
        assert_eq!(
            p.longest_prefix_match("a/b/c.txt"),
            Some("a/b/")
        );
        assert_eq!(p.shortest_prefix_match("a/b/c.txt"), Some("a/"));

        let p = Pattern::parse(".*").unwrap();
        assert_eq!(p.longest_suffix_match("file.tar.gz"), Some(".tar.gz"));
        assert_eq!(p.shortest_suffix_match("file.tar.gz"), Some(".gz"));
    }

    #[test]
    fn bracket_negation() {
        let p = Pattern::parse("[!0-9]*").unwrap();
        assert!(p.is_match("abc"));
        assert!(!p.is_match("1bc"));
    }
}

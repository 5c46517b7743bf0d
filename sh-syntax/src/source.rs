//! Source code positions.
//!
//! Every token and AST node remembers where it came from so that later
//! diagnostics (parse errors, `set -n`, `$LINENO`) can point back at the
//! original input instead of just naming a byte offset.

#[cfg(feature = "annotate-snippets")]
pub mod pretty;

use std::fmt;

/// A position in a piece of shell source text.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq)]
pub struct Location {
    /// Byte offset from the start of the source.
    pub offset: usize,
    /// 1-based line number.
    pub line: usize,
    /// 1-based column number (in chars, not bytes).
    pub column: usize,
}

impl Location {
    /// The location of the very first character of a source.
    pub const START: Location = Location {
        offset: 0,
        line: 1,
        column: 1,
    };
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "line {}, column {}", self.line, self.column)
    }
}

/// Tracks the current line/column while scanning a source string so
/// [`Location`]s can be produced incrementally as the scan advances.
#[derive(Clone, Debug)]
pub(crate) struct Cursor {
    pub offset: usize,
    pub line: usize,
    pub column: usize,
}

impl Cursor {
    pub fn new() -> Self {
        Cursor {
            offset: 0,
            line: 1,
            column: 1,
        }
    }

    pub fn location(&self) -> Location {
        Location {
            offset: self.offset,
            line: self.line,
            column: self.column,
        }
    }

    pub fn advance(&mut self, c: char) {
        self.offset += c.len_utf8();
        if c == '\n' {
            self.line += 1;
            self.column = 1;
        } else {
            self.column += 1;
        }
    }
}

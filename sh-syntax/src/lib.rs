//! Tokenizer, parser, and abstract syntax tree for the shell command
//! language: turns source text into a [`syntax::List`] that the
//! executor crate walks directly, with no separate IR in between.

pub mod lex;
pub mod parser;
pub mod source;
pub mod syntax;

pub use parser::{parse, parse_line, Error};
pub use source::Location;
pub use syntax::*;

//! Tokenization of arithmetic expressions.

use std::iter::Peekable;
use std::str::CharIndices;
use thiserror::Error;

/// A lexical operator recognized inside `$((...))`.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Op {
    Plus,
    Minus,
    Star,
    Slash,
    Percent,
    StarStar,
    Bang,
    Tilde,
    LShift,
    RShift,
    Lt,
    Le,
    Gt,
    Ge,
    EqEq,
    Ne,
    And,
    Caret,
    Or,
    AndAnd,
    OrOr,
    Question,
    Colon,
    Assign,
    PlusEq,
    MinusEq,
    StarEq,
    SlashEq,
    PercentEq,
    LShiftEq,
    RShiftEq,
    AndEq,
    CaretEq,
    OrEq,
    PlusPlus,
    MinusMinus,
    LParen,
    RParen,
}

/// A single token of an arithmetic expression.
#[derive(Clone, Debug, PartialEq)]
pub enum Token<'a> {
    Number(i64),
    Ident(&'a str),
    Op(Op),
}

/// Error produced while tokenizing.
#[derive(Clone, Debug, Error, Eq, PartialEq)]
pub enum TokenError {
    #[error("invalid character {0:?}")]
    InvalidChar(char),
    #[error("invalid number literal {0:?}")]
    InvalidNumber(String),
}

pub struct Tokenizer<'a> {
    source: &'a str,
    chars: Peekable<CharIndices<'a>>,
}

impl<'a> Tokenizer<'a> {
    pub fn new(source: &'a str) -> Self {
        Tokenizer {
            source,
            chars: source.char_indices().peekable(),
        }
    }

    fn two(&mut self, second: char, two: Op, one: Op) -> Op {
        if self.chars.peek().map(|&(_, c)| c) == Some(second) {
            self.chars.next();
            two
        } else {
            one
        }
    }
}

impl<'a> Iterator for Tokenizer<'a> {
    type Item = Result<Token<'a>, TokenError>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let &(start, c) = self.chars.peek()?;
            if c.is_whitespace() {
                self.chars.next();
                continue;
            }

            if c.is_ascii_digit() {
                let mut end = start;
                while let Some(&(i, d)) = self.chars.peek() {
                    if d.is_ascii_alphanumeric() || d == 'x' || d == 'X' {
                        end = i + d.len_utf8();
                        self.chars.next();
                    } else {
                        break;
                    }
                }
                let text = &self.source[start..end];
                let value = if let Some(hex) = text.strip_prefix("0x").or_else(|| text.strip_prefix("0X")) {
                    i64::from_str_radix(hex, 16)
                } else if text.len() > 1 && text.starts_with('0') {
                    i64::from_str_radix(&text[1..], 8)
                } else {
                    text.parse()
                };
                return Some(value.map(Token::Number).map_err(|_| TokenError::InvalidNumber(text.to_owned())));
            }

            if c.is_alphabetic() || c == '_' {
                let mut end = start;
                while let Some(&(i, d)) = self.chars.peek() {
                    if d.is_alphanumeric() || d == '_' {
                        end = i + d.len_utf8();
                        self.chars.next();
                    } else {
                        break;
                    }
                }
                return Some(Ok(Token::Ident(&self.source[start..end])));
            }

            self.chars.next();
            let op = match c {
                '+' => {
                    if self.chars.peek().map(|&(_, c)| c) == Some('+') {
                        self.chars.next();
                        Op::PlusPlus
                    } else {
                        self.two('=', Op::PlusEq, Op::Plus)
                    }
                }
                '-' => {
                    if self.chars.peek().map(|&(_, c)| c) == Some('-') {
                        self.chars.next();
                        Op::MinusMinus
                    } else {
                        self.two('=', Op::MinusEq, Op::Minus)
                    }
                }
                '*' => {
                    if self.chars.peek().map(|&(_, c)| c) == Some('*') {
                        self.chars.next();
                        Op::StarStar
                    } else {
                        self.two('=', Op::StarEq, Op::Star)
                    }
                }
                '/' => self.two('=', Op::SlashEq, Op::Slash),
                '%' => self.two('=', Op::PercentEq, Op::Percent),
                '!' => self.two('=', Op::Ne, Op::Bang),
                '~' => Op::Tilde,
                '<' => {
                    if self.chars.peek().map(|&(_, c)| c) == Some('<') {
                        self.chars.next();
                        self.two('=', Op::LShiftEq, Op::LShift)
                    } else {
                        self.two('=', Op::Le, Op::Lt)
                    }
                }
                '>' => {
                    if self.chars.peek().map(|&(_, c)| c) == Some('>') {
                        self.chars.next();
                        self.two('=', Op::RShiftEq, Op::RShift)
                    } else {
                        self.two('=', Op::Ge, Op::Gt)
                    }
                }
                '=' => self.two('=', Op::EqEq, Op::Assign),
                '&' => {
                    if self.chars.peek().map(|&(_, c)| c) == Some('&') {
                        self.chars.next();
                        Op::AndAnd
                    } else {
                        self.two('=', Op::AndEq, Op::And)
                    }
                }
                '^' => self.two('=', Op::CaretEq, Op::Caret),
                '|' => {
                    if self.chars.peek().map(|&(_, c)| c) == Some('|') {
                        self.chars.next();
                        Op::OrOr
                    } else {
                        self.two('=', Op::OrEq, Op::Or)
                    }
                }
                '?' => Op::Question,
                ':' => Op::Colon,
                '(' => Op::LParen,
                ')' => Op::RParen,
                other => return Some(Err(TokenError::InvalidChar(other))),
            };
            return Some(Ok(Token::Op(op)));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn toks(s: &str) -> Vec<Token<'_>> {
        Tokenizer::new(s).map(Result::unwrap).collect()
    }

    #[test]
    fn numbers_and_idents() {
        assert_eq!(toks("x + 1"), vec![Token::Ident("x"), Token::Op(Op::Plus), Token::Number(1)]);
    }

    #[test]
    fn multi_char_operators_prefer_longest() {
        assert_eq!(toks("<<="), vec![Token::Op(Op::LShiftEq)]);
        assert_eq!(toks("<<"), vec![Token::Op(Op::LShift)]);
        assert_eq!(toks("<="), vec![Token::Op(Op::Le)]);
        assert_eq!(toks("<"), vec![Token::Op(Op::Lt)]);
    }

    #[test]
    fn hex_and_octal_literals() {
        assert_eq!(toks("0x1F"), vec![Token::Number(31)]);
        assert_eq!(toks("010"), vec![Token::Number(8)]);
    }
}

//! Recursive-descent parser: consumes the [`Lexer`]'s token stream and
//! builds the [`crate::syntax`] AST. Reserved words (`if`, `then`, `do`,
//! `{`, ...) are not distinct tokens — they are plain [`Word`]s that this
//! module recognizes by comparing [`Word::to_literal`].

use crate::lex::{self, Lexer, Operator, Token};
use crate::source::Location;
use crate::syntax::*;
use std::collections::VecDeque;
use std::rc::Rc;
use thiserror::Error;

#[derive(Clone, Debug, Error, PartialEq)]
pub enum Error {
    #[error(transparent)]
    Lex(#[from] lex::Error),
    #[error("unexpected end of input at {0}")]
    UnexpectedEof(Location),
    #[error("unexpected token at {0}: expected {expected}")]
    Unexpected { location: Location, expected: String },
    #[error("{0}: missing command after pipe")]
    MissingPipelineCommand(Location),
    #[error("{0}: `{1}` without matching opening keyword")]
    UnmatchedKeyword(Location, &'static str),
    #[error("{0}: case pattern must be followed by `)`")]
    MalformedCasePattern(Location),
}

/// Parses an entire script, up to end of input.
pub fn parse(src: &str) -> Result<List, Error> {
    let mut p = Parser::new(src);
    let list = p.parse_list(&[])?;
    p.skip_separators();
    match p.peek()? {
        Token::Eof(_) => Ok(list),
        _ => Err(Error::Unexpected {
            location: p.location()?,
            expected: "end of input".to_owned(),
        }),
    }
}

/// Parses a single interactive command line, stopping at the first
/// unescaped newline (used by a REPL reading one line at a time; the
/// caller is responsible for requesting more input if a construct like
/// `if` or a quote was left open, signaled by [`Error::UnexpectedEof`]).
pub fn parse_line(src: &str) -> Result<List, Error> {
    parse(src)
}

struct Parser<'a> {
    lexer: Lexer<'a>,
    peeked: VecDeque<Token>,
}

const OPENING_KEYWORDS: &[&str] = &["if", "for", "while", "until", "case", "{", "("];

impl<'a> Parser<'a> {
    fn new(src: &'a str) -> Self {
        Parser {
            lexer: Lexer::new(src),
            peeked: VecDeque::new(),
        }
    }

    fn peek(&mut self) -> Result<&Token, Error> {
        self.peek_nth(0)
    }

    /// Ensures at least `n + 1` tokens are buffered and returns the one at
    /// offset `n` without consuming it.
    fn peek_nth(&mut self, n: usize) -> Result<&Token, Error> {
        while self.peeked.len() <= n {
            let t = self.lexer.next_token()?;
            self.peeked.push_back(t);
        }
        Ok(&self.peeked[n])
    }

    fn bump(&mut self) -> Result<Token, Error> {
        if let Some(t) = self.peeked.pop_front() {
            return Ok(t);
        }
        Ok(self.lexer.next_token()?)
    }

    fn location(&mut self) -> Result<Location, Error> {
        Ok(match self.peek()? {
            Token::Word(w) => w.location,
            Token::Op(_, loc) | Token::Newline(loc) | Token::Eof(loc) => *loc,
            Token::IoNumber(_) => Location::START,
        })
    }

    fn peek_is_op(&mut self, op: Operator) -> Result<bool, Error> {
        Ok(matches!(self.peek()?, Token::Op(o, _) if *o == op))
    }

    fn eat_op(&mut self, op: Operator) -> Result<bool, Error> {
        if self.peek_is_op(op)? {
            self.bump()?;
            Ok(true)
        } else {
            Ok(false)
        }
    }

    fn expect_op(&mut self, op: Operator, expected: &str) -> Result<(), Error> {
        if self.eat_op(op)? {
            Ok(())
        } else {
            Err(Error::Unexpected {
                location: self.location()?,
                expected: expected.to_owned(),
            })
        }
    }

    /// Peeks the upcoming word's literal text, if it is an unquoted word
    /// (used to recognize reserved words without consuming the token).
    fn peek_keyword(&mut self) -> Result<Option<String>, Error> {
        Ok(match self.peek()? {
            Token::Word(w) => w.to_literal(),
            _ => None,
        })
    }

    fn eat_keyword(&mut self, kw: &str) -> Result<bool, Error> {
        if self.peek_keyword()?.as_deref() == Some(kw) {
            self.bump()?;
            Ok(true)
        } else {
            Ok(false)
        }
    }

    fn expect_keyword(&mut self, kw: &'static str) -> Result<(), Error> {
        if self.eat_keyword(kw)? {
            Ok(())
        } else {
            Err(Error::Unexpected {
                location: self.location()?,
                expected: format!("`{kw}`"),
            })
        }
    }

    fn skip_separators(&mut self) {
        while matches!(self.peek(), Ok(Token::Newline(_))) {
            let _ = self.bump();
        }
    }

    fn is_at_list_end(&mut self, terminators: &[&str]) -> Result<bool, Error> {
        match self.peek()? {
            Token::Eof(_) => Ok(true),
            // `)` always closes a subshell body; pipelines never contain
            // a bare `)` as a command start.
            Token::Op(Operator::RParen | Operator::SemiSemi, _) => Ok(true),
            Token::Word(w) => Ok(w.to_literal().is_some_and(|s| terminators.contains(&s.as_str()))),
            _ => Ok(false),
        }
    }

    /// `item (';' | '&' | newline)*`, repeated until EOF or one of
    /// `terminators` (a reserved word like `fi`/`done`/`esac`) is seen.
    fn parse_list(&mut self, terminators: &[&str]) -> Result<List, Error> {
        let mut items = Vec::new();
        self.skip_separators();
        while !self.is_at_list_end(terminators)? {
            let and_or = self.parse_and_or()?;
            let is_async = self.eat_op(Operator::Amp)?;
            if !is_async {
                let _ = self.eat_op(Operator::Semi)?;
            }
            items.push(Item {
                and_or: Rc::new(and_or),
                is_async,
            });
            self.skip_separators();
            if self.is_at_list_end(terminators)? {
                break;
            }
        }
        Ok(List(items))
    }

    fn parse_and_or(&mut self) -> Result<AndOrList, Error> {
        let first = self.parse_pipeline()?;
        let mut rest = Vec::new();
        loop {
            let op = if self.eat_op(Operator::AndAnd)? {
                AndOr::AndThen
            } else if self.eat_op(Operator::OrOr)? {
                AndOr::OrElse
            } else {
                break;
            };
            self.skip_separators();
            rest.push((op, self.parse_pipeline()?));
        }
        Ok(AndOrList { first, rest })
    }

    fn parse_pipeline(&mut self) -> Result<Pipeline, Error> {
        let negation = self.eat_keyword("!")?;
        let mut commands = vec![Rc::new(self.parse_command()?)];
        while self.eat_op(Operator::Pipe)? {
            self.skip_separators();
            let loc = self.location()?;
            if self.is_at_list_end(&[])? {
                return Err(Error::MissingPipelineCommand(loc));
            }
            commands.push(Rc::new(self.parse_command()?));
        }
        Ok(Pipeline { commands, negation })
    }

    fn parse_command(&mut self) -> Result<Command, Error> {
        if let Some(kw) = self.peek_keyword()? {
            if OPENING_KEYWORDS.contains(&kw.as_str()) {
                return Ok(Command::Compound(self.parse_full_compound_command()?));
            }
        }
        if self.looks_like_function_definition()? {
            return Ok(Command::Function(self.parse_function_definition()?));
        }
        Ok(Command::Simple(self.parse_simple_command()?))
    }

    /// A function definition looks like `name(` with no intervening
    /// whitespace token — distinguished from a simple command whose first
    /// word happens to be followed by a parenthesized subshell, which
    /// POSIX shells never allow directly after a command word either way.
    fn looks_like_function_definition(&mut self) -> Result<bool, Error> {
        let Token::Word(w) = self.peek_nth(0)? else {
            return Ok(false);
        };
        if w.to_literal().is_none() {
            return Ok(false);
        }
        Ok(matches!(self.peek_nth(1)?, Token::Op(Operator::LParen, _)))
    }

    fn parse_function_definition(&mut self) -> Result<FunctionDefinition, Error> {
        let Token::Word(name_word) = self.bump()? else {
            unreachable!("looks_like_function_definition checked this")
        };
        let name = name_word.to_literal().expect("checked by caller");
        self.expect_op(Operator::LParen, "`(`")?;
        // The whole parameter list tokenizes as ordinary words (`,` is not
        // an operator), so collect their literal text and split it
        // ourselves rather than trying to treat `,` as a token.
        let mut raw = String::new();
        while !self.peek_is_op(Operator::RParen)? {
            let Token::Word(w) = self.bump()? else {
                return Err(Error::Unexpected {
                    location: self.location()?,
                    expected: "parameter name".to_owned(),
                });
            };
            let text = w.to_literal().ok_or_else(|| Error::Unexpected {
                location: w.location,
                expected: "unquoted parameter name".to_owned(),
            })?;
            if !raw.is_empty() {
                raw.push(' ');
            }
            raw.push_str(&text);
        }
        self.expect_op(Operator::RParen, "`)`")?;
        let mut params = Vec::new();
        for spec in raw.split(',') {
            let spec = spec.trim();
            if spec.is_empty() {
                continue;
            }
            let (pname, default) = match spec.split_once('=') {
                Some((n, d)) => (n.trim().to_owned(), Some(d.trim().to_owned())),
                None => (spec.to_owned(), None),
            };
            let default_word = default.map(|d| Word {
                units: d.chars().map(|c| WordUnit::Unquoted(TextUnit::Literal(c))).collect(),
                location: name_word.location,
            });
            params.push(FunctionParam {
                name: pname,
                default: default_word,
            });
        }
        self.skip_separators();
        let body = Rc::new(self.parse_full_compound_command()?);
        Ok(FunctionDefinition { name, params, body })
    }

    fn parse_full_compound_command(&mut self) -> Result<FullCompoundCommand, Error> {
        let command = self.parse_compound_command()?;
        let redirs = self.parse_redirs()?;
        Ok(FullCompoundCommand { command, redirs })
    }

    fn parse_compound_command(&mut self) -> Result<CompoundCommand, Error> {
        if self.eat_keyword("{")? {
            let list = self.parse_list(&["}"])?;
            self.expect_keyword("}")?;
            return Ok(CompoundCommand::Grouping(list));
        }
        if self.eat_op(Operator::LParen)? {
            let list = self.parse_list(&[])?;
            self.expect_op(Operator::RParen, "`)`")?;
            return Ok(CompoundCommand::Subshell(list));
        }
        if self.eat_keyword("if")? {
            return self.parse_if();
        }
        if self.eat_keyword("for")? {
            return self.parse_for();
        }
        if self.eat_keyword("while")? {
            let condition = self.parse_list(&["do"])?;
            self.expect_keyword("do")?;
            let body = self.parse_list(&["done"])?;
            self.expect_keyword("done")?;
            return Ok(CompoundCommand::While { condition, body });
        }
        if self.eat_keyword("until")? {
            let condition = self.parse_list(&["do"])?;
            self.expect_keyword("do")?;
            let body = self.parse_list(&["done"])?;
            self.expect_keyword("done")?;
            return Ok(CompoundCommand::Until { condition, body });
        }
        if self.eat_keyword("case")? {
            return self.parse_case();
        }
        Err(Error::Unexpected {
            location: self.location()?,
            expected: "compound command".to_owned(),
        })
    }

    fn parse_if(&mut self) -> Result<CompoundCommand, Error> {
        let condition = self.parse_list(&["then"])?;
        self.expect_keyword("then")?;
        let body = self.parse_list(&["elif", "else", "fi"])?;
        let mut elifs = Vec::new();
        while self.eat_keyword("elif")? {
            let c = self.parse_list(&["then"])?;
            self.expect_keyword("then")?;
            let b = self.parse_list(&["elif", "else", "fi"])?;
            elifs.push(ElifThen { condition: c, body: b });
        }
        let r#else = if self.eat_keyword("else")? {
            Some(self.parse_list(&["fi"])?)
        } else {
            None
        };
        self.expect_keyword("fi")?;
        Ok(CompoundCommand::If {
            condition,
            body,
            elifs,
            r#else,
        })
    }

    fn parse_for(&mut self) -> Result<CompoundCommand, Error> {
        let Token::Word(name_word) = self.bump()? else {
            return Err(Error::Unexpected {
                location: self.location()?,
                expected: "loop variable name".to_owned(),
            });
        };
        let name = name_word.to_literal().ok_or_else(|| Error::Unexpected {
            location: name_word.location,
            expected: "unquoted loop variable name".to_owned(),
        })?;
        self.skip_separators();
        let values = if self.eat_keyword("in")? {
            let mut words = Vec::new();
            while let Token::Word(_) = self.peek()? {
                let Token::Word(w) = self.bump()? else { unreachable!() };
                words.push(w);
            }
            let _ = self.eat_op(Operator::Semi)?;
            self.skip_separators();
            Some(words)
        } else {
            let _ = self.eat_op(Operator::Semi)?;
            self.skip_separators();
            None
        };
        self.expect_keyword("do")?;
        let body = self.parse_list(&["done"])?;
        self.expect_keyword("done")?;
        Ok(CompoundCommand::For { name, values, body })
    }

    fn parse_case(&mut self) -> Result<CompoundCommand, Error> {
        let Token::Word(subject) = self.bump()? else {
            return Err(Error::Unexpected {
                location: self.location()?,
                expected: "case subject".to_owned(),
            });
        };
        self.skip_separators();
        self.expect_keyword("in")?;
        self.skip_separators();
        let mut items = Vec::new();
        while !self.eat_keyword("esac")? {
            let _ = self.eat_op(Operator::LParen)?;
            let mut patterns = Vec::new();
            loop {
                let Token::Word(p) = self.bump()? else {
                    return Err(Error::MalformedCasePattern(self.location()?));
                };
                patterns.push(p);
                if self.eat_op(Operator::Pipe)? {
                    continue;
                }
                break;
            }
            self.expect_op(Operator::RParen, "`)`")?;
            self.skip_separators();
            let body = self.parse_list(&["esac"])?;
            let _ = self.eat_op(Operator::SemiSemi)?;
            self.skip_separators();
            items.push(CaseItem { patterns, body });
        }
        Ok(CompoundCommand::Case { subject, items })
    }

    fn parse_simple_command(&mut self) -> Result<SimpleCommand, Error> {
        let mut cmd = SimpleCommand::default();
        loop {
            match self.peek()? {
                Token::Word(w) => {
                    if cmd.words.is_empty() {
                        if let Some(assign) = word_as_assign(w) {
                            let Token::Word(_) = self.bump()? else { unreachable!() };
                            cmd.assigns.push(assign);
                            continue;
                        }
                    }
                    let Token::Word(w) = self.bump()? else { unreachable!() };
                    cmd.words.push(w);
                }
                _ => {
                    if let Some(r) = self.try_parse_redir()? {
                        cmd.redirs.push(r);
                        continue;
                    }
                    break;
                }
            }
        }
        if cmd.is_empty() {
            return Err(Error::Unexpected {
                location: self.location()?,
                expected: "a command".to_owned(),
            });
        }
        Ok(cmd)
    }

    fn parse_redirs(&mut self) -> Result<Vec<Redir>, Error> {
        let mut redirs = Vec::new();
        while let Some(r) = self.try_parse_redir()? {
            redirs.push(r);
        }
        Ok(redirs)
    }

    fn try_parse_redir(&mut self) -> Result<Option<Redir>, Error> {
        let fd = match self.peek()? {
            Token::IoNumber(n) => Some(Fd(*n)),
            Token::Op(
                Operator::Less
                | Operator::Great
                | Operator::GreatGreat
                | Operator::LessLess
                | Operator::LessLessDash
                | Operator::GreatPipe
                | Operator::AmpGreat
                | Operator::LessAmp
                | Operator::GreatAmp,
                _,
            ) => None,
            _ => return Ok(None),
        };
        if fd.is_some() {
            self.bump()?;
        }
        self.parse_redir_body(fd).map(Some)
    }

    fn parse_redir_body(&mut self, fd: Option<Fd>) -> Result<Redir, Error> {
        let Token::Op(op, loc) = self.bump()? else {
            return Err(Error::Unexpected {
                location: self.location()?,
                expected: "redirection operator".to_owned(),
            });
        };
        let body = match op {
            Operator::LessLess | Operator::LessLessDash => {
                let Token::Word(delimiter) = self.bump()? else {
                    return Err(Error::Unexpected {
                        location: loc,
                        expected: "here-document delimiter".to_owned(),
                    });
                };
                // Quoting any part of the delimiter suppresses expansion
                // in the body (POSIX); an all-literal delimiter is the
                // common unquoted case.
                let quoted = delimiter.to_literal().is_none();
                let heredoc = self.lexer.push_pending_heredoc(
                    delimiter,
                    op == Operator::LessLessDash,
                    quoted,
                );
                RedirBody::HereDoc(heredoc)
            }
            _ => {
                let operand = match self.bump()? {
                    Token::Word(w) => w,
                    _ => {
                        return Err(Error::Unexpected {
                            location: loc,
                            expected: "redirection target".to_owned(),
                        })
                    }
                };
                let redir_op = match op {
                    Operator::Less => RedirOp::FileIn,
                    Operator::Great => RedirOp::FileOut,
                    Operator::GreatGreat => RedirOp::FileAppend,
                    Operator::GreatPipe => RedirOp::FileClobber,
                    Operator::AmpGreat => RedirOp::FileOutErr,
                    Operator::LessAmp => RedirOp::FdIn,
                    Operator::GreatAmp => RedirOp::FdOut,
                    _ => unreachable!("filtered by caller"),
                };
                RedirBody::Normal {
                    operator: redir_op,
                    operand,
                }
            }
        };
        Ok(Redir { fd, body })
    }
}

/// Recognizes a `NAME=value` or `NAME=(a b c)` word as an [`Assign`],
/// without consuming it — the caller decides whether to commit.
fn word_as_assign(word: &Word) -> Option<Assign> {
    let first = word.units.first()?;
    let WordUnit::Unquoted(TextUnit::Literal(c)) = first else {
        return None;
    };
    if !(c.is_alphabetic() || *c == '_') {
        return None;
    }
    let mut name = String::new();
    let mut i = 0;
    for unit in &word.units {
        let WordUnit::Unquoted(TextUnit::Literal(c)) = unit else {
            return None;
        };
        if *c == '=' {
            break;
        }
        if !(c.is_alphanumeric() || *c == '_') {
            return None;
        }
        name.push(*c);
        i += 1;
    }
    if i >= word.units.len() {
        return None;
    }
    let value_units = word.units[i + 1..].to_vec();
    let value = Word {
        units: value_units,
        location: word.location,
    };
    Some(Assign {
        name,
        value: Value::Scalar(value),
        location: word.location,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn first_simple(list: &List) -> &SimpleCommand {
        let Command::Simple(s) = &*list.0[0].and_or.first.commands[0] else {
            panic!("expected simple command");
        };
        s
    }

    #[test]
    fn parses_simple_command_with_args() {
        let list = parse("echo hello world").unwrap();
        let cmd = first_simple(&list);
        assert_eq!(cmd.words.len(), 3);
    }

    #[test]
    fn parses_assignment_prefix() {
        let list = parse("FOO=bar echo $FOO").unwrap();
        let cmd = first_simple(&list);
        assert_eq!(cmd.assigns.len(), 1);
        assert_eq!(cmd.assigns[0].name, "FOO");
        assert_eq!(cmd.words.len(), 2);
    }

    #[test]
    fn parses_pipeline() {
        let list = parse("a | b | c").unwrap();
        assert_eq!(list.0[0].and_or.first.commands.len(), 3);
    }

    #[test]
    fn parses_and_or() {
        let list = parse("a && b || c").unwrap();
        assert_eq!(list.0[0].and_or.rest.len(), 2);
    }

    #[test]
    fn parses_if() {
        let list = parse("if true; then echo yes; else echo no; fi").unwrap();
        assert!(matches!(
            &*list.0[0].and_or.first.commands[0],
            Command::Compound(FullCompoundCommand {
                command: CompoundCommand::If { .. },
                ..
            })
        ));
    }

    #[test]
    fn parses_for_loop() {
        let list = parse("for i in 1 2 3; do echo $i; done").unwrap();
        let Command::Compound(FullCompoundCommand {
            command: CompoundCommand::For { name, values, .. },
            ..
        }) = &*list.0[0].and_or.first.commands[0]
        else {
            panic!("expected for loop");
        };
        assert_eq!(name, "i");
        assert_eq!(values.as_ref().unwrap().len(), 3);
    }

    #[test]
    fn parses_case() {
        let list = parse("case $x in a|b) echo ab ;; *) echo other ;; esac").unwrap();
        let Command::Compound(FullCompoundCommand {
            command: CompoundCommand::Case { items, .. },
            ..
        }) = &*list.0[0].and_or.first.commands[0]
        else {
            panic!("expected case");
        };
        assert_eq!(items.len(), 2);
        assert_eq!(items[0].patterns.len(), 2);
    }

    #[test]
    fn parses_function_definition() {
        let list = parse("greet() { echo hi; }").unwrap();
        assert!(matches!(
            &*list.0[0].and_or.first.commands[0],
            Command::Function(_)
        ));
    }

    #[test]
    fn parses_redirection() {
        let list = parse("cmd > out.txt 2>&1").unwrap();
        let cmd = first_simple(&list);
        assert_eq!(cmd.redirs.len(), 2);
    }
}

//! Tokenizer: turns the raw byte/char stream of shell source into a stream
//! of [`Token`]s, tracking quote and brace/paren nesting along the way so
//! that operators and whitespace inside quotes never split a word.
//!
//! Words are tokenized all the way down to their [`WordUnit`] tree here
//! (not left as raw text for the parser to re-scan); the parser only
//! assembles tokens into commands and recognizes reserved words by
//! comparing a word's literal text.

use crate::source::{Cursor, Location};
use crate::syntax::*;
use std::collections::VecDeque;
use std::iter::Peekable;
use std::rc::Rc;
use std::str::CharIndices;
use thiserror::Error;

/// A lexical operator.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Operator {
    /// `|`
    Pipe,
    /// `||`
    OrOr,
    /// `&`
    Amp,
    /// `&&`
    AndAnd,
    /// `;`
    Semi,
    /// `;;`
    SemiSemi,
    /// `<`
    Less,
    /// `>`
    Great,
    /// `>>`
    GreatGreat,
    /// `<<`
    LessLess,
    /// `<<-`
    LessLessDash,
    /// `>|`
    GreatPipe,
    /// `&>`
    AmpGreat,
    /// `<&`
    LessAmp,
    /// `>&`
    GreatAmp,
    /// `(`
    LParen,
    /// `)`
    RParen,
}

/// One token produced by the [`Lexer`].
#[derive(Clone, Debug, PartialEq)]
pub enum Token {
    Word(Word),
    /// A bare digit run immediately followed by `<` or `>`, e.g. the `2`
    /// in `2>&1`.
    IoNumber(i32),
    Op(Operator, Location),
    Newline(Location),
    Eof(Location),
}

/// A tokenizing error: an unterminated quote, brace, or substitution.
#[derive(Clone, Debug, Error, Eq, PartialEq)]
pub enum Error {
    #[error("unterminated single-quoted string")]
    UnterminatedSingleQuote(Location),
    #[error("unterminated double-quoted string")]
    UnterminatedDoubleQuote(Location),
    #[error("unterminated backquoted command substitution")]
    UnterminatedBackquote(Location),
    #[error("unterminated parameter expansion")]
    UnterminatedBrace(Location),
    #[error("unterminated command substitution")]
    UnterminatedCommandSubst(Location),
    #[error("unterminated arithmetic expansion")]
    UnterminatedArith(Location),
    #[error("missing here-document delimiter {0:?}")]
    MissingHereDocDelimiter(String),
    #[error("malformed parameter expansion")]
    MalformedParam(Location),
}

struct PendingHereDoc {
    heredoc: Rc<HereDoc>,
}

pub struct Lexer<'a> {
    chars: Peekable<CharIndices<'a>>,
    cursor: Cursor,
    pending_heredocs: VecDeque<PendingHereDoc>,
}

impl<'a> Lexer<'a> {
    #[must_use]
    pub fn new(src: &'a str) -> Self {
        Lexer {
            chars: src.char_indices().peekable(),
            cursor: Cursor::new(),
            pending_heredocs: VecDeque::new(),
        }
    }

    fn loc(&self) -> Location {
        self.cursor.location()
    }

    fn peek_char(&mut self) -> Option<char> {
        self.chars.peek().map(|&(_, c)| c)
    }

    fn peek_nth(&self, n: usize) -> Option<char> {
        self.chars.clone().nth(n).map(|(_, c)| c)
    }

    fn bump(&mut self) -> Option<char> {
        let (_, c) = self.chars.next()?;
        self.cursor.advance(c);
        Some(c)
    }

    fn eat(&mut self, c: char) -> bool {
        if self.peek_char() == Some(c) {
            self.bump();
            true
        } else {
            false
        }
    }

    /// Returns the next token, reading and attaching any pending
    /// here-document bodies first if the token is a newline.
    pub fn next_token(&mut self) -> Result<Token, Error> {
        self.skip_blanks_and_comments();

        let start = self.loc();
        let Some(c) = self.peek_char() else {
            return Ok(Token::Eof(start));
        };

        if c == '\n' {
            self.bump();
            self.fill_pending_heredocs()?;
            return Ok(Token::Newline(start));
        }

        if c.is_ascii_digit() {
            if let Some(n) = self.try_io_number() {
                return Ok(Token::IoNumber(n));
            }
        }

        if let Some(op) = self.try_operator()? {
            return Ok(Token::Op(op, start));
        }

        Ok(Token::Word(self.scan_word()?))
    }

    fn skip_blanks_and_comments(&mut self) {
        loop {
            match self.peek_char() {
                Some(' ') | Some('\t') => {
                    self.bump();
                }
                Some('#') => {
                    while !matches!(self.peek_char(), None | Some('\n')) {
                        self.bump();
                    }
                }
                _ => break,
            }
        }
    }

    /// If the upcoming digit run is immediately followed by `<` or `>`,
    /// consumes it and returns the file descriptor number.
    fn try_io_number(&mut self) -> Option<i32> {
        let mut lookahead = self.chars.clone();
        let mut text = String::new();
        while let Some(&(_, c)) = lookahead.peek() {
            if c.is_ascii_digit() {
                text.push(c);
                lookahead.next();
            } else {
                break;
            }
        }
        if matches!(lookahead.peek(), Some((_, '<' | '>'))) {
            for _ in 0..text.len() {
                self.bump();
            }
            text.parse().ok()
        } else {
            None
        }
    }

    fn try_operator(&mut self) -> Result<Option<Operator>, Error> {
        let c = match self.peek_char() {
            Some(c) => c,
            None => return Ok(None),
        };
        let op = match c {
            '|' => {
                self.bump();
                if self.eat('|') { Operator::OrOr } else { Operator::Pipe }
            }
            '&' => {
                self.bump();
                if self.eat('&') {
                    Operator::AndAnd
                } else if self.eat('>') {
                    Operator::AmpGreat
                } else {
                    Operator::Amp
                }
            }
            ';' => {
                self.bump();
                if self.eat(';') { Operator::SemiSemi } else { Operator::Semi }
            }
            '<' => {
                self.bump();
                if self.eat('<') {
                    if self.eat('-') {
                        Operator::LessLessDash
                    } else {
                        Operator::LessLess
                    }
                } else if self.eat('&') {
                    Operator::LessAmp
                } else {
                    Operator::Less
                }
            }
            '>' => {
                self.bump();
                if self.eat('>') {
                    Operator::GreatGreat
                } else if self.eat('|') {
                    Operator::GreatPipe
                } else if self.eat('&') {
                    Operator::GreatAmp
                } else {
                    Operator::Great
                }
            }
            '(' => {
                self.bump();
                Operator::LParen
            }
            ')' => {
                self.bump();
                Operator::RParen
            }
            _ => return Ok(None),
        };
        Ok(Some(op))
    }

    fn is_word_terminator(c: char) -> bool {
        matches!(c, ' ' | '\t' | '\n' | '|' | '&' | ';' | '<' | '>' | '(' | ')')
    }

    fn scan_word(&mut self) -> Result<Word, Error> {
        let location = self.loc();
        let mut units = Vec::new();
        while let Some(c) = self.peek_char() {
            if Self::is_word_terminator(c) {
                break;
            }
            match c {
                '\'' => units.push(self.scan_single_quote()?),
                '"' => units.push(self.scan_double_quote()?),
                '$' => {
                    self.bump();
                    units.push(WordUnit::Unquoted(self.scan_dollar()?));
                }
                '`' => units.push(self.scan_backquote()?),
                '\\' => {
                    self.bump();
                    match self.bump() {
                        Some('\n') | None => {}
                        Some(escaped) => units.push(WordUnit::Escaped(escaped)),
                    }
                }
                '~' if units.is_empty() => units.push(self.scan_tilde()),
                _ => {
                    self.bump();
                    units.push(WordUnit::Unquoted(TextUnit::Literal(c)));
                }
            }
        }
        Ok(Word { units, location })
    }

    fn scan_tilde(&mut self) -> WordUnit {
        self.bump(); // '~'
        let mut name = String::new();
        while let Some(c) = self.peek_char() {
            if c.is_alphanumeric() || c == '_' || c == '-' || c == '.' {
                name.push(c);
                self.bump();
            } else {
                break;
            }
        }
        WordUnit::Tilde(name)
    }

    fn scan_single_quote(&mut self) -> Result<WordUnit, Error> {
        let start = self.loc();
        self.bump(); // opening '
        let mut s = String::new();
        loop {
            match self.bump() {
                Some('\'') => return Ok(WordUnit::SingleQuote(s)),
                Some(c) => s.push(c),
                None => return Err(Error::UnterminatedSingleQuote(start)),
            }
        }
    }

    fn scan_double_quote(&mut self) -> Result<WordUnit, Error> {
        let start = self.loc();
        self.bump(); // opening "
        let text = self.scan_text_until(|c| c == '"', true, || Some(Error::UnterminatedDoubleQuote(start)))?;
        self.bump(); // closing "
        Ok(WordUnit::DoubleQuote(text))
    }

    /// Scans a [`Text`] (sequence of [`TextUnit`]s) until `is_end` matches
    /// the upcoming character at nesting depth zero. The terminator itself
    /// is not consumed. When `escapes` is set, double-quote-style
    /// backslash escapes are recognized.
    fn scan_text_until(
        &mut self,
        is_end: impl Fn(char) -> bool,
        escapes: bool,
        on_eof: impl Fn() -> Option<Error>,
    ) -> Result<Text, Error> {
        let mut units = Vec::new();
        loop {
            let Some(c) = self.peek_char() else {
                return match on_eof() {
                    Some(err) => Err(err),
                    None => Ok(Text(units)),
                };
            };
            if is_end(c) {
                return Ok(Text(units));
            }
            match c {
                '$' => {
                    self.bump();
                    units.push(self.scan_dollar()?);
                }
                '`' => {
                    let start = self.loc();
                    self.bump();
                    let content = self.scan_raw_until_unescaped('`', &start, Error::UnterminatedBackquote)?;
                    self.bump();
                    units.push(TextUnit::Backquote {
                        content: Rc::from(content),
                        location: start,
                    });
                }
                '\\' if escapes => {
                    self.bump();
                    match self.bump() {
                        Some('\n') | None => {}
                        Some(escaped) => units.push(TextUnit::Literal(escaped)),
                    }
                }
                _ => {
                    self.bump();
                    units.push(TextUnit::Literal(c));
                }
            }
        }
    }

    fn scan_backquote(&mut self) -> Result<WordUnit, Error> {
        let start = self.loc();
        self.bump(); // opening `
        let content = self.scan_raw_until_unescaped('`', &start, Error::UnterminatedBackquote)?;
        self.bump(); // closing `
        Ok(WordUnit::Unquoted(TextUnit::Backquote {
            content: Rc::from(content),
            location: start,
        }))
    }

    /// Reads raw characters up to (not including) the next unescaped
    /// occurrence of `terminator`, honoring `\` as an escape for the next
    /// character. Used for backquote and `$(...)`/`${...}` bodies that are
    /// re-tokenized later, so the escapes are preserved verbatim here.
    fn scan_raw_until_unescaped(
        &mut self,
        terminator: char,
        start: &Location,
        err: fn(Location) -> Error,
    ) -> Result<String, Error> {
        let mut s = String::new();
        loop {
            match self.peek_char() {
                None => return Err(err(*start)),
                Some(c) if c == terminator => return Ok(s),
                Some('\\') => {
                    self.bump();
                    if let Some(escaped) = self.bump() {
                        if escaped != terminator && escaped != '\\' {
                            s.push('\\');
                        }
                        s.push(escaped);
                    }
                }
                Some(c) => {
                    self.bump();
                    s.push(c);
                }
            }
        }
    }

    /// Scans raw content for `$(...)`/`$((...))`, tracking quote state and
    /// paren depth so embedded `)`s in quotes or nested substitutions
    /// don't end the span early.
    fn scan_balanced_parens(&mut self, start: &Location) -> Result<String, Error> {
        let mut s = String::new();
        let mut depth = 0i32;
        let mut in_single = false;
        let mut in_double = false;
        loop {
            let Some(c) = self.peek_char() else {
                return Err(Error::UnterminatedCommandSubst(*start));
            };
            match c {
                '\'' if !in_double => {
                    in_single = !in_single;
                    s.push(c);
                    self.bump();
                }
                '"' if !in_single => {
                    in_double = !in_double;
                    s.push(c);
                    self.bump();
                }
                '\\' if !in_single => {
                    s.push(c);
                    self.bump();
                    if let Some(escaped) = self.bump() {
                        s.push(escaped);
                    }
                }
                '(' if !in_single && !in_double => {
                    depth += 1;
                    s.push(c);
                    self.bump();
                }
                ')' if !in_single && !in_double => {
                    if depth == 0 {
                        return Ok(s);
                    }
                    depth -= 1;
                    s.push(c);
                    self.bump();
                }
                _ => {
                    s.push(c);
                    self.bump();
                }
            }
        }
    }

    fn scan_dollar(&mut self) -> Result<TextUnit, Error> {
        let start = self.loc();
        match self.peek_char() {
            Some('(') => {
                self.bump();
                if self.eat('(') {
                    let content = self.scan_arith_body(&start)?;
                    let content_text = self.reparse_text(&content);
                    Ok(TextUnit::Arith {
                        content: content_text,
                        location: start,
                    })
                } else {
                    let content = self.scan_balanced_parens(&start)?;
                    self.bump(); // closing )
                    Ok(TextUnit::CommandSubst {
                        content: Rc::from(content),
                        location: start,
                    })
                }
            }
            Some('{') => {
                self.bump();
                self.scan_braced_param(start)
            }
            Some(c) if is_param_start(c) => {
                let (param, _) = self.scan_bare_param();
                Ok(TextUnit::RawParam { param, location: start })
            }
            _ => Ok(TextUnit::Literal('$')),
        }
    }

    fn scan_arith_body(&mut self, start: &Location) -> Result<String, Error> {
        let mut s = String::new();
        let mut depth = 0i32;
        loop {
            match self.peek_char() {
                None => return Err(Error::UnterminatedArith(*start)),
                Some('(') => {
                    depth += 1;
                    s.push('(');
                    self.bump();
                }
                Some(')') => {
                    if depth == 0 {
                        if self.peek_nth(1) == Some(')') {
                            self.bump();
                            self.bump();
                            return Ok(s);
                        }
                        s.push(')');
                        self.bump();
                    } else {
                        depth -= 1;
                        s.push(')');
                        self.bump();
                    }
                }
                Some(c) => {
                    s.push(c);
                    self.bump();
                }
            }
        }
    }

    /// Re-tokenizes a captured span as a [`Text`] (used for arithmetic
    /// expansion bodies, which may themselves contain `$name` references).
    fn reparse_text(&self, raw: &str) -> Text {
        let mut inner = Lexer::new(raw);
        inner
            .scan_text_until(|_| false, false, || None)
            .unwrap_or_default()
    }

    fn scan_bare_param(&mut self) -> (Param, Location) {
        let loc = self.loc();
        let c = self.peek_char().unwrap();
        if c.is_ascii_digit() {
            self.bump();
            let id = c.to_string();
            let index: usize = id.parse().unwrap();
            return (
                Param {
                    id,
                    r#type: ParamType::Positional(index),
                },
                loc,
            );
        }
        if let Some(special) = special_param(c) {
            self.bump();
            return (
                Param {
                    id: c.to_string(),
                    r#type: ParamType::Special(special),
                },
                loc,
            );
        }
        let mut id = String::new();
        while let Some(c) = self.peek_char() {
            if c.is_alphanumeric() || c == '_' {
                id.push(c);
                self.bump();
            } else {
                break;
            }
        }
        (
            Param {
                id,
                r#type: ParamType::Variable,
            },
            loc,
        )
    }

    fn scan_braced_param(&mut self, location: Location) -> Result<TextUnit, Error> {
        // `${#}` is the special parameter `#` (argument count); `${#name}`
        // is the length-of operator applied to `name`. Distinguish by
        // whether a `#` is immediately followed by `}`.
        let length = self.peek_char() == Some('#') && self.peek_nth(1) != Some('}');
        if length {
            self.bump();
        }
        let (param, _) = if self.peek_char().map(|c| c.is_ascii_digit()).unwrap_or(false) {
            self.scan_number_param()
        } else {
            self.scan_bare_param()
        };

        if length {
            self.expect_rbrace()?;
            return Ok(TextUnit::BracedParam(BracedParam {
                param,
                modifier: Modifier::Length,
                location,
            }));
        }

        let modifier = self.scan_modifier()?;
        self.expect_rbrace()?;
        Ok(TextUnit::BracedParam(BracedParam {
            param,
            modifier,
            location,
        }))
    }

    fn scan_number_param(&mut self) -> (Param, Location) {
        let loc = self.loc();
        let mut id = String::new();
        while let Some(c) = self.peek_char() {
            if c.is_ascii_digit() {
                id.push(c);
                self.bump();
            } else {
                break;
            }
        }
        let index: usize = id.parse().unwrap_or(usize::MAX);
        (
            Param {
                id,
                r#type: ParamType::Positional(index),
            },
            loc,
        )
    }

    fn expect_rbrace(&mut self) -> Result<(), Error> {
        if self.eat('}') {
            Ok(())
        } else {
            Err(Error::UnterminatedBrace(self.loc()))
        }
    }

    /// Parses the modifier suffix of a braced parameter expansion,
    /// preferring the longest matching operator (`:-` over `:`, `##`
    /// over `#`, `%%` over `%`).
    fn scan_modifier(&mut self) -> Result<Modifier, Error> {
        let c = match self.peek_char() {
            Some(c) if c != '}' => c,
            _ => return Ok(Modifier::None),
        };

        if c == ':' {
            self.bump();
            if self.eat('-') {
                return Ok(self.switch(SwitchType::Default, SwitchCondition::UnsetOrEmpty)?);
            }
            if self.eat('=') {
                return Ok(self.switch(SwitchType::Assign, SwitchCondition::UnsetOrEmpty)?);
            }
            if self.eat('+') {
                return Ok(self.switch(SwitchType::Alter, SwitchCondition::UnsetOrEmpty)?);
            }
            if self.eat('?') {
                return Ok(self.switch(SwitchType::Error, SwitchCondition::UnsetOrEmpty)?);
            }
            // `${V:offset[:length]}` substring.
            let brace_start = self.loc();
            let offset = self.scan_text_until(
                |c| c == '}' || c == ':',
                false,
                || Some(Error::UnterminatedBrace(brace_start)),
            )?;
            let length = if self.eat(':') {
                Some(self.scan_text_until(|c| c == '}', false, || Some(Error::UnterminatedBrace(brace_start)))?)
            } else {
                None
            };
            return Ok(Modifier::Substring(Substring { offset, length }));
        }

        match c {
            '-' => {
                self.bump();
                self.switch(SwitchType::Default, SwitchCondition::Unset)
            }
            '=' => {
                self.bump();
                self.switch(SwitchType::Assign, SwitchCondition::Unset)
            }
            '+' => {
                self.bump();
                self.switch(SwitchType::Alter, SwitchCondition::Unset)
            }
            '?' => {
                self.bump();
                self.switch(SwitchType::Error, SwitchCondition::Unset)
            }
            '#' => {
                self.bump();
                let length = if self.eat('#') {
                    TrimLength::Longest
                } else {
                    TrimLength::Shortest
                };
                let pattern = self.scan_word_until_rbrace()?;
                Ok(Modifier::Trim(Trim {
                    side: TrimSide::Prefix,
                    length,
                    pattern,
                }))
            }
            '%' => {
                self.bump();
                let length = if self.eat('%') {
                    TrimLength::Longest
                } else {
                    TrimLength::Shortest
                };
                let pattern = self.scan_word_until_rbrace()?;
                Ok(Modifier::Trim(Trim {
                    side: TrimSide::Suffix,
                    length,
                    pattern,
                }))
            }
            '^' => {
                self.bump();
                let scope = if self.eat('^') {
                    CaseConvertScope::All
                } else {
                    CaseConvertScope::First
                };
                Ok(Modifier::CaseConvert(CaseConvert::Upper, scope))
            }
            ',' => {
                self.bump();
                let scope = if self.eat(',') {
                    CaseConvertScope::All
                } else {
                    CaseConvertScope::First
                };
                Ok(Modifier::CaseConvert(CaseConvert::Lower, scope))
            }
            _ => Ok(Modifier::None),
        }
    }

    fn switch(&mut self, r#type: SwitchType, condition: SwitchCondition) -> Result<Modifier, Error> {
        let word = self.scan_word_until_rbrace()?;
        Ok(Modifier::Switch(Switch {
            r#type,
            condition,
            word,
        }))
    }

    /// Scans a word-like span (allowing nested quotes/expansions) up to
    /// the unquoted `}` that closes the enclosing braced expansion.
    fn scan_word_until_rbrace(&mut self) -> Result<Word, Error> {
        let location = self.loc();
        let mut units = Vec::new();
        let mut depth = 0i32;
        loop {
            match self.peek_char() {
                None => return Err(Error::UnterminatedBrace(location)),
                Some('}') if depth == 0 => break,
                Some('{') => {
                    depth += 1;
                    self.bump();
                    units.push(WordUnit::Unquoted(TextUnit::Literal('{')));
                }
                Some('}') => {
                    depth -= 1;
                    self.bump();
                    units.push(WordUnit::Unquoted(TextUnit::Literal('}')));
                }
                Some('\'') => units.push(self.scan_single_quote()?),
                Some('"') => units.push(self.scan_double_quote()?),
                Some('$') => {
                    self.bump();
                    units.push(WordUnit::Unquoted(self.scan_dollar()?));
                }
                Some(c) => {
                    self.bump();
                    units.push(WordUnit::Unquoted(TextUnit::Literal(c)));
                }
            }
        }
        Ok(Word { units, location })
    }

    /// Registers a here-document redirection's delimiter; its body will be
    /// filled in from the lines following the next newline token.
    pub fn push_pending_heredoc(&mut self, delimiter: Word, remove_tabs: bool, quoted: bool) -> Rc<HereDoc> {
        let heredoc = Rc::new(HereDoc {
            delimiter,
            remove_tabs,
            quoted,
            content: std::cell::OnceCell::new(),
        });
        self.pending_heredocs.push_back(PendingHereDoc {
            heredoc: Rc::clone(&heredoc),
        });
        heredoc
    }

    fn fill_pending_heredocs(&mut self) -> Result<(), Error> {
        while let Some(pending) = self.pending_heredocs.pop_front() {
            let delimiter_text = pending
                .heredoc
                .delimiter
                .to_literal()
                .unwrap_or_else(|| pending.heredoc.delimiter.to_string());
            let mut body = String::new();
            loop {
                let line = self.read_raw_line();
                let Some(line) = line else {
                    break;
                };
                let trimmed = if pending.heredoc.remove_tabs {
                    line.trim_start_matches('\t')
                } else {
                    &line
                };
                if trimmed == delimiter_text {
                    break;
                }
                body.push_str(trimmed);
                body.push('\n');
            }
            let text = if pending.heredoc.quoted {
                Text(body.chars().map(TextUnit::Literal).collect())
            } else {
                self.reparse_text(&body)
            };
            // A HereDoc's content is set exactly once, right here.
            let _ = pending.heredoc.content.set(text);
        }
        Ok(())
    }

    /// Reads one raw source line (not through the word-scanner) for
    /// here-document bodies, consuming the trailing newline.
    fn read_raw_line(&mut self) -> Option<String> {
        if self.peek_char().is_none() {
            return None;
        }
        let mut line = String::new();
        loop {
            match self.bump() {
                None => return Some(line),
                Some('\n') => return Some(line),
                Some(c) => line.push(c),
            }
        }
    }
}

fn is_param_start(c: char) -> bool {
    c.is_alphanumeric() || c == '_' || special_param(c).is_some()
}

fn special_param(c: char) -> Option<SpecialParam> {
    Some(match c {
        '@' => SpecialParam::At,
        '*' => SpecialParam::Asterisk,
        '#' => SpecialParam::Number,
        '?' => SpecialParam::Question,
        '$' => SpecialParam::Dollar,
        '!' => SpecialParam::Exclamation,
        '0' => SpecialParam::Zero,
        _ => return None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn words(src: &str) -> Vec<Word> {
        let mut lexer = Lexer::new(src);
        let mut out = Vec::new();
        loop {
            match lexer.next_token().unwrap() {
                Token::Word(w) => out.push(w),
                Token::Eof(_) => break,
                _ => {}
            }
        }
        out
    }

    #[test]
    fn single_quote_is_verbatim() {
        let w = &words("'a$b\\c'")[0];
        assert_eq!(w.units, vec![WordUnit::SingleQuote("a$b\\c".to_owned())]);
    }

    #[test]
    fn operators_are_greedy() {
        let mut lexer = Lexer::new("a&&b");
        assert_eq!(lexer.next_token().unwrap(), Token::Word(words("a")[0].clone()));
        assert_eq!(
            lexer.next_token().unwrap(),
            Token::Op(Operator::AndAnd, Location { offset: 1, line: 1, column: 2 })
        );
    }

    #[test]
    fn io_number_before_redirection() {
        let mut lexer = Lexer::new("2>&1");
        assert_eq!(lexer.next_token().unwrap(), Token::IoNumber(2));
        assert_eq!(lexer.next_token().unwrap(), Token::Op(Operator::GreatAmp, Location { offset: 1, line: 1, column: 2 }));
    }

    #[test]
    fn digits_without_redir_stay_a_word() {
        let ws = words("123abc");
        assert_eq!(ws.len(), 1);
    }

    #[test]
    fn braced_param_longest_operator_match() {
        let ws = words("${V:-x}");
        let WordUnit::Unquoted(TextUnit::BracedParam(p)) = &ws[0].units[0] else {
            panic!("expected braced param");
        };
        assert!(matches!(
            p.modifier,
            Modifier::Switch(Switch {
                r#type: SwitchType::Default,
                condition: SwitchCondition::UnsetOrEmpty,
                ..
            })
        ));
    }

    #[test]
    fn dollar_dollar_paren_paren_is_arith() {
        let ws = words("$((1+2))");
        assert!(matches!(
            ws[0].units[0],
            WordUnit::Unquoted(TextUnit::Arith { .. })
        ));
    }
}

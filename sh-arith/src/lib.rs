//! Arithmetic expansion, `$((expression))`.
//!
//! This crate evaluates the C-like integer expression language used inside
//! `$((...))` and arithmetic-mode `for`/`let`-style contexts. It is
//! deliberately standalone: it knows nothing about shell words, quoting, or
//! substitution — callers tokenize/expand the inner text first and pass the
//! resulting plain string here.
//!
//! Variable access goes through the [`Variables`] trait so the evaluator
//! does not depend on any particular symbol-table implementation.

mod token;

use thiserror::Error;
use token::{Op, Token, TokenError, Tokenizer};

/// Callback interface the evaluator uses to read and write shell variables
/// referenced inside an expression.
pub trait Variables {
    /// Returns the current value of `name`, interpreted as an integer.
    /// An unset or non-numeric variable is treated as `0`, per POSIX.
    fn get(&self, name: &str) -> i64;

    /// Assigns `value` to `name`, as produced by `=`, `+=`, `++`, etc.
    fn set(&mut self, name: &str, value: i64);
}

/// Error evaluating an arithmetic expression.
#[derive(Clone, Debug, Error, Eq, PartialEq)]
pub enum Error {
    #[error("syntax error in arithmetic expression: {0}")]
    Token(#[from] TokenError),
    #[error("syntax error: unexpected end of expression")]
    UnexpectedEof,
    #[error("syntax error: unexpected token")]
    UnexpectedToken,
    #[error("division by zero")]
    DivisionByZero,
    #[error("modulo by zero")]
    ModuloByZero,
    #[error("cannot assign to a non-variable")]
    NotAssignable,
    #[error("missing ) to match (")]
    UnmatchedParen,
}

/// Either a plain value or a reference to a variable that produced it.
///
/// Keeping the variable name alive through the precedence chain (rather than
/// resolving immediately) is what lets `=`/`+=`/`++` know whether their left
/// operand is actually assignable.
#[derive(Clone, Debug)]
enum Term<'a> {
    Value(i64),
    Variable(&'a str),
}

impl<'a> Term<'a> {
    fn resolve(&self, vars: &dyn Variables) -> i64 {
        match self {
            Term::Value(v) => *v,
            Term::Variable(name) => vars.get(name),
        }
    }
}

/// Evaluates `expression` against `vars`, returning the resulting integer.
pub fn eval(expression: &str, vars: &mut dyn Variables) -> Result<i64, Error> {
    let tokens: Vec<Token<'_>> = Tokenizer::new(expression)
        .collect::<Result<_, _>>()
        .map_err(Error::Token)?;
    let mut parser = Parser {
        tokens: &tokens,
        pos: 0,
        vars,
    };
    let term = parser.assignment()?;
    if parser.pos != parser.tokens.len() {
        return Err(Error::UnexpectedToken);
    }
    Ok(term.resolve(parser.vars))
}

struct Parser<'t, 'a> {
    tokens: &'t [Token<'a>],
    pos: usize,
    vars: &'t mut dyn Variables,
}

impl<'t, 'a> Parser<'t, 'a> {
    fn peek(&self) -> Option<&Token<'a>> {
        self.tokens.get(self.pos)
    }

    fn peek_op(&self) -> Option<Op> {
        match self.peek() {
            Some(Token::Op(op)) => Some(*op),
            _ => None,
        }
    }

    fn bump(&mut self) {
        self.pos += 1;
    }

    fn expect_op(&mut self, op: Op) -> Result<(), Error> {
        if self.peek_op() == Some(op) {
            self.bump();
            Ok(())
        } else {
            Err(Error::UnexpectedToken)
        }
    }

    /// `assignment := ternary ( ('=' | '+=' | ... ) assignment )?`, right
    /// associative.
    fn assignment(&mut self) -> Result<Term<'a>, Error> {
        let lhs = self.ternary()?;
        let compound = match self.peek_op() {
            Some(Op::Assign) => None,
            Some(Op::PlusEq) => Some(Op::Plus),
            Some(Op::MinusEq) => Some(Op::Minus),
            Some(Op::StarEq) => Some(Op::Star),
            Some(Op::SlashEq) => Some(Op::Slash),
            Some(Op::PercentEq) => Some(Op::Percent),
            Some(Op::LShiftEq) => Some(Op::LShift),
            Some(Op::RShiftEq) => Some(Op::RShift),
            Some(Op::AndEq) => Some(Op::And),
            Some(Op::CaretEq) => Some(Op::Caret),
            Some(Op::OrEq) => Some(Op::Or),
            _ => return Ok(lhs),
        };
        let Term::Variable(name) = lhs else {
            return Err(Error::NotAssignable);
        };
        self.bump();
        let rhs = self.assignment()?;
        let rhs_value = rhs.resolve(self.vars);
        let new_value = match compound {
            None => rhs_value,
            Some(op) => apply_binary(op, self.vars.get(name), rhs_value)?,
        };
        self.vars.set(name, new_value);
        Ok(Term::Value(new_value))
    }

    /// `ternary := logical_or ( '?' assignment ':' assignment )?`
    fn ternary(&mut self) -> Result<Term<'a>, Error> {
        let cond = self.logical_or()?;
        if self.peek_op() == Some(Op::Question) {
            self.bump();
            let then_branch = self.assignment()?;
            self.expect_op(Op::Colon)?;
            let else_branch = self.assignment()?;
            let cond_value = cond.resolve(self.vars);
            return Ok(Term::Value(if cond_value != 0 {
                then_branch.resolve(self.vars)
            } else {
                else_branch.resolve(self.vars)
            }));
        }
        Ok(cond)
    }

    fn binary_level(
        &mut self,
        ops: &[Op],
        next: fn(&mut Self) -> Result<Term<'a>, Error>,
    ) -> Result<Term<'a>, Error> {
        let mut lhs = next(self)?;
        loop {
            let Some(found) = self.peek_op().filter(|tok| ops.contains(tok)) else {
                return Ok(lhs);
            };
            self.bump();
            let rhs = next(self)?;
            let value = apply_binary(found, lhs.resolve(self.vars), rhs.resolve(self.vars))?;
            lhs = Term::Value(value);
        }
    }

    fn logical_or(&mut self) -> Result<Term<'a>, Error> {
        // Short-circuits: only evaluates the right side's *value*, not its
        // assignment side effects, when the left side already decided.
        let mut lhs = self.logical_and()?;
        loop {
            if self.peek_op() != Some(Op::OrOr) {
                return Ok(lhs);
            }
            self.bump();
            let lhs_value = lhs.resolve(self.vars);
            let rhs = self.logical_and()?;
            let rhs_value = rhs.resolve(self.vars);
            lhs = Term::Value(i64::from(lhs_value != 0 || rhs_value != 0));
        }
    }

    fn logical_and(&mut self) -> Result<Term<'a>, Error> {
        let mut lhs = self.bitwise_or()?;
        loop {
            if self.peek_op() != Some(Op::AndAnd) {
                return Ok(lhs);
            }
            self.bump();
            let lhs_value = lhs.resolve(self.vars);
            let rhs = self.bitwise_or()?;
            let rhs_value = rhs.resolve(self.vars);
            lhs = Term::Value(i64::from(lhs_value != 0 && rhs_value != 0));
        }
    }

    fn bitwise_or(&mut self) -> Result<Term<'a>, Error> {
        self.binary_level(&[Op::Or], Self::bitwise_xor)
    }

    fn bitwise_xor(&mut self) -> Result<Term<'a>, Error> {
        self.binary_level(&[Op::Caret], Self::bitwise_and)
    }

    fn bitwise_and(&mut self) -> Result<Term<'a>, Error> {
        self.binary_level(&[Op::And], Self::equality)
    }

    fn equality(&mut self) -> Result<Term<'a>, Error> {
        self.binary_level(&[Op::EqEq, Op::Ne], Self::relational)
    }

    fn relational(&mut self) -> Result<Term<'a>, Error> {
        self.binary_level(&[Op::Lt, Op::Le, Op::Gt, Op::Ge], Self::shift)
    }

    fn shift(&mut self) -> Result<Term<'a>, Error> {
        self.binary_level(&[Op::LShift, Op::RShift], Self::additive)
    }

    fn additive(&mut self) -> Result<Term<'a>, Error> {
        self.binary_level(&[Op::Plus, Op::Minus], Self::multiplicative)
    }

    fn multiplicative(&mut self) -> Result<Term<'a>, Error> {
        self.binary_level(&[Op::Star, Op::Slash, Op::Percent], Self::power)
    }

    /// `**` is right-associative and binds tighter than the other binary
    /// operators but looser than unary.
    fn power(&mut self) -> Result<Term<'a>, Error> {
        let lhs = self.unary()?;
        if self.peek_op() == Some(Op::StarStar) {
            self.bump();
            let rhs = self.power()?;
            let value = apply_binary(Op::StarStar, lhs.resolve(self.vars), rhs.resolve(self.vars))?;
            return Ok(Term::Value(value));
        }
        Ok(lhs)
    }

    /// `unary := ('+' | '-' | '!' | '~' | '++' | '--') unary | postfix`
    fn unary(&mut self) -> Result<Term<'a>, Error> {
        match self.peek_op() {
            Some(Op::Plus) => {
                self.bump();
                Ok(Term::Value(self.unary()?.resolve(self.vars)))
            }
            Some(Op::Minus) => {
                self.bump();
                Ok(Term::Value(-self.unary()?.resolve(self.vars)))
            }
            Some(Op::Bang) => {
                self.bump();
                Ok(Term::Value(i64::from(self.unary()?.resolve(self.vars) == 0)))
            }
            Some(Op::Tilde) => {
                self.bump();
                Ok(Term::Value(!self.unary()?.resolve(self.vars)))
            }
            Some(Op::PlusPlus) => {
                self.bump();
                let Term::Variable(name) = self.unary()? else {
                    return Err(Error::NotAssignable);
                };
                let value = self.vars.get(name) + 1;
                self.vars.set(name, value);
                Ok(Term::Value(value))
            }
            Some(Op::MinusMinus) => {
                self.bump();
                let Term::Variable(name) = self.unary()? else {
                    return Err(Error::NotAssignable);
                };
                let value = self.vars.get(name) - 1;
                self.vars.set(name, value);
                Ok(Term::Value(value))
            }
            _ => self.postfix(),
        }
    }

    /// `postfix := primary ('++' | '--')?`
    fn postfix(&mut self) -> Result<Term<'a>, Error> {
        let term = self.primary()?;
        match self.peek_op() {
            Some(Op::PlusPlus) => {
                self.bump();
                let Term::Variable(name) = term else {
                    return Err(Error::NotAssignable);
                };
                let old = self.vars.get(name);
                self.vars.set(name, old + 1);
                Ok(Term::Value(old))
            }
            Some(Op::MinusMinus) => {
                self.bump();
                let Term::Variable(name) = term else {
                    return Err(Error::NotAssignable);
                };
                let old = self.vars.get(name);
                self.vars.set(name, old - 1);
                Ok(Term::Value(old))
            }
            _ => Ok(term),
        }
    }

    fn primary(&mut self) -> Result<Term<'a>, Error> {
        match self.peek().cloned() {
            Some(Token::Number(n)) => {
                self.bump();
                Ok(Term::Value(n))
            }
            Some(Token::Ident(name)) => {
                self.bump();
                Ok(Term::Variable(name))
            }
            Some(Token::Op(Op::LParen)) => {
                self.bump();
                let inner = self.assignment()?;
                if self.peek_op() != Some(Op::RParen) {
                    return Err(Error::UnmatchedParen);
                }
                self.bump();
                Ok(Term::Value(inner.resolve(self.vars)))
            }
            Some(_) => Err(Error::UnexpectedToken),
            None => Err(Error::UnexpectedEof),
        }
    }
}

fn apply_binary(op: Op, lhs: i64, rhs: i64) -> Result<i64, Error> {
    Ok(match op {
        Op::Plus => lhs.wrapping_add(rhs),
        Op::Minus => lhs.wrapping_sub(rhs),
        Op::Star => lhs.wrapping_mul(rhs),
        Op::Slash => lhs.checked_div(rhs).ok_or(Error::DivisionByZero)?,
        Op::Percent => lhs.checked_rem(rhs).ok_or(Error::ModuloByZero)?,
        Op::StarStar => {
            if rhs < 0 {
                0
            } else {
                lhs.wrapping_pow(rhs as u32)
            }
        }
        Op::LShift => lhs.wrapping_shl(rhs as u32),
        Op::RShift => lhs.wrapping_shr(rhs as u32),
        Op::Lt => i64::from(lhs < rhs),
        Op::Le => i64::from(lhs <= rhs),
        Op::Gt => i64::from(lhs > rhs),
        Op::Ge => i64::from(lhs >= rhs),
        Op::EqEq => i64::from(lhs == rhs),
        Op::Ne => i64::from(lhs != rhs),
        Op::And => lhs & rhs,
        Op::Caret => lhs ^ rhs,
        Op::Or => lhs | rhs,
        _ => unreachable!("apply_binary called with non-binary operator"),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    struct Map(HashMap<String, i64>);

    impl Variables for Map {
        fn get(&self, name: &str) -> i64 {
            *self.0.get(name).unwrap_or(&0)
        }
        fn set(&mut self, name: &str, value: i64) {
            self.0.insert(name.to_owned(), value);
        }
    }

    fn eval_in(expr: &str, vars: &[(&str, i64)]) -> i64 {
        let mut map = Map(vars.iter().map(|&(k, v)| (k.to_owned(), v)).collect());
        eval(expr, &mut map).unwrap()
    }

    #[test]
    fn basic_arithmetic() {
        assert_eq!(eval_in("1 + 2 * 3", &[]), 7);
        assert_eq!(eval_in("(1 + 2) * 3", &[]), 9);
        assert_eq!(eval_in("2 ** 10", &[]), 1024);
    }

    #[test]
    fn variables_and_assignment() {
        assert_eq!(eval_in("x + y", &[("x", 1), ("y", 2)]), 3);

        let mut map = Map(HashMap::new());
        assert_eq!(eval("x = 5", &mut map).unwrap(), 5);
        assert_eq!(map.get("x"), 5);

        assert_eq!(eval("x += 3", &mut map).unwrap(), 8);
        assert_eq!(map.get("x"), 8);
    }

    #[test]
    fn ternary_and_logical() {
        assert_eq!(eval_in("1 ? 2 : 3", &[]), 2);
        assert_eq!(eval_in("0 ? 2 : 3", &[]), 3);
        assert_eq!(eval_in("1 && 0", &[]), 0);
        assert_eq!(eval_in("1 || 0", &[]), 1);
    }

    #[test]
    fn pre_and_post_increment() {
        let mut map = Map([("x".to_owned(), 1)].into_iter().collect());
        assert_eq!(eval("x++", &mut map).unwrap(), 1);
        assert_eq!(map.get("x"), 2);
        assert_eq!(eval("++x", &mut map).unwrap(), 3);
        assert_eq!(map.get("x"), 3);
    }

    #[test]
    fn division_and_modulo_by_zero() {
        let mut map = Map(HashMap::new());
        assert_matches::assert_matches!(eval("1 / 0", &mut map), Err(Error::DivisionByZero));
        assert_matches::assert_matches!(eval("1 % 0", &mut map), Err(Error::ModuloByZero));
    }

    #[test]
    fn missing_variable_is_zero() {
        assert_eq!(eval_in("unset_var + 1", &[]), 1);
    }
}

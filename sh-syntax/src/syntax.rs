//! Abstract syntax tree for the shell command language.
//!
//! The AST is a tagged sum: each command shape (simple command, `if`,
//! `while`, `case`, ...) is its own variant with its own owned `Vec` of
//! children, rather than a single node kind carrying a generic sibling
//! chain. Ordering within a `Vec` is always source order; see the type
//! docs below for the invariants each one upholds.

use crate::source::Location;
use std::cell::OnceCell;
use std::rc::Rc;

/// Kind of parameter being expanded (`$name`, `$1`, `$@`, ...).
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum SpecialParam {
    /// `@`
    At,
    /// `*`
    Asterisk,
    /// `#`
    Number,
    /// `?`
    Question,
    /// `$`
    Dollar,
    /// `!`
    Exclamation,
    /// `0`
    Zero,
}

/// Which family a [`Param`] belongs to.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum ParamType {
    /// A named variable, e.g. `foo` in `$foo`.
    Variable,
    /// One of the fixed special parameters.
    Special(SpecialParam),
    /// A positional parameter, e.g. `3` in `$3` or `${12}`.
    Positional(usize),
}

/// A parameter reference as it appeared in source.
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub struct Param {
    /// Literal name as written, e.g. `"foo"`, `"@"`, `"12"`.
    pub id: String,
    pub r#type: ParamType,
}

/// `+`, `-`, `=`, or `?` switch in `${V<op>word}`.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum SwitchType {
    /// `${V+w}` — substitute `w` only if `V` is set.
    Alter,
    /// `${V-w}` — substitute `w` only if `V` is unset.
    Default,
    /// `${V=w}` — like `Default`, and also assigns `w` to `V`.
    Assign,
    /// `${V?w}` — error with message `w` if `V` is unset.
    Error,
}

/// Whether a switch also requires the value to be non-empty (`:`-prefixed).
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum SwitchCondition {
    Unset,
    UnsetOrEmpty,
}

/// `${V:-w}`-style modifier.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Switch {
    pub r#type: SwitchType,
    pub condition: SwitchCondition,
    pub word: Word,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum TrimSide {
    Prefix,
    Suffix,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum TrimLength {
    Shortest,
    Longest,
}

/// `${V#p}` / `${V##p}` / `${V%p}` / `${V%%p}`.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Trim {
    pub side: TrimSide,
    pub length: TrimLength,
    pub pattern: Word,
}

/// `${V^}` / `${V^^}` / `${V,}` / `${V,,}`.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum CaseConvert {
    /// Uppercase (`^`/`^^`)
    Upper,
    /// Lowercase (`,`/`,,`)
    Lower,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum CaseConvertScope {
    First,
    All,
}

/// `${V:offset}` / `${V:offset:length}`. Offsets and lengths are words
/// because they may themselves contain expansions; they are evaluated as
/// arithmetic expressions once expanded to plain text.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Substring {
    pub offset: Text,
    pub length: Option<Text>,
}

/// Attribute modifying a braced parameter expansion.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Modifier {
    /// No modifier: `${V}`.
    None,
    /// `${#V}`.
    Length,
    Switch(Switch),
    Trim(Trim),
    CaseConvert(CaseConvert, CaseConvertScope),
    Substring(Substring),
}

/// `${...}` parameter expansion.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct BracedParam {
    pub param: Param,
    pub modifier: Modifier,
    pub location: Location,
}

/// An element of a [`Text`]: something that can itself be expanded further
/// (parameter/arithmetic/command substitution) versus a literal character.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum TextUnit {
    /// A literal character (already past any escaping).
    Literal(char),
    /// `$name` without braces.
    RawParam { param: Param, location: Location },
    /// `${...}`.
    BracedParam(BracedParam),
    /// `$(...)` — the inner text is stored unparsed and is tokenized,
    /// parsed, and executed lazily when the substitution is expanded.
    CommandSubst { content: Rc<str>, location: Location },
    /// `` `...` `` — same laziness as `CommandSubst`, with backslash
    /// escapes already resolved to their literal characters.
    Backquote { content: Rc<str>, location: Location },
    /// `$((...))`.
    Arith { content: Text, location: Location },
}

/// A sequence of [`TextUnit`]s: the content of a double-quoted string or
/// other context where expansions are recognized but quoting/tilde is not.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Text(pub Vec<TextUnit>);

/// An element of a [`Word`]: text, or a quoting construct that only makes
/// sense directly inside a word (not inside an already-quoted `Text`).
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum WordUnit {
    /// An unquoted text unit.
    Unquoted(TextUnit),
    /// A single character preceded by a backslash outside any quotes
    /// (`\c`): quoted the same as `'c'`, just spelled without the quotes.
    Escaped(char),
    /// `'...'` — content is verbatim, no escapes recognized.
    SingleQuote(String),
    /// `"..."` — content may itself contain expansions.
    DoubleQuote(Text),
    /// A leading `~` or `~user` tilde prefix (string excludes the `~`).
    Tilde(String),
}

/// A shell word: the smallest unit that undergoes the full expansion
/// pipeline (tilde, parameter/command/arithmetic, splitting, globbing).
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Word {
    pub units: Vec<WordUnit>,
    pub location: Location,
}

impl Word {
    /// Returns the word's value if it is made up only of literal
    /// characters (no quotes or expansions) — used to recognize keywords
    /// and literal case patterns without expanding them.
    #[must_use]
    pub fn to_literal(&self) -> Option<String> {
        let mut s = String::new();
        for unit in &self.units {
            match unit {
                WordUnit::Unquoted(TextUnit::Literal(c)) => s.push(*c),
                _ => return None,
            }
        }
        Some(s)
    }

    pub fn is_empty(&self) -> bool {
        self.units.is_empty()
    }
}

/// Value assigned by an [`Assign`]: `NAME=value` or `NAME=(a b c)`.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Value {
    Scalar(Word),
    Array(Vec<Word>),
}

/// `NAME=value` preceding a simple command, or standing alone.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Assign {
    pub name: String,
    pub value: Value,
    pub location: Location,
}

/// A file descriptor number.
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct Fd(pub i32);

impl Fd {
    pub const STDIN: Fd = Fd(0);
    pub const STDOUT: Fd = Fd(1);
    pub const STDERR: Fd = Fd(2);
}

/// Redirection operators other than here-documents.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum RedirOp {
    /// `<`
    FileIn,
    /// `>`
    FileOut,
    /// `>>`
    FileAppend,
    /// `>|`
    FileClobber,
    /// `&>` (both stdout and stderr)
    FileOutErr,
    /// `<&`
    FdIn,
    /// `>&`
    FdOut,
}

/// A here-document attached to a `<<` or `<<-` redirection.
///
/// `content` is filled in once the parser has read the here-document body
/// following the current line; it starts empty because the operator token
/// is seen well before the body is reachable in the input.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct HereDoc {
    pub delimiter: Word,
    pub remove_tabs: bool,
    /// `true` if the delimiter was quoted, meaning the body is taken
    /// verbatim with no further expansion.
    pub quoted: bool,
    pub content: OnceCell<Text>,
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub enum RedirBody {
    Normal { operator: RedirOp, operand: Word },
    HereDoc(Rc<HereDoc>),
}

/// One redirection, e.g. `2>/dev/null` or `<<EOF`.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Redir {
    /// Explicit file descriptor (`2` in `2>`), or `None` to use the
    /// operator's default.
    pub fd: Option<Fd>,
    pub body: RedirBody,
}

impl Redir {
    #[must_use]
    pub fn fd_or_default(&self) -> Fd {
        if let Some(fd) = self.fd {
            return fd;
        }
        match &self.body {
            RedirBody::Normal { operator, .. } => match operator {
                RedirOp::FileIn | RedirOp::FdIn => Fd::STDIN,
                RedirOp::FileOut
                | RedirOp::FileAppend
                | RedirOp::FileClobber
                | RedirOp::FileOutErr
                | RedirOp::FdOut => Fd::STDOUT,
            },
            RedirBody::HereDoc(_) => Fd::STDIN,
        }
    }
}

/// A command made up of assignments, a command word and arguments, and
/// redirections — any subset of which may be empty, but not all three.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct SimpleCommand {
    pub assigns: Vec<Assign>,
    pub words: Vec<Word>,
    pub redirs: Vec<Redir>,
}

impl SimpleCommand {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.assigns.is_empty() && self.words.is_empty() && self.redirs.is_empty()
    }

    /// `NAME=value` with nothing else: a pure variable assignment.
    #[must_use]
    pub fn is_pure_assignment(&self) -> bool {
        !self.assigns.is_empty() && self.words.is_empty()
    }
}

/// One `elif condition; then body` clause.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ElifThen {
    pub condition: List,
    pub body: List,
}

/// One `pattern) body ;;` branch of a `case` command.
///
/// `patterns` holds every `|`-separated alternative; the first one that
/// matches wins (first-match, not best-match).
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct CaseItem {
    pub patterns: Vec<Word>,
    pub body: List,
}

/// A command that itself contains other commands.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum CompoundCommand {
    /// `{ list; }` — runs in the current shell.
    Grouping(List),
    /// `(list)` — runs in a forked subshell.
    Subshell(List),
    /// `for name [in values]; do body; done`. `values` is `None` when the
    /// `in` clause was omitted, meaning "iterate over the positional
    /// parameters".
    For {
        name: String,
        values: Option<Vec<Word>>,
        body: List,
    },
    While { condition: List, body: List },
    Until { condition: List, body: List },
    /// `if cond; then body; elif ...; else ...; fi`. `elifs` appears in
    /// source order after the first `then` body and before `r#else`.
    If {
        condition: List,
        body: List,
        elifs: Vec<ElifThen>,
        r#else: Option<List>,
    },
    /// `case word in items... esac`. Items are kept in source order.
    Case { subject: Word, items: Vec<CaseItem> },
}

/// A [`CompoundCommand`] together with any redirections attached to it.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct FullCompoundCommand {
    pub command: CompoundCommand,
    pub redirs: Vec<Redir>,
}

/// A named parameter of an extended (`name(p1, p2=default, ...)`)
/// function definition.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct FunctionParam {
    pub name: String,
    pub default: Option<Word>,
}

impl FunctionParam {
    #[must_use]
    pub fn is_required(&self) -> bool {
        self.default.is_none()
    }
}

/// `name() body` or `name(p1, p2=default) body`.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct FunctionDefinition {
    pub name: String,
    pub params: Vec<FunctionParam>,
    pub body: Rc<FullCompoundCommand>,
}

/// One command appearing in a [`Pipeline`].
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Command {
    Simple(SimpleCommand),
    Compound(FullCompoundCommand),
    Function(FunctionDefinition),
}

/// Commands connected with `|`. A pipeline is always a non-empty, flat
/// sequence — n-ary pipelines are represented directly (not as a
/// left-skewed binary tree) for simplicity of iteration during execution.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Pipeline {
    pub commands: Vec<Rc<Command>>,
    /// Whether the pipeline is negated with a leading `!`.
    pub negation: bool,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum AndOr {
    /// `&&`
    AndThen,
    /// `||`
    OrElse,
}

/// Pipelines chained with `&&`/`||`, left to right with short-circuiting.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct AndOrList {
    pub first: Pipeline,
    pub rest: Vec<(AndOr, Pipeline)>,
}

/// One top-level item of a [`List`]: an and-or list, optionally run in
/// the background (`&`).
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Item {
    pub and_or: Rc<AndOrList>,
    pub is_async: bool,
}

/// A sequence of [`Item`]s separated by `;` or `&`, in source order. This
/// is the root of a parsed command line or script, and also the body of
/// every compound command.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct List(pub Vec<Item>);

mod display;

pub use display::*;

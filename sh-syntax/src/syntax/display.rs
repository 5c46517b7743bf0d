//! `Display` implementations that re-render AST nodes back to shell
//! source. Always single-line; here-document bodies are omitted (the
//! delimiter word is shown, matching how most shells echo `set -x` output).

use super::*;
use std::fmt;

impl fmt::Display for TextUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TextUnit::Literal(c) => write!(f, "{c}"),
            TextUnit::RawParam { param, .. } => write!(f, "${}", param.id),
            TextUnit::BracedParam(p) => write!(f, "${{{}}}", p.param.id),
            TextUnit::CommandSubst { content, .. } => write!(f, "$({content})"),
            TextUnit::Backquote { content, .. } => write!(f, "`{content}`"),
            TextUnit::Arith { content, .. } => write!(f, "$(({content}))"),
        }
    }
}

impl fmt::Display for Text {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.iter().try_for_each(|unit| unit.fmt(f))
    }
}

impl fmt::Display for WordUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WordUnit::Unquoted(t) => t.fmt(f),
            WordUnit::Escaped(c) => write!(f, "\\{c}"),
            WordUnit::SingleQuote(s) => write!(f, "'{s}'"),
            WordUnit::DoubleQuote(t) => write!(f, "\"{t}\""),
            WordUnit::Tilde(s) => write!(f, "~{s}"),
        }
    }
}

impl fmt::Display for Word {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.units.iter().try_for_each(|unit| unit.fmt(f))
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Scalar(w) => w.fmt(f),
            Value::Array(words) => {
                write!(f, "(")?;
                for (i, w) in words.iter().enumerate() {
                    if i > 0 {
                        write!(f, " ")?;
                    }
                    w.fmt(f)?;
                }
                write!(f, ")")
            }
        }
    }
}

impl fmt::Display for Assign {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}={}", self.name, self.value)
    }
}

impl fmt::Display for RedirOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            RedirOp::FileIn => "<",
            RedirOp::FileOut => ">",
            RedirOp::FileAppend => ">>",
            RedirOp::FileClobber => ">|",
            RedirOp::FileOutErr => "&>",
            RedirOp::FdIn => "<&",
            RedirOp::FdOut => ">&",
        })
    }
}

impl fmt::Display for Redir {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(fd) = self.fd {
            write!(f, "{}", fd.0)?;
        }
        match &self.body {
            RedirBody::Normal { operator, operand } => write!(f, "{operator}{operand}"),
            RedirBody::HereDoc(h) => {
                write!(f, "{}{}", if h.remove_tabs { "<<-" } else { "<<" }, h.delimiter)
            }
        }
    }
}

fn write_redirs(f: &mut fmt::Formatter<'_>, redirs: &[Redir]) -> fmt::Result {
    for r in redirs {
        write!(f, " {r}")?;
    }
    Ok(())
}

impl fmt::Display for SimpleCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for a in &self.assigns {
            if !first {
                write!(f, " ")?;
            }
            write!(f, "{a}")?;
            first = false;
        }
        for w in &self.words {
            if !first {
                write!(f, " ")?;
            }
            write!(f, "{w}")?;
            first = false;
        }
        write_redirs(f, &self.redirs)
    }
}

impl fmt::Display for List {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, item) in self.0.iter().enumerate() {
            if i > 0 {
                write!(f, " ")?;
            }
            write!(f, "{item}")?;
        }
        Ok(())
    }
}

impl fmt::Display for Item {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.and_or)?;
        if self.is_async {
            write!(f, " &")?;
        } else {
            write!(f, ";")?;
        }
        Ok(())
    }
}

impl fmt::Display for AndOrList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.first)?;
        for (op, pipeline) in &self.rest {
            let sep = match op {
                AndOr::AndThen => "&&",
                AndOr::OrElse => "||",
            };
            write!(f, " {sep} {pipeline}")?;
        }
        Ok(())
    }
}

impl fmt::Display for Pipeline {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.negation {
            write!(f, "! ")?;
        }
        for (i, c) in self.commands.iter().enumerate() {
            if i > 0 {
                write!(f, " | ")?;
            }
            write!(f, "{c}")?;
        }
        Ok(())
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Command::Simple(s) => s.fmt(f),
            Command::Compound(c) => c.fmt(f),
            Command::Function(func) => func.fmt(f),
        }
    }
}

impl fmt::Display for CompoundCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CompoundCommand::Grouping(list) => write!(f, "{{ {list} }}"),
            CompoundCommand::Subshell(list) => write!(f, "({list})"),
            CompoundCommand::For { name, values, body } => {
                write!(f, "for {name}")?;
                if let Some(values) = values {
                    write!(f, " in")?;
                    for v in values {
                        write!(f, " {v}")?;
                    }
                }
                write!(f, "; do {body} done")
            }
            CompoundCommand::While { condition, body } => {
                write!(f, "while {condition}; do {body} done")
            }
            CompoundCommand::Until { condition, body } => {
                write!(f, "until {condition}; do {body} done")
            }
            CompoundCommand::If {
                condition,
                body,
                elifs,
                r#else,
            } => {
                write!(f, "if {condition}; then {body}")?;
                for elif in elifs {
                    write!(f, " elif {}; then {}", elif.condition, elif.body)?;
                }
                if let Some(e) = r#else {
                    write!(f, " else {e}")?;
                }
                write!(f, " fi")
            }
            CompoundCommand::Case { subject, items } => {
                write!(f, "case {subject} in")?;
                for item in items {
                    write!(f, " ")?;
                    for (i, p) in item.patterns.iter().enumerate() {
                        if i > 0 {
                            write!(f, "|")?;
                        }
                        write!(f, "{p}")?;
                    }
                    write!(f, ") {} ;;", item.body)?;
                }
                write!(f, " esac")
            }
        }
    }
}

impl fmt::Display for FullCompoundCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.command)?;
        write_redirs(f, &self.redirs)
    }
}

impl fmt::Display for FunctionDefinition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}(", self.name)?;
        for (i, p) in self.params.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}", p.name)?;
            if let Some(d) = &p.default {
                write!(f, "={d}")?;
            }
        }
        write!(f, ") {}", self.body)
    }
}

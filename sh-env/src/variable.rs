//! Shell variables.
//!
//! Variables live in a stack of contexts: one permanent [`Scope::Global`]
//! context at the bottom, and a [`Scope::Local`] context pushed for each
//! function call or `for`/`while`/`until` loop iteration that a variable
//! can be scoped to. Popping a context (on function return, loop exit, or
//! unwinding through an error) discards every variable declared `local` in
//! that context, regardless of how control left it.

use sh_syntax::Location;
use std::collections::HashMap;
use thiserror::Error;

/// A variable's value: either a plain scalar or an array of fields.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Value {
    Scalar(String),
    Array(Vec<String>),
}

impl Value {
    #[must_use]
    pub fn scalar<S: Into<String>>(s: S) -> Self {
        Value::Scalar(s.into())
    }

    /// Joined with the first character of `$IFS` for `"$*"`/word splitting
    /// contexts that want a single string.
    #[must_use]
    pub fn as_scalar(&self) -> Option<&str> {
        match self {
            Value::Scalar(s) => Some(s),
            Value::Array(_) => None,
        }
    }
}

/// A single shell variable: its value plus the attributes attached by
/// `export`/`readonly` and by the assignment that last set it.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Variable {
    /// `None` for a variable that was declared (e.g. by `local`) but never
    /// assigned a value.
    pub value: Option<Value>,
    pub last_assigned_location: Option<Location>,
    pub is_exported: bool,
    /// `Some` once `readonly` has been applied, recording where.
    pub read_only_location: Option<Location>,
}

impl Variable {
    #[must_use]
    pub fn new<S: Into<String>>(value: S) -> Self {
        Variable {
            value: Some(Value::scalar(value)),
            ..Default::default()
        }
    }

    #[must_use]
    pub fn new_array<I, S>(values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Variable {
            value: Some(Value::Array(values.into_iter().map(Into::into).collect())),
            ..Default::default()
        }
    }

    #[must_use]
    pub fn exported(mut self) -> Self {
        self.is_exported = true;
        self
    }

    #[must_use]
    pub fn read_only_at(mut self, location: Location) -> Self {
        self.read_only_location = Some(location);
        self
    }

    #[must_use]
    pub fn is_read_only(&self) -> bool {
        self.read_only_location.is_some()
    }
}

/// Where a variable assignment or declaration should land.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Scope {
    /// The outermost context, visible everywhere.
    Global,
    /// The innermost currently pushed context (a function call or loop
    /// iteration), if any; falls back to `Global` when nothing is pushed.
    Local,
}

/// Returned when an assignment would overwrite a read-only variable.
#[derive(Clone, Debug, Error, Eq, PartialEq)]
#[error("{name}: readonly variable")]
pub struct AssignReadOnlyError {
    pub name: String,
    pub read_only_location: Location,
}

struct Context {
    variables: HashMap<String, Variable>,
}

/// The full set of variables visible to the running shell: a global
/// context plus any contexts pushed for the current call/loop stack.
#[derive(Debug)]
pub struct VariableSet {
    contexts: Vec<Context>,
}

impl Default for VariableSet {
    fn default() -> Self {
        VariableSet {
            contexts: vec![Context {
                variables: HashMap::new(),
            }],
        }
    }
}

impl VariableSet {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Pushes a new local context, e.g. on entry to a function call.
    pub fn push_context(&mut self) {
        self.contexts.push(Context {
            variables: HashMap::new(),
        });
    }

    /// Pops the innermost local context, discarding its `local` variables.
    /// Never pops the global context.
    pub fn pop_context(&mut self) {
        if self.contexts.len() > 1 {
            self.contexts.pop();
        }
    }

    /// Looks up a variable, searching from the innermost context outward.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Variable> {
        self.contexts.iter().rev().find_map(|c| c.variables.get(name))
    }

    /// Gets or creates a variable in the context named by `scope`,
    /// returning a mutable reference for the caller to assign into.
    ///
    /// Fails if a variable of this name already exists and is read-only
    /// anywhere in the visible context stack.
    pub fn get_or_new(&mut self, name: &str, scope: Scope) -> Result<&mut Variable, AssignReadOnlyError> {
        if let Some(existing) = self.get(name) {
            if let Some(loc) = existing.read_only_location.clone() {
                return Err(AssignReadOnlyError {
                    name: name.to_owned(),
                    read_only_location: loc,
                });
            }
        }
        let index = match scope {
            Scope::Global => 0,
            Scope::Local => self.contexts.len() - 1,
        };
        Ok(self.contexts[index].variables.entry(name.to_owned()).or_default())
    }

    /// Unsets a variable, wherever in the context stack it is found.
    /// Fails (leaving the variable intact) if it is read-only.
    pub fn unset(&mut self, name: &str) -> Result<bool, AssignReadOnlyError> {
        if let Some(existing) = self.get(name) {
            if let Some(loc) = existing.read_only_location.clone() {
                return Err(AssignReadOnlyError {
                    name: name.to_owned(),
                    read_only_location: loc,
                });
            }
        }
        let mut removed = false;
        for context in self.contexts.iter_mut().rev() {
            if context.variables.remove(name).is_some() {
                removed = true;
                break;
            }
        }
        Ok(removed)
    }

    /// All variables visible in the current context stack, innermost
    /// shadowing outermost, in an unspecified order (used by `export -p`,
    /// `readonly -p`, and building `envp` for `exec`).
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Variable)> {
        let mut seen = std::collections::HashSet::new();
        self.contexts.iter().rev().flat_map(move |c| {
            c.variables.iter().filter_map({
                let seen = &mut seen;
                move |(k, v)| seen.insert(k.clone()).then_some((k.as_str(), v))
            })
        })
    }

    /// `NAME=value` pairs for every exported variable, for `exec`/`fork`.
    #[must_use]
    pub fn environ(&self) -> Vec<(String, String)> {
        self.iter()
            .filter(|(_, v)| v.is_exported)
            .filter_map(|(k, v)| Some((k.to_owned(), v.value.as_ref()?.as_scalar()?.to_owned())))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn global_visible_after_push() {
        let mut vars = VariableSet::new();
        vars.get_or_new("FOO", Scope::Global).unwrap().value = Some(Value::scalar("1"));
        vars.push_context();
        assert_eq!(vars.get("FOO").unwrap().value, Some(Value::scalar("1")));
    }

    #[test]
    fn local_shadows_then_disappears_on_pop() {
        let mut vars = VariableSet::new();
        vars.get_or_new("FOO", Scope::Global).unwrap().value = Some(Value::scalar("outer"));
        vars.push_context();
        vars.get_or_new("FOO", Scope::Local).unwrap().value = Some(Value::scalar("inner"));
        assert_eq!(vars.get("FOO").unwrap().value, Some(Value::scalar("inner")));
        vars.pop_context();
        assert_eq!(vars.get("FOO").unwrap().value, Some(Value::scalar("outer")));
    }

    #[test]
    fn readonly_rejects_assignment() {
        let mut vars = VariableSet::new();
        vars.get_or_new("FOO", Scope::Global).unwrap().value = Some(Value::scalar("1"));
        let loc = Location::START;
        vars.get_or_new("FOO", Scope::Global).unwrap().read_only_location = Some(loc);
        let err = vars.get_or_new("FOO", Scope::Global).unwrap_err();
        assert_eq!(err.name, "FOO");
    }

    #[test]
    fn unset_removes_variable() {
        let mut vars = VariableSet::new();
        vars.get_or_new("FOO", Scope::Global).unwrap().value = Some(Value::scalar("1"));
        assert!(vars.unset("FOO").unwrap());
        assert!(vars.get("FOO").is_none());
    }
}

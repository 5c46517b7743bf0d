//! Shell function definitions.

use sh_syntax::{FunctionDefinition, Location};
use std::borrow::Borrow;
use std::hash::{Hash, Hasher};
use std::collections::HashSet;
use std::rc::Rc;
use thiserror::Error;

/// A defined shell function: the parsed body plus the bookkeeping the
/// `readonly`/`unset` builtins need.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Function {
    pub name: String,
    /// Shared with the AST node that originally defined it, so redefining
    /// or unsetting the function doesn't disturb a call already in
    /// progress against the old body.
    pub definition: Rc<FunctionDefinition>,
    pub origin: Location,
    pub read_only_location: Option<Location>,
}

impl Function {
    #[must_use]
    pub fn new(definition: Rc<FunctionDefinition>, origin: Location) -> Self {
        Function {
            name: definition.name.clone(),
            definition,
            origin,
            read_only_location: None,
        }
    }

    #[must_use]
    pub fn make_read_only(mut self, location: Location) -> Self {
        self.read_only_location = Some(location);
        self
    }

    #[must_use]
    pub fn is_read_only(&self) -> bool {
        self.read_only_location.is_some()
    }
}

#[derive(Clone, Debug)]
struct HashEntry(Rc<Function>);

impl PartialEq for HashEntry {
    fn eq(&self, other: &HashEntry) -> bool {
        self.0.name == other.0.name
    }
}

impl Eq for HashEntry {}

impl Hash for HashEntry {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.0.name.hash(state);
    }
}

impl Borrow<str> for HashEntry {
    fn borrow(&self) -> &str {
        &self.0.name
    }
}

/// Error redefining a function that `readonly -f` has protected.
#[derive(Clone, Debug, Error, Eq, PartialEq)]
#[error("cannot redefine read-only function `{}`", .existing.name)]
pub struct DefineError {
    pub existing: Rc<Function>,
    pub new: Rc<Function>,
}

/// The shell's table of defined functions.
#[derive(Clone, Debug, Default)]
pub struct FunctionSet {
    entries: HashSet<HashEntry>,
}

impl FunctionSet {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<Rc<Function>> {
        self.entries.get(name).map(|e| e.0.clone())
    }

    /// Defines or redefines a function, refusing if the existing definition
    /// of the same name is read-only.
    pub fn define(&mut self, function: Function) -> Result<(), DefineError> {
        let new = Rc::new(function);
        if let Some(existing) = self.entries.get(new.name.as_str()) {
            if existing.0.is_read_only() {
                return Err(DefineError {
                    existing: existing.0.clone(),
                    new,
                });
            }
        }
        self.entries.replace(HashEntry(new));
        Ok(())
    }

    /// Removes a function, refusing if it is read-only.
    pub fn unset(&mut self, name: &str) -> Result<bool, Rc<Function>> {
        if let Some(existing) = self.entries.get(name) {
            if existing.0.is_read_only() {
                return Err(existing.0.clone());
            }
        }
        Ok(self.entries.remove(name))
    }

    pub fn iter(&self) -> impl Iterator<Item = &Rc<Function>> {
        self.entries.iter().map(|e| &e.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sh_syntax::{CompoundCommand, FullCompoundCommand, List};

    fn dummy_definition(name: &str) -> Rc<FunctionDefinition> {
        Rc::new(FunctionDefinition {
            name: name.to_owned(),
            params: Vec::new(),
            body: Rc::new(FullCompoundCommand {
                command: CompoundCommand::Grouping(List(Vec::new())),
                redirs: Vec::new(),
            }),
        })
    }

    #[test]
    fn define_then_get() {
        let mut funcs = FunctionSet::new();
        funcs
            .define(Function::new(dummy_definition("greet"), Location::START))
            .unwrap();
        assert!(funcs.get("greet").is_some());
    }

    #[test]
    fn define_rejects_read_only_redefinition() {
        let mut funcs = FunctionSet::new();
        let f = Function::new(dummy_definition("greet"), Location::START).make_read_only(Location::START);
        funcs.define(f).unwrap();
        let err = funcs
            .define(Function::new(dummy_definition("greet"), Location::START))
            .unwrap_err();
        assert_eq!(err.existing.name, "greet");
    }

    #[test]
    fn unset_removes_function() {
        let mut funcs = FunctionSet::new();
        funcs
            .define(Function::new(dummy_definition("greet"), Location::START))
            .unwrap();
        assert!(funcs.unset("greet").unwrap());
        assert!(funcs.get("greet").is_none());
    }
}

//! Alias definitions.
//!
//! Aliases are looked up by the parser when it encounters a command word,
//! before the word is turned into a simple command; the replacement text is
//! spliced back into the token stream and parsed again. This module only
//! holds the name → replacement table. The recursion-depth cap that keeps a
//! self-referential alias from looping forever lives in the expansion
//! pipeline, which is the thing actually doing the re-parsing.

use sh_syntax::Location;
use std::borrow::Borrow;
use std::collections::HashSet;
use std::hash::{Hash, Hasher};
use std::rc::Rc;

/// A single alias definition.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Alias {
    pub name: String,
    pub replacement: String,
    /// A global alias may also be substituted when it appears as a
    /// non-first word of a command; an ordinary alias is only recognized in
    /// command position.
    pub is_global: bool,
    pub origin: Location,
}

/// Wraps an [`Alias`] for storage in a [`AliasSet`], hashing and comparing
/// only by name so redefining an alias replaces the old entry outright.
#[derive(Clone, Debug, Eq)]
pub struct HashEntry(pub Rc<Alias>);

impl HashEntry {
    #[must_use]
    pub fn new(name: String, replacement: String, is_global: bool, origin: Location) -> Self {
        HashEntry(Rc::new(Alias {
            name,
            replacement,
            is_global,
            origin,
        }))
    }
}

impl PartialEq for HashEntry {
    fn eq(&self, other: &HashEntry) -> bool {
        self.0.name == other.0.name
    }
}

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

/// The shell's alias table.
pub type AliasSet = HashSet<HashEntry>;

/// Read-only alias lookup, the interface the parser actually depends on.
pub trait Glossary {
    fn look_up(&self, name: &str) -> Option<Rc<Alias>>;

    #[must_use]
    fn is_empty(&self) -> bool {
        false
    }
}

impl Glossary for AliasSet {
    fn look_up(&self, name: &str) -> Option<Rc<Alias>> {
        self.get(name).map(|entry| entry.0.clone())
    }

    fn is_empty(&self) -> bool {
        HashSet::is_empty(self)
    }
}

/// A glossary with no aliases, for contexts where alias expansion should be
/// skipped entirely (e.g. evaluating a here-document or `$(...)` body that
/// POSIX says must not alias-expand).
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq)]
pub struct EmptyGlossary;

impl Glossary for EmptyGlossary {
    fn look_up(&self, _name: &str) -> Option<Rc<Alias>> {
        None
    }

    fn is_empty(&self) -> bool {
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn redefining_replaces_by_name() {
        let mut set = AliasSet::new();
        set.insert(HashEntry::new("ll".into(), "ls -l".into(), false, Location::START));
        set.insert(HashEntry::new("ll".into(), "ls -la".into(), false, Location::START));
        assert_eq!(set.len(), 1);
        assert_eq!(set.look_up("ll").unwrap().replacement, "ls -la");
    }

    #[test]
    fn look_up_missing_returns_none() {
        let set = AliasSet::new();
        assert!(set.look_up("nope").is_none());
    }
}

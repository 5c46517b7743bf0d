//! Spell-correction seam consulted when a simple command's name resolves
//! to nothing and the `correct` option is on (spec's command-dispatch
//! step for an autocorrect collaborator).

use std::fmt::Debug;

/// Suggests a replacement for a command name that was not found.
pub trait Corrector: Debug {
    fn suggest(&self, not_found: &str) -> Option<String>;
}

/// Never suggests anything; the default until a host sets `Env::corrector`.
#[derive(Debug, Default)]
pub struct NullCorrector;

impl Corrector for NullCorrector {
    fn suggest(&self, _not_found: &str) -> Option<String> {
        None
    }
}

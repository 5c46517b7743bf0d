//! I/O helpers shared by the executor and builtins.

use sh_syntax::source::pretty::{Annotation, AnnotationType, Message};
use sh_syntax::{Fd, Location};
use std::borrow::Cow;

/// File descriptors below this number are reserved for the user's own
/// redirections; anything the shell opens for its own bookkeeping (a
/// here-document pipe, a saved stdout for `exec N>file`) is moved at or
/// above it first.
pub const MIN_INTERNAL_FD: Fd = Fd(10);

/// Builds and renders a one-line-title, one-annotation error message
/// pointing at `location` within `source`, the shape nearly every builtin
/// and parse error uses.
#[must_use]
pub fn format_error(title: Cow<'_, str>, label: Cow<'_, str>, source: &str, location: &Location, color: bool) -> String {
    let message = Message {
        r#type: AnnotationType::Error,
        title,
        source,
        annotations: vec![Annotation::new(AnnotationType::Error, label, location)],
    };
    message.render(color)
}

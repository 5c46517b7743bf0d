//! Rendering diagnostics that point at a fragment of source code.
//!
//! This only runs when the `annotate-snippets` feature is enabled; the rest
//! of the crate works fine without it (`fmt::Display` on [`super::Location`]
//! is always available for a plain `line N, column M` diagnostic).

use super::Location;
use annotate_snippets::{AnnotationKind, Level, Renderer};
use std::borrow::Cow;

/// Severity of a diagnostic, mapped to an `annotate_snippets::Level`.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum AnnotationType {
    Error,
    Warning,
    Info,
    Note,
    Help,
}

impl From<AnnotationType> for Level<'_> {
    fn from(t: AnnotationType) -> Self {
        use AnnotationType::*;
        match t {
            Error => Level::ERROR,
            Warning => Level::WARNING,
            Info => Level::INFO,
            Note => Level::NOTE,
            Help => Level::HELP,
        }
    }
}

/// A label pointing at one [`Location`] in a source string.
#[derive(Clone, Debug)]
pub struct Annotation<'a> {
    pub r#type: AnnotationType,
    pub label: Cow<'a, str>,
    pub location: &'a Location,
}

impl<'a> Annotation<'a> {
    #[must_use]
    pub fn new(r#type: AnnotationType, label: Cow<'a, str>, location: &'a Location) -> Self {
        Annotation { r#type, label, location }
    }
}

/// A complete diagnostic: a title plus annotated fragments of one source
/// text.
#[derive(Clone, Debug)]
pub struct Message<'a> {
    pub r#type: AnnotationType,
    pub title: Cow<'a, str>,
    /// The full source text the annotations' locations are offsets into.
    pub source: &'a str,
    pub annotations: Vec<Annotation<'a>>,
}

impl<'a> Message<'a> {
    /// Renders this message to a string ending in a newline, with ANSI
    /// color codes only when `color` is true.
    #[must_use]
    pub fn render(&self, color: bool) -> String {
        let mut snippet = annotate_snippets::Snippet::source(self.source).line_start(1);
        for annotation in &self.annotations {
            let start = annotation.location.offset;
            let end = (start + 1).min(self.source.len().max(start));
            let kind = match annotation.r#type {
                AnnotationType::Error | AnnotationType::Warning => AnnotationKind::Primary,
                AnnotationType::Info | AnnotationType::Note | AnnotationType::Help => AnnotationKind::Context,
            };
            snippet = snippet.annotation(kind.span(start..end).label(&annotation.label));
        }
        let group = Level::from(self.r#type).primary_title(&*self.title).element(snippet);
        let renderer = if color { Renderer::styled() } else { Renderer::plain() };
        format!("{}\n", renderer.render(&[group]))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn renders_without_panicking() {
        let location = Location { offset: 3, line: 1, column: 4 };
        let message = Message {
            r#type: AnnotationType::Error,
            title: "syntax error".into(),
            source: "echo $((1+))",
            annotations: vec![Annotation::new(AnnotationType::Error, "unexpected end of expression".into(), &location)],
        };
        let rendered = message.render(false);
        assert!(rendered.contains("syntax error"));
    }
}

//! Non-fatal problems raised while expanding a template
//!
//! A diagnostic never stops expansion. Most of them are also written into
//! the generated text as a placeholder comment so that a bad reference is
//! visible in the output.

use std::fmt;

use ariadne::{Color, Config, Label, Report, ReportKind, Source};

use super::tag::Span;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DiagnosticKind {
    /// `@NAME` matched no fragment and no inlinable header
    MissingReference,
    /// `[[NAME]]` matched no fragment
    MissingFragment,
    /// Header already entered during this expansion
    CircularReference,
    /// Header template could not be read
    LoadFailure { message: String },
}

/// A problem tied to one tag of one template
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    pub kind: DiagnosticKind,
    /// Fragment or header name the tag referenced
    pub name: String,
    /// Template the tag appeared in
    pub origin: String,
    /// Position of the tag within `origin`
    pub span: Span,
}

impl Diagnostic {
    pub fn new(kind: DiagnosticKind, name: impl Into<String>, origin: impl Into<String>, span: Span) -> Self {
        Self {
            kind,
            name: name.into(),
            origin: origin.into(),
            span,
        }
    }

    /// Comment substituted for the tag, if any
    ///
    /// Unknown simple-tag fragments resolve to nothing.
    pub fn placeholder(&self) -> Option<String> {
        match &self.kind {
            DiagnosticKind::MissingReference => {
                Some(format!("/* Fragment or header not found: {} */", self.name))
            }
            DiagnosticKind::CircularReference => {
                Some(format!("/* Circular reference detected: {} */", self.name))
            }
            DiagnosticKind::LoadFailure { message } => {
                Some(format!("/* Error processing {}: {} */", self.name, message))
            }
            DiagnosticKind::MissingFragment => None,
        }
    }

    /// Short description without location
    pub fn message(&self) -> String {
        match &self.kind {
            DiagnosticKind::MissingReference => {
                format!("fragment or header not found: {}", self.name)
            }
            DiagnosticKind::MissingFragment => format!("fragment not found: {}", self.name),
            DiagnosticKind::CircularReference => {
                format!("circular reference detected: {}", self.name)
            }
            DiagnosticKind::LoadFailure { message } => {
                format!("error processing {}: {}", self.name, message)
            }
        }
    }

    /// Format the diagnostic against the text of its origin template
    pub fn format(&self, source: &str) -> String {
        let filename = self.origin.as_str();
        let mut buf = Vec::new();
        let written = Report::build(ReportKind::Warning, filename, self.span.start)
            .with_config(Config::default().with_color(false))
            .with_message(self.message())
            .with_label(
                Label::new((filename, self.span.clone()))
                    .with_message(format!("this tag references `{}`", self.name))
                    .with_color(Color::Yellow),
            )
            .finish()
            .write((filename, Source::from(source)), &mut buf);

        match written {
            Ok(()) => String::from_utf8_lossy(&buf).into_owned(),
            Err(_) => self.to_string(),
        }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.origin, self.message())
    }
}

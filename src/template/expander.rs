//! Recursive expansion of a template's tags

use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use regex::Regex;

use crate::config::{Layout, TemplateConfig};
use crate::error::SourceError;
use crate::source::TemplateSource;

use super::diagnostic::Diagnostic;
use super::includes::IncludeSet;
use super::tag::{self, Span};

static TRAILING_WHITESPACE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"[ \t]+(\r?\n|\z)").expect("trailing whitespace pattern should compile")
});

/// Which family of output an expansion produces
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Mode {
    /// One header per registry entry; dependencies are `#include`d
    Modular,
    /// One aggregate header; dependencies are inlined
    Uber,
}

/// Mode plus the include set it writes to or reads from
///
/// The modular pass only ever appends to the set and the uber pass only
/// ever reads the materialized lines, so the hand-off between the two is an
/// explicit value rather than shared state.
#[derive(Debug)]
pub enum Pass<'p> {
    Modular { captured: &'p mut IncludeSet },
    Uber { standard_includes: &'p [String] },
}

impl Pass<'_> {
    pub fn mode(&self) -> Mode {
        match self {
            Pass::Modular { .. } => Mode::Modular,
            Pass::Uber { .. } => Mode::Uber,
        }
    }
}

/// Result of expanding one top-level template
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Expanded {
    pub text: String,
    pub diagnostics: Vec<Diagnostic>,
}

/// State shared by every recursive call of one top-level expansion
pub(super) struct ExpansionState<'p> {
    pub(super) pass: Pass<'p>,
    /// Header templates entered so far; never shrinks during the expansion
    pub(super) visited: HashSet<PathBuf>,
    pub(super) diagnostics: Vec<Diagnostic>,
}

impl<'p> ExpansionState<'p> {
    fn new(pass: Pass<'p>) -> Self {
        Self {
            pass,
            visited: HashSet::new(),
            diagnostics: Vec::new(),
        }
    }

    pub(super) fn mode(&self) -> Mode {
        self.pass.mode()
    }

    /// Record a diagnostic and return the text that replaces its tag
    pub(super) fn report(&mut self, diagnostic: Diagnostic) -> String {
        tracing::warn!(
            origin = %diagnostic.origin,
            name = %diagnostic.name,
            "{}",
            diagnostic.message()
        );
        let replacement = diagnostic.placeholder().unwrap_or_default();
        self.diagnostics.push(diagnostic);
        replacement
    }
}

/// Expands templates against the fragment store and header registry
pub struct Expander<'a, S: ?Sized> {
    pub(super) config: &'a TemplateConfig,
    pub(super) layout: &'a Layout,
    pub(super) source: &'a S,
}

impl<'a, S: TemplateSource + ?Sized> Expander<'a, S> {
    pub fn new(config: &'a TemplateConfig, layout: &'a Layout, source: &'a S) -> Self {
        Self {
            config,
            layout,
            source,
        }
    }

    /// Expand template text
    ///
    /// `origin` labels diagnostics raised by tags of this text.
    pub fn expand(&self, text: &str, origin: &str, pass: Pass<'_>) -> Expanded {
        let mut state = ExpansionState::new(pass);
        let text = self.expand_text(text, origin, &mut state);
        Expanded {
            text,
            diagnostics: state.diagnostics,
        }
    }

    /// Load and expand a template file
    ///
    /// The file itself counts as visited, so a header that leads back to it
    /// is cut at the point of reentry.
    pub fn expand_file(&self, path: &Path, pass: Pass<'_>) -> Result<Expanded, SourceError> {
        let text = self.source.load(path)?;
        tracing::debug!(path = %path.display(), mode = ?pass.mode(), "expanding template");

        let mut state = ExpansionState::new(pass);
        state.visited.insert(path.to_path_buf());
        let text = self.expand_text(&text, &path.display().to_string(), &mut state);
        Ok(Expanded {
            text,
            diagnostics: state.diagnostics,
        })
    }

    /// Resolve every tag of `text` and splice the results in
    ///
    /// Conditional tags are all resolved before simple tags, and both are
    /// found in the original text only: replacement text is never scanned
    /// again by this call.
    pub(super) fn expand_text(&self, text: &str, origin: &str, state: &mut ExpansionState<'_>) -> String {
        let conditionals = tag::conditional_tags(text);
        let conditional_spans: Vec<Span> = conditionals.iter().map(|t| t.span.clone()).collect();
        let simples = tag::simple_tags_outside(text, &conditional_spans);

        let mut replacements: Vec<(Span, String)> =
            Vec::with_capacity(conditionals.len() + simples.len());

        // Identical tag text resolves once per call.
        let mut resolved: HashMap<&str, String> = HashMap::new();
        for conditional in &conditionals {
            let replacement = match resolved.get(conditional.text) {
                Some(replacement) => replacement.clone(),
                None => {
                    let replacement = self.resolve_conditional(conditional, origin, state);
                    resolved.insert(conditional.text, replacement.clone());
                    replacement
                }
            };
            replacements.push((conditional.span.clone(), replacement));
        }

        for simple in &simples {
            let replacement = match resolved.get(simple.text) {
                Some(replacement) => replacement.clone(),
                None => {
                    let replacement = self.resolve_simple(simple, origin, state);
                    resolved.insert(simple.text, replacement.clone());
                    replacement
                }
            };
            replacements.push((simple.span.clone(), replacement));
        }

        replacements.sort_by_key(|(span, _)| span.start);
        strip_trailing_whitespace(&splice(text, &replacements))
    }
}

/// Substitute each span of `text` with its replacement
///
/// A blank replacement for a tag that starts its line removes the line,
/// along with at most one blank line right after it. Other replacements are
/// inserted in place.
pub fn splice(text: &str, replacements: &[(Span, String)]) -> String {
    let mut out = String::with_capacity(text.len());
    let mut cursor = 0;

    for (span, replacement) in replacements {
        if span.start < cursor {
            continue;
        }
        out.push_str(&text[cursor..span.start]);
        cursor = span.end;

        if replacement.trim().is_empty() {
            let line_start = out.rfind('\n').map_or(0, |i| i + 1);
            if out[line_start..].bytes().all(is_horizontal_space) {
                out.truncate(line_start);
                cursor = skip_line_tail(text, cursor);
                continue;
            }
        }
        out.push_str(replacement);
    }

    out.push_str(&text[cursor..]);
    out
}

/// Trim spaces and tabs at the end of every line; blank lines are kept
pub fn strip_trailing_whitespace(text: &str) -> String {
    TRAILING_WHITESPACE.replace_all(text, "$1").into_owned()
}

/// Position after trailing blanks, one line break, and one blank line
fn skip_line_tail(text: &str, from: usize) -> usize {
    let bytes = text.as_bytes();
    let after_blanks = skip_horizontal_space(bytes, from);
    let Some(first_break) = line_break_len(bytes, after_blanks) else {
        return after_blanks;
    };
    let next_line = after_blanks + first_break;

    let blank_end = skip_horizontal_space(bytes, next_line);
    match line_break_len(bytes, blank_end) {
        Some(len) => blank_end + len,
        None => next_line,
    }
}

fn skip_horizontal_space(bytes: &[u8], mut pos: usize) -> usize {
    while pos < bytes.len() && is_horizontal_space(bytes[pos]) {
        pos += 1;
    }
    pos
}

fn line_break_len(bytes: &[u8], pos: usize) -> Option<usize> {
    match bytes.get(pos..) {
        Some([b'\n', ..]) => Some(1),
        Some([b'\r', b'\n', ..]) => Some(2),
        _ => None,
    }
}

fn is_horizontal_space(byte: u8) -> bool {
    byte == b' ' || byte == b'\t'
}

//! Tag resolution - decides the replacement text of a single tag

use super::diagnostic::{Diagnostic, DiagnosticKind};
use super::expander::{Expander, ExpansionState, Mode, Pass};
use super::tag::{
    self, ConditionalTag, SimpleTag, Span, REFERENCE_MARKER, STANDARD_INCLUDES,
    STD_CAPTURE_MARKER,
};
use crate::source::TemplateSource;

impl<S: TemplateSource + ?Sized> Expander<'_, S> {
    /// Resolve `[[@COND ? then : else]]`
    pub(super) fn resolve_conditional(
        &self,
        tag: &ConditionalTag<'_>,
        origin: &str,
        state: &mut ExpansionState<'_>,
    ) -> String {
        let mode = state.mode();

        // Modular pass: emit the include and remember it for the aggregate.
        if tag.captures_standard_include() {
            if let Pass::Modular { captured } = &mut state.pass {
                if let Some(spelling) = tag::include_spelling(tag.else_branch) {
                    captured.insert(spelling);
                }
                return format!("#include {}", tag.else_branch);
            }
        }

        let active = tag.active_branch(mode);
        if active.starts_with(STD_CAPTURE_MARKER) {
            // Re-emitted as a batch through the synthetic includes fragment.
            return String::new();
        }

        match active.strip_prefix(REFERENCE_MARKER) {
            Some(name) => self.resolve_reference(name, tag.span.clone(), origin, state),
            None => resolve_literal(active, mode),
        }
    }

    /// Resolve `@NAME` from the active branch of a conditional tag
    fn resolve_reference(
        &self,
        name: &str,
        span: Span,
        origin: &str,
        state: &mut ExpansionState<'_>,
    ) -> String {
        if let (STANDARD_INCLUDES, Pass::Uber { standard_includes }) = (name, &state.pass) {
            return standard_includes
                .iter()
                .map(|spelling| format!("#include {spelling}"))
                .collect::<Vec<_>>()
                .join("\n");
        }

        if let Some(joined) = self.config.fragments.joined(name) {
            return joined;
        }

        if state.mode() == Mode::Uber {
            if let Some(template) = self.config.headers.get(name) {
                return self.inline_header(name, template, span, origin, state);
            }
        }

        state.report(Diagnostic::new(
            DiagnosticKind::MissingReference,
            name,
            origin,
            span,
        ))
    }

    /// Expand another header's template in place of the tag
    fn inline_header(
        &self,
        name: &str,
        template: &str,
        span: Span,
        origin: &str,
        state: &mut ExpansionState<'_>,
    ) -> String {
        let path = self.layout.header_template_path(name, template);
        if state.visited.contains(&path) {
            return state.report(Diagnostic::new(
                DiagnosticKind::CircularReference,
                name,
                origin,
                span,
            ));
        }
        state.visited.insert(path.clone());

        match self.source.load(&path) {
            Ok(text) => {
                tracing::debug!(header = name, path = %path.display(), "inlining header");
                self.expand_text(&text, &path.display().to_string(), state)
            }
            Err(err) => state.report(Diagnostic::new(
                DiagnosticKind::LoadFailure {
                    message: err.to_string(),
                },
                name,
                origin,
                span,
            )),
        }
    }

    /// Resolve `[[NAME]]`; simple tags never inline headers
    pub(super) fn resolve_simple(
        &self,
        tag: &SimpleTag<'_>,
        origin: &str,
        state: &mut ExpansionState<'_>,
    ) -> String {
        if let (STANDARD_INCLUDES, Pass::Uber { standard_includes }) = (tag.name, &state.pass) {
            return standard_includes.join("\n");
        }

        match self.config.fragments.joined(tag.name) {
            Some(joined) => joined,
            None => state.report(Diagnostic::new(
                DiagnosticKind::MissingFragment,
                tag.name,
                origin,
                tag.span.clone(),
            )),
        }
    }
}

/// Resolve a branch that carries no marker
fn resolve_literal(value: &str, mode: Mode) -> String {
    if mode == Mode::Modular && tag::is_header_spelling(value) {
        format!("#include {value}")
    } else {
        value.trim_matches(|c| c == '\'' || c == '"').to_string()
    }
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use pretty_assertions::assert_eq;

    use super::*;
    use crate::config::{Layout, TemplateConfig};
    use crate::source::MemorySource;
    use crate::template::{FragmentStore, HeaderRegistry, IncludeSet};

    fn config() -> TemplateConfig {
        let fragments: FragmentStore = [
            ("FOO", vec!["int foo();"]),
            ("GUARD", vec!["#pragma once", "", "// guarded"]),
        ]
        .into_iter()
        .collect();
        let headers: HeaderRegistry = [
            ("TYPES", "c++on-types.tmpl"),
            ("A", "a.tmpl"),
            ("B", "b.tmpl"),
            ("BROKEN", "broken.tmpl"),
        ]
        .into_iter()
        .collect();
        TemplateConfig::new(fragments, headers)
    }

    fn layout() -> Layout {
        Layout::default().with_base_dir("/t")
    }

    fn header_path(file: &str) -> PathBuf {
        PathBuf::from("/t/templates/headers/cppon").join(file)
    }

    fn source() -> MemorySource {
        MemorySource::new()
            .with_file(header_path("c++on-types.tmpl"), "struct value {};\n")
            .with_file(header_path("a.tmpl"), "// a\n[[@UBER ? @B : \"b.h\"]]\n")
            .with_file(header_path("b.tmpl"), "// b\n[[@UBER ? @A : \"a.h\"]]\n")
    }

    fn modular(text: &str) -> (String, IncludeSet, Vec<Diagnostic>) {
        let config = config();
        let layout = layout();
        let source = source();
        let expander = Expander::new(&config, &layout, &source);
        let mut captured = IncludeSet::new();
        let expanded = expander.expand(
            text,
            "test.tmpl",
            Pass::Modular {
                captured: &mut captured,
            },
        );
        (expanded.text, captured, expanded.diagnostics)
    }

    fn uber(text: &str, includes: &[&str]) -> (String, Vec<Diagnostic>) {
        let config = config();
        let layout = layout();
        let source = source();
        let expander = Expander::new(&config, &layout, &source);
        let lines: Vec<String> = includes.iter().map(|s| s.to_string()).collect();
        let expanded = expander.expand(
            text,
            "test.tmpl",
            Pass::Uber {
                standard_includes: &lines,
            },
        );
        (expanded.text, expanded.diagnostics)
    }

    #[test]
    fn test_simple_tag_joins_fragment_lines() {
        let (text, _, _) = modular("[[GUARD]]\nint x;");
        assert_eq!(text, "#pragma once\n\n// guarded\nint x;");
    }

    #[test]
    fn test_simple_tag_end_to_end() {
        let (text, captured, diagnostics) = modular("[[FOO]]\n\n// end");
        assert_eq!(text, "int foo();\n\n// end");
        assert!(captured.is_empty());
        assert!(diagnostics.is_empty());
    }

    #[test]
    fn test_std_capture_in_modular_mode() {
        let (text, captured, _) = modular("[[@UBER ? @STDCAPTURE : <vector>]]\nint x;");
        assert_eq!(text, "#include <vector>\nint x;");
        assert_eq!(captured.to_lines(), vec!["<vector>"]);
    }

    #[test]
    fn test_std_capture_in_uber_mode_is_suppressed() {
        let template = "[[@UBER ? @STANDARD_INCLUDES : \"\"]]\n[[@UBER ? @STDCAPTURE : <vector>]]\nint x;";
        let (text, _) = uber(template, &["<vector>"]);
        assert_eq!(text, "#include <vector>\nint x;");
    }

    #[test]
    fn test_standard_includes_absent_in_modular_mode() {
        let template = "[[@UBER ? @STANDARD_INCLUDES : \"\"]]\nint x;";
        let (text, _, diagnostics) = modular(template);
        assert_eq!(text, "int x;");
        assert!(diagnostics.is_empty());
    }

    #[test]
    fn test_literal_header_spelling_becomes_include_in_modular_mode() {
        let (text, _, _) = modular("[[@UBER ? @TYPES : \"c++on-types.h\"]]");
        assert_eq!(text, "#include \"c++on-types.h\"");
    }

    #[test]
    fn test_plain_literal_is_unquoted() {
        let (text, _, _) = modular("[[@UBER ? inline : 'static']] int f();");
        assert_eq!(text, "static int f();");

        let (text, _) = uber("[[@UBER ? inline : 'static']] int f();", &[]);
        assert_eq!(text, "inline int f();");
    }

    #[test]
    fn test_bracketed_literal_is_bare_in_uber_mode() {
        let (text, diagnostics) = uber("[[@DEBUG ? x : <vector>]]", &[]);
        assert_eq!(text, "<vector>");
        assert!(diagnostics.is_empty());
    }

    #[test]
    fn test_empty_standard_includes_removes_line() {
        let template = "// top\n[[@UBER ? @STANDARD_INCLUDES : \"\"]]\nint x;";
        let (text, diagnostics) = uber(template, &[]);
        assert_eq!(text, "// top\nint x;");
        assert!(diagnostics.is_empty());
    }

    #[test]
    fn test_unknown_condition_is_always_false() {
        let (text, _) = uber("[[@DEBUG ? yes : no]]", &[]);
        assert_eq!(text, "no");
    }

    #[test]
    fn test_header_is_inlined_in_uber_mode() {
        let (text, diagnostics) = uber("[[@UBER ? @TYPES : \"c++on-types.h\"]]\n// end", &[]);
        assert_eq!(text, "struct value {};\n\n// end");
        assert!(diagnostics.is_empty());
    }

    #[test]
    fn test_header_is_not_inlined_in_modular_mode() {
        let (text, _, diagnostics) = modular("[[@UBER ? \"c++on-types.h\" : @TYPES]]");
        assert_eq!(text, "/* Fragment or header not found: TYPES */");
        assert_eq!(diagnostics.len(), 1);
        assert_eq!(diagnostics[0].kind, DiagnosticKind::MissingReference);
    }

    #[test]
    fn test_missing_header_yields_placeholder() {
        let (text, diagnostics) = uber("[[@UBER ? @NOPE : \"nope.h\"]]", &[]);
        assert_eq!(text, "/* Fragment or header not found: NOPE */");
        assert_eq!(diagnostics[0].name, "NOPE");
        assert_eq!(diagnostics[0].span, 0..28);
    }

    #[test]
    fn test_cycle_is_cut() {
        let (text, diagnostics) = uber("[[@UBER ? @A : \"a.h\"]]", &[]);
        assert_eq!(
            text,
            "// a\n// b\n/* Circular reference detected: A */\n\n"
        );
        assert_eq!(diagnostics.len(), 1);
        assert_eq!(diagnostics[0].kind, DiagnosticKind::CircularReference);
    }

    #[test]
    fn test_load_failure_yields_placeholder() {
        let (text, diagnostics) = uber("[[@UBER ? @BROKEN : \"broken.h\"]]", &[]);
        assert!(text.starts_with("/* Error processing BROKEN: cannot read template"));
        assert!(matches!(
            diagnostics[0].kind,
            DiagnosticKind::LoadFailure { .. }
        ));
    }

    #[test]
    fn test_unknown_simple_fragment_removes_line() {
        let (text, _, diagnostics) = modular("a\n[[MISSING]]\nb");
        assert_eq!(text, "a\nb");
        assert_eq!(diagnostics[0].kind, DiagnosticKind::MissingFragment);
    }

    #[test]
    fn test_inserted_text_is_not_rescanned() {
        let config = TemplateConfig::new(
            [("LOOKS_LIKE_TAG", vec!["[[FOO]]"]), ("FOO", vec!["int foo();"])]
                .into_iter()
                .collect(),
            HeaderRegistry::new(),
        );
        let layout = layout();
        let source = MemorySource::new();
        let expander = Expander::new(&config, &layout, &source);
        let mut captured = IncludeSet::new();
        let expanded = expander.expand(
            "[[@UBER ? x : @LOOKS_LIKE_TAG]]",
            "test.tmpl",
            Pass::Modular {
                captured: &mut captured,
            },
        );
        assert_eq!(expanded.text, "[[FOO]]");
    }
}

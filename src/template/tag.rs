//! Tag grammar recognised inside templates
//!
//! ```text
//! [[@CONDITION ? then : else]]   conditional tag
//! [[FRAGMENT_NAME]]              simple tag
//! ```
//!
//! Branch text is raw: `@STDCAPTURE` marks an elidable standard include,
//! `@NAME` references a fragment or header, anything else is a literal.

use std::ops::Range;
use std::sync::LazyLock;

use regex::Regex;

use super::Mode;

/// Byte range in template text
pub type Span = Range<usize>;

/// The only condition name that is ever true (in uber mode)
pub const UBER_CONDITION: &str = "UBER";

/// Branch marker for a standard include collected into the aggregate header
pub const STD_CAPTURE_MARKER: &str = "@STDCAPTURE";

/// Branch prefix for fragment or header references
pub const REFERENCE_MARKER: char = '@';

/// Synthetic fragment holding the collected standard includes
pub const STANDARD_INCLUDES: &str = "STANDARD_INCLUDES";

static CONDITIONAL_TAG: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\[\[@([A-Z0-9_]+)\s*\?\s*([^:]+)\s*:\s*([^\]]+)\]\]")
        .expect("conditional tag pattern should compile")
});

static SIMPLE_TAG: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\[\[([A-Z0-9_]+)\]\]").expect("simple tag pattern should compile")
});

static ANGLE_SPELLING: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<[^>]+>").expect("angle spelling pattern should compile"));

static QUOTED_SPELLING: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#""[^"]+""#).expect("quoted spelling pattern should compile"));

const HEADER_SUFFIXES: [&str; 4] = [".h\"", ".hpp\"", ".hxx\"", ".h++\""];

/// `[[@CONDITION ? then : else]]`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConditionalTag<'t> {
    /// Full tag text, brackets included
    pub text: &'t str,
    pub span: Span,
    pub condition: &'t str,
    /// Trimmed then-branch
    pub then_branch: &'t str,
    /// Trimmed else-branch
    pub else_branch: &'t str,
}

impl<'t> ConditionalTag<'t> {
    /// Branch visible in the given mode
    pub fn active_branch(&self, mode: Mode) -> &'t str {
        if self.condition == UBER_CONDITION && mode == Mode::Uber {
            self.then_branch
        } else {
            self.else_branch
        }
    }

    /// Whether this tag declares an elidable standard include
    pub fn captures_standard_include(&self) -> bool {
        self.then_branch.starts_with(STD_CAPTURE_MARKER)
    }
}

/// `[[FRAGMENT_NAME]]`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SimpleTag<'t> {
    pub text: &'t str,
    pub span: Span,
    pub name: &'t str,
}

/// Every conditional tag in `text`, in source order
pub fn conditional_tags(text: &str) -> Vec<ConditionalTag<'_>> {
    CONDITIONAL_TAG
        .captures_iter(text)
        .filter_map(|caps| {
            let whole = caps.get(0)?;
            Some(ConditionalTag {
                text: whole.as_str(),
                span: whole.range(),
                condition: caps.get(1)?.as_str(),
                then_branch: caps.get(2)?.as_str().trim(),
                else_branch: caps.get(3)?.as_str().trim(),
            })
        })
        .collect()
}

/// Every simple tag in `text` lying outside the `excluded` spans
///
/// `excluded` must be sorted and non-overlapping; conditional tag spans are
/// passed here so that branch text is never read as a simple tag.
pub fn simple_tags_outside<'t>(text: &'t str, excluded: &[Span]) -> Vec<SimpleTag<'t>> {
    let mut gaps = Vec::with_capacity(excluded.len() + 1);
    let mut cursor = 0;
    for span in excluded {
        gaps.push(cursor..span.start);
        cursor = span.end;
    }
    gaps.push(cursor..text.len());

    gaps.into_iter()
        .flat_map(|gap| {
            let offset = gap.start;
            SIMPLE_TAG
                .captures_iter(&text[gap])
                .filter_map(move |caps| {
                    let whole = caps.get(0)?;
                    Some(SimpleTag {
                        text: whole.as_str(),
                        span: (whole.start() + offset)..(whole.end() + offset),
                        name: caps.get(1)?.as_str(),
                    })
                })
        })
        .collect()
}

/// First `<...>` spelling in a branch, else the first `"..."` one
pub fn include_spelling(branch: &str) -> Option<&str> {
    ANGLE_SPELLING
        .find(branch)
        .or_else(|| QUOTED_SPELLING.find(branch))
        .map(|m| m.as_str())
}

/// Whether a literal spells a header: `<...>` or a quoted `.h`-like path
pub fn is_header_spelling(value: &str) -> bool {
    let angled = value.starts_with('<') && value.ends_with('>');
    let quoted = value.starts_with('"')
        && HEADER_SUFFIXES.iter().any(|suffix| value.ends_with(suffix));
    angled || quoted
}

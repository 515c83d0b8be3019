//! Template expansion engine
//!
//! Templates are plain text carrying two kinds of tags:
//!
//! ```text
//! [[@UBER ? @TYPES : "c++on-types.h"]]     conditional tag
//! [[@UBER ? @STDCAPTURE : <vector>]]       standard include, collected
//! [[LICENSE_BANNER]]                       simple fragment tag
//! ```
//!
//! In modular mode a conditional tag takes its else-branch and dependency
//! headers are referenced with `#include`. In uber mode it takes its
//! then-branch, dependency headers are inlined recursively, and standard
//! includes are emitted once through the synthetic `STANDARD_INCLUDES`
//! fragment.

mod diagnostic;
mod expander;
mod includes;
mod registry;
mod resolver;
pub mod tag;

pub use diagnostic::{Diagnostic, DiagnosticKind};
pub use expander::{splice, strip_trailing_whitespace, Expanded, Expander, Mode, Pass};
pub use includes::IncludeSet;
pub use registry::{FragmentStore, HeaderRegistry};

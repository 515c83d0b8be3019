//! headergen - modular and single-file header generation from templates
//!
//! A set of annotated templates is expanded twice: once per registry entry
//! into independent headers ("modular" mode), and once more from the root
//! template into one self-contained aggregate header ("uber" mode) that
//! inlines every dependency and gathers all standard includes in one block.
//!
//! # Example
//!
//! ```rust
//! use headergen::source::MemorySource;
//! use headergen::{Expander, IncludeSet, Layout, Pass, TemplateConfig};
//!
//! let config = TemplateConfig::from_str(
//!     r#"{"fragments": {"FOO": ["int foo();"]}, "headers": {}}"#,
//! ).unwrap();
//! let layout = Layout::default();
//! let source = MemorySource::new();
//! let expander = Expander::new(&config, &layout, &source);
//!
//! let mut captured = IncludeSet::new();
//! let expanded = expander.expand(
//!     "[[FOO]]\n[[@UBER ? @STDCAPTURE : <vector>]]",
//!     "example.tmpl",
//!     Pass::Modular { captured: &mut captured },
//! );
//! assert_eq!(expanded.text, "int foo();\n#include <vector>");
//! assert!(captured.contains("<vector>"));
//! ```

pub mod config;
pub mod error;
pub mod generator;
pub mod source;
pub mod template;

pub use config::{Layout, Namespace, NamespaceRules, TemplateConfig};
pub use error::{ConfigError, GenerateError, SourceError};
pub use generator::{GeneratedFile, GenerationReport, Generator};
pub use template::{
    Diagnostic, DiagnosticKind, Expanded, Expander, FragmentStore, HeaderRegistry, IncludeSet,
    Mode, Pass,
};

use source::FsSource;

/// Generate every header described by `layout` from the files on disk
///
/// Loads the template configuration named by the layout, then runs the
/// modular and uber passes.
pub fn generate(layout: &Layout) -> Result<GenerationReport, GenerateError> {
    let config = TemplateConfig::from_file(&layout.config_path())?;
    Generator::new(&config, layout, FsSource).run()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_missing_config_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let layout = Layout::default().with_base_dir(dir.path());
        let result = generate(&layout);
        assert!(matches!(
            result,
            Err(GenerateError::Config(ConfigError::Io { .. }))
        ));
    }

    #[test]
    fn test_generate_missing_root_template_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let layout = Layout::default().with_base_dir(dir.path());
        let config_path = layout.config_path();
        std::fs::create_dir_all(config_path.parent().unwrap()).unwrap();
        std::fs::write(&config_path, r#"{"fragments": {}, "headers": {}}"#).unwrap();

        let result = generate(&layout);
        assert!(matches!(result, Err(GenerateError::Source(_))));
    }
}

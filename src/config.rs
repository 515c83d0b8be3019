//! Configuration: the fragment/header document and the on-disk layout
//!
//! The template configuration is a JSON document with two mappings,
//! `fragments` (name to lines) and `headers` (symbolic name to template
//! file). The layout is an optional TOML file describing where templates
//! live and where generated headers go; every field has a default.

use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::ConfigError;
use crate::template::{FragmentStore, HeaderRegistry};

/// Fragments and headers loaded from the template configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct TemplateConfig {
    pub fragments: FragmentStore,
    pub headers: HeaderRegistry,
}

impl TemplateConfig {
    /// Create a configuration from already-built parts
    pub fn new(fragments: FragmentStore, headers: HeaderRegistry) -> Self {
        Self { fragments, headers }
    }

    /// Load the configuration from a JSON file
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_str(&content)
    }

    /// Load the configuration from a JSON string
    pub fn from_str(content: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(content)?)
    }
}

/// Namespace a header belongs to, which picks its directory
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Namespace {
    Platform,
    Simd,
    Default,
}

/// Static name lists classifying headers into namespaces
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct NamespaceRules {
    /// Headers living under `platform/`
    pub platform: Vec<String>,
    /// Headers living under `simd/`
    pub simd: Vec<String>,
    /// Directory name for every other header
    pub default: String,
}

impl Default for NamespaceRules {
    fn default() -> Self {
        Self {
            platform: vec!["PROCESSOR_FEATURES_INFO".to_string()],
            simd: vec!["SIMD_COMPARISONS".to_string()],
            default: "cppon".to_string(),
        }
    }
}

impl NamespaceRules {
    /// Classify a symbolic header name
    pub fn classify(&self, name: &str) -> Namespace {
        if self.platform.iter().any(|n| n == name) {
            Namespace::Platform
        } else if self.simd.iter().any(|n| n == name) {
            Namespace::Simd
        } else {
            Namespace::Default
        }
    }

    /// Directory name used for a namespace
    pub fn dir_name(&self, namespace: Namespace) -> &str {
        match namespace {
            Namespace::Platform => "platform",
            Namespace::Simd => "simd",
            Namespace::Default => &self.default,
        }
    }
}

/// Where templates are read from and generated headers are written to
///
/// Relative paths are resolved against `base_dir`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Layout {
    pub base_dir: PathBuf,
    /// Template configuration (fragments and headers)
    pub config_file: PathBuf,
    /// Root of the per-namespace template tree
    pub templates_dir: PathBuf,
    /// Root of the per-namespace modular output tree
    pub include_dir: PathBuf,
    /// Registry entry generated from `root_template` rather than its own file
    pub root_header: String,
    /// Root template file, directly inside `templates_dir`
    pub root_template: String,
    pub root_output: PathBuf,
    /// Single-file aggregate header
    pub uber_output: PathBuf,
    pub template_extension: String,
    pub header_extension: String,
    pub namespaces: NamespaceRules,
}

impl Default for Layout {
    fn default() -> Self {
        Self {
            base_dir: PathBuf::from("."),
            config_file: PathBuf::from("templates/template.json"),
            templates_dir: PathBuf::from("templates/headers"),
            include_dir: PathBuf::from("include"),
            root_header: "CPPON".to_string(),
            root_template: "c++on.tmpl".to_string(),
            root_output: PathBuf::from("include/cppon/c++on.h"),
            uber_output: PathBuf::from("single_include/cppon/c++on.h"),
            template_extension: ".tmpl".to_string(),
            header_extension: ".h".to_string(),
            namespaces: NamespaceRules::default(),
        }
    }
}

impl Layout {
    /// Load a layout from a TOML file
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_str(&content)
    }

    /// Load a layout from a TOML string
    pub fn from_str(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }

    /// Set the directory all relative paths are resolved against
    pub fn with_base_dir(mut self, base_dir: impl Into<PathBuf>) -> Self {
        self.base_dir = base_dir.into();
        self
    }

    /// Set the template configuration file
    pub fn with_config_file(mut self, config_file: impl Into<PathBuf>) -> Self {
        self.config_file = config_file.into();
        self
    }

    /// Set the root registry entry
    pub fn with_root_header(mut self, root_header: impl Into<String>) -> Self {
        self.root_header = root_header.into();
        self
    }

    /// Set the namespace classification rules
    pub fn with_namespaces(mut self, namespaces: NamespaceRules) -> Self {
        self.namespaces = namespaces;
        self
    }

    pub fn config_path(&self) -> PathBuf {
        self.base_dir.join(&self.config_file)
    }

    /// Template path of a registry entry
    pub fn header_template_path(&self, name: &str, template: &str) -> PathBuf {
        let namespace = self.namespaces.classify(name);
        self.base_dir
            .join(&self.templates_dir)
            .join(self.namespaces.dir_name(namespace))
            .join(template)
    }

    /// Modular output path of a registry entry
    pub fn header_output_path(&self, name: &str, template: &str) -> PathBuf {
        let namespace = self.namespaces.classify(name);
        self.base_dir
            .join(&self.include_dir)
            .join(self.namespaces.dir_name(namespace))
            .join(self.output_file_name(template))
    }

    pub fn root_template_path(&self) -> PathBuf {
        self.base_dir
            .join(&self.templates_dir)
            .join(&self.root_template)
    }

    pub fn root_output_path(&self) -> PathBuf {
        self.base_dir.join(&self.root_output)
    }

    pub fn uber_output_path(&self) -> PathBuf {
        self.base_dir.join(&self.uber_output)
    }

    /// Swap the template extension for the header extension
    fn output_file_name(&self, template: &str) -> String {
        if self.template_extension.is_empty() {
            return template.to_string();
        }
        template.replace(&self.template_extension, &self.header_extension)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_namespaces() {
        let rules = NamespaceRules::default();
        assert_eq!(rules.classify("PROCESSOR_FEATURES_INFO"), Namespace::Platform);
        assert_eq!(rules.classify("SIMD_COMPARISONS"), Namespace::Simd);
        assert_eq!(rules.classify("PARSER"), Namespace::Default);
        assert_eq!(rules.dir_name(Namespace::Default), "cppon");
    }

    #[test]
    fn test_header_paths_follow_namespace() {
        let layout = Layout::default().with_base_dir("/work");
        assert_eq!(
            layout.header_template_path("SIMD_COMPARISONS", "simd_comparisons.tmpl"),
            PathBuf::from("/work/templates/headers/simd/simd_comparisons.tmpl")
        );
        assert_eq!(
            layout.header_output_path("PARSER", "c++on-parser.tmpl"),
            PathBuf::from("/work/include/cppon/c++on-parser.h")
        );
        assert_eq!(
            layout.root_template_path(),
            PathBuf::from("/work/templates/headers/c++on.tmpl")
        );
        assert_eq!(
            layout.uber_output_path(),
            PathBuf::from("/work/single_include/cppon/c++on.h")
        );
    }

    #[test]
    fn test_layout_toml_overrides_defaults() {
        let layout = Layout::from_str(
            r#"
root_header = "MAIN"
header_extension = ".hpp"

[namespaces]
simd = ["VECTOR_OPS"]
default = "mylib"
"#,
        )
        .expect("Should parse");
        assert_eq!(layout.root_header, "MAIN");
        assert_eq!(layout.config_file, PathBuf::from("templates/template.json"));
        assert_eq!(layout.namespaces.platform, vec!["PROCESSOR_FEATURES_INFO"]);
        assert_eq!(layout.namespaces.classify("VECTOR_OPS"), Namespace::Simd);
        assert_eq!(
            layout.header_output_path("CORE", "core.tmpl"),
            PathBuf::from("./include/mylib/core.hpp")
        );
    }

    #[test]
    fn test_layout_builders() {
        let layout = Layout::default()
            .with_base_dir("/work")
            .with_config_file("gen/headers.json")
            .with_root_header("MAIN")
            .with_namespaces(NamespaceRules {
                platform: vec![],
                simd: vec!["VECTOR_OPS".to_string()],
                default: "core".to_string(),
            });
        assert_eq!(layout.config_path(), PathBuf::from("/work/gen/headers.json"));
        assert_eq!(layout.root_header, "MAIN");
        assert_eq!(
            layout.header_template_path("PROCESSOR_FEATURES_INFO", "cpu.tmpl"),
            PathBuf::from("/work/templates/headers/core/cpu.tmpl")
        );
        assert_eq!(
            layout.header_output_path("VECTOR_OPS", "vector_ops.tmpl"),
            PathBuf::from("/work/include/simd/vector_ops.h")
        );
    }

    #[test]
    fn test_layout_rejects_unknown_keys() {
        assert!(matches!(
            Layout::from_str("bogus = 1"),
            Err(ConfigError::Toml(_))
        ));
    }

    #[test]
    fn test_template_config_requires_both_mappings() {
        let config =
            TemplateConfig::from_str(r#"{"fragments": {"FOO": ["int foo();"]}, "headers": {}}"#)
                .expect("Should parse");
        assert_eq!(config.fragments.joined("FOO").as_deref(), Some("int foo();"));
        assert!(config.headers.is_empty());

        assert!(matches!(
            TemplateConfig::from_str(r#"{"fragments": {}}"#),
            Err(ConfigError::Json(_))
        ));
    }
}

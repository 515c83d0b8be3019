//! Two-pass header generation
//!
//! The modular pass writes one header per registry entry and collects the
//! standard includes they elide from the aggregate. The uber pass then
//! expands the root template once more with those includes injected and
//! writes the single aggregate header. The modular pass must finish, root
//! entry included, before the uber pass starts.

use std::path::{Path, PathBuf};

use crate::config::{Layout, TemplateConfig};
use crate::error::GenerateError;
use crate::source::TemplateSource;
use crate::template::{Diagnostic, Expander, IncludeSet, Mode, Pass};

/// A header produced by one pass
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedFile {
    /// Registry entry the header was generated for
    pub header: String,
    pub template: PathBuf,
    pub path: PathBuf,
    pub mode: Mode,
    pub content: String,
    pub diagnostics: Vec<Diagnostic>,
}

/// Everything a generation run produced
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationReport {
    /// Modular headers in generation order, root last
    pub modular: Vec<GeneratedFile>,
    pub uber: GeneratedFile,
    pub standard_includes: IncludeSet,
}

impl GenerationReport {
    /// Every generated file, modular ones first
    pub fn files(&self) -> impl Iterator<Item = &GeneratedFile> {
        self.modular.iter().chain(std::iter::once(&self.uber))
    }

    /// Every diagnostic raised across the run
    pub fn diagnostics(&self) -> impl Iterator<Item = &Diagnostic> {
        self.files().flat_map(|file| file.diagnostics.iter())
    }
}

/// Drives both passes over a template set
pub struct Generator<'a, S> {
    config: &'a TemplateConfig,
    layout: &'a Layout,
    source: S,
}

impl<'a, S: TemplateSource> Generator<'a, S> {
    pub fn new(config: &'a TemplateConfig, layout: &'a Layout, source: S) -> Self {
        Self {
            config,
            layout,
            source,
        }
    }

    fn expander(&self) -> Expander<'_, S> {
        Expander::new(self.config, self.layout, &self.source)
    }

    /// Run the modular pass and then the uber pass
    pub fn run(&self) -> Result<GenerationReport, GenerateError> {
        self.run_with(|_| {})
    }

    /// Run both passes, calling `on_written` as soon as each file is on disk
    ///
    /// Files written before a fatal error have already been reported when
    /// the error is returned.
    pub fn run_with<F>(&self, mut on_written: F) -> Result<GenerationReport, GenerateError>
    where
        F: FnMut(&GeneratedFile),
    {
        let (modular, standard_includes) = self.modular_pass(&mut on_written)?;
        let uber = self.generate_uber(&standard_includes)?;
        on_written(&uber);
        Ok(GenerationReport {
            modular,
            uber,
            standard_includes,
        })
    }

    /// Write every modular header and return the standard includes they captured
    pub fn generate_modular(&self) -> Result<(Vec<GeneratedFile>, IncludeSet), GenerateError> {
        self.modular_pass(&mut |_| {})
    }

    fn modular_pass(
        &self,
        on_written: &mut dyn FnMut(&GeneratedFile),
    ) -> Result<(Vec<GeneratedFile>, IncludeSet), GenerateError> {
        let mut captured = IncludeSet::new();
        let mut files = Vec::with_capacity(self.config.headers.len() + 1);

        for (name, template) in self.config.headers.iter() {
            if name == self.layout.root_header {
                continue;
            }
            let file = self.generate_modular_file(
                name,
                self.layout.header_template_path(name, template),
                self.layout.header_output_path(name, template),
                &mut captured,
            )?;
            on_written(&file);
            files.push(file);
        }

        let root = self.generate_modular_file(
            &self.layout.root_header,
            self.layout.root_template_path(),
            self.layout.root_output_path(),
            &mut captured,
        )?;
        on_written(&root);
        files.push(root);

        tracing::debug!(count = captured.len(), "captured standard includes");
        Ok((files, captured))
    }

    /// Write the aggregate header with `includes` as its standard-include block
    pub fn generate_uber(&self, includes: &IncludeSet) -> Result<GeneratedFile, GenerateError> {
        let standard_includes = includes.to_lines();
        let template = self.layout.root_template_path();
        let path = self.layout.uber_output_path();

        let expanded = self.expander().expand_file(
            &template,
            Pass::Uber {
                standard_includes: &standard_includes,
            },
        )?;
        write_output(&path, &expanded.text)?;
        tracing::info!(path = %path.display(), "generated uber header");

        Ok(GeneratedFile {
            header: self.layout.root_header.clone(),
            template,
            path,
            mode: Mode::Uber,
            content: expanded.text,
            diagnostics: expanded.diagnostics,
        })
    }

    fn generate_modular_file(
        &self,
        name: &str,
        template: PathBuf,
        path: PathBuf,
        captured: &mut IncludeSet,
    ) -> Result<GeneratedFile, GenerateError> {
        let expanded = self
            .expander()
            .expand_file(&template, Pass::Modular { captured })?;
        write_output(&path, &expanded.text)?;
        tracing::info!(header = name, path = %path.display(), "generated header");

        Ok(GeneratedFile {
            header: name.to_string(),
            template,
            path,
            mode: Mode::Modular,
            content: expanded.text,
            diagnostics: expanded.diagnostics,
        })
    }
}

/// Write a generated header, creating parent directories as needed
fn write_output(path: &Path, content: &str) -> Result<(), GenerateError> {
    let write = || -> std::io::Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, content)
    };
    write().map_err(|source| GenerateError::Write {
        path: path.to_path_buf(),
        source,
    })
}

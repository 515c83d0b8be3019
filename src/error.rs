//! Error types for configuration loading and header generation

use std::io;
use std::path::PathBuf;

use ariadne::{Color, Config, Label, Report, ReportKind, Source};
use thiserror::Error;

/// Errors that can occur while loading the template configuration or layout
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to parse template configuration: {0}")]
    Json(#[from] serde_json::Error),

    #[error("failed to parse layout TOML: {0}")]
    Toml(#[from] toml::de::Error),
}

impl ConfigError {
    /// Format the error with source context using ariadne
    ///
    /// Only JSON syntax errors carry a position; everything else falls back
    /// to the plain message.
    pub fn format(&self, source: &str, filename: &str) -> String {
        let ConfigError::Json(err) = self else {
            return self.to_string();
        };
        if err.line() == 0 {
            return self.to_string();
        }

        let offset = line_column_offset(source, err.line(), err.column());
        let span = offset..(offset + 1).min(source.len()).max(offset);
        let mut buf = Vec::new();
        let written = Report::build(ReportKind::Error, filename, offset)
            .with_config(Config::default().with_color(false))
            .with_message("invalid template configuration")
            .with_label(
                Label::new((filename, span))
                    .with_message(err.to_string())
                    .with_color(Color::Red),
            )
            .finish()
            .write((filename, Source::from(source)), &mut buf);

        match written {
            Ok(()) => String::from_utf8_lossy(&buf).into_owned(),
            Err(_) => self.to_string(),
        }
    }
}

/// A template file could not be read
#[derive(Debug, Error)]
#[error("cannot read template {path}: {source}")]
pub struct SourceError {
    pub path: PathBuf,
    #[source]
    pub source: io::Error,
}

/// Errors that stop a generation run
#[derive(Debug, Error)]
pub enum GenerateError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Source(#[from] SourceError),

    #[error("failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Byte offset of a 1-based line/column pair
fn line_column_offset(source: &str, line: usize, column: usize) -> usize {
    let line_start: usize = source
        .split_inclusive('\n')
        .take(line.saturating_sub(1))
        .map(str::len)
        .sum();
    (line_start + column.saturating_sub(1)).min(source.len())
}

//! Template loading

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use crate::error::SourceError;

/// Something that can hand out template text by path
pub trait TemplateSource {
    fn load(&self, path: &Path) -> Result<String, SourceError>;
}

impl<S: TemplateSource + ?Sized> TemplateSource for &S {
    fn load(&self, path: &Path) -> Result<String, SourceError> {
        (**self).load(path)
    }
}

/// Reads templates from disk
///
/// Files that are not valid UTF-8 are decoded as Latin-1, which accepts any
/// byte sequence.
#[derive(Debug, Clone, Copy, Default)]
pub struct FsSource;

impl TemplateSource for FsSource {
    fn load(&self, path: &Path) -> Result<String, SourceError> {
        let bytes = std::fs::read(path).map_err(|source| SourceError {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(decode(bytes))
    }
}

fn decode(bytes: Vec<u8>) -> String {
    match String::from_utf8(bytes) {
        Ok(mut text) => {
            if text.starts_with('\u{feff}') {
                text.drain(..'\u{feff}'.len_utf8());
            }
            text
        }
        Err(err) => err.into_bytes().into_iter().map(char::from).collect(),
    }
}

/// Templates held in memory, keyed by path
#[derive(Debug, Clone, Default)]
pub struct MemorySource {
    files: HashMap<PathBuf, String>,
}

impl MemorySource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a template, builder style
    pub fn with_file(mut self, path: impl Into<PathBuf>, content: impl Into<String>) -> Self {
        self.insert(path, content);
        self
    }

    pub fn insert(&mut self, path: impl Into<PathBuf>, content: impl Into<String>) {
        self.files.insert(path.into(), content.into());
    }
}

impl TemplateSource for MemorySource {
    fn load(&self, path: &Path) -> Result<String, SourceError> {
        self.files.get(path).cloned().ok_or_else(|| SourceError {
            path: path.to_path_buf(),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "no such template"),
        })
    }
}

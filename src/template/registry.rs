//! Fragment store and header registry
//!
//! Both are loaded once from the template configuration and stay read-only
//! for the rest of the run.

use std::collections::{BTreeMap, HashMap};

use serde::Deserialize;

/// Named blocks of literal output lines
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(transparent)]
pub struct FragmentStore {
    fragments: HashMap<String, Vec<String>>,
}

impl FragmentStore {
    /// Get the lines of a fragment
    pub fn get(&self, name: &str) -> Option<&[String]> {
        self.fragments.get(name).map(Vec::as_slice)
    }

    /// Get a fragment's lines joined with newlines
    pub fn joined(&self, name: &str) -> Option<String> {
        self.get(name).map(|lines| lines.join("\n"))
    }
}

impl<N, L> FromIterator<(N, Vec<L>)> for FragmentStore
where
    N: Into<String>,
    L: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (N, Vec<L>)>>(iter: I) -> Self {
        Self {
            fragments: iter
                .into_iter()
                .map(|(name, lines)| (name.into(), lines.into_iter().map(Into::into).collect()))
                .collect(),
        }
    }
}

/// Symbolic header names mapped to the template file defining them
///
/// Iteration is ordered by symbolic name so that generation runs are
/// reproducible.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(transparent)]
pub struct HeaderRegistry {
    headers: BTreeMap<String, String>,
}

impl HeaderRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the template file name of a header
    pub fn get(&self, name: &str) -> Option<&str> {
        self.headers.get(name).map(String::as_str)
    }

    /// Check if a header exists
    pub fn contains(&self, name: &str) -> bool {
        self.headers.contains_key(name)
    }

    /// Iterate over `(symbolic name, template file)` pairs
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.headers
            .iter()
            .map(|(name, template)| (name.as_str(), template.as_str()))
    }

    pub fn len(&self) -> usize {
        self.headers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.headers.is_empty()
    }
}

impl<N, T> FromIterator<(N, T)> for HeaderRegistry
where
    N: Into<String>,
    T: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (N, T)>>(iter: I) -> Self {
        Self {
            headers: iter
                .into_iter()
                .map(|(name, template)| (name.into(), template.into()))
                .collect(),
        }
    }
}

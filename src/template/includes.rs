//! Standard includes elided from the aggregate header

use std::collections::BTreeSet;

/// Standard-include spellings captured during the modular pass
///
/// Ordering and deduplication come from the set itself, so the lines handed
/// to the uber pass are always sorted and unique.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IncludeSet {
    spellings: BTreeSet<String>,
}

impl IncludeSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a spelling such as `<vector>`; returns false if already present
    pub fn insert(&mut self, spelling: impl Into<String>) -> bool {
        self.spellings.insert(spelling.into())
    }

    pub fn contains(&self, spelling: &str) -> bool {
        self.spellings.contains(spelling)
    }

    pub fn len(&self) -> usize {
        self.spellings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.spellings.is_empty()
    }

    /// Materialize as the lines of the synthetic includes fragment
    pub fn to_lines(&self) -> Vec<String> {
        self.spellings.iter().cloned().collect()
    }
}

impl<S: Into<String>> FromIterator<S> for IncludeSet {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self {
            spellings: iter.into_iter().map(Into::into).collect(),
        }
    }
}

impl<S: Into<String>> Extend<S> for IncludeSet {
    fn extend<I: IntoIterator<Item = S>>(&mut self, iter: I) {
        self.spellings.extend(iter.into_iter().map(Into::into));
    }
}

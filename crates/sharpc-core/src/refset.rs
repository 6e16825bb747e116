//! The ordered, deduplicated set of assembly references for one build.

use std::path::{Path, PathBuf};

/// Whether two reference paths denote the same assembly.
///
/// Identity is the file-name component alone, compared ASCII
/// case-insensitively; directories never participate. This is the sole
/// deduplication predicate in the pipeline -- the same logical assembly is
/// routinely referenced from different directories during resolution, so
/// full-path equality would let duplicates through.
pub fn same_assembly(a: &Path, b: &Path) -> bool {
    match (a.file_name(), b.file_name()) {
        (Some(a), Some(b)) => a
            .to_string_lossy()
            .eq_ignore_ascii_case(&b.to_string_lossy()),
        _ => false,
    }
}

/// Ordered collection of assembly reference paths with no duplicate
/// identities.
///
/// Insertion order is preserved: it determines both the order references
/// are handed to the compiler and the order they are staged next to the
/// output binary. Grows monotonically; `add_if_absent` is the only
/// mutation path.
#[derive(Debug, Clone, Default)]
pub struct ReferenceSet {
    entries: Vec<PathBuf>,
}

impl ReferenceSet {
    /// An empty set.
    pub fn new() -> Self {
        Self::default()
    }

    /// True iff some member matches `candidate` under [`same_assembly`].
    pub fn contains(&self, candidate: &Path) -> bool {
        self.entries.iter().any(|e| same_assembly(e, candidate))
    }

    /// Append `candidate` unless an assembly of the same identity is
    /// already present. Returns whether the set grew.
    pub fn add_if_absent(&mut self, candidate: impl Into<PathBuf>) -> bool {
        let candidate = candidate.into();
        if self.contains(&candidate) {
            return false;
        }
        self.entries.push(candidate);
        true
    }

    /// Snapshot of the members in insertion order.
    pub fn as_slice(&self) -> &[PathBuf] {
        &self.entries
    }

    /// Iterate members in insertion order.
    pub fn iter(&self) -> std::slice::Iter<'_, PathBuf> {
        self.entries.iter()
    }

    /// Number of members.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True iff the set has no members.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<'a> IntoIterator for &'a ReferenceSet {
    type Item = &'a PathBuf;
    type IntoIter = std::slice::Iter<'a, PathBuf>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

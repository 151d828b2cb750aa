//! Diff calculation between ISBN snapshots.
//!
//! Computes which identifiers in the current coverage list were not present
//! in the previous run, so only those are fetched and classified.

use std::collections::HashSet;

/// Result of comparing a previous and current ISBN snapshot.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SnapshotDiff {
    /// Identifiers in `current` but not in `previous`, in first-occurrence
    /// order and without repeats
    pub added: Vec<String>,
    /// True when there was no previous snapshot to compare against
    pub first_run: bool,
}

impl SnapshotDiff {
    /// Check if there are any new identifiers.
    pub fn has_changes(&self) -> bool {
        !self.added.is_empty()
    }
}

/// Calculator for computing diffs between ISBN snapshots.
#[derive(Debug, Clone, Default)]
pub struct IsbnDiffEngine;

impl IsbnDiffEngine {
    pub fn new() -> Self {
        Self
    }

    /// Calculate the diff between previous and current snapshots.
    pub fn calculate(&self, previous: &[String], current: &[String]) -> SnapshotDiff {
        let known: HashSet<&str> = previous.iter().map(String::as_str).collect();
        SnapshotDiff {
            added: new_isbns(&known, current),
            first_run: previous.is_empty(),
        }
    }

    /// Snapshot to persist after a run: the previous snapshot followed by the
    /// newly added identifiers. Identifiers are never dropped once seen.
    pub fn merged(&self, previous: &[String], diff: &SnapshotDiff) -> Vec<String> {
        let mut merged = Vec::with_capacity(previous.len() + diff.added.len());
        merged.extend_from_slice(previous);
        merged.extend(diff.added.iter().cloned());
        merged
    }
}

/// Identifiers of `current` not contained in `previous`, preserving order.
/// An identifier listed more than once in `current` is returned once.
pub fn new_isbns(previous: &HashSet<&str>, current: &[String]) -> Vec<String> {
    let mut seen: HashSet<&str> = HashSet::new();
    current
        .iter()
        .filter(|isbn| !previous.contains(isbn.as_str()) && seen.insert(isbn.as_str()))
        .cloned()
        .collect()
}

/// Convenience function to calculate diff.
pub fn calculate_diff(previous: &[String], current: &[String]) -> SnapshotDiff {
    IsbnDiffEngine::new().calculate(previous, current)
}

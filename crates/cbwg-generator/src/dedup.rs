//! Shared set of candidates already emitted during a run.

use dashmap::DashSet;

/// Concurrent "first writer wins" set keyed by the raw candidate.
///
/// Sharded by hash, so workers inserting different candidates rarely
/// contend. Lives for the duration of one run.
#[derive(Debug, Default)]
pub struct DedupSet {
    seen: DashSet<String>,
}

impl DedupSet {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert `candidate`, returning `true` only for the first insertion of
    /// this value. Concurrent callers racing on the same value see exactly
    /// one `true`.
    pub fn insert(&self, candidate: &str) -> bool {
        // Read-locked probe before allocating the owned key.
        if self.seen.contains(candidate) {
            return false;
        }
        self.seen.insert(candidate.to_owned())
    }

    /// Number of distinct candidates seen.
    #[must_use]
    pub fn len(&self) -> usize {
        self.seen.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.seen.is_empty()
    }
}

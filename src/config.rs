//! Tree configuration.
//!
//! The only tunable is the threshold `t` (minimum degree). It is fixed for the
//! lifetime of a tree and bounds every node to `2t - 1` entries and `2t`
//! children.

use crate::error::{Error, Result};

/// Threshold used by [`TreeConfig::default`].
pub const DEFAULT_THRESHOLD: usize = 6;

/// Construction parameters for an [`OrderedTree`](crate::OrderedTree).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TreeConfig {
    threshold: usize,
}

impl TreeConfig {
    pub const fn new() -> Self {
        Self {
            threshold: DEFAULT_THRESHOLD,
        }
    }

    pub const fn with_threshold(mut self, threshold: usize) -> Self {
        self.threshold = threshold;
        self
    }

    #[inline]
    pub const fn threshold(&self) -> usize {
        self.threshold
    }

    /// Rejects thresholds below 1.
    ///
    /// `t = 1` is accepted: nodes then hold a single entry and a split may
    /// leave one sibling empty. Use `t >= 2` for meaningful branching.
    pub fn validate(&self) -> Result<()> {
        if self.threshold < 1 {
            return Err(Error::invalid_argument(
                "threshold",
                format!("must be at least 1, got {}", self.threshold),
            ));
        }
        // 2t children must stay addressable.
        if self.threshold > usize::MAX / 2 {
            return Err(Error::invalid_argument(
                "threshold",
                format!("{} overflows the node capacity", self.threshold),
            ));
        }
        Ok(())
    }

    /// Maximum number of entries a settled node may hold (`2t - 1`).
    #[inline]
    pub const fn max_entries(&self) -> usize {
        self.threshold.saturating_mul(2).saturating_sub(1)
    }

    /// Maximum number of children of an internal node (`2t`).
    #[inline]
    pub const fn max_children(&self) -> usize {
        self.threshold.saturating_mul(2)
    }

    /// Whether a node holding `len` entries must be split.
    #[inline]
    pub const fn overflows(&self, len: usize) -> bool {
        len > self.max_entries()
    }
}

impl Default for TreeConfig {
    fn default() -> Self {
        Self::new()
    }
}

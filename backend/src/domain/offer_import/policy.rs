//! Skip policy and skip accounting for the import pipeline.
//!
//! This module contains the adapter-agnostic decision logic for:
//! - classifying failures into the closed import error taxonomy;
//! - counting skips against the configured limit.

use std::collections::BTreeSet;

use super::{RecordError, RecordErrorKind};

/// Closed classification of everything that can end a read, process, or
/// write step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImportErrorCategory {
    /// Per-record failure on the skip allow-list.
    RecoverableParse,
    /// Chunk commit failure; always fatal.
    Write,
    /// The input has no more records; normal termination.
    SourceExhausted,
    /// Anything else; always fatal.
    Unclassified,
}

/// Which record failures may be skipped, and how many.
///
/// # Examples
/// ```
/// use std::collections::BTreeSet;
/// use restaurant_backend::domain::offer_import::{RecordErrorKind, SkipPolicy};
///
/// let policy = SkipPolicy::new(1)
///     .with_skippable(BTreeSet::from([RecordErrorKind::IncorrectTokenCount]));
/// assert!(policy.is_skippable(RecordErrorKind::IncorrectTokenCount));
/// assert!(!policy.is_skippable(RecordErrorKind::InvalidField));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkipPolicy {
    skip_limit: u64,
    skippable: BTreeSet<RecordErrorKind>,
}

impl SkipPolicy {
    /// Allow up to `skip_limit` skips of every record error kind.
    pub fn new(skip_limit: u64) -> Self {
        Self {
            skip_limit,
            skippable: BTreeSet::from([
                RecordErrorKind::IncorrectTokenCount,
                RecordErrorKind::MalformedLine,
                RecordErrorKind::InvalidField,
            ]),
        }
    }

    /// Replace the skip allow-list.
    pub fn with_skippable(mut self, skippable: BTreeSet<RecordErrorKind>) -> Self {
        self.skippable = skippable;
        self
    }

    /// Maximum tolerated skips.
    pub fn skip_limit(&self) -> u64 {
        self.skip_limit
    }

    /// Whether failures of `kind` may be skipped.
    pub fn is_skippable(&self, kind: RecordErrorKind) -> bool {
        self.skippable.contains(&kind)
    }

    /// Classify a per-record failure.
    pub fn classify(&self, error: &RecordError) -> ImportErrorCategory {
        if self.is_skippable(error.kind()) {
            ImportErrorCategory::RecoverableParse
        } else {
            ImportErrorCategory::Unclassified
        }
    }
}

impl Default for SkipPolicy {
    fn default() -> Self {
        Self::new(1)
    }
}

/// Outcome of counting one more skip.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipDecision {
    /// The skip fits within the limit.
    Absorbed,
    /// The skip pushed the count past the limit.
    LimitExceeded,
}

/// Mutable skip counter owned by one job execution.
#[derive(Debug, Clone)]
pub struct SkipAccounting {
    skip_limit: u64,
    skip_count: u64,
}

impl SkipAccounting {
    /// Start counting against `skip_limit`.
    pub fn new(skip_limit: u64) -> Self {
        Self {
            skip_limit,
            skip_count: 0,
        }
    }

    /// Count one skip.
    ///
    /// ```
    /// use restaurant_backend::domain::offer_import::{SkipAccounting, SkipDecision};
    ///
    /// let mut accounting = SkipAccounting::new(1);
    /// assert_eq!(accounting.record_skip(), SkipDecision::Absorbed);
    /// assert_eq!(accounting.record_skip(), SkipDecision::LimitExceeded);
    /// ```
    pub fn record_skip(&mut self) -> SkipDecision {
        self.skip_count = self.skip_count.saturating_add(1);
        if self.skip_count > self.skip_limit {
            SkipDecision::LimitExceeded
        } else {
            SkipDecision::Absorbed
        }
    }

    /// Skips counted so far, including one that exceeded the limit.
    pub fn skip_count(&self) -> u64 {
        self.skip_count
    }
}

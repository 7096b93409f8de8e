//! Tagged outcome of one pipeline phase for one record.

use super::{JobFailure, RecordError};

/// Result of reading, converting, or writing.
///
/// Skip-vs-fatal dispatch happens on this value instead of on error types.
#[derive(Debug)]
pub(crate) enum PhaseOutcome<T> {
    /// The phase produced a value.
    Continue(T),
    /// The record failed in a way the skip policy may absorb.
    Skip(RecordError),
    /// The job cannot continue.
    Fatal(JobFailure),
}

//! Driven port notified about every skipped record.

use tracing::warn;

use crate::domain::offer_import::SkipRecord;

/// Audit hook receiving skipped records in input order.
#[cfg_attr(test, mockall::automock)]
pub trait SkipListener: Send + Sync {
    /// Observe one skip. The pipeline ignores anything the listener does.
    fn on_skip(&self, skip: &SkipRecord);
}

/// Listener writing each skip to the `tracing` log at warning level.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingSkipListener;

impl SkipListener for TracingSkipListener {
    fn on_skip(&self, skip: &SkipRecord) {
        warn!(
            line = skip.line_number,
            phase = ?skip.phase,
            error = %skip.error,
            input = %skip.input,
            "offer record skipped"
        );
    }
}

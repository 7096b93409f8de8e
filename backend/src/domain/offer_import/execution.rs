//! Job execution status, skip log, and summary.

use std::path::PathBuf;

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use super::{ImportErrorCategory, RecordError};

/// Lifecycle of one import execution.
///
/// Transitions only leave `Running`; every other state is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum JobExecutionState {
    /// Chunks are being read and committed.
    Running,
    /// Input exhausted within the skip limit.
    CompletedSuccessfully,
    /// More records were skipped than the policy tolerates.
    FailedDueToSkipLimitExceeded,
    /// A non-skippable error stopped the job.
    FailedFatal,
    /// Cancellation was requested between chunks.
    Stopped,
}

impl JobExecutionState {
    /// Whether no further transition is possible.
    pub fn is_terminal(self) -> bool {
        !matches!(self, Self::Running)
    }
}

/// Pipeline phase a record failed in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SkipPhase {
    /// Reading and tokenising the line.
    Read,
    /// Converting the raw record into an offer.
    Process,
    /// Writing the chunk. Writes are never skip-eligible.
    Write,
}

/// One skipped input line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SkipRecord {
    /// 1-based physical line number.
    pub line_number: u64,
    /// The offending line as read.
    pub input: String,
    /// Phase that rejected the line.
    pub phase: SkipPhase,
    /// Why the line was rejected.
    pub error: RecordError,
}

/// Why a job ended in a failure state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, thiserror::Error)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum JobFailure {
    /// The skip that pushed the count past the limit.
    #[error("skip limit {skip_limit} exceeded at line {line_number} ({phase:?}): {error}")]
    SkipLimitExceeded {
        /// Configured limit.
        skip_limit: u64,
        /// Line of the skip that exceeded the limit.
        line_number: u64,
        /// Phase of that skip.
        phase: SkipPhase,
        /// Its record error.
        error: RecordError,
    },
    /// A record error outside the skip allow-list.
    #[error("unclassified record error at line {line_number}: {error}")]
    Unclassified {
        /// Offending line.
        line_number: u64,
        /// Record error.
        error: RecordError,
    },
    /// The input could not be opened or read.
    #[error("input source failed: {message}")]
    Source {
        /// Source diagnostic.
        message: String,
    },
    /// A chunk commit failed.
    #[error("writing chunk {chunk} failed: {message}")]
    Write {
        /// 1-based chunk number.
        chunk: u64,
        /// Sink diagnostic.
        message: String,
    },
}

impl JobFailure {
    /// Position of this failure in the import error taxonomy.
    pub fn category(&self) -> ImportErrorCategory {
        match self {
            Self::SkipLimitExceeded { .. } => ImportErrorCategory::RecoverableParse,
            Self::Write { .. } => ImportErrorCategory::Write,
            Self::Unclassified { .. } | Self::Source { .. } => ImportErrorCategory::Unclassified,
        }
    }
}

/// Identity of one launch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobLaunch {
    /// Logical job name.
    pub job_name: String,
    /// Per-job launch counter.
    pub run_id: u64,
    /// Input file.
    pub input_path: PathBuf,
}

/// Summary of one import execution.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct JobExecution {
    /// Unique id of this execution.
    pub execution_id: Uuid,
    /// Logical job name.
    pub job_name: String,
    /// Per-job launch counter.
    pub run_id: u64,
    /// Current or final state.
    pub state: JobExecutionState,
    /// Records read without a read-phase error.
    pub read_count: u64,
    /// Offers committed to the sink.
    pub write_count: u64,
    /// Chunks committed to the sink.
    pub commit_count: u64,
    /// Skipped lines in input order.
    pub skips: Vec<SkipRecord>,
    /// Failure cause for failed states.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub failure: Option<JobFailure>,
    /// Start timestamp.
    pub started_at: DateTime<Utc>,
    /// End timestamp, set once terminal.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub finished_at: Option<DateTime<Utc>>,
}

impl JobExecution {
    pub(crate) fn start(launch: &JobLaunch, started_at: DateTime<Utc>) -> Self {
        Self {
            execution_id: Uuid::new_v4(),
            job_name: launch.job_name.clone(),
            run_id: launch.run_id,
            state: JobExecutionState::Running,
            read_count: 0,
            write_count: 0,
            commit_count: 0,
            skips: Vec::new(),
            failure: None,
            started_at,
            finished_at: None,
        }
    }

    /// Number of recorded skips.
    pub fn skip_count(&self) -> usize {
        self.skips.len()
    }

    /// Skips recorded in `phase`.
    pub fn skips_in(&self, phase: SkipPhase) -> impl Iterator<Item = &SkipRecord> {
        self.skips.iter().filter(move |skip| skip.phase == phase)
    }

    pub(crate) fn finish(
        &mut self,
        state: JobExecutionState,
        failure: Option<JobFailure>,
        finished_at: DateTime<Utc>,
    ) {
        if self.state.is_terminal() {
            return;
        }
        self.state = state;
        self.failure = failure;
        self.finished_at = Some(finished_at);
    }
}

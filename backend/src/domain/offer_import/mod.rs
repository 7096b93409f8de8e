//! Fault-tolerant chunked offer import.
//!
//! The job owns chunk sequencing (read, process, write), skip accounting
//! against the configured policy, and the execution summary. Chunks run
//! strictly in input order; a chunk is committed only after every record in
//! it was read and processed, and the next chunk starts only once that commit
//! resolved.

use std::sync::Arc;

use mockable::Clock;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info};

use crate::domain::ports::{
    OfferLineReader, OfferLineSource, OfferSink, OfferSourceError, SkipListener, SourceLine,
};
use crate::domain::{OFFER_FIELD_NAMES, Offer, OfferCsv};

mod config;
mod execution;
mod phase;
mod policy;
mod record_error;
mod tokenizer;

pub use config::ImportJobConfig;
pub use execution::{
    JobExecution, JobExecutionState, JobFailure, JobLaunch, SkipPhase, SkipRecord,
};
use phase::PhaseOutcome;
pub use policy::{ImportErrorCategory, SkipAccounting, SkipDecision, SkipPolicy};
pub use record_error::{RecordError, RecordErrorKind};
pub use tokenizer::DelimitedLineTokenizer;

/// Port bundle required by the import job.
#[derive(Clone)]
pub struct OfferImportPorts {
    /// Input adapter.
    pub source: Arc<dyn OfferLineSource>,
    /// Chunk commit adapter.
    pub sink: Arc<dyn OfferSink>,
    /// Skip audit hook.
    pub skip_listener: Arc<dyn SkipListener>,
}

impl OfferImportPorts {
    /// Build a strongly-typed port bundle.
    pub fn new(
        source: Arc<dyn OfferLineSource>,
        sink: Arc<dyn OfferSink>,
        skip_listener: Arc<dyn SkipListener>,
    ) -> Self {
        Self {
            source,
            sink,
            skip_listener,
        }
    }
}

/// Domain-owned offer import job.
pub struct OfferImportJob {
    source: Arc<dyn OfferLineSource>,
    sink: Arc<dyn OfferSink>,
    skip_listener: Arc<dyn SkipListener>,
    clock: Arc<dyn Clock>,
    config: ImportJobConfig,
}

/// Terminal interruption of the chunk loop.
struct Abort {
    state: JobExecutionState,
    failure: JobFailure,
}

impl Abort {
    fn fatal(failure: JobFailure) -> Self {
        Self {
            state: JobExecutionState::FailedFatal,
            failure,
        }
    }
}

enum ChunkProgress {
    More,
    Exhausted,
}

/// Per-execution mutable state: the open reader and the skip counter.
struct StepState {
    reader: Box<dyn OfferLineReader>,
    accounting: SkipAccounting,
    header_lines_remaining: usize,
    chunks_started: u64,
}

impl OfferImportJob {
    /// Build a job from its collaborators.
    /// ```rust,ignore
    /// let job = OfferImportJob::new(ports, Arc::new(DefaultClock), ImportJobConfig::default());
    /// ```
    pub fn new(ports: OfferImportPorts, clock: Arc<dyn Clock>, config: ImportJobConfig) -> Self {
        Self {
            source: ports.source,
            sink: ports.sink,
            skip_listener: ports.skip_listener,
            clock,
            config,
        }
    }

    /// Job configuration.
    pub fn config(&self) -> &ImportJobConfig {
        &self.config
    }

    /// Run one execution to a terminal state.
    ///
    /// `cancel` is honoured between chunks only, so a committed chunk is
    /// never rolled back and an in-flight chunk always resolves.
    /// ```rust,ignore
    /// let execution = job.run(&launch, &CancellationToken::new()).await;
    /// assert!(execution.state.is_terminal());
    /// ```
    pub async fn run(&self, launch: &JobLaunch, cancel: &CancellationToken) -> JobExecution {
        let mut execution = JobExecution::start(launch, self.clock.utc());
        info!(
            job = %launch.job_name,
            run_id = launch.run_id,
            input = %launch.input_path.display(),
            "offer import started"
        );

        let outcome = match self.source.open(&launch.input_path).await {
            Ok(reader) => {
                let mut step = StepState {
                    reader,
                    accounting: SkipAccounting::new(self.config.skip_policy().skip_limit()),
                    header_lines_remaining: self.config.lines_to_skip(),
                    chunks_started: 0,
                };
                self.execute_step(&mut step, &mut execution, cancel).await
            }
            Err(error) => Err(Abort::fatal(source_failure(&error))),
        };

        let (state, failure) = match outcome {
            Ok(state) => (state, None),
            Err(abort) => (abort.state, Some(abort.failure)),
        };
        execution.finish(state, failure, self.clock.utc());
        log_outcome(&execution);
        execution
    }

    async fn execute_step(
        &self,
        step: &mut StepState,
        execution: &mut JobExecution,
        cancel: &CancellationToken,
    ) -> Result<JobExecutionState, Abort> {
        loop {
            if cancel.is_cancelled() {
                info!(
                    job = %execution.job_name,
                    run_id = execution.run_id,
                    committed_chunks = execution.commit_count,
                    "offer import stop requested"
                );
                return Ok(JobExecutionState::Stopped);
            }
            match self.execute_chunk(step, execution).await? {
                ChunkProgress::More => {}
                ChunkProgress::Exhausted => return Ok(JobExecutionState::CompletedSuccessfully),
            }
        }
    }

    async fn execute_chunk(
        &self,
        step: &mut StepState,
        execution: &mut JobExecution,
    ) -> Result<ChunkProgress, Abort> {
        step.chunks_started = step.chunks_started.saturating_add(1);
        let chunk = step.chunks_started;
        let chunk_size = self.config.chunk_size().get();
        let mut offers = Vec::with_capacity(chunk_size);
        let mut drawn = 0_usize;
        let mut progress = ChunkProgress::More;

        while drawn < chunk_size {
            let Some(line) = self.next_line(step).await? else {
                progress = ChunkProgress::Exhausted;
                break;
            };

            let raw = match self.read_phase(&line) {
                PhaseOutcome::Continue(raw) => raw,
                PhaseOutcome::Skip(error) => {
                    self.register_skip(step, execution, line, SkipPhase::Read, error)?;
                    continue;
                }
                PhaseOutcome::Fatal(failure) => return Err(Abort::fatal(failure)),
            };
            drawn += 1;
            execution.read_count = execution.read_count.saturating_add(1);

            match self.process_phase(line.line_number, &raw) {
                PhaseOutcome::Continue(offer) => offers.push(offer),
                PhaseOutcome::Skip(error) => {
                    self.register_skip(step, execution, line, SkipPhase::Process, error)?;
                }
                PhaseOutcome::Fatal(failure) => return Err(Abort::fatal(failure)),
            }
        }

        if !offers.is_empty() {
            self.write_phase(chunk, &offers).await?;
            let written = u64::try_from(offers.len()).unwrap_or(u64::MAX);
            execution.write_count = execution.write_count.saturating_add(written);
            execution.commit_count = execution.commit_count.saturating_add(1);
        }
        Ok(progress)
    }

    async fn next_line(&self, step: &mut StepState) -> Result<Option<SourceLine>, Abort> {
        loop {
            let Some(line) = step
                .reader
                .next_line()
                .await
                .map_err(|error| Abort::fatal(source_failure(&error)))?
            else {
                return Ok(None);
            };
            if step.header_lines_remaining > 0 {
                step.header_lines_remaining -= 1;
                continue;
            }
            if let Some(prefix) = self.config.comment_prefix() {
                if line.text.starts_with(prefix) {
                    continue;
                }
            }
            return Ok(Some(line));
        }
    }

    fn read_phase(&self, line: &SourceLine) -> PhaseOutcome<OfferCsv> {
        let mapped = self
            .config
            .tokenizer()
            .tokenize(&line.text)
            .and_then(|tokens| {
                let actual = tokens.len();
                OfferCsv::from_tokens(tokens).ok_or(RecordError::IncorrectTokenCount {
                    expected: OFFER_FIELD_NAMES.len(),
                    actual,
                })
            });
        self.classify(line.line_number, mapped)
    }

    fn process_phase(&self, line_number: u64, raw: &OfferCsv) -> PhaseOutcome<Offer> {
        let converted = Offer::try_from(raw).map_err(RecordError::from);
        self.classify(line_number, converted)
    }

    async fn write_phase(&self, chunk: u64, offers: &[Offer]) -> Result<(), Abort> {
        self.sink.write_chunk(offers).await.map_err(|error| {
            Abort::fatal(JobFailure::Write {
                chunk,
                message: error.to_string(),
            })
        })?;
        debug!(chunk, offers = offers.len(), "offer chunk committed");
        Ok(())
    }

    fn classify<T>(&self, line_number: u64, result: Result<T, RecordError>) -> PhaseOutcome<T> {
        match result {
            Ok(value) => PhaseOutcome::Continue(value),
            Err(error) => match self.config.skip_policy().classify(&error) {
                ImportErrorCategory::RecoverableParse => PhaseOutcome::Skip(error),
                ImportErrorCategory::Write
                | ImportErrorCategory::SourceExhausted
                | ImportErrorCategory::Unclassified => {
                    PhaseOutcome::Fatal(JobFailure::Unclassified { line_number, error })
                }
            },
        }
    }

    fn register_skip(
        &self,
        step: &mut StepState,
        execution: &mut JobExecution,
        line: SourceLine,
        phase: SkipPhase,
        error: RecordError,
    ) -> Result<(), Abort> {
        match step.accounting.record_skip() {
            SkipDecision::Absorbed => {
                let skip = SkipRecord {
                    line_number: line.line_number,
                    input: line.text,
                    phase,
                    error,
                };
                self.skip_listener.on_skip(&skip);
                execution.skips.push(skip);
                Ok(())
            }
            SkipDecision::LimitExceeded => Err(Abort {
                state: JobExecutionState::FailedDueToSkipLimitExceeded,
                failure: JobFailure::SkipLimitExceeded {
                    skip_limit: self.config.skip_policy().skip_limit(),
                    line_number: line.line_number,
                    phase,
                    error,
                },
            }),
        }
    }
}

fn source_failure(error: &OfferSourceError) -> JobFailure {
    JobFailure::Source {
        message: error.to_string(),
    }
}

fn log_outcome(execution: &JobExecution) {
    match &execution.failure {
        None => info!(
            job = %execution.job_name,
            run_id = execution.run_id,
            state = ?execution.state,
            read = execution.read_count,
            written = execution.write_count,
            skipped = execution.skip_count(),
            "offer import finished"
        ),
        Some(failure) => error!(
            job = %execution.job_name,
            run_id = execution.run_id,
            state = ?execution.state,
            written = execution.write_count,
            skipped = execution.skip_count(),
            error = %failure,
            "offer import failed"
        ),
    }
}

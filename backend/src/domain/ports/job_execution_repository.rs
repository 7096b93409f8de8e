//! Driven port storing import executions and allocating run ids.

use async_trait::async_trait;

use super::define_port_error;
use crate::domain::offer_import::JobExecution;

define_port_error! {
    /// Errors raised by job execution persistence.
    pub enum JobExecutionRepositoryError {
        /// The repository could not be reached.
        Connection { message: String } =>
            "job repository connection failed: {message}",
        /// The execution conflicts with a stored one.
        Conflict { message: String } =>
            "job repository conflict: {message}",
    }
}

/// Port for job execution bookkeeping.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait JobExecutionRepository: Send + Sync {
    /// Allocate the next run id for `job_name`, starting at 1.
    async fn next_run_id(&self, job_name: &str) -> Result<u64, JobExecutionRepositoryError>;

    /// Store a finished execution.
    async fn save(&self, execution: &JobExecution) -> Result<(), JobExecutionRepositoryError>;

    /// Most recently saved execution of `job_name`.
    async fn find_latest(
        &self,
        job_name: &str,
    ) -> Result<Option<JobExecution>, JobExecutionRepositoryError>;
}

/// Fixture repository that always hands out run id 1 and stores nothing.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureJobExecutionRepository;

#[async_trait]
impl JobExecutionRepository for FixtureJobExecutionRepository {
    async fn next_run_id(&self, _job_name: &str) -> Result<u64, JobExecutionRepositoryError> {
        Ok(1)
    }

    async fn save(&self, _execution: &JobExecution) -> Result<(), JobExecutionRepositoryError> {
        Ok(())
    }

    async fn find_latest(
        &self,
        _job_name: &str,
    ) -> Result<Option<JobExecution>, JobExecutionRepositoryError> {
        Ok(None)
    }
}

//! Job execution repository kept in process memory.

use std::collections::{BTreeMap, HashMap};
use std::sync::{Mutex, PoisonError};

use async_trait::async_trait;

use crate::domain::offer_import::JobExecution;
use crate::domain::ports::{JobExecutionRepository, JobExecutionRepositoryError};

#[derive(Debug, Default)]
struct JobRecords {
    last_run_id: u64,
    executions: BTreeMap<u64, JobExecution>,
}

/// In-memory [`JobExecutionRepository`].
///
/// Run ids are allocated per job name starting at 1. Executions may be saved
/// in any order, since concurrent launches of one job finish independently.
/// Saving a run id that is already recorded for that job is a conflict.
#[derive(Debug, Default)]
pub struct InMemoryJobExecutionRepository {
    jobs: Mutex<HashMap<String, JobRecords>>,
}

impl InMemoryJobExecutionRepository {
    /// Empty repository.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl JobExecutionRepository for InMemoryJobExecutionRepository {
    async fn next_run_id(&self, job_name: &str) -> Result<u64, JobExecutionRepositoryError> {
        let mut jobs = self.jobs.lock().unwrap_or_else(PoisonError::into_inner);
        let records = jobs.entry(job_name.to_owned()).or_default();
        records.last_run_id = records.last_run_id.checked_add(1).ok_or_else(|| {
            JobExecutionRepositoryError::conflict(format!("run ids exhausted for {job_name}"))
        })?;
        Ok(records.last_run_id)
    }

    async fn save(&self, execution: &JobExecution) -> Result<(), JobExecutionRepositoryError> {
        let mut jobs = self.jobs.lock().unwrap_or_else(PoisonError::into_inner);
        let records = jobs.entry(execution.job_name.clone()).or_default();
        if records.executions.contains_key(&execution.run_id) {
            return Err(JobExecutionRepositoryError::conflict(format!(
                "run {} of {} is already recorded",
                execution.run_id, execution.job_name
            )));
        }
        records.last_run_id = records.last_run_id.max(execution.run_id);
        records
            .executions
            .insert(execution.run_id, execution.clone());
        Ok(())
    }

    async fn find_latest(
        &self,
        job_name: &str,
    ) -> Result<Option<JobExecution>, JobExecutionRepositoryError> {
        let jobs = self.jobs.lock().unwrap_or_else(PoisonError::into_inner);
        Ok(jobs
            .get(job_name)
            .and_then(|records| records.executions.last_key_value())
            .map(|(_, execution)| execution.clone()))
    }
}

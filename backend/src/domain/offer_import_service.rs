//! Offer import command orchestration.
//!
//! Allocates a run id, runs one [`OfferImportJob`] to a terminal state and
//! records the resulting execution. A finished execution is always returned:
//! its chunks are already committed, so a bookkeeping failure is logged
//! rather than reported as a failed launch.

use std::sync::Arc;

use async_trait::async_trait;
use mockable::Clock;
use tokio_util::sync::CancellationToken;
use tracing::error;

use crate::domain::Error;
use crate::domain::offer_import::{JobExecution, JobLaunch, OfferImportJob, OfferImportPorts};
use crate::domain::ports::{
    JobExecutionRepository, JobExecutionRepositoryError, OfferImportCommand, OfferImportRequest,
};

/// Domain service implementing the offer import command.
#[derive(Clone)]
pub struct OfferImportCommandService<R> {
    ports: OfferImportPorts,
    job_repo: Arc<R>,
    clock: Arc<dyn Clock>,
}

impl<R> OfferImportCommandService<R> {
    /// Create a new import service.
    pub fn new(ports: OfferImportPorts, job_repo: Arc<R>, clock: Arc<dyn Clock>) -> Self {
        Self {
            ports,
            job_repo,
            clock,
        }
    }
}

#[async_trait]
impl<R> OfferImportCommand for OfferImportCommandService<R>
where
    R: JobExecutionRepository,
{
    async fn launch(
        &self,
        request: OfferImportRequest,
        cancel: CancellationToken,
    ) -> Result<JobExecution, Error> {
        validate_request(&request)?;

        let run_id = self
            .job_repo
            .next_run_id(&request.job_name)
            .await
            .map_err(map_repository_error)?;
        let launch = JobLaunch {
            job_name: request.job_name,
            run_id,
            input_path: request.input_path,
        };

        let job = OfferImportJob::new(self.ports.clone(), Arc::clone(&self.clock), request.config);
        let execution = job.run(&launch, &cancel).await;

        if let Err(save_error) = self.job_repo.save(&execution).await {
            error!(
                job = %execution.job_name,
                run_id = execution.run_id,
                state = ?execution.state,
                error = %save_error,
                "failed to record offer import execution"
            );
        }
        Ok(execution)
    }
}

fn validate_request(request: &OfferImportRequest) -> Result<(), Error> {
    if request.job_name.trim().is_empty() {
        return Err(Error::invalid_request("jobName must not be empty"));
    }
    if request.input_path.as_os_str().is_empty() {
        return Err(Error::invalid_request("inputPath must not be empty"));
    }
    Ok(())
}

fn map_repository_error(error: JobExecutionRepositoryError) -> Error {
    match error {
        JobExecutionRepositoryError::Connection { message } => {
            Error::service_unavailable(format!("job repository unavailable: {message}"))
        }
        JobExecutionRepositoryError::Conflict { message } => {
            Error::conflict(format!("job execution conflict: {message}"))
        }
    }
}

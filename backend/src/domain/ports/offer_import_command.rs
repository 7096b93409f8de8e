//! Driving port launching one offer import run.

use std::path::PathBuf;

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

use crate::domain::Error;
use crate::domain::offer_import::{ImportJobConfig, JobExecution};

/// Launch parameters for one import run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OfferImportRequest {
    /// Logical job name keying run ids.
    pub job_name: String,
    /// Delimited input file.
    pub input_path: PathBuf,
    /// Chunking, skip, and line handling configuration.
    pub config: ImportJobConfig,
}

/// Driving port for offer imports.
///
/// Job-level failures are reported through [`JobExecution::state`]; `Err` is
/// reserved for invalid requests and unavailable bookkeeping.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait OfferImportCommand: Send + Sync {
    /// Run the import to a terminal state.
    async fn launch(
        &self,
        request: OfferImportRequest,
        cancel: CancellationToken,
    ) -> Result<JobExecution, Error>;
}

//! Import delimited offer files into a JSON Lines store, skipping bad records.
#![cfg_attr(not(any(test, doctest)), deny(clippy::unwrap_used))]
#![cfg_attr(not(any(test, doctest)), deny(clippy::expect_used))]

use std::ffi::OsString;
use std::io;
use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use mockable::DefaultClock;
use ortho_config::OrthoConfig;
use restaurant_backend::config::ImportSettings;
use restaurant_backend::domain::{Error, ErrorCode, OfferImportCommandService};
use restaurant_backend::domain::offer_import::{JobExecutionState, OfferImportPorts};
use restaurant_backend::domain::ports::{
    OfferImportCommand, OfferImportRequest, TracingSkipListener,
};
use restaurant_backend::outbound::{
    FileOfferLineSource, InMemoryJobExecutionRepository, JsonLinesOfferSink,
};
use tokio::runtime::Builder;
use tokio_util::sync::CancellationToken;
use tracing::warn;
use tracing_subscriber::{EnvFilter, fmt};

/// `import-offers` command arguments.
///
/// Flags override the `OFFER_IMPORT_*` settings.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "import-offers",
    about = "Import delimited offer files in chunks, skipping malformed records",
    version
)]
struct CliArgs {
    /// Delimited offer input file.
    #[arg(long = "input", value_name = "path")]
    input: PathBuf,
    /// JSON Lines output file; chunks are appended.
    #[arg(long = "output", value_name = "path")]
    output: PathBuf,
    /// Tolerated number of skipped records.
    #[arg(long = "skip-limit", value_name = "count")]
    skip_limit: Option<u64>,
    /// Records per committed chunk.
    #[arg(long = "chunk-size", value_name = "count")]
    chunk_size: Option<usize>,
    /// Logical job name keying run ids.
    #[arg(long = "job-name", value_name = "name")]
    job_name: Option<String>,
}

impl CliArgs {
    fn apply_to(&self, mut settings: ImportSettings) -> ImportSettings {
        if self.skip_limit.is_some() {
            settings.skip_limit = self.skip_limit;
        }
        if self.chunk_size.is_some() {
            settings.chunk_size = self.chunk_size;
        }
        if self.job_name.is_some() {
            settings.job_name.clone_from(&self.job_name);
        }
        settings
    }
}

fn main() -> io::Result<()> {
    if let Err(error) = fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(io::stderr)
        .json()
        .try_init()
    {
        warn!(error = %error, "tracing init failed");
    }

    let runtime = Builder::new_current_thread()
        .enable_all()
        .build()
        .map_err(|error| io::Error::other(format!("create Tokio runtime: {error}")))?;
    runtime.block_on(async_main())
}

async fn async_main() -> io::Result<()> {
    let args = CliArgs::try_parse().map_err(io::Error::other)?;
    let settings = ImportSettings::load_from_iter([OsString::from("import-offers")])
        .map_err(|error| io::Error::other(format!("load settings: {error}")))?;
    let settings = args.apply_to(settings);
    let config = settings
        .to_job_config()
        .map_err(launch_error)?;

    let ports = OfferImportPorts::new(
        Arc::new(FileOfferLineSource),
        Arc::new(JsonLinesOfferSink::new(args.output.clone())),
        Arc::new(TracingSkipListener),
    );
    let command = OfferImportCommandService::new(
        ports,
        Arc::new(InMemoryJobExecutionRepository::new()),
        Arc::new(DefaultClock),
    );

    let cancel = CancellationToken::new();
    let interrupt = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            interrupt.cancel();
        }
    });

    let request = OfferImportRequest {
        job_name: settings.job_name().to_owned(),
        input_path: args.input,
        config,
    };
    let execution = command
        .launch(request, cancel)
        .await
        .map_err(launch_error)?;

    let summary = serde_json::to_string_pretty(&execution)
        .map_err(|error| io::Error::other(format!("render summary: {error}")))?;
    println!("{summary}");

    exit_status(execution.state)
}

fn launch_error(error: Error) -> io::Error {
    let kind = match error.code() {
        ErrorCode::InvalidRequest => io::ErrorKind::InvalidInput,
        ErrorCode::Conflict => io::ErrorKind::AlreadyExists,
        _ => io::ErrorKind::Other,
    };
    io::Error::new(kind, format!("offer import refused: {}", error.message()))
}

fn exit_status(state: JobExecutionState) -> io::Result<()> {
    match state {
        JobExecutionState::CompletedSuccessfully => Ok(()),
        other => Err(io::Error::other(format!(
            "offer import ended in state {other:?}"
        ))),
    }
}

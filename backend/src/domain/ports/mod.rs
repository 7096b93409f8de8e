//! Domain ports and supporting types for the hexagonal boundary.

mod macros;
pub(crate) use macros::define_port_error;

mod authority_policy;
mod credential_store;
mod job_execution_repository;
mod offer_import_command;
mod offer_sink;
mod offer_source;
mod skip_listener;

#[cfg(test)]
pub use authority_policy::MockAuthorityPolicy;
pub use authority_policy::{AuthorityPolicy, AuthorityPolicyError, FixtureAuthorityPolicy};
#[cfg(test)]
pub use credential_store::MockCredentialStore;
pub use credential_store::{
    CredentialStore, CredentialStoreError, FixtureCredentialStore, StoredCredential,
};
#[cfg(test)]
pub use job_execution_repository::MockJobExecutionRepository;
pub use job_execution_repository::{
    FixtureJobExecutionRepository, JobExecutionRepository, JobExecutionRepositoryError,
};
#[cfg(test)]
pub use offer_import_command::MockOfferImportCommand;
pub use offer_import_command::{OfferImportCommand, OfferImportRequest};
#[cfg(test)]
pub use offer_sink::MockOfferSink;
pub use offer_sink::{FixtureOfferSink, OfferSink, OfferSinkError};
pub use offer_source::{
    FixtureOfferLineSource, OfferLineReader, OfferLineSource, OfferSourceError, SourceLine,
};
#[cfg(test)]
pub use skip_listener::MockSkipListener;
pub use skip_listener::{SkipListener, TracingSkipListener};

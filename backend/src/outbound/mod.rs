//! Outbound adapters implementing domain ports.
//!
//! Adapters are thin translators between domain types and their backing
//! representation. They contain no import or authentication policy:
//!
//! - **file_offer_source**: delimited text files read line by line
//! - **json_lines_offer_sink** / **in_memory_offer_sink**: chunk commits
//! - **in_memory_credential_store**: registered users and password hashes
//! - **access_control_policy**: role and group based authorities
//! - **in_memory_job_repository**: run ids and execution records

mod access_control_policy;
mod cap_paths;
mod file_offer_source;
mod in_memory_credential_store;
mod in_memory_job_repository;
mod in_memory_offer_sink;
mod json_lines_offer_sink;

pub use access_control_policy::{
    AccessControlAuthorityPolicy, AccessControlGroup, AccessControlLoadError,
};
pub use file_offer_source::FileOfferLineSource;
pub use in_memory_credential_store::InMemoryCredentialStore;
pub use in_memory_job_repository::InMemoryJobExecutionRepository;
pub use in_memory_offer_sink::InMemoryOfferSink;
pub use json_lines_offer_sink::JsonLinesOfferSink;

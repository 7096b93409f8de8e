//! Driven port committing offer chunks.

use async_trait::async_trait;

use super::define_port_error;
use crate::domain::Offer;

define_port_error! {
    /// Errors raised while committing a chunk.
    pub enum OfferSinkError {
        /// The chunk was rejected or could not be persisted.
        Write { message: String } =>
            "offer chunk write failed: {message}",
        /// The sink could not be reached.
        Unavailable { message: String } =>
            "offer sink unavailable: {message}",
    }
}

/// Port for persisting offers one chunk at a time.
///
/// Implementations must commit a chunk entirely or not at all.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait OfferSink: Send + Sync {
    /// Persist `offers` as one unit.
    async fn write_chunk(&self, offers: &[Offer]) -> Result<(), OfferSinkError>;
}

/// Fixture sink accepting and discarding every chunk.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureOfferSink;

#[async_trait]
impl OfferSink for FixtureOfferSink {
    async fn write_chunk(&self, _offers: &[Offer]) -> Result<(), OfferSinkError> {
        Ok(())
    }
}

//! Offer sink keeping committed chunks in memory.

use std::sync::{Arc, Mutex, PoisonError};

use async_trait::async_trait;

use crate::domain::Offer;
use crate::domain::ports::{OfferSink, OfferSinkError};

#[derive(Debug, Default)]
struct SinkState {
    chunks: Vec<Vec<Offer>>,
    attempts: u64,
}

/// In-memory [`OfferSink`], optionally rejecting one chunk.
///
/// Clones share storage, so a caller can hand one clone to the job and read
/// the committed chunks through another.
#[derive(Debug, Clone, Default)]
pub struct InMemoryOfferSink {
    state: Arc<Mutex<SinkState>>,
    fail_on_chunk: Option<u64>,
}

impl InMemoryOfferSink {
    /// Sink accepting every chunk.
    pub fn new() -> Self {
        Self::default()
    }

    /// Reject the `chunk`-th write attempt (1-based) without storing it.
    pub fn failing_on_chunk(chunk: u64) -> Self {
        Self {
            fail_on_chunk: Some(chunk),
            ..Self::default()
        }
    }

    /// Committed chunks in commit order.
    pub fn chunks(&self) -> Vec<Vec<Offer>> {
        self.lock().chunks.clone()
    }

    /// Committed offers flattened in commit order.
    pub fn offers(&self) -> Vec<Offer> {
        self.lock().chunks.iter().flatten().cloned().collect()
    }

    /// Number of write attempts, including rejected ones.
    pub fn attempts(&self) -> u64 {
        self.lock().attempts
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, SinkState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[async_trait]
impl OfferSink for InMemoryOfferSink {
    async fn write_chunk(&self, offers: &[Offer]) -> Result<(), OfferSinkError> {
        let mut state = self.lock();
        state.attempts = state.attempts.saturating_add(1);
        if self.fail_on_chunk == Some(state.attempts) {
            return Err(OfferSinkError::write(format!(
                "chunk {} rejected",
                state.attempts
            )));
        }
        state.chunks.push(offers.to_vec());
        Ok(())
    }
}

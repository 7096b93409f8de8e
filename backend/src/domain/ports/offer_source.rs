//! Driven port for reading delimited offer lines.
//!
//! Adapters only deliver physical lines with their line numbers. Header
//! skipping, comments, and tokenising stay in the domain pipeline.

use std::collections::VecDeque;
use std::path::Path;

use async_trait::async_trait;

use super::define_port_error;

/// One physical input line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceLine {
    /// 1-based line number.
    pub line_number: u64,
    /// Line content without its terminator.
    pub text: String,
}

define_port_error! {
    /// Errors raised while opening or reading an offer source.
    pub enum OfferSourceError {
        /// The input could not be opened.
        Open { message: String } =>
            "offer source open failed: {message}",
        /// Reading the next line failed.
        Read { message: String } =>
            "offer source read failed: {message}",
    }
}

/// Sequential reader over one opened input.
#[async_trait]
pub trait OfferLineReader: Send {
    /// Return the next line, or `None` once the input is exhausted.
    async fn next_line(&mut self) -> Result<Option<SourceLine>, OfferSourceError>;
}

/// Port for opening offer inputs.
#[async_trait]
pub trait OfferLineSource: Send + Sync {
    /// Open the input at `path` for reading from its first line.
    async fn open(&self, path: &Path) -> Result<Box<dyn OfferLineReader>, OfferSourceError>;
}

/// In-memory source serving the same scripted lines for every path.
///
/// # Examples
///
/// ```rust,ignore
/// use std::path::Path;
///
/// use restaurant_backend::domain::ports::{FixtureOfferLineSource, OfferLineSource};
///
/// let source = FixtureOfferLineSource::from_lines(["a,b,OK,1,2,3,9.5"]);
/// let mut reader = source.open(Path::new("offers.csv")).await?;
/// let line = reader.next_line().await?.expect("one line");
/// assert_eq!(line.line_number, 1);
/// # Ok::<(), restaurant_backend::domain::ports::OfferSourceError>(())
/// ```
#[derive(Debug, Clone, Default)]
pub struct FixtureOfferLineSource {
    lines: Vec<String>,
    fail_at: Option<u64>,
}

impl FixtureOfferLineSource {
    /// Serve `lines` in order.
    pub fn from_lines<I, S>(lines: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            lines: lines.into_iter().map(Into::into).collect(),
            fail_at: None,
        }
    }

    /// Fail with a read error instead of serving `line_number`.
    pub fn failing_at(mut self, line_number: u64) -> Self {
        self.fail_at = Some(line_number);
        self
    }
}

#[async_trait]
impl OfferLineSource for FixtureOfferLineSource {
    async fn open(&self, _path: &Path) -> Result<Box<dyn OfferLineReader>, OfferSourceError> {
        let lines = self
            .lines
            .iter()
            .zip(1_u64..)
            .map(|(text, line_number)| SourceLine {
                line_number,
                text: text.clone(),
            })
            .collect();
        Ok(Box::new(FixtureLineReader {
            lines,
            fail_at: self.fail_at,
        }))
    }
}

struct FixtureLineReader {
    lines: VecDeque<SourceLine>,
    fail_at: Option<u64>,
}

#[async_trait]
impl OfferLineReader for FixtureLineReader {
    async fn next_line(&mut self) -> Result<Option<SourceLine>, OfferSourceError> {
        let next = self.lines.pop_front();
        match (next, self.fail_at) {
            (Some(line), Some(fail_at)) if line.line_number == fail_at => Err(
                OfferSourceError::read(format!("scripted failure at line {fail_at}")),
            ),
            (next, _) => Ok(next),
        }
    }
}

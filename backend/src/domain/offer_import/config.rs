//! Validated job topology: chunk size, skip policy, and line handling.

use std::collections::BTreeSet;
use std::num::NonZeroUsize;

use super::{DelimitedLineTokenizer, RecordErrorKind, SkipPolicy};
use crate::domain::{Error, OFFER_FIELD_NAMES};

const DEFAULT_CHUNK_SIZE: NonZeroUsize = NonZeroUsize::MIN.saturating_add(1);
const DEFAULT_COMMENT_PREFIX: &str = "#";

/// Configuration for one offer import job.
///
/// # Examples
/// ```
/// use restaurant_backend::domain::offer_import::ImportJobConfig;
///
/// let config = ImportJobConfig::new(2, 1).unwrap().with_lines_to_skip(1);
/// assert_eq!(config.chunk_size().get(), 2);
/// assert_eq!(config.skip_policy().skip_limit(), 1);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportJobConfig {
    chunk_size: NonZeroUsize,
    skip_policy: SkipPolicy,
    tokenizer: DelimitedLineTokenizer,
    lines_to_skip: usize,
    comment_prefix: Option<String>,
}

impl ImportJobConfig {
    /// Build a comma-delimited configuration.
    pub fn new(chunk_size: usize, skip_limit: u64) -> Result<Self, Error> {
        let chunk_size = NonZeroUsize::new(chunk_size)
            .ok_or_else(|| Error::invalid_request("chunk size must be at least 1"))?;
        Ok(Self {
            chunk_size,
            skip_policy: SkipPolicy::new(skip_limit),
            tokenizer: offer_tokenizer(',')?,
            lines_to_skip: 0,
            comment_prefix: Some(DEFAULT_COMMENT_PREFIX.to_owned()),
        })
    }

    /// Use another column delimiter.
    pub fn with_delimiter(mut self, delimiter: char) -> Result<Self, Error> {
        self.tokenizer = offer_tokenizer(delimiter)?;
        Ok(self)
    }

    /// Ignore this many leading lines, e.g. a header row.
    pub fn with_lines_to_skip(mut self, lines_to_skip: usize) -> Self {
        self.lines_to_skip = lines_to_skip;
        self
    }

    /// Ignore lines starting with `prefix`; `None` or an empty prefix
    /// disables comment handling.
    pub fn with_comment_prefix(mut self, prefix: Option<String>) -> Self {
        self.comment_prefix = prefix.filter(|value| !value.is_empty());
        self
    }

    /// Restrict which record errors may be skipped.
    pub fn with_skippable(mut self, skippable: BTreeSet<RecordErrorKind>) -> Self {
        self.skip_policy = self.skip_policy.with_skippable(skippable);
        self
    }

    /// Records per commit.
    pub fn chunk_size(&self) -> NonZeroUsize {
        self.chunk_size
    }

    /// Skip limit and allow-list.
    pub fn skip_policy(&self) -> &SkipPolicy {
        &self.skip_policy
    }

    /// Line tokenizer.
    pub fn tokenizer(&self) -> &DelimitedLineTokenizer {
        &self.tokenizer
    }

    /// Leading lines ignored before reading records.
    pub fn lines_to_skip(&self) -> usize {
        self.lines_to_skip
    }

    /// Comment marker, if any.
    pub fn comment_prefix(&self) -> Option<&str> {
        self.comment_prefix.as_deref()
    }
}

impl Default for ImportJobConfig {
    fn default() -> Self {
        Self {
            chunk_size: DEFAULT_CHUNK_SIZE,
            skip_policy: SkipPolicy::default(),
            tokenizer: DelimitedLineTokenizer::comma_separated(OFFER_FIELD_NAMES.len()),
            lines_to_skip: 0,
            comment_prefix: Some(DEFAULT_COMMENT_PREFIX.to_owned()),
        }
    }
}

fn offer_tokenizer(delimiter: char) -> Result<DelimitedLineTokenizer, Error> {
    DelimitedLineTokenizer::new(delimiter, OFFER_FIELD_NAMES.len()).ok_or_else(|| {
        Error::invalid_request(format!("delimiter {delimiter:?} is reserved"))
    })
}

#[cfg(test)]
mod tests {
    //! Configuration validation.
    use super::*;
    use crate::domain::ErrorCode;
    use rstest::rstest;

    #[rstest]
    fn zero_chunk_size_is_rejected() {
        let err = ImportJobConfig::new(0, 1).expect_err("zero chunk");
        assert_eq!(err.code(), ErrorCode::InvalidRequest);
    }

    #[rstest]
    fn quote_delimiter_is_rejected() {
        let err = ImportJobConfig::new(2, 1)
            .and_then(|config| config.with_delimiter('"'))
            .expect_err("quote delimiter");
        assert_eq!(err.code(), ErrorCode::InvalidRequest);
    }

    #[rstest]
    fn default_matches_reference_configuration() {
        let config = ImportJobConfig::default();
        assert_eq!(config.chunk_size().get(), 2);
        assert_eq!(config.skip_policy().skip_limit(), 1);
        assert_eq!(config.tokenizer().delimiter(), ',');
        assert_eq!(config.comment_prefix(), Some("#"));
        assert_eq!(config, ImportJobConfig::new(2, 1).expect("valid"));
    }

    #[rstest]
    fn empty_comment_prefix_disables_comments() {
        let config = ImportJobConfig::default().with_comment_prefix(Some(String::new()));
        assert_eq!(config.comment_prefix(), None);
    }
}

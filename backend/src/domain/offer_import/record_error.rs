//! Per-record failures raised while reading or converting one input line.

use serde::{Deserialize, Serialize};

use crate::domain::OfferValidationError;

/// Category of a per-record failure, used by the skip policy allow-list.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "snake_case")]
#[value(rename_all = "snake_case")]
pub enum RecordErrorKind {
    /// Line split into the wrong number of tokens.
    IncorrectTokenCount,
    /// Line could not be tokenised at all.
    MalformedLine,
    /// A token failed conversion into the offer field.
    InvalidField,
}

/// Failure attached to a single input line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, thiserror::Error)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RecordError {
    /// The line does not carry one token per offer column.
    #[error("incorrect token count: expected {expected}, found {actual}")]
    IncorrectTokenCount {
        /// Number of offer columns.
        expected: usize,
        /// Number of tokens found on the line.
        actual: usize,
    },
    /// Quoting on the line is broken.
    #[error("malformed line: {message}")]
    MalformedLine {
        /// Tokeniser diagnostic.
        message: String,
    },
    /// A token could not be converted.
    #[error("invalid field {field} ({value:?}): {reason}")]
    InvalidField {
        /// Column name.
        field: String,
        /// Raw token.
        value: String,
        /// Why conversion failed.
        reason: String,
    },
}

impl RecordError {
    /// Category used for skip-eligibility decisions.
    pub fn kind(&self) -> RecordErrorKind {
        match self {
            Self::IncorrectTokenCount { .. } => RecordErrorKind::IncorrectTokenCount,
            Self::MalformedLine { .. } => RecordErrorKind::MalformedLine,
            Self::InvalidField { .. } => RecordErrorKind::InvalidField,
        }
    }

    pub(crate) fn malformed_line(message: impl Into<String>) -> Self {
        Self::MalformedLine {
            message: message.into(),
        }
    }
}

impl From<OfferValidationError> for RecordError {
    fn from(error: OfferValidationError) -> Self {
        Self::InvalidField {
            field: error.field.to_owned(),
            value: error.value,
            reason: error.reason.to_owned(),
        }
    }
}

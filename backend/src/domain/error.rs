//! Errors returned by the offer import command.
//!
//! Job-level failures are not errors: they come back as a finished
//! `JobExecution`. An [`Error`] means the launch was refused or no run id
//! could be allocated.

/// Category of a refused launch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub enum ErrorCode {
    /// The request or its settings failed validation.
    InvalidRequest,
    /// The job repository reported conflicting bookkeeping.
    Conflict,
    /// The job repository could not be reached.
    ServiceUnavailable,
}

/// Launch error carrying a code and an operator-facing message.
///
/// # Examples
/// ```
/// use restaurant_backend::domain::{Error, ErrorCode};
///
/// let err = Error::invalid_request("chunk size must be positive");
/// assert_eq!(err.code(), ErrorCode::InvalidRequest);
/// assert_eq!(err.to_string(), "chunk size must be positive");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{message}")]
pub struct Error {
    code: ErrorCode,
    message: String,
}

impl Error {
    fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    /// Machine-readable category.
    pub fn code(&self) -> ErrorCode {
        self.code
    }

    /// Operator-facing description.
    pub fn message(&self) -> &str {
        self.message.as_str()
    }

    /// Request or settings validation failed.
    pub fn invalid_request(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::InvalidRequest, message)
    }

    /// Repository bookkeeping conflicted.
    pub fn conflict(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::Conflict, message)
    }

    /// Repository unreachable.
    pub fn service_unavailable(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::ServiceUnavailable, message)
    }
}

//! Error types for the ledger.
//!
//! Internal plumbing uses `anyhow` through the `Res` alias. Anything returned from a public
//! operation is a `Result`, whose `Error` carries an `ErrorType` so that callers (and tests) can
//! tell a rejected transaction apart from a storage failure.

use serde::Serialize;
use std::fmt::{self, Debug, Display, Formatter};

/// Internal result type.
pub(crate) type Res<T> = anyhow::Result<T>;

/// Public result type.
pub type Result<T> = std::result::Result<T, Error>;

/// The category of a public error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorType {
    /// A malformed or missing transaction field, an unparseable date or period.
    InvalidArgument,
    /// A week block could not be resolved from the coordinates that were given.
    BlockNotFound,
    /// The requested partition does not exist.
    PartitionNotFound,
    /// The grid store failed to read or write.
    Storage,
    /// The ledger home or its configuration file is missing or invalid.
    Config,
    /// A report could not be handed to the delivery collaborator.
    Delivery,
    /// Anything else.
    Internal,
}

serde_plain::derive_display_from_serialize!(ErrorType);

/// An error returned by a public operation.
pub struct Error {
    error_type: ErrorType,
    inner: anyhow::Error,
}

impl Error {
    pub fn new(error_type: ErrorType, inner: impl Into<anyhow::Error>) -> Self {
        Self {
            error_type,
            inner: inner.into(),
        }
    }

    /// Creates an error of `error_type` from a plain message.
    pub fn msg<M>(error_type: ErrorType, message: M) -> Self
    where
        M: Display + Debug + Send + Sync + 'static,
    {
        Self::new(error_type, anyhow::Error::msg(message))
    }

    pub fn error_type(&self) -> ErrorType {
        self.error_type
    }
}

impl Display for Error {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{:#}", self.inner)
    }
}

impl Debug for Error {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {:?}", self.error_type, self.inner)
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.inner.source()
    }
}

impl From<anyhow::Error> for Error {
    fn from(inner: anyhow::Error) -> Self {
        Self::new(ErrorType::Internal, inner)
    }
}

/// Converts an internal result into a public one by tagging the error with an `ErrorType`.
pub(crate) trait IntoResult<T> {
    fn pub_result(self, error_type: ErrorType) -> Result<T>;
}

impl<T, E> IntoResult<T> for std::result::Result<T, E>
where
    E: Into<anyhow::Error>,
{
    fn pub_result(self, error_type: ErrorType) -> Result<T> {
        self.map_err(|e| Error::new(error_type, e))
    }
}

use std::result;
use thiserror::Error as ThisError;

pub type Result<T> = result::Result<T, Error>;

/// Resolver configuration error. Errors returned by connections themselves are never converted
/// into this type; they are forwarded to the caller as the connection's own
/// [`Connection::Error`](crate::connection::Connection::Error).
#[derive(Debug, ThisError, Clone, PartialEq, Eq)]
pub enum Error {
    /// The resolver was built without any primary connection.
    #[error("At least one primary connection is required")]
    NoPrimaries,
    /// General configuration error.
    #[error("General error: {0}")]
    General(String),
}

impl From<&str> for Error {
    fn from(err: &str) -> Error {
        Error::General(err.to_string())
    }
}

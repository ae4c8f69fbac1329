//! Error types for the listener and for individual requests.
//!
//! Only [`ServerError`] is fatal. A [`RequestError`] is local to one request
//! on one connection: the handler logs it and keeps reading.

use std::fmt;
use std::io;
use std::num::ParseIntError;
use std::str::Utf8Error;

/// Failures that abort startup before any connection is accepted.
#[derive(Debug)]
pub enum ServerError {
    /// The listen address could not be resolved.
    Resolve(String, io::Error),
    /// The listen socket could not be created, bound or put into listening state.
    Bind(String, io::Error),
}

impl fmt::Display for ServerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ServerError::Resolve(addr, e) => {
                write!(f, "Failed to resolve listen address '{addr}': {e}")
            }
            ServerError::Bind(addr, e) => {
                write!(f, "An error occurred while listening to '{addr}': {e}")
            }
        }
    }
}

impl std::error::Error for ServerError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ServerError::Resolve(_, e) | ServerError::Bind(_, e) => Some(e),
        }
    }
}

/// Reasons a request line is dropped without a response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RequestError {
    /// The bytes read were not UTF-8.
    InvalidUtf8(Utf8Error),
    /// The line was not a base-10 integer.
    InvalidNumber(ParseIntError),
    /// The index exceeds the configured `max_index`.
    OutOfRange { n: i64, max: i64 },
}

impl fmt::Display for RequestError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RequestError::InvalidUtf8(e) => write!(f, "The request must be a number: {e}"),
            RequestError::InvalidNumber(e) => write!(f, "The request must be a number: {e}"),
            RequestError::OutOfRange { n, max } => {
                write!(f, "Index {n} exceeds the configured maximum {max}")
            }
        }
    }
}

impl std::error::Error for RequestError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            RequestError::InvalidUtf8(e) => Some(e),
            RequestError::InvalidNumber(e) => Some(e),
            RequestError::OutOfRange { .. } => None,
        }
    }
}

impl From<Utf8Error> for RequestError {
    fn from(e: Utf8Error) -> Self {
        RequestError::InvalidUtf8(e)
    }
}

impl From<ParseIntError> for RequestError {
    fn from(e: ParseIntError) -> Self {
        RequestError::InvalidNumber(e)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error;

    #[test]
    fn test_bind_error_display() {
        let err = ServerError::Bind(
            "127.0.0.1:25000".to_string(),
            io::Error::new(io::ErrorKind::AddrInUse, "address in use"),
        );
        let msg = err.to_string();
        assert!(msg.contains("127.0.0.1:25000"));
        assert!(msg.contains("address in use"));
        assert!(err.source().is_some());
    }

    #[test]
    fn test_out_of_range_display() {
        let err = RequestError::OutOfRange { n: 90, max: 40 };
        assert_eq!(err.to_string(), "Index 90 exceeds the configured maximum 40");
        assert!(err.source().is_none());
    }
}

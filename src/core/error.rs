//! Error types for the requery client.
//!
//! Every failure the client can observe is representable here. The client
//! itself never lets an error escape `query()` — failures are logged and
//! folded into the returned outcome — but the lower layers (driver, decoder,
//! configuration) propagate `RequeryError` normally.

use std::time::Duration;
use thiserror::Error;

/// Comprehensive error type for the requery crate.
///
/// The first four variants mirror the failure points of the connection
/// lifecycle: driver validation, opening a connection, executing a statement,
/// and closing a handle. `Timeout` and `Cancelled` come from the bounded-wait
/// call facade; the rest are ambient.
#[derive(Error, Debug)]
pub enum RequeryError {
    /// The driver capability could not be validated; the client can never connect
    #[error("Driver error: {0}")]
    Driver(String),

    /// Opening a connection failed (bad credentials, unreachable host, ...)
    #[error("Connection error: {0}")]
    Connection(String),

    /// Executing a statement failed
    #[error("Query error: {0}")]
    Query(String),

    /// Closing a connection handle failed
    #[error("Close error: {0}")]
    Close(String),

    /// A background call exceeded the bounded wait
    #[error("Operation timed out after {0:?}")]
    Timeout(Duration),

    /// A background call was abandoned through its cancellation handle
    #[error("Operation cancelled")]
    Cancelled,

    /// Configuration loading and validation errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// File system and I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Type alias for Result to use RequeryError as the error type.
pub type Result<T> = std::result::Result<T, RequeryError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let conn_err = RequeryError::Connection("refused".to_string());
        assert!(conn_err.to_string().contains("Connection error"));

        let query_err = RequeryError::Query("syntax error".to_string());
        assert!(query_err.to_string().contains("Query error"));

        let timeout_err = RequeryError::Timeout(Duration::from_secs(30));
        assert!(timeout_err.to_string().contains("timed out"));
    }

    #[test]
    fn test_error_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err: RequeryError = io_err.into();
        match err {
            RequeryError::Io(_) => {}
            _ => panic!("Expected IO error"),
        }
    }
}

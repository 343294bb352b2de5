//! Error handling for the fireplace service
//!
//! `ConnectionError` is the one failure the HTTP boundary reports as
//! "service unavailable"; everything else maps to a validation (400) or generic
//! (500) response.

use thiserror::Error;

use crate::transport::TransportError;

/// Fireplace service error type
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FireSrvError {
    /// TCP connect to the device failed or timed out
    #[error("Connection error: {0}")]
    ConnectionError(String),

    /// Status response missing, undecodable or too short
    #[error("Protocol error: {0}")]
    ProtocolError(String),

    /// Caller-supplied value out of range, raised before any I/O
    #[error("Validation error: {0}")]
    ValidationError(String),

    /// Read/write failure on an established connection
    #[error("IO error: {0}")]
    IoError(String),

    /// Configuration could not be loaded or is invalid
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// API key store failure
    #[error("Database error: {0}")]
    DatabaseError(String),

    #[error("Internal error: {0}")]
    InternalError(String),
}

/// Result type alias for the fireplace service
pub type Result<T> = std::result::Result<T, FireSrvError>;

impl FireSrvError {
    pub fn connection(msg: impl Into<String>) -> Self {
        FireSrvError::ConnectionError(msg.into())
    }

    pub fn protocol(msg: impl Into<String>) -> Self {
        FireSrvError::ProtocolError(msg.into())
    }

    pub fn validation(msg: impl Into<String>) -> Self {
        FireSrvError::ValidationError(msg.into())
    }

    pub fn io(msg: impl Into<String>) -> Self {
        FireSrvError::IoError(msg.into())
    }

    pub fn config(msg: impl Into<String>) -> Self {
        FireSrvError::ConfigError(msg.into())
    }

    pub fn database(msg: impl Into<String>) -> Self {
        FireSrvError::DatabaseError(msg.into())
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        FireSrvError::InternalError(msg.into())
    }

    /// Whether the device could not be reached at all
    pub fn is_connection_error(&self) -> bool {
        matches!(self, FireSrvError::ConnectionError(_))
    }
}

impl From<std::io::Error> for FireSrvError {
    fn from(err: std::io::Error) -> Self {
        FireSrvError::IoError(err.to_string())
    }
}

impl From<figment::Error> for FireSrvError {
    fn from(err: figment::Error) -> Self {
        FireSrvError::ConfigError(err.to_string())
    }
}

impl From<sqlx::Error> for FireSrvError {
    fn from(err: sqlx::Error) -> Self {
        FireSrvError::DatabaseError(err.to_string())
    }
}

impl From<TransportError> for FireSrvError {
    fn from(err: TransportError) -> Self {
        match err {
            TransportError::ConnectionFailed(msg) => FireSrvError::ConnectionError(msg),
            TransportError::ConfigError(msg) => FireSrvError::ConfigError(msg),
            other => FireSrvError::IoError(other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transport_connect_failure_is_connection_error() {
        let err: FireSrvError =
            TransportError::ConnectionFailed("10.0.0.9:2000: connection refused".into()).into();
        assert!(err.is_connection_error());
        assert_eq!(
            err.to_string(),
            "Connection error: 10.0.0.9:2000: connection refused"
        );
    }

    #[test]
    fn test_transport_send_failure_is_io_error() {
        let err: FireSrvError = TransportError::SendFailed("broken pipe".into()).into();
        assert!(!err.is_connection_error());
        assert!(matches!(err, FireSrvError::IoError(_)));
    }
}

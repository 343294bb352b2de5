//! Transport Layer Traits

use async_trait::async_trait;
use std::fmt;
use std::time::Duration;
use thiserror::Error;

/// Transport layer error types
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TransportError {
    /// Connection could not be established (refused, unreachable, timed out)
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    #[error("Send failed: {0}")]
    SendFailed(String),

    #[error("Receive failed: {0}")]
    ReceiveFailed(String),

    /// No data arrived within the receive timeout
    #[error("Operation timed out: {0}")]
    Timeout(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),
}

/// Opens connections to one device endpoint
#[async_trait]
pub trait Connector: Send + Sync + fmt::Debug {
    /// Human-readable endpoint, used in logs and errors
    fn endpoint(&self) -> String;

    /// Open a new connection, giving up after `timeout`
    async fn open(&self, timeout: Duration) -> Result<Box<dyn Link>, TransportError>;
}

/// One open connection
#[async_trait]
pub trait Link: Send + fmt::Debug {
    /// Write the whole buffer
    async fn send(&mut self, data: &[u8]) -> Result<(), TransportError>;

    /// Read available bytes into `buffer`
    ///
    /// Returns `Ok(0)` when the peer closed the connection and
    /// `Err(TransportError::Timeout)` when nothing arrived in time.
    async fn receive(
        &mut self,
        buffer: &mut [u8],
        timeout: Duration,
    ) -> Result<usize, TransportError>;

    /// Close the connection
    async fn close(&mut self) -> Result<(), TransportError>;
}

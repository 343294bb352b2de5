//! TCP Transport Implementation
//!
//! The fireplace module drops idle connections, so every exchange opens a
//! fresh `TcpStream` through [`TcpConnector::open`] and closes it afterwards.

use async_trait::async_trait;
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;
use tokio::time::timeout;
use tracing::{debug, warn};

use super::traits::{Connector, Link, TransportError};

/// Connects to the fireplace module over TCP
#[derive(Debug, Clone)]
pub struct TcpConnector {
    host: String,
    port: u16,
}

impl TcpConnector {
    pub fn new(host: impl Into<String>, port: u16) -> Result<Self, TransportError> {
        let host = host.into();
        if host.trim().is_empty() {
            return Err(TransportError::ConfigError(
                "Host cannot be empty".to_string(),
            ));
        }
        if port == 0 {
            return Err(TransportError::ConfigError(
                "Port cannot be zero".to_string(),
            ));
        }

        Ok(Self { host, port })
    }
}

#[async_trait]
impl Connector for TcpConnector {
    fn endpoint(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    async fn open(&self, connect_timeout: Duration) -> Result<Box<dyn Link>, TransportError> {
        let addr = self.endpoint();
        debug!("Connecting to {addr}");

        let stream = match timeout(
            connect_timeout,
            TcpStream::connect((self.host.as_str(), self.port)),
        )
        .await
        {
            Ok(Ok(stream)) => stream,
            Ok(Err(e)) => {
                return Err(TransportError::ConnectionFailed(format!("{addr}: {e}")));
            },
            Err(_) => {
                return Err(TransportError::ConnectionFailed(format!(
                    "{addr}: timed out after {connect_timeout:?}"
                )));
            },
        };

        if let Err(e) = stream.set_nodelay(true) {
            warn!("Failed to set TCP_NODELAY on {addr}: {e}");
        }

        Ok(Box::new(TcpLink { stream, addr }))
    }
}

/// One open TCP connection to the device
#[derive(Debug)]
pub struct TcpLink {
    stream: TcpStream,
    addr: String,
}

#[async_trait]
impl Link for TcpLink {
    async fn send(&mut self, data: &[u8]) -> Result<(), TransportError> {
        self.stream
            .write_all(data)
            .await
            .map_err(|e| TransportError::SendFailed(format!("{}: {e}", self.addr)))?;
        self.stream
            .flush()
            .await
            .map_err(|e| TransportError::SendFailed(format!("{}: {e}", self.addr)))?;

        debug!(
            hex_data = %common::hex::encode_upper(data),
            length = data.len(),
            direction = "send",
            "Raw packet"
        );
        Ok(())
    }

    async fn receive(
        &mut self,
        buffer: &mut [u8],
        receive_timeout: Duration,
    ) -> Result<usize, TransportError> {
        match timeout(receive_timeout, self.stream.read(buffer)).await {
            Ok(Ok(n)) => {
                if n > 0 {
                    debug!(
                        hex_data = %common::hex::encode_upper(&buffer[..n]),
                        length = n,
                        direction = "recv",
                        "Raw packet"
                    );
                }
                Ok(n)
            },
            Ok(Err(e)) => Err(TransportError::ReceiveFailed(format!(
                "{}: {e}",
                self.addr
            ))),
            Err(_) => Err(TransportError::Timeout(format!(
                "{}: no data within {receive_timeout:?}",
                self.addr
            ))),
        }
    }

    async fn close(&mut self) -> Result<(), TransportError> {
        self.stream
            .shutdown()
            .await
            .map_err(|e| TransportError::SendFailed(format!("{}: shutdown: {e}", self.addr)))
    }
}

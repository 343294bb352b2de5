//! Fireplace protocol client
//!
//! The WiFi module accepts one short-lived TCP connection per command. Every
//! exchange opens a connection, writes one frame, reads one reply and closes
//! again; a single async mutex keeps exchanges from overlapping, including the
//! three-step power-on sequence which holds it throughout.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Mutex;
use tokio::time::Instant;
use tracing::{debug, info, warn};

use super::command::{Command, POWER_ON_SEQUENCE};
use super::constants::{
    DEFAULT_COMMAND_TIMEOUT, DEFAULT_CONNECT_TIMEOUT, DEFAULT_STATUS_TIMEOUT, DEFAULT_STEP_PAUSE,
    DEFAULT_STEP_TIMEOUT, ETX, FLAME_PCT_MAX, RESPONSE_BUFFER_SIZE,
};
use super::frame::FrameCodec;
use super::mapping::percentage_to_hardware;
use super::status::DeviceStatus;
use crate::config::FireplaceConfig;
use crate::error::{FireSrvError, Result};
use crate::transport::{Connector, Link, TcpConnector, TransportError};

/// Timeouts and pauses used by the client
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClientTimings {
    pub connect_timeout: Duration,
    pub status_timeout: Duration,
    pub command_timeout: Duration,
    /// Response timeout of each power-on step
    pub step_timeout: Duration,
    /// Pause after each power-on step except the last
    pub step_pause: Duration,
}

impl Default for ClientTimings {
    fn default() -> Self {
        Self {
            connect_timeout: DEFAULT_CONNECT_TIMEOUT,
            status_timeout: DEFAULT_STATUS_TIMEOUT,
            command_timeout: DEFAULT_COMMAND_TIMEOUT,
            step_timeout: DEFAULT_STEP_TIMEOUT,
            step_pause: DEFAULT_STEP_PAUSE,
        }
    }
}

/// Client for one physical fireplace
#[derive(Debug)]
pub struct FireplaceClient {
    connector: Arc<dyn Connector>,
    lock: Mutex<()>,
    timings: ClientTimings,
}

impl FireplaceClient {
    pub fn new(connector: Arc<dyn Connector>, timings: ClientTimings) -> Self {
        Self {
            connector,
            lock: Mutex::new(()),
            timings,
        }
    }

    /// Build a TCP client from the `fireplace` configuration section
    pub fn tcp(config: &FireplaceConfig) -> Result<Self> {
        let connector = TcpConnector::new(config.host.clone(), config.port)?;
        Ok(Self::new(Arc::new(connector), config.timings()))
    }

    pub fn endpoint(&self) -> String {
        self.connector.endpoint()
    }

    /// Run one command/response exchange
    ///
    /// Returns `Ok(None)` when the device stays silent or replies with
    /// something that is not a valid frame. Connect failures are
    /// `ConnectionError`; read/write failures after connecting are `IoError`.
    pub async fn exchange(
        &self,
        command: Command,
        response_timeout: Duration,
    ) -> Result<Option<Vec<u8>>> {
        let _guard = self.lock.lock().await;
        self.exchange_unlocked(command, response_timeout).await
    }

    /// Exchange without taking the lock; callers must hold it
    async fn exchange_unlocked(
        &self,
        command: Command,
        response_timeout: Duration,
    ) -> Result<Option<Vec<u8>>> {
        let frame = FrameCodec::encode_frame(&command.payload());
        debug!("Sending {} to {}", command, self.connector.endpoint());

        // The exchange timeout bounds the connect as well
        let connect_timeout = response_timeout.min(self.timings.connect_timeout);
        let mut link = self
            .connector
            .open(connect_timeout)
            .await
            .map_err(connect_error)?;

        let result = transact(link.as_mut(), &frame, response_timeout).await;

        if let Err(e) = link.close().await {
            debug!("Error closing connection after {}: {}", command, e);
        }

        let Some(raw) = result? else {
            debug!("No response to {} within {:?}", command, response_timeout);
            return Ok(None);
        };

        match FrameCodec::decode_frame(&raw) {
            Some(decoded) => {
                debug!("Response to {}: {} bytes", command, decoded.len());
                Ok(Some(decoded))
            },
            None => {
                debug!(
                    "Undecodable response to {}: {}",
                    command,
                    common::hex::encode_upper(&raw)
                );
                Ok(None)
            },
        }
    }

    /// Query and parse the device status
    pub async fn get_status(&self) -> Result<DeviceStatus> {
        let response = self
            .exchange(Command::Status, self.timings.status_timeout)
            .await?
            .ok_or_else(|| FireSrvError::protocol("No valid response to status query"))?;

        DeviceStatus::parse(&response)
    }

    /// Run the three-step ignition sequence
    ///
    /// Stops at the first step whose exchange fails. Steps already sent are
    /// not undone.
    pub async fn power_on(&self) -> bool {
        let _guard = self.lock.lock().await;
        info!("Starting power-on sequence");

        let last = POWER_ON_SEQUENCE.len() - 1;
        for (index, command) in POWER_ON_SEQUENCE.iter().enumerate() {
            if let Err(e) = self
                .exchange_unlocked(*command, self.timings.step_timeout)
                .await
            {
                warn!(
                    step = index + 1,
                    command = command.name(),
                    "Power-on failed at step {} ({}): {}",
                    index + 1,
                    command.name(),
                    e
                );
                return false;
            }

            if index < last {
                tokio::time::sleep(self.timings.step_pause).await;
            }
        }

        info!("Power-on sequence sent");
        true
    }

    pub async fn power_off(&self) -> bool {
        self.send_command(Command::PowerOff).await
    }

    /// Set the flame height as a percentage (0-100)
    pub async fn set_flame_level(&self, percentage: i32) -> Result<bool> {
        if !(0..=FLAME_PCT_MAX).contains(&percentage) {
            return Err(FireSrvError::validation(format!(
                "Flame level must be between 0 and 100, got {}",
                percentage
            )));
        }

        let hardware = percentage_to_hardware(percentage);
        debug!("Flame {}% -> hardware 0x{:02X}", percentage, hardware);
        Ok(self.send_command(Command::SetFlame(hardware)).await)
    }

    pub async fn burner2_on(&self) -> bool {
        self.send_command(Command::Burner2On).await
    }

    pub async fn burner2_off(&self) -> bool {
        self.send_command(Command::Burner2Off).await
    }

    /// Fire-and-forget command; a missing acknowledgement still counts as sent
    async fn send_command(&self, command: Command) -> bool {
        match self.exchange(command, self.timings.command_timeout).await {
            Ok(_) => true,
            Err(e) => {
                warn!("Command {} failed: {}", command, e);
                false
            },
        }
    }
}

fn connect_error(err: TransportError) -> FireSrvError {
    match err {
        TransportError::ConnectionFailed(msg) => FireSrvError::connection(msg),
        other => FireSrvError::connection(other.to_string()),
    }
}

/// Write one frame and collect the reply
///
/// Reading stops at a trailing ETX, peer close, a full buffer or the deadline.
async fn transact(
    link: &mut dyn Link,
    frame: &[u8],
    response_timeout: Duration,
) -> Result<Option<Vec<u8>>> {
    link.send(frame)
        .await
        .map_err(|e| FireSrvError::io(e.to_string()))?;

    let deadline = Instant::now() + response_timeout;
    let mut response = Vec::with_capacity(RESPONSE_BUFFER_SIZE);
    let mut chunk = [0u8; RESPONSE_BUFFER_SIZE];

    while response.len() < RESPONSE_BUFFER_SIZE {
        let remaining = deadline.saturating_duration_since(Instant::now());
        if remaining.is_zero() {
            break;
        }

        let room = RESPONSE_BUFFER_SIZE - response.len();
        match link.receive(&mut chunk[..room], remaining).await {
            Ok(0) => break,
            Ok(n) => {
                response.extend_from_slice(&chunk[..n]);
                if response.last() == Some(&ETX) {
                    break;
                }
            },
            Err(TransportError::Timeout(_)) => break,
            Err(e) => return Err(FireSrvError::io(e.to_string())),
        }
    }

    Ok((!response.is_empty()).then_some(response))
}

//! Mock Transport for Testing
//!
//! An in-memory [`Connector`] that records every open, send and close with a
//! tokio timestamp, so tests can assert command order, pauses between
//! exchanges, and that exchanges never overlap.

use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;

use super::traits::{Connector, Link, TransportError};
use crate::protocol::constants::{ETX, STX};

/// Mock connector behaviour
#[derive(Debug, Clone)]
pub struct MockConnectorConfig {
    /// Simulated connection delay
    pub connect_delay: Duration,
    /// Simulated send delay
    pub send_delay: Duration,
    /// Simulated receive delay
    pub receive_delay: Duration,
    /// Reply to unscripted payloads by echoing the frame back
    pub echo: bool,
}

impl Default for MockConnectorConfig {
    fn default() -> Self {
        Self {
            connect_delay: Duration::ZERO,
            send_delay: Duration::ZERO,
            receive_delay: Duration::ZERO,
            echo: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WireEventKind {
    Opened,
    /// Bytes written, frame markers included
    Sent(Vec<u8>),
    Closed,
}

#[derive(Debug, Clone)]
pub struct WireEvent {
    /// Connection number, starting at 1
    pub conn: usize,
    pub kind: WireEventKind,
    pub at: Instant,
}

#[derive(Debug, Default)]
struct MockState {
    open_attempts: usize,
    connect_timeouts: Vec<Duration>,
    next_conn: usize,
    fail_all: bool,
    failing_attempts: HashSet<usize>,
    responses: HashMap<Vec<u8>, Vec<u8>>,
    silent: HashSet<Vec<u8>>,
    events: Vec<WireEvent>,
}

impl MockState {
    fn record(&mut self, conn: usize, kind: WireEventKind) {
        self.events.push(WireEvent {
            conn,
            kind,
            at: Instant::now(),
        });
    }
}

/// Instrumented connector for protocol client tests
#[derive(Debug, Clone, Default)]
pub struct MockConnector {
    config: MockConnectorConfig,
    state: Arc<Mutex<MockState>>,
}

impl MockConnector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: MockConnectorConfig) -> Self {
        Self {
            config,
            state: Arc::default(),
        }
    }

    /// Refuse every connection attempt
    pub fn fail_all_connections(&self) {
        self.state.lock().fail_all = true;
    }

    /// Refuse the `attempt`-th connection attempt (1-based)
    pub fn fail_connection_attempt(&self, attempt: usize) {
        self.state.lock().failing_attempts.insert(attempt);
    }

    /// Reply to `payload` with `raw` bytes, written to the wire as given
    pub fn respond_to(&self, payload: &[u8], raw: &[u8]) {
        self.state
            .lock()
            .responses
            .insert(payload.to_vec(), raw.to_vec());
    }

    /// Never reply to `payload`
    pub fn stay_silent_on(&self, payload: &[u8]) {
        self.state.lock().silent.insert(payload.to_vec());
    }

    /// Timeout passed to each connection attempt, refused ones included
    pub fn connect_timeouts(&self) -> Vec<Duration> {
        self.state.lock().connect_timeouts.clone()
    }

    /// Payloads written so far, frame markers stripped, in wire order
    pub fn sent_payloads(&self) -> Vec<Vec<u8>> {
        self.sent_with_times()
            .into_iter()
            .map(|(payload, _)| payload)
            .collect()
    }

    /// Payloads written so far together with the time they were written
    pub fn sent_with_times(&self) -> Vec<(Vec<u8>, Instant)> {
        self.state
            .lock()
            .events
            .iter()
            .filter_map(|event| match &event.kind {
                WireEventKind::Sent(frame) => Some((strip_markers(frame).to_vec(), event.at)),
                _ => None,
            })
            .collect()
    }

    pub fn open_attempts(&self) -> usize {
        self.state.lock().open_attempts
    }

    pub fn opened_count(&self) -> usize {
        self.count(|kind| matches!(kind, WireEventKind::Opened))
    }

    pub fn closed_count(&self) -> usize {
        self.count(|kind| matches!(kind, WireEventKind::Closed))
    }

    fn count(&self, pred: impl Fn(&WireEventKind) -> bool) -> usize {
        self.state
            .lock()
            .events
            .iter()
            .filter(|event| pred(&event.kind))
            .count()
    }

    /// Describe the first point where two connections were open at once
    pub fn find_interleaving(&self) -> Option<String> {
        let state = self.state.lock();
        let mut current: Option<usize> = None;

        for (index, event) in state.events.iter().enumerate() {
            match (&event.kind, current) {
                (WireEventKind::Opened, None) => current = Some(event.conn),
                (WireEventKind::Opened, Some(open)) => {
                    return Some(format!(
                        "event {index}: conn {} opened while conn {open} still open",
                        event.conn
                    ));
                },
                (WireEventKind::Closed, Some(open)) if open == event.conn => current = None,
                (_, Some(open)) if open == event.conn => {},
                (kind, _) => {
                    return Some(format!(
                        "event {index}: {kind:?} on conn {} while conn {current:?} is active",
                        event.conn
                    ));
                },
            }
        }

        None
    }
}

fn strip_markers(frame: &[u8]) -> &[u8] {
    let frame = frame.strip_prefix(&[STX]).unwrap_or(frame);
    frame.strip_suffix(&[ETX]).unwrap_or(frame)
}

#[async_trait]
impl Connector for MockConnector {
    fn endpoint(&self) -> String {
        "mock".to_string()
    }

    async fn open(&self, connect_timeout: Duration) -> Result<Box<dyn Link>, TransportError> {
        if !self.config.connect_delay.is_zero() {
            tokio::time::sleep(self.config.connect_delay).await;
        }

        let mut state = self.state.lock();
        state.open_attempts += 1;
        state.connect_timeouts.push(connect_timeout);
        let attempt = state.open_attempts;
        if state.fail_all || state.failing_attempts.contains(&attempt) {
            return Err(TransportError::ConnectionFailed(format!(
                "mock: connection attempt {attempt} refused"
            )));
        }

        state.next_conn += 1;
        let conn = state.next_conn;
        state.record(conn, WireEventKind::Opened);

        Ok(Box::new(MockLink {
            conn,
            config: self.config.clone(),
            state: Arc::clone(&self.state),
            reply: Reply::Nothing,
            closed: false,
        }))
    }
}

#[derive(Debug)]
enum Reply {
    /// Nothing will arrive; reads time out
    Nothing,
    Pending(Vec<u8>),
    /// Reply fully delivered; the peer has closed
    Delivered,
}

#[derive(Debug)]
struct MockLink {
    conn: usize,
    config: MockConnectorConfig,
    state: Arc<Mutex<MockState>>,
    reply: Reply,
    closed: bool,
}

#[async_trait]
impl Link for MockLink {
    async fn send(&mut self, data: &[u8]) -> Result<(), TransportError> {
        if self.closed {
            return Err(TransportError::SendFailed("mock: link closed".to_string()));
        }
        if !self.config.send_delay.is_zero() {
            tokio::time::sleep(self.config.send_delay).await;
        }
        // Give concurrent callers a chance to run between open and send
        tokio::task::yield_now().await;

        let mut state = self.state.lock();
        state.record(self.conn, WireEventKind::Sent(data.to_vec()));

        let payload = strip_markers(data);
        self.reply = if state.silent.contains(payload) {
            Reply::Nothing
        } else if let Some(raw) = state.responses.get(payload) {
            Reply::Pending(raw.clone())
        } else if self.config.echo {
            Reply::Pending(data.to_vec())
        } else {
            Reply::Nothing
        };

        Ok(())
    }

    async fn receive(
        &mut self,
        buffer: &mut [u8],
        timeout: Duration,
    ) -> Result<usize, TransportError> {
        match std::mem::replace(&mut self.reply, Reply::Delivered) {
            Reply::Pending(mut data) => {
                if !self.config.receive_delay.is_zero() {
                    tokio::time::sleep(self.config.receive_delay).await;
                }
                let n = data.len().min(buffer.len());
                buffer[..n].copy_from_slice(&data[..n]);
                if n < data.len() {
                    self.reply = Reply::Pending(data.split_off(n));
                }
                Ok(n)
            },
            Reply::Delivered => Ok(0),
            Reply::Nothing => {
                self.reply = Reply::Nothing;
                tokio::time::sleep(timeout).await;
                Err(TransportError::Timeout(format!(
                    "mock: no data within {timeout:?}"
                )))
            },
        }
    }

    async fn close(&mut self) -> Result<(), TransportError> {
        if !self.closed {
            self.closed = true;
            self.state.lock().record(self.conn, WireEventKind::Closed);
        }
        Ok(())
    }
}

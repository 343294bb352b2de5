//! Fireplace device simulator
//!
//! A TCP server speaking the fireplace wire protocol, for development without
//! hardware and for integration tests.

use std::net::SocketAddr;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use futures::{SinkExt, StreamExt};
use serde::Serialize;
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::RwLock;
use tokio_util::codec::Framed;
use tracing::{debug, error, info, warn};

use super::command::Command;
use super::constants::{
    FLAME_HW_MIN, STATUS_BITS_OFFSET, STATUS_BIT_BURNER2, STATUS_BIT_PILOT, STATUS_FLAME_OFFSET,
};
use super::frame::FrameCodec;
use crate::error::Result;

/// Device info block captured from a real module ("Lake Fireplace")
const STATUS_TEMPLATE: [u8; 53] = [
    0x03, 0x03, 0x00, 0x00, 0x00, 0x03, 0x5C, 0x8A, 0x82, 0xC9, 0x00, 0x04, 0x00, 0x00, 0x01,
    0x1F, 0x00, 0xC8, 0x4C, 0x61, 0x6B, 0x65, 0x20, 0x46, 0x69, 0x72, 0x65, 0x70, 0x6C, 0x61,
    0x63, 0x65, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00,
    0x00, 0x00, 0x00, 0x00, 0x00, 0x04, 0x42, 0x01,
];

/// Simulated device state
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SimulatedDevice {
    pub power: bool,
    /// Hardware flame value (0x80-0xFF), kept while off
    pub flame: u8,
    pub burner2: bool,
    pub pilot: bool,
    /// Power-on steps received so far, in order
    pub ignition_stage: u8,
}

impl Default for SimulatedDevice {
    fn default() -> Self {
        Self {
            power: false,
            flame: 0xBF,
            burner2: false,
            pilot: true,
            ignition_stage: 0,
        }
    }
}

impl SimulatedDevice {
    /// Apply one command to the device state
    pub fn apply(&mut self, command: Command) {
        match command {
            Command::Status => {},
            Command::PowerOnInit => self.ignition_stage = 1,
            Command::FirmwareQuery => {
                self.ignition_stage = if self.ignition_stage == 1 { 2 } else { 0 };
            },
            Command::Ignite => {
                if self.ignition_stage == 2 {
                    self.power = true;
                    self.pilot = true;
                } else {
                    debug!("Ignite out of sequence (stage {})", self.ignition_stage);
                }
                self.ignition_stage = 0;
            },
            Command::PowerOff => {
                self.power = false;
                self.ignition_stage = 0;
            },
            Command::SetFlame(value) if value >= FLAME_HW_MIN => self.flame = value,
            Command::SetFlame(value) => warn!("Ignoring flame value 0x{:02X}", value),
            Command::Burner2On => self.burner2 = true,
            Command::Burner2Off => self.burner2 = false,
        }
    }

    /// Build the 53-byte status reply for the current state
    pub fn status_bytes(&self) -> Vec<u8> {
        let mut bytes = STATUS_TEMPLATE.to_vec();
        bytes[STATUS_FLAME_OFFSET] = if self.power { self.flame } else { 0x00 };

        let mut bits =
            STATUS_TEMPLATE[STATUS_BITS_OFFSET] & !(STATUS_BIT_PILOT | STATUS_BIT_BURNER2);
        if self.pilot {
            bits |= STATUS_BIT_PILOT;
        }
        if self.burner2 {
            bits |= STATUS_BIT_BURNER2;
        }
        bytes[STATUS_BITS_OFFSET] = bits;
        bytes
    }
}

/// TCP fireplace simulator
#[derive(Debug, Clone, Default)]
pub struct DeviceSimulator {
    state: Arc<RwLock<SimulatedDevice>>,
    received: Arc<RwLock<Vec<Command>>>,
    silent: Arc<AtomicBool>,
}

impl DeviceSimulator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_state(state: SimulatedDevice) -> Self {
        Self {
            state: Arc::new(RwLock::new(state)),
            ..Self::default()
        }
    }

    /// Bind to `bind` and serve connections in the background
    ///
    /// Returns the bound address (useful with port 0).
    pub async fn start(&self, bind: &str) -> Result<SocketAddr> {
        let listener = TcpListener::bind(bind).await?;
        let local_addr = listener.local_addr()?;
        info!("Fireplace simulator listening on {}", local_addr);

        let simulator = self.clone();
        tokio::spawn(async move {
            loop {
                match listener.accept().await {
                    Ok((stream, peer)) => {
                        debug!("Simulator connection from {}", peer);
                        let simulator = simulator.clone();
                        tokio::spawn(async move {
                            if let Err(e) = simulator.handle_connection(stream).await {
                                debug!("Simulator connection from {} ended: {}", peer, e);
                            }
                        });
                    },
                    Err(e) => {
                        error!("Simulator accept failed: {}", e);
                        break;
                    },
                }
            }
        });

        Ok(local_addr)
    }

    /// Stop replying to anything (commands are still recorded and applied)
    pub fn set_silent(&self, silent: bool) {
        self.silent.store(silent, Ordering::SeqCst);
    }

    pub async fn state(&self) -> SimulatedDevice {
        self.state.read().await.clone()
    }

    pub async fn received_commands(&self) -> Vec<Command> {
        self.received.read().await.clone()
    }

    async fn handle_connection(&self, stream: TcpStream) -> std::io::Result<()> {
        let mut framed = Framed::new(stream, FrameCodec);

        while let Some(frame) = framed.next().await {
            let frame = frame?;

            let command = FrameCodec::decode_frame(&frame).and_then(|raw| Command::from_raw(&raw));
            let Some(command) = command else {
                warn!(
                    "Simulator received unknown frame {}, closing",
                    common::hex::encode_upper(&frame)
                );
                break;
            };

            debug!("Simulator received {}", command);
            self.received.write().await.push(command);

            let reply = {
                let mut state = self.state.write().await;
                state.apply(command);
                match command {
                    Command::Status => {
                        common::hex::encode_upper(&state.status_bytes()).into_bytes()
                    },
                    other => other.payload().into_owned(),
                }
            };

            if self.silent.load(Ordering::SeqCst) {
                continue;
            }
            framed.send(&reply[..]).await?;
        }

        Ok(())
    }
}

//! Fireplace wire protocol
//!
//! Frames, the flame value mapping, the command set, status parsing, the
//! serialized device client and a TCP device simulator.

pub mod client;
pub mod command;
pub mod constants;
pub mod frame;
pub mod mapping;
pub mod simulator;
pub mod status;

pub use client::{ClientTimings, FireplaceClient};
pub use command::{Command, POWER_ON_SEQUENCE};
pub use frame::FrameCodec;
pub use mapping::{hardware_to_percentage, percentage_to_hardware};
pub use simulator::DeviceSimulator;
pub use status::DeviceStatus;

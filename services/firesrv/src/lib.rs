//! Fireplace Control Service (firesrv)
//!
//! Controls a gas fireplace through its WiFi module, which speaks a small
//! ASCII-hex protocol over short-lived TCP connections.
//!
//! # Modules
//!
//! - **`protocol`**: frame codec, flame value mapping, command set, status
//!   parsing, the serialized device client and a device simulator
//! - **`transport`**: connection traits, TCP implementation, test mock
//! - **`controller`**: the `FireplaceController` trait with device-backed and
//!   simulated implementations
//! - **`config`**: layered configuration (defaults, file, environment)
//! - **`keys`**: SQLite store of hashed REST API keys
//! - **`api`**: REST API
//! - **`cli`**: command-line arguments

pub mod api;
pub mod cli;
pub mod config;
pub mod controller;
pub mod error;
pub mod keys;
pub mod protocol;
pub mod transport;

pub use config::AppConfig;
pub use controller::{create_controller, ControllerKind, FireplaceController, FireplaceStatus};
pub use error::{FireSrvError, Result};
pub use keys::ApiKeyStore;
pub use protocol::{DeviceSimulator, DeviceStatus, FireplaceClient};

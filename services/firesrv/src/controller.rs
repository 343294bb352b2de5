//! Fireplace controller abstraction
//!
//! The HTTP layer and CLI talk to a [`FireplaceController`]; configuration
//! decides whether that is the real device or an in-memory stand-in.

mod device;
mod simulated;

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::protocol::{DeviceStatus, FireplaceClient};

pub use device::DeviceController;
pub use simulated::SimulatedController;

/// Controller-level fireplace status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FireplaceStatus {
    pub power: bool,
    /// 0-100
    pub flame_level: u8,
    pub burner2: bool,
    pub pilot: bool,
}

impl From<&DeviceStatus> for FireplaceStatus {
    fn from(status: &DeviceStatus) -> Self {
        Self {
            power: status.power,
            flame_level: status.flame_level,
            burner2: status.burner2,
            pilot: status.pilot,
        }
    }
}

/// Which controller implementation to use
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ControllerKind {
    #[default]
    #[serde(alias = "real")]
    Device,
    Simulated,
}

impl ControllerKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ControllerKind::Device => "device",
            ControllerKind::Simulated => "simulated",
        }
    }
}

impl fmt::Display for ControllerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Operations every fireplace controller supports
#[async_trait]
pub trait FireplaceController: Send + Sync + fmt::Debug {
    fn kind(&self) -> ControllerKind;

    async fn get_status(&self) -> Result<FireplaceStatus>;

    async fn power_on(&self) -> bool;

    async fn power_off(&self) -> bool;

    /// `percentage` is 0-100; out-of-range handling is up to the implementation
    async fn set_flame_level(&self, percentage: i32) -> Result<bool>;

    async fn burner2_on(&self) -> bool;

    async fn burner2_off(&self) -> bool;
}

/// Build the controller selected by `kind`
pub fn create_controller(
    kind: ControllerKind,
    client: Arc<FireplaceClient>,
) -> Arc<dyn FireplaceController> {
    match kind {
        ControllerKind::Device => Arc::new(DeviceController::new(client)),
        ControllerKind::Simulated => Arc::new(SimulatedController::new()),
    }
}

use async_trait::async_trait;
use tokio::sync::RwLock;
use tracing::info;

use super::{ControllerKind, FireplaceController, FireplaceStatus};
use crate::error::Result;

/// In-memory fireplace for development without hardware
///
/// Every operation succeeds immediately. State lives as long as the
/// controller and starts powered off at 50% with the pilot lit.
#[derive(Debug)]
pub struct SimulatedController {
    state: RwLock<FireplaceStatus>,
}

impl Default for SimulatedController {
    fn default() -> Self {
        Self {
            state: RwLock::new(FireplaceStatus {
                power: false,
                flame_level: 50,
                burner2: false,
                pilot: true,
            }),
        }
    }
}

impl SimulatedController {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl FireplaceController for SimulatedController {
    fn kind(&self) -> ControllerKind {
        ControllerKind::Simulated
    }

    async fn get_status(&self) -> Result<FireplaceStatus> {
        Ok(*self.state.read().await)
    }

    async fn power_on(&self) -> bool {
        info!("[simulated] power on");
        self.state.write().await.power = true;
        true
    }

    async fn power_off(&self) -> bool {
        info!("[simulated] power off");
        self.state.write().await.power = false;
        true
    }

    async fn set_flame_level(&self, percentage: i32) -> Result<bool> {
        let level = percentage.clamp(0, 100) as u8;
        info!("[simulated] flame level {}%", level);
        self.state.write().await.flame_level = level;
        Ok(true)
    }

    async fn burner2_on(&self) -> bool {
        info!("[simulated] burner2 on");
        self.state.write().await.burner2 = true;
        true
    }

    async fn burner2_off(&self) -> bool {
        info!("[simulated] burner2 off");
        self.state.write().await.burner2 = false;
        true
    }
}

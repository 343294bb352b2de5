use std::sync::Arc;

use async_trait::async_trait;

use super::{ControllerKind, FireplaceController, FireplaceStatus};
use crate::error::Result;
use crate::protocol::FireplaceClient;

/// Controller backed by the physical fireplace
#[derive(Debug, Clone)]
pub struct DeviceController {
    client: Arc<FireplaceClient>,
}

impl DeviceController {
    pub fn new(client: Arc<FireplaceClient>) -> Self {
        Self { client }
    }
}

#[async_trait]
impl FireplaceController for DeviceController {
    fn kind(&self) -> ControllerKind {
        ControllerKind::Device
    }

    async fn get_status(&self) -> Result<FireplaceStatus> {
        let status = self.client.get_status().await?;
        Ok(FireplaceStatus::from(&status))
    }

    async fn power_on(&self) -> bool {
        self.client.power_on().await
    }

    async fn power_off(&self) -> bool {
        self.client.power_off().await
    }

    async fn set_flame_level(&self, percentage: i32) -> Result<bool> {
        self.client.set_flame_level(percentage).await
    }

    async fn burner2_on(&self) -> bool {
        self.client.burner2_on().await
    }

    async fn burner2_off(&self) -> bool {
        self.client.burner2_off().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::FireSrvError;
    use crate::protocol::constants::CMD_STATUS;
    use crate::protocol::{ClientTimings, FrameCodec};
    use crate::transport::mock::MockConnector;

    fn controller(connector: &MockConnector) -> DeviceController {
        DeviceController::new(Arc::new(FireplaceClient::new(
            Arc::new(connector.clone()),
            ClientTimings::default(),
        )))
    }

    #[tokio::test]
    async fn test_get_status_converts_device_status() {
        let connector = MockConnector::new();
        let mut bytes = vec![0u8; 53];
        bytes[7] = 0xFF;
        bytes[9] = 0x88;
        connector.respond_to(
            CMD_STATUS,
            &FrameCodec::encode_frame(common::hex::encode_upper(&bytes).as_bytes()),
        );

        let status = controller(&connector).get_status().await.unwrap();
        assert_eq!(
            status,
            FireplaceStatus {
                power: true,
                flame_level: 100,
                burner2: true,
                pilot: true,
            }
        );
    }

    #[tokio::test]
    async fn test_errors_pass_through() {
        let connector = MockConnector::new();
        connector.fail_all_connections();
        let controller = controller(&connector);

        assert!(controller.get_status().await.unwrap_err().is_connection_error());
        assert!(!controller.burner2_on().await);
        assert!(matches!(
            controller.set_flame_level(101).await,
            Err(FireSrvError::ValidationError(_))
        ));
    }
}

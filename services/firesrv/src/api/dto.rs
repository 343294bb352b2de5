//! Response bodies

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::keys::{ApiKeyInfo, NewApiKey};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub controller: String,
    pub dev_mode: bool,
    pub version: String,
    pub timestamp: DateTime<Utc>,
}

/// Result of a state-changing command
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommandResponse {
    pub status: String,
    pub message: String,
}

impl CommandResponse {
    pub fn ok(message: impl Into<String>) -> Self {
        Self {
            status: "ok".to_string(),
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateApiKeyRequest {
    pub name: String,
}

/// Returned once on creation; the key cannot be retrieved later
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreatedApiKeyResponse {
    pub id: i64,
    pub name: String,
    pub key: String,
    pub message: String,
}

impl From<NewApiKey> for CreatedApiKeyResponse {
    fn from(created: NewApiKey) -> Self {
        Self {
            id: created.id,
            name: created.name,
            key: created.key,
            message: "Save this key - it won't be shown again!".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiKeyListResponse {
    pub keys: Vec<ApiKeyInfo>,
}

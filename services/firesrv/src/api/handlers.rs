//! Request handlers

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::Json;
use common::{AppError, SuccessResponse};
use tracing::info;

use super::dto::{
    ApiKeyListResponse, CommandResponse, CreateApiKeyRequest, CreatedApiKeyResponse,
    HealthResponse,
};
use super::AppState;
use crate::controller::FireplaceStatus;
use crate::protocol::DeviceStatus;

type ApiResult<T> = Result<Json<SuccessResponse<T>>, AppError>;

fn ok<T>(data: T) -> ApiResult<T> {
    Ok(Json(SuccessResponse::new(data)))
}

/// Map a controller's boolean outcome to a response
fn command_result(succeeded: bool, done: &str, failed: &str) -> ApiResult<CommandResponse> {
    if succeeded {
        ok(CommandResponse::ok(done))
    } else {
        Err(AppError::internal_error(failed))
    }
}

fn check_flame_level(level: i32) -> Result<(), AppError> {
    if (0..=100).contains(&level) {
        Ok(())
    } else {
        Err(AppError::bad_request(format!(
            "Flame level must be between 0 and 100, got {}",
            level
        )))
    }
}

pub async fn health(
    State(state): State<Arc<AppState>>,
) -> Json<SuccessResponse<HealthResponse>> {
    Json(SuccessResponse::new(HealthResponse {
        status: "ok".to_string(),
        controller: state.controller.kind().to_string(),
        dev_mode: state.config.service.dev_mode,
        version: env!("CARGO_PKG_VERSION").to_string(),
        timestamp: chrono::Utc::now(),
    }))
}

pub async fn get_status(State(state): State<Arc<AppState>>) -> ApiResult<FireplaceStatus> {
    ok(state.controller.get_status().await?)
}

pub async fn power_on(State(state): State<Arc<AppState>>) -> ApiResult<CommandResponse> {
    info!("API: power on");
    command_result(
        state.controller.power_on().await,
        "Fireplace powered on",
        "Failed to power on fireplace",
    )
}

pub async fn power_off(State(state): State<Arc<AppState>>) -> ApiResult<CommandResponse> {
    info!("API: power off");
    command_result(
        state.controller.power_off().await,
        "Fireplace powered off",
        "Failed to power off fireplace",
    )
}

pub async fn set_flame(
    State(state): State<Arc<AppState>>,
    Path(level): Path<i32>,
) -> ApiResult<CommandResponse> {
    check_flame_level(level)?;
    info!("API: flame level {}%", level);
    command_result(
        state.controller.set_flame_level(level).await?,
        &format!("Flame level set to {}%", level),
        "Failed to set flame level",
    )
}

pub async fn burner2_on(State(state): State<Arc<AppState>>) -> ApiResult<CommandResponse> {
    command_result(
        state.controller.burner2_on().await,
        "Burner 2 turned on",
        "Failed to turn on burner 2",
    )
}

pub async fn burner2_off(State(state): State<Arc<AppState>>) -> ApiResult<CommandResponse> {
    command_result(
        state.controller.burner2_off().await,
        "Burner 2 turned off",
        "Failed to turn off burner 2",
    )
}

pub async fn list_api_keys(
    State(state): State<Arc<AppState>>,
) -> ApiResult<ApiKeyListResponse> {
    ok(ApiKeyListResponse {
        keys: state.keys.list().await?,
    })
}

pub async fn create_api_key(
    State(state): State<Arc<AppState>>,
    Json(body): Json<CreateApiKeyRequest>,
) -> ApiResult<CreatedApiKeyResponse> {
    let created = state.keys.create(&body.name).await?;
    ok(created.into())
}

pub async fn delete_api_key(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> ApiResult<CommandResponse> {
    if state.keys.delete(id).await? {
        ok(CommandResponse::ok("API key deleted"))
    } else {
        Err(AppError::not_found(format!("API key {} not found", id)))
    }
}

// Dev-mode routes: unauthenticated, always against the physical device

pub async fn test_status(State(state): State<Arc<AppState>>) -> ApiResult<DeviceStatus> {
    ok(state.device.get_status().await?)
}

pub async fn test_flame(
    State(state): State<Arc<AppState>>,
    Path(level): Path<i32>,
) -> ApiResult<CommandResponse> {
    check_flame_level(level)?;
    command_result(
        state.device.set_flame_level(level).await?,
        &format!("Flame level set to {}%", level),
        "Failed to set flame level",
    )
}

pub async fn test_burner2(
    State(state): State<Arc<AppState>>,
    Path(switch): Path<String>,
) -> ApiResult<CommandResponse> {
    match switch.as_str() {
        "on" => command_result(
            state.device.burner2_on().await,
            "Burner 2 turned on",
            "Failed to turn on burner 2",
        ),
        "off" => command_result(
            state.device.burner2_off().await,
            "Burner 2 turned off",
            "Failed to turn off burner 2",
        ),
        other => Err(AppError::bad_request(format!(
            "Burner 2 state must be 'on' or 'off', got '{}'",
            other
        ))),
    }
}

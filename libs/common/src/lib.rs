//! Shared utilities for the fireplace control service
//!
//! Provides functions used across the workspace:
//! - hex encoding/decoding for the ASCII-hex wire format
//! - logging bootstrap and HTTP access logging
//! - API response envelope types
//! - shutdown signal handling

pub mod api_types;
pub mod hex;
pub mod logging;
pub mod shutdown;

pub use api_types::{ErrorInfo, ErrorResponse, SuccessResponse};

#[cfg(feature = "axum")]
pub use api_types::AppError;

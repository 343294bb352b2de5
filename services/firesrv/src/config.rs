//! Service configuration
//!
//! Layering, lowest priority first:
//! 1. built-in defaults
//! 2. optional configuration file (`.yaml`/`.yml`, `.toml` or `.json`)
//! 3. legacy variables `FIREPLACE_IP`, `FIREPLACE_PORT`,
//!    `FIREPLACE_CONTROLLER`, `DEV_MODE` and `DATABASE_PATH`
//! 4. `FIRESRV_` variables, `__` separating sections
//!    (e.g. `FIRESRV_FIREPLACE__PORT=2001`)

use std::net::SocketAddr;
use std::path::Path;
use std::time::Duration;

use figment::providers::{Env, Format, Json, Serialized, Toml, Yaml};
use figment::Figment;
use serde::{Deserialize, Serialize};

use crate::controller::ControllerKind;
use crate::error::{FireSrvError, Result};
use crate::protocol::constants::{DEFAULT_DEVICE_HOST, DEFAULT_DEVICE_PORT};
use crate::protocol::ClientTimings;

/// Environment variable prefix for nested overrides
pub const ENV_PREFIX: &str = "FIRESRV_";

/// Plain variables kept for existing deployments, with their config paths
const LEGACY_ENV: [(&str, &str); 5] = [
    ("FIREPLACE_IP", "fireplace.host"),
    ("FIREPLACE_PORT", "fireplace.port"),
    ("FIREPLACE_CONTROLLER", "fireplace.controller"),
    ("DEV_MODE", "service.dev_mode"),
    ("DATABASE_PATH", "api.database_path"),
];

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub service: ServiceConfig,
    pub fireplace: FireplaceConfig,
    pub api: ApiConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServiceConfig {
    pub name: String,
    pub bind_address: String,
    /// Enables the unauthenticated `/test/*` routes
    pub dev_mode: bool,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            name: "firesrv".to_string(),
            bind_address: "0.0.0.0:8000".to_string(),
            dev_mode: false,
        }
    }
}

/// Device connection settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FireplaceConfig {
    pub host: String,
    pub port: u16,
    pub controller: ControllerKind,
    pub connect_timeout_ms: u64,
    pub command_timeout_ms: u64,
    pub status_timeout_ms: u64,
    pub step_timeout_ms: u64,
    pub step_pause_ms: u64,
}

impl Default for FireplaceConfig {
    fn default() -> Self {
        let timings = ClientTimings::default();
        Self {
            host: DEFAULT_DEVICE_HOST.to_string(),
            port: DEFAULT_DEVICE_PORT,
            controller: ControllerKind::default(),
            connect_timeout_ms: millis(timings.connect_timeout),
            command_timeout_ms: millis(timings.command_timeout),
            status_timeout_ms: millis(timings.status_timeout),
            step_timeout_ms: millis(timings.step_timeout),
            step_pause_ms: millis(timings.step_pause),
        }
    }
}

fn millis(duration: Duration) -> u64 {
    duration.as_millis() as u64
}

impl FireplaceConfig {
    pub fn timings(&self) -> ClientTimings {
        ClientTimings {
            connect_timeout: Duration::from_millis(self.connect_timeout_ms),
            status_timeout: Duration::from_millis(self.status_timeout_ms),
            command_timeout: Duration::from_millis(self.command_timeout_ms),
            step_timeout: Duration::from_millis(self.step_timeout_ms),
            step_pause: Duration::from_millis(self.step_pause_ms),
        }
    }
}

/// REST API authentication
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    /// With auth required and no stored keys every protected request is refused
    pub require_auth: bool,
    /// SQLite file holding the hashed API keys
    pub database_path: String,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            require_auth: true,
            database_path: "fireplace.db".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
        }
    }
}

impl AppConfig {
    /// Load and validate configuration
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let config: AppConfig = Self::figment(path)?.extract()?;
        config.validate()?;
        Ok(config)
    }

    /// Provider chain without extraction
    pub fn figment(path: Option<&Path>) -> Result<Figment> {
        let mut figment = Figment::from(Serialized::defaults(AppConfig::default()));

        if let Some(path) = path {
            if !path.exists() {
                return Err(FireSrvError::config(format!(
                    "Configuration file not found: {}",
                    path.display()
                )));
            }

            let extension = path
                .extension()
                .and_then(|ext| ext.to_str())
                .unwrap_or("")
                .to_ascii_lowercase();
            figment = match extension.as_str() {
                "yaml" | "yml" => figment.merge(Yaml::file(path)),
                "toml" => figment.merge(Toml::file(path)),
                "json" => figment.merge(Json::file(path)),
                other => {
                    return Err(FireSrvError::config(format!(
                        "Unsupported configuration format '{}': {}",
                        other,
                        path.display()
                    )));
                },
            };
        }

        let legacy_keys: Vec<&str> = LEGACY_ENV.iter().map(|(var, _)| *var).collect();
        let legacy = Env::raw().only(&legacy_keys).map(|key| {
            LEGACY_ENV
                .iter()
                .find(|(var, _)| key.as_str().eq_ignore_ascii_case(var))
                .map(|(_, path)| (*path).into())
                .unwrap_or_else(|| key.into())
        });

        Ok(figment
            .merge(legacy)
            .merge(Env::prefixed(ENV_PREFIX).split("__")))
    }

    pub fn validate(&self) -> Result<()> {
        if self.fireplace.host.trim().is_empty() {
            return Err(FireSrvError::config("fireplace.host cannot be empty"));
        }
        if self.fireplace.port == 0 {
            return Err(FireSrvError::config("fireplace.port cannot be zero"));
        }

        for (name, value) in [
            ("connect_timeout_ms", self.fireplace.connect_timeout_ms),
            ("command_timeout_ms", self.fireplace.command_timeout_ms),
            ("status_timeout_ms", self.fireplace.status_timeout_ms),
            ("step_timeout_ms", self.fireplace.step_timeout_ms),
        ] {
            if value == 0 {
                return Err(FireSrvError::config(format!(
                    "fireplace.{} must be greater than zero",
                    name
                )));
            }
        }

        self.bind_address()?;

        if self.api.database_path.trim().is_empty() {
            return Err(FireSrvError::config("api.database_path cannot be empty"));
        }

        if self.logging.level.trim().is_empty() {
            return Err(FireSrvError::config("logging.level cannot be empty"));
        }

        Ok(())
    }

    pub fn bind_address(&self) -> Result<SocketAddr> {
        self.service.bind_address.parse().map_err(|e| {
            FireSrvError::config(format!(
                "Invalid service.bind_address '{}': {}",
                self.service.bind_address, e
            ))
        })
    }

    pub fn log_config(&self) -> common::logging::LogConfig {
        common::logging::LogConfig {
            service_name: self.service.name.clone(),
            level: self.logging.level.clone(),
            json: self.logging.json,
            ..Default::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use figment::Jail;

    #[test]
    fn test_defaults() {
        let config = AppConfig::default();
        assert_eq!(config.fireplace.host, "192.168.0.22");
        assert_eq!(config.fireplace.port, 2000);
        assert_eq!(config.fireplace.controller, ControllerKind::Device);
        assert_eq!(config.service.bind_address, "0.0.0.0:8000");
        assert!(!config.service.dev_mode);
        assert!(config.api.require_auth);
        assert_eq!(config.api.database_path, "fireplace.db");
        assert_eq!(config.fireplace.timings(), ClientTimings::default());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_load_without_file_uses_defaults() {
        Jail::expect_with(|_jail| {
            let config = AppConfig::load(None).map_err(|e| e.to_string())?;
            assert_eq!(config, AppConfig::default());
            Ok(())
        });
    }

    #[test]
    fn test_load_yaml_file() {
        Jail::expect_with(|jail| {
            jail.create_file(
                "firesrv.yaml",
                r#"
service:
  bind_address: "127.0.0.1:9000"
  dev_mode: true
fireplace:
  host: "10.0.0.7"
  controller: simulated
  step_pause_ms: 250
api:
  database_path: "/var/lib/firesrv/keys.db"
"#,
            )?;

            let config =
                AppConfig::load(Some(Path::new("firesrv.yaml"))).map_err(|e| e.to_string())?;
            assert_eq!(config.fireplace.host, "10.0.0.7");
            assert_eq!(config.fireplace.port, 2000);
            assert_eq!(config.fireplace.controller, ControllerKind::Simulated);
            assert_eq!(
                config.fireplace.timings().step_pause,
                Duration::from_millis(250)
            );
            assert!(config.service.dev_mode);
            assert_eq!(config.api.database_path, "/var/lib/firesrv/keys.db");
            Ok(())
        });
    }

    #[test]
    fn test_load_toml_file() {
        Jail::expect_with(|jail| {
            jail.create_file(
                "firesrv.toml",
                r#"
[fireplace]
port = 2001
controller = "real"

[logging]
json = true
"#,
            )?;

            let config =
                AppConfig::load(Some(Path::new("firesrv.toml"))).map_err(|e| e.to_string())?;
            assert_eq!(config.fireplace.port, 2001);
            assert_eq!(config.fireplace.controller, ControllerKind::Device);
            assert!(config.logging.json);
            Ok(())
        });
    }

    #[test]
    fn test_legacy_env_overrides_file() {
        Jail::expect_with(|jail| {
            jail.create_file("firesrv.json", r#"{"fireplace": {"host": "10.0.0.7"}}"#)?;
            jail.set_env("FIREPLACE_IP", "10.1.1.1");
            jail.set_env("FIREPLACE_PORT", "2100");
            jail.set_env("FIREPLACE_CONTROLLER", "simulated");
            jail.set_env("DEV_MODE", "true");
            jail.set_env("DATABASE_PATH", "legacy.db");

            let config =
                AppConfig::load(Some(Path::new("firesrv.json"))).map_err(|e| e.to_string())?;
            assert_eq!(config.fireplace.host, "10.1.1.1");
            assert_eq!(config.fireplace.port, 2100);
            assert_eq!(config.fireplace.controller, ControllerKind::Simulated);
            assert!(config.service.dev_mode);
            assert_eq!(config.api.database_path, "legacy.db");
            Ok(())
        });
    }

    #[test]
    fn test_prefixed_env_has_highest_priority() {
        Jail::expect_with(|jail| {
            jail.set_env("FIREPLACE_PORT", "2100");
            jail.set_env("FIRESRV_FIREPLACE__PORT", "2200");
            jail.set_env("FIRESRV_API__REQUIRE_AUTH", "false");

            let config = AppConfig::load(None).map_err(|e| e.to_string())?;
            assert_eq!(config.fireplace.port, 2200);
            assert!(!config.api.require_auth);
            Ok(())
        });
    }

    #[test]
    fn test_load_rejects_missing_and_unknown_files() {
        Jail::expect_with(|jail| {
            let err = AppConfig::load(Some(Path::new("absent.yaml"))).unwrap_err();
            assert!(matches!(err, FireSrvError::ConfigError(_)));

            jail.create_file("firesrv.ini", "port=1")?;
            let err = AppConfig::load(Some(Path::new("firesrv.ini"))).unwrap_err();
            assert!(matches!(err, FireSrvError::ConfigError(_)));
            Ok(())
        });
    }

    #[test]
    fn test_load_rejects_invalid_values() {
        Jail::expect_with(|jail| {
            jail.set_env("FIRESRV_FIREPLACE__PORT", "0");
            let err = AppConfig::load(None).unwrap_err();
            assert!(matches!(err, FireSrvError::ConfigError(_)));

            jail.set_env("FIRESRV_FIREPLACE__PORT", "not-a-port");
            assert!(AppConfig::load(None).is_err());
            Ok(())
        });
    }

    #[test]
    fn test_validate() {
        let mut config = AppConfig::default();
        config.fireplace.host = " ".to_string();
        assert!(config.validate().is_err());

        let mut config = AppConfig::default();
        config.fireplace.status_timeout_ms = 0;
        assert!(config.validate().is_err());

        let mut config = AppConfig::default();
        config.fireplace.step_pause_ms = 0;
        assert!(config.validate().is_ok());

        let mut config = AppConfig::default();
        config.service.bind_address = "localhost".to_string();
        assert!(config.validate().is_err());

        let mut config = AppConfig::default();
        config.api.database_path = String::new();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_log_config() {
        let mut config = AppConfig::default();
        config.logging.level = "debug".to_string();
        config.logging.json = true;

        let log = config.log_config();
        assert_eq!(log.service_name, "firesrv");
        assert_eq!(log.level, "debug");
        assert!(log.json);
    }
}

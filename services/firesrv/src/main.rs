//! Fireplace Control Service
//!
//! REST API and one-shot CLI for a gas fireplace WiFi module.

use std::sync::Arc;

use anyhow::{anyhow, bail, Context};
use clap::Parser;
use serde::Serialize;
use tracing::{debug, info, warn};

use firesrv::api::{self, AppState};
use firesrv::cli::{Args, Commands, KeyAction, Switch};
use firesrv::{create_controller, ApiKeyStore, AppConfig, DeviceSimulator, FireplaceClient};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let mut config =
        AppConfig::load(args.config.as_deref()).context("Failed to load configuration")?;
    args.apply_overrides(&mut config);
    config.validate().context("Invalid configuration")?;

    let mut log_config = config.log_config();
    log_config.ansi = !args.no_color;
    common::logging::init_with_config(&log_config)
        .map_err(|e| anyhow!("Failed to initialize logging: {}", e))?;
    debug!("Configuration: {:?}", config);

    let client = Arc::new(FireplaceClient::tcp(&config.fireplace)?);
    let controller = create_controller(config.fireplace.controller, Arc::clone(&client));

    match args.command() {
        Commands::Serve => {
            info!(
                "Starting {} v{} (fireplace at {})",
                config.service.name,
                env!("CARGO_PKG_VERSION"),
                client.endpoint()
            );
            let keys = ApiKeyStore::open(&config.api.database_path).await?;
            if config.api.require_auth && keys.count().await? == 0 {
                warn!("No API keys stored; create one with `firesrv keys create <name>`");
            }
            let state = Arc::new(AppState::new(controller, client, keys, config));
            api::serve(state).await?;
        },
        Commands::Status => print_json(&controller.get_status().await?)?,
        Commands::Power { state } => {
            let done = match state {
                Switch::On => controller.power_on().await,
                Switch::Off => controller.power_off().await,
            };
            report(done)?;
        },
        Commands::Flame { level } => report(controller.set_flame_level(level).await?)?,
        Commands::Burner2 { state } => {
            let done = match state {
                Switch::On => controller.burner2_on().await,
                Switch::Off => controller.burner2_off().await,
            };
            report(done)?;
        },
        Commands::Simulate { bind } => {
            let simulator = DeviceSimulator::new();
            let addr = simulator.start(&bind).await?;
            info!("Simulator ready on {}, press Ctrl+C to stop", addr);
            common::shutdown::wait_for_shutdown().await;
        },
        Commands::Keys { action } => {
            let keys = ApiKeyStore::open(&config.api.database_path).await?;
            match action {
                KeyAction::List => print_json(&keys.list().await?)?,
                KeyAction::Create { name } => print_json(&keys.create(&name).await?)?,
                KeyAction::Delete { id } => {
                    if !keys.delete(id).await? {
                        bail!("API key {} not found", id);
                    }
                    print_json(&serde_json::json!({ "deleted": id }))?;
                },
            }
        },
    }

    Ok(())
}

fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn report(done: bool) -> anyhow::Result<()> {
    print_json(&serde_json::json!({ "success": done }))?;
    if !done {
        bail!("Fireplace did not accept the command");
    }
    Ok(())
}

//! Command-line arguments

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

use crate::config::AppConfig;

#[derive(Parser, Debug, Clone)]
#[command(
    name = "firesrv",
    version = env!("CARGO_PKG_VERSION"),
    about = "Fireplace Control Service",
    long_about = None
)]
pub struct Args {
    /// Configuration file (.yaml, .toml or .json)
    #[arg(short = 'c', long)]
    pub config: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short = 'l', long)]
    pub log_level: Option<String>,

    /// Bind address for the API server
    #[arg(short = 'b', long)]
    pub bind_address: Option<String>,

    /// Disable colored output
    #[arg(long)]
    pub no_color: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Commands {
    /// Run the REST API (default)
    Serve,
    /// Print the fireplace status as JSON
    Status,
    /// Switch the fireplace on or off
    Power {
        #[arg(value_enum)]
        state: Switch,
    },
    /// Set the flame level (0-100)
    Flame {
        #[arg(allow_negative_numbers = true)]
        level: i32,
    },
    /// Switch the second burner on or off
    Burner2 {
        #[arg(value_enum)]
        state: Switch,
    },
    /// Run a device simulator on a local TCP port
    Simulate {
        #[arg(long, default_value = "127.0.0.1:2000")]
        bind: String,
    },
    /// Manage REST API keys
    Keys {
        #[command(subcommand)]
        action: KeyAction,
    },
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum KeyAction {
    /// List stored keys (prefixes only)
    List,
    /// Create a key and print it once
    Create { name: String },
    /// Revoke a key by id
    Delete { id: i64 },
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Switch {
    On,
    Off,
}

impl Args {
    /// Command-line flags win over every configuration source
    pub fn apply_overrides(&self, config: &mut AppConfig) {
        if let Some(level) = &self.log_level {
            config.logging.level = level.clone();
        }
        if let Some(bind) = &self.bind_address {
            config.service.bind_address = bind.clone();
        }
    }

    pub fn command(&self) -> Commands {
        self.command.clone().unwrap_or(Commands::Serve)
    }
}

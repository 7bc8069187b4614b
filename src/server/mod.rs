//! Server orchestration for the forum daemon.
//!
//! This module exposes the command-line interface and reusable entry points
//! so the binary stays a thin wrapper that only needs to call [`run`].

pub mod admin;
pub mod cli;
pub mod daemon;

use anyhow::{Context, Result};
use clap::Parser;
pub use cli::{AppConfig, Cli, Commands, ConfigOverrides, CreateUserArgs, SetRoleArgs};
pub use daemon::{run_daemon, setup_database};

pub use self::admin::run_command;
use crate::telemetry;

/// Parse CLI arguments and execute the requested command or daemon.
///
/// # Errors
///
/// Returns any error emitted while loading configuration or running the
/// requested action.
pub async fn run() -> Result<()> {
    let cli = Cli::parse();
    run_with_cli(cli).await
}

/// Execute the server logic using an already parsed [`Cli`].
///
/// # Errors
///
/// Propagates configuration, logging set-up, command and daemon failures.
pub async fn run_with_cli(cli: Cli) -> Result<()> {
    let Cli { config, command } = cli;
    let cfg = AppConfig::load(&config).context("failed to load configuration")?;
    telemetry::init(cfg.log_format)?;
    match command {
        Some(admin) => run_command(admin, &cfg).await,
        None => run_daemon(cfg).await,
    }
}

//! Command-line interface and layered configuration for `forumd`.
//!
//! Configuration is resolved in increasing priority: compiled defaults, the
//! TOML file (`.forumd.toml` in the working directory unless `--config`
//! names another), `FORUMD_*` environment variables, then command-line flags.

use std::path::PathBuf;

use argon2::Params;
use clap::{Args, Parser, Subcommand};
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};

use crate::{roles::Role, telemetry::LogFormat};

/// Default configuration file, looked up in the working directory.
pub const CONFIG_FILE: &str = ".forumd.toml";
/// Prefix of configuration environment variables.
pub const ENV_PREFIX: &str = "FORUMD_";

/// Fully resolved runtime configuration.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct AppConfig {
    /// Socket address the HTTP server binds to.
    pub bind: String,
    /// Database connection string or `SQLite` path.
    pub database: String,
    /// Maximum pooled database connections.
    pub pool_size: u32,
    /// Argon2 memory cost parameter.
    pub argon2_m_cost: u32,
    /// Argon2 time cost parameter.
    pub argon2_t_cost: u32,
    /// Argon2 parallelism cost parameter.
    pub argon2_p_cost: u32,
    /// Lifetime of a login session in hours.
    pub session_ttl_hours: u32,
    /// Send the session cookie with the `Secure` attribute.
    pub secure_cookies: bool,
    /// Log line format.
    pub log_format: LogFormat,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            bind: "0.0.0.0:5000".to_owned(),
            database: "forumd.db".to_owned(),
            pool_size: 8,
            argon2_m_cost: Params::DEFAULT_M_COST,
            argon2_t_cost: Params::DEFAULT_T_COST,
            argon2_p_cost: Params::DEFAULT_P_COST,
            session_ttl_hours: 24 * 7,
            secure_cookies: false,
            log_format: LogFormat::default(),
        }
    }
}

impl AppConfig {
    /// Resolve configuration from every layer, with `overrides` on top.
    ///
    /// # Errors
    /// Returns a [`figment::Error`] when a layer holds a value of the wrong
    /// type or the configuration file is malformed.
    pub fn load(overrides: &ConfigOverrides) -> Result<Self, figment::Error> {
        let file = overrides
            .config
            .clone()
            .unwrap_or_else(|| PathBuf::from(CONFIG_FILE));
        Figment::from(Serialized::defaults(Self::default()))
            .merge(Toml::file(file))
            .merge(Env::prefixed(ENV_PREFIX))
            .merge(Serialized::defaults(overrides))
            .extract()
    }
}

/// Flags that override file and environment configuration.
#[derive(Args, Serialize, Default, Debug, Clone)]
pub struct ConfigOverrides {
    /// Path to a TOML configuration file.
    #[arg(long, short = 'c', global = true)]
    #[serde(skip)]
    pub config: Option<PathBuf>,
    /// Server bind address.
    #[arg(long, global = true)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bind: Option<String>,
    /// Database connection string or path.
    #[arg(long, global = true)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub database: Option<String>,
    /// Maximum pooled database connections.
    #[arg(long, global = true)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pool_size: Option<u32>,
    /// Argon2 memory cost parameter.
    #[arg(long, global = true)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub argon2_m_cost: Option<u32>,
    /// Argon2 time cost parameter.
    #[arg(long, global = true)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub argon2_t_cost: Option<u32>,
    /// Argon2 parallelism cost parameter.
    #[arg(long, global = true)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub argon2_p_cost: Option<u32>,
    /// Session lifetime in hours.
    #[arg(long, global = true)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub session_ttl_hours: Option<u32>,
    /// Mark the session cookie `Secure`.
    #[arg(long, global = true, num_args = 0..=1, default_missing_value = "true")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub secure_cookies: Option<bool>,
    /// Log line format.
    #[arg(long, global = true, value_enum)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub log_format: Option<LogFormat>,
}

/// Arguments for the `create-user` administrative subcommand.
#[derive(Args, Debug, Clone)]
pub struct CreateUserArgs {
    /// Username for the new account.
    #[arg(long)]
    pub username: String,
    /// Email address for the new account.
    #[arg(long)]
    pub email: String,
    /// Password for the new account.
    #[arg(long, env = "FORUMD_NEW_USER_PASSWORD", hide_env_values = true)]
    pub password: String,
    /// Role granted to the account.
    #[arg(long, default_value_t = Role::Member)]
    pub role: Role,
}

/// Arguments for the `set-role` administrative subcommand.
#[derive(Args, Debug, Clone)]
pub struct SetRoleArgs {
    /// Account to change.
    #[arg(long)]
    pub username: String,
    /// Role to grant.
    #[arg(long)]
    pub role: Role,
}

/// Arguments for the `set-active` administrative subcommand.
#[derive(Args, Debug, Clone)]
pub struct SetActiveArgs {
    /// Account to change.
    #[arg(long)]
    pub username: String,
    /// `false` bans the account; `true` restores it.
    #[arg(long, action = clap::ArgAction::Set)]
    pub active: bool,
}

/// Administrative subcommands. Without one, the daemon starts.
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Create a user account, optionally with an elevated role.
    #[command(name = "create-user")]
    CreateUser(CreateUserArgs),
    /// Change the role of an existing account.
    #[command(name = "set-role")]
    SetRole(SetRoleArgs),
    /// Ban or reinstate an existing account.
    #[command(name = "set-active")]
    SetActive(SetActiveArgs),
}

/// Top-level CLI entry point consumed by the binary.
#[derive(Parser, Debug, Clone)]
#[command(name = "forumd", version, about = "REST backend for the tribute forum")]
pub struct Cli {
    /// Configuration overrides.
    #[command(flatten)]
    pub config: ConfigOverrides,
    /// Optional subcommand.
    #[command(subcommand)]
    pub command: Option<Commands>,
}

//! Configuration module for fib-server.
//!
//! Supports both command-line arguments and a TOML configuration file.
//! CLI arguments take precedence over config file values.

use crate::compute::ComputeMode;
use crate::handler::DEFAULT_BUFFER_SIZE;
use crate::runtime::DEFAULT_STACK_SIZE;
use clap::Parser;
use serde::Deserialize;
use std::path::PathBuf;

/// Command-line arguments for the server
#[derive(Parser, Debug)]
#[command(name = "fib-server")]
#[command(version = "0.1.0")]
#[command(about = "Answers decimal indices with Fibonacci numbers, one per line", long_about = None)]
pub struct CliArgs {
    /// Address to listen on (e.g., 127.0.0.1:25000)
    pub listen: Option<String>,

    /// Path to TOML configuration file
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Bytes read per request; longer lines are split across reads
    #[arg(short = 'b', long)]
    pub buffer_size: Option<usize>,

    /// Listen backlog passed to the kernel
    #[arg(long)]
    pub backlog: Option<i32>,

    /// Number of runtime worker threads (defaults to number of CPU cores)
    #[arg(short = 'w', long)]
    pub workers: Option<usize>,

    /// Stack size in bytes for runtime threads; bounds the deepest index computable
    #[arg(long)]
    pub stack_size: Option<usize>,

    /// Where to run computations: inline or blocking
    #[arg(long)]
    pub compute: Option<ComputeMode>,

    /// Reject requests whose index exceeds this value (unbounded if unset)
    #[arg(long)]
    pub max_index: Option<i64>,

    /// Log level (trace, debug, info, warn, error) [default: info]
    #[arg(long)]
    pub log_level: Option<String>,
}

/// TOML configuration file structure
#[derive(Debug, Deserialize, Default)]
pub struct TomlConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub connection: ConnectionConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Listener-related configuration
#[derive(Debug, Deserialize)]
pub struct ServerConfig {
    pub listen: Option<String>,
    pub workers: Option<usize>,
    #[serde(default = "default_backlog")]
    pub backlog: i32,
    #[serde(default = "default_stack_size")]
    pub stack_size: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen: None,
            workers: None,
            backlog: default_backlog(),
            stack_size: default_stack_size(),
        }
    }
}

/// Per-connection configuration
#[derive(Debug, Deserialize)]
pub struct ConnectionConfig {
    #[serde(default = "default_buffer_size")]
    pub buffer_size: usize,
    #[serde(default)]
    pub compute: ComputeMode,
    pub max_index: Option<i64>,
}

impl Default for ConnectionConfig {
    fn default() -> Self {
        Self {
            buffer_size: default_buffer_size(),
            compute: ComputeMode::default(),
            max_index: None,
        }
    }
}

/// Logging configuration
#[derive(Debug, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

fn default_backlog() -> i32 {
    5
}

fn default_stack_size() -> usize {
    DEFAULT_STACK_SIZE
}

fn default_buffer_size() -> usize {
    DEFAULT_BUFFER_SIZE
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Final resolved configuration
#[derive(Debug, Clone)]
pub struct Config {
    pub listen: String,
    pub workers: Option<usize>,
    pub backlog: i32,
    pub stack_size: usize,
    pub buffer_size: usize,
    pub compute: ComputeMode,
    pub max_index: Option<i64>,
    pub log_level: String,
}

impl Config {
    /// Default settings for the given listen address.
    pub fn new(listen: impl Into<String>) -> Self {
        let connection = ConnectionConfig::default();
        Config {
            listen: listen.into(),
            workers: None,
            backlog: default_backlog(),
            stack_size: default_stack_size(),
            buffer_size: connection.buffer_size,
            compute: connection.compute,
            max_index: connection.max_index,
            log_level: default_log_level(),
        }
    }

    /// Merge parsed CLI args with the TOML file they point to, if any.
    /// CLI arguments take precedence over TOML file values.
    pub fn from_args(cli: CliArgs) -> Result<Self, ConfigError> {
        let toml_config = if let Some(ref config_path) = cli.config {
            let contents = std::fs::read_to_string(config_path)
                .map_err(|e| ConfigError::FileRead(config_path.clone(), e))?;
            toml::from_str(&contents)
                .map_err(|e| ConfigError::TomlParse(config_path.clone(), e))?
        } else {
            TomlConfig::default()
        };

        let listen = cli
            .listen
            .or(toml_config.server.listen)
            .ok_or(ConfigError::MissingListen)?;

        let buffer_size = cli
            .buffer_size
            .unwrap_or(toml_config.connection.buffer_size);
        if buffer_size == 0 {
            return Err(ConfigError::InvalidBufferSize);
        }

        Ok(Config {
            listen,
            workers: cli.workers.or(toml_config.server.workers),
            backlog: cli.backlog.unwrap_or(toml_config.server.backlog),
            stack_size: cli.stack_size.unwrap_or(toml_config.server.stack_size),
            buffer_size,
            compute: cli.compute.unwrap_or(toml_config.connection.compute),
            max_index: cli.max_index.or(toml_config.connection.max_index),
            log_level: cli.log_level.unwrap_or(toml_config.logging.level),
        })
    }
}

/// Configuration loading errors
#[derive(Debug)]
pub enum ConfigError {
    FileRead(PathBuf, std::io::Error),
    TomlParse(PathBuf, toml::de::Error),
    /// Neither the command line nor the config file named a listen address.
    MissingListen,
    InvalidBufferSize,
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::FileRead(path, e) => {
                write!(f, "Failed to read config file '{}': {}", path.display(), e)
            }
            ConfigError::TomlParse(path, e) => {
                write!(f, "Failed to parse config file '{}': {}", path.display(), e)
            }
            ConfigError::MissingListen => {
                write!(f, "You must provide an addr (ie: 127.0.0.1:25000 )")
            }
            ConfigError::InvalidBufferSize => write!(f, "buffer_size must be greater than 0"),
        }
    }
}

impl std::error::Error for ConfigError {}

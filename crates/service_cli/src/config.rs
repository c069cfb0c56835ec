//! CLI configuration management
//!
//! Handles loading configuration from environment variables, TOML files, and CLI arguments.

use linalg_optimiser::{LineSearchPolicy, OptimiserConfig, OptimiserError};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use thiserror::Error;

/// Environment variable prefix
pub const ENV_PREFIX: &str = "LINALG_";

/// Configuration error types
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Unknown log level name
    #[error("Invalid log level: {0}. Must be one of: trace, debug, info, warn, error")]
    InvalidLogLevel(String),

    /// Unknown minimisation method
    #[error("Invalid method: {0}. Must be one of: bfgs, ncg")]
    InvalidMethod(String),

    /// Zero timeout
    #[error("Invalid timeout: {0} ms. Must be positive")]
    InvalidTimeout(u64),

    /// Unreadable or malformed TOML file
    #[error("Configuration file error: {0}")]
    FileError(String),

    /// Unparseable `LINALG_*` variable
    #[error("Environment variable error: {0}")]
    EnvError(String),

    /// Optimiser settings out of range
    #[error("Invalid optimiser settings: {0}")]
    Optimiser(#[from] OptimiserError),
}

/// Log levels supported by the CLI
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    /// Every span and event
    Trace,
    /// Per-iteration detail
    Debug,
    /// Run summaries
    #[default]
    Info,
    /// Early stops and timeouts
    Warn,
    /// Failures only
    Error,
}

impl FromStr for LogLevel {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "trace" => Ok(LogLevel::Trace),
            "debug" => Ok(LogLevel::Debug),
            "info" => Ok(LogLevel::Info),
            "warn" => Ok(LogLevel::Warn),
            "error" => Ok(LogLevel::Error),
            _ => Err(ConfigError::InvalidLogLevel(s.to_string())),
        }
    }
}

impl LogLevel {
    /// Convert log level to tracing filter string
    pub fn as_filter_str(&self) -> &'static str {
        match self {
            LogLevel::Trace => "trace",
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warn => "warn",
            LogLevel::Error => "error",
        }
    }
}

impl std::fmt::Display for LogLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_filter_str())
    }
}

/// Minimisation method
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Method {
    /// Quasi-Newton BFGS
    #[default]
    Bfgs,
    /// Fletcher-Reeves nonlinear conjugate gradient
    Ncg,
}

impl FromStr for Method {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "bfgs" => Ok(Method::Bfgs),
            "ncg" | "cg" | "conjugate-gradient" => Ok(Method::Ncg),
            _ => Err(ConfigError::InvalidMethod(s.to_string())),
        }
    }
}

impl std::fmt::Display for Method {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Method::Bfgs => write!(f, "bfgs"),
            Method::Ncg => write!(f, "ncg"),
        }
    }
}

/// CLI configuration structure
///
/// The `[optimiser]` table (and its `[optimiser.line_search]` sub-table)
/// deserialises straight into `OptimiserConfig`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct CliConfig {
    /// Log level
    #[serde(deserialize_with = "deserialize_log_level")]
    pub log_level: LogLevel,
    /// Default minimisation method
    #[serde(deserialize_with = "deserialize_method")]
    pub method: Method,
    /// Wall-clock limit for a minimisation, after which it is cancelled
    pub timeout_ms: Option<u64>,
    /// Minimiser settings
    pub optimiser: OptimiserConfig,
}

fn deserialize_log_level<'de, D>(deserializer: D) -> Result<LogLevel, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let s = String::deserialize(deserializer)?;
    LogLevel::from_str(&s).map_err(serde::de::Error::custom)
}

fn deserialize_method<'de, D>(deserializer: D) -> Result<Method, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let s = String::deserialize(deserializer)?;
    Method::from_str(&s).map_err(serde::de::Error::custom)
}

impl Default for CliConfig {
    fn default() -> Self {
        Self {
            log_level: LogLevel::Info,
            method: Method::Bfgs,
            timeout_ms: None,
            optimiser: OptimiserConfig::default(),
        }
    }
}

fn env_parse<T: FromStr>(name: &str, value: &str) -> Result<T, ConfigError> {
    value
        .trim()
        .parse()
        .map_err(|_| ConfigError::EnvError(format!("{}{}={} is not valid", ENV_PREFIX, name, value)))
}

impl CliConfig {
    /// Create a new CliConfig with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_vars(|name| std::env::var(name).ok())
    }

    /// Load configuration from a variable lookup, e.g. a captured environment
    pub fn from_vars<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();
        config.apply_vars(lookup)?;
        config.validate()?;
        Ok(config)
    }

    /// Override the fields whose `LINALG_*` variable is set
    ///
    /// Recognised variables: `LOG_LEVEL`, `METHOD`, `TOLERANCE`,
    /// `MAX_ITERATIONS`, `LINE_SEARCH`, `TIMEOUT_MS`.
    pub fn apply_vars<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |name: &str| lookup(&format!("{}{}", ENV_PREFIX, name));

        if let Some(level) = var("LOG_LEVEL") {
            self.log_level = LogLevel::from_str(&level)?;
        }
        if let Some(method) = var("METHOD") {
            self.method = Method::from_str(&method)?;
        }
        if let Some(tolerance) = var("TOLERANCE") {
            self.optimiser.gradient_tolerance = env_parse("TOLERANCE", &tolerance)?;
        }
        if let Some(max_iterations) = var("MAX_ITERATIONS") {
            self.optimiser.max_iterations = env_parse("MAX_ITERATIONS", &max_iterations)?;
        }
        if let Some(policy) = var("LINE_SEARCH") {
            self.optimiser.line_search.policy = LineSearchPolicy::from_str(&policy)?;
        }
        if let Some(timeout) = var("TIMEOUT_MS") {
            self.timeout_ms = Some(env_parse("TIMEOUT_MS", &timeout)?);
        }
        Ok(())
    }

    /// Load configuration from a TOML file
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::FileError(format!("Failed to read config file: {}", e)))?;

        let config: CliConfig = toml::from_str(&content)
            .map_err(|e| ConfigError::FileError(format!("Failed to parse TOML: {}", e)))?;

        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if let Some(0) = self.timeout_ms {
            return Err(ConfigError::InvalidTimeout(0));
        }
        self.optimiser.validate()?;
        Ok(())
    }

    /// Merge with CLI arguments (CLI takes precedence)
    pub fn merge_with_cli(&mut self, cli: &CliArgs) -> Result<(), ConfigError> {
        if let Some(log_level) = &cli.log_level {
            self.log_level = LogLevel::from_str(log_level)?;
        } else if cli.verbose {
            self.log_level = LogLevel::Debug;
        }
        if let Some(method) = &cli.method {
            self.method = Method::from_str(method)?;
        }
        if let Some(tolerance) = cli.tolerance {
            self.optimiser.gradient_tolerance = tolerance;
        }
        if let Some(max_iterations) = cli.max_iterations {
            self.optimiser.max_iterations = max_iterations;
        }
        if let Some(policy) = &cli.line_search {
            self.optimiser.line_search.policy = LineSearchPolicy::from_str(policy)?;
        }
        if let Some(timeout_ms) = cli.timeout_ms {
            self.timeout_ms = Some(timeout_ms);
        }
        Ok(())
    }
}

/// CLI arguments structure
#[derive(Debug, Clone, Default)]
pub struct CliArgs {
    /// Config file path
    pub config_file: Option<PathBuf>,
    /// Verbose flag; selects debug logging unless a log level is given
    pub verbose: bool,
    /// Log level override
    pub log_level: Option<String>,
    /// Method override
    pub method: Option<String>,
    /// Gradient tolerance override
    pub tolerance: Option<f64>,
    /// Iteration limit override
    pub max_iterations: Option<usize>,
    /// Line search policy override
    pub line_search: Option<String>,
    /// Timeout override
    pub timeout_ms: Option<u64>,
}

/// Build configuration from all sources
///
/// Priority (highest to lowest):
/// 1. CLI arguments
/// 2. Environment variables
/// 3. Config file
/// 4. Default values
pub fn build_config(cli: &CliArgs) -> Result<CliConfig, ConfigError> {
    build_config_with(cli, |name| std::env::var(name).ok())
}

/// [`build_config`] with an explicit variable lookup
pub fn build_config_with<F>(cli: &CliArgs, lookup: F) -> Result<CliConfig, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    // Start with defaults or file config
    let mut config = if let Some(config_path) = &cli.config_file {
        CliConfig::from_file(config_path)?
    } else {
        CliConfig::default()
    };

    // Override with environment variables
    config.apply_vars(lookup)?;

    // Override with CLI arguments
    config.merge_with_cli(cli)?;

    // Final validation
    config.validate()?;

    Ok(config)
}

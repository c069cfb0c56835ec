//! CLI error types

use linalg_core::LinalgError;
use linalg_optimiser::OptimiserError;
use thiserror::Error;

use crate::config::ConfigError;

/// Errors surfaced by CLI commands
#[derive(Debug, Error)]
pub enum CliError {
    /// Malformed command-line input
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// Configuration could not be loaded or validated
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Minimiser rejected its input or configuration
    #[error("Optimiser error: {0}")]
    Optimiser(#[from] OptimiserError),

    /// Shape error from a vector or matrix operation
    #[error("Linear algebra error: {0}")]
    Linalg(#[from] LinalgError),

    /// Async runtime could not be started
    #[error("Runtime error: {0}")]
    Runtime(#[from] std::io::Error),
}

/// Result alias for CLI commands
pub type Result<T> = std::result::Result<T, CliError>;

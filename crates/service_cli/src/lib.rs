//! Command-line front end for the linalg workspace
//!
//! Runs the minimisers on built-in problems, exercises the multiplication
//! kernels and reports the active configuration.

pub mod commands;
pub mod config;
pub mod error;

pub use error::{CliError, Result};

/// CLI version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

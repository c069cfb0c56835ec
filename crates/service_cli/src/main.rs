//! linalg CLI - Command Line Front End for the Minimisers
//!
//! # Commands
//!
//! - `linalg minimize --method bfgs --problem paraboloid --x0 1,4,-5` - Run a minimiser
//! - `linalg multiply --size 256` - Compare the multiplication kernels
//! - `linalg check` - Print the active configuration
//!
//! # Configuration
//!
//! Settings are merged from CLI flags, `LINALG_*` environment variables and
//! an optional TOML file, in that order of precedence.

use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand};
use service_cli::commands;
use service_cli::config::{build_config, CliArgs};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Dense linear algebra and gradient-based minimisation
#[derive(Parser)]
#[command(name = "linalg")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Configuration file path (TOML format)
    #[arg(short, long, global = true, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, global = true)]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Minimise a built-in problem
    Minimize {
        /// Minimisation method (bfgs, ncg)
        #[arg(short, long)]
        method: Option<String>,

        /// Problem to minimise (paraboloid, rosenbrock, quadratic)
        #[arg(short, long, default_value = "paraboloid")]
        problem: String,

        /// Comma-separated start point
        #[arg(long, default_value = "1,4,-5", allow_hyphen_values = true)]
        x0: String,

        /// Gradient-norm tolerance
        #[arg(short, long)]
        tolerance: Option<f64>,

        /// Iteration limit
        #[arg(long)]
        max_iterations: Option<usize>,

        /// Line search policy (armijo, wolfe)
        #[arg(long)]
        line_search: Option<String>,

        /// Cancel the run after this many milliseconds
        #[arg(long)]
        timeout_ms: Option<u64>,
    },

    /// Multiply two deterministic matrices with each kernel
    Multiply {
        /// Matrix dimension
        #[arg(short, long, default_value = "256")]
        size: usize,
    },

    /// Check system configuration
    Check,
}

impl Cli {
    fn config_args(&self) -> CliArgs {
        let mut args = CliArgs {
            config_file: self.config.clone(),
            verbose: self.verbose,
            log_level: self.log_level.clone(),
            ..Default::default()
        };
        if let Commands::Minimize {
            method,
            tolerance,
            max_iterations,
            line_search,
            timeout_ms,
            ..
        } = &self.command
        {
            args.method = method.clone();
            args.tolerance = *tolerance;
            args.max_iterations = *max_iterations;
            args.line_search = line_search.clone();
            args.timeout_ms = *timeout_ms;
        }
        args
    }
}

fn init_tracing(log_level: &str) {
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level)))
        .init();
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = build_config(&cli.config_args()).context("Failed to load configuration")?;

    init_tracing(config.log_level.as_filter_str());

    if cli.verbose {
        info!("Verbose mode enabled");
    }

    match cli.command {
        Commands::Minimize { problem, x0, .. } => commands::minimize::run(&problem, &x0, &config)
            .with_context(|| format!("Minimisation of {} failed", problem))?,
        Commands::Multiply { size } => {
            commands::multiply::run(size).context("Kernel comparison failed")?
        }
        Commands::Check => commands::check::run(&config)?,
    }
    Ok(())
}

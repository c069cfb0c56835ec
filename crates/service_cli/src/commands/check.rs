//! Check command implementation
//!
//! Prints the active configuration and the parallel runtime it will use.

use linalg_core::PARALLEL_THRESHOLD;
use linalg_optimiser::Problem;
use tracing::info;

use crate::config::CliConfig;
use crate::Result;

/// Human-readable summary of the effective configuration
pub fn summary(config: &CliConfig) -> Vec<(String, String)> {
    let optimiser = &config.optimiser;
    let line_search = &optimiser.line_search;
    let problems: Vec<String> = Problem::ALL.iter().map(|p| p.to_string()).collect();

    vec![
        ("version".to_string(), crate::VERSION.to_string()),
        ("log_level".to_string(), config.log_level.to_string()),
        ("method".to_string(), config.method.to_string()),
        (
            "timeout_ms".to_string(),
            config
                .timeout_ms
                .map_or_else(|| "none".to_string(), |ms| ms.to_string()),
        ),
        (
            "gradient_tolerance".to_string(),
            format!("{:e}", optimiser.gradient_tolerance),
        ),
        (
            "max_iterations".to_string(),
            optimiser.max_iterations.to_string(),
        ),
        ("line_search".to_string(), line_search.policy.to_string()),
        (
            "conjugate_step".to_string(),
            optimiser.conjugate_step.to_string(),
        ),
        (
            "wolfe_constants".to_string(),
            format!("c1={} c2={}", line_search.c1, line_search.c2),
        ),
        (
            "parallel_kernel".to_string(),
            cfg!(feature = "parallel").to_string(),
        ),
        (
            "parallel_threshold".to_string(),
            PARALLEL_THRESHOLD.to_string(),
        ),
        (
            "rayon_threads".to_string(),
            rayon::current_num_threads().to_string(),
        ),
        ("problems".to_string(), problems.join(", ")),
    ]
}

/// Run the check command
pub fn run(config: &CliConfig) -> Result<()> {
    info!("Checking configuration...");
    config.validate()?;

    println!("\nlinalg configuration");
    for (key, value) in summary(config) {
        println!("  {:<20} {}", key, value);
    }

    info!("Configuration is valid");
    Ok(())
}

//! Tracing subscriber setup shared by every binary in the workspace

use anyhow::Result;
use tracing_subscriber::EnvFilter;

/// Logging configuration
#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    /// Filter directive passed to the subscriber (e.g. "info,platform=debug")
    pub filter: String,
    /// Include the event target (module path) in each line
    pub with_target: bool,
}

impl TelemetryConfig {
    /// Create a new TelemetryConfig from environment variables
    ///
    /// # Environment Variables
    /// - `RUST_LOG`: Filter directive (takes precedence)
    /// - `LOG_LEVEL`: Fallback filter directive (default: "info")
    /// - `LOG_WITH_TARGET`: Print event targets (default: false)
    pub fn from_env() -> Self {
        let filter = std::env::var("RUST_LOG")
            .or_else(|_| std::env::var("LOG_LEVEL"))
            .unwrap_or_else(|_| "info".to_string());

        let with_target = std::env::var("LOG_WITH_TARGET")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(false);

        TelemetryConfig {
            filter,
            with_target,
        }
    }
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            filter: "info".to_string(),
            with_target: false,
        }
    }
}

/// Install the global tracing subscriber
///
/// Events go to stderr. Fails if the filter directive is invalid or a
/// subscriber is already set.
pub fn init_tracing(config: &TelemetryConfig) -> Result<()> {
    let filter = EnvFilter::try_new(&config.filter)
        .map_err(|e| anyhow::anyhow!("Invalid log filter '{}': {}", config.filter, e))?;

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(config.with_target)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|e| anyhow::anyhow!("Failed to install tracing subscriber: {}", e))?;

    Ok(())
}

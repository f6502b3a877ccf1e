//! `hold-server` - holds every HTTP response body until ENTER is pressed.
//!
//! ```text
//! hold-server              # listens on port 8080
//! PORT=3000 hold-server    # listens on port 3000
//! ```

use anyhow::{Context, Result};
use hold_gateway::HoldConfig;
use hold_telemetry::{init_logging, TelemetryConfig};
use tracing::error;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    init_logging(&TelemetryConfig::from_env()).context("Failed to initialize logging")?;

    // Load configuration
    let config = HoldConfig::from_env().context("Invalid configuration")?;

    if let Err(e) = hold_runtime::run(config).await {
        error!("{:#}", e);
        return Err(e);
    }

    Ok(())
}

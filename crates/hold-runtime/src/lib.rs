//! # Hold Server Runtime
//!
//! Process wiring for the `hold-server` binary.
//!
//! ## Startup Sequence
//!
//! 1. Load configuration (`PORT`, default 8080)
//! 2. Bind the listener (failure is fatal)
//! 3. Start the release trigger on stdin
//! 4. Print the operator banner
//! 5. Serve until Ctrl+C, then release anything still held and stop

use anyhow::{Context, Result};
use hold_gateway::{HoldConfig, HoldServerService};
use tracing::{info, warn};

/// Bind, start the operator trigger, and serve until Ctrl+C.
pub async fn run(config: HoldConfig) -> Result<()> {
    let service = HoldServerService::bind(config)
        .await
        .context("Failed to start server")?;

    let local_addr = service.local_addr()?;

    service
        .trigger()
        .spawn_stdin()
        .context("Failed to start release trigger")?;

    print_banner(local_addr.port());

    service.serve_with_shutdown(shutdown_signal()).await?;
    Ok(())
}

fn print_banner(port: u16) {
    info!("Starting server on http://localhost:{}", port);
    info!("The server can hold multiple requests.");
    info!("Press ENTER to release ALL pending requests at once.");
}

/// Completes on Ctrl+C.
///
/// If the handler cannot be installed the server runs until killed.
pub async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "Failed to listen for Ctrl+C; running until killed");
        std::future::pending::<()>().await;
    }
}

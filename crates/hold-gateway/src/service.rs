//! Hold server service - binds the listener and serves held requests.

use crate::adapters::http::{build_router, HttpState};
use crate::adapters::trigger::ReleaseTrigger;
use crate::domain::config::HoldConfig;
use crate::domain::error::{HoldError, HoldResult};
use crate::domain::registry::PendingRegistry;
use crate::ports::outbound::SystemClock;
use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::sync::watch;
use tracing::info;

/// How often held requests are swept while shutting down
pub const SHUTDOWN_SWEEP_INTERVAL: Duration = Duration::from_millis(100);

/// Hold server service state
pub struct HoldServerService {
    config: HoldConfig,
    listener: TcpListener,
    registry: Arc<PendingRegistry>,
}

impl HoldServerService {
    /// Bind the listener.
    ///
    /// Bind failure (port in use, no permission) is returned as
    /// `HoldError::Bind` and is meant to be fatal. Port 0 binds an ephemeral
    /// port; see `local_addr()`.
    pub async fn bind(config: HoldConfig) -> HoldResult<Self> {
        let addr = config.http_addr();
        let listener = TcpListener::bind(addr)
            .await
            .map_err(|source| HoldError::Bind { addr, source })?;

        Ok(Self {
            config,
            listener,
            registry: Arc::new(PendingRegistry::new()),
        })
    }

    pub fn config(&self) -> &HoldConfig {
        &self.config
    }

    /// Address actually bound (differs from config when port 0 was used)
    pub fn local_addr(&self) -> HoldResult<SocketAddr> {
        self.listener.local_addr().map_err(HoldError::Serve)
    }

    /// Get the pending request registry
    pub fn registry(&self) -> Arc<PendingRegistry> {
        Arc::clone(&self.registry)
    }

    /// A release trigger bound to this server's registry
    pub fn trigger(&self) -> ReleaseTrigger {
        ReleaseTrigger::new(self.registry())
    }

    /// Serve until `signal` completes.
    ///
    /// Once the signal fires, held requests are released repeatedly until the
    /// server has finished, so connections still waiting on a body can
    /// complete and graceful shutdown does not hang.
    pub async fn serve_with_shutdown<F>(self, signal: F) -> HoldResult<()>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let local_addr = self.local_addr()?;
        let trigger = self.trigger();
        let state = HttpState::with_clock(Arc::clone(&self.registry), Arc::new(SystemClock));
        let router = build_router(state);

        let (stopping_tx, stopping_rx) = watch::channel(false);
        let sweeper = tokio::spawn(release_on_shutdown(trigger, stopping_rx));

        info!(addr = %local_addr, "Starting HTTP server");

        let result = axum::serve(
            self.listener,
            router.into_make_service_with_connect_info::<SocketAddr>(),
        )
        .with_graceful_shutdown(async move {
            signal.await;
            info!("Shutdown requested, releasing held requests");
            let _ = stopping_tx.send(true);
        })
        .await;

        sweeper.abort();
        info!("HTTP server stopped");

        result.map_err(HoldError::Serve)
    }
}

/// Background task that empties the registry while the server drains
async fn release_on_shutdown(trigger: ReleaseTrigger, mut stopping: watch::Receiver<bool>) {
    if stopping.wait_for(|stopping| *stopping).await.is_err() {
        return;
    }

    let mut sweep_interval = tokio::time::interval(SHUTDOWN_SWEEP_INTERVAL);
    sweep_interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

    loop {
        sweep_interval.tick().await;
        trigger.sweep();
    }
}

//! Release trigger - turns operator input lines into batch releases.
//!
//! Every line (an empty one included) drains the registry and fires each
//! drained request's release signal. End of input stops the loop but not
//! the server.
//!
//! The loop runs on its own OS thread: a blocking stdin read cannot be
//! cancelled and must not hold up runtime shutdown.

use crate::domain::registry::{PendingRegistry, PendingRequest, Release};
use std::io::BufRead;
use std::sync::Arc;
use std::thread;
use tracing::{debug, error, info, warn};

/// Name of the operator input thread
pub const TRIGGER_THREAD_NAME: &str = "release-trigger";

/// Result of one release-all event
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReleaseOutcome {
    /// Batch number, `None` when nothing was pending
    pub batch: Option<u64>,
    /// Requests removed from the registry
    pub drained: usize,
    /// Signals that reached a waiting handler
    pub delivered: usize,
    /// Signals whose handler had already gone away
    pub abandoned: usize,
}

impl ReleaseOutcome {
    pub fn is_empty(&self) -> bool {
        self.drained == 0
    }
}

/// Operator-facing release loop
#[derive(Debug, Clone)]
pub struct ReleaseTrigger {
    registry: Arc<PendingRegistry>,
}

impl ReleaseTrigger {
    pub fn new(registry: Arc<PendingRegistry>) -> Self {
        Self { registry }
    }

    /// Release everything pending right now as one batch.
    ///
    /// Requests registered after the drain wait for the next batch.
    pub fn release_all(&self) -> ReleaseOutcome {
        let drained = self.registry.drain_all();
        if drained.is_empty() {
            info!("No pending requests");
            return ReleaseOutcome::default();
        }
        self.fire(drained)
    }

    /// Like `release_all`, but silent when nothing is pending.
    pub fn sweep(&self) -> ReleaseOutcome {
        let drained = self.registry.drain_all();
        if drained.is_empty() {
            return ReleaseOutcome::default();
        }
        self.fire(drained)
    }

    fn fire(&self, drained: Vec<PendingRequest>) -> ReleaseOutcome {
        let batch = self.registry.begin_batch();
        let count = drained.len();
        info!(batch, count, "Releasing {} pending request(s)...", count);

        let release = Release::new(batch);
        let mut delivered = 0;
        let mut abandoned = 0;

        for request in drained {
            let sequence = request.sequence();
            let waited = request.waited();
            if request.release(release) {
                delivered += 1;
            } else {
                // Handler dropped with its connection; nothing left to write to
                abandoned += 1;
                debug!(
                    sequence,
                    waited_ms = waited.as_millis() as u64,
                    "Held request abandoned by client before release"
                );
            }
        }

        self.registry.record_released(delivered, abandoned);

        ReleaseOutcome {
            batch: Some(batch),
            drained: count,
            delivered,
            abandoned,
        }
    }

    /// Read operator input until it closes, releasing once per line.
    ///
    /// Lines are split on raw bytes and their content is ignored, so input
    /// that is not valid UTF-8 still counts as a line. Blocks the calling
    /// thread. Returns the number of lines handled.
    pub fn run<R: BufRead>(&self, input: R) -> usize {
        let mut handled = 0;

        for line in input.split(b'\n') {
            match line {
                Ok(_) => {
                    handled += 1;
                    self.release_all();
                }
                Err(e) => {
                    error!(error = %e, "Failed to read operator input");
                    return handled;
                }
            }
        }

        warn!("Operator input closed; no further releases are possible");
        handled
    }

    /// Run the loop over stdin on a dedicated thread.
    pub fn spawn_stdin(self) -> std::io::Result<thread::JoinHandle<usize>> {
        thread::Builder::new()
            .name(TRIGGER_THREAD_NAME.to_string())
            .spawn(move || self.run(std::io::stdin().lock()))
    }
}

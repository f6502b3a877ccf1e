//! Pending Request Registry - the set of requests whose bodies are on hold.
//!
//! Flow:
//! 1. HTTP handler calls `register()` and receives a `HoldTicket`
//! 2. Handler flushes headers and awaits the ticket's release receiver
//! 3. Release trigger calls `drain_all()` and fires every drained entry
//! 4. Handler resumes and writes the body
//!
//! Registration and drain share one lock so an entry is either in the batch
//! being drained or in the registry for the next one, never both.

use parking_lot::Mutex;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};
use tokio::sync::oneshot;
use tracing::debug;

/// Delivered to a held handler when its batch is released
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Release {
    /// Batch number (1-based, one per non-empty drain)
    pub batch: u64,
    /// When the release signal was fired
    pub released_at: Instant,
}

impl Release {
    pub fn new(batch: u64) -> Self {
        Self {
            batch,
            released_at: Instant::now(),
        }
    }
}

/// A held request as seen by the registry.
///
/// Owns the sending half of the request's release signal. Consumed by
/// `release()`, so a signal can only ever fire once.
#[derive(Debug)]
pub struct PendingRequest {
    sequence: u64,
    arrived_at: Instant,
    remote_addr: String,
    path: String,
    method: String,
    signal: oneshot::Sender<Release>,
}

impl PendingRequest {
    pub fn sequence(&self) -> u64 {
        self.sequence
    }

    pub fn arrived_at(&self) -> Instant {
        self.arrived_at
    }

    pub fn remote_addr(&self) -> &str {
        &self.remote_addr
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn method(&self) -> &str {
        &self.method
    }

    /// Time spent in the registry so far
    pub fn waited(&self) -> Duration {
        self.arrived_at.elapsed()
    }

    /// Fire the release signal.
    ///
    /// Returns false if the waiting handler is gone (client disconnected).
    pub fn release(self, release: Release) -> bool {
        self.signal.send(release).is_ok()
    }
}

/// The handler's half of a registration
#[derive(Debug)]
pub struct HoldTicket {
    /// Sequence number assigned at registration
    pub sequence: u64,
    /// When the request was registered
    pub arrived_at: Instant,
    /// Pending requests including this one, at registration time
    pub pending_count: usize,
    /// Resolves when the request's batch is released
    pub release: oneshot::Receiver<Release>,
}

/// Statistics for the pending request registry
#[derive(Debug, Default)]
pub struct PendingStats {
    /// Total requests registered
    pub total_registered: AtomicU64,
    /// Total release signals delivered to a waiting handler
    pub total_released: AtomicU64,
    /// Total release signals whose handler was already gone
    pub total_abandoned: AtomicU64,
    /// Total non-empty release batches
    pub total_batches: AtomicU64,
}

#[derive(Debug, Default)]
struct RegistryState {
    pending: Vec<PendingRequest>,
    counter: u64,
}

/// Registry of held requests.
///
/// One instance is shared (behind an `Arc`) by every handler and the
/// release trigger of a server.
#[derive(Debug, Default)]
pub struct PendingRegistry {
    state: Mutex<RegistryState>,
    stats: PendingStats,
}

impl PendingRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a new held request.
    ///
    /// Sequence numbers follow lock acquisition order and are never reused.
    pub fn register(
        &self,
        remote_addr: impl Into<String>,
        path: impl Into<String>,
        method: impl Into<String>,
    ) -> HoldTicket {
        let (tx, rx) = oneshot::channel();
        let arrived_at = Instant::now();
        let remote_addr = remote_addr.into();
        let path = path.into();
        let method = method.into();

        let (sequence, pending_count) = {
            let mut state = self.state.lock();
            state.counter += 1;
            let sequence = state.counter;
            state.pending.push(PendingRequest {
                sequence,
                arrived_at,
                remote_addr,
                path,
                method,
                signal: tx,
            });
            (sequence, state.pending.len())
        };

        self.stats.total_registered.fetch_add(1, Ordering::Relaxed);
        debug!(sequence, pending_count, "Registered pending request");

        HoldTicket {
            sequence,
            arrived_at,
            pending_count,
            release: rx,
        }
    }

    /// Atomically remove and return every pending request, oldest first.
    ///
    /// An empty result means nothing was waiting.
    pub fn drain_all(&self) -> Vec<PendingRequest> {
        std::mem::take(&mut self.state.lock().pending)
    }

    /// Allocate the next batch number
    pub fn begin_batch(&self) -> u64 {
        self.stats.total_batches.fetch_add(1, Ordering::Relaxed) + 1
    }

    /// Record the outcome of firing a batch
    pub fn record_released(&self, delivered: usize, abandoned: usize) {
        self.stats
            .total_released
            .fetch_add(delivered as u64, Ordering::Relaxed);
        self.stats
            .total_abandoned
            .fetch_add(abandoned as u64, Ordering::Relaxed);
    }

    /// Get number of currently pending requests
    pub fn pending_count(&self) -> usize {
        self.state.lock().pending.len()
    }

    /// Get statistics
    pub fn stats(&self) -> &PendingStats {
        &self.stats
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeSet;
    use std::sync::Arc;

    #[test]
    fn test_register_assigns_sequence_and_count() {
        let registry = PendingRegistry::new();

        let first = registry.register("127.0.0.1:5000", "/a", "GET");
        let second = registry.register("127.0.0.1:5001", "/b", "POST");

        assert_eq!(first.sequence, 1);
        assert_eq!(first.pending_count, 1);
        assert_eq!(second.sequence, 2);
        assert_eq!(second.pending_count, 2);
        assert_eq!(registry.pending_count(), 2);
    }

    #[test]
    fn test_concurrent_registrations_have_no_gaps() {
        let registry = Arc::new(PendingRegistry::new());
        let threads = 8;
        let per_thread = 250;

        let handles: Vec<_> = (0..threads)
            .map(|t| {
                let registry = Arc::clone(&registry);
                std::thread::spawn(move || {
                    (0..per_thread)
                        .map(|i| {
                            registry
                                .register(format!("10.0.0.{t}:{i}"), "/", "GET")
                                .sequence
                        })
                        .collect::<Vec<_>>()
                })
            })
            .collect();

        let sequences: Vec<u64> = handles
            .into_iter()
            .flat_map(|h| h.join().unwrap())
            .collect();
        let total = (threads * per_thread) as u64;
        let unique: BTreeSet<u64> = sequences.iter().copied().collect();

        assert_eq!(sequences.len() as u64, total);
        assert_eq!(unique, (1..=total).collect::<BTreeSet<u64>>());
        assert_eq!(registry.pending_count() as u64, total);
    }

    #[test]
    fn test_drain_preserves_registration_order() {
        let registry = PendingRegistry::new();
        for path in ["/one", "/two", "/three"] {
            registry.register("127.0.0.1:1", path, "GET");
        }

        let drained = registry.drain_all();
        let paths: Vec<&str> = drained.iter().map(|r| r.path()).collect();
        let sequences: Vec<u64> = drained.iter().map(|r| r.sequence()).collect();

        assert_eq!(paths, ["/one", "/two", "/three"]);
        assert_eq!(sequences, [1, 2, 3]);
        assert_eq!(registry.pending_count(), 0);
    }

    #[test]
    fn test_drain_empty_is_noop() {
        let registry = PendingRegistry::new();
        assert!(registry.drain_all().is_empty());
        assert_eq!(registry.register("127.0.0.1:1", "/", "GET").sequence, 1);
        assert_eq!(registry.stats().total_batches.load(Ordering::Relaxed), 0);
    }

    #[test]
    fn test_drained_entries_never_reappear() {
        let registry = PendingRegistry::new();
        registry.register("127.0.0.1:1", "/", "GET");
        registry.register("127.0.0.1:2", "/", "GET");

        assert_eq!(registry.drain_all().len(), 2);

        let late = registry.register("127.0.0.1:3", "/late", "GET");
        assert_eq!(late.sequence, 3);

        let second = registry.drain_all();
        assert_eq!(second.len(), 1);
        assert_eq!(second[0].sequence(), 3);
        assert!(registry.drain_all().is_empty());
    }

    #[tokio::test]
    async fn test_release_wakes_ticket() {
        let registry = PendingRegistry::new();
        let ticket = registry.register("127.0.0.1:1", "/", "GET");

        let drained = registry.drain_all();
        let release = Release::new(1);
        for request in drained {
            assert!(request.release(release));
        }

        let received = ticket.release.await.unwrap();
        assert_eq!(received, release);
        assert!(received.released_at >= ticket.arrived_at);
    }

    #[test]
    fn test_release_after_receiver_dropped() {
        let registry = PendingRegistry::new();
        let ticket = registry.register("127.0.0.1:1", "/", "GET");
        drop(ticket);

        let request = registry.drain_all().pop().unwrap();
        assert_eq!(request.method(), "GET");
        assert_eq!(request.remote_addr(), "127.0.0.1:1");
        assert!(!request.release(Release::new(1)));
    }

    #[test]
    fn test_stats() {
        let registry = PendingRegistry::new();
        registry.register("127.0.0.1:1", "/", "GET");
        registry.register("127.0.0.1:2", "/", "GET");

        assert_eq!(registry.stats().total_registered.load(Ordering::Relaxed), 2);

        assert_eq!(registry.begin_batch(), 1);
        assert_eq!(registry.begin_batch(), 2);
        registry.record_released(3, 1);

        assert_eq!(registry.stats().total_batches.load(Ordering::Relaxed), 2);
        assert_eq!(registry.stats().total_released.load(Ordering::Relaxed), 3);
        assert_eq!(registry.stats().total_abandoned.load(Ordering::Relaxed), 1);
    }
}

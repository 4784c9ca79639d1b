//! Latest-snapshot holder and fan-out.

use std::sync::{Arc, RwLock};

use bt_sim::Snapshot;
use log::warn;
use tokio::sync::broadcast;

/// Per-subscriber buffer depth.  A subscriber further behind than this has
/// its oldest entries dropped — it skips ahead instead of backpressuring
/// the scheduler.
const SUBSCRIBER_BUFFER: usize = 16;

/// Holds the newest [`Snapshot`] and fans it out to subscribers.
///
/// Two read paths:
///
/// - [`latest`][BroadcastHub::latest] — synchronous pull of the current
///   snapshot (overwrite semantics: only the newest is retained);
/// - [`subscribe`][BroadcastHub::subscribe] — a push stream that delivers
///   every new snapshot, best-effort per subscriber.
///
/// [`publish`][BroadcastHub::publish] never blocks and never fails: the
/// pointer swap is the only synchronization with readers, and delivery to a
/// full or absent subscriber is simply skipped for that entry.
pub struct BroadcastHub {
    latest: RwLock<Arc<Snapshot>>,
    tx: broadcast::Sender<Arc<Snapshot>>,
}

impl BroadcastHub {
    pub fn new(initial: Snapshot) -> Self {
        let (tx, _) = broadcast::channel(SUBSCRIBER_BUFFER);
        Self {
            latest: RwLock::new(Arc::new(initial)),
            tx,
        }
    }

    /// Replace the current snapshot and notify subscribers.
    pub fn publish(&self, snapshot: Snapshot) {
        let snapshot = Arc::new(snapshot);

        match self.latest.write() {
            Ok(mut latest) => *latest = snapshot.clone(),
            Err(poisoned) => *poisoned.into_inner() = snapshot.clone(),
        }

        // Err here only means "no subscribers right now" — the simulation
        // runs whether or not anyone is listening.
        let _ = self.tx.send(snapshot);
    }

    /// The most recently published snapshot.
    pub fn latest(&self) -> Arc<Snapshot> {
        match self.latest.read() {
            Ok(latest) => latest.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    /// Attach a new push subscriber.  It will see every snapshot published
    /// from now on, minus any it falls too far behind on.
    pub fn subscribe(&self) -> SnapshotStream {
        SnapshotStream {
            rx: self.tx.subscribe(),
        }
    }

    pub fn subscriber_count(&self) -> usize {
        self.tx.receiver_count()
    }
}

// ── SnapshotStream ───────────────────────────────────────────────────────────

/// One subscriber's view of the snapshot feed.
///
/// Dropping the stream detaches the subscriber without affecting anyone
/// else.
pub struct SnapshotStream {
    rx: broadcast::Receiver<Arc<Snapshot>>,
}

impl SnapshotStream {
    /// The next snapshot, or `None` once the hub is gone and the buffer is
    /// drained.
    ///
    /// A lagged subscriber transparently resumes at the oldest snapshot its
    /// buffer still holds; the gap is logged and otherwise invisible.
    pub async fn recv(&mut self) -> Option<Arc<Snapshot>> {
        loop {
            match self.rx.recv().await {
                Ok(snapshot) => return Some(snapshot),
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    warn!("slow snapshot subscriber skipped {skipped} snapshots");
                }
                Err(broadcast::error::RecvError::Closed) => return None,
            }
        }
    }
}

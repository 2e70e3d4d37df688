use crate::fingerprint::Fingerprint;
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::oneshot;

/// Receiving side of a cancellation handle, passed to the transport.
pub struct CancelSignal {
    rx: oneshot::Receiver<()>,
}

impl CancelSignal {
    /// Resolves once cancellation has been requested. A handle dropped
    /// without being signalled (natural completion) never resolves this,
    /// so transports cannot mistake cleanup for cancellation.
    pub async fn cancelled(self) {
        match self.rx.await {
            Ok(()) => {}
            Err(_) => futures::future::pending::<()>().await,
        }
    }
}

struct FlightEntry {
    id: u64,
    started_at: DateTime<Utc>,
    cancel: oneshot::Sender<()>,
}

/// Live registry of fingerprint -> cancellation handle for requests that
/// have not yet settled. At most one entry exists per fingerprint; a new
/// registration under an occupied fingerprint signals and displaces the
/// previous handle in the same step.
pub struct InFlightTable {
    entries: DashMap<Fingerprint, FlightEntry>,
    next_id: AtomicU64,
}

impl InFlightTable {
    pub fn new() -> Self {
        Self {
            entries: DashMap::new(),
            next_id: AtomicU64::new(0),
        }
    }

    /// Registers a new in-flight request, cancelling any previous request
    /// with the same fingerprint. Returns the signal for the transport and
    /// the registration id needed to settle this entry later.
    pub fn register(&self, fingerprint: Fingerprint) -> (CancelSignal, u64) {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let (tx, rx) = oneshot::channel();
        let entry = FlightEntry {
            id,
            started_at: Utc::now(),
            cancel: tx,
        };
        if let Some(previous) = self.entries.insert(fingerprint.clone(), entry) {
            log::debug!(
                "superseding request {} for fingerprint {}",
                previous.id,
                fingerprint
            );
            let _ = previous.cancel.send(());
        }
        (CancelSignal { rx }, id)
    }

    /// Removes the entry for `fingerprint`, but only if it still belongs to
    /// registration `id`. A request that was superseded while in flight
    /// settles late and must not clobber its successor's entry.
    pub fn settle(&self, fingerprint: &Fingerprint, id: u64) {
        if let Some((_, entry)) = self.entries.remove_if(fingerprint, |_, entry| entry.id == id) {
            let elapsed = Utc::now() - entry.started_at;
            log::debug!(
                "request {} settled after {} ms",
                entry.id,
                elapsed.num_milliseconds()
            );
        }
    }

    /// Signals every handle in flight at the time of the call and removes
    /// its entry. The interrupted transport calls settle as cancellation
    /// failures on their own dispatch paths. Removal is guarded by the
    /// snapshotted registration id, so a request registered while the sweep
    /// runs is not swept up with it.
    pub fn cancel_all(&self) {
        let snapshot: Vec<(Fingerprint, u64)> = self
            .entries
            .iter()
            .map(|entry| (entry.key().clone(), entry.value().id))
            .collect();

        let mut canceled = 0usize;
        for (fingerprint, id) in snapshot {
            if let Some((_, entry)) =
                self.entries.remove_if(&fingerprint, |_, entry| entry.id == id)
            {
                let _ = entry.cancel.send(());
                canceled += 1;
            }
        }
        log::info!("canceled {} in-flight requests", canceled);
    }

    pub fn stats(&self) -> InFlightStats {
        InFlightStats {
            pending_requests: self.entries.len(),
        }
    }
}

impl Default for InFlightTable {
    fn default() -> Self {
        Self::new()
    }
}

/// Snapshot of the table for observability.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InFlightStats {
    pub pending_requests: usize,
}

/// Thread-safe wrapper for the table.
pub type SharedInFlightTable = Arc<InFlightTable>;

//! Best-effort change notification fan-out.
//!
//! Every mutation publishes a [`SyncEvent`] to the shift's branch channel and,
//! when a staff member is singled out, to that member's personal channel.
//! Delivery is at-most-once: a subscriber that is absent, lagging, or
//! disconnected simply misses the hint and reconciles on its next refetch.
//! Nothing here is load-bearing for correctness.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::RwLock;
use tokio::sync::broadcast;
use uuid::Uuid;

use shiftflow_core::models::event::SyncEvent;

/// Buffered events per channel before the oldest is dropped on laggards.
const CHANNEL_CAPACITY: usize = 64;

#[derive(Debug, Clone)]
pub struct SyncDispatcher {
    inner: Arc<RwLock<Channels>>,
}

#[derive(Debug, Default)]
struct Channels {
    branches: HashMap<Uuid, broadcast::Sender<SyncEvent>>,
    staff: HashMap<Uuid, broadcast::Sender<SyncEvent>>,
}

impl Default for SyncDispatcher {
    fn default() -> Self {
        Self::new()
    }
}

impl SyncDispatcher {
    pub fn new() -> Self {
        SyncDispatcher {
            inner: Arc::new(RwLock::new(Channels::default())),
        }
    }

    /// Publishes to the branch channel and, if the event names a staff member,
    /// to their personal channel too. Send errors mean no one is listening and
    /// are deliberately dropped.
    pub async fn publish(&self, event: SyncEvent) {
        let channels = self.inner.read().await;

        let mut delivered = 0;
        if let Some(tx) = channels.branches.get(&event.metadata.branch_id) {
            delivered += tx.send(event.clone()).unwrap_or(0);
        }
        if let Some(staff_id) = event.metadata.staff_user_id {
            if let Some(tx) = channels.staff.get(&staff_id) {
                delivered += tx.send(event.clone()).unwrap_or(0);
            }
        }

        tracing::debug!(
            "Published {:?} for shift {} to {} subscriber(s)",
            event.kind,
            event.metadata.shift_id,
            delivered
        );
    }

    pub async fn subscribe_branch(&self, branch_id: Uuid) -> broadcast::Receiver<SyncEvent> {
        let mut channels = self.inner.write().await;
        channels
            .branches
            .entry(branch_id)
            .or_insert_with(|| broadcast::channel(CHANNEL_CAPACITY).0)
            .subscribe()
    }

    pub async fn subscribe_staff(&self, staff_user_id: Uuid) -> broadcast::Receiver<SyncEvent> {
        let mut channels = self.inner.write().await;
        channels
            .staff
            .entry(staff_user_id)
            .or_insert_with(|| broadcast::channel(CHANNEL_CAPACITY).0)
            .subscribe()
    }
}

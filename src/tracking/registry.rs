//! Trackers keyed by order id.

use crate::model::OrderId;
use crate::tracking::tracker::OrderTracker;
use std::collections::HashMap;
use tracing::debug;

/// At most one live tracker per order.
#[derive(Default)]
pub struct TrackerRegistry {
    trackers: HashMap<OrderId, OrderTracker>,
}

impl TrackerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `tracker`, stopping any tracker it replaces.
    pub async fn insert(&mut self, tracker: OrderTracker) -> &OrderTracker {
        let order_id = tracker.order_id();
        if let Some(stale) = self.trackers.insert(order_id, tracker) {
            debug!(%order_id, "Replacing tracker");
            stale.detach().await;
        }
        &self.trackers[&order_id]
    }

    pub fn get(&self, order_id: OrderId) -> Option<&OrderTracker> {
        self.trackers.get(&order_id)
    }

    pub async fn remove(&mut self, order_id: OrderId) -> bool {
        match self.trackers.remove(&order_id) {
            Some(tracker) => {
                tracker.detach().await;
                true
            }
            None => false,
        }
    }

    pub fn len(&self) -> usize {
        self.trackers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.trackers.is_empty()
    }

    /// Detaches every tracker.
    pub async fn clear(&mut self) {
        for (_, tracker) in self.trackers.drain() {
            tracker.detach().await;
        }
    }
}

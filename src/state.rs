use dashmap::DashMap;
use serde::{Deserialize, Serialize};

use crate::common::ToastId;

/// Where a live request currently is in the pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ToastState {
    /// Waiting for its dedup window to close
    Batching,
    /// In the pending queue
    Pending,
    /// On screen
    Active,
}

/// Live requests by id. Written by the batcher and the presentation task,
/// readable from any thread. Finished requests are removed, so an unknown id
/// means "dismissed, merged, dropped, or never existed".
#[derive(Debug, Default)]
pub struct ToastRegistry {
    states: DashMap<ToastId, ToastState>,
}

impl ToastRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn mark(&self, id: ToastId, state: ToastState) {
        self.states.insert(id, state);
    }

    pub fn clear(&self, id: ToastId) -> Option<ToastState> {
        self.states.remove(&id).map(|(_, state)| state)
    }

    pub fn get(&self, id: ToastId) -> Option<ToastState> {
        self.states.get(&id).map(|entry| *entry.value())
    }

    pub fn len(&self) -> usize {
        self.states.len()
    }

    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }
}

use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;
use tracing::trace;

use crate::common::ToastId;

/// Why a shown toast went away.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DismissReason {
    /// Its duration ran out
    Expired,
    /// `cancel` was called for it
    Cancelled,
    /// `cancel_all` or shutdown
    Cleared,
}

/// Why a toast was dropped without ever being shown.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DiscardReason {
    Invalid,
    /// Merged into an earlier request with the same content in its window
    Duplicate { kept: ToastId },
    Cancelled,
    Cleared,
    /// The surface could not render it
    PresentationFailed,
}

/// Lifecycle events, delivered at most once per transition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ToastEvent {
    Queued { id: ToastId },
    Shown { id: ToastId, content: String },
    Dismissed { id: ToastId, reason: DismissReason },
    Discarded { id: ToastId, reason: DiscardReason },
}

impl ToastEvent {
    pub fn id(&self) -> ToastId {
        match self {
            ToastEvent::Queued { id }
            | ToastEvent::Shown { id, .. }
            | ToastEvent::Dismissed { id, .. }
            | ToastEvent::Discarded { id, .. } => *id,
        }
    }
}

/// Fan-out of [`ToastEvent`]s to any number of subscribers.
///
/// Slow subscribers lag and lose the oldest events rather than holding up
/// the pipeline.
#[derive(Debug, Clone)]
pub struct ToastNotificationSystem {
    sender: broadcast::Sender<ToastEvent>,
}

impl ToastNotificationSystem {
    pub fn new(channel_size: usize) -> Self {
        let (sender, _) = broadcast::channel(channel_size);
        Self { sender }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<ToastEvent> {
        self.sender.subscribe()
    }

    pub fn publish(&self, event: ToastEvent) {
        if self.sender.send(event).is_err() {
            trace!("No subscribers for toast event");
        }
    }

    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use tokio::time::timeout;

    #[tokio::test]
    async fn test_subscribe_and_publish() {
        let system = ToastNotificationSystem::new(16);
        let mut rx = system.subscribe();
        assert_eq!(system.subscriber_count(), 1);

        let id = ToastId::new();
        system.publish(ToastEvent::Shown {
            id,
            content: "saved".to_string(),
        });

        let received = timeout(Duration::from_secs(1), rx.recv())
            .await
            .expect("Timeout waiting for event")
            .expect("Failed to receive event");
        assert_eq!(received.id(), id);
        assert!(matches!(received, ToastEvent::Shown { content, .. } if content == "saved"));
    }

    #[test]
    fn test_publish_without_subscribers() {
        let system = ToastNotificationSystem::new(4);
        system.publish(ToastEvent::Queued { id: ToastId::new() });
        assert_eq!(system.subscriber_count(), 0);
    }
}

use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::{debug, info, trace, warn};

use super::lifecycle::ActiveDisplay;
use super::Command;
use crate::common::{ToastId, ToastRequest};
use crate::error::{Result, ToastError};
use crate::metrics;
use crate::notification::{DiscardReason, DismissReason, ToastEvent, ToastNotificationSystem};
use crate::state::{ToastRegistry, ToastState};
use crate::surface::PresentationSurface;

/// Point-in-time view of the display queue.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DisplaySnapshot {
    pub active: Option<ToastId>,
    /// Pending ids, head first
    pub pending: Vec<ToastId>,
}

/// Owns the pending queue, the active slot and the surface. Runs as the
/// single presentation task; nothing else touches these.
pub struct DisplayQueueManager {
    pending: VecDeque<ToastRequest>,
    active: Option<ActiveDisplay>,
    surface: Box<dyn PresentationSurface>,
    commands: mpsc::UnboundedReceiver<Command>,
    command_tx: mpsc::UnboundedSender<Command>,
    registry: Arc<ToastRegistry>,
    events: ToastNotificationSystem,
    max_duration: Duration,
}

impl DisplayQueueManager {
    pub fn new(
        surface: Box<dyn PresentationSurface>,
        commands: mpsc::UnboundedReceiver<Command>,
        command_tx: mpsc::UnboundedSender<Command>,
        registry: Arc<ToastRegistry>,
        events: ToastNotificationSystem,
        max_duration: Duration,
    ) -> Self {
        Self {
            pending: VecDeque::new(),
            active: None,
            surface,
            commands,
            command_tx,
            registry,
            events,
            max_duration,
        }
    }

    /// Processes commands until shutdown.
    pub async fn run(mut self) {
        info!("Display queue started");

        while let Some(command) = self.commands.recv().await {
            match command {
                Command::Enqueue(request) => self.enqueue(request).await,
                Command::Dismiss(id) => {
                    if let Err(e) = self.dismiss(id).await {
                        debug!("Ignoring dismiss: {}", e);
                    }
                }
                Command::CancelAll => self.cancel_all().await,
                Command::Expire(id) => self.expire(id).await,
                Command::Snapshot(reply) => {
                    let _ = reply.send(self.snapshot());
                }
                Command::Shutdown(ack) => {
                    self.cancel_all().await;
                    let _ = ack.send(());
                    break;
                }
            }
        }

        info!("Display queue stopped");
    }

    pub async fn enqueue(&mut self, request: ToastRequest) {
        let id = request.id();
        self.registry.mark(id, ToastState::Pending);
        self.events.publish(ToastEvent::Queued { id });
        self.pending.push_back(request);
        metrics::set_pending(self.pending.len());
        trace!("Queued toast {} ({} pending)", id, self.pending.len());

        self.promote().await;
    }

    /// Dismisses the active toast or drops a pending one.
    pub async fn dismiss(&mut self, id: ToastId) -> Result<()> {
        if self.active.as_ref().map(|active| active.id()) == Some(id) {
            if let Some(active) = self.active.take() {
                self.teardown(active, DismissReason::Cancelled).await;
            }
            self.promote().await;
            return Ok(());
        }

        if let Some(position) = self.pending.iter().position(|r| r.id() == id) {
            self.pending.remove(position);
            metrics::set_pending(self.pending.len());
            self.discard(id, DiscardReason::Cancelled);
            return Ok(());
        }

        Err(ToastError::UnknownHandle(id))
    }

    /// Tears down the active toast and drops everything pending unshown.
    pub async fn cancel_all(&mut self) {
        let cleared = self.pending.len();
        for request in std::mem::take(&mut self.pending) {
            self.discard(request.id(), DiscardReason::Cleared);
        }
        metrics::set_pending(0);

        if let Some(active) = self.active.take() {
            self.teardown(active, DismissReason::Cleared).await;
        }

        if cleared > 0 {
            info!("Cleared {} pending toasts", cleared);
        }
    }

    pub fn snapshot(&self) -> DisplaySnapshot {
        DisplaySnapshot {
            active: self.active.as_ref().map(|active| active.id()),
            pending: self.pending.iter().map(|r| r.id()).collect(),
        }
    }

    pub fn active(&self) -> Option<&ActiveDisplay> {
        self.active.as_ref()
    }

    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }

    async fn expire(&mut self, id: ToastId) {
        if self.active.as_ref().map(|active| active.id()) != Some(id) {
            // Already dismissed by hand
            trace!("Stale expiry for toast {}", id);
            return;
        }

        if let Some(active) = self.active.take() {
            self.teardown(active, DismissReason::Expired).await;
        }
        self.promote().await;
    }

    /// Fills the active slot from the head of the queue. Toasts the surface
    /// fails to render count as done and the next one is tried.
    async fn promote(&mut self) {
        while self.active.is_none() {
            let Some(request) = self.pending.pop_front() else {
                break;
            };
            metrics::set_pending(self.pending.len());

            let result = ActiveDisplay::present(
                request,
                self.surface.as_mut(),
                self.max_duration,
                self.command_tx.clone(),
            )
            .await;

            match result {
                Ok(active) => {
                    let id = active.id();
                    self.registry.mark(id, ToastState::Active);
                    self.events.publish(ToastEvent::Shown {
                        id,
                        content: active.request().content().to_string(),
                    });
                    metrics::record_shown();
                    self.active = Some(active);
                }
                Err((request, e)) => {
                    warn!("Failed to show toast {}: {}", request.id(), e);
                    metrics::record_presentation_failure();
                    self.discard(request.id(), DiscardReason::PresentationFailed);
                }
            }
        }
    }

    async fn teardown(&mut self, active: ActiveDisplay, reason: DismissReason) {
        let id = active.id();
        if let Err(e) = active.teardown(self.surface.as_mut()).await {
            warn!("Failed to remove toast {}: {}", id, e);
            metrics::record_presentation_failure();
        }

        self.registry.clear(id);
        self.events.publish(ToastEvent::Dismissed { id, reason });
        metrics::record_dismissed();
        debug!("Toast {} dismissed ({:?})", id, reason);
    }

    fn discard(&self, id: ToastId, reason: DiscardReason) {
        self.registry.clear(id);
        self.events.publish(ToastEvent::Discarded { id, reason });
        metrics::record_discarded();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::{durations, Origin};
    use crate::surface::ElementHandle;
    use async_trait::async_trait;
    use std::sync::Mutex;

    #[derive(Clone, Default)]
    struct SharedSurface {
        calls: Arc<Mutex<Vec<String>>>,
        next: Arc<Mutex<u64>>,
    }

    #[async_trait]
    impl PresentationSurface for SharedSurface {
        async fn render(&mut self, request: &ToastRequest) -> Result<ElementHandle> {
            if request.content() == "broken" {
                return Err(ToastError::PresentationFailure("cannot draw".to_string()));
            }
            self.calls.lock().unwrap().push(format!("render {}", request.content()));
            let mut next = self.next.lock().unwrap();
            *next += 1;
            Ok(ElementHandle::new(*next))
        }

        async fn remove(&mut self, element: ElementHandle) -> Result<()> {
            self.calls.lock().unwrap().push(format!("remove {}", element.raw()));
            Ok(())
        }
    }

    fn manager(surface: SharedSurface) -> (DisplayQueueManager, Arc<ToastRegistry>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let registry = Arc::new(ToastRegistry::new());
        let manager = DisplayQueueManager::new(
            Box::new(surface),
            rx,
            tx,
            registry.clone(),
            ToastNotificationSystem::new(16),
            durations::MAX,
        );
        (manager, registry)
    }

    fn toast(content: &str) -> ToastRequest {
        ToastRequest::new(content).with_origin(Origin::new("test"))
    }

    #[tokio::test]
    async fn test_enqueue_promotes_only_when_idle() {
        let surface = SharedSurface::default();
        let (mut manager, registry) = manager(surface.clone());

        let a = toast("a");
        let b = toast("b");
        let (a_id, b_id) = (a.id(), b.id());
        manager.enqueue(a).await;
        manager.enqueue(b).await;

        assert_eq!(
            manager.snapshot(),
            DisplaySnapshot {
                active: Some(a_id),
                pending: vec![b_id],
            }
        );
        assert_eq!(registry.get(a_id), Some(ToastState::Active));
        assert_eq!(registry.get(b_id), Some(ToastState::Pending));
        assert_eq!(*surface.calls.lock().unwrap(), vec!["render a"]);
    }

    #[tokio::test]
    async fn test_dismiss_active_promotes_next() {
        let surface = SharedSurface::default();
        let (mut manager, registry) = manager(surface.clone());

        let a = toast("a");
        let a_id = a.id();
        manager.enqueue(a).await;
        manager.enqueue(toast("b")).await;

        manager.dismiss(a_id).await.expect("dismiss active");
        assert_eq!(registry.get(a_id), None);
        assert_eq!(manager.pending_len(), 0);
        assert_eq!(
            manager.active().map(|active| active.request().content().to_string()),
            Some("b".to_string())
        );
        assert_eq!(*surface.calls.lock().unwrap(), vec!["render a", "remove 1", "render b"]);

        assert!(matches!(
            manager.dismiss(a_id).await,
            Err(ToastError::UnknownHandle(id)) if id == a_id
        ));
    }

    #[tokio::test]
    async fn test_stale_expiry_is_ignored() {
        let surface = SharedSurface::default();
        let (mut manager, _registry) = manager(surface.clone());

        let a = toast("a");
        let a_id = a.id();
        manager.enqueue(a).await;
        manager.dismiss(a_id).await.expect("dismiss");
        manager.enqueue(toast("b")).await;

        manager.expire(a_id).await;
        assert!(manager.active().is_some());
        assert_eq!(*surface.calls.lock().unwrap(), vec!["render a", "remove 1", "render b"]);
    }

    #[tokio::test]
    async fn test_render_failure_moves_on() {
        let surface = SharedSurface::default();
        let (mut manager, registry) = manager(surface.clone());

        let broken = toast("broken");
        let broken_id = broken.id();
        manager.enqueue(broken).await;
        assert!(manager.active().is_none());
        assert_eq!(registry.get(broken_id), None);

        manager.enqueue(toast("ok")).await;
        assert!(manager.active().is_some());
    }

    #[tokio::test]
    async fn test_cancel_all_clears_everything() {
        let surface = SharedSurface::default();
        let (mut manager, registry) = manager(surface.clone());

        manager.enqueue(toast("a")).await;
        manager.enqueue(toast("b")).await;
        manager.enqueue(toast("c")).await;
        manager.cancel_all().await;

        assert_eq!(manager.snapshot(), DisplaySnapshot::default());
        assert!(registry.is_empty());
        assert_eq!(*surface.calls.lock().unwrap(), vec!["render a", "remove 1"]);
    }
}

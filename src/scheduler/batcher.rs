use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, oneshot};
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tracing::{debug, info, trace};

use super::{Command, Inbound};
use crate::common::{Origin, ToastId, ToastRequest};
use crate::config::DedupPolicy;
use crate::metrics;
use crate::notification::{DiscardReason, ToastEvent, ToastNotificationSystem};
use crate::state::{ToastRegistry, ToastState};

/// Result of collapsing one closed window.
#[derive(Debug, Default)]
pub struct WindowOutcome {
    /// Survivors in first-arrival order
    pub kept: Vec<ToastRequest>,
    /// `(merged, kept)` id pairs for every duplicate dropped
    pub merged: Vec<(ToastId, ToastId)>,
}

/// Collapses duplicates in `batch`, keeping the first occurrence of each key
/// in arrival order.
pub fn dedup_window(batch: Vec<ToastRequest>, policy: DedupPolicy) -> WindowOutcome {
    let mut seen: HashMap<(String, Option<Origin>), ToastId> = HashMap::with_capacity(batch.len());
    let mut outcome = WindowOutcome::default();

    for request in batch {
        let origin = match policy {
            DedupPolicy::Content => None,
            DedupPolicy::ContentAndOrigin => request.origin().cloned(),
        };
        let key = (request.content().to_string(), origin);

        match seen.get(&key) {
            Some(kept) => outcome.merged.push((request.id(), *kept)),
            None => {
                seen.insert(key, request.id());
                outcome.kept.push(request);
            }
        }
    }

    outcome
}

/// Collects submissions into fixed windows and forwards the deduplicated
/// survivors to the display queue when each window closes.
pub struct Batcher {
    window: Duration,
    policy: DedupPolicy,
    inbound: mpsc::UnboundedReceiver<Inbound>,
    commands: mpsc::UnboundedSender<Command>,
    buffer: Vec<ToastRequest>,
    registry: Arc<ToastRegistry>,
    events: ToastNotificationSystem,
}

impl Batcher {
    pub fn new(
        window: Duration,
        policy: DedupPolicy,
        inbound: mpsc::UnboundedReceiver<Inbound>,
        commands: mpsc::UnboundedSender<Command>,
        registry: Arc<ToastRegistry>,
        events: ToastNotificationSystem,
    ) -> Self {
        Self {
            window,
            policy,
            inbound,
            commands,
            buffer: Vec::new(),
            registry,
            events,
        }
    }

    pub async fn run(mut self) {
        info!("Toast batcher started with {:?} window", self.window);

        let mut ticker = interval_at(Instant::now() + self.window, self.window);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                message = self.inbound.recv() => match message {
                    Some(Inbound::Submit(request)) => self.accept(request),
                    Some(Inbound::Cancel(id)) => self.cancel(id),
                    Some(Inbound::CancelAll) => {
                        self.discard_buffer(DiscardReason::Cleared);
                        self.forward(Command::CancelAll);
                    }
                    Some(Inbound::Shutdown(ack)) => {
                        self.discard_buffer(DiscardReason::Cleared);
                        self.forward(Command::Shutdown(ack));
                        break;
                    }
                    None => {
                        // Every Toaster handle is gone
                        self.discard_buffer(DiscardReason::Cleared);
                        let (ack, _) = oneshot::channel();
                        self.forward(Command::Shutdown(ack));
                        break;
                    }
                },
                _ = ticker.tick() => self.close_window(),
            }
        }

        info!("Toast batcher stopped");
    }

    fn accept(&mut self, request: ToastRequest) {
        if let Err(e) = request.validate() {
            debug!("Dropping toast: {}", e);
            self.registry.clear(request.id());
            self.events.publish(ToastEvent::Discarded {
                id: request.id(),
                reason: DiscardReason::Invalid,
            });
            metrics::record_discarded();
            return;
        }

        self.registry.mark(request.id(), ToastState::Batching);
        self.buffer.push(request);
    }

    fn cancel(&mut self, id: ToastId) {
        match self.buffer.iter().position(|r| r.id() == id) {
            Some(position) => {
                self.buffer.remove(position);
                self.registry.clear(id);
                self.events.publish(ToastEvent::Discarded {
                    id,
                    reason: DiscardReason::Cancelled,
                });
                metrics::record_discarded();
            }
            None => self.forward(Command::Dismiss(id)),
        }
    }

    fn close_window(&mut self) {
        if self.buffer.is_empty() {
            return;
        }

        let batch = std::mem::take(&mut self.buffer);
        let received = batch.len();
        let outcome = dedup_window(batch, self.policy);

        for (merged, kept) in &outcome.merged {
            self.registry.clear(*merged);
            self.events.publish(ToastEvent::Discarded {
                id: *merged,
                reason: DiscardReason::Duplicate { kept: *kept },
            });
        }
        if !outcome.merged.is_empty() {
            metrics::record_merged(outcome.merged.len() as u64);
        }

        trace!("Window closed: {} received, {} forwarded", received, outcome.kept.len());
        for request in outcome.kept {
            self.forward(Command::Enqueue(request));
        }
    }

    fn discard_buffer(&mut self, reason: DiscardReason) {
        for request in std::mem::take(&mut self.buffer) {
            self.registry.clear(request.id());
            self.events.publish(ToastEvent::Discarded {
                id: request.id(),
                reason,
            });
            metrics::record_discarded();
        }
    }

    fn forward(&self, command: Command) {
        if self.commands.send(command).is_err() {
            debug!("Display queue is gone, dropping command");
        }
    }
}

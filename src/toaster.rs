use std::sync::{Arc, OnceLock};
use tokio::runtime::Handle;
use tokio::sync::{broadcast, mpsc, oneshot};
use tracing::{debug, info, warn};

use crate::common::{Origin, Placement, TextSize, ToastId, ToastRequest, ToastStyle};
use crate::config::ToasterConfig;
use crate::error::{Result, ToastError};
use crate::metrics;
use crate::notification::{ToastEvent, ToastNotificationSystem};
use crate::scheduler::{Batcher, Command, DisplayQueueManager, DisplaySnapshot, Inbound};
use crate::state::{ToastRegistry, ToastState};
use crate::surface::PresentationSurface;

static GLOBAL: OnceLock<Toaster> = OnceLock::new();

/// Caller-facing handle to a running toast scheduler.
///
/// Cheap to clone and usable from any thread; `show`, `cancel` and
/// `cancel_all` never block and never fail.
#[derive(Clone)]
pub struct Toaster {
    inbound: mpsc::UnboundedSender<Inbound>,
    commands: mpsc::UnboundedSender<Command>,
    registry: Arc<ToastRegistry>,
    events: ToastNotificationSystem,
    config: Arc<ToasterConfig>,
}

impl Toaster {
    /// Starts the batcher and the presentation task on the current tokio
    /// runtime. Fails with `ConfigError` when called outside one.
    pub fn spawn<S>(config: ToasterConfig, surface: S) -> Result<Self>
    where
        S: PresentationSurface + 'static,
    {
        config.validate()?;
        let runtime = Handle::try_current()
            .map_err(|e| ToastError::ConfigError(format!("no tokio runtime: {}", e)))?;

        let (inbound_tx, inbound_rx) = mpsc::unbounded_channel();
        let (command_tx, command_rx) = mpsc::unbounded_channel();
        let registry = Arc::new(ToastRegistry::new());
        let events = ToastNotificationSystem::new(config.event_capacity);

        let batcher = Batcher::new(
            config.window(),
            config.dedup_policy,
            inbound_rx,
            command_tx.clone(),
            registry.clone(),
            events.clone(),
        );
        let display = DisplayQueueManager::new(
            Box::new(surface),
            command_rx,
            command_tx.clone(),
            registry.clone(),
            events.clone(),
            config.max_duration(),
        );

        runtime.spawn(batcher.run());
        runtime.spawn(display.run());
        info!(
            "Toaster started (window {:?}, max duration {:?})",
            config.window(),
            config.max_duration()
        );

        Ok(Self {
            inbound: inbound_tx,
            commands: command_tx,
            registry,
            events,
            config: Arc::new(config),
        })
    }

    pub fn config(&self) -> &ToasterConfig {
        &self.config
    }

    /// Shows `content` at the default placement.
    pub fn show(&self, origin: &Origin, content: impl Into<String>) -> ToastId {
        self.show_at(origin, content, Placement::default())
    }

    pub fn show_at(&self, origin: &Origin, content: impl Into<String>, placement: Placement) -> ToastId {
        let request = ToastRequest::new(content)
            .with_origin(origin.clone())
            .with_placement(placement)
            .with_duration(self.config.default_duration())
            .with_style(ToastStyle {
                text_size: Some(TextSize::Medium),
                ..Default::default()
            });
        self.submit(request)
    }

    /// Submits a fully built request. Invalid requests are dropped later
    /// without an error.
    pub fn submit(&self, request: ToastRequest) -> ToastId {
        let id = request.id();
        metrics::record_submitted();
        self.registry.mark(id, ToastState::Batching);

        if self.inbound.send(Inbound::Submit(request)).is_err() {
            warn!("Toaster is shut down, dropping toast {}", id);
            self.registry.clear(id);
        }
        id
    }

    /// Dismisses or drops the toast. Unknown ids are ignored.
    pub fn cancel(&self, id: ToastId) {
        if self.inbound.send(Inbound::Cancel(id)).is_err() {
            debug!("Toaster is shut down, ignoring cancel of {}", id);
        }
    }

    pub fn cancel_all(&self) {
        if self.inbound.send(Inbound::CancelAll).is_err() {
            debug!("Toaster is shut down, ignoring cancel_all");
        }
    }

    /// `None` once the toast is finished (or if it never existed).
    pub fn status(&self, id: ToastId) -> Option<ToastState> {
        self.registry.get(id)
    }

    pub fn is_showing(&self, id: ToastId) -> bool {
        self.status(id) == Some(ToastState::Active)
    }

    pub fn subscribe(&self) -> broadcast::Receiver<ToastEvent> {
        self.events.subscribe()
    }

    pub async fn snapshot(&self) -> Result<DisplaySnapshot> {
        let (tx, rx) = oneshot::channel();
        self.commands
            .send(Command::Snapshot(tx))
            .map_err(|_| ToastError::Closed)?;
        rx.await.map_err(|_| ToastError::Closed)
    }

    /// Drops everything queued, removes the toast on screen and stops both
    /// tasks.
    pub async fn shutdown(&self) -> Result<()> {
        let (tx, rx) = oneshot::channel();
        self.inbound
            .send(Inbound::Shutdown(tx))
            .map_err(|_| ToastError::Closed)?;
        rx.await.map_err(|_| ToastError::Closed)?;
        info!("Toaster shut down");
        Ok(())
    }
}

/// Makes `toaster` the process-wide default. Only the first call wins.
pub fn install_global(toaster: Toaster) -> Result<()> {
    GLOBAL
        .set(toaster)
        .map_err(|_| ToastError::ConfigError("a global toaster is already installed".to_string()))
}

pub fn global() -> Option<&'static Toaster> {
    GLOBAL.get()
}

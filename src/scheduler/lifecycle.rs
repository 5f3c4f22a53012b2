use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::{sleep_until, Instant};
use tracing::{debug, warn};

use super::Command;
use crate::common::{ToastId, ToastRequest};
use crate::error::{Result, ToastError};
use crate::surface::{ElementHandle, PresentationSurface};

/// The toast currently on screen, with its element and expiry timer.
///
/// Teardown consumes the value, so a toast can only be torn down once no
/// matter how its expiry and a manual dismiss interleave.
#[derive(Debug)]
pub struct ActiveDisplay {
    request: ToastRequest,
    element: ElementHandle,
    shown_at: Instant,
    duration: Duration,
    timer: JoinHandle<()>,
}

impl ActiveDisplay {
    /// Renders `request` and arms its expiry timer. On failure the request is
    /// handed back together with the error.
    pub async fn present(
        request: ToastRequest,
        surface: &mut dyn PresentationSurface,
        max_duration: Duration,
        expiry_tx: mpsc::UnboundedSender<Command>,
    ) -> std::result::Result<Self, (ToastRequest, ToastError)> {
        let duration = match request.effective_duration(max_duration) {
            Ok(duration) => duration,
            Err(e) => {
                warn!("Toast {}: {}", request.id(), e);
                max_duration
            }
        };

        let element = match surface.render(&request).await {
            Ok(element) => element,
            Err(e) => return Err((request, e)),
        };

        let shown_at = Instant::now();
        let deadline = shown_at + duration;
        let id = request.id();
        let timer = tokio::spawn(async move {
            sleep_until(deadline).await;
            // The presentation task may be gone already
            let _ = expiry_tx.send(Command::Expire(id));
        });

        debug!("Presenting toast {} for {:?}", id, duration);
        Ok(Self {
            request,
            element,
            shown_at,
            duration,
            timer,
        })
    }

    pub fn id(&self) -> ToastId {
        self.request.id()
    }

    pub fn request(&self) -> &ToastRequest {
        &self.request
    }

    /// The clamped duration the timer was armed with.
    pub fn duration(&self) -> Duration {
        self.duration
    }

    /// Stops the timer and removes the element.
    pub async fn teardown(self, surface: &mut dyn PresentationSurface) -> Result<ToastRequest> {
        self.timer.abort();
        debug!("Tearing down toast {} after {:?}", self.request.id(), self.shown_at.elapsed());
        surface.remove(self.element).await?;
        Ok(self.request)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::{durations, Origin};
    use async_trait::async_trait;

    #[derive(Default)]
    struct CountingSurface {
        rendered: u64,
        removed: u64,
        fail_render: bool,
    }

    #[async_trait]
    impl PresentationSurface for CountingSurface {
        async fn render(&mut self, _request: &ToastRequest) -> Result<ElementHandle> {
            if self.fail_render {
                return Err(ToastError::PresentationFailure("no window".to_string()));
            }
            self.rendered += 1;
            Ok(ElementHandle::new(self.rendered))
        }

        async fn remove(&mut self, _element: ElementHandle) -> Result<()> {
            self.removed += 1;
            Ok(())
        }
    }

    fn request(duration: Duration) -> ToastRequest {
        ToastRequest::new("uploaded")
            .with_origin(Origin::new("test"))
            .with_duration(duration)
    }

    #[tokio::test(start_paused = true)]
    async fn test_timer_fires_after_clamped_duration() {
        let mut surface = CountingSurface::default();
        let (tx, mut rx) = mpsc::unbounded_channel();
        let start = Instant::now();

        let active = ActiveDisplay::present(
            request(durations::MAX + Duration::from_secs(1)),
            &mut surface,
            durations::MAX,
            tx,
        )
        .await
        .expect("present");
        assert_eq!(active.duration(), durations::MAX);

        match rx.recv().await {
            Some(Command::Expire(id)) => assert_eq!(id, active.id()),
            other => panic!("unexpected command: {:?}", other),
        }
        assert_eq!(start.elapsed(), durations::MAX);
        assert_eq!(surface.rendered, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_teardown_cancels_timer() {
        let mut surface = CountingSurface::default();
        let (tx, mut rx) = mpsc::unbounded_channel();

        let active = ActiveDisplay::present(request(durations::SHORT), &mut surface, durations::MAX, tx)
            .await
            .expect("present");
        let request = active.teardown(&mut surface).await.expect("teardown");
        assert_eq!(request.content(), "uploaded");
        assert_eq!(surface.removed, 1);

        // Timer task aborted, so its sender is dropped without sending
        assert!(rx.recv().await.is_none());
    }

    #[tokio::test]
    async fn test_render_failure_returns_request() {
        let mut surface = CountingSurface {
            fail_render: true,
            ..Default::default()
        };
        let (tx, _rx) = mpsc::unbounded_channel();
        let submitted = request(durations::SHORT);
        let id = submitted.id();

        match ActiveDisplay::present(submitted, &mut surface, durations::MAX, tx).await {
            Err((request, ToastError::PresentationFailure(_))) => assert_eq!(request.id(), id),
            other => panic!("unexpected result: {:?}", other.map(|a| a.id())),
        }
    }
}

use async_trait::async_trait;
use std::collections::HashMap;
use tracing::info;

use crate::common::ToastRequest;
use crate::error::{Result, ToastError};

/// Handle to an element the surface has on screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ElementHandle(u64);

impl ElementHandle {
    pub fn new(raw: u64) -> Self {
        Self(raw)
    }

    pub fn raw(&self) -> u64 {
        self.0
    }
}

/// The rendering boundary. Implementations draw and remove the visual
/// element; the scheduler only calls them from its presentation task.
#[async_trait]
pub trait PresentationSurface: Send {
    async fn render(&mut self, request: &ToastRequest) -> Result<ElementHandle>;

    async fn remove(&mut self, element: ElementHandle) -> Result<()>;
}

/// Surface that "shows" toasts as log lines.
#[derive(Debug, Default)]
pub struct LogSurface {
    next_element: u64,
    shown: HashMap<ElementHandle, String>,
}

impl LogSurface {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl PresentationSurface for LogSurface {
    async fn render(&mut self, request: &ToastRequest) -> Result<ElementHandle> {
        self.next_element += 1;
        let element = ElementHandle::new(self.next_element);
        let placement = request.placement();
        info!(
            "[toast {}] {} ({:?}/{:?}, offset {},{})",
            element.raw(),
            request.content(),
            placement.vertical,
            placement.horizontal,
            placement.x_offset,
            placement.y_offset
        );
        self.shown.insert(element, request.content().to_string());
        Ok(element)
    }

    async fn remove(&mut self, element: ElementHandle) -> Result<()> {
        match self.shown.remove(&element) {
            Some(content) => {
                info!("[toast {}] hidden: {}", element.raw(), content);
                Ok(())
            }
            None => Err(ToastError::PresentationFailure(format!(
                "element {} is not on screen",
                element.raw()
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::Origin;

    #[tokio::test]
    async fn test_log_surface_tracks_elements() {
        let mut surface = LogSurface::new();
        let request = ToastRequest::new("copied").with_origin(Origin::new("editor"));

        let element = surface.render(&request).await.expect("render");
        assert!(surface.remove(element).await.is_ok());
        assert!(matches!(
            surface.remove(element).await,
            Err(ToastError::PresentationFailure(_))
        ));
    }
}

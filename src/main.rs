use rustoast::common::{Animation, Icon, IconPosition};
use rustoast::{durations, LogSurface, Origin, Placement, ToastEvent, ToastRequest, ToastStyle, Toaster, ToasterConfig};

use std::time::Duration;
use anyhow::Result;
use tracing::info;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt::init();

    let config = ToasterConfig::from_env()?;
    let toaster = Toaster::spawn(config, LogSurface::new())?;
    let origin = Origin::new("demo");

    let mut events = toaster.subscribe();
    let listener = tokio::spawn(async move {
        while let Ok(event) = events.recv().await {
            match event {
                ToastEvent::Dismissed { id, reason } => info!("toast {} dismissed: {:?}", id, reason),
                ToastEvent::Discarded { id, reason } => info!("toast {} discarded: {:?}", id, reason),
                _ => {}
            }
        }
    });

    // A burst of identical errors collapses into one toast
    for _ in 0..5 {
        toaster.show(&origin, "Network error");
    }
    toaster.show_at(&origin, "Saved", Placement::top().with_offset(0, 48));

    // Clamped to the maximum duration
    toaster.submit(
        ToastRequest::new("Sync finished")
            .with_origin(origin.clone())
            .with_duration(Duration::from_secs(10))
            .with_style(ToastStyle {
                animation: Animation::FlyIn,
                icon: Some(Icon {
                    resource: "ic_sync".to_string(),
                    position: IconPosition::Left,
                }),
                ..Default::default()
            }),
    );

    let doomed = toaster.show(&origin, "You will never see this");
    tokio::time::sleep(toaster.config().window() * 2).await;
    toaster.cancel(doomed);

    tokio::time::sleep(durations::VERY_SHORT * 2 + durations::MAX).await;
    toaster.shutdown().await?;
    drop(toaster);
    listener.await?;

    Ok(())
}

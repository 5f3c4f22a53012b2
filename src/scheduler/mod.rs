//! Request scheduling: the dedup window, the display queue, and the lifecycle
//! of the toast currently on screen.

use tokio::sync::oneshot;

use crate::common::{ToastId, ToastRequest};

pub mod batcher;
pub mod display_queue;
pub mod lifecycle;

pub use self::batcher::{dedup_window, Batcher, WindowOutcome};
pub use self::display_queue::{DisplayQueueManager, DisplaySnapshot};
pub use self::lifecycle::ActiveDisplay;

/// Messages from callers to the batcher.
#[derive(Debug)]
pub enum Inbound {
    Submit(ToastRequest),
    Cancel(ToastId),
    CancelAll,
    Shutdown(oneshot::Sender<()>),
}

/// Messages handled on the presentation task.
#[derive(Debug)]
pub enum Command {
    Enqueue(ToastRequest),
    Dismiss(ToastId),
    CancelAll,
    /// Sent by the expiry timer of the toast with this id
    Expire(ToastId),
    Snapshot(oneshot::Sender<DisplaySnapshot>),
    Shutdown(oneshot::Sender<()>),
}

pub mod common;
pub mod config;
pub mod error;
pub mod metrics;
pub mod notification;
pub mod scheduler;
pub mod state;
pub mod surface;
pub mod toaster;

pub use common::{durations, Origin, Placement, ToastId, ToastRequest, ToastStyle};
pub use config::{DedupPolicy, ToasterConfig};
pub use error::{Result, ToastError};
pub use notification::{DiscardReason, DismissReason, ToastEvent};
pub use scheduler::DisplaySnapshot;
pub use state::ToastState;
pub use surface::{ElementHandle, LogSurface, PresentationSurface};
pub use toaster::{global, install_global, Toaster};

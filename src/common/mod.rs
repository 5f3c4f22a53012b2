//! Common types
//!
//! Core value types shared by every stage of the toast pipeline:
//! - request identity and origin (ToastId, Origin)
//! - the request itself (ToastRequest)
//! - placement and style attributes passed through to the surface
//! - duration and text size tiers

use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use uuid::Uuid;

use crate::error::{Result, ToastError};

/// Duration tiers for a toast, in milliseconds.
pub mod durations {
    use std::time::Duration;

    pub const VERY_SHORT: Duration = Duration::from_millis(1500);
    pub const SHORT: Duration = Duration::from_millis(2000);
    pub const MEDIUM: Duration = Duration::from_millis(2750);
    pub const LONG: Duration = Duration::from_millis(3500);
    pub const EXTRA_LONG: Duration = Duration::from_millis(4500);

    /// No toast is ever shown longer than this unless configured otherwise.
    pub const MAX: Duration = EXTRA_LONG;
    pub const DEFAULT: Duration = VERY_SHORT;
}

/// Handle returned to callers for a submitted toast.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ToastId(Uuid);

impl ToastId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for ToastId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ToastId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Opaque handle to whoever asked for the toast (a window, a screen, a
/// component). The scheduler never looks inside it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Origin(Arc<str>);

impl Origin {
    pub fn new(name: impl AsRef<str>) -> Self {
        Self(Arc::from(name.as_ref()))
    }

    pub fn name(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Origin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum VerticalAlign {
    Top,
    Center,
    Bottom,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum HorizontalAlign {
    Start,
    Center,
    End,
}

/// Where the surface should put the toast.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Placement {
    pub vertical: VerticalAlign,
    pub horizontal: HorizontalAlign,
    /// Horizontal offset in surface units
    pub x_offset: i32,
    /// Vertical offset in surface units
    pub y_offset: i32,
}

impl Placement {
    pub fn new(vertical: VerticalAlign, horizontal: HorizontalAlign) -> Self {
        Self {
            vertical,
            horizontal,
            x_offset: 0,
            y_offset: 0,
        }
    }

    pub fn top() -> Self {
        Self::new(VerticalAlign::Top, HorizontalAlign::Center)
    }

    pub fn center() -> Self {
        Self::new(VerticalAlign::Center, HorizontalAlign::Center)
    }

    pub fn bottom() -> Self {
        Self::new(VerticalAlign::Bottom, HorizontalAlign::Center)
    }

    pub fn with_offset(mut self, x_offset: i32, y_offset: i32) -> Self {
        self.x_offset = x_offset;
        self.y_offset = y_offset;
        self
    }
}

impl Default for Placement {
    fn default() -> Self {
        Self::bottom()
    }
}

/// Text size tiers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TextSize {
    ExtraSmall,
    Small,
    Medium,
    Large,
}

impl TextSize {
    pub fn points(self) -> u16 {
        match self {
            TextSize::ExtraSmall => 12,
            TextSize::Small => 14,
            TextSize::Medium => 16,
            TextSize::Large => 18,
        }
    }
}

/// Show/hide animation kind
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Animation {
    Fade,
    FlyIn,
    Scale,
    Popup,
}

impl Default for Animation {
    fn default() -> Self {
        Self::Fade
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum IconPosition {
    Left,
    Right,
    Top,
    Bottom,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Icon {
    /// Surface-specific resource name
    pub resource: String,
    pub position: IconPosition,
}

/// Presentation attributes. The scheduler passes these through to the
/// surface untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ToastStyle {
    pub text_size: Option<TextSize>,
    /// ARGB color
    pub text_color: Option<u32>,
    pub icon: Option<Icon>,
    pub animation: Animation,
    /// Surface-specific background resource
    pub background: Option<String>,
    /// Arbitrary caller data carried along with the toast
    pub payload: Option<serde_json::Value>,
}

/// A single request to show a toast.
///
/// Built once by the caller and then moved through the pipeline; nothing
/// downstream mutates it.
#[derive(Debug, Clone)]
pub struct ToastRequest {
    id: ToastId,
    content: String,
    origin: Option<Origin>,
    placement: Placement,
    duration: Duration,
    style: ToastStyle,
}

impl ToastRequest {
    pub fn new(content: impl Into<String>) -> Self {
        Self {
            id: ToastId::new(),
            content: content.into(),
            origin: None,
            placement: Placement::default(),
            duration: durations::DEFAULT,
            style: ToastStyle::default(),
        }
    }

    pub fn with_origin(mut self, origin: Origin) -> Self {
        self.origin = Some(origin);
        self
    }

    pub fn with_placement(mut self, placement: Placement) -> Self {
        self.placement = placement;
        self
    }

    /// Durations above the configured maximum are clamped when the toast is
    /// presented, not here.
    pub fn with_duration(mut self, duration: Duration) -> Self {
        self.duration = duration;
        self
    }

    pub fn with_style(mut self, style: ToastStyle) -> Self {
        self.style = style;
        self
    }

    pub fn id(&self) -> ToastId {
        self.id
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn origin(&self) -> Option<&Origin> {
        self.origin.as_ref()
    }

    pub fn placement(&self) -> Placement {
        self.placement
    }

    pub fn duration(&self) -> Duration {
        self.duration
    }

    pub fn style(&self) -> &ToastStyle {
        &self.style
    }

    /// Checks the fields every request must carry.
    pub fn validate(&self) -> Result<()> {
        if self.content.trim().is_empty() {
            return Err(ToastError::InvalidRequest(format!(
                "toast {} has empty content",
                self.id
            )));
        }
        if self.origin.is_none() {
            return Err(ToastError::InvalidRequest(format!(
                "toast {} has no origin",
                self.id
            )));
        }
        Ok(())
    }

    /// How long the toast stays up once presented.
    pub fn effective_duration(&self, max: Duration) -> Result<Duration> {
        if self.duration > max {
            return Err(ToastError::DurationOutOfRange {
                requested: self.duration,
                max,
            });
        }
        Ok(self.duration)
    }
}

//! Pipeline counters and gauges. Nothing is recorded unless the application
//! installs a `metrics` recorder.

use metrics::{counter, gauge};

pub fn record_submitted() {
    counter!("toast.submitted", 1);
}

pub fn record_merged(count: u64) {
    counter!("toast.merged", count);
}

pub fn record_discarded() {
    counter!("toast.discarded", 1);
}

pub fn record_shown() {
    counter!("toast.shown", 1);
}

pub fn record_dismissed() {
    counter!("toast.dismissed", 1);
}

pub fn record_presentation_failure() {
    counter!("toast.presentation_failures", 1);
}

pub fn set_pending(len: usize) {
    gauge!("toast.pending", len as f64);
}

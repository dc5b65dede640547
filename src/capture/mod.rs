//! Keystroke-timing capture.
//!
//! Turns a live stream of raw key-press notifications into classified
//! [`TimingEvent`]s. Only timing is captured - never key identity.

pub mod recorder;
pub mod source;
pub mod types;

// Re-export commonly used types
pub use recorder::TypingRecorder;
pub use source::{CaptureError, KeypressHandle, KeypressSource, ManualSource, StdinSource};
pub use types::{
    CaptureStats, RawKeypress, SessionSummary, TimingEvent, BURST_THRESHOLD_MS, PAUSE_THRESHOLD_MS,
};

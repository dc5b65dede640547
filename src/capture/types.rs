//! Privacy-preserving timing event types.
//!
//! These types capture ONLY when keys were pressed - never which keys.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Gap above this is a thinking/break pause (milliseconds).
pub const PAUSE_THRESHOLD_MS: f64 = 2000.0;

/// Gap below this is rapid-fire burst typing (milliseconds).
pub const BURST_THRESHOLD_MS: f64 = 50.0;

/// A raw key-press notification from the host input layer.
///
/// Privacy guarantee: carries a timestamp and nothing else. No key codes,
/// characters, or modifier state ever enter the crate.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct RawKeypress {
    /// When the key went down
    pub timestamp: DateTime<Utc>,
}

impl RawKeypress {
    /// A keypress stamped with the current time.
    pub fn now() -> Self {
        Self {
            timestamp: Utc::now(),
        }
    }

    pub fn at(timestamp: DateTime<Utc>) -> Self {
        Self { timestamp }
    }
}

/// One classified timing record per keypress.
///
/// `is_pause` and `is_burst` are mutually exclusive by construction (the
/// threshold ranges do not overlap) and both false when `interval_ms` is
/// absent, which it is for the first event of a session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimingEvent {
    /// Timestamp of the keypress
    pub timestamp: DateTime<Utc>,
    /// Gap since the previous keypress in the same session, in milliseconds
    #[serde(default)]
    pub interval_ms: Option<f64>,
    /// Gap exceeded the pause threshold
    #[serde(default)]
    pub is_pause: bool,
    /// Gap was below the burst threshold
    #[serde(default)]
    pub is_burst: bool,
    /// Session this event was captured in
    #[serde(default)]
    pub session_id: Option<Uuid>,
}

impl TimingEvent {
    /// Classify a keypress against the previous one in the session.
    ///
    /// `previous` is `None` for the first event, which leaves the interval
    /// absent and both classification flags false.
    pub fn classify(
        timestamp: DateTime<Utc>,
        previous: Option<DateTime<Utc>>,
        session_id: Option<Uuid>,
    ) -> Self {
        let interval_ms = previous.map(|prev| (timestamp - prev).num_milliseconds() as f64);

        let (is_pause, is_burst) = match interval_ms {
            Some(gap) => (gap > PAUSE_THRESHOLD_MS, gap < BURST_THRESHOLD_MS),
            None => (false, false),
        };

        Self {
            timestamp,
            interval_ms,
            is_pause,
            is_burst,
            session_id,
        }
    }
}

/// Immutable record of one start/stop capture cycle.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionSummary {
    pub session_id: Uuid,
    pub started_at: DateTime<Utc>,
    pub ended_at: DateTime<Utc>,
    pub duration_secs: f64,
    pub total_keypresses: u64,
    /// Full ordered sequence of the session's events
    pub events: Vec<TimingEvent>,
}

/// Point-in-time statistics for a running session.
///
/// All fields are zero when the recorder is stopped or has seen no events.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CaptureStats {
    /// Estimated words per minute (keypresses / 5 per elapsed minute)
    pub wpm: f64,
    /// Mean of the recorded inter-keystroke intervals, in milliseconds
    pub avg_interval_ms: f64,
    /// Events classified as pauses
    pub pause_count: u64,
    /// Events classified as bursts
    pub burst_count: u64,
    /// Total keypresses this session
    pub keypress_count: u64,
    /// Seconds from session start to the last recorded keypress
    pub elapsed_secs: f64,
}

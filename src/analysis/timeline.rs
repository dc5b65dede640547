//! Sliding-window mood timeline.
//!
//! Slices an event sequence into fixed-size, half-overlapping windows and
//! analyzes each independently, yielding a chronological series of mood and
//! energy readings.

use crate::analysis::mood::{analyze_session, Mood};
use crate::capture::types::TimingEvent;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Default number of events per window.
pub const DEFAULT_WINDOW_SIZE: usize = 30;

/// One point of the mood timeline.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimelinePoint {
    /// Timestamp of the window's last event (epoch when there were none)
    pub timestamp: DateTime<Utc>,
    pub mood: Mood,
    pub energy_score: u8,
    pub wpm: f64,
}

/// Compute mood over time with a sliding window.
///
/// Sequences shorter than one window produce a single point covering the
/// whole sequence. Otherwise windows of `window_size` events advance by
/// `max(1, window_size / 2)` (50% overlap); a partial tail shorter than one
/// window is dropped.
pub fn calculate_mood_timeline(events: &[TimingEvent], window_size: usize) -> Vec<TimelinePoint> {
    let window_size = window_size.max(1);

    if events.len() < window_size {
        let analysis = analyze_session(events);
        return vec![TimelinePoint {
            timestamp: events
                .last()
                .map(|e| e.timestamp)
                .unwrap_or(DateTime::UNIX_EPOCH),
            mood: analysis.mood,
            energy_score: analysis.energy_score,
            wpm: analysis.wpm,
        }];
    }

    let step = (window_size / 2).max(1);
    let mut timeline = Vec::new();

    let mut start = 0;
    while start + window_size <= events.len() {
        let window = &events[start..start + window_size];
        let analysis = analyze_session(window);

        timeline.push(TimelinePoint {
            // Window is never empty here
            timestamp: window[window.len() - 1].timestamp,
            mood: analysis.mood,
            energy_score: analysis.energy_score,
            wpm: analysis.wpm,
        });

        start += step;
    }

    timeline
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn steady_events(count: usize, gap_ms: i64) -> Vec<TimingEvent> {
        let base = Utc::now();
        let mut events = Vec::with_capacity(count);
        let mut previous: Option<DateTime<Utc>> = None;
        for i in 0..count {
            let ts = base + Duration::milliseconds(gap_ms * i as i64);
            events.push(TimingEvent::classify(ts, previous, None));
            previous = Some(ts);
        }
        events
    }

    #[test]
    fn test_empty_sequence_yields_single_epoch_point() {
        let timeline = calculate_mood_timeline(&[], DEFAULT_WINDOW_SIZE);
        assert_eq!(timeline.len(), 1);
        assert_eq!(timeline[0].timestamp, DateTime::UNIX_EPOCH);
        assert_eq!(timeline[0].mood, Mood::Neutral);
        assert_eq!(timeline[0].wpm, 0.0);
    }

    #[test]
    fn test_short_sequence_matches_whole_session_analysis() {
        let events = steady_events(12, 100);
        let timeline = calculate_mood_timeline(&events, DEFAULT_WINDOW_SIZE);
        let analysis = analyze_session(&events);

        assert_eq!(timeline.len(), 1);
        assert_eq!(timeline[0].timestamp, events[11].timestamp);
        assert_eq!(timeline[0].mood, analysis.mood);
        assert_eq!(timeline[0].energy_score, analysis.energy_score);
        assert_eq!(timeline[0].wpm, analysis.wpm);
    }

    #[test]
    fn test_stride_and_tail_truncation() {
        // 70 events, window 30, step 15: windows start at 0, 15, 30; the
        // tail past index 59 never fills a window and is dropped.
        let events = steady_events(70, 100);
        let timeline = calculate_mood_timeline(&events, 30);
        assert_eq!(timeline.len(), 3);

        assert_eq!(timeline[0].timestamp, events[29].timestamp);
        assert_eq!(timeline[1].timestamp, events[44].timestamp);
        assert_eq!(timeline[2].timestamp, events[59].timestamp);
    }

    #[test]
    fn test_exact_multiple_covers_every_window() {
        let events = steady_events(60, 100);
        let timeline = calculate_mood_timeline(&events, 30);
        // Starts at 0, 15, 30
        assert_eq!(timeline.len(), 3);
        assert_eq!(timeline[2].timestamp, events[59].timestamp);
    }

    #[test]
    fn test_timeline_is_chronological() {
        let events = steady_events(120, 80);
        let timeline = calculate_mood_timeline(&events, 30);
        for pair in timeline.windows(2) {
            assert!(pair[0].timestamp <= pair[1].timestamp);
        }
    }
}

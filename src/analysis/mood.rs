//! Mood and energy inference from typing rhythm.
//!
//! Everything here is a pure function of the event sequence it is handed:
//! stateless, reentrant, and safe to run concurrently on independent
//! snapshots. Sparse input degrades to Neutral with zero confidence rather
//! than producing a false positive.

use crate::capture::types::TimingEvent;
use serde::{Deserialize, Serialize};
use statrs::statistics::Statistics;
use std::fmt;

/// Energy score reported when there is nothing to measure.
pub const NEUTRAL_ENERGY: u8 = 50;

/// Minimum events before mood detection will commit to a state.
const MIN_EVENTS_FOR_MOOD: usize = 10;

/// Minimum defined intervals before rhythm statistics mean anything.
const MIN_TIMED_INTERVALS: usize = 5;

/// Coefficient of variation below this counts as a consistent rhythm.
const CONSISTENT_CV: f64 = 0.3;

/// Coefficient of variation above this counts as an irregular rhythm.
const IRREGULAR_CV: f64 = 0.5;

/// Burst share above this suggests agitated typing.
const HIGH_BURST_RATIO: f64 = 0.3;

/// Pause share above this suggests flagging attention.
const HIGH_PAUSE_RATIO: f64 = 0.1;

/// WPM floor for the focused state.
const FOCUSED_WPM: f64 = 35.0;

/// WPM ceiling for the relaxed state.
const RELAXED_WPM: f64 = 30.0;

/// Behavioral states inferred from typing rhythm.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Mood {
    /// Steady rhythm, sustained speed
    Focused,
    /// Fast bursts over an irregular rhythm
    Stressed,
    /// Unhurried but smooth typing
    Relaxed,
    /// Frequent long gaps
    Fatigued,
    /// No clear signal, or not enough data
    Neutral,
}

impl fmt::Display for Mood {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Mood::Focused => "Focused",
            Mood::Stressed => "Stressed",
            Mood::Relaxed => "Relaxed",
            Mood::Fatigued => "Fatigued",
            Mood::Neutral => "Neutral",
        };
        write!(f, "{name}")
    }
}

/// The rhythm metrics behind a mood call, rounded for display stability.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MoodIndicators {
    /// Mean inter-keystroke interval in milliseconds (1 decimal)
    pub avg_interval_ms: f64,
    /// `1 - min(cv, 1)`: higher is steadier (2 decimals)
    pub rhythm_consistency: f64,
    /// Share of events classified as bursts (3 decimals)
    pub burst_ratio: f64,
    /// Share of events classified as pauses (3 decimals)
    pub pause_ratio: f64,
    /// Words per minute (1 decimal)
    pub wpm: f64,
}

/// A point-in-time mood call.
///
/// `indicators` is `None` exactly when the result is Neutral because the
/// input was too sparse to measure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MoodSnapshot {
    pub mood: Mood,
    /// 0.0 - 1.0
    pub confidence: f64,
    pub indicators: Option<MoodIndicators>,
}

impl MoodSnapshot {
    fn insufficient() -> Self {
        Self {
            mood: Mood::Neutral,
            confidence: 0.0,
            indicators: None,
        }
    }
}

/// Complete analysis of one event sequence.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionAnalysis {
    pub mood: Mood,
    pub mood_confidence: f64,
    /// 0 - 100
    pub energy_score: u8,
    pub wpm: f64,
    pub total_keypresses: usize,
    pub duration_secs: f64,
    pub indicators: Option<MoodIndicators>,
}

/// Raw (unrounded) metrics the classifier works from.
struct RhythmMetrics {
    avg_interval_ms: f64,
    /// Coefficient of variation of the intervals
    cv: f64,
    burst_ratio: f64,
    pause_ratio: f64,
    wpm: f64,
}

impl MoodIndicators {
    fn from_metrics(m: &RhythmMetrics) -> Self {
        Self {
            avg_interval_ms: round_to(m.avg_interval_ms, 1),
            rhythm_consistency: round_to(1.0 - m.cv.min(1.0), 2),
            burst_ratio: round_to(m.burst_ratio, 3),
            pause_ratio: round_to(m.pause_ratio, 3),
            wpm: round_to(m.wpm, 1),
        }
    }
}

/// One entry of the classifier: a predicate and its confidence formula.
struct MoodRule {
    mood: Mood,
    applies: fn(&RhythmMetrics) -> bool,
    confidence: fn(&RhythmMetrics) -> f64,
}

/// First-match-wins rule table. The conditions are not mutually exclusive;
/// order is the tie-break.
const MOOD_RULES: [MoodRule; 4] = [
    // Consistent rhythm at sustained speed
    MoodRule {
        mood: Mood::Focused,
        applies: |m| m.cv < CONSISTENT_CV && m.wpm > FOCUSED_WPM,
        confidence: |m| 0.7 + 0.3 * (1.0 - m.cv),
    },
    // Heavy bursting over an irregular rhythm
    MoodRule {
        mood: Mood::Stressed,
        applies: |m| m.burst_ratio > HIGH_BURST_RATIO && m.cv > IRREGULAR_CV,
        confidence: |m| 0.6 + m.burst_ratio * 0.4,
    },
    // Unhurried pace without long gaps
    MoodRule {
        mood: Mood::Relaxed,
        applies: |m| m.wpm < RELAXED_WPM && m.pause_ratio < HIGH_PAUSE_RATIO,
        confidence: |m| 0.6 + 0.4 * (1.0 - m.wpm / RELAXED_WPM),
    },
    // Long gaps dominate
    MoodRule {
        mood: Mood::Fatigued,
        applies: |m| m.pause_ratio > HIGH_PAUSE_RATIO,
        confidence: |m| 0.5 + m.pause_ratio * 2.0,
    },
];

/// Score typing energy on a 0-100 scale.
///
/// Faster typing and bursting raise the score, pausing lowers it, and a
/// supplied nonzero wpm scales the result (capped at 1.5x; the product may
/// pass 100 before the final clamp - the saturation is intentional).
/// Empty or interval-free input scores a neutral 50.
pub fn calculate_energy_score(events: &[TimingEvent], wpm: Option<f64>) -> u8 {
    if events.is_empty() {
        return NEUTRAL_ENERGY;
    }
    let intervals = defined_intervals(events);
    if intervals.is_empty() {
        return NEUTRAL_ENERGY;
    }

    let total = events.len() as f64;
    let burst_ratio = events.iter().filter(|e| e.is_burst).count() as f64 / total;
    let pause_ratio = events.iter().filter(|e| e.is_pause).count() as f64 / total;

    let avg_interval = intervals.iter().mean();
    let speed_score = (100.0 - avg_interval / 10.0).clamp(0.0, 100.0);
    let burst_score = (burst_ratio * 300.0).clamp(0.0, 100.0);
    let pause_penalty = pause_ratio * 50.0;

    let mut energy = speed_score * 0.4 + burst_score * 0.4 - pause_penalty;

    if let Some(wpm) = wpm {
        if wpm > 0.0 {
            energy *= (wpm / 40.0).min(1.5);
        }
    }

    energy.clamp(0.0, 100.0) as u8
}

/// Detect the current mood from an event sequence.
///
/// Requires at least 10 events, 5 of them with a defined interval;
/// anything sparser returns Neutral with zero confidence and no
/// indicators. When `wpm` is not supplied it is estimated from the event
/// count and time span.
pub fn detect_mood(events: &[TimingEvent], wpm: Option<f64>) -> MoodSnapshot {
    if events.len() < MIN_EVENTS_FOR_MOOD {
        return MoodSnapshot::insufficient();
    }
    let intervals = defined_intervals(events);
    if intervals.len() < MIN_TIMED_INTERVALS {
        return MoodSnapshot::insufficient();
    }

    let mean = intervals.iter().mean();
    let std_dev = intervals.iter().population_std_dev();
    let cv = if mean > 0.0 { std_dev / mean } else { 0.0 };

    let total = events.len() as f64;
    let metrics = RhythmMetrics {
        avg_interval_ms: mean,
        cv,
        burst_ratio: events.iter().filter(|e| e.is_burst).count() as f64 / total,
        pause_ratio: events.iter().filter(|e| e.is_pause).count() as f64 / total,
        wpm: wpm.unwrap_or_else(|| estimate_wpm(events)),
    };

    let (mood, confidence) = classify(&metrics);

    MoodSnapshot {
        mood,
        confidence: confidence.min(1.0),
        indicators: Some(MoodIndicators::from_metrics(&metrics)),
    }
}

/// Analyze a full session: duration, wpm, mood, and energy in one pass.
///
/// Empty input yields Neutral / energy 50 / wpm 0 deterministically.
pub fn analyze_session(events: &[TimingEvent]) -> SessionAnalysis {
    if events.is_empty() {
        return SessionAnalysis {
            mood: Mood::Neutral,
            mood_confidence: 0.0,
            energy_score: NEUTRAL_ENERGY,
            wpm: 0.0,
            total_keypresses: 0,
            duration_secs: 0.0,
            indicators: None,
        };
    }

    let duration_secs = if events.len() >= 2 {
        span_ms(events) / 1000.0
    } else {
        0.0
    };
    let duration_minutes = duration_secs / 60.0;
    let wpm = (events.len() as f64 / 5.0) / duration_minutes.max(0.01);

    let snapshot = detect_mood(events, Some(wpm));
    let energy_score = calculate_energy_score(events, Some(wpm));

    SessionAnalysis {
        mood: snapshot.mood,
        mood_confidence: snapshot.confidence,
        energy_score,
        wpm: round_to(wpm, 1),
        total_keypresses: events.len(),
        duration_secs: round_to(duration_secs, 1),
        indicators: snapshot.indicators,
    }
}

fn classify(metrics: &RhythmMetrics) -> (Mood, f64) {
    for rule in &MOOD_RULES {
        if (rule.applies)(metrics) {
            return (rule.mood, (rule.confidence)(metrics));
        }
    }
    (Mood::Neutral, 0.5)
}

fn defined_intervals(events: &[TimingEvent]) -> Vec<f64> {
    events.iter().filter_map(|e| e.interval_ms).collect()
}

/// Milliseconds between the first and last event.
fn span_ms(events: &[TimingEvent]) -> f64 {
    match (events.first(), events.last()) {
        (Some(first), Some(last)) => (last.timestamp - first.timestamp).num_milliseconds() as f64,
        _ => 0.0,
    }
}

fn estimate_wpm(events: &[TimingEvent]) -> f64 {
    let span_minutes = span_ms(events) / 1000.0 / 60.0;
    if span_minutes > 0.0 {
        (events.len() as f64 / 5.0) / span_minutes.max(0.01)
    } else {
        0.0
    }
}

fn round_to(value: f64, decimals: u32) -> f64 {
    let factor = 10f64.powi(decimals as i32);
    (value * factor).round() / factor
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};
    use pretty_assertions::assert_eq;

    /// Build a session: one event at the base instant, then one per gap.
    fn session_from_gaps(gaps_ms: &[i64]) -> Vec<TimingEvent> {
        let base = Utc::now();
        let mut events = vec![TimingEvent::classify(base, None, None)];
        let mut current = base;
        for &gap in gaps_ms {
            let next = current + Duration::milliseconds(gap);
            events.push(TimingEvent::classify(next, Some(current), None));
            current = next;
        }
        events
    }

    #[test]
    fn test_energy_empty_input_is_neutral() {
        assert_eq!(calculate_energy_score(&[], None), NEUTRAL_ENERGY);
    }

    #[test]
    fn test_energy_without_intervals_is_neutral() {
        let events = vec![TimingEvent::classify(Utc::now(), None, None)];
        assert_eq!(calculate_energy_score(&events, None), NEUTRAL_ENERGY);
    }

    #[test]
    fn test_energy_stays_in_range() {
        let sequences = [
            session_from_gaps(&[20; 29]),   // frantic
            session_from_gaps(&[100; 49]),  // steady
            session_from_gaps(&[2500; 19]), // mostly paused
        ];
        for events in &sequences {
            let score = calculate_energy_score(events, Some(120.0));
            assert!(score <= 100);
        }
    }

    #[test]
    fn test_energy_wpm_boost_saturates_at_clamp() {
        // Fast bursty typing already scores high; the 1.5x boost pushes the
        // raw value past 100 and the final clamp holds it there.
        let events = session_from_gaps(&[20; 29]);
        assert_eq!(calculate_energy_score(&events, Some(200.0)), 100);
    }

    #[test]
    fn test_energy_zero_wpm_means_no_boost() {
        let events = session_from_gaps(&[100; 49]);
        let unboosted = calculate_energy_score(&events, None);
        let zero = calculate_energy_score(&events, Some(0.0));
        assert_eq!(unboosted, zero);
    }

    #[test]
    fn test_mood_under_ten_events_is_insufficient() {
        let events = session_from_gaps(&[100; 8]); // 9 events
        let snapshot = detect_mood(&events, None);
        assert_eq!(snapshot.mood, Mood::Neutral);
        assert_eq!(snapshot.confidence, 0.0);
        assert!(snapshot.indicators.is_none());
    }

    #[test]
    fn test_mood_under_five_intervals_is_insufficient() {
        // 12 events but only 3 carry an interval
        let base = Utc::now();
        let mut events: Vec<TimingEvent> = (0..9)
            .map(|i| TimingEvent::classify(base + Duration::seconds(i), None, None))
            .collect();
        let mut current = base + Duration::seconds(9);
        for _ in 0..3 {
            let next = current + Duration::milliseconds(100);
            events.push(TimingEvent::classify(next, Some(current), None));
            current = next;
        }

        let snapshot = detect_mood(&events, None);
        assert_eq!(snapshot.mood, Mood::Neutral);
        assert_eq!(snapshot.confidence, 0.0);
        assert!(snapshot.indicators.is_none());
    }

    #[test]
    fn test_constant_rhythm_reads_focused() {
        // 50 events at a constant 100ms: cv ~ 0, wpm far above the floor.
        let events = session_from_gaps(&[100; 49]);
        let analysis = analyze_session(&events);

        assert_eq!(analysis.mood, Mood::Focused);
        assert_eq!(analysis.mood_confidence, 1.0);
        assert_eq!(analysis.energy_score, 54);
        assert!(analysis.wpm > FOCUSED_WPM);

        let indicators = analysis.indicators.expect("indicators");
        assert_eq!(indicators.avg_interval_ms, 100.0);
        assert_eq!(indicators.rhythm_consistency, 1.0);
    }

    #[test]
    fn test_bursty_irregular_rhythm_reads_stressed() {
        // Alternating 30ms bursts and 600ms gaps: high burst share, high cv.
        let mut gaps = Vec::new();
        for _ in 0..15 {
            gaps.push(30);
            gaps.push(600);
        }
        let events = session_from_gaps(&gaps);

        let snapshot = detect_mood(&events, None);
        assert_eq!(snapshot.mood, Mood::Stressed);
        assert!(snapshot.confidence > 0.6);
    }

    #[test]
    fn test_slow_smooth_rhythm_reads_relaxed() {
        // Constant 500ms: unhurried, no pauses.
        let events = session_from_gaps(&[500; 19]);
        let snapshot = detect_mood(&events, None);
        assert_eq!(snapshot.mood, Mood::Relaxed);
        assert!(snapshot.confidence > 0.6);
    }

    #[test]
    fn test_pause_heavy_session_reads_fatigued_with_full_confidence() {
        // 20 events, 15 of them pauses: pause_ratio 0.75 drives the
        // confidence formula past its cap.
        let mut gaps = vec![2500i64; 15];
        gaps.extend_from_slice(&[100; 4]);
        let events = session_from_gaps(&gaps);
        assert_eq!(events.len(), 20);

        let snapshot = detect_mood(&events, None);
        assert_eq!(snapshot.mood, Mood::Fatigued);
        assert_eq!(snapshot.confidence, 1.0);

        let indicators = snapshot.indicators.expect("indicators");
        assert_eq!(indicators.pause_ratio, 0.75);
    }

    #[test]
    fn test_no_rule_match_falls_back_to_neutral() {
        // Moderate cv, brisk wpm, no bursts or pauses: nothing fires.
        let mut gaps = Vec::new();
        for i in 0..19 {
            gaps.push(if i % 2 == 0 { 100 } else { 220 });
        }
        let events = session_from_gaps(&gaps);

        let snapshot = detect_mood(&events, None);
        assert_eq!(snapshot.mood, Mood::Neutral);
        assert_eq!(snapshot.confidence, 0.5);
        assert!(snapshot.indicators.is_some());
    }

    #[test]
    fn test_rule_order_breaks_ties() {
        // A steady fast rhythm with a supplied wpm below the relaxed
        // ceiling satisfies rule 3 but not rule 1.
        let events = session_from_gaps(&[100; 49]);
        let snapshot = detect_mood(&events, Some(20.0));
        assert_eq!(snapshot.mood, Mood::Relaxed);
    }

    #[test]
    fn test_analyze_empty_session_is_deterministic() {
        let analysis = analyze_session(&[]);
        assert_eq!(analysis.mood, Mood::Neutral);
        assert_eq!(analysis.energy_score, NEUTRAL_ENERGY);
        assert_eq!(analysis.wpm, 0.0);
        assert_eq!(analysis.total_keypresses, 0);
        assert_eq!(analysis.duration_secs, 0.0);
        assert!(analysis.indicators.is_none());
    }

    #[test]
    fn test_analyze_single_event_has_zero_duration() {
        let events = vec![TimingEvent::classify(Utc::now(), None, None)];
        let analysis = analyze_session(&events);
        assert_eq!(analysis.duration_secs, 0.0);
        assert_eq!(analysis.total_keypresses, 1);
        // One keypress over the floored minimum duration
        assert_eq!(analysis.wpm, 20.0);
    }

    #[test]
    fn test_mood_serializes_to_plain_names() {
        assert_eq!(serde_json::to_string(&Mood::Focused).unwrap(), "\"Focused\"");
        assert_eq!(Mood::Fatigued.to_string(), "Fatigued");
    }
}

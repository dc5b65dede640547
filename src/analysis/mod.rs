//! Typing-pattern analysis.
//!
//! This module contains:
//! - Mood detection and energy scoring for a finite event sequence
//! - The sliding-window mood timeline
//! - Weekly rhythm summaries from pre-aggregated hourly counts

pub mod mood;
pub mod rhythm;
pub mod timeline;

// Re-export commonly used types
pub use mood::{
    analyze_session, calculate_energy_score, detect_mood, Mood, MoodIndicators, MoodSnapshot,
    SessionAnalysis, NEUTRAL_ENERGY,
};
pub use rhythm::{weekly_rhythm, HourlyActivity, WeeklyRhythm};
pub use timeline::{calculate_mood_timeline, TimelinePoint, DEFAULT_WINDOW_SIZE};

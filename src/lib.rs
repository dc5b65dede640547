//! MoodRhythm - mood and energy inference from keystroke timing.
//!
//! This library infers a user's behavioral state (mood, energy) from the
//! *timing* of keyboard events, deliberately never inspecting what is typed.
//!
//! # Privacy Guarantees
//!
//! - **No key content**: which keys are pressed is never captured, only when
//! - **No text reconstruction**: nothing stored can reproduce typed content
//! - **No diagnosis**: mood labels are behavioral heuristics, not clinical
//!   statements
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                          MoodRhythm                          │
//! ├──────────────────────────────────────────────────────────────┤
//! │  ┌─────────────┐    ┌──────────────┐    ┌────────────────┐  │
//! │  │  Keypress   │───▶│   Typing     │───▶│    Pattern     │  │
//! │  │   Source    │    │   Recorder   │    │    Analysis    │  │
//! │  └─────────────┘    └──────────────┘    └────────────────┘  │
//! │                            │                     │           │
//! │                            ▼                     ▼           │
//! │                     ┌─────────────┐      ┌──────────────┐   │
//! │                     │Transparency │      │ Mood/Energy/ │   │
//! │                     │    Log      │      │   Timeline   │   │
//! │                     └─────────────┘      └──────────────┘   │
//! └──────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Example
//!
//! ```no_run
//! use moodrhythm::analysis::analyze_session;
//! use moodrhythm::capture::{ManualSource, TypingRecorder};
//!
//! let source = ManualSource::new();
//! let keys = source.handle();
//! let mut recorder = TypingRecorder::new(source);
//!
//! let session_id = recorder.start().expect("source available");
//! keys.press();
//!
//! // ... later ...
//! if let Some(summary) = recorder.stop() {
//!     let analysis = analyze_session(&summary.events);
//!     println!("{} (energy {})", analysis.mood, analysis.energy_score);
//! }
//! # let _ = session_id;
//! ```

pub mod analysis;
pub mod capture;
pub mod config;
pub mod export;
pub mod transparency;

// Re-export key types at crate root for convenience
pub use analysis::{
    analyze_session, calculate_energy_score, calculate_mood_timeline, detect_mood, weekly_rhythm,
    HourlyActivity, Mood, MoodIndicators, MoodSnapshot, SessionAnalysis, TimelinePoint,
    WeeklyRhythm, DEFAULT_WINDOW_SIZE,
};
pub use capture::{
    CaptureError, CaptureStats, KeypressHandle, KeypressSource, ManualSource, RawKeypress,
    SessionSummary, StdinSource, TimingEvent, TypingRecorder,
};
pub use config::Config;
pub use transparency::{SharedTransparencyLog, TransparencyLog, TransparencyStats};

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Privacy declaration that can be displayed to users.
pub const PRIVACY_DECLARATION: &str = r#"
╔══════════════════════════════════════════════════════════════════╗
║               MOODRHYTHM - PRIVACY DECLARATION                   ║
╠══════════════════════════════════════════════════════════════════╣
║                                                                  ║
║  This tool analyzes typing rhythm to estimate mood and energy.   ║
║                                                                  ║
║  ✓ WHAT WE CAPTURE:                                              ║
║    • When keys are pressed (timing only)                         ║
║    • Gaps between keystrokes (pauses and bursts)                 ║
║                                                                  ║
║  ✗ WHAT WE NEVER CAPTURE:                                        ║
║    • Which keys you press (no passwords, messages, etc.)         ║
║    • Any typed text or key identity                              ║
║    • What applications you use                                   ║
║                                                                  ║
║  All analysis happens locally. Mood labels are behavioral        ║
║  estimates, not medical or psychological diagnoses.              ║
║                                                                  ║
║  You can view collection statistics anytime with:                ║
║    moodrhythm status                                             ║
║                                                                  ║
╚══════════════════════════════════════════════════════════════════╝
"#;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_privacy_declaration_contents() {
        assert!(PRIVACY_DECLARATION.contains("PRIVACY"));
        assert!(PRIVACY_DECLARATION.contains("NEVER CAPTURE"));
        assert!(PRIVACY_DECLARATION.contains("keys you press"));
    }
}

//! The persistence boundary.
//!
//! Finished sessions leave the crate as JSON files; historical analysis
//! input (event sequences, hourly buckets) arrives the same way, produced
//! by whatever store the deployment uses. The crate itself never owns a
//! database.

use crate::analysis::rhythm::HourlyActivity;
use crate::capture::types::{SessionSummary, TimingEvent};
use std::io;
use std::path::{Path, PathBuf};

/// Write a session summary to `dir` as a timestamped JSON file.
pub fn write_session_summary(dir: &Path, summary: &SessionSummary) -> io::Result<PathBuf> {
    std::fs::create_dir_all(dir)?;

    let path = dir.join(format!(
        "session_{}.json",
        summary.ended_at.format("%Y%m%d_%H%M%S")
    ));

    let json = serde_json::to_string_pretty(summary).map_err(io::Error::other)?;
    std::fs::write(&path, json)?;

    Ok(path)
}

/// Load an ordered event sequence for historical analysis.
///
/// An event without a `timestamp` fails the whole load with the
/// deserialization error; all other fields default safely.
pub fn read_events(path: &Path) -> io::Result<Vec<TimingEvent>> {
    let content = std::fs::read_to_string(path)?;
    serde_json::from_str(&content).map_err(io::Error::other)
}

/// Load pre-aggregated hourly activity buckets for weekly-rhythm analysis.
pub fn read_hourly_stats(path: &Path) -> io::Result<Vec<HourlyActivity>> {
    let content = std::fs::read_to_string(path)?;
    serde_json::from_str(&content).map_err(io::Error::other)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use uuid::Uuid;

    fn scratch_dir(tag: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("moodrhythm-{}-{}", tag, std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[test]
    fn test_session_summary_roundtrip() {
        let dir = scratch_dir("summary");
        let now = Utc::now();
        let summary = SessionSummary {
            session_id: Uuid::new_v4(),
            started_at: now,
            ended_at: now,
            duration_secs: 0.0,
            total_keypresses: 0,
            events: Vec::new(),
        };

        let path = write_session_summary(&dir, &summary).unwrap();
        let content = std::fs::read_to_string(&path).unwrap();
        let parsed: SessionSummary = serde_json::from_str(&content).unwrap();
        assert_eq!(parsed.session_id, summary.session_id);

        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_read_events_accepts_minimal_records() {
        let dir = scratch_dir("events");
        let path = dir.join("events.json");
        std::fs::write(
            &path,
            r#"[{"timestamp":"2026-01-05T10:00:00Z"},
                {"timestamp":"2026-01-05T10:00:01Z","interval_ms":1000.0}]"#,
        )
        .unwrap();

        let events = read_events(&path).unwrap();
        assert_eq!(events.len(), 2);
        assert!(events[0].interval_ms.is_none());
        assert_eq!(events[1].interval_ms, Some(1000.0));

        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_read_events_rejects_missing_timestamp() {
        let dir = scratch_dir("badevents");
        let path = dir.join("events.json");
        std::fs::write(&path, r#"[{"interval_ms":100.0}]"#).unwrap();

        assert!(read_events(&path).is_err());

        std::fs::remove_dir_all(&dir).ok();
    }
}

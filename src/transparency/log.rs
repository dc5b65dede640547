//! Privacy-preserving transparency log.
//!
//! Tracks cumulative counts of what the recorder has processed so users can
//! audit collection at any time. Counts only - no timestamps of individual
//! keypresses, and never key content.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Cumulative collection counters.
#[derive(Debug)]
pub struct TransparencyLog {
    /// Keypresses recorded (timing only)
    keypresses: AtomicU64,
    /// Keypresses classified as pauses
    pauses: AtomicU64,
    /// Keypresses classified as bursts
    bursts: AtomicU64,
    /// Completed start/stop capture cycles
    sessions_recorded: AtomicU64,
    /// Analyses run over captured or historical events
    analyses_run: AtomicU64,
    /// When this process started counting
    started: DateTime<Utc>,
    /// Path for persisting counters across runs
    persist_path: Option<PathBuf>,
}

impl TransparencyLog {
    pub fn new() -> Self {
        Self {
            keypresses: AtomicU64::new(0),
            pauses: AtomicU64::new(0),
            bursts: AtomicU64::new(0),
            sessions_recorded: AtomicU64::new(0),
            analyses_run: AtomicU64::new(0),
            started: Utc::now(),
            persist_path: None,
        }
    }

    /// Create a transparency log that persists counters at `path`.
    pub fn with_persistence(path: PathBuf) -> Self {
        let mut log = Self::new();
        log.persist_path = Some(path);

        if let Err(e) = log.load() {
            tracing::debug!("no previous transparency stats loaded: {e}");
        }

        log
    }

    /// Record one captured keypress with its classification.
    pub fn record_keypress(&self, is_pause: bool, is_burst: bool) {
        self.keypresses.fetch_add(1, Ordering::Relaxed);
        if is_pause {
            self.pauses.fetch_add(1, Ordering::Relaxed);
        }
        if is_burst {
            self.bursts.fetch_add(1, Ordering::Relaxed);
        }
    }

    /// Record a completed capture session.
    pub fn record_session(&self) {
        self.sessions_recorded.fetch_add(1, Ordering::Relaxed);
    }

    /// Record an analysis pass.
    pub fn record_analysis(&self) {
        self.analyses_run.fetch_add(1, Ordering::Relaxed);
    }

    /// Get the current statistics.
    pub fn stats(&self) -> TransparencyStats {
        TransparencyStats {
            keypresses: self.keypresses.load(Ordering::Relaxed),
            pauses: self.pauses.load(Ordering::Relaxed),
            bursts: self.bursts.load(Ordering::Relaxed),
            sessions_recorded: self.sessions_recorded.load(Ordering::Relaxed),
            analyses_run: self.analyses_run.load(Ordering::Relaxed),
            started: self.started,
        }
    }

    /// Get a summary string for display.
    pub fn summary(&self) -> String {
        let stats = self.stats();
        format!(
            "Collection Statistics:\n\
             - Keypresses recorded: {}\n\
             - Pauses observed: {}\n\
             - Bursts observed: {}\n\
             - Sessions recorded: {}\n\
             - Analyses run: {}\n\
             \n\
             Privacy Guarantee:\n\
             - No key identity captured\n\
             - No typed content stored\n\
             - Only keystroke timing retained",
            stats.keypresses,
            stats.pauses,
            stats.bursts,
            stats.sessions_recorded,
            stats.analyses_run
        )
    }

    /// Save counters to disk.
    pub fn save(&self) -> Result<(), std::io::Error> {
        if let Some(ref path) = self.persist_path {
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent)?;
            }

            let stats = self.stats();
            let persisted = PersistedStats {
                keypresses: stats.keypresses,
                pauses: stats.pauses,
                bursts: stats.bursts,
                sessions_recorded: stats.sessions_recorded,
                analyses_run: stats.analyses_run,
                last_updated: Utc::now(),
            };

            let json = serde_json::to_string_pretty(&persisted).map_err(std::io::Error::other)?;
            std::fs::write(path, json)?;
        }
        Ok(())
    }

    /// Load counters from disk.
    fn load(&mut self) -> Result<(), std::io::Error> {
        if let Some(ref path) = self.persist_path {
            if path.exists() {
                let content = std::fs::read_to_string(path)?;
                let persisted: PersistedStats =
                    serde_json::from_str(&content).map_err(std::io::Error::other)?;

                self.keypresses.store(persisted.keypresses, Ordering::Relaxed);
                self.pauses.store(persisted.pauses, Ordering::Relaxed);
                self.bursts.store(persisted.bursts, Ordering::Relaxed);
                self.sessions_recorded
                    .store(persisted.sessions_recorded, Ordering::Relaxed);
                self.analyses_run
                    .store(persisted.analyses_run, Ordering::Relaxed);
            }
        }
        Ok(())
    }

    /// Reset all counters.
    pub fn reset(&self) {
        self.keypresses.store(0, Ordering::Relaxed);
        self.pauses.store(0, Ordering::Relaxed);
        self.bursts.store(0, Ordering::Relaxed);
        self.sessions_recorded.store(0, Ordering::Relaxed);
        self.analyses_run.store(0, Ordering::Relaxed);
    }
}

impl Default for TransparencyLog {
    fn default() -> Self {
        Self::new()
    }
}

/// Snapshot of transparency statistics.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransparencyStats {
    pub keypresses: u64,
    pub pauses: u64,
    pub bursts: u64,
    pub sessions_recorded: u64,
    pub analyses_run: u64,
    pub started: DateTime<Utc>,
}

/// Stats format for persistence.
#[derive(Debug, Serialize, Deserialize)]
struct PersistedStats {
    keypresses: u64,
    pauses: u64,
    bursts: u64,
    sessions_recorded: u64,
    analyses_run: u64,
    last_updated: DateTime<Utc>,
}

/// Thread-safe shared transparency log.
pub type SharedTransparencyLog = Arc<TransparencyLog>;

/// Create a new shared transparency log.
pub fn create_shared_log() -> SharedTransparencyLog {
    Arc::new(TransparencyLog::new())
}

/// Create a new shared transparency log with persistence.
pub fn create_shared_log_with_persistence(path: PathBuf) -> SharedTransparencyLog {
    Arc::new(TransparencyLog::with_persistence(path))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keypress_counting_with_classification() {
        let log = TransparencyLog::new();

        log.record_keypress(false, false);
        log.record_keypress(true, false);
        log.record_keypress(false, true);

        let stats = log.stats();
        assert_eq!(stats.keypresses, 3);
        assert_eq!(stats.pauses, 1);
        assert_eq!(stats.bursts, 1);
    }

    #[test]
    fn test_session_and_analysis_counters() {
        let log = TransparencyLog::new();
        log.record_session();
        log.record_analysis();
        log.record_analysis();

        let stats = log.stats();
        assert_eq!(stats.sessions_recorded, 1);
        assert_eq!(stats.analyses_run, 2);
    }

    #[test]
    fn test_reset_clears_counters() {
        let log = TransparencyLog::new();
        log.record_keypress(true, false);
        log.record_session();
        log.reset();

        let stats = log.stats();
        assert_eq!(stats.keypresses, 0);
        assert_eq!(stats.sessions_recorded, 0);
    }

    #[test]
    fn test_summary_format() {
        let log = TransparencyLog::new();
        let summary = log.summary();

        assert!(summary.contains("Keypresses recorded"));
        assert!(summary.contains("Privacy Guarantee"));
        assert!(summary.contains("No key identity captured"));
    }
}

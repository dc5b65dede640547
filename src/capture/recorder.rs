//! The typing recorder: turns raw key-press notifications into classified
//! timing events with minimal latency.
//!
//! A background listener thread drains the keypress source; foreground
//! threads call `start`/`stop`/`current_stats`/`events`. All session state
//! lives behind a single mutex, so counter, buffer, and last-keypress time
//! always change together and no caller can observe a partial update.

use crate::capture::source::{CaptureError, KeypressSource};
use crate::capture::types::{CaptureStats, SessionSummary, TimingEvent};
use chrono::{DateTime, Utc};
use crossbeam_channel::{bounded, Receiver, RecvTimeoutError, Sender};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use std::thread::{self, JoinHandle};
use std::time::Duration;
use uuid::Uuid;

/// Capacity of the live-update channel. Slow consumers lose updates rather
/// than stalling capture.
const LIVE_CHANNEL_CAPACITY: usize = 1024;

/// Mutable state of one capture session. Guarded as a unit.
struct SessionState {
    session_id: Uuid,
    started_at: DateTime<Utc>,
    last_keypress: Option<DateTime<Utc>>,
    keypress_count: u64,
    events: Vec<TimingEvent>,
}

impl SessionState {
    fn new(session_id: Uuid) -> Self {
        Self {
            session_id,
            started_at: Utc::now(),
            last_keypress: None,
            keypress_count: 0,
            events: Vec::new(),
        }
    }
}

/// Captures keystroke timing patterns without recording which keys were
/// pressed.
///
/// `Stopped -> start -> Running -> stop -> Stopped`. Starting while running
/// returns the existing session id and leaves in-flight state untouched;
/// stopping while stopped returns `None`.
pub struct TypingRecorder<S: KeypressSource> {
    source: S,
    state: Arc<Mutex<Option<SessionState>>>,
    running: Arc<AtomicBool>,
    updates_tx: Sender<TimingEvent>,
    updates_rx: Receiver<TimingEvent>,
    listener: Option<JoinHandle<()>>,
}

impl<S: KeypressSource> TypingRecorder<S> {
    pub fn new(source: S) -> Self {
        let (updates_tx, updates_rx) = bounded(LIVE_CHANNEL_CAPACITY);
        Self {
            source,
            state: Arc::new(Mutex::new(None)),
            running: Arc::new(AtomicBool::new(false)),
            updates_tx,
            updates_rx,
            listener: None,
        }
    }

    /// Begin capturing keypresses in a background listener thread.
    ///
    /// Returns the session id. Calling `start` on a running recorder is a
    /// no-op that returns the current session id - no second listener is
    /// spawned and the event buffer is not reset. If the keypress source
    /// refuses access, the recorder stays stopped and the error surfaces to
    /// the caller, who may retry after remediation.
    pub fn start(&mut self) -> Result<Uuid, CaptureError> {
        if self.running.load(Ordering::SeqCst) {
            if let Some(session) = lock_state(&self.state).as_ref() {
                return Ok(session.session_id);
            }
        }

        let receiver = self.source.open()?;

        let session_id = Uuid::new_v4();
        *lock_state(&self.state) = Some(SessionState::new(session_id));
        self.running.store(true, Ordering::SeqCst);

        let state = Arc::clone(&self.state);
        let running = Arc::clone(&self.running);
        let updates = self.updates_tx.clone();

        let listener = thread::Builder::new()
            .name("moodrhythm-capture".to_string())
            .spawn(move || {
                while running.load(Ordering::SeqCst) {
                    match receiver.recv_timeout(Duration::from_millis(100)) {
                        Ok(raw) => record_keypress(&state, &updates, raw.timestamp),
                        Err(RecvTimeoutError::Timeout) => continue,
                        Err(RecvTimeoutError::Disconnected) => break,
                    }
                }
            });

        match listener {
            Ok(handle) => {
                self.listener = Some(handle);
                Ok(session_id)
            }
            Err(e) => {
                self.running.store(false, Ordering::SeqCst);
                *lock_state(&self.state) = None;
                self.source.close();
                Err(CaptureError::SourceUnavailable(e.to_string()))
            }
        }
    }

    /// Stop capturing and return an immutable summary of the session.
    ///
    /// Returns `None` when the recorder is already stopped. The listener is
    /// joined before the state is taken, so the returned event list can
    /// never be a torn view of an in-flight keypress.
    pub fn stop(&mut self) -> Option<SessionSummary> {
        if !self.running.swap(false, Ordering::SeqCst) {
            return None;
        }

        if let Some(listener) = self.listener.take() {
            let _ = listener.join();
        }
        self.source.close();

        let session = lock_state(&self.state).take()?;
        let ended_at = Utc::now();

        Some(SessionSummary {
            session_id: session.session_id,
            started_at: session.started_at,
            ended_at,
            duration_secs: (ended_at - session.started_at).num_milliseconds() as f64 / 1000.0,
            total_keypresses: session.keypress_count,
            events: session.events,
        })
    }

    /// Record one raw keypress notification.
    ///
    /// Normally invoked by the listener thread, but safe to call from any
    /// thread. Keypresses arriving while stopped are dropped.
    pub fn on_raw_keypress(&self, instant: DateTime<Utc>) {
        record_keypress(&self.state, &self.updates_tx, instant);
    }

    /// Snapshot of the running session's statistics.
    ///
    /// Elapsed time is measured to the last recorded keypress, so repeated
    /// calls without intervening keypresses return identical results.
    pub fn current_stats(&self) -> CaptureStats {
        let guard = lock_state(&self.state);
        let Some(session) = guard.as_ref() else {
            return CaptureStats::default();
        };
        let Some(last) = session.last_keypress else {
            return CaptureStats::default();
        };
        if session.events.is_empty() {
            return CaptureStats::default();
        }

        let elapsed_secs = (last - session.started_at).num_milliseconds() as f64 / 1000.0;
        let elapsed_minutes = elapsed_secs / 60.0;
        let wpm = (session.keypress_count as f64 / 5.0) / elapsed_minutes.max(0.01);

        let intervals: Vec<f64> = session.events.iter().filter_map(|e| e.interval_ms).collect();
        let avg_interval_ms = if intervals.is_empty() {
            0.0
        } else {
            intervals.iter().sum::<f64>() / intervals.len() as f64
        };

        CaptureStats {
            wpm: round1(wpm),
            avg_interval_ms: round1(avg_interval_ms),
            pause_count: session.events.iter().filter(|e| e.is_pause).count() as u64,
            burst_count: session.events.iter().filter(|e| e.is_burst).count() as u64,
            keypress_count: session.keypress_count,
            elapsed_secs: round1(elapsed_secs),
        }
    }

    /// Defensive copy of the current session's event buffer.
    pub fn events(&self) -> Vec<TimingEvent> {
        lock_state(&self.state)
            .as_ref()
            .map(|session| session.events.clone())
            .unwrap_or_default()
    }

    /// The single-consumer channel of finished events, pushed in real time.
    ///
    /// Drain it from the display/telemetry side; no lock is shared with the
    /// capture thread beyond the per-event critical section.
    pub fn updates(&self) -> &Receiver<TimingEvent> {
        &self.updates_rx
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }
}

impl<S: KeypressSource> Drop for TypingRecorder<S> {
    fn drop(&mut self) {
        let _ = self.stop();
    }
}

/// Classify and record one keypress under the session mutex.
///
/// Everything - interval computation, counter, buffer append, last-keypress
/// update, and the live-channel push - happens in one critical section per
/// event, so observers never see a partially applied keypress.
fn record_keypress(
    state: &Mutex<Option<SessionState>>,
    updates: &Sender<TimingEvent>,
    instant: DateTime<Utc>,
) {
    let mut guard = lock_state(state);
    let Some(session) = guard.as_mut() else {
        // Stopped: late keypresses are dropped, never half-recorded.
        return;
    };

    let event = TimingEvent::classify(instant, session.last_keypress, Some(session.session_id));
    session.last_keypress = Some(instant);
    session.keypress_count += 1;
    session.events.push(event.clone());

    // try_send never blocks the capture path; a full or abandoned channel
    // costs the consumer an update, not the session an event.
    if let Err(err) = updates.try_send(event) {
        tracing::trace!("live update dropped: {err}");
    }
}

/// The capture path must never panic; if a peer panicked while holding the
/// lock, the state it left is still field-consistent, so keep going.
fn lock_state(state: &Mutex<Option<SessionState>>) -> MutexGuard<'_, Option<SessionState>> {
    match state.lock() {
        Ok(guard) => guard,
        Err(poisoned) => poisoned.into_inner(),
    }
}

fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

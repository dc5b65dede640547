//! Keypress sources: the boundary to the host input layer.
//!
//! A source delivers [`RawKeypress`] notifications over a bounded channel.
//! Host-specific capture facilities (event taps, input hooks) live behind
//! this trait, outside the crate; the shipped implementations are portable.

use crate::capture::types::RawKeypress;
use chrono::{DateTime, Utc};
use crossbeam_channel::{bounded, Receiver, Sender};
use std::io::Read;
use std::thread;
use thiserror::Error;

/// Channel capacity between a source and the recorder's listener thread.
const SOURCE_CHANNEL_CAPACITY: usize = 10_000;

/// Errors raised while attaching to a keypress source.
#[derive(Debug, Error)]
pub enum CaptureError {
    /// The host cannot grant access to key events. The recorder stays
    /// stopped; the caller may retry after remediation.
    #[error("keypress source unavailable: {0}")]
    SourceUnavailable(String),
}

/// A facility that can deliver raw key-press notifications.
pub trait KeypressSource: Send {
    /// Attach to the facility and begin delivering keypresses.
    ///
    /// Returns the receiving end of the source's channel, or
    /// [`CaptureError::SourceUnavailable`] if the host refuses access.
    fn open(&mut self) -> Result<Receiver<RawKeypress>, CaptureError>;

    /// Release the facility. Keypresses already in the channel may still be
    /// drained by the listener.
    fn close(&mut self);
}

/// A channel-backed source fed explicitly through a [`KeypressHandle`].
///
/// Used by the simulation CLI and by tests; any process that already observes
/// key-down instants can forward them through the handle.
pub struct ManualSource {
    sender: Sender<RawKeypress>,
    receiver: Receiver<RawKeypress>,
}

impl ManualSource {
    pub fn new() -> Self {
        let (sender, receiver) = bounded(SOURCE_CHANNEL_CAPACITY);
        Self { sender, receiver }
    }

    /// A cloneable handle for feeding keypresses into this source.
    pub fn handle(&self) -> KeypressHandle {
        KeypressHandle {
            sender: self.sender.clone(),
        }
    }
}

impl Default for ManualSource {
    fn default() -> Self {
        Self::new()
    }
}

impl KeypressSource for ManualSource {
    fn open(&mut self) -> Result<Receiver<RawKeypress>, CaptureError> {
        // Presses queued while no session was running belong to no session
        while self.receiver.try_recv().is_ok() {}
        Ok(self.receiver.clone())
    }

    fn close(&mut self) {}
}

/// Feeding end of a [`ManualSource`].
#[derive(Clone)]
pub struct KeypressHandle {
    sender: Sender<RawKeypress>,
}

impl KeypressHandle {
    /// Register a keypress stamped with the current time.
    pub fn press(&self) {
        let _ = self.sender.try_send(RawKeypress::now());
    }

    /// Register a keypress at an explicit instant.
    pub fn press_at(&self, timestamp: DateTime<Utc>) {
        let _ = self.sender.try_send(RawKeypress::at(timestamp));
    }
}

/// A source that treats every byte read from stdin as one keypress.
///
/// This is the portable host facility for the CLI: pipe input in, or type
/// with the terminal's usual line buffering. Only arrival times are kept;
/// the byte values are discarded immediately.
pub struct StdinSource {
    reader: Option<thread::JoinHandle<()>>,
}

impl StdinSource {
    pub fn new() -> Self {
        Self { reader: None }
    }
}

impl Default for StdinSource {
    fn default() -> Self {
        Self::new()
    }
}

impl KeypressSource for StdinSource {
    fn open(&mut self) -> Result<Receiver<RawKeypress>, CaptureError> {
        let (sender, receiver) = bounded(SOURCE_CHANNEL_CAPACITY);

        let handle = thread::Builder::new()
            .name("moodrhythm-stdin".to_string())
            .spawn(move || {
                let stdin = std::io::stdin();
                for byte in stdin.lock().bytes() {
                    match byte {
                        // Carriage returns would double-count line endings
                        Ok(b'\r') => continue,
                        Ok(_) => {
                            if sender.send(RawKeypress::now()).is_err() {
                                break;
                            }
                        }
                        Err(_) => break,
                    }
                }
            })
            .map_err(|e| CaptureError::SourceUnavailable(e.to_string()))?;

        self.reader = Some(handle);
        Ok(receiver)
    }

    fn close(&mut self) {
        // A blocking stdin read cannot be interrupted; the reader exits on
        // EOF or on its next byte once the recorder drops the channel.
        if let Some(handle) = self.reader.take() {
            drop(handle);
        }
    }
}

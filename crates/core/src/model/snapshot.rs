use std::sync::Arc;

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use chrono::{DateTime, Utc};
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum SnapshotError {
    #[error("snapshot payload is empty")]
    EmptyPayload,
}

/// How a snapshot came to be.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SnapshotOrigin {
    /// First frame of a freshly loaded local video.
    Default,
    /// Viewport captured when playback paused.
    Pause,
}

/// Opaque encoded image of one rendered frame.
///
/// The payload is shared, so cloning a snapshot into an outbound request is cheap.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Snapshot {
    payload: Arc<[u8]>,
    captured_at: DateTime<Utc>,
    origin: SnapshotOrigin,
}

impl Snapshot {
    /// # Errors
    ///
    /// Returns `SnapshotError::EmptyPayload` when `payload` has no bytes.
    pub fn new(
        payload: impl Into<Vec<u8>>,
        captured_at: DateTime<Utc>,
        origin: SnapshotOrigin,
    ) -> Result<Self, SnapshotError> {
        let payload: Vec<u8> = payload.into();
        if payload.is_empty() {
            return Err(SnapshotError::EmptyPayload);
        }
        Ok(Self {
            payload: payload.into(),
            captured_at,
            origin,
        })
    }

    #[must_use]
    pub fn payload(&self) -> &[u8] {
        &self.payload
    }

    #[must_use]
    pub fn captured_at(&self) -> DateTime<Utc> {
        self.captured_at
    }

    #[must_use]
    pub fn origin(&self) -> SnapshotOrigin {
        self.origin
    }

    /// Standard base64 of the payload, without a `data:` prefix.
    #[must_use]
    pub fn to_base64(&self) -> String {
        STANDARD.encode(&self.payload)
    }
}

/// What the chat can show the answer service about the video.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VisualContext {
    current: Option<Snapshot>,
    default: Option<Snapshot>,
}

impl VisualContext {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Store the load-time fallback. It only becomes the current snapshot when no
    /// pause capture has happened yet.
    pub fn set_default(&mut self, snapshot: Snapshot) {
        if self.current.is_none() {
            self.current = Some(snapshot.clone());
        }
        self.default = Some(snapshot);
    }

    /// Latest wins; the default snapshot is left alone.
    pub fn replace_current(&mut self, snapshot: Snapshot) {
        self.current = Some(snapshot);
    }

    #[must_use]
    pub fn current(&self) -> Option<&Snapshot> {
        self.current.as_ref()
    }

    #[must_use]
    pub fn default_snapshot(&self) -> Option<&Snapshot> {
        self.default.as_ref()
    }

    /// Snapshot to attach to a question: current, else default, else none.
    #[must_use]
    pub fn grounding(&self) -> Option<&Snapshot> {
        self.current.as_ref().or(self.default.as_ref())
    }
}

use thiserror::Error;

use crate::model::ids::CheckpointId;

/// Lowest normalized playback position.
pub const POSITION_MIN: f64 = 0.0;
/// Highest normalized playback position.
pub const POSITION_MAX: f64 = 100.0;

//
// ─── ERRORS ───────────────────────────────────────────────────────────────────
//

#[derive(Debug, Error, Clone, PartialEq)]
#[non_exhaustive]
pub enum CheckpointError {
    #[error("checkpoint position must be a finite number")]
    NonFinitePosition,

    #[error("checkpoint position {position} is outside 0..=100")]
    PositionOutOfRange { position: f64 },

    #[error("checkpoint prompt cannot be empty")]
    EmptyPrompt,
}

//
// ─── DRAFT (as received from the intelligence service) ─────────────────────────
//

#[derive(Debug, Clone, PartialEq)]
pub struct CheckpointDraft {
    pub position: f64,
    pub prompt: String,
}

impl CheckpointDraft {
    pub fn new(position: f64, prompt: impl Into<String>) -> Self {
        Self {
            position,
            prompt: prompt.into(),
        }
    }

    /// Validate the draft and bind it to an id.
    ///
    /// # Errors
    ///
    /// Returns `CheckpointError` if the position is not finite, falls outside
    /// `0..=100`, or the prompt is blank.
    pub fn validate(self, id: CheckpointId) -> Result<Checkpoint, CheckpointError> {
        if !self.position.is_finite() {
            return Err(CheckpointError::NonFinitePosition);
        }
        if !(POSITION_MIN..=POSITION_MAX).contains(&self.position) {
            return Err(CheckpointError::PositionOutOfRange {
                position: self.position,
            });
        }
        let prompt = self.prompt.trim();
        if prompt.is_empty() {
            return Err(CheckpointError::EmptyPrompt);
        }

        Ok(Checkpoint {
            id,
            position: self.position,
            prompt: prompt.to_owned(),
        })
    }
}

//
// ─── VALIDATED CHECKPOINT ──────────────────────────────────────────────────────
//

/// A quiz question bound to a normalized playback position.
#[derive(Debug, Clone, PartialEq)]
pub struct Checkpoint {
    id: CheckpointId,
    position: f64,
    prompt: String,
}

impl Checkpoint {
    #[must_use]
    pub fn id(&self) -> CheckpointId {
        self.id
    }

    /// Position in percent of the video duration.
    #[must_use]
    pub fn position(&self) -> f64 {
        self.position
    }

    #[must_use]
    pub fn prompt(&self) -> &str {
        &self.prompt
    }

    /// Whether `progress` lies strictly inside this checkpoint's tolerance window.
    #[must_use]
    pub fn is_within(&self, progress: f64, tolerance: f64) -> bool {
        (self.position - progress).abs() < tolerance
    }
}

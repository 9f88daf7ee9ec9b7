//! Shared error types for the services crate.

use std::path::PathBuf;

use thiserror::Error;

use tutor_core::model::{CheckpointId, RegistryError, VideoSourceError};

/// Viewer-facing text used when a failure carries no message of its own.
pub const GENERIC_FAILURE_MESSAGE: &str = "Failed to process question. Please try again.";

/// Errors emitted by an `IntelligenceService`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum IntelligenceError {
    /// The service answered with an `{error}` body.
    #[error("intelligence service rejected the request ({status}): {message}")]
    Rejected {
        status: reqwest::StatusCode,
        message: String,
    },
    #[error("intelligence service request failed with status {0}")]
    HttpStatus(reqwest::StatusCode),
    #[error("intelligence service returned an unusable response: {0}")]
    MalformedResponse(String),
    #[error("could not read video file {path}: {source}")]
    ReadVideo {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error(transparent)]
    Http(#[from] reqwest::Error),
}

impl IntelligenceError {
    /// Text shown to the viewer for this failure.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            IntelligenceError::Rejected { message, .. } if !message.trim().is_empty() => {
                message.clone()
            }
            _ => GENERIC_FAILURE_MESSAGE.to_owned(),
        }
    }
}

/// Errors emitted by a `FrameSource`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum FrameError {
    #[error("frame unavailable: {0}")]
    Unavailable(String),
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Errors emitted while loading a video into the session.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum LoadError {
    #[error(transparent)]
    InvalidSource(#[from] VideoSourceError),
    #[error(transparent)]
    Acquisition(#[from] IntelligenceError),
    #[error("video analysis is unusable: {reason}")]
    Unusable { reason: &'static str },
    #[error("a newer load replaced this one")]
    Superseded,
}

/// Errors emitted by the quiz controller.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum QuizError {
    #[error("no quiz is active")]
    NotInterrupted,
    #[error("checkpoint {active} is already holding playback")]
    AlreadyInterrupted { active: CheckpointId },
    #[error("unknown checkpoint {0}")]
    UnknownCheckpoint(CheckpointId),
    #[error("checkpoint {0} was already answered")]
    AlreadyCompleted(CheckpointId),
    #[error("answer cannot be empty")]
    EmptyAnswer,
    #[error("the quiz changed while its answer was being evaluated")]
    Stale,
    #[error("still waiting on a previous request")]
    Busy,
    #[error(transparent)]
    Registry(#[from] RegistryError),
    #[error(transparent)]
    Evaluation(#[from] IntelligenceError),
}

/// Errors emitted while reading `TutorConfig`.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum ConfigError {
    #[error("{var} has an invalid value {value:?}: {reason}")]
    InvalidValue {
        var: &'static str,
        value: String,
        reason: &'static str,
    },
}

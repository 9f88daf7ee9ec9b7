#![forbid(unsafe_code)]

pub mod chat;
pub mod config;
pub mod controller;
pub mod error;
pub mod frame;
pub mod intelligence;
pub mod media;
pub mod playback;
pub mod quiz;
pub mod snapshot;

pub use tutor_core::Clock;

pub use chat::{AskOutcome, AskRejection, ChatSessionManager, PendingAsk};
pub use config::TutorConfig;
pub use controller::{LoadReport, TutorSession};
pub use error::{
    ConfigError, FrameError, GENERIC_FAILURE_MESSAGE, IntelligenceError, LoadError, QuizError,
};
pub use frame::{FileFrameSource, FrameSource, NoFrameSource};
pub use intelligence::{
    AskReply, AskRequest, EvaluationRequest, HttpIntelligenceService, IntelligenceService,
};
pub use media::{DetachedPlayer, MediaCommand, MediaPlayer};
pub use playback::PlaybackMonitor;
pub use quiz::{ActiveQuiz, QuizController};
pub use snapshot::SnapshotCapturer;

//! The remote service that analyses videos and answers questions.

mod http;
mod wire;

use async_trait::async_trait;

use tutor_core::model::{HostedVideo, LocalVideo, Message, Snapshot, VideoAnalysis};

use crate::error::IntelligenceError;

pub use http::HttpIntelligenceService;

/// One grounded chat question.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AskRequest {
    pub question: String,
    pub summary: String,
    /// Frame shown alongside the question, if one was captured.
    pub context: Option<Snapshot>,
    /// Conversation as it stood before this question.
    pub history: Vec<Message>,
}

/// What the service made of a question.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AskReply {
    Answer(String),
    /// The service handled the request but reported a failure in-band.
    Error(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EvaluationRequest {
    pub question: String,
    pub answer: String,
    /// Transcript of the video the question was drawn from.
    pub context: String,
}

#[async_trait]
pub trait IntelligenceService: Send + Sync {
    async fn process_hosted(&self, video: &HostedVideo)
    -> Result<VideoAnalysis, IntelligenceError>;

    async fn process_local(&self, video: &LocalVideo) -> Result<VideoAnalysis, IntelligenceError>;

    async fn ask_question(&self, request: &AskRequest) -> Result<AskReply, IntelligenceError>;

    /// Feedback on a quiz answer. Never decides whether the quiz is done.
    async fn evaluate_answer(
        &self,
        request: &EvaluationRequest,
    ) -> Result<String, IntelligenceError>;
}

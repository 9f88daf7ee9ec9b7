//! JSON shapes exchanged with the intelligence service.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use tutor_core::model::{CheckpointDraft, Message, Role, VideoAnalysis};

use super::{AskReply, AskRequest, EvaluationRequest};
use crate::error::IntelligenceError;

#[derive(Debug, Serialize)]
pub(super) struct ProcessVideoBody<'a> {
    pub url: &'a str,
}

#[derive(Debug, Deserialize)]
pub(super) struct ProcessVideoResponse {
    #[serde(default)]
    transcript: String,
    #[serde(default)]
    summary: String,
    #[serde(default, rename = "quizQuestions")]
    quiz_questions: Option<Vec<WireQuizQuestion>>,
}

#[derive(Debug, Deserialize)]
struct WireQuizQuestion {
    #[serde(alias = "prompt")]
    question: String,
    #[serde(alias = "position")]
    timestamp: Value,
}

impl ProcessVideoResponse {
    /// Positions that cannot be read as numbers become NaN and are rejected when the
    /// registry validates them.
    pub fn into_analysis(self) -> VideoAnalysis {
        let checkpoints = self
            .quiz_questions
            .unwrap_or_default()
            .into_iter()
            .map(|q| CheckpointDraft::new(position_from(&q.timestamp), q.question))
            .collect();
        VideoAnalysis {
            transcript: self.transcript,
            summary: self.summary,
            checkpoints,
        }
    }
}

fn position_from(value: &Value) -> f64 {
    match value {
        Value::Number(n) => n.as_f64().unwrap_or(f64::NAN),
        Value::String(s) => s.trim().trim_end_matches('%').parse().unwrap_or(f64::NAN),
        _ => f64::NAN,
    }
}

#[derive(Debug, Serialize)]
pub(super) struct AskQuestionBody<'a> {
    question: &'a str,
    summary: &'a str,
    #[serde(rename = "currentScreenshot")]
    current_screenshot: Option<String>,
    messages: Vec<WireMessage<'a>>,
}

#[derive(Debug, Serialize)]
struct WireMessage<'a> {
    #[serde(rename = "type")]
    kind: Role,
    content: &'a str,
}

impl<'a> From<&'a AskRequest> for AskQuestionBody<'a> {
    fn from(request: &'a AskRequest) -> Self {
        Self {
            question: &request.question,
            summary: &request.summary,
            current_screenshot: request.context.as_ref().map(|s| s.to_base64()),
            messages: request.history.iter().map(WireMessage::from).collect(),
        }
    }
}

impl<'a> From<&'a Message> for WireMessage<'a> {
    fn from(message: &'a Message) -> Self {
        Self {
            kind: message.role(),
            content: message.text(),
        }
    }
}

#[derive(Debug, Deserialize)]
pub(super) struct AnswerBody {
    answer: Option<String>,
    error: Option<String>,
}

impl AnswerBody {
    pub fn into_reply(self) -> Result<AskReply, IntelligenceError> {
        match (self.answer, self.error) {
            (Some(answer), _) if !answer.trim().is_empty() => Ok(AskReply::Answer(answer)),
            (_, Some(error)) => Ok(AskReply::Error(error)),
            _ => Err(IntelligenceError::MalformedResponse(
                "reply carried neither an answer nor an error".into(),
            )),
        }
    }
}

#[derive(Debug, Serialize)]
pub(super) struct EvaluateBody<'a> {
    question: &'a str,
    answer: &'a str,
    context: &'a str,
}

impl<'a> From<&'a EvaluationRequest> for EvaluateBody<'a> {
    fn from(request: &'a EvaluationRequest) -> Self {
        Self {
            question: &request.question,
            answer: &request.answer,
            context: &request.context,
        }
    }
}

#[derive(Debug, Deserialize)]
pub(super) struct FeedbackBody {
    feedback: Option<String>,
}

impl FeedbackBody {
    pub fn into_feedback(self) -> Result<String, IntelligenceError> {
        self.feedback
            .map(|f| f.trim().to_owned())
            .filter(|f| !f.is_empty())
            .ok_or_else(|| IntelligenceError::MalformedResponse("feedback was empty".into()))
    }
}

/// Body of a non-2xx response.
#[derive(Debug, Deserialize)]
pub(super) struct ErrorBody {
    pub error: String,
}

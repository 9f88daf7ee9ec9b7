use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use reqwest::{Client, Response, StatusCode};
use serde::de::DeserializeOwned;
use tracing::{debug, instrument};

use tutor_core::model::{HostedVideo, LocalVideo, VideoAnalysis};

use super::wire::{
    AnswerBody, AskQuestionBody, ErrorBody, EvaluateBody, FeedbackBody, ProcessVideoBody,
    ProcessVideoResponse,
};
use super::{AskReply, AskRequest, EvaluationRequest, IntelligenceService};
use crate::config::TutorConfig;
use crate::error::IntelligenceError;

const UPLOAD_FIELD: &str = "video";

/// `IntelligenceService` backed by the tutor HTTP API.
#[derive(Clone)]
pub struct HttpIntelligenceService {
    client: Client,
    base_url: String,
}

impl HttpIntelligenceService {
    /// # Errors
    ///
    /// Returns `IntelligenceError::Http` if the HTTP client cannot be built.
    pub fn new(config: &TutorConfig) -> Result<Self, IntelligenceError> {
        let client = Client::builder().timeout(config.request_timeout).build()?;
        Ok(Self {
            client,
            base_url: config.base_url.clone(),
        })
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/api/{path}", self.base_url.trim_end_matches('/'))
    }
}

async fn read_json<T: DeserializeOwned>(response: Response) -> Result<T, IntelligenceError> {
    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        return Err(status_error(status, &body));
    }

    let body = response.text().await?;
    parse_body(&body)
}

/// Map a non-success reply to an error, keeping the service's `{error}` text when present.
fn status_error(status: StatusCode, body: &str) -> IntelligenceError {
    match serde_json::from_str::<ErrorBody>(body) {
        Ok(ErrorBody { error }) => IntelligenceError::Rejected {
            status,
            message: error,
        },
        Err(_) => IntelligenceError::HttpStatus(status),
    }
}

fn parse_body<T: DeserializeOwned>(body: &str) -> Result<T, IntelligenceError> {
    serde_json::from_str(body).map_err(|err| IntelligenceError::MalformedResponse(err.to_string()))
}

#[async_trait]
impl IntelligenceService for HttpIntelligenceService {
    #[instrument(skip_all, fields(video_id = %video.video_id()))]
    async fn process_hosted(
        &self,
        video: &HostedVideo,
    ) -> Result<VideoAnalysis, IntelligenceError> {
        let response = self
            .client
            .post(self.endpoint("process-video"))
            .json(&ProcessVideoBody {
                url: video.url().as_str(),
            })
            .send()
            .await?;

        let body: ProcessVideoResponse = read_json(response).await?;
        Ok(body.into_analysis())
    }

    #[instrument(skip_all, fields(path = %video.path().display()))]
    async fn process_local(&self, video: &LocalVideo) -> Result<VideoAnalysis, IntelligenceError> {
        let bytes = tokio::fs::read(video.path())
            .await
            .map_err(|source| IntelligenceError::ReadVideo {
                path: video.path().to_path_buf(),
                source,
            })?;
        debug!(bytes = bytes.len(), "uploading local video");

        let part = Part::bytes(bytes).file_name(video.file_name());
        let form = Form::new().part(UPLOAD_FIELD, part);
        let response = self
            .client
            .post(self.endpoint("process-local-video"))
            .multipart(form)
            .send()
            .await?;

        let body: ProcessVideoResponse = read_json(response).await?;
        Ok(body.into_analysis())
    }

    #[instrument(skip_all, fields(history = request.history.len(), grounded = request.context.is_some()))]
    async fn ask_question(&self, request: &AskRequest) -> Result<AskReply, IntelligenceError> {
        let response = self
            .client
            .post(self.endpoint("ask-question"))
            .json(&AskQuestionBody::from(request))
            .send()
            .await?;

        let body: AnswerBody = read_json(response).await?;
        body.into_reply()
    }

    #[instrument(skip_all)]
    async fn evaluate_answer(
        &self,
        request: &EvaluationRequest,
    ) -> Result<String, IntelligenceError> {
        let response = self
            .client
            .post(self.endpoint("evaluate-answer"))
            .json(&EvaluateBody::from(request))
            .send()
            .await?;

        let body: FeedbackBody = read_json(response).await?;
        body.into_feedback()
    }
}

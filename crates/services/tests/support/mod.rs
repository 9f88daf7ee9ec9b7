#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use reqwest::StatusCode;
use tokio::sync::Notify;

use services::{
    AskReply, AskRequest, Clock, EvaluationRequest, FrameError, FrameSource, IntelligenceError,
    IntelligenceService, MediaCommand, MediaPlayer, TutorConfig, TutorSession,
};
use tutor_core::model::{CheckpointDraft, HostedVideo, LocalVideo, VideoAnalysis};
use tutor_core::time::fixed_clock;

pub fn analysis(checkpoints: &[(f64, &str)]) -> VideoAnalysis {
    VideoAnalysis {
        transcript: "Ownership moves values; borrowing lends them.".into(),
        summary: "An introduction to ownership in Rust.".into(),
        checkpoints: checkpoints
            .iter()
            .map(|(position, prompt)| CheckpointDraft::new(*position, *prompt))
            .collect(),
    }
}

/// In-process stand-in for the intelligence service.
#[derive(Default)]
pub struct FakeService {
    analysis: Mutex<VideoAnalysis>,
    fail_loads: Mutex<bool>,
    replies: Mutex<VecDeque<Result<AskReply, IntelligenceError>>>,
    feedback: Mutex<VecDeque<Result<String, IntelligenceError>>>,
    asked: Mutex<Vec<AskRequest>>,
    evaluated: Mutex<Vec<EvaluationRequest>>,
    ask_gate: Mutex<Option<Arc<Notify>>>,
    load_gate: Mutex<Option<Arc<Notify>>>,
}

impl FakeService {
    pub fn new(analysis: VideoAnalysis) -> Self {
        Self {
            analysis: Mutex::new(analysis),
            ..Self::default()
        }
    }

    pub fn set_analysis(&self, analysis: VideoAnalysis) {
        *self.analysis.lock().unwrap() = analysis;
    }

    pub fn fail_loads(&self, fail: bool) {
        *self.fail_loads.lock().unwrap() = fail;
    }

    pub fn push_reply(&self, reply: Result<AskReply, IntelligenceError>) {
        self.replies.lock().unwrap().push_back(reply);
    }

    pub fn push_feedback(&self, feedback: Result<String, IntelligenceError>) {
        self.feedback.lock().unwrap().push_back(feedback);
    }

    /// Hold every question and answer evaluation until the returned handle is notified.
    pub fn gate_questions(&self) -> Arc<Notify> {
        let gate = Arc::new(Notify::new());
        *self.ask_gate.lock().unwrap() = Some(gate.clone());
        gate
    }

    /// Hold only the next load until the returned handle is notified.
    pub fn gate_next_load(&self) -> Arc<Notify> {
        let gate = Arc::new(Notify::new());
        *self.load_gate.lock().unwrap() = Some(gate.clone());
        gate
    }

    pub fn asked(&self) -> Vec<AskRequest> {
        self.asked.lock().unwrap().clone()
    }

    pub fn evaluated(&self) -> Vec<EvaluationRequest> {
        self.evaluated.lock().unwrap().clone()
    }

    async fn load(&self) -> Result<VideoAnalysis, IntelligenceError> {
        let gate = self.load_gate.lock().unwrap().take();
        if let Some(gate) = gate {
            gate.notified().await;
        }
        if *self.fail_loads.lock().unwrap() {
            return Err(IntelligenceError::HttpStatus(StatusCode::BAD_GATEWAY));
        }
        Ok(self.analysis.lock().unwrap().clone())
    }
}

#[async_trait]
impl IntelligenceService for FakeService {
    async fn process_hosted(
        &self,
        _video: &HostedVideo,
    ) -> Result<VideoAnalysis, IntelligenceError> {
        self.load().await
    }

    async fn process_local(&self, _video: &LocalVideo) -> Result<VideoAnalysis, IntelligenceError> {
        self.load().await
    }

    async fn ask_question(&self, request: &AskRequest) -> Result<AskReply, IntelligenceError> {
        self.asked.lock().unwrap().push(request.clone());
        let gate = self.ask_gate.lock().unwrap().clone();
        if let Some(gate) = gate {
            gate.notified().await;
        }
        self.replies
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Ok(AskReply::Answer("It depends.".into())))
    }

    async fn evaluate_answer(
        &self,
        request: &EvaluationRequest,
    ) -> Result<String, IntelligenceError> {
        self.evaluated.lock().unwrap().push(request.clone());
        let gate = self.ask_gate.lock().unwrap().clone();
        if let Some(gate) = gate {
            gate.notified().await;
        }
        self.feedback
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Ok("Good answer.".into()))
    }
}

/// Frame source that plays back a queue of canned results, then reports no frame.
#[derive(Default)]
pub struct ScriptedFrames {
    frames: Mutex<VecDeque<Result<Option<Vec<u8>>, FrameError>>>,
}

impl ScriptedFrames {
    pub fn push_frame(&self, bytes: &[u8]) {
        self.frames.lock().unwrap().push_back(Ok(Some(bytes.to_vec())));
    }

    pub fn push_failure(&self, reason: &str) {
        self.frames
            .lock()
            .unwrap()
            .push_back(Err(FrameError::Unavailable(reason.into())));
    }
}

#[async_trait]
impl FrameSource for ScriptedFrames {
    async fn current_frame(&self) -> Result<Option<Vec<u8>>, FrameError> {
        self.frames.lock().unwrap().pop_front().unwrap_or(Ok(None))
    }
}

#[derive(Default)]
pub struct RecordingPlayer {
    commands: Mutex<Vec<MediaCommand>>,
}

impl RecordingPlayer {
    pub fn commands(&self) -> Vec<MediaCommand> {
        self.commands.lock().unwrap().clone()
    }
}

impl MediaPlayer for RecordingPlayer {
    fn pause(&self) {
        self.commands.lock().unwrap().push(MediaCommand::Pause);
    }

    fn play(&self) {
        self.commands.lock().unwrap().push(MediaCommand::Play);
    }
}

pub struct Harness {
    pub tutor: TutorSession,
    pub service: Arc<FakeService>,
    pub frames: Arc<ScriptedFrames>,
    pub player: Arc<RecordingPlayer>,
}

pub fn harness(analysis: VideoAnalysis) -> Harness {
    let service = Arc::new(FakeService::new(analysis));
    let frames = Arc::new(ScriptedFrames::default());
    let player = Arc::new(RecordingPlayer::default());
    let config = TutorConfig {
        default_frame_delay: Duration::ZERO,
        ..TutorConfig::default()
    };
    let clock: Clock = fixed_clock();
    let tutor = TutorSession::new(
        &config,
        clock,
        service.clone(),
        frames.clone(),
        player.clone(),
    );
    Harness {
        tutor,
        service,
        frames,
        player,
    }
}

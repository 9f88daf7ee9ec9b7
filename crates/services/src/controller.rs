use std::path::PathBuf;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tracing::{debug, info, warn};

use tutor_core::Clock;
use tutor_core::model::{
    Epoch, HostedVideo, LocalVideo, PlaybackSample, Session, SessionId, Snapshot, VideoAnalysis,
    VideoSource,
};

use crate::chat::{AskOutcome, ChatSessionManager};
use crate::config::TutorConfig;
use crate::error::{LoadError, QuizError};
use crate::frame::FrameSource;
use crate::intelligence::IntelligenceService;
use crate::media::{MediaCommand, MediaPlayer};
use crate::playback::PlaybackMonitor;
use crate::quiz::{ActiveQuiz, QuizController};
use crate::snapshot::{self, SnapshotCapturer};

/// What a successful load produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadReport {
    pub session_id: SessionId,
    pub epoch: Epoch,
    pub checkpoints: usize,
    pub rejected: usize,
    pub has_default_snapshot: bool,
}

/// One viewer's tutoring session: the loaded video, its quizzes and the chat.
///
/// The session state sits behind a mutex that is only held between suspension
/// points, so replies to requests issued against an older video can be recognised
/// by their epoch and dropped.
pub struct TutorSession {
    service: Arc<dyn IntelligenceService>,
    media: Arc<dyn MediaPlayer>,
    capturer: SnapshotCapturer,
    monitor: PlaybackMonitor,
    quiz: QuizController,
    chat: ChatSessionManager,
    session: Mutex<Session>,
    latest_load: AtomicU64,
}

impl TutorSession {
    #[must_use]
    pub fn new(
        config: &TutorConfig,
        clock: Clock,
        service: Arc<dyn IntelligenceService>,
        frames: Arc<dyn FrameSource>,
        media: Arc<dyn MediaPlayer>,
    ) -> Self {
        Self {
            service,
            media,
            capturer: SnapshotCapturer::new(frames, clock)
                .with_settle_delay(config.default_frame_delay),
            monitor: PlaybackMonitor::new(config.checkpoint_tolerance),
            quiz: QuizController,
            chat: ChatSessionManager::new(clock),
            session: Mutex::new(Session::empty()),
            latest_load: AtomicU64::new(Epoch::INITIAL.value()),
        }
    }

    fn lock(&self) -> MutexGuard<'_, Session> {
        self.session.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Read the current session state.
    pub fn view<R>(&self, f: impl FnOnce(&Session) -> R) -> R {
        f(&self.lock())
    }

    #[must_use]
    pub fn epoch(&self) -> Epoch {
        self.lock().epoch()
    }

    //
    // ─── LOADING ───────────────────────────────────────────────────────────────
    //

    /// Analyse a hosted video and make it the current session.
    ///
    /// # Errors
    ///
    /// Returns `LoadError`; the previous session is kept on every error.
    pub async fn load_hosted(&self, raw_url: &str) -> Result<LoadReport, LoadError> {
        let video = HostedVideo::parse(raw_url)?;
        let ticket = self.next_ticket();
        info!(video_id = video.video_id(), %ticket, "loading hosted video");

        let analysis = self.service.process_hosted(&video).await.inspect_err(|err| {
            warn!(error = %err, "hosted video analysis failed");
        })?;

        self.commit(ticket, VideoSource::Hosted(video), analysis, None)
    }

    /// Upload a local video for analysis and make it the current session.
    ///
    /// The first frame is captured while the upload runs.
    ///
    /// # Errors
    ///
    /// Returns `LoadError`; the previous session is kept on every error.
    pub async fn load_local(&self, path: impl Into<PathBuf>) -> Result<LoadReport, LoadError> {
        let video = LocalVideo::from_path(path)?;
        let ticket = self.next_ticket();
        info!(path = %video.path().display(), %ticket, "loading local video");

        let (analysis, default_snapshot) = tokio::join!(
            self.service.process_local(&video),
            self.capturer.capture_default(),
        );
        let analysis = analysis.inspect_err(|err| {
            warn!(error = %err, "local video analysis failed");
        })?;

        self.commit(ticket, VideoSource::Local(video), analysis, default_snapshot)
    }

    fn next_ticket(&self) -> Epoch {
        Epoch::new(self.latest_load.fetch_add(1, Ordering::SeqCst) + 1)
    }

    fn commit(
        &self,
        ticket: Epoch,
        source: VideoSource,
        analysis: VideoAnalysis,
        default_snapshot: Option<Snapshot>,
    ) -> Result<LoadReport, LoadError> {
        if analysis.transcript.trim().is_empty() {
            warn!("analysis returned no transcript");
            return Err(LoadError::Unusable {
                reason: "transcript is empty",
            });
        }
        if analysis.summary.trim().is_empty() {
            warn!("analysis returned no summary");
            return Err(LoadError::Unusable {
                reason: "summary is empty",
            });
        }
        let (session, rejected) = Session::loaded(ticket, source, analysis, default_snapshot);
        for r in &rejected {
            warn!(
                position = r.draft.position,
                prompt = %r.draft.prompt,
                error = %r.error,
                "skipping invalid checkpoint"
            );
        }

        let report = LoadReport {
            session_id: session.id(),
            epoch: ticket,
            checkpoints: session.registry().len(),
            rejected: rejected.len(),
            has_default_snapshot: session.visual().default_snapshot().is_some(),
        };
        {
            let mut current = self.lock();
            if self.latest_load.load(Ordering::SeqCst) != ticket.value() {
                debug!(%ticket, "load superseded by a newer one");
                return Err(LoadError::Superseded);
            }
            *current = session;
        }
        info!(
            session = %report.session_id,
            epoch = %report.epoch,
            checkpoints = report.checkpoints,
            rejected = report.rejected,
            "video loaded"
        );
        Ok(report)
    }

    //
    // ─── PLAYBACK ──────────────────────────────────────────────────────────────
    //

    /// Feed one `timeupdate` sample. Returns the quiz that took over playback, if
    /// this sample crossed a checkpoint.
    pub fn on_time_update(&self, current_time: f64, duration: f64) -> Option<ActiveQuiz> {
        let sample = PlaybackSample::new(current_time, duration);
        let (command, active) = {
            let mut session = self.lock();
            let id = self.monitor.observe(&mut session, sample)?;
            match self.quiz.interrupt(&mut session, id) {
                Ok(command) => (command, self.quiz.active(&session)),
                Err(err) => {
                    warn!(checkpoint = %id, error = %err, "checkpoint could not interrupt");
                    return None;
                }
            }
        };
        command.apply(self.media.as_ref());
        active
    }

    /// Playback paused: refresh the snapshot that grounds chat questions.
    pub async fn on_pause(&self) {
        let epoch = {
            let mut session = self.lock();
            session.playback_mut().set_playing(false);
            session.epoch()
        };

        let Some(captured) = self.capturer.capture_on_pause().await else {
            return;
        };

        let mut session = self.lock();
        if session.epoch() != epoch {
            debug!(%epoch, "dropping snapshot taken for a replaced session");
            return;
        }
        snapshot::store(session.visual_mut(), captured);
    }

    #[must_use]
    pub fn active_quiz(&self) -> Option<ActiveQuiz> {
        self.quiz.active(&self.lock())
    }

    //
    // ─── CHAT ──────────────────────────────────────────────────────────────────
    //

    /// Ask a question about the current video.
    pub async fn ask(&self, question: &str) -> AskOutcome {
        let begun = {
            let mut session = self.lock();
            self.chat.begin(&mut session, question)
        };
        let pending = match begun {
            Ok(pending) => pending,
            Err(rejection) => {
                debug!(?rejection, "question not sent");
                return AskOutcome::Rejected(rejection);
            }
        };

        let result = self.service.ask_question(pending.request()).await;

        let mut session = self.lock();
        self.chat.finish(&mut session, pending, result)
    }

    //
    // ─── QUIZ ──────────────────────────────────────────────────────────────────
    //

    /// Ask the service for feedback on a quiz answer. The quiz stays active.
    ///
    /// Shares the in-flight flag with chat, so only one request runs at a time.
    ///
    /// # Errors
    ///
    /// Returns `QuizError` when no quiz is active, the answer is blank, another
    /// request is in flight, the service fails, or the quiz changed while waiting.
    pub async fn evaluate_quiz_answer(&self, answer: &str) -> Result<String, QuizError> {
        let (epoch, active, request) = {
            let mut session = self.lock();
            let request = self.quiz.evaluation_request(&session, answer)?;
            if session.is_asking() {
                return Err(QuizError::Busy);
            }
            session.set_asking(true);
            (
                session.epoch(),
                session.playback().active_checkpoint(),
                request,
            )
        };

        let result = self
            .service
            .evaluate_answer(&request)
            .await
            .inspect_err(|err| warn!(error = %err, "answer evaluation failed"));

        let mut session = self.lock();
        if session.epoch() != epoch {
            debug!("dropping feedback for a replaced session");
            return Err(QuizError::Stale);
        }
        session.set_asking(false);
        let feedback = result?;
        if session.playback().active_checkpoint() != active {
            debug!("dropping feedback for a quiz that is no longer active");
            return Err(QuizError::Stale);
        }
        Ok(feedback)
    }

    /// Accept the viewer's answer, complete the checkpoint and resume playback.
    ///
    /// # Errors
    ///
    /// Returns `QuizError` when no quiz is active or the answer is blank.
    pub fn resolve_quiz(&self, answer: &str) -> Result<(), QuizError> {
        let command: MediaCommand = {
            let mut session = self.lock();
            self.quiz.resolve(&mut session, answer)?
        };
        command.apply(self.media.as_ref());
        Ok(())
    }
}

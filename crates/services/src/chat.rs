use tracing::{debug, info, warn};

use tutor_core::Clock;
use tutor_core::model::{Epoch, Session};

use crate::error::IntelligenceError;
use crate::intelligence::{AskReply, AskRequest};

/// Why a question was not sent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AskRejection {
    EmptyQuestion,
    QuizActive,
    Busy,
}

/// A question that has been recorded and is waiting on the service.
#[derive(Debug, Clone)]
pub struct PendingAsk {
    epoch: Epoch,
    request: AskRequest,
}

impl PendingAsk {
    #[must_use]
    pub fn epoch(&self) -> Epoch {
        self.epoch
    }

    #[must_use]
    pub fn request(&self) -> &AskRequest {
        &self.request
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AskOutcome {
    Answered(String),
    /// The failure was recorded in the conversation under this viewer-facing message.
    Failed(String),
    Rejected(AskRejection),
    /// The reply belonged to a session that has since been replaced.
    Discarded,
}

/// Runs the two halves of a chat round trip against the session.
#[derive(Debug, Clone, Copy, Default)]
pub struct ChatSessionManager {
    clock: Clock,
}

impl ChatSessionManager {
    #[must_use]
    pub fn new(clock: Clock) -> Self {
        Self { clock }
    }

    /// Record the question, mark the session busy and build the request.
    ///
    /// The request carries the history as it was before this question.
    ///
    /// # Errors
    ///
    /// Returns the `AskRejection` when the question cannot be sent now; the session
    /// is left untouched in that case.
    pub fn begin(&self, session: &mut Session, question: &str) -> Result<PendingAsk, AskRejection> {
        let question = question.trim();
        if question.is_empty() {
            return Err(AskRejection::EmptyQuestion);
        }
        if session.is_interrupted() {
            return Err(AskRejection::QuizActive);
        }
        if session.is_asking() {
            return Err(AskRejection::Busy);
        }

        let request = AskRequest {
            question: question.to_owned(),
            summary: session.summary().to_owned(),
            context: session.visual().grounding().cloned(),
            history: session.history().messages().to_vec(),
        };

        session.history_mut().push_question(question, self.clock.now());
        session.set_asking(true);
        debug!(
            epoch = %session.epoch(),
            grounded = request.context.is_some(),
            "question sent"
        );

        Ok(PendingAsk {
            epoch: session.epoch(),
            request,
        })
    }

    /// Apply the service's reply to the session that asked.
    pub fn finish(
        &self,
        session: &mut Session,
        pending: PendingAsk,
        result: Result<AskReply, IntelligenceError>,
    ) -> AskOutcome {
        if session.epoch() != pending.epoch {
            debug!(
                asked_in = %pending.epoch,
                current = %session.epoch(),
                "discarding reply for a replaced session"
            );
            return AskOutcome::Discarded;
        }

        session.set_asking(false);
        let now = self.clock.now();
        match result {
            Ok(AskReply::Answer(answer)) => {
                session.history_mut().push_answer(answer.clone(), now);
                session.clear_banner();
                info!(history = session.history().len(), "question answered");
                AskOutcome::Answered(answer)
            }
            Ok(AskReply::Error(message)) => {
                warn!(%message, "service could not answer question");
                record_failure(session, message, now)
            }
            Err(err) => {
                warn!(error = %err, "question failed");
                record_failure(session, err.user_message(), now)
            }
        }
    }
}

fn record_failure(
    session: &mut Session,
    message: String,
    now: chrono::DateTime<chrono::Utc>,
) -> AskOutcome {
    session.history_mut().push_error(&message, now);
    session.set_banner(message.clone());
    AskOutcome::Failed(message)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tutor_core::model::{
        CheckpointDraft, CheckpointId, Epoch, LocalVideo, Role, Snapshot, SnapshotOrigin,
        VideoAnalysis, VideoSource,
    };
    use tutor_core::time::{fixed_clock, fixed_now};

    fn session() -> Session {
        let source = VideoSource::Local(LocalVideo::from_path("talk.mp4").unwrap());
        let analysis = VideoAnalysis {
            transcript: "t".into(),
            summary: "Lifetimes".into(),
            checkpoints: vec![CheckpointDraft::new(20.0, "Q1")],
        };
        Session::loaded(Epoch::new(2), source, analysis, None).0
    }

    #[test]
    fn blank_questions_are_rejected_without_side_effects() {
        let chat = ChatSessionManager::new(fixed_clock());
        let mut session = session();

        for question in ["", "   "] {
            assert_eq!(
                chat.begin(&mut session, question).unwrap_err(),
                AskRejection::EmptyQuestion
            );
        }
        assert!(session.history().is_empty());
        assert!(!session.is_asking());
    }

    #[test]
    fn quiz_and_busy_block_questions() {
        let chat = ChatSessionManager::new(fixed_clock());
        let mut session = session();

        let _pending = chat.begin(&mut session, "first").unwrap();
        assert_eq!(
            chat.begin(&mut session, "second").unwrap_err(),
            AskRejection::Busy
        );

        let mut quiz_session = self::session();
        quiz_session.playback_mut().interrupt(CheckpointId::new(1));
        assert_eq!(
            chat.begin(&mut quiz_session, "why?").unwrap_err(),
            AskRejection::QuizActive
        );
        assert!(quiz_session.history().is_empty());
    }

    #[test]
    fn request_carries_prior_history_and_grounding() {
        let chat = ChatSessionManager::new(fixed_clock());
        let mut session = session();
        session.history_mut().push_question("earlier", fixed_now());
        session.history_mut().push_answer("reply", fixed_now());
        session.visual_mut().replace_current(
            Snapshot::new(b"jpeg".to_vec(), fixed_now(), SnapshotOrigin::Pause).unwrap(),
        );

        let pending = chat.begin(&mut session, "  next?  ").unwrap();

        assert_eq!(pending.request().question, "next?");
        assert_eq!(pending.request().summary, "Lifetimes");
        assert_eq!(pending.request().history.len(), 2);
        assert!(pending.request().context.is_some());
        assert_eq!(session.history().len(), 3);
        assert!(session.is_asking());
    }

    #[test]
    fn answer_is_appended_and_banner_cleared() {
        let chat = ChatSessionManager::new(fixed_clock());
        let mut session = session();
        session.set_banner("old failure");

        let pending = chat.begin(&mut session, "what?").unwrap();
        let outcome = chat.finish(&mut session, pending, Ok(AskReply::Answer("this".into())));

        assert_eq!(outcome, AskOutcome::Answered("this".into()));
        assert_eq!(session.history().len(), 2);
        assert_eq!(session.history().last().unwrap().role(), Role::Answer);
        assert!(session.banner().is_none());
        assert!(!session.is_asking());
    }

    #[test]
    fn in_band_error_is_recorded_with_prefix() {
        let chat = ChatSessionManager::new(fixed_clock());
        let mut session = session();

        let pending = chat.begin(&mut session, "what?").unwrap();
        let outcome = chat.finish(
            &mut session,
            pending,
            Ok(AskReply::Error("No relevant context found.".into())),
        );

        assert_eq!(outcome, AskOutcome::Failed("No relevant context found.".into()));
        let last = session.history().last().unwrap();
        assert!(last.is_error());
        assert_eq!(last.text(), "Error: No relevant context found.");
        assert_eq!(session.banner(), Some("No relevant context found."));
    }

    #[test]
    fn reply_for_older_epoch_is_discarded() {
        let chat = ChatSessionManager::new(fixed_clock());
        let mut old = session();
        let pending = chat.begin(&mut old, "what?").unwrap();

        let source = VideoSource::Local(LocalVideo::from_path("next.mp4").unwrap());
        let (mut replaced, _) =
            Session::loaded(Epoch::new(3), source, VideoAnalysis::default(), None);

        let outcome = chat.finish(&mut replaced, pending, Ok(AskReply::Answer("late".into())));

        assert_eq!(outcome, AskOutcome::Discarded);
        assert!(replaced.history().is_empty());
        assert!(!replaced.is_asking());
    }
}

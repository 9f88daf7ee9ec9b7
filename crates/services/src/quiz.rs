use tracing::info;

use tutor_core::model::{Checkpoint, CheckpointId, Session};

use crate::error::QuizError;
use crate::intelligence::EvaluationRequest;
use crate::media::MediaCommand;

/// The checkpoint currently holding playback, ready to be shown to the viewer.
#[derive(Debug, Clone, PartialEq)]
pub struct ActiveQuiz {
    pub checkpoint: Checkpoint,
    /// Transcript the question was drawn from.
    pub context: String,
}

/// Moves a session between running playback and an active quiz.
#[derive(Debug, Clone, Copy, Default)]
pub struct QuizController;

impl QuizController {
    /// Hold playback on `id`.
    ///
    /// # Errors
    ///
    /// Returns `QuizError` if another quiz is active, the id is unknown or the
    /// checkpoint was already answered.
    pub fn interrupt(
        &self,
        session: &mut Session,
        id: CheckpointId,
    ) -> Result<MediaCommand, QuizError> {
        if let Some(active) = session.playback().active_checkpoint() {
            return Err(QuizError::AlreadyInterrupted { active });
        }
        let position = session
            .registry()
            .get(id)
            .map(Checkpoint::position)
            .ok_or(QuizError::UnknownCheckpoint(id))?;
        if session.registry().is_completed(id) {
            return Err(QuizError::AlreadyCompleted(id));
        }

        session.playback_mut().interrupt(id);
        info!(
            checkpoint = %id,
            position,
            progress = session.playback().current_position(),
            "checkpoint reached, holding playback for quiz"
        );
        Ok(MediaCommand::Pause)
    }

    #[must_use]
    pub fn active(&self, session: &Session) -> Option<ActiveQuiz> {
        session.active_checkpoint().map(|checkpoint| ActiveQuiz {
            checkpoint: checkpoint.clone(),
            context: session.transcript().to_owned(),
        })
    }

    /// Build the feedback request for an answer to the active quiz.
    ///
    /// # Errors
    ///
    /// Returns `QuizError::EmptyAnswer` or `QuizError::NotInterrupted`.
    pub fn evaluation_request(
        &self,
        session: &Session,
        answer: &str,
    ) -> Result<EvaluationRequest, QuizError> {
        let answer = answer.trim();
        if answer.is_empty() {
            return Err(QuizError::EmptyAnswer);
        }
        let checkpoint = session
            .active_checkpoint()
            .ok_or(QuizError::NotInterrupted)?;
        Ok(EvaluationRequest {
            question: checkpoint.prompt().to_owned(),
            answer: answer.to_owned(),
            context: session.transcript().to_owned(),
        })
    }

    /// Accept `answer`, complete the active checkpoint and resume playback.
    ///
    /// # Errors
    ///
    /// Returns `QuizError::EmptyAnswer` for a blank answer and
    /// `QuizError::NotInterrupted` when no quiz is active.
    pub fn resolve(&self, session: &mut Session, answer: &str) -> Result<MediaCommand, QuizError> {
        if answer.trim().is_empty() {
            return Err(QuizError::EmptyAnswer);
        }
        let id = session
            .playback()
            .active_checkpoint()
            .ok_or(QuizError::NotInterrupted)?;

        session.registry_mut().complete(id)?;
        session.playback_mut().resume();
        info!(
            checkpoint = %id,
            completed = session.registry().completed_count(),
            "quiz resolved, resuming playback"
        );
        Ok(MediaCommand::Play)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tutor_core::model::{CheckpointDraft, Epoch, LocalVideo, VideoAnalysis, VideoSource};

    fn session() -> Session {
        let source = VideoSource::Local(LocalVideo::from_path("talk.mp4").unwrap());
        let analysis = VideoAnalysis {
            transcript: "ownership moves values".into(),
            summary: "Ownership".into(),
            checkpoints: vec![
                CheckpointDraft::new(20.0, "Q1"),
                CheckpointDraft::new(50.0, "Q2"),
            ],
        };
        Session::loaded(Epoch::new(1), source, analysis, None).0
    }

    #[test]
    fn interrupt_pauses_and_exposes_active_quiz() {
        let quiz = QuizController;
        let mut session = session();

        let command = quiz.interrupt(&mut session, CheckpointId::new(1)).unwrap();

        assert_eq!(command, MediaCommand::Pause);
        let active = quiz.active(&session).unwrap();
        assert_eq!(active.checkpoint.prompt(), "Q1");
        assert_eq!(active.context, "ownership moves values");
    }

    #[test]
    fn second_interrupt_is_rejected_while_active() {
        let quiz = QuizController;
        let mut session = session();
        quiz.interrupt(&mut session, CheckpointId::new(1)).unwrap();

        let err = quiz
            .interrupt(&mut session, CheckpointId::new(2))
            .unwrap_err();
        assert!(matches!(err, QuizError::AlreadyInterrupted { .. }));
    }

    #[test]
    fn resolve_completes_and_resumes() {
        let quiz = QuizController;
        let mut session = session();
        quiz.interrupt(&mut session, CheckpointId::new(1)).unwrap();

        assert!(matches!(
            quiz.resolve(&mut session, "  "),
            Err(QuizError::EmptyAnswer)
        ));
        assert!(session.is_interrupted());

        let command = quiz.resolve(&mut session, "values move").unwrap();
        assert_eq!(command, MediaCommand::Play);
        assert!(!session.is_interrupted());
        assert!(session.playback().is_playing());
        assert_eq!(session.registry().completed_positions(), vec![20.0]);
    }

    #[test]
    fn resolve_without_quiz_fails() {
        let mut session = session();
        assert!(matches!(
            QuizController.resolve(&mut session, "answer"),
            Err(QuizError::NotInterrupted)
        ));
    }

    #[test]
    fn completed_checkpoint_cannot_interrupt_again() {
        let quiz = QuizController;
        let mut session = session();
        quiz.interrupt(&mut session, CheckpointId::new(1)).unwrap();
        quiz.resolve(&mut session, "done").unwrap();

        assert!(matches!(
            quiz.interrupt(&mut session, CheckpointId::new(1)),
            Err(QuizError::AlreadyCompleted(_))
        ));
        assert!(matches!(
            quiz.interrupt(&mut session, CheckpointId::new(9)),
            Err(QuizError::UnknownCheckpoint(_))
        ));
    }

    #[test]
    fn evaluation_request_carries_prompt_and_transcript() {
        let quiz = QuizController;
        let mut session = session();
        quiz.interrupt(&mut session, CheckpointId::new(2)).unwrap();

        let request = quiz.evaluation_request(&session, " borrowing ").unwrap();
        assert_eq!(request.question, "Q2");
        assert_eq!(request.answer, "borrowing");
        assert_eq!(request.context, "ownership moves values");
    }
}

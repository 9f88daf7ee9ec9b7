use crate::model::checkpoint::{Checkpoint, CheckpointDraft};
use crate::model::conversation::ConversationHistory;
use crate::model::ids::{Epoch, SessionId};
use crate::model::playback::{PlaybackState, QuizState};
use crate::model::registry::{CheckpointRegistry, RejectedCheckpoint};
use crate::model::snapshot::{Snapshot, VisualContext};
use crate::model::video::VideoSource;

pub const PLACEHOLDER_READY: &str = "Start typing here...";
pub const PLACEHOLDER_QUIZ_ACTIVE: &str = "Please complete the quiz first...";

/// Transcript, summary and checkpoints produced for one video.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct VideoAnalysis {
    pub transcript: String,
    pub summary: String,
    pub checkpoints: Vec<CheckpointDraft>,
}

/// Everything that belongs to one loaded video.
///
/// Loading another video builds a fresh `Session` with a newer epoch; nothing is
/// carried over.
#[derive(Debug, Clone)]
pub struct Session {
    id: SessionId,
    epoch: Epoch,
    source: Option<VideoSource>,
    transcript: String,
    summary: String,
    registry: CheckpointRegistry,
    playback: PlaybackState,
    visual: VisualContext,
    history: ConversationHistory,
    asking: bool,
    banner: Option<String>,
}

impl Default for Session {
    fn default() -> Self {
        Self::empty()
    }
}

impl Session {
    /// The session that exists before any video is loaded.
    #[must_use]
    pub fn empty() -> Self {
        Self {
            id: SessionId::random(),
            epoch: Epoch::INITIAL,
            source: None,
            transcript: String::new(),
            summary: String::new(),
            registry: CheckpointRegistry::new(),
            playback: PlaybackState::new(),
            visual: VisualContext::new(),
            history: ConversationHistory::new(),
            asking: false,
            banner: None,
        }
    }

    /// Build the session for a freshly analysed video.
    ///
    /// Returns the checkpoint drafts that failed validation alongside the session.
    #[must_use]
    pub fn loaded(
        epoch: Epoch,
        source: VideoSource,
        analysis: VideoAnalysis,
        default_snapshot: Option<Snapshot>,
    ) -> (Self, Vec<RejectedCheckpoint>) {
        let mut session = Self::empty();
        session.epoch = epoch;
        session.source = Some(source);
        session.transcript = analysis.transcript;
        session.summary = analysis.summary;
        let rejected = session.registry.load(analysis.checkpoints);
        if let Some(snapshot) = default_snapshot {
            session.visual.set_default(snapshot);
        }
        (session, rejected)
    }

    #[must_use]
    pub fn id(&self) -> SessionId {
        self.id
    }

    #[must_use]
    pub fn epoch(&self) -> Epoch {
        self.epoch
    }

    #[must_use]
    pub fn source(&self) -> Option<&VideoSource> {
        self.source.as_ref()
    }

    #[must_use]
    pub fn transcript(&self) -> &str {
        &self.transcript
    }

    #[must_use]
    pub fn summary(&self) -> &str {
        &self.summary
    }

    #[must_use]
    pub fn registry(&self) -> &CheckpointRegistry {
        &self.registry
    }

    pub fn registry_mut(&mut self) -> &mut CheckpointRegistry {
        &mut self.registry
    }

    #[must_use]
    pub fn playback(&self) -> &PlaybackState {
        &self.playback
    }

    pub fn playback_mut(&mut self) -> &mut PlaybackState {
        &mut self.playback
    }

    #[must_use]
    pub fn visual(&self) -> &VisualContext {
        &self.visual
    }

    pub fn visual_mut(&mut self) -> &mut VisualContext {
        &mut self.visual
    }

    #[must_use]
    pub fn history(&self) -> &ConversationHistory {
        &self.history
    }

    pub fn history_mut(&mut self) -> &mut ConversationHistory {
        &mut self.history
    }

    #[must_use]
    pub fn quiz_state(&self) -> QuizState {
        self.playback.state()
    }

    #[must_use]
    pub fn is_interrupted(&self) -> bool {
        self.playback.is_interrupted()
    }

    /// The checkpoint currently holding playback, if any.
    #[must_use]
    pub fn active_checkpoint(&self) -> Option<&Checkpoint> {
        self.playback
            .active_checkpoint()
            .and_then(|id| self.registry.get(id))
    }

    /// True while a chat request is in flight.
    #[must_use]
    pub fn is_asking(&self) -> bool {
        self.asking
    }

    pub fn set_asking(&mut self, asking: bool) {
        self.asking = asking;
    }

    #[must_use]
    pub fn banner(&self) -> Option<&str> {
        self.banner.as_deref()
    }

    pub fn set_banner(&mut self, message: impl Into<String>) {
        self.banner = Some(message.into());
    }

    pub fn clear_banner(&mut self) {
        self.banner = None;
    }

    /// Whether the chat input accepts a new question right now.
    #[must_use]
    pub fn input_enabled(&self) -> bool {
        !self.asking && !self.is_interrupted()
    }

    #[must_use]
    pub fn input_placeholder(&self) -> &'static str {
        if self.is_interrupted() {
            PLACEHOLDER_QUIZ_ACTIVE
        } else {
            PLACEHOLDER_READY
        }
    }
}

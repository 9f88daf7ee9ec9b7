use tracing::trace;

use tutor_core::model::{Checkpoint, CheckpointId, PlaybackSample, Session};

use crate::config::DEFAULT_CHECKPOINT_TOLERANCE;

/// Watches playback samples for checkpoint crossings.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlaybackMonitor {
    tolerance: f64,
}

impl Default for PlaybackMonitor {
    fn default() -> Self {
        Self::new(DEFAULT_CHECKPOINT_TOLERANCE)
    }
}

impl PlaybackMonitor {
    /// `tolerance` is in percentage points of the video's duration.
    #[must_use]
    pub fn new(tolerance: f64) -> Self {
        Self { tolerance }
    }

    /// Record a sample and return the checkpoint it crosses, if any.
    ///
    /// Samples are ignored while a quiz holds playback and while the duration is
    /// unknown. The first eligible checkpoint in list order wins.
    pub fn observe(&self, session: &mut Session, sample: PlaybackSample) -> Option<CheckpointId> {
        if session.is_interrupted() {
            trace!(current_time = sample.current_time, "sample ignored during quiz");
            return None;
        }
        let Some(progress) = sample.progress() else {
            trace!(duration = sample.duration, "sample ignored, duration unknown");
            return None;
        };

        session.playback_mut().record_progress(progress);

        let active = session.playback().active_checkpoint();
        let registry = session.registry();
        registry
            .checkpoints()
            .iter()
            .find(|c| {
                c.is_within(progress, self.tolerance)
                    && Some(c.id()) != active
                    && !registry.is_completed(c.id())
            })
            .map(Checkpoint::id)
    }
}

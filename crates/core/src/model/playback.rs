use crate::model::ids::CheckpointId;

/// One sampled `timeupdate` from the media element.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlaybackSample {
    pub current_time: f64,
    pub duration: f64,
}

impl PlaybackSample {
    #[must_use]
    pub fn new(current_time: f64, duration: f64) -> Self {
        Self {
            current_time,
            duration,
        }
    }

    /// Progress in percent, or `None` while the duration is unknown.
    #[must_use]
    pub fn progress(&self) -> Option<f64> {
        if !self.duration.is_finite() || self.duration <= 0.0 || !self.current_time.is_finite()
        {
            return None;
        }
        Some(self.current_time / self.duration * 100.0)
    }
}

/// Whether playback is free to run or held for a quiz.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuizState {
    Running,
    Interrupted(CheckpointId),
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct PlaybackState {
    current_position: f64,
    is_playing: bool,
    active_checkpoint: Option<CheckpointId>,
}

impl PlaybackState {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn current_position(&self) -> f64 {
        self.current_position
    }

    #[must_use]
    pub fn is_playing(&self) -> bool {
        self.is_playing
    }

    #[must_use]
    pub fn active_checkpoint(&self) -> Option<CheckpointId> {
        self.active_checkpoint
    }

    #[must_use]
    pub fn state(&self) -> QuizState {
        match self.active_checkpoint {
            Some(id) => QuizState::Interrupted(id),
            None => QuizState::Running,
        }
    }

    #[must_use]
    pub fn is_interrupted(&self) -> bool {
        self.active_checkpoint.is_some()
    }

    /// Positions are frozen while a quiz is active; the call is ignored then.
    pub fn record_progress(&mut self, progress: f64) {
        if self.active_checkpoint.is_none() {
            self.current_position = progress;
            self.is_playing = true;
        }
    }

    pub fn set_playing(&mut self, playing: bool) {
        self.is_playing = playing;
    }

    pub fn interrupt(&mut self, id: CheckpointId) {
        self.active_checkpoint = Some(id);
        self.is_playing = false;
    }

    /// Clears the active checkpoint and returns it.
    pub fn resume(&mut self) -> Option<CheckpointId> {
        let resolved = self.active_checkpoint.take();
        if resolved.is_some() {
            self.is_playing = true;
        }
        resolved
    }
}

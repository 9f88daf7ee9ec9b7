use std::collections::BTreeSet;

use thiserror::Error;

use crate::model::checkpoint::{Checkpoint, CheckpointDraft, CheckpointError};
use crate::model::ids::CheckpointId;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum RegistryError {
    #[error("unknown checkpoint {0}")]
    UnknownCheckpoint(CheckpointId),
}

/// A draft that failed validation during `CheckpointRegistry::load`.
#[derive(Debug, Clone, PartialEq)]
pub struct RejectedCheckpoint {
    pub draft: CheckpointDraft,
    pub error: CheckpointError,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MarkerStatus {
    Pending,
    Completed,
}

/// One progress-bar marker per checkpoint.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TimelineMarker {
    pub checkpoint_id: CheckpointId,
    pub position: f64,
    pub status: MarkerStatus,
}

/// Ordered checkpoints of the loaded video plus the set already resolved.
///
/// The completion set only grows. Lookups go through `CheckpointId`; list order is
/// kept as received and is what the playback monitor uses to break ties.
#[derive(Debug, Clone, Default)]
pub struct CheckpointRegistry {
    checkpoints: Vec<Checkpoint>,
    completed: BTreeSet<CheckpointId>,
}

impl CheckpointRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace every checkpoint and forget all completions.
    ///
    /// Ids are assigned in ingestion order starting at 1. Invalid drafts are skipped
    /// and handed back so the caller can report them.
    pub fn load(
        &mut self,
        drafts: impl IntoIterator<Item = CheckpointDraft>,
    ) -> Vec<RejectedCheckpoint> {
        self.checkpoints.clear();
        self.completed.clear();

        let mut rejected = Vec::new();
        let mut next_id = 1_u64;
        for draft in drafts {
            match draft.clone().validate(CheckpointId::new(next_id)) {
                Ok(checkpoint) => {
                    self.checkpoints.push(checkpoint);
                    next_id += 1;
                }
                Err(error) => rejected.push(RejectedCheckpoint { draft, error }),
            }
        }
        rejected
    }

    #[must_use]
    pub fn checkpoints(&self) -> &[Checkpoint] {
        &self.checkpoints
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.checkpoints.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.checkpoints.is_empty()
    }

    #[must_use]
    pub fn get(&self, id: CheckpointId) -> Option<&Checkpoint> {
        self.checkpoints.iter().find(|c| c.id() == id)
    }

    #[must_use]
    pub fn is_completed(&self, id: CheckpointId) -> bool {
        self.completed.contains(&id)
    }

    /// Mark a checkpoint as resolved.
    ///
    /// Returns `true` when the checkpoint was newly completed and `false` when it was
    /// already complete.
    ///
    /// # Errors
    ///
    /// Returns `RegistryError::UnknownCheckpoint` if the id is not loaded.
    pub fn complete(&mut self, id: CheckpointId) -> Result<bool, RegistryError> {
        if self.get(id).is_none() {
            return Err(RegistryError::UnknownCheckpoint(id));
        }
        Ok(self.completed.insert(id))
    }

    #[must_use]
    pub fn completed_count(&self) -> usize {
        self.completed.len()
    }

    /// Positions of the resolved checkpoints, in list order.
    #[must_use]
    pub fn completed_positions(&self) -> Vec<f64> {
        self.checkpoints
            .iter()
            .filter(|c| self.completed.contains(&c.id()))
            .map(Checkpoint::position)
            .collect()
    }

    #[must_use]
    pub fn markers(&self) -> Vec<TimelineMarker> {
        self.checkpoints
            .iter()
            .map(|c| TimelineMarker {
                checkpoint_id: c.id(),
                position: c.position(),
                status: if self.completed.contains(&c.id()) {
                    MarkerStatus::Completed
                } else {
                    MarkerStatus::Pending
                },
            })
            .collect()
    }
}

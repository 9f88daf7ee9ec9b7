mod checkpoint;
mod conversation;
mod ids;
mod playback;
mod registry;
mod session;
mod snapshot;
mod video;

pub use checkpoint::{Checkpoint, CheckpointDraft, CheckpointError, POSITION_MAX, POSITION_MIN};
pub use conversation::{ConversationHistory, ERROR_PREFIX, Message, Role};
pub use ids::{CheckpointId, Epoch, SessionId};
pub use playback::{PlaybackSample, PlaybackState, QuizState};
pub use registry::{
    CheckpointRegistry, MarkerStatus, RegistryError, RejectedCheckpoint, TimelineMarker,
};
pub use session::{PLACEHOLDER_QUIZ_ACTIVE, PLACEHOLDER_READY, Session, VideoAnalysis};
pub use snapshot::{Snapshot, SnapshotError, SnapshotOrigin, VisualContext};
pub use video::{HostedVideo, LocalVideo, VideoSource, VideoSourceError};

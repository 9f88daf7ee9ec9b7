use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, warn};

use tutor_core::Clock;
use tutor_core::model::{Snapshot, SnapshotOrigin, VisualContext};

use crate::config::DEFAULT_FRAME_DELAY;
use crate::frame::FrameSource;

/// Turns frames into snapshots. Capture never fails loudly: problems are logged and
/// `None` comes back, so the caller keeps whatever it had.
#[derive(Clone)]
pub struct SnapshotCapturer {
    source: Arc<dyn FrameSource>,
    clock: Clock,
    settle_delay: Duration,
}

impl SnapshotCapturer {
    #[must_use]
    pub fn new(source: Arc<dyn FrameSource>, clock: Clock) -> Self {
        Self {
            source,
            clock,
            settle_delay: DEFAULT_FRAME_DELAY,
        }
    }

    /// Time to wait after a local video is attached before grabbing its first frame.
    #[must_use]
    pub fn with_settle_delay(mut self, delay: Duration) -> Self {
        self.settle_delay = delay;
        self
    }

    pub async fn capture_default(&self) -> Option<Snapshot> {
        tokio::time::sleep(self.settle_delay).await;
        self.capture(SnapshotOrigin::Default).await
    }

    pub async fn capture_on_pause(&self) -> Option<Snapshot> {
        self.capture(SnapshotOrigin::Pause).await
    }

    async fn capture(&self, origin: SnapshotOrigin) -> Option<Snapshot> {
        let bytes = match self.source.current_frame().await {
            Ok(Some(bytes)) => bytes,
            Ok(None) => {
                debug!(?origin, "no frame rendered yet");
                return None;
            }
            Err(err) => {
                warn!(?origin, error = %err, "snapshot capture failed");
                return None;
            }
        };

        match Snapshot::new(bytes, self.clock.now(), origin) {
            Ok(snapshot) => {
                debug!(?origin, bytes = snapshot.payload().len(), "snapshot captured");
                Some(snapshot)
            }
            Err(err) => {
                warn!(?origin, error = %err, "discarding snapshot");
                None
            }
        }
    }
}

/// File a snapshot under the slot its origin belongs to.
pub fn store(visual: &mut VisualContext, snapshot: Snapshot) {
    match snapshot.origin() {
        SnapshotOrigin::Default => visual.set_default(snapshot),
        SnapshotOrigin::Pause => visual.replace_current(snapshot),
    }
}

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use async_trait::async_trait;

use crate::error::FrameError;

/// Access to whatever frame is on screen right now.
#[async_trait]
pub trait FrameSource: Send + Sync {
    /// Encoded image of the current frame, or `None` when nothing is rendered yet.
    async fn current_frame(&self) -> Result<Option<Vec<u8>>, FrameError>;
}

/// Reads the current frame from an image file that a player keeps up to date.
#[derive(Debug, Clone)]
pub struct FileFrameSource {
    path: PathBuf,
}

impl FileFrameSource {
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl FrameSource for FileFrameSource {
    async fn current_frame(&self) -> Result<Option<Vec<u8>>, FrameError> {
        match tokio::fs::read(&self.path).await {
            Ok(bytes) if bytes.is_empty() => Ok(None),
            Ok(bytes) => Ok(Some(bytes)),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(None),
            Err(err) => Err(err.into()),
        }
    }
}

/// Source for setups with no rendered video, such as a headless shell.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoFrameSource;

#[async_trait]
impl FrameSource for NoFrameSource {
    async fn current_frame(&self) -> Result<Option<Vec<u8>>, FrameError> {
        Ok(None)
    }
}

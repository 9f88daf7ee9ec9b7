use std::path::{Path, PathBuf};

use thiserror::Error;
use url::Url;

//
// ─── ERRORS (input validation) ─────────────────────────────────────────────────
//

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum VideoSourceError {
    #[error("video reference cannot be empty")]
    Empty,

    #[error("not a recognized video URL: {raw}")]
    UnsupportedUrl { raw: String },

    #[error("could not extract a video id from {raw}")]
    MissingVideoId { raw: String },
}

//
// ─── HOSTED VIDEO ──────────────────────────────────────────────────────────────
//

const WATCH_HOST: &str = "youtube.com";
const SHORT_HOST: &str = "youtu.be";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HostedVideo {
    url: Url,
    video_id: String,
}

impl HostedVideo {
    /// Parse a pasted video link. A missing scheme is treated as `https`.
    ///
    /// # Errors
    ///
    /// Returns `VideoSourceError` if the input is blank, is not a link to a
    /// supported host, or carries no video id.
    pub fn parse(raw: &str) -> Result<Self, VideoSourceError> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(VideoSourceError::Empty);
        }

        let unsupported = || VideoSourceError::UnsupportedUrl {
            raw: trimmed.to_owned(),
        };

        let candidate = if trimmed.contains("://") {
            trimmed.to_owned()
        } else {
            format!("https://{trimmed}")
        };
        let url = Url::parse(&candidate).map_err(|_| unsupported())?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(unsupported());
        }

        let host = url.host_str().ok_or_else(unsupported)?;
        let host = host
            .strip_prefix("www.")
            .or_else(|| host.strip_prefix("m."))
            .unwrap_or(host);

        let video_id = match host {
            SHORT_HOST => first_segment(&url),
            WATCH_HOST => watch_video_id(&url),
            _ => return Err(unsupported()),
        };

        let video_id = video_id
            .filter(|id| !id.is_empty())
            .ok_or_else(|| VideoSourceError::MissingVideoId {
                raw: trimmed.to_owned(),
            })?;

        Ok(Self { url, video_id })
    }

    #[must_use]
    pub fn url(&self) -> &Url {
        &self.url
    }

    #[must_use]
    pub fn video_id(&self) -> &str {
        &self.video_id
    }
}

fn first_segment(url: &Url) -> Option<String> {
    url.path_segments()?
        .next()
        .map(str::to_owned)
}

fn watch_video_id(url: &Url) -> Option<String> {
    let mut segments = url.path_segments()?;
    match segments.next()? {
        "watch" => url
            .query_pairs()
            .find(|(key, _)| key == "v")
            .map(|(_, value)| value.into_owned()),
        "embed" | "v" | "shorts" => segments.next().map(str::to_owned),
        _ => None,
    }
}

//
// ─── LOCAL VIDEO ───────────────────────────────────────────────────────────────
//

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocalVideo {
    path: PathBuf,
}

impl LocalVideo {
    /// # Errors
    ///
    /// Returns `VideoSourceError::Empty` for an empty path.
    pub fn from_path(path: impl Into<PathBuf>) -> Result<Self, VideoSourceError> {
        let path = path.into();
        if path.as_os_str().is_empty() {
            return Err(VideoSourceError::Empty);
        }
        Ok(Self { path })
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// File name used when uploading the video.
    #[must_use]
    pub fn file_name(&self) -> String {
        self.path
            .file_name()
            .map_or_else(|| "video".to_owned(), |n| n.to_string_lossy().into_owned())
    }
}

//
// ─── SOURCE ────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VideoSource {
    Hosted(HostedVideo),
    Local(LocalVideo),
}

impl VideoSource {
    #[must_use]
    pub fn is_local(&self) -> bool {
        matches!(self, VideoSource::Local(_))
    }

    #[must_use]
    pub fn describe(&self) -> String {
        match self {
            VideoSource::Hosted(video) => format!("hosted:{}", video.video_id()),
            VideoSource::Local(video) => format!("local:{}", video.path().display()),
        }
    }
}

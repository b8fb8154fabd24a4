use glean_http::HttpError;
use thiserror::Error;

/// Failures talking to the Data API.
#[derive(Debug, Error)]
pub enum YoutubeError {
    #[error("youtube api request failed: {0}")]
    Http(#[from] HttpError),
}

/// Why a video produced no transcript. Always scoped to a single video.
#[derive(Debug, Error)]
pub enum TranscriptError {
    #[error("captions are disabled for {video_id}")]
    Disabled { video_id: String },
    #[error("no caption tracks available for {video_id}")]
    NoTracks { video_id: String },
    #[error("video {video_id} is unavailable: {reason}")]
    VideoUnavailable { video_id: String, reason: String },
    #[error("caption requests for {video_id} are being throttled")]
    RateLimited { video_id: String },
    #[error("could not parse caption data: {0}")]
    Parse(String),
    #[error("caption request failed: {0}")]
    Http(#[from] HttpError),
}

impl TranscriptError {
    /// Disabled or missing captions are ordinary outcomes, not faults.
    pub fn is_expected(&self) -> bool {
        matches!(
            self,
            TranscriptError::Disabled { .. } | TranscriptError::NoTracks { .. }
        )
    }
}

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("failed to write output: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to encode csv: {0}")]
    Csv(#[from] csv::Error),
}

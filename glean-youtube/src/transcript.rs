use crate::captions::{CaptionTrack, TranscriptSource};
use crate::error::TranscriptError;
use crate::types::{TranscriptRecord, VideoReference};
use tracing::{error, info, warn};

/// How a track was picked by [`select_track`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrackChoice {
    /// Matched one of the preferred languages.
    Preferred,
    /// No preferred language available; first listed track used instead.
    Fallback,
}

/// Walk the preferences in order; for each language a manual track beats a
/// generated one. Without any match the first listed track is used.
///
/// ```
/// use glean_youtube::CaptionTrack;
/// use glean_youtube::transcript::{select_track, TrackChoice};
///
/// let track = |lang: &str, generated| CaptionTrack {
///     video_id: "v".into(),
///     language_code: lang.into(),
///     language_name: lang.into(),
///     is_generated: generated,
///     base_url: String::new(),
/// };
/// let tracks = vec![track("en", true), track("en", false), track("fr", false)];
/// let prefs = vec!["ja".to_string(), "en".to_string()];
///
/// let (picked, how) = select_track(&tracks, &prefs).unwrap();
/// assert_eq!(picked.language_code, "en");
/// assert!(!picked.is_generated);
/// assert_eq!(how, TrackChoice::Preferred);
/// ```
pub fn select_track<'a>(
    tracks: &'a [CaptionTrack],
    preferences: &[String],
) -> Option<(&'a CaptionTrack, TrackChoice)> {
    for lang in preferences {
        let mut candidates = tracks
            .iter()
            .filter(|t| t.language_code.eq_ignore_ascii_case(lang));
        let first = candidates.clone().find(|t| !t.is_generated);
        if let Some(track) = first.or_else(|| candidates.next()) {
            return Some((track, TrackChoice::Preferred));
        }
    }
    tracks.first().map(|t| (t, TrackChoice::Fallback))
}

/// Fetches one transcript per video from a [`TranscriptSource`].
pub struct TranscriptFetcher<S> {
    source: S,
    languages: Vec<String>,
}

impl<S: TranscriptSource> TranscriptFetcher<S> {
    pub fn new(source: S, languages: Vec<String>) -> Self {
        Self { source, languages }
    }

    pub async fn try_fetch(
        &self,
        video: &VideoReference,
    ) -> Result<TranscriptRecord, TranscriptError> {
        let tracks = self.source.list_tracks(&video.id).await?;
        let (track, choice) =
            select_track(&tracks, &self.languages).ok_or_else(|| TranscriptError::NoTracks {
                video_id: video.id.clone(),
            })?;

        if choice == TrackChoice::Fallback {
            info!(
                event = "harvest.transcript.fallback",
                video_id = %video.id,
                wanted = ?self.languages,
                language = %track.language_code,
                "no preferred language; using first available track"
            );
        }

        let segments = self.source.fetch_segments(track).await?;
        Ok(TranscriptRecord {
            video: video.clone(),
            text: segments.join(" "),
            language_code: track.language_code.clone(),
            is_generated: track.is_generated,
        })
    }

    /// Like [`Self::try_fetch`] but a failure is logged and becomes `None`.
    pub async fn fetch(&self, video: &VideoReference) -> Option<TranscriptRecord> {
        match self.try_fetch(video).await {
            Ok(record) => Some(record),
            Err(e) if e.is_expected() => {
                warn!(
                    event = "harvest.video.skipped",
                    video_id = %video.id,
                    reason = %e,
                    "no transcript"
                );
                None
            }
            Err(e) => {
                error!(
                    event = "harvest.video.failed",
                    video_id = %video.id,
                    error = %e,
                    "transcript fetch failed"
                );
                None
            }
        }
    }
}

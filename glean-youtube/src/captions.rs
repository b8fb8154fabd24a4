//! Caption track discovery and download.
//!
//! [`InnertubeCaptions`] follows the same path the watch page does: scrape the
//! innertube API key from `/watch`, ask the `player` endpoint for the caption
//! track list, then download the chosen track as `json3`.
use crate::cookies::CookieJar;
use crate::error::TranscriptError;
use async_trait::async_trait;
use glean_http::{Auth, HttpClient, HttpError, RequestOpts};
use quick_xml::Reader;
use quick_xml::events::Event;
use regex::Regex;
use reqwest::header::{ACCEPT_LANGUAGE, COOKIE, HeaderMap, HeaderValue};
use serde_json::{Value, json};
use std::borrow::Cow;
use std::sync::OnceLock;
use tracing::debug;
use url::Url;

pub const YOUTUBE_WEB_BASE: &str = "https://www.youtube.com/";

const INNERTUBE_CLIENT_NAME: &str = "ANDROID";
const INNERTUBE_CLIENT_VERSION: &str = "20.10.38";
const RECAPTCHA_MARKER: &str = "class=\"g-recaptcha\"";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CaptionTrack {
    pub video_id: String,
    pub language_code: String,
    pub language_name: String,
    /// Automatic speech recognition track.
    pub is_generated: bool,
    pub base_url: String,
}

/// Lists and downloads caption tracks for one video at a time.
#[async_trait]
pub trait TranscriptSource: Send + Sync {
    async fn list_tracks(&self, video_id: &str) -> Result<Vec<CaptionTrack>, TranscriptError>;

    /// Ordered text segments of `track`.
    async fn fetch_segments(&self, track: &CaptionTrack) -> Result<Vec<String>, TranscriptError>;
}

pub struct InnertubeCaptions {
    http: HttpClient,
    cookie_header: Option<HeaderValue>,
}

impl InnertubeCaptions {
    pub fn new() -> Result<Self, TranscriptError> {
        Self::with_base(YOUTUBE_WEB_BASE)
    }

    pub fn with_base(base: &str) -> Result<Self, TranscriptError> {
        Ok(Self::with_http(HttpClient::new(base)?))
    }

    pub fn with_http(http: HttpClient) -> Self {
        Self {
            http,
            cookie_header: None,
        }
    }

    /// Send the jar's youtube.com cookies with every caption request.
    pub fn with_cookies(mut self, jar: &CookieJar) -> Self {
        self.cookie_header = jar
            .header_for("www.youtube.com")
            .and_then(|h| HeaderValue::from_str(&h).ok());
        self
    }

    fn headers(&self) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT_LANGUAGE, HeaderValue::from_static("en-US"));
        if let Some(cookie) = &self.cookie_header {
            headers.insert(COOKIE, cookie.clone());
        }
        headers
    }

    async fn innertube_key(&self, video_id: &str) -> Result<String, TranscriptError> {
        let html = self
            .http
            .get_text(
                "watch",
                RequestOpts {
                    headers: Some(self.headers()),
                    query: Some(vec![("v", Cow::Borrowed(video_id))]),
                    ..Default::default()
                },
            )
            .await
            .map_err(|e| map_http(video_id, e))?;

        if html.contains(RECAPTCHA_MARKER) {
            return Err(TranscriptError::RateLimited {
                video_id: video_id.to_string(),
            });
        }
        extract_api_key(&html)
            .ok_or_else(|| TranscriptError::Parse("innertube api key not found in watch page".into()))
    }
}

#[async_trait]
impl TranscriptSource for InnertubeCaptions {
    async fn list_tracks(&self, video_id: &str) -> Result<Vec<CaptionTrack>, TranscriptError> {
        let key = self.innertube_key(video_id).await?;
        let body = json!({
            "context": {
                "client": {
                    "clientName": INNERTUBE_CLIENT_NAME,
                    "clientVersion": INNERTUBE_CLIENT_VERSION,
                }
            },
            "videoId": video_id,
        });
        let player: Value = self
            .http
            .post_json_opts(
                "youtubei/v1/player",
                &body,
                RequestOpts {
                    headers: Some(self.headers()),
                    auth: Some(Auth::Query {
                        name: "key",
                        value: Cow::Owned(key),
                    }),
                    ..Default::default()
                },
            )
            .await
            .map_err(|e| map_http(video_id, e))?;

        let tracks = parse_player_tracks(video_id, &player)?;
        debug!(
            event = "harvest.transcript.tracks",
            video_id = %video_id,
            count = tracks.len(),
            "listed caption tracks"
        );
        Ok(tracks)
    }

    async fn fetch_segments(&self, track: &CaptionTrack) -> Result<Vec<String>, TranscriptError> {
        let url = json3_url(&track.base_url)?;
        let body = self
            .http
            .get_text(
                url.as_str(),
                RequestOpts {
                    headers: Some(self.headers()),
                    allow_absolute: true,
                    ..Default::default()
                },
            )
            .await
            .map_err(|e| map_http(&track.video_id, e))?;
        parse_caption_body(&body)
    }
}

fn map_http(video_id: &str, err: HttpError) -> TranscriptError {
    match err.status().map(|s| s.as_u16()) {
        Some(429) => TranscriptError::RateLimited {
            video_id: video_id.to_string(),
        },
        _ => TranscriptError::Http(err),
    }
}

fn extract_api_key(html: &str) -> Option<String> {
    static KEY_RE: OnceLock<Regex> = OnceLock::new();
    let re = KEY_RE.get_or_init(|| {
        Regex::new(r#""INNERTUBE_API_KEY":\s*"([A-Za-z0-9_-]+)""#).expect("static regex")
    });
    re.captures(html).map(|c| c[1].to_string())
}

/// Read the caption track list out of a `player` response.
fn parse_player_tracks(video_id: &str, player: &Value) -> Result<Vec<CaptionTrack>, TranscriptError> {
    let playability = &player["playabilityStatus"];
    if let Some(status) = playability["status"].as_str() {
        if status != "OK" {
            let reason = playability["reason"]
                .as_str()
                .unwrap_or(status)
                .to_string();
            if reason.contains("not a bot") {
                return Err(TranscriptError::RateLimited {
                    video_id: video_id.to_string(),
                });
            }
            return Err(TranscriptError::VideoUnavailable {
                video_id: video_id.to_string(),
                reason,
            });
        }
    }

    let Some(renderer) = player
        .get("captions")
        .and_then(|c| c.get("playerCaptionsTracklistRenderer"))
    else {
        return Err(TranscriptError::Disabled {
            video_id: video_id.to_string(),
        });
    };

    let tracks: Vec<CaptionTrack> = renderer["captionTracks"]
        .as_array()
        .map(|arr| {
            arr.iter()
                .filter_map(|t| {
                    let base_url = t["baseUrl"].as_str()?.replace("&fmt=srv3", "");
                    let language_code = t["languageCode"].as_str()?.to_string();
                    let language_name = t["name"]["simpleText"]
                        .as_str()
                        .or_else(|| t["name"]["runs"][0]["text"].as_str())
                        .unwrap_or(&language_code)
                        .to_string();
                    Some(CaptionTrack {
                        video_id: video_id.to_string(),
                        is_generated: t["kind"].as_str() == Some("asr"),
                        language_code,
                        language_name,
                        base_url,
                    })
                })
                .collect()
        })
        .unwrap_or_default();

    if tracks.is_empty() {
        return Err(TranscriptError::NoTracks {
            video_id: video_id.to_string(),
        });
    }
    Ok(tracks)
}

fn json3_url(base_url: &str) -> Result<Url, TranscriptError> {
    let mut url =
        Url::parse(base_url).map_err(|e| TranscriptError::Parse(format!("caption url: {e}")))?;
    let kept: Vec<(String, String)> = url
        .query_pairs()
        .filter(|(k, _)| k != "fmt")
        .map(|(k, v)| (k.into_owned(), v.into_owned()))
        .collect();
    url.query_pairs_mut()
        .clear()
        .extend_pairs(kept)
        .append_pair("fmt", "json3");
    Ok(url)
}

/// Segments from a `json3` payload, or from the legacy timed-text XML when the
/// server ignores the format request.
fn parse_caption_body(body: &str) -> Result<Vec<String>, TranscriptError> {
    let trimmed = body.trim_start();
    if trimmed.starts_with('<') {
        return parse_timedtext_xml(trimmed);
    }
    if trimmed.is_empty() {
        return Ok(Vec::new());
    }

    let doc: Value = serde_json::from_str(trimmed)
        .map_err(|e| TranscriptError::Parse(format!("json3 caption payload: {e}")))?;
    let segments = doc["events"]
        .as_array()
        .map(|events| {
            events
                .iter()
                .filter_map(|ev| {
                    let text: String = ev["segs"]
                        .as_array()?
                        .iter()
                        .filter_map(|s| s["utf8"].as_str())
                        .collect();
                    let text = text.split_whitespace().collect::<Vec<_>>().join(" ");
                    (!text.is_empty()).then_some(text)
                })
                .collect()
        })
        .unwrap_or_default();
    Ok(segments)
}

fn parse_timedtext_xml(xml: &str) -> Result<Vec<String>, TranscriptError> {
    let xml_err = |e: quick_xml::Error| TranscriptError::Parse(format!("timedtext xml: {e}"));
    let mut reader = Reader::from_str(xml);
    let mut segments = Vec::new();
    // Text of the `<text>` element being read, if any.
    let mut current: Option<String> = None;
    loop {
        match reader.read_event().map_err(xml_err)? {
            Event::Start(e) if e.local_name().as_ref() == b"text" => current = Some(String::new()),
            Event::Text(t) => {
                if let Some(buf) = current.as_mut() {
                    buf.push_str(&t.unescape().map_err(xml_err)?);
                }
            }
            Event::CData(c) => {
                if let Some(buf) = current.as_mut() {
                    buf.push_str(&String::from_utf8_lossy(&c));
                }
            }
            Event::End(e) if e.local_name().as_ref() == b"text" => {
                if let Some(raw) = current.take() {
                    let text = raw.split_whitespace().collect::<Vec<_>>().join(" ");
                    if !text.is_empty() {
                        segments.push(text);
                    }
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }
    Ok(segments)
}

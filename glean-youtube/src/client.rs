//! Thin wrapper over the YouTube Data API v3 list endpoints.
//!
//! Every call is a single request; pagination and batching live in
//! [`crate::resolve`]. The API key travels as the `key` query parameter and is
//! redacted from request logs by the shared HTTP client.
use crate::error::YoutubeError;
use crate::types::{
    ChannelResource, ListResponse, PlaylistItemResource, SearchResult, VideoResource,
};
use glean_http::{Auth, HttpClient, RequestOpts};
use std::borrow::Cow;

pub const YOUTUBE_API_BASE: &str = "https://www.googleapis.com/youtube/v3/";

/// Largest `maxResults` the list endpoints accept.
pub const MAX_PAGE_SIZE: usize = 50;

/// Largest number of ids a single `videos` call may carry.
pub const MAX_IDS_PER_REQUEST: usize = 50;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchKind {
    Video,
    Channel,
}

impl SearchKind {
    fn as_param(self) -> &'static str {
        match self {
            SearchKind::Video => "video",
            SearchKind::Channel => "channel",
        }
    }
}

#[derive(Clone)]
pub struct YouTubeApi {
    http: HttpClient,
    api_key: String,
}

impl YouTubeApi {
    pub fn new(api_key: impl Into<String>) -> Result<Self, YoutubeError> {
        Self::with_base(YOUTUBE_API_BASE, api_key)
    }

    /// Point the client at another base URL (a mock server, a proxy).
    pub fn with_base(base: &str, api_key: impl Into<String>) -> Result<Self, YoutubeError> {
        Ok(Self::with_http(api_http(base)?, api_key))
    }

    pub fn with_http(http: HttpClient, api_key: impl Into<String>) -> Self {
        Self {
            http,
            api_key: api_key.into(),
        }
    }

    fn opts<'a>(&'a self, query: Vec<(&'a str, Cow<'a, str>)>) -> RequestOpts<'a> {
        RequestOpts {
            auth: Some(Auth::Query {
                name: "key",
                value: Cow::Borrowed(&self.api_key),
            }),
            query: Some(query),
            ..Default::default()
        }
    }

    /// `videos?part=snippet,contentDetails&id=a,b,c`. Callers keep `ids` within
    /// [`MAX_IDS_PER_REQUEST`].
    pub async fn videos(&self, ids: &[String]) -> Result<ListResponse<VideoResource>, YoutubeError> {
        let query = vec![
            ("part", Cow::Borrowed("snippet,contentDetails")),
            ("id", Cow::Owned(ids.join(","))),
        ];
        Ok(self.http.get_json("videos", self.opts(query)).await?)
    }

    pub async fn playlist_items(
        &self,
        playlist_id: &str,
        page_size: usize,
        page_token: Option<&str>,
    ) -> Result<ListResponse<PlaylistItemResource>, YoutubeError> {
        let mut query = vec![
            ("part", Cow::Borrowed("contentDetails")),
            ("playlistId", Cow::Borrowed(playlist_id)),
            ("maxResults", Cow::Owned(clamp_page(page_size).to_string())),
        ];
        if let Some(token) = page_token {
            query.push(("pageToken", Cow::Borrowed(token)));
        }
        Ok(self.http.get_json("playlistItems", self.opts(query)).await?)
    }

    pub async fn channels(
        &self,
        channel_id: &str,
    ) -> Result<ListResponse<ChannelResource>, YoutubeError> {
        let query = vec![
            ("part", Cow::Borrowed("contentDetails")),
            ("id", Cow::Borrowed(channel_id)),
        ];
        Ok(self.http.get_json("channels", self.opts(query)).await?)
    }

    pub async fn search(
        &self,
        q: &str,
        kind: SearchKind,
        page_size: usize,
        page_token: Option<&str>,
    ) -> Result<ListResponse<SearchResult>, YoutubeError> {
        let mut query = vec![
            ("part", Cow::Borrowed("snippet")),
            ("q", Cow::Borrowed(q)),
            ("type", Cow::Borrowed(kind.as_param())),
            ("maxResults", Cow::Owned(clamp_page(page_size).to_string())),
        ];
        if let Some(token) = page_token {
            query.push(("pageToken", Cow::Borrowed(token)));
        }
        Ok(self.http.get_json("search", self.opts(query)).await?)
    }
}

/// HTTP client anchored at `base` as a directory, so `videos` resolves to
/// `<base>/videos` whether or not the configured base ends in `/`.
pub fn api_http(base: &str) -> Result<HttpClient, YoutubeError> {
    let base = if base.ends_with('/') {
        base.to_string()
    } else {
        format!("{base}/")
    };
    Ok(HttpClient::new(&base)?)
}

fn clamp_page(n: usize) -> usize {
    n.clamp(1, MAX_PAGE_SIZE)
}

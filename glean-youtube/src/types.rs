use serde::{Deserialize, Serialize};

/// One page of a Data API list endpoint.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase", bound(deserialize = "T: Deserialize<'de>"))]
pub struct ListResponse<T> {
    #[serde(default)]
    pub items: Vec<T>,
    #[serde(default)]
    pub next_page_token: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VideoResource {
    pub id: String,
    #[serde(default)]
    pub snippet: Option<VideoSnippet>,
    #[serde(default)]
    pub content_details: Option<VideoContentDetails>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct VideoSnippet {
    pub title: String,
    pub published_at: String,
    pub channel_id: Option<String>,
    pub channel_title: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct VideoContentDetails {
    /// ISO 8601 duration such as `PT4M13S`.
    pub duration: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaylistItemResource {
    #[serde(default)]
    pub content_details: Option<PlaylistItemContentDetails>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PlaylistItemContentDetails {
    pub video_id: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChannelResource {
    pub id: String,
    #[serde(default)]
    pub content_details: Option<ChannelContentDetails>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ChannelContentDetails {
    pub related_playlists: Option<RelatedPlaylists>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RelatedPlaylists {
    pub uploads: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchResult {
    pub id: SearchResultId,
    #[serde(default)]
    pub snippet: Option<SearchSnippet>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SearchResultId {
    pub kind: String,
    pub video_id: Option<String>,
    pub channel_id: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SearchSnippet {
    pub channel_id: Option<String>,
    pub title: String,
}

/// A hydrated video. Fields the API left out are empty strings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VideoReference {
    pub id: String,
    pub title: String,
    pub url: String,
    pub publish_date: String,
    pub duration: String,
}

impl VideoReference {
    pub fn watch_url(id: &str) -> String {
        format!("https://www.youtube.com/watch?v={id}")
    }

    /// Bare reference for a known id, without metadata.
    pub fn from_id(id: impl Into<String>) -> Self {
        let id = id.into();
        Self {
            url: Self::watch_url(&id),
            id,
            title: String::new(),
            publish_date: String::new(),
            duration: String::new(),
        }
    }
}

impl From<VideoResource> for VideoReference {
    fn from(res: VideoResource) -> Self {
        let snippet = res.snippet.unwrap_or_default();
        let duration = res
            .content_details
            .and_then(|d| d.duration)
            .unwrap_or_default();
        Self {
            url: Self::watch_url(&res.id),
            id: res.id,
            title: snippet.title,
            publish_date: snippet.published_at,
            duration,
        }
    }
}

/// A video's metadata joined with the text of one caption track.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TranscriptRecord {
    pub video: VideoReference,
    /// Segment texts joined by single spaces.
    pub text: String,
    pub language_code: String,
    pub is_generated: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn list_page_without_items_or_token_is_empty() {
        let page: ListResponse<VideoResource> =
            serde_json::from_str(r#"{"kind":"youtube#videoListResponse"}"#).unwrap();
        assert!(page.items.is_empty());
        assert!(page.next_page_token.is_none());

        let page: ListResponse<SearchResult> =
            serde_json::from_str(r#"{"items":[],"nextPageToken":"CAUQAA"}"#).unwrap();
        assert_eq!(page.next_page_token.as_deref(), Some("CAUQAA"));
    }

    #[test]
    fn video_resource_without_details_maps_to_empty_fields() {
        let res: VideoResource = serde_json::from_str(r#"{"id":"abc"}"#).unwrap();
        let v = VideoReference::from(res);
        assert_eq!(v.url, "https://www.youtube.com/watch?v=abc");
        assert_eq!(v.title, "");
        assert_eq!(v.duration, "");
    }

    #[test]
    fn list_response_tolerates_missing_items() {
        let page: ListResponse<SearchResult> = serde_json::from_str(r#"{"kind":"x"}"#).unwrap();
        assert!(page.items.is_empty());
        assert!(page.next_page_token.is_none());
    }
}

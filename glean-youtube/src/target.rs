//! Classification of free-form user input into a harvest target.
use serde::Serialize;
use std::fmt;
use tracing::debug;
use url::Url;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TargetKind {
    Video,
    Playlist,
    Channel,
    Handle,
    SearchQuery,
}

impl fmt::Display for TargetKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            TargetKind::Video => "video",
            TargetKind::Playlist => "playlist",
            TargetKind::Channel => "channel",
            TargetKind::Handle => "handle",
            TargetKind::SearchQuery => "search",
        };
        f.write_str(s)
    }
}

/// What the user asked for. The identifier is never empty.
///
/// For [`TargetKind::Handle`] the identifier keeps its leading `@` when the
/// input used one; legacy `/c/` and `/user/` names are kept bare.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TargetSpec {
    pub kind: TargetKind,
    pub identifier: String,
}

impl TargetSpec {
    pub fn new(kind: TargetKind, identifier: impl Into<String>) -> Self {
        Self {
            kind,
            identifier: identifier.into(),
        }
    }

    pub fn search(query: impl Into<String>) -> Self {
        Self::new(TargetKind::SearchQuery, query)
    }
}

impl fmt::Display for TargetSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.kind, self.identifier)
    }
}

/// Classify one input string. Never fails: anything unrecognized becomes a
/// search query carrying the input verbatim.
///
/// ```
/// use glean_youtube::{classify, TargetKind};
///
/// let t = classify("https://www.youtube.com/watch?v=abc123&list=xyz789");
/// assert_eq!(t.kind, TargetKind::Video);
/// assert_eq!(t.identifier, "abc123");
///
/// let s = classify("lofi hip hop radio");
/// assert_eq!(s.kind, TargetKind::SearchQuery);
/// ```
pub fn classify(input: &str) -> TargetSpec {
    let trimmed = input.trim();
    let url = match Url::parse(trimmed) {
        Ok(u) if u.host_str().is_some() => u,
        _ => return TargetSpec::search(input),
    };

    let param = |name: &str| {
        url.query_pairs()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.into_owned())
            .filter(|v| !v.trim().is_empty())
    };

    if let Some(id) = param("v") {
        return TargetSpec::new(TargetKind::Video, id);
    }

    let host = url.host_str().unwrap_or_default().to_ascii_lowercase();
    let segments: Vec<&str> = url
        .path_segments()
        .map(|s| s.filter(|p| !p.is_empty()).collect())
        .unwrap_or_default();

    if host == "youtu.be" || host.ends_with(".youtu.be") {
        if let Some(id) = segments.first() {
            return TargetSpec::new(TargetKind::Video, *id);
        }
    }

    if let ["shorts" | "embed" | "live", id, ..] = segments.as_slice() {
        return TargetSpec::new(TargetKind::Video, *id);
    }

    if let Some(list) = param("list") {
        return TargetSpec::new(TargetKind::Playlist, list);
    }

    match segments.as_slice() {
        ["channel", id, ..] => return TargetSpec::new(TargetKind::Channel, *id),
        [handle, ..] if handle.starts_with('@') && handle.len() > 1 => {
            return TargetSpec::new(TargetKind::Handle, *handle);
        }
        ["c" | "user", name, ..] => return TargetSpec::new(TargetKind::Handle, *name),
        ["results", ..] => {
            if let Some(q) = param("search_query") {
                return TargetSpec::search(q);
            }
        }
        _ => {}
    }

    debug!(event = "harvest.target.unrecognized", input = %trimmed, "treating url as search text");
    TargetSpec::search(input)
}

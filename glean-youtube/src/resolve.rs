//! Expand a [`TargetSpec`] into at most N hydrated videos.
//!
//! Collection is a two step affair: first gather video ids (search pages,
//! playlist pages, or the single id of a video target), then hydrate them with
//! `videos` calls in batches of [`MAX_IDS_PER_REQUEST`]. Channels resolve to
//! their uploads playlist and handles resolve to a channel first.
//!
//! Ids the API does not return during hydration are dropped. Duplicates are
//! kept as they arrive.
use crate::client::{MAX_IDS_PER_REQUEST, MAX_PAGE_SIZE, SearchKind, YouTubeApi};
use crate::error::YoutubeError;
use crate::target::{TargetKind, TargetSpec};
use crate::types::VideoReference;
use std::collections::HashMap;
use std::future::Future;
use tracing::{debug, info, warn};

pub struct MetadataResolver {
    api: YouTubeApi,
}

impl MetadataResolver {
    pub fn new(api: YouTubeApi) -> Self {
        Self { api }
    }

    /// Resolve leniently: any API fault is logged and yields an empty list.
    pub async fn resolve(&self, target: &TargetSpec, max: usize) -> Vec<VideoReference> {
        match self.try_resolve(target, max).await {
            Ok(videos) => videos,
            Err(e) => {
                warn!(
                    event = "harvest.resolve.failed",
                    target = %target,
                    error = %e,
                    "metadata resolution failed; continuing with no videos"
                );
                Vec::new()
            }
        }
    }

    /// Resolve and surface API faults to the caller.
    pub async fn try_resolve(
        &self,
        target: &TargetSpec,
        max: usize,
    ) -> Result<Vec<VideoReference>, YoutubeError> {
        if max == 0 {
            return Ok(Vec::new());
        }

        let ids = match target.kind {
            TargetKind::Video => vec![target.identifier.clone()],
            TargetKind::SearchQuery => self.search_ids(&target.identifier, max).await?,
            TargetKind::Playlist => self.playlist_ids(&target.identifier, max).await?,
            TargetKind::Channel => self.channel_ids(&target.identifier, max).await?,
            TargetKind::Handle => match self.channel_for_handle(&target.identifier).await? {
                Some(channel) => self.channel_ids(&channel, max).await?,
                None => {
                    info!(
                        event = "harvest.resolve.handle_unknown",
                        handle = %target.identifier,
                        "no channel matched handle"
                    );
                    Vec::new()
                }
            },
        };

        let mut videos = self.hydrate(&ids).await?;
        videos.truncate(max);
        info!(
            event = "harvest.resolve.done",
            target = %target,
            ids = ids.len(),
            videos = videos.len(),
            "resolved target"
        );
        Ok(videos)
    }

    /// Fetch metadata for `ids`, preserving their order.
    pub async fn hydrate(&self, ids: &[String]) -> Result<Vec<VideoReference>, YoutubeError> {
        let mut found: HashMap<String, VideoReference> = HashMap::with_capacity(ids.len());
        for batch in ids.chunks(MAX_IDS_PER_REQUEST) {
            let page = self.api.videos(batch).await?;
            for item in page.items {
                let video = VideoReference::from(item);
                found.insert(video.id.clone(), video);
            }
        }

        let mut out = Vec::with_capacity(ids.len());
        for id in ids {
            match found.get(id) {
                Some(video) => out.push(video.clone()),
                None => debug!(
                    event = "harvest.resolve.missing",
                    video_id = %id,
                    "id not returned by videos endpoint"
                ),
            }
        }
        Ok(out)
    }

    async fn search_ids(&self, query: &str, max: usize) -> Result<Vec<String>, YoutubeError> {
        collect_pages(max, |size, token| async move {
            let page = self
                .api
                .search(query, SearchKind::Video, size, token.as_deref())
                .await?;
            let ids = page
                .items
                .into_iter()
                .filter_map(|r| r.id.video_id)
                .collect();
            Ok((ids, page.next_page_token))
        })
        .await
    }

    async fn playlist_ids(&self, playlist_id: &str, max: usize) -> Result<Vec<String>, YoutubeError> {
        collect_pages(max, |size, token| async move {
            let page = self
                .api
                .playlist_items(playlist_id, size, token.as_deref())
                .await?;
            let ids = page
                .items
                .into_iter()
                .filter_map(|item| item.content_details.and_then(|d| d.video_id))
                .collect();
            Ok((ids, page.next_page_token))
        })
        .await
    }

    async fn channel_ids(&self, channel_id: &str, max: usize) -> Result<Vec<String>, YoutubeError> {
        match self.uploads_playlist(channel_id).await? {
            Some(uploads) => self.playlist_ids(&uploads, max).await,
            None => {
                info!(
                    event = "harvest.resolve.no_uploads",
                    channel_id = %channel_id,
                    "channel has no uploads playlist"
                );
                Ok(Vec::new())
            }
        }
    }

    async fn uploads_playlist(&self, channel_id: &str) -> Result<Option<String>, YoutubeError> {
        let page = self.api.channels(channel_id).await?;
        Ok(page
            .items
            .into_iter()
            .find_map(|c| c.content_details?.related_playlists?.uploads))
    }

    async fn channel_for_handle(&self, handle: &str) -> Result<Option<String>, YoutubeError> {
        let page = self.api.search(handle, SearchKind::Channel, 1, None).await?;
        Ok(page.items.into_iter().next().and_then(|r| {
            r.id.channel_id
                .or_else(|| r.snippet.and_then(|s| s.channel_id))
        }))
    }
}

/// Walk a paginated listing until `max` ids are collected or the pages run out.
/// Each request asks for no more than the ids still needed.
async fn collect_pages<F, Fut>(max: usize, mut fetch: F) -> Result<Vec<String>, YoutubeError>
where
    F: FnMut(usize, Option<String>) -> Fut,
    Fut: Future<Output = Result<(Vec<String>, Option<String>), YoutubeError>>,
{
    let mut ids = Vec::new();
    let mut token: Option<String> = None;
    while ids.len() < max {
        let want = (max - ids.len()).min(MAX_PAGE_SIZE);
        let (page, next) = fetch(want, token.take()).await?;
        if page.is_empty() {
            break;
        }
        ids.extend(page);
        match next {
            Some(t) if !t.is_empty() => token = Some(t),
            _ => break,
        }
    }
    ids.truncate(max);
    Ok(ids)
}

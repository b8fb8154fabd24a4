use glean_youtube::client::api_http;
use glean_youtube::{MetadataResolver, TargetKind, TargetSpec, YouTubeApi, YoutubeError};
use serde_json::{Value, json};
use wiremock::matchers::{any, method, path, query_param, query_param_is_missing};
use wiremock::{Mock, MockServer, Request, Respond, ResponseTemplate};

/// Answers `videos` calls with one item per requested id, minus `skip`.
struct EchoVideos {
    skip: Vec<&'static str>,
}

impl Respond for EchoVideos {
    fn respond(&self, req: &Request) -> ResponseTemplate {
        let ids = req
            .url
            .query_pairs()
            .find(|(k, _)| k == "id")
            .map(|(_, v)| v.into_owned())
            .unwrap_or_default();
        let items: Vec<Value> = ids
            .split(',')
            .filter(|id| !id.is_empty() && !self.skip.iter().any(|s| s == id))
            .map(|id| {
                json!({
                    "id": id,
                    "snippet": {"title": format!("title {id}"), "publishedAt": "2024-01-01T00:00:00Z"},
                    "contentDetails": {"duration": "PT1M"}
                })
            })
            .collect();
        ResponseTemplate::new(200).set_body_json(json!({ "items": items }))
    }
}

fn resolver_for(server: &MockServer) -> MetadataResolver {
    let api = YouTubeApi::with_base(&format!("{}/youtube/v3/", server.uri()), "test-key")
        .expect("valid base");
    MetadataResolver::new(api)
}

async fn mount_videos(server: &MockServer, skip: Vec<&'static str>, calls: u64) {
    Mock::given(method("GET"))
        .and(path("/youtube/v3/videos"))
        .and(query_param("key", "test-key"))
        .and(query_param("part", "snippet,contentDetails"))
        .and(query_param_is_missing("maxResults"))
        .respond_with(EchoVideos { skip })
        .expect(calls)
        .mount(server)
        .await;
}

fn id_page(ids: impl IntoIterator<Item = String>, next: Option<&str>) -> Value {
    let items: Vec<Value> = ids
        .into_iter()
        .map(|id| json!({"contentDetails": {"videoId": id}}))
        .collect();
    match next {
        Some(t) => json!({"items": items, "nextPageToken": t}),
        None => json!({ "items": items }),
    }
}

#[tokio::test]
async fn search_stops_after_first_page_when_cap_is_met() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/youtube/v3/search"))
        .and(query_param("q", "lofi hip hop radio"))
        .and(query_param("type", "video"))
        .and(query_param("maxResults", "3"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "items": [
                {"id": {"kind": "youtube#video", "videoId": "s1"}},
                {"id": {"kind": "youtube#video", "videoId": "s2"}},
                {"id": {"kind": "youtube#video", "videoId": "s3"}}
            ],
            "nextPageToken": "more"
        })))
        .expect(1)
        .mount(&server)
        .await;
    mount_videos(&server, vec![], 1).await;

    let videos = resolver_for(&server)
        .try_resolve(&TargetSpec::search("lofi hip hop radio"), 3)
        .await
        .expect("resolved");

    let ids: Vec<&str> = videos.iter().map(|v| v.id.as_str()).collect();
    assert_eq!(ids, vec!["s1", "s2", "s3"]);
    assert_eq!(videos[0].title, "title s1");
    assert_eq!(videos[0].url, "https://www.youtube.com/watch?v=s1");
    assert_eq!(videos[0].duration, "PT1M");
}

#[tokio::test]
async fn playlist_pages_until_cap_and_batches_hydration() {
    let server = MockServer::start().await;
    let base = "/youtube/v3/playlistItems";

    Mock::given(method("GET"))
        .and(path(base))
        .and(query_param("playlistId", "PL1"))
        .and(query_param_is_missing("pageToken"))
        .and(query_param("maxResults", "50"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(id_page((0..50).map(|i| format!("v{i:03}")), Some("p2"))),
        )
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path(base))
        .and(query_param("pageToken", "p2"))
        .and(query_param("maxResults", "50"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(id_page((50..100).map(|i| format!("v{i:03}")), Some("p3"))),
        )
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path(base))
        .and(query_param("pageToken", "p3"))
        .and(query_param("maxResults", "20"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(id_page((100..120).map(|i| format!("v{i:03}")), Some("p4"))),
        )
        .expect(1)
        .mount(&server)
        .await;
    mount_videos(&server, vec![], 3).await;

    let videos = resolver_for(&server)
        .try_resolve(&TargetSpec::new(TargetKind::Playlist, "PL1"), 120)
        .await
        .expect("resolved");

    assert_eq!(videos.len(), 120);
    assert_eq!(videos[0].id, "v000");
    assert_eq!(videos[119].id, "v119");
}

#[tokio::test]
async fn channel_resolves_through_uploads_playlist() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/youtube/v3/channels"))
        .and(query_param("id", "UC1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "items": [{"id": "UC1", "contentDetails": {"relatedPlaylists": {"uploads": "UU1"}}}]
        })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/youtube/v3/playlistItems"))
        .and(query_param("playlistId", "UU1"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(id_page(["u1".to_string(), "u2".to_string()], None)),
        )
        .expect(1)
        .mount(&server)
        .await;
    mount_videos(&server, vec![], 1).await;

    let videos = resolver_for(&server)
        .try_resolve(&TargetSpec::new(TargetKind::Channel, "UC1"), 10)
        .await
        .expect("resolved");
    assert_eq!(videos.len(), 2);
}

#[tokio::test]
async fn handle_is_looked_up_as_a_channel_first() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/youtube/v3/search"))
        .and(query_param("q", "@creator"))
        .and(query_param("type", "channel"))
        .and(query_param("maxResults", "1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "items": [{"id": {"kind": "youtube#channel", "channelId": "UC9"}}]
        })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/youtube/v3/channels"))
        .and(query_param("id", "UC9"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "items": [{"id": "UC9", "contentDetails": {"relatedPlaylists": {"uploads": "UU9"}}}]
        })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/youtube/v3/playlistItems"))
        .and(query_param("playlistId", "UU9"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(id_page(["h1".to_string()], None)),
        )
        .mount(&server)
        .await;
    mount_videos(&server, vec![], 1).await;

    let videos = resolver_for(&server)
        .resolve(&TargetSpec::new(TargetKind::Handle, "@creator"), 5)
        .await;
    assert_eq!(videos.len(), 1);
    assert_eq!(videos[0].id, "h1");
}

#[tokio::test]
async fn ids_missing_from_hydration_are_dropped_in_order() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/youtube/v3/playlistItems"))
        .respond_with(ResponseTemplate::new(200).set_body_json(id_page(
            ["a".to_string(), "gone".to_string(), "c".to_string()],
            None,
        )))
        .mount(&server)
        .await;
    mount_videos(&server, vec!["gone"], 1).await;

    let videos = resolver_for(&server)
        .try_resolve(&TargetSpec::new(TargetKind::Playlist, "PL"), 10)
        .await
        .expect("resolved");
    let ids: Vec<&str> = videos.iter().map(|v| v.id.as_str()).collect();
    assert_eq!(ids, vec!["a", "c"]);
}

#[tokio::test]
async fn api_fault_is_empty_when_lenient_and_an_error_when_strict() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/youtube/v3/search"))
        .respond_with(ResponseTemplate::new(403).set_body_json(json!({
            "error": {"code": 403, "message": "quotaExceeded"}
        })))
        .mount(&server)
        .await;

    let resolver = resolver_for(&server);
    let target = TargetSpec::search("anything");

    assert!(resolver.resolve(&target, 5).await.is_empty());

    let err = resolver.try_resolve(&target, 5).await.expect_err("403");
    match err {
        YoutubeError::Http(e) => assert_eq!(e.status().map(|s| s.as_u16()), Some(403)),
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn zero_cap_makes_no_requests() {
    let server = MockServer::start().await;
    Mock::given(any())
        .respond_with(ResponseTemplate::new(500))
        .expect(0)
        .mount(&server)
        .await;

    let resolver = resolver_for(&server);
    for target in [
        TargetSpec::search("q"),
        TargetSpec::new(TargetKind::Video, "abc"),
        TargetSpec::new(TargetKind::Handle, "@x"),
    ] {
        assert!(resolver.try_resolve(&target, 0).await.unwrap().is_empty());
    }
}

#[tokio::test]
async fn unknown_video_id_resolves_to_nothing() {
    let server = MockServer::start().await;
    mount_videos(&server, vec!["missing"], 1).await;

    let videos = resolver_for(&server)
        .try_resolve(&TargetSpec::new(TargetKind::Video, "missing"), 10)
        .await
        .expect("resolved");
    assert!(videos.is_empty());
}

#[tokio::test]
async fn base_without_trailing_slash_keeps_its_path() {
    let server = MockServer::start().await;
    mount_videos(&server, vec![], 2).await;

    let bare = format!("{}/youtube/v3", server.uri());
    let from_http = YouTubeApi::with_http(api_http(&bare).expect("valid base"), "test-key");
    let from_base = YouTubeApi::with_base(&bare, "test-key").expect("valid base");

    for api in [from_http, from_base] {
        let videos = MetadataResolver::new(api)
            .try_resolve(&TargetSpec::new(TargetKind::Video, "abc"), 1)
            .await
            .expect("resolved under /youtube/v3");
        assert_eq!(videos.len(), 1);
    }
}

use glean_http::{Auth, HttpClient, HttpError, RequestOpts};
use serde_json::{Value, json};
use std::borrow::Cow;
use wiremock::matchers::{body_json, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn client_for(server: &MockServer) -> HttpClient {
    HttpClient::new(&format!("{}/api/", server.uri())).expect("valid base url")
}

#[tokio::test]
async fn get_json_sends_query_auth_and_decodes() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/items"))
        .and(query_param("part", "snippet"))
        .and(query_param("key", "k-123"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"items": [1, 2]})))
        .expect(1)
        .mount(&server)
        .await;

    let got: Value = client_for(&server)
        .get_json(
            "items",
            RequestOpts {
                auth: Some(Auth::Query {
                    name: "key",
                    value: Cow::Borrowed("k-123"),
                }),
                query: Some(vec![("part", "snippet".into())]),
                ..Default::default()
            },
        )
        .await
        .expect("json body");

    assert_eq!(got["items"], json!([1, 2]));
}

#[tokio::test]
async fn api_errors_surface_status_and_google_message() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/items"))
        .respond_with(ResponseTemplate::new(403).set_body_json(json!({
            "error": {"code": 403, "message": "API key not valid", "errors": [{"reason": "badRequest"}]}
        })))
        .expect(1)
        .mount(&server)
        .await;

    let err = client_for(&server)
        .get_json::<Value>("items", RequestOpts::default())
        .await
        .expect_err("403 must fail");

    assert_eq!(err.status().map(|s| s.as_u16()), Some(403));
    match err {
        HttpError::Api { message, .. } => assert!(message.contains("API key not valid")),
        other => panic!("unexpected error: {other}"),
    }
}

#[tokio::test]
async fn server_errors_are_not_retried_by_default() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/flaky"))
        .respond_with(ResponseTemplate::new(503))
        .expect(1)
        .mount(&server)
        .await;

    let res = client_for(&server)
        .get_json::<Value>("flaky", RequestOpts::default())
        .await;
    assert!(res.is_err());
}

#[tokio::test]
async fn retry_budget_recovers_from_one_server_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/flaky"))
        .respond_with(ResponseTemplate::new(503))
        .up_to_n_times(1)
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/flaky"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"ok": true})))
        .expect(1)
        .mount(&server)
        .await;

    let got: Value = client_for(&server)
        .with_retries(1)
        .get_json("flaky", RequestOpts::default())
        .await
        .expect("second attempt succeeds");
    assert_eq!(got["ok"], json!(true));
}

#[tokio::test]
async fn post_json_and_get_text_round_trip_through_server() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/player"))
        .and(body_json(json!({"videoId": "abc"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"status": "OK"})))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/watch"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>hi</html>"))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server);
    let got: Value = client
        .post_json_opts("player", &json!({"videoId": "abc"}), RequestOpts::default())
        .await
        .expect("post json");
    assert_eq!(got["status"], "OK");

    let html = client
        .get_text(
            &format!("{}/watch", server.uri()),
            RequestOpts {
                allow_absolute: true,
                ..Default::default()
            },
        )
        .await
        .expect("text body");
    assert_eq!(html, "<html>hi</html>");
}

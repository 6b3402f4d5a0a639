use std::time::Duration;

use chatnoir_frontend::{Error, HttpClient, Session, Settings};
use serde_json::{json, Value};
use wiremock::matchers::{header, method, path};
use wiremock::{Match, Mock, MockBuilder, MockServer, Request, ResponseTemplate};

/// Matches a bare query flag such as `?init`
struct QueryFlag(&'static str);

impl Match for QueryFlag {
    fn matches(&self, request: &Request) -> bool {
        request.url.query() == Some(self.0)
    }
}

fn now() -> f64 {
    chrono::Utc::now().timestamp() as f64
}

fn settings_for(server: &MockServer) -> Settings {
    let mut settings = Settings::default();
    settings.backend.address = format!("{}/", server.uri());
    settings.backend.api_address = format!("{}/api/v1/", server.uri());
    settings
}

fn init_body(token: &str, timestamp: f64, max_age: u64, quota: u64) -> Value {
    json!({
        "token": {
            "token": token,
            "timestamp": timestamp,
            "max_age": max_age,
            "quota": quota
        },
        "indices": [
            {"id": "cw12", "name": "ClueWeb12"},
            {"id": "cc", "name": "Common Crawl", "selected": true}
        ]
    })
}

fn init_route() -> MockBuilder {
    Mock::given(method("POST"))
        .and(path("/"))
        .and(QueryFlag("init"))
}

fn init_mock(body: Value) -> Mock {
    init_route().respond_with(ResponseTemplate::new(200).set_body_json(body))
}

#[tokio::test]
async fn refresh_fetches_token_and_indices() {
    let server = MockServer::start().await;
    init_mock(init_body("tok-1", now(), 600, 100))
        .expect(1)
        .mount(&server)
        .await;

    let session = Session::new(HttpClient::new().unwrap(), &settings_for(&server));
    let state = session.refresh().await.expect("refresh ok");

    assert_eq!(state.api_token.unwrap().token, "tok-1");
    assert_eq!(state.counter, 0);
    assert_eq!(state.indices.len(), 2);
    assert!(!state.indices[0].selected);
    assert!(state.indices[1].selected);

    // Valid token is reused
    assert_eq!(session.api_token().await.unwrap().token, "tok-1");
    assert_eq!(session.available_indices().await.unwrap().len(), 2);
    server.verify().await;
}

#[tokio::test]
async fn concurrent_refresh_of_expired_token_makes_one_call() {
    let server = MockServer::start().await;
    init_mock(init_body("expired", now() - 3600.0, 600, 100))
        .up_to_n_times(1)
        .expect(1)
        .mount(&server)
        .await;
    init_route()
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(init_body("fresh", now(), 600, 100))
                .set_delay(Duration::from_millis(200)),
        )
        .expect(1)
        .mount(&server)
        .await;

    let session = Session::new(HttpClient::new().unwrap(), &settings_for(&server));
    let first = session.refresh().await.unwrap();
    assert_eq!(first.api_token.unwrap().token, "expired");

    let other = session.clone();
    let (a, b) = tokio::join!(session.refresh(), other.refresh());

    assert_eq!(a.unwrap().api_token.unwrap().token, "fresh");
    assert_eq!(b.unwrap().api_token.unwrap().token, "fresh");
    server.verify().await;
}

#[tokio::test]
async fn many_concurrent_callers_share_one_refresh() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(QueryFlag("init"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(init_body("shared", now(), 600, 100))
                .set_delay(Duration::from_millis(100)),
        )
        .expect(1)
        .mount(&server)
        .await;

    let session = Session::new(HttpClient::new().unwrap(), &settings_for(&server));
    let calls = (0..8).map(|_| session.api_token());
    let tokens = futures::future::join_all(calls).await;

    assert!(tokens.iter().all(|t| t.as_ref().unwrap().token == "shared"));
    server.verify().await;
}

#[tokio::test]
async fn token_near_expiry_is_refreshed() {
    let server = MockServer::start().await;
    // 10s of validity left is inside the 20s refresh margin
    init_mock(init_body("short", now() - 590.0, 600, 100))
        .expect(2)
        .mount(&server)
        .await;

    let session = Session::new(HttpClient::new().unwrap(), &settings_for(&server));
    session.refresh().await.unwrap();
    session.refresh().await.unwrap();
    server.verify().await;
}

#[tokio::test]
async fn exhausted_quota_triggers_refresh() {
    let server = MockServer::start().await;
    init_mock(init_body("quota", now(), 600, 2))
        .expect(2)
        .mount(&server)
        .await;

    let session = Session::new(HttpClient::new().unwrap(), &settings_for(&server));
    session.refresh().await.unwrap();

    session.record_request().await;
    session.refresh().await.unwrap();
    assert_eq!(session.request_count().await, 1);

    session.record_request().await;
    let state = session.refresh().await.unwrap();
    assert_eq!(state.counter, 0);
    server.verify().await;
}

#[tokio::test]
async fn invalidate_forces_new_token() {
    let server = MockServer::start().await;
    init_mock(init_body("tok", now(), 600, 100))
        .expect(2)
        .mount(&server)
        .await;

    let session = Session::new(HttpClient::new().unwrap(), &settings_for(&server));
    session.refresh().await.unwrap();
    session.invalidate().await;
    session.refresh().await.unwrap();
    server.verify().await;
}

#[tokio::test]
async fn refresh_failure_is_wrapped() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(QueryFlag("init"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let session = Session::new(HttpClient::new().unwrap(), &settings_for(&server));
    let err = session.refresh().await.unwrap_err();

    assert!(matches!(err, Error::InvalidState(_)));
    assert_eq!(err.status(), Some(500));
    assert!(err.to_string().starts_with("Invalid state returned."));
}

#[tokio::test]
async fn malformed_init_body_is_invalid_state() {
    let server = MockServer::start().await;
    init_mock(json!({"indices": []})).mount(&server).await;

    let session = Session::new(HttpClient::new().unwrap(), &settings_for(&server));
    let err = session.api_token().await.unwrap_err();
    assert!(matches!(err, Error::InvalidState(_)));
}

#[tokio::test]
async fn dev_mode_sends_csrf_header_from_cookie() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(
            ResponseTemplate::new(200).insert_header("Set-Cookie", "csrftoken=secret; Path=/"),
        )
        .expect(1)
        .mount(&server)
        .await;
    init_route()
        .and(header("X-Csrf-Token", "secret"))
        .and(header("X-Requested-With", "XMLHttpRequest"))
        .respond_with(ResponseTemplate::new(200).set_body_json(init_body("tok", now(), 600, 100)))
        .expect(1)
        .mount(&server)
        .await;

    let mut settings = settings_for(&server);
    settings.backend.dev_mode = true;

    let session = Session::connect(&settings).await.expect("connect ok");
    assert_eq!(session.api_token().await.unwrap().token, "tok");
    server.verify().await;
}

#[tokio::test]
async fn dev_mode_bootstrap_failure_is_reported() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let mut settings = settings_for(&server);
    settings.backend.dev_mode = true;

    let err = Session::connect(&settings).await.err().expect("connect fails");
    assert!(matches!(err, Error::Csrf(_)));
    assert_eq!(err.status(), Some(503));
}

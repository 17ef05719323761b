//! Functional tests for the history cache against a mock backend

use futures::future::join;
use imagen_client::config::Settings;
use imagen_client::endpoint::DeploymentContext;
use imagen_client::session::SessionState;
use imagen_client::{AppError, Studio};
use serde_json::json;
use std::time::Duration;
use tokio_test::{assert_err, assert_ok};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn studio_for(server: &MockServer) -> Studio {
    let mut settings = Settings::default();
    settings.backend.port = server.address().port();
    Studio::new(settings, DeploymentContext::new("127.0.0.1")).unwrap()
}

fn output(server: &MockServer, name: &str) -> String {
    format!("{}/outputs/{}", server.uri(), name)
}

#[tokio::test]
async fn test_refresh_keeps_server_order() {
    let server = MockServer::start().await;
    let entries = vec![
        output(&server, "newest.png"),
        output(&server, "middle.png"),
        output(&server, "oldest.png"),
    ];

    Mock::given(method("GET"))
        .and(path("/history"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "history": entries })))
        .mount(&server)
        .await;

    let studio = studio_for(&server);
    assert_eq!(assert_ok!(studio.history.try_refresh().await), 3);
    assert_eq!(studio.history.entries(), entries);
}

#[tokio::test]
async fn test_missing_history_field_is_empty() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/history"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .mount(&server)
        .await;

    let studio = studio_for(&server);
    assert_eq!(assert_ok!(studio.history.try_refresh().await), 0);
    assert!(studio.history.is_empty());
}

#[tokio::test]
async fn test_failed_refresh_preserves_previous_list() {
    let server = MockServer::start().await;
    let entries = vec![output(&server, "a.png")];

    Mock::given(method("GET"))
        .and(path("/history"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "history": entries })))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/history"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let studio = studio_for(&server);
    studio.history.refresh().await;
    assert_eq!(studio.history.entries(), entries);

    let error = assert_err!(studio.history.try_refresh().await);
    assert!(matches!(error, AppError::HistoryUnavailable(_)));
    assert!(!error.is_user_visible());
    assert_eq!(studio.history.entries(), entries);
}

#[tokio::test]
async fn test_malformed_history_preserves_previous_list() {
    let server = MockServer::start().await;
    let entries = vec![output(&server, "a.png")];

    Mock::given(method("GET"))
        .and(path("/history"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "history": entries })))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/history"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>oops</html>"))
        .mount(&server)
        .await;

    let studio = studio_for(&server);
    studio.history.refresh().await;
    studio.history.refresh().await;
    assert_eq!(studio.history.entries(), entries);
}

#[tokio::test]
async fn test_select_issues_no_network_call() {
    let server = MockServer::start().await;
    let entries = vec![output(&server, "a.png"), output(&server, "b.png")];

    Mock::given(method("GET"))
        .and(path("/history"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "history": entries })))
        .mount(&server)
        .await;

    let studio = studio_for(&server);
    studio.history.refresh().await;
    let before = server.received_requests().await.unwrap_or_default().len();

    assert_ok!(studio.history.select(&entries[1]));

    let snapshot = studio.snapshot();
    assert_eq!(snapshot.displayed_image.as_deref(), Some(entries[1].as_str()));
    assert_eq!(snapshot.session, SessionState::Idle);
    assert_eq!(snapshot.history, entries);
    assert_eq!(server.received_requests().await.unwrap_or_default().len(), before);
}

#[tokio::test]
async fn test_select_rejects_unknown_reference() {
    let server = MockServer::start().await;
    let studio = studio_for(&server);

    let error = assert_err!(studio.history.select("http://example.com/made-up.png"));
    assert!(matches!(error, AppError::UnknownHistoryEntry(_)));
    assert!(studio.snapshot().displayed_image.is_none());
}

#[tokio::test]
async fn test_concurrent_refreshes_settle_on_server_truth() {
    let server = MockServer::start().await;
    let entries = vec![output(&server, "a.png")];

    Mock::given(method("GET"))
        .and(path("/history"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({ "history": entries }))
                .set_delay(Duration::from_millis(50)),
        )
        .expect(2)
        .mount(&server)
        .await;

    let studio = studio_for(&server);
    let (first, second) = join(studio.history.try_refresh(), studio.history.try_refresh()).await;

    assert_ok!(first);
    assert_ok!(second);
    assert_eq!(studio.history.entries(), entries);
}

#[tokio::test]
async fn test_history_timeout_is_unavailable() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/history"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({ "history": [] }))
                .set_delay(Duration::from_secs(2)),
        )
        .mount(&server)
        .await;

    let mut settings = Settings::default();
    settings.backend.port = server.address().port();
    settings.history.timeout_ms = 100;
    let studio = Studio::new(settings, DeploymentContext::new("127.0.0.1")).unwrap();

    let error = assert_err!(studio.history.try_refresh().await);
    assert!(matches!(error, AppError::HistoryUnavailable(_)));
}

//! Tests of the reqwest-backed probe client against a local mock server.

use std::sync::Arc;

use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use cimbl_check::checker::{
    check, classify, CheckOptions, HttpProbeClient, ProbeClient, ProbeOutcome, USER_AGENT,
};
use cimbl_check::config::Config;
use cimbl_check::indicator::Indicator;
use cimbl_check::ingest::IngestedSet;

fn client() -> HttpProbeClient {
    let config = Config {
        probe_timeout_secs: 5,
        ..Config::default()
    };
    HttpProbeClient::new(&config).unwrap()
}

#[tokio::test]
async fn test_head_carries_user_agent_and_returns_status() {
    let server = MockServer::start().await;
    Mock::given(method("HEAD"))
        .and(path("/search.php"))
        .and(header("user-agent", USER_AGENT))
        .respond_with(ResponseTemplate::new(403))
        .expect(1)
        .mount(&server)
        .await;

    let status = client()
        .head(&format!("{}/search.php", server.uri()))
        .await
        .unwrap();

    assert_eq!(status.as_u16(), 403);
    assert_eq!(classify(status), ProbeOutcome::AlreadyBlocked);
    server.verify().await;
}

#[tokio::test]
async fn test_redirects_are_not_followed() {
    let server = MockServer::start().await;
    Mock::given(method("HEAD"))
        .and(path("/moved"))
        .respond_with(ResponseTemplate::new(302).insert_header("location", "/elsewhere"))
        .mount(&server)
        .await;

    let status = client()
        .head(&format!("{}/moved", server.uri()))
        .await
        .unwrap();

    // The raw 302 is observed and lands in the default Block bucket.
    assert_eq!(status.as_u16(), 302);
    assert_eq!(classify(status), ProbeOutcome::Block);
}

#[tokio::test]
async fn test_transport_error_is_an_error() {
    // Nothing listens on the discard port.
    assert!(client().head("http://127.0.0.1:1/").await.is_err());
}

/// The whole pipeline over real HTTP: statuses decide what gets recorded.
#[tokio::test]
async fn test_check_through_real_client() {
    let server = MockServer::start().await;
    for (p, status) in [("/live", 200u16), ("/gone", 403), ("/auth", 407)] {
        Mock::given(method("HEAD"))
            .and(path(p))
            .respond_with(ResponseTemplate::new(status))
            .mount(&server)
            .await;
    }

    let mut set = IngestedSet::new();
    for p in ["/live", "/gone", "/auth"] {
        set.push(Indicator::Url {
            raw: format!("{}{}", server.uri(), p),
        });
    }

    let checked = check(set, Arc::new(client()), CheckOptions::default()).await;

    assert_eq!(checked.results.urls.len(), 1);
    assert!(checked
        .results
        .urls
        .contains(&format!("{}/live", server.uri())));
    assert_eq!(checked.auth_required, vec![format!("{}/auth", server.uri())]);
}

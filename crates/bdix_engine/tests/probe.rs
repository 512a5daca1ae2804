use std::time::Duration;

use bdix_engine::{ProbeFailure, ProbeResult, ProbeSettings, Prober, ReqwestProber};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

async fn server_with(route: &str, response: ResponseTemplate) -> MockServer {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(response)
        .mount(&server)
        .await;
    server
}

fn prober(timeout: Duration) -> ReqwestProber {
    ReqwestProber::new(&ProbeSettings {
        timeout,
        ..ProbeSettings::default()
    })
    .expect("client")
}

#[tokio::test]
async fn status_200_is_reachable() {
    let server = server_with("/ok", ResponseTemplate::new(200)).await;
    let result = prober(Duration::from_secs(1))
        .probe(&format!("{}/ok", server.uri()))
        .await;
    assert_eq!(result, ProbeResult::Reachable);
}

#[tokio::test]
async fn other_success_codes_are_unreachable() {
    let server = server_with("/empty", ResponseTemplate::new(204)).await;
    let result = prober(Duration::from_secs(1))
        .probe(&format!("{}/empty", server.uri()))
        .await;
    assert_eq!(result, ProbeResult::Unreachable(ProbeFailure::HttpStatus(204)));
}

#[tokio::test]
async fn not_found_is_unreachable() {
    let server = server_with("/missing", ResponseTemplate::new(404)).await;
    let result = prober(Duration::from_secs(1))
        .probe(&format!("{}/missing", server.uri()))
        .await;
    assert_eq!(result, ProbeResult::Unreachable(ProbeFailure::HttpStatus(404)));
}

#[tokio::test]
async fn redirects_are_not_followed() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/moved"))
        .respond_with(
            ResponseTemplate::new(301).insert_header("Location", format!("{}/ok", server.uri())),
        )
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/ok"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&server)
        .await;

    let result = prober(Duration::from_secs(1))
        .probe(&format!("{}/moved", server.uri()))
        .await;
    assert_eq!(result, ProbeResult::Unreachable(ProbeFailure::HttpStatus(301)));
}

#[tokio::test]
async fn slow_endpoint_times_out() {
    let server = server_with(
        "/slow",
        ResponseTemplate::new(200).set_delay(Duration::from_millis(400)),
    )
    .await;
    let result = prober(Duration::from_millis(50))
        .probe(&format!("{}/slow", server.uri()))
        .await;
    assert_eq!(result, ProbeResult::Unreachable(ProbeFailure::Timeout));
}

#[tokio::test]
async fn refused_connection_is_swallowed() {
    let server = MockServer::start().await;
    let url = format!("{}/gone", server.uri());
    drop(server);

    let result = prober(Duration::from_secs(1)).probe(&url).await;
    assert!(!result.is_reachable(), "got {result:?}");
}

#[tokio::test]
async fn unparseable_url_is_unreachable() {
    let result = prober(Duration::from_secs(1)).probe("http://").await;
    assert_eq!(result, ProbeResult::Unreachable(ProbeFailure::InvalidUrl));
}

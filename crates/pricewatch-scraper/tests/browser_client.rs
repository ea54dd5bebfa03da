//! Integration tests for `BrowserClient` using wiremock HTTP mocks.

use pricewatch_scraper::{BrowserClient, PageFetcher, ScrapeError};
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const UA: &str = "Mozilla/5.0 (test) Chrome/120.0.0.0 Safari/537.36";

fn test_client(max_retries: u32) -> BrowserClient {
    BrowserClient::new(5, UA, max_retries, 1).expect("client construction should not fail")
}

#[tokio::test]
async fn fetch_sends_browser_profile_and_returns_body() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/t/shoe"))
        .and(header("user-agent", UA))
        .and(header("accept-language", "en-US,en;q=0.9"))
        .and(header("sec-fetch-mode", "navigate"))
        .and(header("sec-ch-ua-platform", r#""macOS""#))
        .and(header("dnt", "1"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>ok</html>"))
        .expect(1)
        .mount(&server)
        .await;

    let body = test_client(0)
        .fetch(&format!("{}/t/shoe", server.uri()))
        .await
        .expect("fetch should succeed");

    assert_eq!(body, "<html>ok</html>");
}

#[tokio::test]
async fn not_found_is_unexpected_status_without_retry() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(404))
        .expect(1)
        .mount(&server)
        .await;

    let err = test_client(2)
        .fetch(&format!("{}/gone", server.uri()))
        .await
        .unwrap_err();

    assert!(
        matches!(err, ScrapeError::UnexpectedStatus { status: 404, .. }),
        "got: {err:?}"
    );
    assert!(err.is_fetch_error());
}

#[tokio::test]
async fn server_error_is_retried_until_success() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(503))
        .up_to_n_times(2)
        .expect(2)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_string("recovered"))
        .expect(1)
        .mount(&server)
        .await;

    let body = test_client(2)
        .fetch(&format!("{}/flaky", server.uri()))
        .await
        .expect("third attempt should succeed");

    assert_eq!(body, "recovered");
}

#[tokio::test]
async fn retries_are_bounded() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(500))
        .expect(2)
        .mount(&server)
        .await;

    let err = test_client(1)
        .fetch(&format!("{}/down", server.uri()))
        .await
        .unwrap_err();

    assert!(matches!(err, ScrapeError::UnexpectedStatus { status: 500, .. }));
}

#[tokio::test]
async fn too_many_requests_reports_retry_after() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(429).insert_header("retry-after", "7"))
        .mount(&server)
        .await;

    let err = test_client(0)
        .fetch(&format!("{}/busy", server.uri()))
        .await
        .unwrap_err();

    assert!(
        matches!(
            err,
            ScrapeError::RateLimited {
                retry_after_secs: 7,
                ..
            }
        ),
        "got: {err:?}"
    );
}

// Tests for crawl orchestration

use std::future::pending;
use std::time::Duration;
use trawler_core::crawl::{CrawlOptions, CrawlStatus, execute_crawl};
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn options(url: String) -> CrawlOptions {
    CrawlOptions {
        url,
        threads: 4,
        max_depth: 3,
        timeout_secs: 10,
        user_agent: None,
        show_progress_bars: false,
    }
}

fn html(body: &str) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_raw(body, "text/html")
}

#[tokio::test]
async fn test_execute_crawl_completes() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(html(
            r#"<html><body>
                <!-- staging build -->
                <a href="/about">About</a>
                <a href="https://other.net/">Elsewhere</a>
                <img src="/logo.png">
                <p>contact: team@site.com</p>
            </body></html>"#,
        ))
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/about"))
        .respond_with(html("<html><body>About us</body></html>"))
        .mount(&mock_server)
        .await;

    let run = execute_crawl(options(mock_server.uri()), pending())
        .await
        .unwrap();

    assert_eq!(run.status, CrawlStatus::Completed);
    let about = format!("{}/about", mock_server.uri());
    assert!(run.result.links.contains(&about));
    assert!(run.result.external_link.contains("https://other.net/"));
    assert!(run.result.emails.contains("team@site.com"));
    assert!(run.result.comments.iter().any(|c| c.contains("staging build")));
    assert_eq!(run.result.images.len(), 1);
}

#[tokio::test]
async fn test_custom_user_agent_is_sent() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/"))
        .and(header("user-agent", "recon-bot/1.0"))
        .respond_with(html("<p>agent ok</p>"))
        .expect(1)
        .mount(&mock_server)
        .await;

    let mut opts = options(mock_server.uri());
    opts.user_agent = Some("recon-bot/1.0".to_string());
    let run = execute_crawl(opts, pending()).await.unwrap();

    assert_eq!(run.status, CrawlStatus::Completed);
    mock_server.verify().await;
}

#[tokio::test]
async fn test_execute_crawl_rejects_invalid_url() {
    let result = execute_crawl(options("not a url".to_string()), pending()).await;
    assert!(result.is_err());
}

#[tokio::test]
async fn test_interrupted_crawl_keeps_partial_results() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(html(
            r#"<html><body>
                <a href="/slow">Slow</a>
                <p>admin@site.com</p>
            </body></html>"#,
        ))
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/slow"))
        .respond_with(html("<html></html>").set_delay(Duration::from_secs(5)))
        .mount(&mock_server)
        .await;

    let shutdown = tokio::time::sleep(Duration::from_millis(500));
    let run = execute_crawl(options(mock_server.uri()), shutdown)
        .await
        .unwrap();

    assert_eq!(run.status, CrawlStatus::Interrupted);
    assert!(run.result.emails.contains("admin@site.com"));
    assert!(run.result.links.contains(&format!("{}/slow", mock_server.uri())));
}

#[tokio::test]
async fn test_unreachable_start_still_completes() {
    // Nothing listens on this port once the server is dropped
    let uri = {
        let mock_server = MockServer::start().await;
        mock_server.uri()
    };

    let mut opts = options(uri.clone());
    opts.timeout_secs = 2;
    let run = execute_crawl(opts, pending()).await.unwrap();

    assert_eq!(run.status, CrawlStatus::Completed);
    assert!(run.result.emails.is_empty());
    assert!(run.result.sensitive_data.is_empty());
}

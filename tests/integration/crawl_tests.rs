//! Integration tests for the crawler
//!
//! These tests use wiremock to serve small chapter chains and run the full
//! fetch, parse and advance cycle end-to-end.

use chapter_trawl::config::{Config, FetcherConfig, ParserConfig};
use chapter_trawl::crawler::{crawl, Crawler};
use chapter_trawl::storage::MemorySaver;
use chapter_trawl::{FetchError, TrawlError};
use std::time::{Duration, Instant};
use tokio_util::sync::CancellationToken;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const BODY_TEXT: &str =
    "The rain had not stopped for three days, and the river climbed the steps of the old mill.";

/// Creates a test configuration with fast pacing and no politeness sleep
fn create_test_config(delay_ms: u64) -> Config {
    Config {
        fetcher: FetcherConfig {
            user_agent: "TrawlTest/1.0".to_string(),
            delay_ms,
            timeout_secs: 5,
        },
        parser: ParserConfig {
            polite_delay_sec: 0,
            ..ParserConfig::default()
        },
    }
}

/// Renders a chapter page; `next` becomes a `<link rel="next">` when set
fn chapter_page(title: &str, next: Option<&str>) -> String {
    let link = next
        .map(|href| format!(r#"<link rel="next" href="{}">"#, href))
        .unwrap_or_default();
    format!(
        r#"<html><head>{}</head><body>
        <h1>{}</h1>
        <div class="entry-content"><p>{}</p></div>
        </body></html>"#,
        link, title, BODY_TEXT
    )
}

async fn mount_page(server: &MockServer, route: &str, body: String) {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(body)
                .insert_header("content-type", "text/html"),
        )
        .mount(server)
        .await;
}

/// Mounts `/ch1` -> `/ch2` -> `/ch3` with relative next links
async fn mount_three_chapter_chain(server: &MockServer) {
    mount_page(server, "/ch1", chapter_page("Chapter 1.1 Rain", Some("ch2"))).await;
    mount_page(server, "/ch2", chapter_page("Chapter 1.2 River", Some("/ch3"))).await;
    mount_page(server, "/ch3", chapter_page("Chapter 1.3 Mill", None)).await;
}

#[tokio::test]
async fn test_follows_chain_to_the_end() {
    let server = MockServer::start().await;
    mount_three_chapter_chain(&server).await;

    let config = create_test_config(10);
    let cancel = CancellationToken::new();
    let start = format!("{}/ch1", server.uri());

    let chapters = crawl(&config, &cancel, &start, 10).await.unwrap();

    assert_eq!(chapters.len(), 3);
    let codes: Vec<_> = chapters.iter().map(|c| c.code.as_str()).collect();
    assert_eq!(codes, vec!["1.1", "1.2", "1.3"]);
    assert_eq!(chapters[2].url, format!("{}/ch3", server.uri()));
    assert_eq!(chapters[0].html, format!("<p>{}</p>", BODY_TEXT));

    let requests = server.received_requests().await.unwrap();
    assert_eq!(requests.len(), 3);
}

#[tokio::test]
async fn test_page_budget_stops_early() {
    let server = MockServer::start().await;
    mount_three_chapter_chain(&server).await;

    let config = create_test_config(10);
    let cancel = CancellationToken::new();
    let start = format!("{}/ch1", server.uri());

    let chapters = crawl(&config, &cancel, &start, 2).await.unwrap();

    assert_eq!(chapters.len(), 2);
    let requests = server.received_requests().await.unwrap();
    assert_eq!(requests.len(), 2);
}

#[tokio::test]
async fn test_anchor_text_navigation() {
    let server = MockServer::start().await;
    let first = format!(
        r#"<html><body><h1>Chapter 2.1</h1>
        <div class="entry-content"><p>{}</p></div>
        <a href="/ch0">Previous</a> <a href="{}/ch2">Next Chapter</a>
        </body></html>"#,
        BODY_TEXT,
        server.uri()
    );
    mount_page(&server, "/ch1", first).await;
    mount_page(&server, "/ch2", chapter_page("Chapter 2.2", None)).await;

    let config = create_test_config(10);
    let chapters = crawl(
        &config,
        &CancellationToken::new(),
        &format!("{}/ch1", server.uri()),
        5,
    )
    .await
    .unwrap();

    assert_eq!(chapters.len(), 2);
    assert_eq!(chapters[1].code, "2.2");
}

#[tokio::test]
async fn test_short_page_fails_the_run() {
    let server = MockServer::start().await;
    mount_page(
        &server,
        "/ch1",
        r#"<html><body><article><p>Coming soon.</p></article></body></html>"#.to_string(),
    )
    .await;

    let config = create_test_config(10);
    let result = crawl(
        &config,
        &CancellationToken::new(),
        &format!("{}/ch1", server.uri()),
        3,
    )
    .await;

    match result {
        Err(TrawlError::ChapterTooShort { length, minimum, .. }) => {
            assert_eq!(length, "Coming soon.".len());
            assert_eq!(minimum, 50);
        }
        other => panic!("expected ChapterTooShort, got {:?}", other),
    }
}

#[tokio::test]
async fn test_not_found_is_a_hard_error() {
    let server = MockServer::start().await;
    mount_page(&server, "/ch1", chapter_page("Chapter 1.1", Some("/gone"))).await;
    Mock::given(method("GET"))
        .and(path("/gone"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let config = create_test_config(10);
    let saver = MemorySaver::new();
    let mut crawler = Crawler::from_config(&config)
        .unwrap()
        .with_saver(saver.clone());

    let result = crawler
        .run(
            &CancellationToken::new(),
            &format!("{}/ch1", server.uri()),
            5,
        )
        .await;

    match result {
        Err(TrawlError::Fetch {
            url,
            source: FetchError::Status { status, .. },
        }) => {
            assert!(url.ends_with("/gone"));
            assert_eq!(status.as_u16(), 404);
        }
        other => panic!("expected a 404 status error, got {:?}", other),
    }

    // The first chapter was persisted before the failure
    assert_eq!(saver.len(), 1);
}

#[tokio::test]
async fn test_server_error_is_a_hard_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/ch1"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let config = create_test_config(10);
    let result = crawl(
        &config,
        &CancellationToken::new(),
        &format!("{}/ch1", server.uri()),
        1,
    )
    .await;

    assert!(matches!(
        result,
        Err(TrawlError::Fetch {
            source: FetchError::Status { .. },
            ..
        })
    ));
}

#[tokio::test]
async fn test_sends_configured_user_agent() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/ch1"))
        .and(header("user-agent", "TrawlTest/1.0"))
        .respond_with(ResponseTemplate::new(200).set_body_string(chapter_page("Chapter 1.1", None)))
        .expect(1)
        .mount(&server)
        .await;

    let config = create_test_config(10);
    let chapters = crawl(
        &config,
        &CancellationToken::new(),
        &format!("{}/ch1", server.uri()),
        1,
    )
    .await
    .unwrap();

    assert_eq!(chapters.len(), 1);
}

#[tokio::test]
async fn test_redirects_are_followed() {
    let server = MockServer::start().await;
    let location = format!("{}/ch1", server.uri());
    Mock::given(method("GET"))
        .and(path("/old"))
        .respond_with(ResponseTemplate::new(301).insert_header("location", location.as_str()))
        .mount(&server)
        .await;
    mount_page(&server, "/ch1", chapter_page("Chapter 4.1", None)).await;

    let config = create_test_config(10);
    let chapters = crawl(
        &config,
        &CancellationToken::new(),
        &format!("{}/old", server.uri()),
        1,
    )
    .await
    .unwrap();

    assert_eq!(chapters.len(), 1);
    assert_eq!(chapters[0].code, "4.1");
}

#[tokio::test]
async fn test_requests_are_paced() {
    let server = MockServer::start().await;
    mount_three_chapter_chain(&server).await;

    let config = create_test_config(150);
    let started = Instant::now();
    let chapters = crawl(
        &config,
        &CancellationToken::new(),
        &format!("{}/ch1", server.uri()),
        3,
    )
    .await
    .unwrap();

    // First request is immediate, the next two each wait one period
    assert_eq!(chapters.len(), 3);
    assert!(started.elapsed() >= Duration::from_millis(290));
}

#[tokio::test]
async fn test_saver_receives_every_chapter_in_order() {
    let server = MockServer::start().await;
    mount_three_chapter_chain(&server).await;

    let config = create_test_config(10);
    let saver = MemorySaver::new();
    let mut crawler = Crawler::from_config(&config)
        .unwrap()
        .with_saver(saver.clone());

    let chapters = crawler
        .run(
            &CancellationToken::new(),
            &format!("{}/ch1", server.uri()),
            10,
        )
        .await
        .unwrap();

    assert_eq!(saver.chapters(), chapters);
}

#[tokio::test]
async fn test_cancellation_stops_the_run() {
    let server = MockServer::start().await;
    mount_three_chapter_chain(&server).await;

    let config = Config {
        parser: ParserConfig {
            polite_delay_sec: 30,
            ..ParserConfig::default()
        },
        ..create_test_config(10)
    };
    let cancel = CancellationToken::new();
    let trigger = cancel.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(200)).await;
        trigger.cancel();
    });

    let started = Instant::now();
    let result = crawl(&config, &cancel, &format!("{}/ch1", server.uri()), 10).await;

    assert!(matches!(result, Err(TrawlError::Cancelled)));
    assert!(started.elapsed() < Duration::from_secs(10));
}

#[tokio::test]
async fn test_unreachable_host_is_a_fetch_error() {
    let config = create_test_config(10);
    // Port 9 (discard) is expected to refuse connections locally
    let result = crawl(
        &config,
        &CancellationToken::new(),
        "http://127.0.0.1:9/ch1",
        1,
    )
    .await;

    assert!(matches!(
        result,
        Err(TrawlError::Fetch {
            source: FetchError::Http { .. },
            ..
        })
    ));
}

#[tokio::test]
async fn test_cancellation_interrupts_in_flight_request() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/slow"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(chapter_page("Chapter 5.1", None))
                .set_delay(Duration::from_secs(4)),
        )
        .mount(&server)
        .await;

    let config = create_test_config(10);
    let cancel = CancellationToken::new();
    let trigger = cancel.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(200)).await;
        trigger.cancel();
    });

    let started = Instant::now();
    let result = crawl(&config, &cancel, &format!("{}/slow", server.uri()), 1).await;

    assert!(matches!(result, Err(TrawlError::Cancelled)));
    assert!(started.elapsed() < Duration::from_secs(3));
}

#[tokio::test]
async fn test_cancellation_interrupts_limiter_wait() {
    let server = MockServer::start().await;
    mount_three_chapter_chain(&server).await;

    // The second request has to wait five seconds for a token
    let config = create_test_config(5000);
    let cancel = CancellationToken::new();
    let trigger = cancel.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(300)).await;
        trigger.cancel();
    });

    let started = Instant::now();
    let result = crawl(&config, &cancel, &format!("{}/ch1", server.uri()), 2).await;

    assert!(matches!(result, Err(TrawlError::Cancelled)));
    assert!(started.elapsed() < Duration::from_secs(3));

    let requests = server.received_requests().await.unwrap();
    assert_eq!(requests.len(), 1);
}

//! HTTP capture tests against a mock web server

use phishharvest::fetch::http::USER_AGENTS;
use phishharvest::fetch::{fetch_all, FetchStatus, HttpFetcher, PageFetcher};
use std::time::{Duration, Instant};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const KIT_HTML: &str = include_str!("fixtures/kit.html");

fn fetcher() -> HttpFetcher {
    HttpFetcher::new(220 * 1024).unwrap()
}

#[tokio::test]
async fn test_fetch_success_sends_browser_headers() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/login"))
        .respond_with(ResponseTemplate::new(200).set_body_string(KIT_HTML))
        .mount(&server)
        .await;

    let html = fetcher()
        .fetch(&format!("{}/login", server.uri()))
        .await
        .unwrap();
    assert_eq!(html, KIT_HTML);

    let requests = server.received_requests().await.unwrap();
    assert_eq!(requests.len(), 1);
    let headers = &requests[0].headers;

    let user_agent = headers.get("user-agent").unwrap().to_str().unwrap();
    assert!(USER_AGENTS.contains(&user_agent));
    assert!(headers
        .get("accept")
        .unwrap()
        .to_str()
        .unwrap()
        .starts_with("text/html"));
    assert_eq!(headers.get("upgrade-insecure-requests").unwrap(), "1");
}

#[tokio::test]
async fn test_fetch_error_status_is_none() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(404).set_body_string("not found"))
        .mount(&server)
        .await;

    assert!(fetcher()
        .fetch(&format!("{}/gone", server.uri()))
        .await
        .is_none());
}

#[tokio::test]
async fn test_fetch_oversized_content_length_is_none() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_string("x".repeat(8 * 1024)))
        .mount(&server)
        .await;

    let small = HttpFetcher::new(1024).unwrap();
    assert!(small
        .fetch(&format!("{}/big", server.uri()))
        .await
        .is_none());
}

#[tokio::test]
async fn test_fetch_drops_invalid_utf8() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(
            ResponseTemplate::new(200).set_body_raw(b"<p>Sign\xff in</p>".to_vec(), "text/html"),
        )
        .mount(&server)
        .await;

    let html = fetcher()
        .fetch(&format!("{}/latin1", server.uri()))
        .await
        .unwrap();
    assert_eq!(html, "<p>Sign in</p>");
}

#[tokio::test]
async fn test_fetch_follows_short_redirect_chain() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/start"))
        .respond_with(
            ResponseTemplate::new(302).insert_header("location", format!("{}/kit", server.uri())),
        )
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/kit"))
        .respond_with(ResponseTemplate::new(200).set_body_string(KIT_HTML))
        .mount(&server)
        .await;

    let html = fetcher()
        .fetch(&format!("{}/start", server.uri()))
        .await;
    assert_eq!(html.as_deref(), Some(KIT_HTML));
}

#[tokio::test]
async fn test_fetch_too_many_redirects_is_none() {
    let server = MockServer::start().await;
    for hop in 0..5 {
        Mock::given(method("GET"))
            .and(path(format!("/hop{}", hop)))
            .respond_with(
                ResponseTemplate::new(302)
                    .insert_header("location", format!("{}/hop{}", server.uri(), hop + 1)),
            )
            .mount(&server)
            .await;
    }
    Mock::given(method("GET"))
        .and(path("/hop5"))
        .respond_with(ResponseTemplate::new(200).set_body_string(KIT_HTML))
        .mount(&server)
        .await;

    assert!(fetcher()
        .fetch(&format!("{}/hop0", server.uri()))
        .await
        .is_none());
}

#[tokio::test]
async fn test_fetch_all_keeps_order_and_status() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/ok"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<p>ok</p>"))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/fail"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let urls = vec![
        format!("{}/fail", server.uri()),
        format!("{}/ok", server.uri()),
        format!("{}/ok", server.uri()),
    ];
    let captures = fetch_all(&fetcher(), &urls, 2).await;

    let statuses: Vec<FetchStatus> = captures.iter().map(|c| c.status()).collect();
    assert_eq!(
        statuses,
        vec![FetchStatus::Failed, FetchStatus::Success, FetchStatus::Success]
    );
    assert_eq!(captures[0].url, urls[0]);
    assert_eq!(captures[1].html.as_deref(), Some("<p>ok</p>"));
}

/// Serves one chunked response without `Content-Length`, pausing between chunks
async fn chunked_server(chunks: usize, chunk_size: usize, pause: Duration) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        let (mut socket, _) = listener.accept().await.unwrap();
        let mut request = vec![0u8; 4096];
        let _ = socket.read(&mut request).await;

        let head = "HTTP/1.1 200 OK\r\nContent-Type: text/html\r\nTransfer-Encoding: chunked\r\n\r\n";
        if socket.write_all(head.as_bytes()).await.is_err() {
            return;
        }

        let data = "a".repeat(chunk_size);
        for _ in 0..chunks {
            let frame = format!("{:x}\r\n{}\r\n", chunk_size, data);
            if socket.write_all(frame.as_bytes()).await.is_err() {
                return;
            }
            let _ = socket.flush().await;
            if !pause.is_zero() {
                tokio::time::sleep(pause).await;
            }
        }
        let _ = socket.write_all(b"0\r\n\r\n").await;
    });

    format!("http://{}/stream", addr)
}

#[tokio::test]
async fn test_chunked_body_is_truncated_at_size_cap() {
    let url = chunked_server(64, 256, Duration::ZERO).await;

    let html = HttpFetcher::new(1024).unwrap().fetch(&url).await.unwrap();

    assert!(html.len() > 1024, "kept {} bytes", html.len());
    assert!(html.len() <= 1024 + 256, "kept {} bytes", html.len());
}

#[tokio::test]
async fn test_slow_body_stops_at_stream_budget() {
    let url = chunked_server(40, 64, Duration::from_millis(100)).await;
    let fetcher = HttpFetcher::new(220 * 1024)
        .unwrap()
        .with_stream_budget(Duration::from_millis(300));

    let start = Instant::now();
    let html = fetcher.fetch(&url).await.unwrap();

    assert!(!html.is_empty());
    assert!(html.len() < 40 * 64, "kept {} bytes", html.len());
    assert!(start.elapsed() < Duration::from_secs(2));
}

//! Supabase insert tests against a mock PostgREST endpoint

use phishharvest::store::{PhishRecord, RecordSink, StoreError, SupabaseSink};
use std::time::Duration;
use url::Url;
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, Request, Respond, ResponseTemplate};

const TABLE_PATH: &str = "/rest/v1/daily_phish";

/// Answers like PostgREST with `Prefer: return=representation`
struct EchoRows;

impl Respond for EchoRows {
    fn respond(&self, request: &Request) -> ResponseTemplate {
        ResponseTemplate::new(201).set_body_raw(request.body.clone(), "application/json")
    }
}

fn record(n: usize) -> PhishRecord {
    PhishRecord {
        url: format!("http://phish{}.example.test/login", n),
        html_content: format!("<html><body>kit {}</body></html>", n),
        target: "Microsoft".to_string(),
        verification_time: "2024-05-01T10:00:00+00:00".to_string(),
        fetched_date: "2024-05-02".to_string(),
    }
}

fn sink(server: &MockServer, batch_size: usize) -> SupabaseSink {
    let base = Url::parse(&server.uri()).unwrap();
    SupabaseSink::new(
        &base,
        "service-key",
        "daily_phish",
        batch_size,
        Duration::from_secs(5),
    )
    .unwrap()
}

#[tokio::test]
async fn test_insert_sends_postgrest_headers() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(TABLE_PATH))
        .and(header("apikey", "service-key"))
        .and(header("authorization", "Bearer service-key"))
        .and(header("content-type", "application/json"))
        .and(header("prefer", "return=representation"))
        .and(body_json(vec![record(1)]))
        .respond_with(EchoRows)
        .expect(1)
        .mount(&server)
        .await;

    let inserted = sink(&server, 50).insert(&[record(1)]).await.unwrap();
    assert_eq!(inserted, 1);
}

#[tokio::test]
async fn test_insert_in_batches() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(TABLE_PATH))
        .respond_with(EchoRows)
        .expect(3)
        .mount(&server)
        .await;

    let records: Vec<PhishRecord> = (0..5).map(record).collect();
    let inserted = sink(&server, 2).insert(&records).await.unwrap();
    assert_eq!(inserted, 5);

    let requests = server.received_requests().await.unwrap();
    let sizes: Vec<usize> = requests
        .iter()
        .map(|r| {
            serde_json::from_slice::<Vec<serde_json::Value>>(&r.body)
                .unwrap()
                .len()
        })
        .collect();
    assert_eq!(sizes, vec![2, 2, 1]);
}

#[tokio::test]
async fn test_insert_rejected() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(TABLE_PATH))
        .respond_with(
            ResponseTemplate::new(401).set_body_string(r#"{"message":"Invalid API key"}"#),
        )
        .mount(&server)
        .await;

    let err = sink(&server, 50).insert(&[record(1)]).await.unwrap_err();
    match err {
        StoreError::Rejected { status, body } => {
            assert_eq!(status, 401);
            assert!(body.contains("Invalid API key"));
        }
        other => panic!("Expected Rejected error, got {:?}", other),
    }
}

#[tokio::test]
async fn test_insert_stops_at_first_failed_batch() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(TABLE_PATH))
        .respond_with(ResponseTemplate::new(409).set_body_string("duplicate key"))
        .expect(1)
        .mount(&server)
        .await;

    let records: Vec<PhishRecord> = (0..4).map(record).collect();
    assert!(sink(&server, 2).insert(&records).await.is_err());
}

#[tokio::test]
async fn test_insert_reports_rows_stored_before_failure() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(TABLE_PATH))
        .respond_with(EchoRows)
        .up_to_n_times(1)
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path(TABLE_PATH))
        .respond_with(ResponseTemplate::new(500).set_body_string("connection reset"))
        .expect(1)
        .mount(&server)
        .await;

    let records: Vec<PhishRecord> = (0..4).map(record).collect();
    let err = sink(&server, 2).insert(&records).await.unwrap_err();

    assert_eq!(err.rows_inserted(), 2);
    match err {
        StoreError::PartialInsert { inserted, source } => {
            assert_eq!(inserted, 2);
            assert!(matches!(*source, StoreError::Rejected { status: 500, .. }));
        }
        other => panic!("Expected PartialInsert error, got {:?}", other),
    }
}

#[tokio::test]
async fn test_first_batch_failure_stores_nothing() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(TABLE_PATH))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let records: Vec<PhishRecord> = (0..4).map(record).collect();
    let err = sink(&server, 2).insert(&records).await.unwrap_err();
    assert_eq!(err.rows_inserted(), 0);
    assert!(matches!(err, StoreError::Rejected { status: 500, .. }));
}

#[tokio::test]
async fn test_insert_unexpected_body() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(TABLE_PATH))
        .respond_with(ResponseTemplate::new(201).set_body_string(""))
        .mount(&server)
        .await;

    let err = sink(&server, 50).insert(&[record(1)]).await.unwrap_err();
    assert!(matches!(err, StoreError::InvalidResponse(_)));
}

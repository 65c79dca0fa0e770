mod common;

use common::{mount_page, pipeline, unreachable_url};
use std::collections::HashSet;
use std::time::{Duration, Instant};
use surface_probe::core::models::{Document, DropReason};
use surface_probe::core::scanner::target_scanner::{TargetExpander, documents_from_urls};
use surface_probe::core::storage::{DocumentFilter, DocumentStore, MemoryStore, StoreError};
use async_trait::async_trait;
use wiremock::matchers::method;
use wiremock::{Mock, MockServer, ResponseTemplate};

#[tokio::test]
async fn test_empty_candidate_set_yields_empty_report() {
    let report = pipeline(10).run(Vec::new()).await;
    assert_eq!(report.candidates, 0);
    assert!(report.documents.is_empty());
    assert!(report.dropped.is_empty());
}

#[tokio::test]
async fn test_batch_returns_only_kept_results_after_all_jobs_finish() {
    let server = MockServer::start().await;
    mount_page(&server, "/ok", 200, "<title>ok</title>").await;
    mount_page(&server, "/moved", 301, "").await;
    mount_page(&server, "/bad", 400, "bad request").await;

    let base = server.uri();
    let mut urls = Vec::new();
    for _ in 0..4 {
        urls.push(format!("{base}/ok"));
        urls.push(format!("{base}/moved"));
    }
    for _ in 0..3 {
        urls.push(format!("{base}/bad"));
    }
    let dead = unreachable_url();
    urls.push(dead.clone());
    urls.push(dead);

    let candidates = documents_from_urls(&urls);
    assert_eq!(candidates.len(), 13);
    let ids: HashSet<_> = candidates.iter().map(|d| d.id).collect();

    let report = pipeline(4).run(candidates).await;

    assert_eq!(report.candidates, 13);
    assert_eq!(report.documents.len(), 8);
    assert_eq!(report.dropped.len(), 5);
    assert_eq!(report.finished(), 13);
    assert!(report.documents.iter().all(|d| d.status == 200 || d.status == 301));
    assert!(report.documents.iter().all(|d| ids.contains(&d.id)));
    assert!(report.documents.iter().all(|d| d.updated_at.is_some()));

    let protocol = report.dropped.iter().filter(|d| d.reason == DropReason::ProtocolMismatch).count();
    let network = report.dropped.iter().filter(|d| matches!(d.reason, DropReason::Network(_))).count();
    assert_eq!(protocol, 3);
    assert_eq!(network, 2);

    let unique: HashSet<_> = report.documents.iter().map(|d| d.id).collect();
    assert_eq!(unique.len(), report.documents.len(), "each candidate is kept at most once");
}

#[tokio::test]
async fn test_pool_size_bounds_concurrency() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_millis(200)))
        .mount(&server)
        .await;

    let candidates = documents_from_urls((0..4).map(|i| format!("{}/slow/{i}", server.uri())));
    let started = Instant::now();
    let report = pipeline(2).run(candidates).await;

    assert_eq!(report.documents.len(), 4);
    // Two workers, four 200ms jobs: at least two rounds.
    assert!(started.elapsed() >= Duration::from_millis(400));
}

#[tokio::test]
async fn test_zero_workers_still_completes() {
    let server = MockServer::start().await;
    mount_page(&server, "/", 200, "hi").await;
    let candidates = documents_from_urls([format!("{}/", server.uri()), format!("{}/", server.uri())]);

    let scan = pipeline(0);
    assert_eq!(scan.workers(), 1);
    assert_eq!(scan.run(candidates).await.documents.len(), 2);
}

#[tokio::test]
async fn test_hostname_expansion_end_to_end() {
    let candidates = TargetExpander::default().expand_hosts(["example.com"]);
    assert_eq!(candidates.len(), 10);
    assert_eq!(candidates[0].url, "http://example.com:80");

    // Serve the first candidate's answer from a local server.
    let server = MockServer::start().await;
    mount_page(&server, "/", 200, r#"<html><title> Example </title><a href="/x">l</a></html>"#).await;
    let mut first = candidates.into_iter().next().unwrap();
    first.url = format!("{}/", server.uri());

    let report = pipeline(100).run(vec![first]).await;
    assert_eq!(report.documents.len(), 1);
    let doc = &report.documents[0];
    assert_eq!(doc.domain, "example.com");
    assert_eq!(doc.title, "Example");
    assert_eq!(doc.links, vec!["/x"]);
    assert!(doc.forms.is_empty());
    assert!(doc.scripts.is_empty());
}

#[tokio::test]
async fn test_scan_and_store_persists_kept_documents_once() {
    let server = MockServer::start().await;
    mount_page(&server, "/a", 200, "a").await;
    mount_page(&server, "/b", 400, "b").await;
    let candidates = documents_from_urls([format!("{}/a", server.uri()), format!("{}/b", server.uri())]);

    let store = MemoryStore::new();
    let report = pipeline(5).scan_and_store(candidates, &store).await.unwrap();

    assert_eq!(report.documents.len(), 1);
    let stored = store.find(&DocumentFilter::All).await.unwrap();
    assert_eq!(stored, report.documents);
    assert!(stored.iter().all(|d| d.status != 0));
}

struct FailingStore;

#[async_trait]
impl DocumentStore for FailingStore {
    async fn insert_one(&self, _doc: Document) -> Result<(), StoreError> {
        Err(refused())
    }

    async fn insert_many(&self, _docs: Vec<Document>) -> Result<(), StoreError> {
        Err(refused())
    }

    async fn find(&self, _filter: &DocumentFilter) -> Result<Vec<Document>, StoreError> {
        Ok(Vec::new())
    }

    async fn delete(&self, _filter: &DocumentFilter) -> Result<u64, StoreError> {
        Ok(0)
    }
}

fn refused() -> StoreError {
    StoreError::Io {
        path: "unavailable".into(),
        source: std::io::Error::new(std::io::ErrorKind::ConnectionRefused, "store offline"),
    }
}

#[tokio::test]
async fn test_storage_failure_is_surfaced() {
    let server = MockServer::start().await;
    mount_page(&server, "/", 200, "up").await;
    let candidates = documents_from_urls([format!("{}/", server.uri())]);

    let result = pipeline(1).scan_and_store(candidates, &FailingStore).await;
    assert!(matches!(result, Err(StoreError::Io { .. })));
}

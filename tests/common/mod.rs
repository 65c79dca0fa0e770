#![allow(dead_code)]

use async_trait::async_trait;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use surface_probe::core::scanner::ScanPipeline;
use surface_probe::core::scanner::dns_scanner::CnameResolver;
use surface_probe::core::scanner::http_scanner::{Prober, build_client};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Answers every CNAME lookup with the same value and counts the calls.
#[derive(Default)]
pub struct StaticResolver {
    pub answer: String,
    pub calls: AtomicUsize,
}

impl StaticResolver {
    pub fn new(answer: &str) -> Arc<Self> {
        Arc::new(Self { answer: answer.to_string(), calls: AtomicUsize::new(0) })
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl CnameResolver for StaticResolver {
    async fn lookup_cname(&self, _host: &str) -> String {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.answer.clone()
    }
}

pub fn prober_with(resolver: Arc<StaticResolver>, timeout: Duration) -> Prober {
    let client = build_client(timeout, "surface-probe-tests").unwrap();
    Prober::new(client, resolver)
}

pub fn prober() -> Prober {
    prober_with(StaticResolver::new(""), Duration::from_secs(3))
}

pub fn pipeline(workers: usize) -> ScanPipeline {
    ScanPipeline::new(prober(), workers)
}

/// Mounts `GET path` answering `status` with an HTML body.
pub async fn mount_page(server: &MockServer, url_path: &str, status: u16, body: &str) {
    Mock::given(method("GET"))
        .and(path(url_path))
        .respond_with(
            ResponseTemplate::new(status)
                .set_body_string(body.to_string())
                .insert_header("content-type", "text/html; charset=utf-8"),
        )
        .mount(server)
        .await;
}

/// A local URL nothing listens on.
pub fn unreachable_url() -> String {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let port = listener.local_addr().unwrap().port();
    drop(listener);
    format!("http://127.0.0.1:{port}/")
}

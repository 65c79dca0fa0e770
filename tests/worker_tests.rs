mod common;

use common::{StaticResolver, mount_page, prober, prober_with, unreachable_url};
use std::time::Duration;
use surface_probe::core::models::{Document, DropReason, ProbeOutcome, TakeoverVerdict};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use wiremock::matchers::method;
use wiremock::{Mock, MockServer, ResponseTemplate};

fn target(url: String) -> Document {
    Document::candidate("example.com", "http", url)
}

fn kept(outcome: ProbeOutcome) -> Document {
    match outcome {
        ProbeOutcome::Kept(doc) => *doc,
        ProbeOutcome::Dropped(dropped) => panic!("expected kept, got dropped: {}", dropped.reason),
    }
}

#[tokio::test]
async fn test_http_200_page_is_extracted() {
    let server = MockServer::start().await;
    let body = r#"<html><title> Example </title><a href="/x">l</a></html>"#;
    mount_page(&server, "/", 200, body).await;

    let resolver = StaticResolver::new("example.github.io.");
    let prober = prober_with(resolver.clone(), Duration::from_secs(3));
    let candidate = target(format!("{}/", server.uri()));
    let id = candidate.id;
    let created = candidate.created_at;

    let doc = kept(prober.probe(candidate).await);

    assert_eq!(doc.id, id);
    assert_eq!(doc.created_at, created);
    assert_eq!(doc.status, 200);
    assert_eq!(doc.method, "GET");
    assert_eq!(doc.scheme, "http");
    assert!(doc.host.starts_with("127.0.0.1:"));
    assert_eq!(doc.title, "Example");
    assert_eq!(doc.links, vec!["/x"]);
    assert!(doc.forms.is_empty());
    assert!(doc.scripts.is_empty());
    assert_eq!(doc.cname, "example.github.io.");
    assert_eq!(doc.subdomain_takeover, Some(TakeoverVerdict::NotVulnerable));
    assert_eq!(doc.header.get("Content-Type"), Some("text/html; charset=utf-8"));
    let updated = doc.updated_at.expect("updated_at set after processing");
    assert!(updated >= created);
    assert_eq!(resolver.calls(), 1);
}

#[tokio::test]
async fn test_http_400_is_dropped_as_protocol_mismatch() {
    let server = MockServer::start().await;
    mount_page(&server, "/", 400, "The plain HTTP request was sent to HTTPS port").await;

    let resolver = StaticResolver::new("");
    let prober = prober_with(resolver.clone(), Duration::from_secs(3));
    let outcome = prober.probe(target(format!("{}/", server.uri()))).await;

    match outcome {
        ProbeOutcome::Dropped(dropped) => assert_eq!(dropped.reason, DropReason::ProtocolMismatch),
        ProbeOutcome::Kept(_) => panic!("HTTP 400 must be dropped"),
    }
    assert_eq!(resolver.calls(), 0);
}

#[tokio::test]
async fn test_non_400_statuses_are_kept() {
    let server = MockServer::start().await;
    mount_page(&server, "/ok", 200, "ok").await;
    mount_page(&server, "/forbidden", 403, "nope").await;
    mount_page(&server, "/error", 500, "boom").await;

    let prober = prober();
    for (route, status) in [("/ok", 200), ("/forbidden", 403), ("/error", 500)] {
        let doc = kept(prober.probe(target(format!("{}{}", server.uri(), route))).await);
        assert_eq!(doc.status, status);
    }
}

#[tokio::test]
async fn test_redirect_is_not_followed() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(301).insert_header("location", "https://elsewhere.example/"))
        .mount(&server)
        .await;

    let doc = kept(prober().probe(target(format!("{}/", server.uri()))).await);
    assert_eq!(doc.status, 301);
    assert_eq!(doc.header.get("location"), Some("https://elsewhere.example/"));
    assert!(doc.url.starts_with(&server.uri()));
}

#[tokio::test]
async fn test_unreachable_endpoint_is_dropped_as_network_error() {
    let resolver = StaticResolver::new("");
    let prober = prober_with(resolver.clone(), Duration::from_secs(3));
    let outcome = prober.probe(target(unreachable_url())).await;

    assert!(matches!(
        outcome,
        ProbeOutcome::Dropped(ref d) if matches!(d.reason, DropReason::Network(_))
    ));
    assert_eq!(resolver.calls(), 0);
}

#[tokio::test]
async fn test_slow_endpoint_times_out_and_is_dropped() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(2)))
        .mount(&server)
        .await;

    let prober = prober_with(StaticResolver::new(""), Duration::from_millis(300));
    let outcome = prober.probe(target(format!("{}/", server.uri()))).await;
    assert!(!outcome.is_kept());
}

#[tokio::test]
async fn test_takeover_fingerprint_in_body() {
    let server = MockServer::start().await;
    mount_page(&server, "/", 404, "<html><body><h1>Repository not found</h1></body></html>").await;

    let doc = kept(prober().probe(target(format!("{}/", server.uri()))).await);
    assert_eq!(doc.status, 404);
    assert_eq!(doc.subdomain_takeover, Some(TakeoverVerdict::PossibleVulnerable));
}

#[tokio::test]
async fn test_forms_and_scripts_are_extracted() {
    let server = MockServer::start().await;
    let body = r#"
        <html><head><script src="/app.js"></script><script src="/app.js"></script></head>
        <body>
          <form method="post" action="/login">
            <input type="hidden" name="csrf_token" value="abc">
            <input type="text" name="username">
          </form>
          <form method="post" action="/login">
            <input type="hidden" name="csrf_token" value="abc">
            <input type="text" name="username">
          </form>
        </body></html>
    "#;
    mount_page(&server, "/", 200, body).await;

    let doc = kept(prober().probe(target(format!("{}/", server.uri()))).await);
    assert_eq!(doc.scripts, vec!["/app.js"]);
    assert_eq!(doc.forms.len(), 1);
    assert!(doc.forms[0].csrf);
    assert_eq!(doc.forms[0].inputs.len(), 2);
}

#[tokio::test]
async fn test_truncated_body_keeps_metadata_only() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        let (mut socket, _) = listener.accept().await.unwrap();
        let mut buf = [0u8; 1024];
        let _ = socket.read(&mut buf).await;
        // Promise 500 bytes, send a few, then hang up.
        let head = "HTTP/1.1 200 OK\r\nContent-Length: 500\r\nContent-Type: text/html\r\n\r\n<title>partial";
        socket.write_all(head.as_bytes()).await.unwrap();
        socket.shutdown().await.unwrap();
    });

    let resolver = StaticResolver::new("cdn.example.net.");
    let prober = prober_with(resolver.clone(), Duration::from_secs(3));
    let doc = kept(prober.probe(target(format!("http://{addr}/"))).await);

    assert_eq!(doc.status, 200);
    assert_eq!(doc.header.get("content-type"), Some("text/html"));
    assert_eq!(doc.title, "");
    assert!(doc.links.is_empty());
    assert_eq!(doc.cname, "cdn.example.net.");
    assert_eq!(doc.subdomain_takeover, Some(TakeoverVerdict::NotVulnerable));
    assert!(doc.updated_at.is_some());
    assert_eq!(resolver.calls(), 1);
}

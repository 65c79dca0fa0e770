// src/core/scanner/http_scanner.rs

use crate::core::models::{DropReason, Document, Headers, ProbeOutcome};
use crate::core::scanner::content_scanner::extract_content;
use crate::core::scanner::dns_scanner::CnameResolver;
use crate::core::scanner::takeover_scanner::check_takeover;
use chrono::Utc;
use reqwest::{Client, Method, StatusCode, redirect};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};
use url::Url;

/// Builds the HTTP client shared by all workers of a scan.
///
/// Redirects are never followed, so a 3xx is recorded as the endpoint's
/// answer. `timeout` bounds both the connect phase and the whole exchange,
/// body included.
pub fn build_client(timeout: Duration, user_agent: &str) -> reqwest::Result<Client> {
    Client::builder()
        .user_agent(user_agent)
        .redirect(redirect::Policy::none())
        .connect_timeout(timeout)
        .timeout(timeout)
        .build()
}

/// Fetches one candidate and turns it into a tagged outcome.
///
/// Holds only shared, read-only handles, so one `Prober` serves every
/// worker task of a pipeline.
#[derive(Clone)]
pub struct Prober {
    client: Client,
    resolver: Arc<dyn CnameResolver>,
}

impl Prober {
    pub fn new(client: Client, resolver: Arc<dyn CnameResolver>) -> Self {
        Self { client, resolver }
    }

    /// Probes a single candidate.
    ///
    /// The candidate is consumed: the returned document is the same value,
    /// filled in with what the endpoint answered.
    ///
    /// # Arguments
    /// * `doc` - A candidate produced by the target expander.
    ///
    /// # Returns
    /// `Kept` with the populated document for any status except 400,
    /// `Dropped` for network failures and HTTP 400.
    pub async fn probe(&self, mut doc: Document) -> ProbeOutcome {
        debug!(url = %doc.url, "Probing candidate.");

        let response = match self.client.request(Method::GET, &doc.url).send().await {
            Ok(res) => res,
            Err(e) => {
                debug!(url = %doc.url, error = %e, "Request failed, dropping candidate.");
                return ProbeOutcome::dropped(&doc.url, DropReason::Network(e.to_string()));
            }
        };

        let status = response.status();
        if status == StatusCode::BAD_REQUEST {
            debug!(url = %doc.url, "HTTP 400, likely plaintext on a TLS port, dropping candidate.");
            return ProbeOutcome::dropped(&doc.url, DropReason::ProtocolMismatch);
        }

        doc.method = Method::GET.to_string();
        doc.status = status.as_u16();
        doc.header = Headers::from(response.headers());
        doc.scheme = response.url().scheme().to_string();
        doc.host = host_with_port(response.url());

        let body = match response.bytes().await {
            Ok(bytes) => Some(bytes),
            Err(e) => {
                warn!(url = %doc.url, error = %e, "Failed to read response body, keeping metadata only.");
                None
            }
        };

        let lookup_host = cname_target(&doc);
        doc.cname = self.resolver.lookup_cname(&lookup_host).await;
        doc.subdomain_takeover = Some(check_takeover(body.as_deref().unwrap_or_default()));

        if let Some(bytes) = &body {
            doc.apply_content(extract_content(bytes));
        }
        doc.updated_at = Some(Utc::now());

        info!(url = %doc.url, status = doc.status, "Candidate kept.");
        ProbeOutcome::Kept(Box::new(doc))
    }
}

/// The request host as sent on the wire, `host[:port]`.
fn host_with_port(url: &Url) -> String {
    let host = url.host_str().unwrap_or_default();
    match url.port() {
        Some(port) => format!("{host}:{port}"),
        None => host.to_string(),
    }
}

/// The name to resolve: the candidate's domain, or the URL host for targets
/// that arrived without one.
fn cname_target(doc: &Document) -> String {
    if !doc.domain.is_empty() {
        return doc.domain.clone();
    }
    Url::parse(&doc.url)
        .ok()
        .and_then(|url| url.host_str().map(String::from))
        .unwrap_or_default()
}

// src/core/scanner/target_scanner.rs

use crate::core::models::Document;
use std::io::BufRead;
use tracing::{debug, info, warn};
use url::Url;

/// Schemes probed for every bare hostname.
pub const DEFAULT_SCHEMES: &[&str] = &["http", "https"];
/// Ports probed for every scheme.
pub const DEFAULT_PORTS: &[u16] = &[80, 443, 8000, 8080, 8443];

/// Turns raw hostnames into candidate documents, one per scheme and port.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TargetExpander {
    schemes: Vec<String>,
    ports: Vec<u16>,
}

impl Default for TargetExpander {
    fn default() -> Self {
        Self::new(DEFAULT_SCHEMES.iter().map(|s| s.to_string()).collect(), DEFAULT_PORTS.to_vec())
    }
}

impl TargetExpander {
    pub fn new(schemes: Vec<String>, ports: Vec<u16>) -> Self {
        Self { schemes, ports }
    }

    /// Expands hostnames into candidates.
    ///
    /// Output is scheme-major, port-minor, in input order, so identical input
    /// always yields the same URL sequence. Blank lines, `#` comments and
    /// malformed hostnames are skipped.
    pub fn expand_hosts<I, S>(&self, lines: I) -> Vec<Document>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut candidates = Vec::new();
        let mut hosts = 0usize;
        for line in lines {
            let Some(host) = normalize_host(line.as_ref()) else {
                continue;
            };
            hosts += 1;
            for scheme in &self.schemes {
                for port in &self.ports {
                    let url = format!("{scheme}://{host}:{port}");
                    candidates.push(Document::candidate(&host, scheme, url));
                }
            }
        }
        info!(hosts, candidates = candidates.len(), "Expanded hostnames into candidates.");
        candidates
    }

    /// Reads one hostname per line from `reader` and expands them.
    ///
    /// Lines that are not valid UTF-8 are skipped like malformed ones. Reading
    /// stops at the first I/O error, keeping the hosts read so far.
    pub fn expand_reader<R: BufRead>(&self, reader: R) -> Vec<Document> {
        let mut lines = Vec::new();
        for raw in reader.split(b'\n') {
            let raw = match raw {
                Ok(raw) => raw,
                Err(e) => {
                    warn!(error = %e, "Failed to read hostname input, stopping.");
                    break;
                }
            };
            match String::from_utf8(raw) {
                Ok(line) => lines.push(line),
                Err(_) => debug!("Skipping line that is not valid UTF-8."),
            }
        }
        self.expand_hosts(lines)
    }
}

/// Explicit-URL mode: the targets already carry their scheme and URL and are
/// dispatched as they are.
pub fn expand_documents(documents: Vec<Document>) -> Vec<Document> {
    debug!(candidates = documents.len(), "Using explicit target list.");
    documents
}

/// Builds candidates from fully specified URLs, skipping any that do not parse.
pub fn documents_from_urls<I, S>(urls: I) -> Vec<Document>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    urls.into_iter().filter_map(|u| Document::from_url(u.as_ref())).collect()
}

/// Returns the trimmed hostname on the line, or `None` if the line should be
/// skipped. The hostname is kept as written; URL parsing only validates it.
fn normalize_host(line: &str) -> Option<String> {
    let host = line.trim();
    if host.is_empty() || host.starts_with('#') {
        return None;
    }
    if host.chars().any(|c| c.is_whitespace() || matches!(c, '/' | '?' | '#' | '@' | ':')) {
        debug!(line = host, "Skipping malformed hostname.");
        return None;
    }
    match Url::parse(&format!("http://{host}")) {
        Ok(parsed) if parsed.host_str().is_some() => Some(host.to_string()),
        _ => {
            debug!(line = host, "Skipping hostname the URL parser rejects.");
            None
        }
    }
}

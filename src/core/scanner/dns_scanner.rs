// src/core/scanner/dns_scanner.rs

use async_trait::async_trait;
use hickory_resolver::TokioAsyncResolver;
use hickory_resolver::config::{NameServerConfigGroup, ResolverConfig, ResolverOpts};
use hickory_resolver::proto::rr::{RData, RecordType};
use std::net::SocketAddr;
use std::time::Duration;
use tracing::{debug, warn};

/// Resolves the CNAME record of a hostname.
///
/// Implementations never fail: any lookup problem yields an empty string.
#[async_trait]
pub trait CnameResolver: Send + Sync {
    async fn lookup_cname(&self, host: &str) -> String;
}

/// CNAME lookups against a single fixed upstream resolver.
pub struct UpstreamResolver {
    resolver: TokioAsyncResolver,
    upstream: SocketAddr,
}

impl UpstreamResolver {
    /// Builds a resolver that sends recursive queries to `upstream` only.
    ///
    /// # Arguments
    /// * `upstream` - Address of the recursive resolver, e.g. `8.8.8.8:53`.
    /// * `timeout` - Per-query timeout. Queries are attempted once.
    pub fn new(upstream: SocketAddr, timeout: Duration) -> Self {
        let name_servers = NameServerConfigGroup::from_ips_clear(&[upstream.ip()], upstream.port(), true);
        let config = ResolverConfig::from_parts(None, Vec::new(), name_servers);

        let mut opts = ResolverOpts::default();
        opts.timeout = timeout;
        opts.attempts = 1;
        // Every candidate of a host shares the same answer, cache it.
        opts.cache_size = 1024;

        Self {
            resolver: TokioAsyncResolver::tokio(config, opts),
            upstream,
        }
    }
}

#[async_trait]
impl CnameResolver for UpstreamResolver {
    async fn lookup_cname(&self, host: &str) -> String {
        let host = host.trim().trim_end_matches('.');
        if host.is_empty() {
            return String::new();
        }

        let fqdn = format!("{host}.");
        debug!(target = %fqdn, upstream = %self.upstream, "Looking up CNAME record.");
        match self.resolver.lookup(fqdn.as_str(), RecordType::CNAME).await {
            Ok(answer) => {
                // The last CNAME in the answer is the one reported.
                let cname = answer
                    .iter()
                    .filter_map(|rdata| match rdata {
                        RData::CNAME(cname) => Some(cname.0.to_utf8()),
                        _ => None,
                    })
                    .last()
                    .unwrap_or_default();
                debug!(target = %fqdn, cname = %cname, "CNAME lookup finished.");
                cname
            }
            Err(e) => {
                warn!(target = %fqdn, error = %e, "CNAME lookup failed.");
                String::new()
            }
        }
    }
}

// src/core/scanner/takeover_scanner.rs

use tracing::debug;

use crate::core::knowledge_base::{FINGERPRINTS, ProviderFingerprint};
use crate::core::models::TakeoverVerdict;

/// Returns the first provider whose fingerprint occurs in `body`, if any.
pub fn match_fingerprint(body: &[u8]) -> Option<&'static ProviderFingerprint> {
    FINGERPRINTS
        .iter()
        .find(|entry| contains_bytes(body, entry.fingerprint.as_bytes()))
}

/// Runs the subdomain-takeover fingerprint check against a raw response body.
///
/// The first matching fingerprint short-circuits to `PossibleVulnerable`.
/// A body with no match, including an empty one, is `NotVulnerable`.
pub fn check_takeover(body: &[u8]) -> TakeoverVerdict {
    match match_fingerprint(body) {
        Some(entry) => {
            debug!(provider = entry.provider, "Takeover fingerprint matched.");
            TakeoverVerdict::PossibleVulnerable
        }
        None => TakeoverVerdict::NotVulnerable,
    }
}

fn contains_bytes(haystack: &[u8], needle: &[u8]) -> bool {
    if needle.is_empty() {
        return true;
    }
    haystack.windows(needle.len()).any(|window| window == needle)
}

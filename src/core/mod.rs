// src/core/mod.rs

/// Data structures shared by every stage: `Document`, `Form`, the takeover
/// verdict and the per-candidate outcome types.
pub mod models;

/// The scan pipeline and its stages: target expansion, fetching, content
/// extraction, CNAME resolution and the takeover check.
pub mod scanner;

/// Static fingerprint table of hosting providers' unclaimed-domain pages.
pub mod knowledge_base;

/// The document-store interface scan results are persisted through.
pub mod storage;

// src/lib.rs

//! Probes web endpoints derived from hostnames or explicit URLs, extracts
//! titles, links, forms and scripts from each response, flags possible
//! subdomain takeovers, and hands the results to a document store.

pub mod config;
pub mod core;
pub mod logging;

pub use crate::config::ScanConfig;
pub use crate::core::models::{Document, DropReason, Form, Input, ProbeOutcome, ScanReport, TakeoverVerdict};
pub use crate::core::scanner::ScanPipeline;
pub use crate::core::scanner::http_scanner::Prober;
pub use crate::core::storage::{DocumentFilter, DocumentStore, JsonLinesStore, MemoryStore, StoreError};

// src/core/models.rs

use chrono::{DateTime, Utc};
use reqwest::header::HeaderMap;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use strum::{Display, EnumString};
use url::Url;
use uuid::Uuid;

// --- Response Headers ---

/// Response headers as an ordered multi-map.
///
/// Keys are stored lowercased so lookups are case-insensitive, and iteration
/// follows key order. A header name that repeats keeps every value in the
/// order the server sent them.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Headers(BTreeMap<String, Vec<String>>);

impl Headers {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a value under `name`, keeping earlier values for the same name.
    pub fn append(&mut self, name: &str, value: impl Into<String>) {
        self.0
            .entry(name.to_ascii_lowercase())
            .or_default()
            .push(value.into());
    }

    /// All values recorded for `name`, in arrival order.
    pub fn get_all(&self, name: &str) -> &[String] {
        self.0
            .get(&name.to_ascii_lowercase())
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// The first value recorded for `name`.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.get_all(name).first().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_slice()))
    }
}

impl From<&HeaderMap> for Headers {
    fn from(map: &HeaderMap) -> Self {
        let mut headers = Headers::new();
        for (name, value) in map {
            // Non-UTF-8 bytes are kept lossily rather than dropping the header.
            headers.append(name.as_str(), String::from_utf8_lossy(value.as_bytes()));
        }
        headers
    }
}

// --- Extracted Content ---

/// One `<input>` found inside a form. Missing attributes are empty strings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Input {
    #[serde(rename = "input_type", default, skip_serializing_if = "String::is_empty")]
    pub kind: String,
    #[serde(rename = "input_name", default, skip_serializing_if = "String::is_empty")]
    pub name: String,
    #[serde(rename = "input_value", default, skip_serializing_if = "String::is_empty")]
    pub value: String,
}

/// One `<form>` element with its nested inputs.
///
/// `inputs` is positional: two inputs sharing a name are both kept.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Form {
    #[serde(rename = "form_csrf", default)]
    pub csrf: bool,
    #[serde(rename = "form_method", default, skip_serializing_if = "String::is_empty")]
    pub method: String,
    #[serde(rename = "form_action", default, skip_serializing_if = "String::is_empty")]
    pub action: String,
    #[serde(rename = "form_input", default, skip_serializing_if = "Vec::is_empty")]
    pub inputs: Vec<Input>,
}

/// Everything the content extractor pulls out of one HTML body.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExtractedContent {
    pub links: Vec<String>,
    pub title: String,
    pub forms: Vec<Form>,
    pub scripts: Vec<String>,
}

// --- Takeover Verdict ---

/// The binary result of the subdomain-takeover fingerprint check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString)]
pub enum TakeoverVerdict {
    #[serde(rename = "Possible vulnerable")]
    #[strum(serialize = "Possible vulnerable")]
    PossibleVulnerable,
    #[serde(rename = "Not vulnerable")]
    #[strum(serialize = "Not vulnerable")]
    NotVulnerable,
}

// --- Document ---

/// One probed endpoint and what was observed for it.
///
/// A `Document` starts life as a candidate (request-side fields only) and is
/// filled in exactly once by the worker that fetches it. The id and creation
/// time are assigned when the document enters the pipeline; targets decoded
/// from JSON without them get fresh values at that point.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    #[serde(default = "Uuid::new_v4")]
    pub id: Uuid,
    #[serde(default = "Utc::now")]
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub domain: String,
    pub url: String,
    #[serde(default)]
    pub method: String,
    #[serde(default)]
    pub scheme: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub host: String,
    #[serde(default)]
    pub status: u16,
    #[serde(default)]
    pub header: Headers,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub links: Vec<String>,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub title: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub forms: Vec<Form>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub scripts: Vec<String>,
    #[serde(rename = "subdomaintakeover", default, skip_serializing_if = "Option::is_none")]
    pub subdomain_takeover: Option<TakeoverVerdict>,
    #[serde(default)]
    pub cname: String,
}

impl Document {
    /// Builds a fresh candidate for `url`, stamping a new id and creation time.
    pub fn candidate(domain: &str, scheme: &str, url: String) -> Self {
        Self {
            id: Uuid::new_v4(),
            created_at: Utc::now(),
            updated_at: None,
            domain: domain.to_string(),
            url,
            method: String::new(),
            scheme: scheme.to_string(),
            host: String::new(),
            status: 0,
            header: Headers::new(),
            links: Vec::new(),
            title: String::new(),
            forms: Vec::new(),
            scripts: Vec::new(),
            subdomain_takeover: None,
            cname: String::new(),
        }
    }

    /// Builds a candidate from a fully specified URL.
    ///
    /// Returns `None` when the URL does not parse or has no host.
    pub fn from_url(raw: &str) -> Option<Self> {
        let parsed = Url::parse(raw.trim()).ok()?;
        let domain = parsed.host_str()?.to_string();
        Some(Self::candidate(&domain, parsed.scheme(), raw.trim().to_string()))
    }

    /// Copies the extracted content into this document.
    pub fn apply_content(&mut self, content: ExtractedContent) {
        self.links = content.links;
        self.title = content.title;
        self.forms = content.forms;
        self.scripts = content.scripts;
    }
}

// --- Pipeline Outcomes ---

/// Why a candidate produced no document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum DropReason {
    /// Connect, TLS or timeout failure before a response arrived.
    Network(String),
    /// HTTP 400, the usual answer of a TLS port to a plaintext request.
    ProtocolMismatch,
}

impl fmt::Display for DropReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DropReason::Network(message) => write!(f, "network error: {message}"),
            DropReason::ProtocolMismatch => write!(f, "protocol mismatch (HTTP 400)"),
        }
    }
}

/// A candidate that was dropped, and why.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DroppedTarget {
    pub url: String,
    pub reason: DropReason,
}

/// The tagged result of processing one candidate.
#[derive(Debug, Clone)]
pub enum ProbeOutcome {
    Kept(Box<Document>),
    Dropped(DroppedTarget),
}

impl ProbeOutcome {
    pub fn dropped(url: &str, reason: DropReason) -> Self {
        ProbeOutcome::Dropped(DroppedTarget { url: url.to_string(), reason })
    }

    pub fn is_kept(&self) -> bool {
        matches!(self, ProbeOutcome::Kept(_))
    }
}

// --- Main Report ---

/// Aggregate of one pipeline run.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ScanReport {
    /// Number of candidates dispatched to the worker pool.
    pub candidates: usize,
    pub documents: Vec<Document>,
    pub dropped: Vec<DroppedTarget>,
}

impl ScanReport {
    /// Number of candidates that reported back, kept or dropped.
    pub fn finished(&self) -> usize {
        self.documents.len() + self.dropped.len()
    }

    pub fn into_documents(self) -> Vec<Document> {
        self.documents
    }
}

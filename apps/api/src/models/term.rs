use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Sentinel for "no date could be detected".
pub const UNKNOWN: &str = "Unknown";

/// Which cascade strategy produced a resource's current `last_updated`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum DetectionMethod {
    MetaTag,
    StructuredData,
    TextParsing,
    HttpHeader,
    NotDetected,
}

impl DetectionMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            DetectionMethod::MetaTag => "meta-tag",
            DetectionMethod::StructuredData => "structured-data",
            DetectionMethod::TextParsing => "text-parsing",
            DetectionMethod::HttpHeader => "http-header",
            DetectionMethod::NotDetected => "not-detected",
        }
    }
}

impl fmt::Display for DetectionMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One immutable snapshot recorded at a single check.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct HistoryEntry {
    pub checked_at: DateTime<Utc>,
    pub last_updated: String,
    pub changed: bool,
}

/// A monitored URL plus its detection state and append-only check history.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct TrackedResource {
    pub id: String,
    pub url: String,
    pub title: String,
    pub last_checked: DateTime<Utc>,
    pub last_updated: String,
    pub detection_method: DetectionMethod,
    pub history: Vec<HistoryEntry>,
}

impl TrackedResource {
    pub fn is_unknown(&self) -> bool {
        self.last_updated == UNKNOWN
    }
}

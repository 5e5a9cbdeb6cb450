//! Change detection: infers a page's "last updated" date from its markup and headers.

pub mod cascade;
pub mod date;
pub mod markup;

use crate::models::term::{DetectionMethod, UNKNOWN};

pub use cascade::detect;

/// Outcome of running the cascade over one fetched page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Detection {
    pub title: String,
    pub last_updated: String,
    pub detection_method: DetectionMethod,
}

impl Detection {
    pub fn found(title: String, date: String, method: DetectionMethod) -> Self {
        Self {
            title,
            last_updated: date,
            detection_method: method,
        }
    }

    pub fn not_detected(title: String) -> Self {
        Self {
            title,
            last_updated: UNKNOWN.to_string(),
            detection_method: DetectionMethod::NotDetected,
        }
    }
}

use std::sync::Arc;

use chrono::Utc;
use reqwest::Url;
use serde::Serialize;
use tokio::sync::Mutex;
use tracing::{info, warn};

use crate::detection::detect;
use crate::errors::AppError;
use crate::fetch::PageFetcher;
use crate::models::term::TrackedResource;
use crate::store::TermStore;
use crate::terms::history::apply_check;

/// Per-resource result of a refresh-all pass.
#[derive(Debug, Clone, Serialize)]
pub struct CheckOutcome {
    pub id: String,
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub term: Option<TrackedResource>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// The invocation surface: add, list, recheck, and remove tracked resources.
///
/// Fetches run outside the write gate; every load-modify-save against the
/// store runs inside it, so concurrent requests cannot lose each other's writes.
pub struct TermService {
    store: Arc<dyn TermStore>,
    fetcher: Arc<dyn PageFetcher>,
    write_gate: Mutex<()>,
}

impl TermService {
    pub fn new(store: Arc<dyn TermStore>, fetcher: Arc<dyn PageFetcher>) -> Self {
        Self {
            store,
            fetcher,
            write_gate: Mutex::new(()),
        }
    }

    pub async fn list(&self) -> Result<Vec<TrackedResource>, AppError> {
        Ok(self.store.load().await?)
    }

    pub async fn get(&self, id: &str) -> Result<TrackedResource, AppError> {
        self.store
            .find_by_id(id)
            .await?
            .ok_or_else(|| not_found(id))
    }

    /// Fetches `url`, runs detection, and stores a new resource.
    pub async fn add(&self, url: &str) -> Result<TrackedResource, AppError> {
        let url = validate_url(url)?;

        let page = self.fetcher.fetch(&url).await?;
        let detection = detect(&page);
        info!(
            "Detected {} via {} for {url}",
            detection.last_updated, detection.detection_method
        );

        let _guard = self.write_gate.lock().await;
        let mut terms = self.store.load().await?;
        let term = apply_check(None, &url, detection, Utc::now());
        terms.push(term.clone());
        self.store.save(&terms).await?;

        info!("Tracking {} as {}", term.url, term.id);
        Ok(term)
    }

    /// Re-fetches one resource and appends a history entry.
    pub async fn recheck(&self, id: &str) -> Result<TrackedResource, AppError> {
        let existing = self.get(id).await?;

        let page = self.fetcher.fetch(&existing.url).await?;
        let detection = detect(&page);
        info!(
            "Detected {} via {} for {}",
            detection.last_updated, detection.detection_method, existing.url
        );

        let _guard = self.write_gate.lock().await;
        let mut terms = self.store.load().await?;
        // Re-read under the gate: the resource may have been removed while fetching.
        let idx = terms
            .iter()
            .position(|t| t.id == id)
            .ok_or_else(|| not_found(id))?;

        let current = terms.remove(idx);
        let url = current.url.clone();
        let updated = apply_check(Some(current), &url, detection, Utc::now());
        terms.insert(idx, updated.clone());
        self.store.save(&terms).await?;

        if updated.history.last().is_some_and(|h| h.changed) {
            info!("Change detected for {}: now {}", updated.url, updated.last_updated);
        }
        Ok(updated)
    }

    /// Rechecks every resource one at a time. A failure is reported for its
    /// item and never stops the pass.
    pub async fn recheck_all(&self) -> Result<Vec<CheckOutcome>, AppError> {
        let snapshot = self.store.load().await?;
        let mut outcomes = Vec::with_capacity(snapshot.len());

        for term in snapshot {
            let outcome = match self.recheck(&term.id).await {
                Ok(updated) => CheckOutcome {
                    id: term.id,
                    success: true,
                    term: Some(updated),
                    error: None,
                },
                Err(e) => {
                    warn!("Recheck failed for {} ({}): {e}", term.url, term.id);
                    CheckOutcome {
                        id: term.id,
                        success: false,
                        term: None,
                        error: Some(e.to_string()),
                    }
                }
            };
            outcomes.push(outcome);
        }

        Ok(outcomes)
    }

    /// Deletes a resource. Returns `false` if no resource has that id.
    pub async fn remove(&self, id: &str) -> Result<bool, AppError> {
        let _guard = self.write_gate.lock().await;
        let mut terms = self.store.load().await?;
        let before = terms.len();
        terms.retain(|t| t.id != id);
        if terms.len() == before {
            return Ok(false);
        }
        self.store.save(&terms).await?;
        info!("Stopped tracking {id}");
        Ok(true)
    }
}

fn not_found(id: &str) -> AppError {
    AppError::NotFound(format!("Term {id} not found"))
}

/// Accepts absolute http(s) URLs only.
fn validate_url(raw: &str) -> Result<String, AppError> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Err(AppError::Validation("URL is required".to_string()));
    }
    let parsed =
        Url::parse(raw).map_err(|_| AppError::Validation("Invalid URL format".to_string()))?;
    if !matches!(parsed.scheme(), "http" | "https") {
        return Err(AppError::Validation("Invalid URL format".to_string()));
    }
    Ok(raw.to_string())
}

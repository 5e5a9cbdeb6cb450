use std::sync::Arc;

use crate::terms::service::TermService;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub service: Arc<TermService>,
}

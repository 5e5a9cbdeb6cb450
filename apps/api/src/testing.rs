//! Test doubles shared by service and router tests.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;

use crate::fetch::{FetchError, FetchedPage, PageFetcher};

/// Serves canned pages or failures per URL. Unknown URLs are unreachable.
#[derive(Default)]
pub struct StubFetcher {
    responses: Mutex<HashMap<String, Result<FetchedPage, FetchError>>>,
}

impl StubFetcher {
    pub fn serve(&self, url: &str, body: &str) {
        let page = FetchedPage {
            body: body.to_string(),
            ..FetchedPage::default()
        };
        self.responses
            .lock()
            .unwrap()
            .insert(url.to_string(), Ok(page));
    }

    pub fn fail(&self, url: &str, error: FetchError) {
        self.responses
            .lock()
            .unwrap()
            .insert(url.to_string(), Err(error));
    }
}

#[async_trait]
impl PageFetcher for StubFetcher {
    async fn fetch(&self, url: &str) -> Result<FetchedPage, FetchError> {
        self.responses
            .lock()
            .unwrap()
            .get(url)
            .cloned()
            .unwrap_or(Err(FetchError::NetworkUnreachable))
    }
}

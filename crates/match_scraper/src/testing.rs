//! In-memory page source for tests.

use std::collections::{HashMap, HashSet};
use std::sync::Mutex;

use async_trait::async_trait;

use crate::error::{Result, ScrapeError};
use crate::provider::{DocumentProvider, PageRequest};

/// Serves registered pages by URL; any other URL fails like a dead host.
#[derive(Default)]
pub struct FakeProvider {
    pages: HashMap<String, String>,
    stalled: HashSet<String>,
    loads: Mutex<Vec<PageRequest>>,
}

impl FakeProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_page(mut self, url: &str, html: &str) -> Self {
        self.pages.insert(url.to_string(), html.to_string());
        self
    }

    /// Loads of `url` fail as if the awaited selector never showed up.
    pub fn with_stalled_page(mut self, url: &str) -> Self {
        self.stalled.insert(url.to_string());
        self
    }

    pub fn load_count(&self) -> usize {
        self.loads.lock().unwrap().len()
    }

    pub fn requests(&self) -> Vec<PageRequest> {
        self.loads.lock().unwrap().clone()
    }
}

#[async_trait]
impl DocumentProvider for FakeProvider {
    async fn load(&self, request: &PageRequest) -> Result<String> {
        self.loads.lock().unwrap().push(request.clone());
        if self.stalled.contains(&request.url) {
            return Err(ScrapeError::SelectorTimeout {
                url: request.url.clone(),
                selector: request.wait_for.clone().unwrap_or_default(),
                waited: request.timeout,
            });
        }
        self.pages
            .get(&request.url)
            .cloned()
            .ok_or_else(|| ScrapeError::fetch(&request.url, "connection refused"))
    }
}

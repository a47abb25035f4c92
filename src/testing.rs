//! Test helpers: HTML fixtures and an in-memory fetcher.

use std::cell::RefCell;
use std::collections::HashMap;

use url::Url;

use crate::error::FetchError;
use crate::fetcher::PageFetcher;

pub const BASE: &str = "https://volby.test/pls/ps2017nss/";

pub fn fixture(name: &str) -> String {
    std::fs::read_to_string(format!("tests/fixtures/{}.html", name)).unwrap()
}

pub fn base_url() -> Url {
    Url::parse(BASE).unwrap()
}

pub fn page_url(relative: &str) -> Url {
    base_url().join(relative).unwrap()
}

/// Serves fixed bodies by absolute URL; anything else is a 404.
#[derive(Default)]
pub struct StaticFetcher {
    pages: HashMap<String, String>,
    requests: RefCell<Vec<String>>,
}

impl StaticFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `body` under `relative`, resolved against [`BASE`].
    pub fn page(mut self, relative: &str, body: impl Into<String>) -> Self {
        self.pages.insert(page_url(relative).to_string(), body.into());
        self
    }

    pub fn fixture(self, relative: &str, name: &str) -> Self {
        self.page(relative, fixture(name))
    }

    pub fn requests(&self) -> Vec<String> {
        self.requests.borrow().clone()
    }
}

impl PageFetcher for StaticFetcher {
    async fn fetch(&self, url: &Url) -> Result<String, FetchError> {
        self.requests.borrow_mut().push(url.to_string());
        self.pages
            .get(url.as_str())
            .cloned()
            .ok_or_else(|| FetchError::Status {
                url: url.to_string(),
                status: 404,
            })
    }
}

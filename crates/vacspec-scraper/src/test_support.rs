//! In-memory search and fetch collaborators for unit tests.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use crate::error::ScraperError;
use crate::fetch::PageFetcher;
use crate::search::SearchProvider;

pub(crate) const SPEC_PAGE: &str = r#"<html><head>
    <script type="application/ld+json">
      {"@type":"Product","additionalProperty":[
        {"name":"Suction power","value":"6000"},
        {"name":"Navigation","value":"LiDAR"}
      ]}
    </script></head><body><p>6000 Pa suction and LiDAR navigation.</p></body></html>"#;

pub(crate) const RETAILER_PAGE: &str = "<table>\
    <tr><th>Navigation</th><td>Laser</td></tr>\
    <tr><th>Mop type</th><td>Vibrating pad</td></tr>\
    <tr><th>Dock</th><td>Auto-empty station</td></tr></table>";

pub(crate) const EMPTY_PAGE: &str = "<html><body><p>Cookie settings</p></body></html>";

/// Answers a query with the links of the first route whose needle occurs in it.
#[derive(Default)]
pub(crate) struct StaticSearch {
    routes: Vec<(String, Vec<String>)>,
    pub(crate) queries: Mutex<Vec<String>>,
}

impl StaticSearch {
    pub(crate) fn route(mut self, needle: &str, links: &[&str]) -> Self {
        self.routes.push((
            needle.to_string(),
            links.iter().map(|l| (*l).to_string()).collect(),
        ));
        self
    }

    pub(crate) fn queries(&self) -> Vec<String> {
        self.queries.lock().unwrap().clone()
    }
}

impl SearchProvider for StaticSearch {
    async fn search(&self, query: &str) -> Result<Vec<String>, ScraperError> {
        self.queries.lock().unwrap().push(query.to_string());
        Ok(self
            .routes
            .iter()
            .find(|(needle, _)| query.contains(needle.as_str()))
            .map(|(_, links)| links.clone())
            .unwrap_or_default())
    }
}

/// Serves canned pages; unknown URLs answer 404.
#[derive(Default)]
pub(crate) struct StaticFetcher {
    pages: HashMap<String, Result<String, u16>>,
    delay: Option<Duration>,
    fetched: Mutex<Vec<String>>,
    calls: AtomicUsize,
}

impl StaticFetcher {
    pub(crate) fn page(mut self, url: &str, html: &str) -> Self {
        self.pages.insert(url.to_string(), Ok(html.to_string()));
        self
    }

    pub(crate) fn failing(mut self, url: &str, status: u16) -> Self {
        self.pages.insert(url.to_string(), Err(status));
        self
    }

    pub(crate) fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub(crate) fn fetched(&self) -> Vec<String> {
        self.fetched.lock().unwrap().clone()
    }

    pub(crate) fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl PageFetcher for StaticFetcher {
    async fn fetch(&self, url: &str) -> Result<String, ScraperError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.fetched.lock().unwrap().push(url.to_string());
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        match self.pages.get(url) {
            Some(Ok(html)) => Ok(html.clone()),
            Some(Err(status)) => Err(ScraperError::UnexpectedStatus {
                status: *status,
                url: url.to_string(),
            }),
            None => Err(ScraperError::UnexpectedStatus {
                status: 404,
                url: url.to_string(),
            }),
        }
    }
}

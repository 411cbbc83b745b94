//! Page fetch collaborator used by the resolver.

use std::future::Future;
use std::time::Duration;

use reqwest::{redirect, Client};

use crate::error::ScraperError;

const MAX_REDIRECTS: usize = 10;
const ACCEPT_HTML: &str = "text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8";
const ACCEPT_LANGUAGE: &str = "en-GB,en;q=0.9";

/// Retrieves the HTML body of a URL.
pub trait PageFetcher: Send + Sync {
    /// Returns the response body of a successful (2xx, non-empty) fetch.
    fn fetch(&self, url: &str) -> impl Future<Output = Result<String, ScraperError>> + Send;
}

/// `reqwest`-backed [`PageFetcher`] with a per-request timeout and a
/// browser-like user agent.
#[derive(Debug, Clone)]
pub struct HttpPageFetcher {
    client: Client,
}

impl HttpPageFetcher {
    /// # Errors
    ///
    /// Returns [`ScraperError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed.
    pub fn new(timeout: Duration, user_agent: &str) -> Result<Self, ScraperError> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(user_agent)
            .redirect(redirect::Policy::limited(MAX_REDIRECTS))
            .build()?;
        Ok(Self { client })
    }
}

impl PageFetcher for HttpPageFetcher {
    async fn fetch(&self, url: &str) -> Result<String, ScraperError> {
        let parsed = reqwest::Url::parse(url).map_err(|e| ScraperError::InvalidUrl {
            url: url.to_owned(),
            reason: e.to_string(),
        })?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(ScraperError::InvalidUrl {
                url: url.to_owned(),
                reason: format!("unsupported scheme {:?}", parsed.scheme()),
            });
        }

        let response = self
            .client
            .get(parsed)
            .header(reqwest::header::ACCEPT, ACCEPT_HTML)
            .header(reqwest::header::ACCEPT_LANGUAGE, ACCEPT_LANGUAGE)
            .send()
            .await
            .map_err(|e| ScraperError::from_transport(e, url))?;

        let status = response.status();
        if !status.is_success() {
            return Err(ScraperError::UnexpectedStatus {
                status: status.as_u16(),
                url: url.to_owned(),
            });
        }

        let body = response
            .text()
            .await
            .map_err(|e| ScraperError::from_transport(e, url))?;
        if body.trim().is_empty() {
            return Err(ScraperError::EmptyBody {
                url: url.to_owned(),
            });
        }
        Ok(body)
    }
}

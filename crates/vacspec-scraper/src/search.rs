//! Web search collaborator used by source discovery.

use std::future::Future;
use std::time::Duration;

use reqwest::Client;
use serde::Deserialize;
use vacspec_core::AppConfig;

use crate::error::ScraperError;

/// Anything that can turn a query string into an ordered list of result URLs.
pub trait SearchProvider: Send + Sync {
    /// Runs `query` and returns result links in ranking order.
    fn search(&self, query: &str)
        -> impl Future<Output = Result<Vec<String>, ScraperError>> + Send;

    /// `false` when the provider is a stand-in that never returns results.
    fn is_enabled(&self) -> bool {
        true
    }
}

#[derive(Debug, Deserialize)]
struct SerpApiResponse {
    #[serde(default)]
    organic_results: Vec<OrganicResult>,
}

#[derive(Debug, Deserialize)]
struct OrganicResult {
    #[serde(default)]
    link: Option<String>,
}

/// Google organic search through SerpAPI's `search.json` endpoint.
pub struct SerpApiClient {
    client: Client,
    base_url: String,
    api_key: String,
}

impl std::fmt::Debug for SerpApiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SerpApiClient")
            .field("base_url", &self.base_url)
            .field("api_key", &"[redacted]")
            .finish_non_exhaustive()
    }
}

impl SerpApiClient {
    /// # Errors
    ///
    /// Returns [`ScraperError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed.
    pub fn new(
        base_url: &str,
        api_key: &str,
        timeout: Duration,
        user_agent: &str,
    ) -> Result<Self, ScraperError> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(user_agent)
            .build()?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
        })
    }

    fn endpoint(&self) -> String {
        format!("{}/search.json", self.base_url)
    }
}

impl SearchProvider for SerpApiClient {
    async fn search(&self, query: &str) -> Result<Vec<String>, ScraperError> {
        let url = self.endpoint();
        let response = self
            .client
            .get(&url)
            .query(&[
                ("engine", "google"),
                ("q", query),
                ("api_key", self.api_key.as_str()),
            ])
            .send()
            .await
            .map_err(|e| ScraperError::from_transport(e, &url))?;

        let status = response.status();
        if !status.is_success() {
            return Err(ScraperError::UnexpectedStatus {
                status: status.as_u16(),
                url,
            });
        }

        let body = response
            .text()
            .await
            .map_err(|e| ScraperError::from_transport(e, &url))?;
        let parsed: SerpApiResponse =
            serde_json::from_str(&body).map_err(|source| ScraperError::Deserialize {
                context: format!("SerpAPI results for {query:?}"),
                source,
            })?;

        let links: Vec<String> = parsed
            .organic_results
            .into_iter()
            .filter_map(|r| r.link)
            .filter(|link| !link.trim().is_empty())
            .collect();
        tracing::debug!(query, results = links.len(), "SerpAPI search complete");
        Ok(links)
    }
}

/// Stand-in used when no SerpAPI key is configured. Every search fails
/// with [`ScraperError::SearchDisabled`].
#[derive(Debug, Default, Clone, Copy)]
pub struct DisabledSearch;

impl SearchProvider for DisabledSearch {
    async fn search(&self, _query: &str) -> Result<Vec<String>, ScraperError> {
        Err(ScraperError::SearchDisabled)
    }

    fn is_enabled(&self) -> bool {
        false
    }
}

/// The search provider selected from configuration.
#[derive(Debug)]
pub enum SearchBackend {
    SerpApi(SerpApiClient),
    Disabled(DisabledSearch),
}

impl SearchBackend {
    /// SerpAPI when a key is configured, otherwise [`DisabledSearch`].
    ///
    /// # Errors
    ///
    /// Returns [`ScraperError::Http`] if the HTTP client cannot be built.
    pub fn from_config(config: &AppConfig) -> Result<Self, ScraperError> {
        match config.serpapi_key.as_deref() {
            Some(key) => Ok(SearchBackend::SerpApi(SerpApiClient::new(
                &config.serpapi_base_url,
                key,
                Duration::from_millis(config.fetch_timeout_ms),
                &config.user_agent,
            )?)),
            None => Ok(SearchBackend::Disabled(DisabledSearch)),
        }
    }
}

impl SearchProvider for SearchBackend {
    async fn search(&self, query: &str) -> Result<Vec<String>, ScraperError> {
        match self {
            SearchBackend::SerpApi(client) => client.search(query).await,
            SearchBackend::Disabled(disabled) => disabled.search(query).await,
        }
    }

    fn is_enabled(&self) -> bool {
        match self {
            SearchBackend::SerpApi(client) => client.is_enabled(),
            SearchBackend::Disabled(disabled) => disabled.is_enabled(),
        }
    }
}

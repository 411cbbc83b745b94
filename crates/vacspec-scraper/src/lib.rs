//! Robot-vacuum spec discovery, fetching, and extraction.

pub mod cache;
pub mod discovery;
pub mod error;
pub mod extract;
pub mod fetch;
pub mod resolver;
pub mod search;
pub mod snippets;
pub mod text;

#[cfg(test)]
mod test_support;

pub use cache::{cache_key, SpecService, DEFAULT_TTL};
pub use discovery::{CandidateUrl, Tier};
pub use error::ScraperError;
pub use extract::{extract_page, extract_specs};
pub use fetch::{HttpPageFetcher, PageFetcher};
pub use resolver::{ResolverSettings, SpecResolver};
pub use search::{DisabledSearch, SearchBackend, SearchProvider, SerpApiClient};

/// The service wired from configuration: SerpAPI (or disabled search) plus
/// the reqwest page fetcher.
pub type ConfiguredSpecService = SpecService<SearchBackend, HttpPageFetcher>;

/// Builds the production [`ConfiguredSpecService`] from application config
/// and the loaded allow-lists.
///
/// # Errors
///
/// Returns [`ScraperError::Http`] if an HTTP client cannot be constructed.
pub fn build_spec_service(
    config: &vacspec_core::AppConfig,
    sources: vacspec_core::SourcesFile,
) -> Result<ConfiguredSpecService, ScraperError> {
    let search = SearchBackend::from_config(config)?;
    if !search.is_enabled() {
        tracing::warn!("SERPAPI_KEY not configured; only hint URLs will be fetched");
    }
    let fetcher = HttpPageFetcher::new(
        std::time::Duration::from_millis(config.fetch_timeout_ms),
        &config.user_agent,
    )?;
    let resolver = SpecResolver::new(
        search,
        fetcher,
        sources,
        ResolverSettings::from_config(config),
    );
    Ok(SpecService::new(
        resolver,
        std::time::Duration::from_secs(config.cache_ttl_secs),
    ))
}

//! Tiered spec resolution.
//!
//! A resolution walks `TryHints → TryManufacturer → TrySecondary → Done`.
//! Within a tier candidates are fetched one at a time, in order, and the
//! first page that yields any field ends the tier. Secondary data only fills
//! what the primary tiers left empty.

use std::time::Duration;

use vacspec_core::{merge_preferring, AppConfig, ExtractionResult, SourcesFile, SpecRequest};

use crate::discovery::{
    discover, hint_candidates, manufacturer_query, query_base, secondary_query, CandidateUrl, Tier,
};
use crate::error::ScraperError;
use crate::extract::extract_page;
use crate::fetch::PageFetcher;
use crate::search::SearchProvider;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolverSettings {
    /// Candidates kept per tier.
    pub max_links: usize,
    /// Evidence snippets kept per field.
    pub snippet_limit: usize,
    /// Wall-clock limit for one whole resolution.
    pub budget: Duration,
}

impl Default for ResolverSettings {
    fn default() -> Self {
        Self {
            max_links: 3,
            snippet_limit: 3,
            budget: Duration::from_secs(12),
        }
    }
}

impl ResolverSettings {
    #[must_use]
    pub fn from_config(config: &AppConfig) -> Self {
        Self {
            max_links: config.max_links_per_query,
            snippet_limit: config.snippet_limit,
            budget: Duration::from_millis(config.resolve_budget_ms),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ResolveState {
    TryHints,
    TryManufacturer,
    TrySecondary,
    Done,
}

/// What one candidate URL produced.
#[derive(Debug)]
enum FetchOutcome {
    Found(ExtractionResult),
    NoData,
    Failed(ScraperError),
}

pub struct SpecResolver<S, F> {
    search: S,
    fetcher: F,
    sources: SourcesFile,
    settings: ResolverSettings,
}

impl<S, F> SpecResolver<S, F>
where
    S: SearchProvider,
    F: PageFetcher,
{
    pub fn new(search: S, fetcher: F, sources: SourcesFile, settings: ResolverSettings) -> Self {
        Self {
            search,
            fetcher,
            sources,
            settings,
        }
    }

    #[must_use]
    pub fn search_enabled(&self) -> bool {
        self.search.is_enabled()
    }

    #[must_use]
    pub fn settings(&self) -> ResolverSettings {
        self.settings
    }

    #[cfg(test)]
    pub(crate) fn search(&self) -> &S {
        &self.search
    }

    #[cfg(test)]
    pub(crate) fn fetcher(&self) -> &F {
        &self.fetcher
    }

    /// Resolves specs for one product. Never fails: unreachable pages,
    /// disabled search, and an elapsed budget all degrade to fewer (or no)
    /// fields.
    pub async fn resolve(&self, request: &SpecRequest) -> ExtractionResult {
        if query_base(&request.identity).is_none() {
            tracing::debug!("no usable product identity; skipping resolution");
            return ExtractionResult::default();
        }

        let mut result = ExtractionResult::default();
        let budget = self.settings.budget;
        if tokio::time::timeout(budget, self.run(request, &mut result))
            .await
            .is_err()
        {
            tracing::warn!(
                budget_ms = u64::try_from(budget.as_millis()).unwrap_or(u64::MAX),
                "resolution budget elapsed; returning partial result"
            );
        }
        result
    }

    async fn run(&self, request: &SpecRequest, result: &mut ExtractionResult) {
        let identity = &request.identity;
        let mut state = ResolveState::TryHints;

        loop {
            state = match state {
                ResolveState::TryHints => {
                    let candidates = hint_candidates(&request.hint_urls, self.settings.max_links);
                    match self.first_with_data(&candidates).await {
                        Some(found) => {
                            *result = found;
                            ResolveState::Done
                        }
                        None => ResolveState::TryManufacturer,
                    }
                }
                ResolveState::TryManufacturer => {
                    let Some(query) = manufacturer_query(identity, &self.sources) else {
                        return;
                    };
                    let candidates = discover(
                        &self.search,
                        &query,
                        Tier::Manufacturer,
                        self.settings.max_links,
                    )
                    .await;
                    match self.first_with_data(&candidates).await {
                        Some(found) => {
                            *result = found;
                            ResolveState::Done
                        }
                        None => ResolveState::TrySecondary,
                    }
                }
                ResolveState::TrySecondary => {
                    if let Some(query) = secondary_query(identity, &self.sources) {
                        let candidates = discover(
                            &self.search,
                            &query,
                            Tier::Secondary,
                            self.settings.max_links,
                        )
                        .await;
                        if let Some(found) = self.first_with_data(&candidates).await {
                            *result = merge_preferring(std::mem::take(result), found);
                        }
                    }
                    ResolveState::Done
                }
                ResolveState::Done => return,
            };
        }
    }

    async fn first_with_data(&self, candidates: &[CandidateUrl]) -> Option<ExtractionResult> {
        for candidate in candidates {
            match self.try_candidate(candidate).await {
                FetchOutcome::Found(found) => {
                    tracing::info!(
                        url = %candidate.url,
                        tier = %candidate.tier,
                        missing = ?found.values.missing(),
                        "resolved specs from page"
                    );
                    return Some(found);
                }
                FetchOutcome::NoData => {
                    tracing::debug!(url = %candidate.url, tier = %candidate.tier, "page has no spec fields");
                }
                FetchOutcome::Failed(e) => {
                    tracing::debug!(
                        url = %candidate.url,
                        tier = %candidate.tier,
                        error = %e,
                        "fetch failed; treating as no data"
                    );
                }
            }
        }
        None
    }

    async fn try_candidate(&self, candidate: &CandidateUrl) -> FetchOutcome {
        match self.fetcher.fetch(&candidate.url).await {
            Ok(html) => {
                let found = extract_page(&candidate.url, &html, self.settings.snippet_limit);
                if found.has_any() {
                    FetchOutcome::Found(found)
                } else {
                    FetchOutcome::NoData
                }
            }
            Err(e) => FetchOutcome::Failed(e),
        }
    }
}

#[cfg(test)]
#[path = "resolver_test.rs"]
mod tests;

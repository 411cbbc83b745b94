//! Source discovery: search queries restricted to allow-listed domains and
//! the candidate URLs they produce.

use std::collections::HashSet;

use serde::Serialize;
use vacspec_core::{ProductIdentity, SourcesFile};

use crate::error::ScraperError;
use crate::search::SearchProvider;

/// Which stage of resolution a candidate URL belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Tier {
    /// Caller-supplied retailer URLs.
    Hints,
    Manufacturer,
    /// UK retailers and datasheet sites.
    Secondary,
}

impl Tier {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Tier::Hints => "hints",
            Tier::Manufacturer => "manufacturer",
            Tier::Secondary => "secondary",
        }
    }
}

impl std::fmt::Display for Tier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CandidateUrl {
    pub url: String,
    pub tier: Tier,
}

/// The unrestricted query for `identity`: brand + model, then brand + name,
/// then name, then EAN, then ASIN. `None` when nothing usable is set.
#[must_use]
pub fn query_base(identity: &ProductIdentity) -> Option<String> {
    match (identity.brand(), identity.model(), identity.name()) {
        (Some(brand), Some(model), _) => Some(format!("{brand} {model}")),
        (Some(brand), None, Some(name)) => Some(format!("{brand} {name}")),
        (_, _, Some(name)) => Some(name.to_string()),
        _ => identity
            .ean()
            .or_else(|| identity.asin())
            .map(str::to_string),
    }
}

/// Query for the manufacturer tier. Restricted to the brand's own domains
/// when the brand is allow-listed, otherwise the unrestricted base query.
#[must_use]
pub fn manufacturer_query(identity: &ProductIdentity, sources: &SourcesFile) -> Option<String> {
    let base = query_base(identity)?;
    let domains = identity
        .brand()
        .and_then(|brand| sources.manufacturer_domains(brand));
    Some(match domains {
        Some(domains) => format!("{base} {}", site_clause(domains)),
        None => base,
    })
}

/// Query for the secondary tier, restricted to the secondary allow-list.
/// `None` when there is no base query or the list is empty.
#[must_use]
pub fn secondary_query(identity: &ProductIdentity, sources: &SourcesFile) -> Option<String> {
    let base = query_base(identity)?;
    if sources.secondary.is_empty() {
        return None;
    }
    Some(format!("{base} {}", site_clause(&sources.secondary)))
}

fn site_clause(domains: &[String]) -> String {
    domains
        .iter()
        .map(|d| format!("site:{d}"))
        .collect::<Vec<_>>()
        .join(" OR ")
}

/// Runs `query` and keeps the first `max_links` distinct http(s) results.
/// A failed or disabled search yields no candidates.
pub async fn discover<S: SearchProvider + ?Sized>(
    search: &S,
    query: &str,
    tier: Tier,
    max_links: usize,
) -> Vec<CandidateUrl> {
    let links = match search.search(query).await {
        Ok(links) => links,
        Err(ScraperError::SearchDisabled) => {
            tracing::debug!(query, %tier, "search disabled; tier has no candidates");
            return Vec::new();
        }
        Err(e) => {
            tracing::warn!(query, %tier, error = %e, "search failed; tier has no candidates");
            return Vec::new();
        }
    };
    let candidates = to_candidates(links, tier, max_links);
    tracing::debug!(query, %tier, candidates = candidates.len(), "discovered candidate pages");
    candidates
}

/// Caller-supplied hint URLs as candidates, under the same rules as search
/// results.
#[must_use]
pub fn hint_candidates(hints: &[String], max_links: usize) -> Vec<CandidateUrl> {
    to_candidates(hints.iter().cloned(), Tier::Hints, max_links)
}

fn to_candidates(
    links: impl IntoIterator<Item = String>,
    tier: Tier,
    max_links: usize,
) -> Vec<CandidateUrl> {
    let mut seen = HashSet::new();
    links
        .into_iter()
        .map(|link| link.trim().to_string())
        .filter(|link| is_http_url(link))
        .filter(|link| seen.insert(link.clone()))
        .take(max_links)
        .map(|url| CandidateUrl { url, tier })
        .collect()
}

/// `true` for absolute `http`/`https` URLs with a host.
#[must_use]
pub fn is_http_url(url: &str) -> bool {
    reqwest::Url::parse(url)
        .is_ok_and(|u| matches!(u.scheme(), "http" | "https") && u.host_str().is_some())
}

/// Host of `url` with a leading `www.` removed.
#[must_use]
pub fn source_domain(url: &str) -> Option<String> {
    let parsed = reqwest::Url::parse(url).ok()?;
    let host = parsed.host_str()?.to_lowercase();
    Some(host.strip_prefix("www.").unwrap_or(&host).to_string())
}

#[cfg(test)]
#[path = "discovery_test.rs"]
mod tests;

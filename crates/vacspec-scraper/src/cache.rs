//! Time-bounded memoization of resolutions, keyed by normalized identity.
//!
//! Concurrent requests for the same key share one in-flight resolution.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::{Duration, Instant};

use tokio::sync::OnceCell;
use vacspec_core::{ExtractionResult, SpecRequest};

use crate::fetch::PageFetcher;
use crate::resolver::SpecResolver;
use crate::search::SearchProvider;

pub const DEFAULT_TTL: Duration = Duration::from_secs(24 * 60 * 60);

/// One cached (or in-flight) resolution.
#[derive(Default)]
struct CacheSlot {
    cell: OnceCell<(ExtractionResult, Instant)>,
}

impl CacheSlot {
    fn is_expired(&self, ttl: Duration) -> bool {
        self.cell
            .get()
            .is_some_and(|(_, stored_at)| stored_at.elapsed() >= ttl)
    }
}

/// Caller-facing entry point: a [`SpecResolver`] behind a TTL cache.
pub struct SpecService<S, F> {
    resolver: SpecResolver<S, F>,
    ttl: Duration,
    slots: Mutex<HashMap<String, Arc<CacheSlot>>>,
}

impl<S, F> SpecService<S, F>
where
    S: SearchProvider,
    F: PageFetcher,
{
    pub fn new(resolver: SpecResolver<S, F>, ttl: Duration) -> Self {
        Self {
            resolver,
            ttl,
            slots: Mutex::new(HashMap::new()),
        }
    }

    #[must_use]
    pub fn resolver(&self) -> &SpecResolver<S, F> {
        &self.resolver
    }

    /// Returns the stored result for `request` while it is younger than the
    /// TTL; otherwise resolves, stores, and returns a fresh one. Never fails.
    pub async fn resolve_specs(&self, request: &SpecRequest) -> ExtractionResult {
        let key = cache_key(request);
        let slot = self.slot_for(&key);

        let was_cached = slot.cell.initialized();
        let (result, _) = slot
            .cell
            .get_or_init(|| async move { (self.resolver.resolve(request).await, Instant::now()) })
            .await;

        if was_cached {
            tracing::debug!(key = %short(&key), "spec cache hit");
        } else {
            tracing::debug!(key = %short(&key), missing = ?result.values.missing(), "cached new resolution");
        }
        result.clone()
    }

    /// Drops every stored result. In-flight resolutions finish but their
    /// results are not visible to later callers.
    pub fn invalidate_all(&self) {
        let mut slots = self.slots.lock().unwrap_or_else(PoisonError::into_inner);
        let dropped = slots.len();
        slots.clear();
        tracing::info!(dropped, "spec cache flushed");
    }

    /// Number of live entries, expired ones excluded.
    #[must_use]
    pub fn len(&self) -> usize {
        let slots = self.slots.lock().unwrap_or_else(PoisonError::into_inner);
        slots.values().filter(|s| !s.is_expired(self.ttl)).count()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn slot_for(&self, key: &str) -> Arc<CacheSlot> {
        let mut slots = self.slots.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(slot) = slots.get(key) {
            if !slot.is_expired(self.ttl) {
                return Arc::clone(slot);
            }
        }

        slots.retain(|_, s| !s.is_expired(self.ttl));
        let slot = Arc::new(CacheSlot::default());
        slots.insert(key.to_string(), Arc::clone(&slot));
        slot
    }
}

/// SHA-256 (hex) of the trimmed, lower-cased identity fields and the sorted,
/// deduplicated hint URLs.
#[must_use]
pub fn cache_key(request: &SpecRequest) -> String {
    use sha2::{Digest, Sha256};

    let id = &request.identity;
    let fields = [
        id.brand(),
        id.model(),
        id.name(),
        id.ean(),
        id.asin(),
    ]
    .map(|f| f.unwrap_or("").to_lowercase());

    let mut hints: Vec<&str> = request
        .hint_urls
        .iter()
        .map(|u| u.trim())
        .filter(|u| !u.is_empty())
        .collect();
    hints.sort_unstable();
    hints.dedup();

    let input = format!("{}\x00{}", fields.join("\x00"), hints.join("\x1e"));
    format!("{:x}", Sha256::digest(input.as_bytes()))
}

fn short(key: &str) -> &str {
    key.get(..12).unwrap_or(key)
}

#[cfg(test)]
mod tests {
    use vacspec_core::{ProductIdentity, SourcesFile};

    use super::*;
    use crate::resolver::ResolverSettings;
    use crate::test_support::{StaticFetcher, StaticSearch, SPEC_PAGE};

    const URL: &str = "https://www.roborock.com/uk/s8";

    fn service(ttl: Duration, delay: Option<Duration>) -> SpecService<StaticSearch, StaticFetcher> {
        let mut fetcher = StaticFetcher::default().page(URL, SPEC_PAGE);
        if let Some(delay) = delay {
            fetcher = fetcher.with_delay(delay);
        }
        let resolver = SpecResolver::new(
            StaticSearch::default().route("site:roborock.com", &[URL]),
            fetcher,
            SourcesFile::builtin(),
            ResolverSettings::default(),
        );
        SpecService::new(resolver, ttl)
    }

    fn request(brand: &str, model: &str) -> SpecRequest {
        SpecRequest::from(ProductIdentity {
            brand: Some(brand.into()),
            model: Some(model.into()),
            ..ProductIdentity::default()
        })
    }

    #[tokio::test]
    async fn second_call_within_ttl_is_served_from_cache() {
        let svc = service(DEFAULT_TTL, None);
        let first = svc.resolve_specs(&request("Roborock", "S8")).await;
        let second = svc.resolve_specs(&request("Roborock", "S8")).await;

        assert_eq!(first, second);
        assert_eq!(first.values.suction.as_deref(), Some("6000 Pa"));
        assert_eq!(svc.resolver().fetcher().calls(), 1);
        assert_eq!(svc.len(), 1);
    }

    #[tokio::test]
    async fn key_ignores_case_and_surrounding_whitespace() {
        let svc = service(DEFAULT_TTL, None);
        svc.resolve_specs(&request("Roborock", "S8")).await;
        svc.resolve_specs(&request("  roborock ", "s8")).await;
        assert_eq!(svc.resolver().fetcher().calls(), 1);
    }

    #[tokio::test]
    async fn expired_entries_are_recomputed() {
        let svc = service(Duration::ZERO, None);
        svc.resolve_specs(&request("Roborock", "S8")).await;
        svc.resolve_specs(&request("Roborock", "S8")).await;
        assert_eq!(svc.resolver().fetcher().calls(), 2);
    }

    #[tokio::test]
    async fn invalidate_all_forces_a_fresh_resolution() {
        let svc = service(DEFAULT_TTL, None);
        svc.resolve_specs(&request("Roborock", "S8")).await;
        svc.invalidate_all();
        assert!(svc.is_empty());
        svc.resolve_specs(&request("Roborock", "S8")).await;
        assert_eq!(svc.resolver().fetcher().calls(), 2);
    }

    #[tokio::test]
    async fn concurrent_callers_share_one_resolution() {
        let svc = service(DEFAULT_TTL, Some(Duration::from_millis(50)));
        let req = request("Roborock", "S8");
        let (a, b, c) = tokio::join!(
            svc.resolve_specs(&req),
            svc.resolve_specs(&req),
            svc.resolve_specs(&req)
        );
        assert_eq!(a, b);
        assert_eq!(b, c);
        assert_eq!(svc.resolver().fetcher().calls(), 1);
    }

    #[tokio::test]
    async fn empty_results_are_cached_too() {
        let svc = service(DEFAULT_TTL, None);
        let unknown = request("Lefant", "M210");
        assert!(!svc.resolve_specs(&unknown).await.has_any());
        assert!(!svc.resolve_specs(&unknown).await.has_any());
        // Manufacturer and secondary searches ran once, for the first call only.
        assert_eq!(svc.resolver().search().queries().len(), 2);
        assert_eq!(svc.len(), 1);
    }

    #[test]
    fn cache_key_is_stable_and_order_insensitive_for_hints() {
        let mut a = request("Roborock", "S8");
        a.hint_urls = vec!["https://b.example/".into(), "https://a.example/".into()];
        let mut b = request("ROBOROCK", " s8 ");
        b.hint_urls = vec![
            "https://a.example/".into(),
            " https://b.example/".into(),
            "https://a.example/".into(),
        ];
        assert_eq!(cache_key(&a), cache_key(&b));
        assert_eq!(cache_key(&a).len(), 64);
    }

    #[test]
    fn cache_key_distinguishes_fields() {
        // Same text in different fields must not collide.
        let by_model = request("Roborock", "S8");
        let by_name = SpecRequest::from(ProductIdentity {
            brand: Some("Roborock".into()),
            name: Some("S8".into()),
            ..ProductIdentity::default()
        });
        assert_ne!(cache_key(&by_model), cache_key(&by_name));
        assert_ne!(
            cache_key(&request("Roborock", "S8")),
            cache_key(&request("Roborock", "S7"))
        );
    }
}

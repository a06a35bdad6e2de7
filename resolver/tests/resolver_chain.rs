//! Provider-chain behaviour of NipResolver against mocked providers and caches

mod common;

use std::sync::Arc;
use std::time::Duration;

use common::*;
use nip_resolver::services::{InMemoryCache, ManualProvider};
use nip_resolver::traits::CacheStore;
use nip_resolver::types::cache_key;
use nip_resolver::{CacheError, MockCacheStore, NipProvider, NipResolver, ProviderError, ResolverError};
use shared::{DataSource, Environment, LookupOptions, LookupResult};

const NO_MANUAL: LookupOptions = LookupOptions {
    skip_cache: false,
    allow_manual: false,
};

#[tokio::test]
async fn test_failing_provider_falls_through_to_manual() {
    let registry = failing_provider(
        DataSource::OfficialRegistry,
        10,
        ProviderError::Network("connection reset".to_string()),
    );
    let mut manual = mock_provider(DataSource::Manual, 100);
    manual.expect_is_available().times(1).returning(|| true);
    manual
        .expect_lookup()
        .times(1)
        .returning(|nip| Ok(Some(LookupResult::manual_placeholder(nip))));

    let (resolver, _cache) = resolver_with_cache(vec![registry, manual]);
    let result = resolver.lookup(NIP, LookupOptions::default()).await.unwrap();

    assert_eq!(result.source, DataSource::Manual);
    assert!(result.requires_manual_entry);
    assert_eq!(result.nip, NIP);
}

#[tokio::test]
async fn test_cache_hit_skips_every_provider() {
    let registry = untouched_provider(DataSource::OfficialRegistry, 10);
    let manual = untouched_provider(DataSource::Manual, 100);
    let (resolver, cache) = resolver_with_cache(vec![registry, manual]);

    let cached = company(NIP, DataSource::OfficialRegistry);
    cache
        .set_with_expiry(&cache_key(NIP), 3600, cached.to_json().unwrap())
        .await
        .unwrap();

    let result = resolver.lookup("727-244-52-05", LookupOptions::default()).await.unwrap();
    assert_eq!(result, cached);
}

#[tokio::test]
async fn test_manual_placeholder_is_never_cached() {
    let cache = InMemoryCache::new();
    let store: Arc<dyn CacheStore> = Arc::new(cache.clone());
    let providers: Vec<Box<dyn NipProvider>> = vec![
        Box::new(empty_provider(DataSource::OfficialRegistry, 10)),
        Box::new(ManualProvider::new()),
    ];
    let resolver = NipResolver::new(providers, Some(store), TTL, Environment::Development);

    let result = resolver.lookup(NIP, LookupOptions::default()).await.unwrap();
    assert!(result.requires_manual_entry);
    assert_eq!(result.source, DataSource::Manual);
    assert_eq!(cache.get(&cache_key(NIP)).await.unwrap(), None);
    assert!(cache.is_empty().await);
}

#[tokio::test]
async fn test_no_manual_with_only_manual_is_not_found() {
    let manual = untouched_provider(DataSource::Manual, 100);
    let (resolver, _cache) = resolver_with_cache(vec![manual]);

    let error = resolver.lookup(NIP, NO_MANUAL).await.unwrap_err();
    assert_eq!(error.kind(), "NIP_NOT_FOUND");
    assert!(matches!(error, ResolverError::NipNotFound { nip } if nip == NIP));
}

#[tokio::test]
async fn test_providers_are_tried_in_priority_order() {
    // Registered out of order on purpose
    let manual = untouched_provider(DataSource::Manual, 100);
    let commercial = untouched_provider(DataSource::CommercialApi, 20);
    let registry = resolving_provider(DataSource::OfficialRegistry, 10);

    let (resolver, _cache) = resolver_with_cache(vec![manual, commercial, registry]);
    assert_eq!(
        resolver.provider_order(),
        vec![DataSource::OfficialRegistry, DataSource::CommercialApi, DataSource::Manual]
    );

    let result = resolver.lookup(NIP, LookupOptions::default()).await.unwrap();
    assert_eq!(result.source, DataSource::OfficialRegistry);
}

#[tokio::test]
async fn test_unavailable_provider_is_skipped() {
    let mut registry = mock_provider(DataSource::OfficialRegistry, 10);
    registry.expect_is_available().times(1).returning(|| false);
    registry.expect_lookup().never();
    let commercial = resolving_provider(DataSource::CommercialApi, 20);

    let (resolver, _cache) = resolver_with_cache(vec![registry, commercial]);
    let result = resolver.lookup(NIP, LookupOptions::default()).await.unwrap();

    assert_eq!(result.source, DataSource::CommercialApi);
}

#[tokio::test]
async fn test_last_error_is_surfaced() {
    let registry = failing_provider(
        DataSource::OfficialRegistry,
        10,
        ProviderError::Network("timeout".to_string()),
    );
    let commercial = failing_provider(DataSource::CommercialApi, 20, ProviderError::RateLimited);

    let resolver = resolver_without_cache(vec![registry, commercial], Environment::Development);
    let error = resolver.lookup(NIP, NO_MANUAL).await.unwrap_err();

    assert_eq!(error.kind(), "PROVIDER_ERROR");
    match error {
        ResolverError::Provider { provider, error } => {
            assert_eq!(provider, DataSource::CommercialApi);
            assert_eq!(error, ProviderError::RateLimited);
        }
        other => panic!("expected provider error, got {other:?}"),
    }
}

#[tokio::test]
async fn test_error_followed_by_not_found_still_surfaces_error() {
    let registry = failing_provider(
        DataSource::OfficialRegistry,
        10,
        ProviderError::Parse("unexpected envelope".to_string()),
    );
    let commercial = empty_provider(DataSource::CommercialApi, 20);

    let resolver = resolver_without_cache(vec![registry, commercial], Environment::Development);
    let error = resolver.lookup(NIP, NO_MANUAL).await.unwrap_err();

    assert!(matches!(
        error,
        ResolverError::Provider { provider: DataSource::OfficialRegistry, error: ProviderError::Parse(_) }
    ));
}

#[tokio::test]
async fn test_all_not_found_is_nip_not_found() {
    let registry = empty_provider(DataSource::OfficialRegistry, 10);
    let commercial = empty_provider(DataSource::CommercialApi, 20);

    let resolver = resolver_without_cache(vec![registry, commercial], Environment::Development);
    let error = resolver.lookup(NIP, LookupOptions::default()).await.unwrap_err();

    assert_eq!(error.kind(), "NIP_NOT_FOUND");
}

#[tokio::test]
async fn test_success_is_cached_with_configured_ttl() {
    let registry = resolving_provider(DataSource::OfficialRegistry, 10);

    let mut cache = MockCacheStore::new();
    cache.expect_get().times(1).returning(|_| Ok(None));
    cache
        .expect_set_with_expiry()
        .withf(|key, ttl, value| {
            key.to_string() == "nip:lookup:7272445205"
                && *ttl == 86_400
                && LookupResult::from_json(value).is_ok_and(|r| r.source == DataSource::OfficialRegistry)
        })
        .times(1)
        .returning(|_, _, _| Ok(()));

    let resolver = resolver_with_mock_cache(vec![registry], cache);
    let result = resolver.lookup(NIP, LookupOptions::default()).await.unwrap();
    assert_eq!(result.source, DataSource::OfficialRegistry);
}

#[tokio::test]
async fn test_cache_failures_do_not_abort_lookup() {
    let registry = resolving_provider(DataSource::OfficialRegistry, 10);

    let mut cache = MockCacheStore::new();
    cache
        .expect_get()
        .returning(|_| Err(CacheError::Backend("connection refused".to_string())));
    cache
        .expect_set_with_expiry()
        .times(1)
        .returning(|_, _, _| Err(CacheError::Backend("connection refused".to_string())));

    let resolver = resolver_with_mock_cache(vec![registry], cache);
    let result = resolver.lookup(NIP, LookupOptions::default()).await.unwrap();
    assert_eq!(result.source, DataSource::OfficialRegistry);
}

#[tokio::test]
async fn test_unrepresentable_ttl_skips_the_write() {
    let cache = InMemoryCache::new();
    let store: Arc<dyn CacheStore> = Arc::new(cache.clone());
    let resolver = NipResolver::new(
        boxed(vec![resolving_provider(DataSource::OfficialRegistry, 10)]),
        Some(store),
        Duration::from_secs(u64::MAX),
        Environment::Development,
    );

    let result = resolver.lookup(NIP, LookupOptions::default()).await.unwrap();
    assert_eq!(result.source, DataSource::OfficialRegistry);
    assert!(cache.is_empty().await);
}

#[tokio::test]
async fn test_corrupt_cache_value_is_a_miss() {
    let registry = resolving_provider(DataSource::OfficialRegistry, 10);
    let (resolver, cache) = resolver_with_cache(vec![registry]);
    cache
        .set_with_expiry(&cache_key(NIP), 3600, "{\"nip\":".to_string())
        .await
        .unwrap();

    let result = resolver.lookup(NIP, LookupOptions::default()).await.unwrap();
    assert_eq!(result.source, DataSource::OfficialRegistry);

    // Replaced by the fresh resolution
    let stored = cache.get(&cache_key(NIP)).await.unwrap().unwrap();
    assert_eq!(LookupResult::from_json(&stored).unwrap(), result);
}

#[tokio::test]
async fn test_skip_cache_reads_providers_but_still_writes() {
    let mut registry = mock_provider(DataSource::OfficialRegistry, 10);
    registry.expect_is_available().times(1).returning(|| true);
    registry
        .expect_lookup()
        .times(1)
        .returning(|nip| Ok(Some(company(nip, DataSource::OfficialRegistry))));

    let (resolver, cache) = resolver_with_cache(vec![registry]);
    let mut stale = company(NIP, DataSource::OfficialRegistry);
    stale.name = Some("Stara Nazwa".to_string());
    cache
        .set_with_expiry(&cache_key(NIP), 3600, stale.to_json().unwrap())
        .await
        .unwrap();

    let options = LookupOptions {
        skip_cache: true,
        allow_manual: true,
    };
    let result = resolver.lookup(NIP, options).await.unwrap();
    assert_eq!(result.name.as_deref(), Some("Przykładowa Spółka z o.o."));

    let stored = cache.get(&cache_key(NIP)).await.unwrap().unwrap();
    assert_eq!(LookupResult::from_json(&stored).unwrap(), result);
}

#[tokio::test]
async fn test_invalid_nip_never_reaches_providers() {
    let registry = untouched_provider(DataSource::OfficialRegistry, 10);
    let (resolver, _cache) = resolver_with_cache(vec![registry]);

    let error = resolver.lookup("727-244-52-04", LookupOptions::default()).await.unwrap_err();
    assert_eq!(error.kind(), "INVALID_NIP");
    assert_eq!(error.to_string(), "Invalid NIP checksum");

    let error = resolver.lookup("1234567890", LookupOptions::default()).await.unwrap_err();
    assert_eq!(error.to_string(), "Invalid NIP - checksum error");

    let error = resolver.lookup("", LookupOptions::default()).await.unwrap_err();
    assert_eq!(error.to_string(), "NIP is required");
}

#[tokio::test]
async fn test_example_nip_rejected_only_in_production() {
    let production = resolver_without_cache(
        vec![untouched_provider(DataSource::Manual, 100)],
        Environment::Production,
    );
    let error = production.lookup("526-104-08-28", LookupOptions::default()).await.unwrap_err();
    assert_eq!(error.kind(), "TEST_NIP_NOT_ALLOWED");

    let development = resolver_without_cache(
        vec![resolving_provider(DataSource::Manual, 100)],
        Environment::Development,
    );
    assert!(development.lookup("5261040828", LookupOptions::default()).await.is_ok());
}

#[tokio::test]
async fn test_clear_cache_forces_fresh_lookup() {
    let mut registry = mock_provider(DataSource::OfficialRegistry, 10);
    registry.expect_is_available().times(2).returning(|| true);
    registry
        .expect_lookup()
        .times(2)
        .returning(|nip| Ok(Some(company(nip, DataSource::OfficialRegistry))));

    let (resolver, cache) = resolver_with_cache(vec![registry]);

    resolver.lookup(NIP, LookupOptions::default()).await.unwrap();
    resolver.lookup(NIP, LookupOptions::default()).await.unwrap();
    assert_eq!(cache.len().await, 1);

    resolver.clear_cache("727-244-52-05").await.unwrap();
    assert!(cache.is_empty().await);

    resolver.lookup(NIP, LookupOptions::default()).await.unwrap();
    assert_eq!(cache.len().await, 1);
}

#[tokio::test]
async fn test_clear_cache_surfaces_backend_errors() {
    let mut cache = MockCacheStore::new();
    cache
        .expect_delete()
        .times(1)
        .returning(|_| Err(CacheError::Backend("read-only replica".to_string())));

    let resolver = resolver_with_mock_cache(vec![], cache);
    let error = resolver.clear_cache(OTHER_NIP).await.unwrap_err();
    assert_eq!(error.kind(), "CACHE_ERROR");

    let uncached = resolver_without_cache(vec![], Environment::Development);
    assert!(uncached.clear_cache(OTHER_NIP).await.is_ok());
}

#[tokio::test]
async fn test_without_cache_every_lookup_hits_providers() {
    let mut registry = mock_provider(DataSource::OfficialRegistry, 10);
    registry.expect_is_available().times(2).returning(|| true);
    registry
        .expect_lookup()
        .times(2)
        .returning(|nip| Ok(Some(company(nip, DataSource::OfficialRegistry))));

    let resolver = resolver_without_cache(vec![registry], Environment::Development);
    resolver.lookup(NIP, LookupOptions::default()).await.unwrap();
    resolver.lookup(NIP, LookupOptions::default()).await.unwrap();
}

#[tokio::test]
async fn test_provider_status_reports_every_provider() {
    let mut registry = mock_provider(DataSource::OfficialRegistry, 10);
    registry.expect_is_available().returning(|| false);
    registry.expect_lookup().never();
    let manual = resolving_provider(DataSource::Manual, 100);

    let resolver = resolver_without_cache(vec![manual, registry], Environment::Development);
    resolver.lookup(NIP, LookupOptions::default()).await.unwrap();

    let status = resolver.provider_status().await;
    assert_eq!(status.len(), 2);

    assert_eq!(status[0].name, DataSource::OfficialRegistry);
    assert_eq!(status[0].priority, 10);
    assert!(!status[0].available);
    assert_eq!(status[0].stats.attempts, 0);

    assert_eq!(status[1].name, DataSource::Manual);
    assert_eq!(status[1].priority, 100);
    assert!(status[1].available);
    assert_eq!(status[1].stats.resolved, 1);

    let stats = resolver.stats().await;
    assert_eq!(stats.len(), 1);
}

#[tokio::test]
async fn test_validate_and_normalize_delegate() {
    let resolver = resolver_without_cache(vec![], Environment::Development);

    assert_eq!(resolver.normalize("727 244 52.05"), NIP);
    assert!(resolver.validate("727-244-52-05").valid);
    assert_eq!(
        resolver.validate("123").reason.as_deref(),
        Some("NIP must be exactly 10 digits")
    );
}

//! Shared fixtures for resolver integration tests

#![allow(dead_code)] // Not every test binary uses every fixture

use std::sync::Arc;
use std::time::Duration;

use nip_resolver::{MockCacheStore, MockNipProvider, NipProvider, NipResolver, ProviderError};
use nip_resolver::services::InMemoryCache;
use nip_resolver::traits::CacheStore;
use shared::{Address, DataSource, Environment, LookupResult, VatStatus};

/// Valid NIP that is not on the example list
pub const NIP: &str = "7272445205";

/// Second valid NIP
pub const OTHER_NIP: &str = "1234567819";

pub const TTL: Duration = Duration::from_secs(24 * 60 * 60);

/// A fully resolved company as a registry would return it
pub fn company(nip: &str, source: DataSource) -> LookupResult {
    LookupResult {
        nip: nip.to_string(),
        name: Some("Przykładowa Spółka z o.o.".to_string()),
        regon: Some("470409600".to_string()),
        krs: Some("0000123456".to_string()),
        address: Address {
            street: Some("ul. Piotrkowska 12/4".to_string()),
            city: Some("Łódź".to_string()),
            postal_code: Some("90-001".to_string()),
            country: Some("PL".to_string()),
        },
        vat_status: Some(VatStatus::Active),
        source,
        requires_manual_entry: false,
    }
}

/// Mock provider with fixed identity and no other expectations
pub fn mock_provider(name: DataSource, priority: u32) -> MockNipProvider {
    let mut provider = MockNipProvider::new();
    provider.expect_name().return_const(name);
    provider.expect_priority().return_const(priority);
    provider
}

/// Available provider that resolves every NIP
pub fn resolving_provider(name: DataSource, priority: u32) -> MockNipProvider {
    let mut provider = mock_provider(name, priority);
    provider.expect_is_available().returning(|| true);
    provider
        .expect_lookup()
        .returning(move |nip| Ok(Some(company(nip, name))));
    provider
}

/// Available provider that fails every lookup with the given error
pub fn failing_provider(name: DataSource, priority: u32, error: ProviderError) -> MockNipProvider {
    let mut provider = mock_provider(name, priority);
    provider.expect_is_available().returning(|| true);
    provider
        .expect_lookup()
        .returning(move |_| Err(error.clone()));
    provider
}

/// Available provider that never has a record
pub fn empty_provider(name: DataSource, priority: u32) -> MockNipProvider {
    let mut provider = mock_provider(name, priority);
    provider.expect_is_available().returning(|| true);
    provider.expect_lookup().returning(|_| Ok(None));
    provider
}

/// Provider that must not be touched beyond its identity
pub fn untouched_provider(name: DataSource, priority: u32) -> MockNipProvider {
    let mut provider = mock_provider(name, priority);
    provider.expect_is_available().never();
    provider.expect_lookup().never();
    provider
}

pub fn boxed(providers: Vec<MockNipProvider>) -> Vec<Box<dyn NipProvider>> {
    providers
        .into_iter()
        .map(|provider| Box::new(provider) as Box<dyn NipProvider>)
        .collect()
}

/// Resolver over mocks with a real in-memory cache, in development mode
pub fn resolver_with_cache(providers: Vec<MockNipProvider>) -> (NipResolver, InMemoryCache) {
    let cache = InMemoryCache::new();
    let store: Arc<dyn CacheStore> = Arc::new(cache.clone());
    let resolver = NipResolver::new(boxed(providers), Some(store), TTL, Environment::Development);
    (resolver, cache)
}

/// Resolver over mocks with a mocked cache backend
pub fn resolver_with_mock_cache(providers: Vec<MockNipProvider>, cache: MockCacheStore) -> NipResolver {
    NipResolver::new(boxed(providers), Some(Arc::new(cache)), TTL, Environment::Development)
}

/// Resolver over mocks without any cache
pub fn resolver_without_cache(providers: Vec<MockNipProvider>, environment: Environment) -> NipResolver {
    NipResolver::new(boxed(providers), None, TTL, environment)
}

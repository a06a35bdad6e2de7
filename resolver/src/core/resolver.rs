//! NIP lookup orchestration
//!
//! Validates input, consults the cache, then walks the providers in ascending
//! priority until one answers. The first result wins; results are never merged
//! across providers. When every eligible provider either failed or had no
//! record, the most recent failure is surfaced, otherwise `NipNotFound`.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use shared::{
    nip, nip_debug, nip_info, nip_warn, DataSource, Environment, LookupOptions, LookupResult,
    ProviderStats, ProviderStatusReport, ValidationResult,
};
use crate::config::ResolverConfig;
use crate::error::{ResolverError, ResolverResult};
use crate::services::{
    CommercialApiProvider, InMemoryCache, LookupOutcome, LookupStats, ManualProvider, RegistryProvider,
};
use crate::traits::{CacheStore, NipProvider};
use crate::types::cache_key;

/// Resolves NIPs through an ordered provider chain with an optional cache
pub struct NipResolver {
    providers: Vec<Box<dyn NipProvider>>,
    cache: Option<Arc<dyn CacheStore>>,
    cache_ttl: Duration,
    environment: Environment,
    stats: LookupStats,
}

impl NipResolver {
    /// Create a resolver; providers are ordered by ascending priority here, once
    pub fn new(
        mut providers: Vec<Box<dyn NipProvider>>,
        cache: Option<Arc<dyn CacheStore>>,
        cache_ttl: Duration,
        environment: Environment,
    ) -> Self {
        providers.sort_by_key(|provider| provider.priority());

        Self {
            providers,
            cache,
            cache_ttl,
            environment,
            stats: LookupStats::new(),
        }
    }

    /// Build the standard chain (registry, commercial API when keyed, manual)
    /// with an in-memory cache when caching is enabled
    pub fn from_config(config: &ResolverConfig) -> ResolverResult<Self> {
        let cache: Option<Arc<dyn CacheStore>> = if config.cache_enabled {
            Some(Arc::new(InMemoryCache::new()))
        } else {
            None
        };
        Self::from_config_with_cache(config, cache)
    }

    /// Build the standard chain on top of a caller-supplied cache backend
    pub fn from_config_with_cache(
        config: &ResolverConfig,
        cache: Option<Arc<dyn CacheStore>>,
    ) -> ResolverResult<Self> {
        let mut providers: Vec<Box<dyn NipProvider>> = vec![Box::new(RegistryProvider::new(
            config.registry.clone(),
            config.http_timeout,
        )?)];

        if let Some(commercial) = &config.commercial {
            providers.push(Box::new(CommercialApiProvider::new(
                commercial.clone(),
                config.http_timeout,
            )?));
        }

        providers.push(Box::new(ManualProvider::new()));

        Ok(Self::new(providers, cache, config.cache_ttl, config.environment))
    }

    pub fn environment(&self) -> Environment {
        self.environment
    }

    pub fn cache_ttl(&self) -> Duration {
        self.cache_ttl
    }

    /// Provider identities in the order they are consulted
    pub fn provider_order(&self) -> Vec<DataSource> {
        self.providers.iter().map(|provider| provider.name()).collect()
    }

    /// Validate a raw NIP without resolving it
    pub fn validate(&self, raw: &str) -> ValidationResult {
        nip::validate(raw)
    }

    /// Strip separators from a raw NIP
    pub fn normalize(&self, raw: &str) -> String {
        nip::normalize(raw)
    }

    /// Resolve a raw NIP to company data
    pub async fn lookup(&self, raw: &str, options: LookupOptions) -> ResolverResult<LookupResult> {
        let normalized = nip::parse(raw).map_err(|reason| ResolverError::InvalidNip { reason })?;

        if self.environment.is_production() && nip::is_test_nip(&normalized) {
            nip_warn!(normalized, "Rejected example NIP in production");
            return Err(ResolverError::TestNipNotAllowed { nip: normalized });
        }

        let key = cache_key(&normalized);

        if !options.skip_cache {
            if let Some(cached) = self.read_cache(&normalized, &key).await {
                nip_debug!(normalized, source = %cached.source, "Cache hit");
                return Ok(cached);
            }
        }

        let mut last_error: Option<ResolverError> = None;

        for provider in &self.providers {
            let name = provider.name();

            if !options.allow_manual && name == DataSource::Manual {
                continue;
            }

            if !provider.is_available().await {
                nip_debug!(normalized, provider = %name, "Provider unavailable, skipping");
                continue;
            }

            match provider.lookup(&normalized).await {
                Ok(Some(result)) => {
                    self.stats.record(name, LookupOutcome::Resolved).await;
                    if !result.requires_manual_entry {
                        self.write_cache(&normalized, &key, &result).await;
                    }
                    nip_info!(
                        normalized,
                        provider = %name,
                        manual = result.requires_manual_entry,
                        "Resolved NIP"
                    );
                    return Ok(result);
                }
                Ok(None) => {
                    self.stats.record(name, LookupOutcome::NotFound).await;
                    nip_debug!(normalized, provider = %name, "Provider has no record");
                }
                Err(error) => {
                    self.stats.record(name, LookupOutcome::Failed).await;
                    nip_warn!(normalized, provider = %name, error = %error, "Provider failed, trying next");
                    last_error = Some(ResolverError::Provider { provider: name, error });
                }
            }
        }

        match last_error {
            Some(error) => Err(error),
            None => Err(ResolverError::NipNotFound { nip: normalized }),
        }
    }

    /// Forget the cached resolution for a NIP, e.g. after a user corrected it
    pub async fn clear_cache(&self, nip: &str) -> ResolverResult<()> {
        let Some(cache) = &self.cache else {
            return Ok(());
        };
        let normalized = nip::normalize(nip);
        cache.delete(&cache_key(&normalized)).await?;
        nip_debug!(normalized, "Cleared cached resolution");
        Ok(())
    }

    /// Availability and counters of every configured provider, for health reporting
    pub async fn provider_status(&self) -> Vec<ProviderStatusReport> {
        let mut reports = Vec::with_capacity(self.providers.len());
        for provider in &self.providers {
            let name = provider.name();
            reports.push(ProviderStatusReport {
                name,
                priority: provider.priority(),
                available: provider.is_available().await,
                stats: self.stats.get(name).await,
            });
        }
        reports
    }

    /// Counters for every provider called so far
    pub async fn stats(&self) -> HashMap<DataSource, ProviderStats> {
        self.stats.snapshot().await
    }

    /// Cache read that degrades every failure to a miss
    async fn read_cache(&self, nip: &str, key: &str) -> Option<LookupResult> {
        let cache = self.cache.as_ref()?;

        let value = match cache.get(key).await {
            Ok(value) => value?,
            Err(e) => {
                nip_warn!(nip, error = %e, "Cache read failed, treating as miss");
                return None;
            }
        };

        match LookupResult::from_json(&value) {
            Ok(result) if !result.requires_manual_entry => Some(result),
            Ok(_) => None,
            Err(e) => {
                nip_warn!(nip, error = %e, "Cached value is unreadable, treating as miss");
                None
            }
        }
    }

    /// Cache write that logs and skips on failure
    async fn write_cache(&self, nip: &str, key: &str, result: &LookupResult) {
        let Some(cache) = &self.cache else {
            return;
        };

        let value = match result.to_json() {
            Ok(value) => value,
            Err(e) => {
                nip_warn!(nip, error = %e, "Could not encode result for cache");
                return;
            }
        };

        if let Err(e) = cache.set_with_expiry(key, self.cache_ttl.as_secs(), value).await {
            nip_warn!(nip, error = %e, "Cache write failed, continuing without cache");
        }
    }
}

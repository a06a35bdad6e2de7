//! Resolver trait definitions for dependency injection

use async_trait::async_trait;

use shared::{DataSource, LookupResult};
use crate::error::{CacheError, ProviderResult};

/// A pluggable source of company data for a NIP
#[mockall::automock]
#[async_trait]
pub trait NipProvider: Send + Sync {
    /// Identity of this provider, also stamped on its results
    fn name(&self) -> DataSource;

    /// Lower values are consulted first
    fn priority(&self) -> u32;

    /// Whether the provider can serve lookups right now.
    ///
    /// Implementations swallow their own errors and report `false`.
    async fn is_available(&self) -> bool;

    /// Resolve a normalized NIP.
    ///
    /// `Ok(None)` means the provider has no record; `Err` means the provider failed.
    async fn lookup(&self, nip: &str) -> ProviderResult<Option<LookupResult>>;
}

/// Expiring key-value store used to memoize resolutions
#[mockall::automock]
#[async_trait]
pub trait CacheStore: Send + Sync {
    /// Read a value, `None` on miss or expiry
    async fn get(&self, key: &str) -> Result<Option<String>, CacheError>;

    /// Store a value that expires after `ttl_secs`
    async fn set_with_expiry(&self, key: &str, ttl_secs: u64, value: String) -> Result<(), CacheError>;

    /// Remove a value; deleting a missing key is not an error
    async fn delete(&self, key: &str) -> Result<(), CacheError>;
}

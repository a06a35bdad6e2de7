//! Resolver-specific data types

use std::time::{Duration, Instant};

/// Prefix for every cache key written by the resolver
pub const CACHE_KEY_PREFIX: &str = "nip:lookup:";

/// Default cache lifetime for a resolved NIP
pub const DEFAULT_CACHE_TTL: Duration = Duration::from_secs(24 * 60 * 60);

/// Registry sessions last about an hour upstream; refresh a little earlier
pub const DEFAULT_SESSION_LIFETIME: Duration = Duration::from_secs(55 * 60);

/// Upper bound for any configured lifetime or TTL (ten years)
pub const MAX_CONFIGURED_DURATION: Duration = Duration::from_secs(10 * 365 * 24 * 60 * 60);

/// Provider priorities, lower is consulted first
pub const REGISTRY_PRIORITY: u32 = 10;
pub const COMMERCIAL_PRIORITY: u32 = 20;
pub const MANUAL_PRIORITY: u32 = 100;

/// Build the cache key for a normalized NIP
pub fn cache_key(nip: &str) -> String {
    format!("{CACHE_KEY_PREFIX}{nip}")
}

/// Memoized registry session
#[derive(Debug, Clone)]
pub struct RegistrySession {
    pub id: String,
    pub expires_at: Instant,
}

impl RegistrySession {
    pub fn new(id: String, lifetime: Duration) -> Self {
        Self {
            id,
            expires_at: Instant::now() + lifetime.min(MAX_CONFIGURED_DURATION),
        }
    }

    pub fn is_live(&self) -> bool {
        Instant::now() < self.expires_at
    }
}

//! Resolver configuration loaded from the environment
//!
//! Values are read from:
//! 1. `.env` file in the current directory or parent directories (if present)
//! 2. System environment variables
//!
//! Environment variables take precedence over .env file values.
//!
//! ## Variables
//! - `NIP_ENV`: `production`, `staging`, `development` (default) or `test`
//! - `NIP_CACHE_ENABLED`: `true` (default) or `false`
//! - `NIP_CACHE_TTL_SECS`: cache lifetime, default one day
//! - `NIP_REGISTRY_API_KEY`: official registry key; the provider reports unavailable without it
//! - `NIP_REGISTRY_URL`: registry gateway base URL
//! - `NIP_REGISTRY_SESSION_SECS`: session lifetime, default 55 minutes
//! - `NIP_COMMERCIAL_API_KEY`: commercial API key; the provider is only registered with it
//! - `NIP_COMMERCIAL_API_URL`: commercial API base URL
//! - `NIP_HTTP_TIMEOUT_SECS`: per-request transport timeout, default 10 seconds

use std::time::Duration;

use shared::Environment;
use url::Url;

use crate::error::{ResolverError, ResolverResult};
use crate::types::{DEFAULT_CACHE_TTL, DEFAULT_SESSION_LIFETIME, MAX_CONFIGURED_DURATION};

pub const DEFAULT_REGISTRY_URL: &str = "https://wyszukiwarkaregon.stat.gov.pl/wsBIR/api";
pub const DEFAULT_COMMERCIAL_URL: &str = "https://api.companydata.pl/v1";
pub const DEFAULT_HTTP_TIMEOUT: Duration = Duration::from_secs(10);

/// Official registry connection settings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegistryConfig {
    pub api_key: Option<String>,
    pub base_url: Url,
    pub session_lifetime: Duration,
}

/// Commercial API connection settings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommercialConfig {
    pub api_key: String,
    pub base_url: Url,
}

/// Complete resolver configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolverConfig {
    pub environment: Environment,
    pub cache_enabled: bool,
    pub cache_ttl: Duration,
    pub http_timeout: Duration,
    pub registry: RegistryConfig,
    pub commercial: Option<CommercialConfig>,
}

impl ResolverConfig {
    /// Load `.env` if present, then read the process environment
    pub fn from_env() -> ResolverResult<Self> {
        let _ = dotenvy::dotenv();
        Self::from_vars(|key| std::env::var(key).ok())
    }

    /// Parse configuration from an arbitrary variable lookup
    pub fn from_vars<F>(var: F) -> ResolverResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| var(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let environment = match get("NIP_ENV") {
            Some(value) => value.parse::<Environment>()?,
            None => Environment::default(),
        };

        let cache_enabled = match get("NIP_CACHE_ENABLED") {
            Some(value) => parse_bool("NIP_CACHE_ENABLED", &value)?,
            None => true,
        };

        let cache_ttl = parse_secs(&get, "NIP_CACHE_TTL_SECS", DEFAULT_CACHE_TTL)?;
        let http_timeout = parse_secs(&get, "NIP_HTTP_TIMEOUT_SECS", DEFAULT_HTTP_TIMEOUT)?;

        let registry = RegistryConfig {
            api_key: get("NIP_REGISTRY_API_KEY"),
            base_url: parse_url(
                "NIP_REGISTRY_URL",
                &get("NIP_REGISTRY_URL").unwrap_or_else(|| DEFAULT_REGISTRY_URL.to_string()),
            )?,
            session_lifetime: parse_secs(&get, "NIP_REGISTRY_SESSION_SECS", DEFAULT_SESSION_LIFETIME)?,
        };

        let commercial = match get("NIP_COMMERCIAL_API_KEY") {
            Some(api_key) => Some(CommercialConfig {
                api_key,
                base_url: parse_url(
                    "NIP_COMMERCIAL_API_URL",
                    &get("NIP_COMMERCIAL_API_URL").unwrap_or_else(|| DEFAULT_COMMERCIAL_URL.to_string()),
                )?,
            }),
            None => None,
        };

        Ok(Self {
            environment,
            cache_enabled,
            cache_ttl,
            http_timeout,
            registry,
            commercial,
        })
    }
}

fn parse_bool(key: &str, value: &str) -> ResolverResult<bool> {
    match value.to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(ResolverError::config(format!("{key} must be a boolean, got '{value}'"))),
    }
}

fn parse_secs<G>(get: &G, key: &str, default: Duration) -> ResolverResult<Duration>
where
    G: Fn(&str) -> Option<String>,
{
    let Some(value) = get(key) else {
        return Ok(default);
    };

    let secs = value
        .parse::<u64>()
        .map_err(|_| ResolverError::config(format!("{key} must be a number of seconds, got '{value}'")))?;

    let max = MAX_CONFIGURED_DURATION.as_secs();
    if secs > max {
        return Err(ResolverError::config(format!("{key} must be at most {max} seconds, got {secs}")));
    }
    Ok(Duration::from_secs(secs))
}

fn parse_url(key: &str, value: &str) -> ResolverResult<Url> {
    Url::parse(value).map_err(|e| ResolverError::config(format!("{key} is not a valid URL: {e}")))
}

//! Resolver error types

use thiserror::Error;
use shared::{DataSource, SharedError, ValidationFailure};

/// Result type for resolver operations
pub type ResolverResult<T> = Result<T, ResolverError>;

/// Result type for a single provider call
pub type ProviderResult<T> = Result<T, ProviderError>;

/// Resolver error types surfaced to callers
#[derive(Error, Debug)]
pub enum ResolverError {
    #[error("{reason}")]
    InvalidNip { reason: ValidationFailure },

    #[error("Test NIP {nip} is not allowed in production")]
    TestNipNotAllowed { nip: String },

    #[error("NIP {nip} was not found by any provider")]
    NipNotFound { nip: String },

    #[error("Provider {provider} failed: {error}")]
    Provider { provider: DataSource, error: ProviderError },

    #[error("Cache error: {0}")]
    Cache(#[from] CacheError),

    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Serialization error: {message}")]
    Serialization { message: String },
}

impl ResolverError {
    /// Stable machine-readable code for mapping onto API responses
    pub fn kind(&self) -> &'static str {
        match self {
            ResolverError::InvalidNip { .. } => "INVALID_NIP",
            ResolverError::TestNipNotAllowed { .. } => "TEST_NIP_NOT_ALLOWED",
            ResolverError::NipNotFound { .. } => "NIP_NOT_FOUND",
            ResolverError::Provider { .. } => "PROVIDER_ERROR",
            ResolverError::Cache(_) => "CACHE_ERROR",
            ResolverError::Config { .. } => "CONFIG_ERROR",
            ResolverError::Serialization { .. } => "SERIALIZATION_ERROR",
        }
    }

    pub(crate) fn config(message: impl Into<String>) -> Self {
        ResolverError::Config { message: message.into() }
    }
}

impl From<SharedError> for ResolverError {
    fn from(error: SharedError) -> Self {
        match error {
            SharedError::InvalidConfig { .. } => ResolverError::Config { message: error.to_string() },
            SharedError::SerializationError { .. } | SharedError::DeserializationError { .. } => {
                ResolverError::Serialization { message: error.to_string() }
            }
        }
    }
}

/// Failure of a single provider call, as opposed to a "not found" answer
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProviderError {
    #[error("no credentials configured")]
    MissingCredentials,

    #[error("authentication rejected: {0}")]
    Authentication(String),

    #[error("session could not be established: {0}")]
    Session(String),

    #[error("network error: {0}")]
    Network(String),

    #[error("unexpected HTTP status {status}: {message}")]
    Http { status: u16, message: String },

    #[error("rate limit exceeded")]
    RateLimited,

    #[error("malformed response: {0}")]
    Parse(String),
}

impl ProviderError {
    /// Classify a non-success HTTP status
    pub fn from_status(status: reqwest::StatusCode) -> Self {
        match status.as_u16() {
            401 | 403 => ProviderError::Authentication(status.to_string()),
            429 => ProviderError::RateLimited,
            code => ProviderError::Http {
                status: code,
                message: status.canonical_reason().unwrap_or("unknown").to_string(),
            },
        }
    }
}

impl From<reqwest::Error> for ProviderError {
    fn from(error: reqwest::Error) -> Self {
        if error.is_decode() {
            ProviderError::Parse(error.to_string())
        } else {
            ProviderError::Network(error.to_string())
        }
    }
}

/// Cache backend failures; never fatal to a lookup
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CacheError {
    #[error("cache backend unavailable: {0}")]
    Backend(String),

    #[error("cache value could not be encoded: {0}")]
    Encoding(String),
}

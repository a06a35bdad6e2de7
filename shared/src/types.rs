//! Core shared types for NIP resolution

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::errors::SharedError;
use crate::nip::ValidationFailure;

/// Data source that produced a lookup result
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DataSource {
    /// Government business registry (session-based)
    OfficialRegistry,
    /// Paid third-party company data API
    CommercialApi,
    /// Placeholder awaiting human completion
    Manual,
}

impl fmt::Display for DataSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DataSource::OfficialRegistry => write!(f, "official_registry"),
            DataSource::CommercialApi => write!(f, "commercial_api"),
            DataSource::Manual => write!(f, "manual"),
        }
    }
}

impl std::str::FromStr for DataSource {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "official_registry" | "registry" => Ok(DataSource::OfficialRegistry),
            "commercial_api" | "commercial" => Ok(DataSource::CommercialApi),
            "manual" => Ok(DataSource::Manual),
            _ => Err(format!("Unknown data source: {s}")),
        }
    }
}

/// VAT registration status of a company
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VatStatus {
    Active,
    Exempt,
    Inactive,
}

impl VatStatus {
    /// Map a free-form upstream status.
    ///
    /// Missing or blank input stays unknown; unrecognized values count as inactive.
    pub fn from_upstream(raw: Option<&str>) -> Option<Self> {
        let raw = raw.map(str::trim).filter(|s| !s.is_empty())?;
        let status = match raw.to_lowercase().as_str() {
            "czynny" | "active" => VatStatus::Active,
            "zwolniony" | "exempt" => VatStatus::Exempt,
            _ => VatStatus::Inactive,
        };
        Some(status)
    }
}

/// Postal address of a company
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Address {
    pub street: Option<String>,
    pub city: Option<String>,
    pub postal_code: Option<String>,
    pub country: Option<String>,
}

/// Company data resolved for a NIP
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LookupResult {
    pub nip: String,
    pub name: Option<String>,
    pub regon: Option<String>,
    pub krs: Option<String>,
    pub address: Address,
    pub vat_status: Option<VatStatus>,
    pub source: DataSource,
    pub requires_manual_entry: bool,
}

impl LookupResult {
    /// Shell record with every descriptive field empty, to be completed by a person
    pub fn manual_placeholder(nip: impl Into<String>) -> Self {
        Self {
            nip: nip.into(),
            name: None,
            regon: None,
            krs: None,
            address: Address::default(),
            vat_status: None,
            source: DataSource::Manual,
            requires_manual_entry: true,
        }
    }

    /// Serialize for storage in a cache
    pub fn to_json(&self) -> Result<String, SharedError> {
        serde_json::to_string(self).map_err(|e| SharedError::SerializationError {
            message: e.to_string(),
        })
    }

    /// Deserialize a cached value
    pub fn from_json(value: &str) -> Result<Self, SharedError> {
        serde_json::from_str(value).map_err(|e| SharedError::DeserializationError {
            message: e.to_string(),
        })
    }
}

/// Outcome of validating a raw identifier
///
/// Built only through [`ValidationResult::valid`] and [`ValidationResult::invalid`]
/// so that a valid result always carries a normalized value and no reason,
/// and an invalid one never carries a normalized value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationResult {
    pub valid: bool,
    pub normalized: Option<String>,
    pub reason: Option<String>,
}

impl ValidationResult {
    pub fn valid(normalized: String) -> Self {
        Self {
            valid: true,
            normalized: Some(normalized),
            reason: None,
        }
    }

    pub fn invalid(failure: ValidationFailure) -> Self {
        Self {
            valid: false,
            normalized: None,
            reason: Some(failure.to_string()),
        }
    }
}

/// Per-call lookup switches
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LookupOptions {
    /// Go straight to the providers without reading the cache
    pub skip_cache: bool,
    /// Permit the manual placeholder provider as the last resort
    pub allow_manual: bool,
}

impl Default for LookupOptions {
    fn default() -> Self {
        Self {
            skip_cache: false,
            allow_manual: true,
        }
    }
}

/// Deployment environment; gates rejection of example identifiers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Environment {
    Production,
    Staging,
    Development,
    Test,
}

impl Environment {
    pub fn is_production(&self) -> bool {
        matches!(self, Environment::Production)
    }
}

impl Default for Environment {
    fn default() -> Self {
        Environment::Development
    }
}

impl fmt::Display for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Environment::Production => write!(f, "production"),
            Environment::Staging => write!(f, "staging"),
            Environment::Development => write!(f, "development"),
            Environment::Test => write!(f, "test"),
        }
    }
}

impl std::str::FromStr for Environment {
    type Err = SharedError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "production" | "prod" => Ok(Environment::Production),
            "staging" => Ok(Environment::Staging),
            "development" | "dev" => Ok(Environment::Development),
            "test" => Ok(Environment::Test),
            _ => Err(SharedError::InvalidConfig {
                field: "environment".to_string(),
                value: s.to_string(),
            }),
        }
    }
}

/// Running counters for a single provider
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProviderStats {
    pub attempts: u64,
    pub resolved: u64,
    pub not_found: u64,
    pub failures: u64,
    pub last_used: Option<DateTime<Utc>>,
}

/// Health snapshot of one configured provider
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProviderStatusReport {
    pub name: DataSource,
    pub priority: u32,
    pub available: bool,
    pub stats: ProviderStats,
}

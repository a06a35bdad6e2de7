//! Commercial company-data API provider

use std::time::Duration;
use async_trait::async_trait;
use serde::Deserialize;

use shared::{Address, DataSource, LookupResult, VatStatus};
use crate::config::CommercialConfig;
use crate::error::{ProviderError, ProviderResult, ResolverError, ResolverResult};
use crate::traits::NipProvider;
use crate::types::COMMERCIAL_PRIORITY;

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct CompanyAddress {
    street: Option<String>,
    city: Option<String>,
    postal_code: Option<String>,
    country: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct CompanyDocument {
    name: Option<String>,
    regon: Option<String>,
    krs: Option<String>,
    address: CompanyAddress,
    vat_status: Option<String>,
}

/// Paid API keyed by a bearer token; one request per lookup
pub struct CommercialApiProvider {
    client: reqwest::Client,
    api_key: String,
    base_url: String,
    priority: u32,
}

impl CommercialApiProvider {
    pub fn new(config: CommercialConfig, http_timeout: Duration) -> ResolverResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(http_timeout)
            .build()
            .map_err(|e| ResolverError::config(format!("Failed to build commercial API client: {e}")))?;

        Ok(Self {
            client,
            api_key: config.api_key,
            base_url: config.base_url.as_str().trim_end_matches('/').to_string(),
            priority: COMMERCIAL_PRIORITY,
        })
    }

    pub fn with_priority(mut self, priority: u32) -> Self {
        self.priority = priority;
        self
    }
}

#[async_trait]
impl NipProvider for CommercialApiProvider {
    fn name(&self) -> DataSource {
        DataSource::CommercialApi
    }

    fn priority(&self) -> u32 {
        self.priority
    }

    async fn is_available(&self) -> bool {
        !self.api_key.trim().is_empty()
    }

    async fn lookup(&self, nip: &str) -> ProviderResult<Option<LookupResult>> {
        let response = self
            .client
            .get(format!("{}/companies/{}", self.base_url, nip))
            .bearer_auth(&self.api_key)
            .send()
            .await?;

        let status = response.status();
        if status == reqwest::StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !status.is_success() {
            return Err(ProviderError::from_status(status));
        }

        let document: CompanyDocument = response
            .json()
            .await
            .map_err(|e| ProviderError::Parse(format!("Failed to parse company document: {e}")))?;

        Ok(Some(LookupResult {
            nip: nip.to_string(),
            name: document.name,
            regon: document.regon,
            krs: document.krs,
            address: Address {
                street: document.address.street,
                city: document.address.city,
                postal_code: document.address.postal_code,
                country: document.address.country.or_else(|| Some("PL".to_string())),
            },
            vat_status: VatStatus::from_upstream(document.vat_status.as_deref()),
            source: DataSource::CommercialApi,
            requires_manual_entry: false,
        }))
    }
}

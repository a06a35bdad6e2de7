//! Official business registry provider
//!
//! Resolution costs at most three calls against the registry gateway:
//! session login (only when no live session is memoized), a basic search
//! by NIP, and an extended report fetched by REGON for the KRS number.

use std::time::Duration;
use async_trait::async_trait;
use serde::Deserialize;
use tokio::sync::Mutex;
use tracing::{debug, warn};

use shared::{Address, DataSource, LookupResult, VatStatus};
use crate::config::RegistryConfig;
use crate::error::{ProviderError, ProviderResult, ResolverError, ResolverResult};
use crate::traits::NipProvider;
use crate::types::{RegistrySession, REGISTRY_PRIORITY};

const SESSION_HEADER: &str = "sid";
const LEGAL_PERSON_REPORT: &str = "BIR11OsPrawna";
const NATURAL_PERSON_REPORT: &str = "BIR11OsFizycznaDaneOgolne";

#[derive(Debug, Deserialize)]
struct SessionResponse {
    #[serde(rename = "sessionId", default)]
    session_id: Option<String>,
}

/// Entity returned by the basic search
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct RegistryEntity {
    pub regon: Option<String>,
    pub nip: Option<String>,
    pub nazwa: Option<String>,
    pub miejscowosc: Option<String>,
    pub kod_pocztowy: Option<String>,
    pub ulica: Option<String>,
    pub nr_nieruchomosci: Option<String>,
    pub nr_lokalu: Option<String>,
    pub status_vat: Option<String>,
    /// `P` for legal persons, `F` for sole traders
    pub typ: Option<String>,
}

/// Extended report fields used for enrichment
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RegistryReport {
    #[serde(rename = "praw_numerWRejestrzeEwidencji", alias = "fiz_numerWRejestrzeEwidencji")]
    pub krs: Option<String>,
}

/// Session-based provider backed by the government registry
pub struct RegistryProvider {
    client: reqwest::Client,
    api_key: Option<String>,
    base_url: String,
    session_lifetime: Duration,
    priority: u32,
    session: Mutex<Option<RegistrySession>>,
}

impl RegistryProvider {
    /// Create a provider; without an API key it reports itself unavailable
    pub fn new(config: RegistryConfig, http_timeout: Duration) -> ResolverResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(http_timeout)
            .build()
            .map_err(|e| ResolverError::config(format!("Failed to build registry HTTP client: {e}")))?;

        Ok(Self {
            client,
            api_key: config.api_key,
            base_url: config.base_url.as_str().trim_end_matches('/').to_string(),
            session_lifetime: config.session_lifetime,
            priority: REGISTRY_PRIORITY,
            session: Mutex::new(None),
        })
    }

    pub fn with_priority(mut self, priority: u32) -> Self {
        self.priority = priority;
        self
    }

    /// Whether a session is memoized and not yet expired
    pub async fn has_live_session(&self) -> bool {
        self.session.lock().await.as_ref().is_some_and(RegistrySession::is_live)
    }

    /// Reuse the memoized session or log in again.
    ///
    /// The lock is held across the login so concurrent callers share one refresh.
    async fn ensure_session(&self) -> ProviderResult<String> {
        let api_key = self.api_key.as_deref().ok_or(ProviderError::MissingCredentials)?;

        let mut session = self.session.lock().await;
        if let Some(current) = session.as_ref().filter(|s| s.is_live()) {
            return Ok(current.id.clone());
        }

        debug!("Registry session missing or expired, logging in");
        let id = self.login(api_key).await?;
        *session = Some(RegistrySession::new(id.clone(), self.session_lifetime));
        Ok(id)
    }

    /// Forget the session the registry rejected, unless it was already replaced
    pub(crate) async fn invalidate_session(&self, sid: &str) {
        let mut session = self.session.lock().await;
        if session.as_ref().is_some_and(|current| current.id == sid) {
            *session = None;
        }
    }

    async fn login(&self, api_key: &str) -> ProviderResult<String> {
        let response = self
            .client
            .post(format!("{}/session", self.base_url))
            .json(&serde_json::json!({ "apiKey": api_key }))
            .send()
            .await
            .map_err(|e| ProviderError::Session(e.to_string()))?;

        if !response.status().is_success() {
            return Err(ProviderError::from_status(response.status()));
        }

        let body: SessionResponse = response
            .json()
            .await
            .map_err(|e| ProviderError::Parse(format!("Failed to parse session response: {e}")))?;

        body.session_id
            .filter(|id| !id.trim().is_empty())
            .ok_or_else(|| ProviderError::Authentication("registry rejected the API key".to_string()))
    }

    async fn search(&self, sid: &str, nip: &str) -> ProviderResult<Option<RegistryEntity>> {
        let response = self
            .client
            .get(format!("{}/search", self.base_url))
            .header(SESSION_HEADER, sid)
            .query(&[("nip", nip)])
            .send()
            .await?;

        let status = response.status();
        if status == reqwest::StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if status == reqwest::StatusCode::UNAUTHORIZED {
            self.invalidate_session(sid).await;
        }
        if !status.is_success() {
            return Err(ProviderError::from_status(status));
        }

        let entities: Vec<RegistryEntity> = response
            .json()
            .await
            .map_err(|e| ProviderError::Parse(format!("Failed to parse search response: {e}")))?;

        Ok(entities.into_iter().next())
    }

    async fn report(&self, sid: &str, regon: &str, entity_type: Option<&str>) -> ProviderResult<RegistryReport> {
        let report_name = match entity_type {
            Some("P") => LEGAL_PERSON_REPORT,
            _ => NATURAL_PERSON_REPORT,
        };

        let response = self
            .client
            .get(format!("{}/report", self.base_url))
            .header(SESSION_HEADER, sid)
            .query(&[("regon", regon), ("name", report_name)])
            .send()
            .await?;

        let status = response.status();
        if status == reqwest::StatusCode::NOT_FOUND {
            return Ok(RegistryReport::default());
        }
        if status == reqwest::StatusCode::UNAUTHORIZED {
            self.invalidate_session(sid).await;
        }
        if !status.is_success() {
            return Err(ProviderError::from_status(status));
        }

        response
            .json()
            .await
            .map_err(|e| ProviderError::Parse(format!("Failed to parse report response: {e}")))
    }
}

#[async_trait]
impl NipProvider for RegistryProvider {
    fn name(&self) -> DataSource {
        DataSource::OfficialRegistry
    }

    fn priority(&self) -> u32 {
        self.priority
    }

    async fn is_available(&self) -> bool {
        if self.api_key.is_none() {
            return false;
        }
        match self.ensure_session().await {
            Ok(_) => true,
            Err(e) => {
                warn!(error = %e, "Registry unavailable");
                false
            }
        }
    }

    async fn lookup(&self, nip: &str) -> ProviderResult<Option<LookupResult>> {
        let sid = self.ensure_session().await?;

        let Some(entity) = self.search(&sid, nip).await? else {
            return Ok(None);
        };

        let report = match non_empty(entity.regon.as_deref()) {
            Some(regon) => self.report(&sid, &regon, entity.typ.as_deref()).await?,
            None => RegistryReport::default(),
        };

        Ok(Some(map_entity(nip, entity, report)))
    }
}

/// Combine search and report payloads into a lookup result
pub fn map_entity(nip: &str, entity: RegistryEntity, report: RegistryReport) -> LookupResult {
    let street = compose_street(
        entity.ulica.as_deref(),
        entity.nr_nieruchomosci.as_deref(),
        entity.nr_lokalu.as_deref(),
    );

    LookupResult {
        nip: nip.to_string(),
        name: non_empty(entity.nazwa.as_deref()),
        regon: non_empty(entity.regon.as_deref()),
        krs: non_empty(report.krs.as_deref()),
        address: Address {
            street,
            city: non_empty(entity.miejscowosc.as_deref()),
            postal_code: non_empty(entity.kod_pocztowy.as_deref()),
            country: Some("PL".to_string()),
        },
        vat_status: VatStatus::from_upstream(entity.status_vat.as_deref()),
        source: DataSource::OfficialRegistry,
        requires_manual_entry: false,
    }
}

/// `street house/unit`, skipping whichever parts are missing
pub fn compose_street(street: Option<&str>, house: Option<&str>, unit: Option<&str>) -> Option<String> {
    let mut line = non_empty(street).unwrap_or_default();

    if let Some(house) = non_empty(house) {
        if !line.is_empty() {
            line.push(' ');
        }
        line.push_str(&house);
    }
    // A unit number means nothing without a street or house number
    if let Some(unit) = non_empty(unit).filter(|_| !line.is_empty()) {
        line.push('/');
        line.push_str(&unit);
    }

    (!line.is_empty()).then_some(line)
}

fn non_empty(value: Option<&str>) -> Option<String> {
    value.map(str::trim).filter(|v| !v.is_empty()).map(str::to_string)
}

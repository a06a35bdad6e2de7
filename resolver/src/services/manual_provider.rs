//! Manual-entry fallback provider

use async_trait::async_trait;

use shared::{nip, DataSource, LookupResult};
use crate::error::ProviderResult;
use crate::traits::NipProvider;
use crate::types::MANUAL_PRIORITY;

/// Always-available provider that hands back an empty shell for a person to complete
#[derive(Debug, Clone)]
pub struct ManualProvider {
    priority: u32,
}

impl ManualProvider {
    pub fn new() -> Self {
        Self { priority: MANUAL_PRIORITY }
    }

    pub fn with_priority(priority: u32) -> Self {
        Self { priority }
    }
}

impl Default for ManualProvider {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl NipProvider for ManualProvider {
    fn name(&self) -> DataSource {
        DataSource::Manual
    }

    fn priority(&self) -> u32 {
        self.priority
    }

    async fn is_available(&self) -> bool {
        true
    }

    async fn lookup(&self, nip: &str) -> ProviderResult<Option<LookupResult>> {
        // Usable on its own, so the checksum is checked again here
        match nip::parse(nip) {
            Ok(normalized) => Ok(Some(LookupResult::manual_placeholder(normalized))),
            Err(_) => Ok(None),
        }
    }
}

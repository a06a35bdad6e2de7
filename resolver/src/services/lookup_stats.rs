//! Per-provider lookup statistics

use std::collections::HashMap;
use std::sync::Arc;
use chrono::Utc;
use tokio::sync::RwLock;

use shared::{DataSource, ProviderStats};

/// Outcome of one provider call
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LookupOutcome {
    Resolved,
    NotFound,
    Failed,
}

/// In-memory counters for every provider the resolver has called
#[derive(Debug, Clone, Default)]
pub struct LookupStats {
    stats: Arc<RwLock<HashMap<DataSource, ProviderStats>>>,
}

impl LookupStats {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the outcome of a provider call
    pub async fn record(&self, provider: DataSource, outcome: LookupOutcome) {
        let mut stats = self.stats.write().await;
        let provider_stats = stats.entry(provider).or_default();

        provider_stats.attempts += 1;
        match outcome {
            LookupOutcome::Resolved => provider_stats.resolved += 1,
            LookupOutcome::NotFound => provider_stats.not_found += 1,
            LookupOutcome::Failed => provider_stats.failures += 1,
        }
        provider_stats.last_used = Some(Utc::now());
    }

    /// Counters for one provider, zeroed if it was never called
    pub async fn get(&self, provider: DataSource) -> ProviderStats {
        let stats = self.stats.read().await;
        stats.get(&provider).cloned().unwrap_or_default()
    }

    /// Snapshot of every provider's counters
    pub async fn snapshot(&self) -> HashMap<DataSource, ProviderStats> {
        self.stats.read().await.clone()
    }
}

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use crate::catalog::Category;
use crate::providers::CapabilityProvider;
use crate::types::{ProviderName, ProviderStatus};

/// `instance` is `Some` exactly when `status` is `Loaded`.
#[derive(Clone)]
pub struct ProviderRuntimeState {
    pub status: ProviderStatus,
    pub instance: Option<Arc<dyn CapabilityProvider>>,
    pub load_duration_ms: Option<u64>,
    pub last_error: Option<String>,
    pub last_health_check_at: Option<DateTime<Utc>>,
    pub load_attempts: u32,
}

impl ProviderRuntimeState {
    pub fn new() -> Self {
        Self {
            status: ProviderStatus::Registered,
            instance: None,
            load_duration_ms: None,
            last_error: None,
            last_health_check_at: None,
            load_attempts: 0,
        }
    }

    pub fn is_loaded(&self) -> bool {
        self.status == ProviderStatus::Loaded
    }
}

impl Default for ProviderRuntimeState {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for ProviderRuntimeState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProviderRuntimeState")
            .field("status", &self.status)
            .field("has_instance", &self.instance.is_some())
            .field("load_duration_ms", &self.load_duration_ms)
            .field("last_error", &self.last_error)
            .field("last_health_check_at", &self.last_health_check_at)
            .field("load_attempts", &self.load_attempts)
            .finish()
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryStats {
    pub registered: usize,
    pub loading: usize,
    pub loaded: usize,
    pub failed: usize,
}

impl CategoryStats {
    pub(crate) fn record(&mut self, status: ProviderStatus) {
        self.registered += 1;
        match status {
            ProviderStatus::Loading => self.loading += 1,
            ProviderStatus::Loaded => self.loaded += 1,
            ProviderStatus::Failed => self.failed += 1,
            ProviderStatus::Registered => {}
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegistrySnapshot {
    pub total: usize,
    pub loading: usize,
    pub loaded: usize,
    pub failed: usize,
    pub categories: BTreeMap<Category, CategoryStats>,
    pub loaded_names: Vec<ProviderName>,
    pub failed_names: Vec<ProviderName>,
    pub taken_at: DateTime<Utc>,
}

impl RegistrySnapshot {
    pub fn category_totals(&self) -> CategoryStats {
        self.categories
            .values()
            .fold(CategoryStats::default(), |mut acc, stats| {
                acc.registered += stats.registered;
                acc.loading += stats.loading;
                acc.loaded += stats.loaded;
                acc.failed += stats.failed;
                acc
            })
    }

    pub fn is_consistent(&self) -> bool {
        let totals = self.category_totals();
        totals.registered == self.total
            && totals.loading == self.loading
            && totals.loaded == self.loaded
            && totals.failed == self.failed
            && self.loaded_names.len() == self.loaded
            && self.failed_names.len() == self.failed
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CategoryLoadResult {
    pub provider_name: ProviderName,
    pub loaded: bool,
    pub error: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_category_stats_record() {
        let mut stats = CategoryStats::default();
        stats.record(ProviderStatus::Registered);
        stats.record(ProviderStatus::Loaded);
        stats.record(ProviderStatus::Failed);

        assert_eq!(stats.registered, 3);
        assert_eq!(stats.loaded, 1);
        assert_eq!(stats.failed, 1);
        assert_eq!(stats.loading, 0);
    }

    #[test]
    fn test_new_runtime_state_is_registered() {
        let state = ProviderRuntimeState::new();
        assert_eq!(state.status, ProviderStatus::Registered);
        assert!(state.instance.is_none());
        assert!(!state.is_loaded());
    }
}

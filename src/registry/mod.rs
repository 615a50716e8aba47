pub mod health;
pub mod state;

pub use health::HealthMonitor;
pub use state::{CategoryLoadResult, CategoryStats, ProviderRuntimeState, RegistrySnapshot};

use chrono::Utc;
use futures::future::{BoxFuture, FutureExt, Shared};
use std::collections::{BTreeMap, HashSet};
use std::panic::AssertUnwindSafe;
use std::sync::{Arc, Mutex, MutexGuard, RwLock};
use std::time::Instant;

use crate::catalog::{Catalog, Category, ProviderDescriptor};
use crate::error::{OrchestratorError, OrchestratorResult};
use crate::providers::CapabilityProvider;
use crate::types::{duration_ms, ProviderStatus};

type LoadOutcome = OrchestratorResult<Arc<dyn CapabilityProvider>>;
type InFlightLoad = Shared<BoxFuture<'static, LoadOutcome>>;

struct EntryState {
    runtime: ProviderRuntimeState,
    in_flight: Option<InFlightLoad>,
}

struct ProviderEntry {
    descriptor: ProviderDescriptor,
    state: Mutex<EntryState>,
}

impl ProviderEntry {
    fn lock(&self) -> MutexGuard<'_, EntryState> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

/// The name map is only write-locked during registration. Status transitions
/// take the lock of the affected entry alone, so loads of different providers
/// never serialize on each other.
#[derive(Clone, Default)]
pub struct Registry {
    entries: Arc<RwLock<BTreeMap<String, Arc<ProviderEntry>>>>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&self, descriptor: ProviderDescriptor) -> OrchestratorResult<()> {
        let mut entries = self.entries.write().unwrap_or_else(|e| e.into_inner());
        if entries.contains_key(&descriptor.name) {
            return Err(OrchestratorError::DuplicateProvider(descriptor.name));
        }

        entries.insert(
            descriptor.name.clone(),
            Arc::new(ProviderEntry {
                descriptor,
                state: Mutex::new(EntryState {
                    runtime: ProviderRuntimeState::new(),
                    in_flight: None,
                }),
            }),
        );
        Ok(())
    }

    pub fn register_catalog(&self, catalog: Catalog) -> OrchestratorResult<usize> {
        let mut entries = self.entries.write().unwrap_or_else(|e| e.into_inner());

        let mut seen = HashSet::new();
        for descriptor in catalog.descriptors() {
            if entries.contains_key(&descriptor.name) || !seen.insert(descriptor.name.as_str()) {
                return Err(OrchestratorError::DuplicateProvider(descriptor.name.clone()));
            }
        }

        let count = catalog.len();
        for descriptor in catalog {
            entries.insert(
                descriptor.name.clone(),
                Arc::new(ProviderEntry {
                    descriptor,
                    state: Mutex::new(EntryState {
                        runtime: ProviderRuntimeState::new(),
                        in_flight: None,
                    }),
                }),
            );
        }
        Ok(count)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.read_entries().contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.read_entries().len()
    }

    pub fn is_empty(&self) -> bool {
        self.read_entries().is_empty()
    }

    pub fn names(&self) -> Vec<String> {
        self.read_entries().keys().cloned().collect()
    }

    pub fn descriptor(&self, name: &str) -> Option<ProviderDescriptor> {
        self.read_entries().get(name).map(|e| e.descriptor.clone())
    }

    pub fn runtime_state(&self, name: &str) -> Option<ProviderRuntimeState> {
        let entry = self.entry(name).ok()?;
        let runtime = entry.lock().runtime.clone();
        Some(runtime)
    }

    pub fn status_of(&self, name: &str) -> Option<ProviderStatus> {
        let entry = self.entry(name).ok()?;
        let status = entry.lock().runtime.status;
        Some(status)
    }

    pub fn descriptors_in(&self, category: Category) -> Vec<ProviderDescriptor> {
        let mut matching: Vec<_> = self
            .read_entries()
            .values()
            .filter(|e| e.descriptor.category == category)
            .map(|e| e.descriptor.clone())
            .collect();
        matching.sort_by(|a, b| a.priority.cmp(&b.priority).then_with(|| a.name.cmp(&b.name)));
        matching
    }

    /// Returns the cached instance, joins an in-flight load, or starts a new one.
    /// The initializer runs at most once per load attempt no matter how many
    /// callers arrive while it is running; they all receive the same outcome.
    /// A `Failed` provider is retried by the next caller.
    pub async fn load_provider(&self, name: &str) -> LoadOutcome {
        let entry = self.entry(name)?;

        let pending = {
            let mut state = entry.lock();
            if let Some(instance) = &state.runtime.instance {
                return Ok(instance.clone());
            }

            let joined = state.in_flight.clone();
            match joined {
                Some(in_flight) => in_flight,
                None => {
                    // Runs on its own task so the load finishes even if every caller gives up.
                    let task = tokio::spawn(run_initializer(entry.clone()));
                    let name = entry.descriptor.name.clone();
                    let load = async move {
                        task.await.unwrap_or_else(|e| {
                            Err(OrchestratorError::ProviderLoad {
                                name,
                                reason: format!("load task aborted: {}", e),
                            })
                        })
                    }
                    .boxed()
                    .shared();
                    state.runtime.status = ProviderStatus::Loading;
                    state.runtime.load_attempts += 1;
                    state.in_flight = Some(load.clone());
                    load
                }
            }
        };

        pending.await
    }

    pub async fn load_category(&self, category: Category) -> Vec<CategoryLoadResult> {
        let descriptors = self.descriptors_in(category);
        let mut results = Vec::with_capacity(descriptors.len());

        for descriptor in descriptors {
            let outcome = self.load_provider(&descriptor.name).await;
            results.push(CategoryLoadResult {
                provider_name: descriptor.name,
                loaded: outcome.is_ok(),
                error: outcome.err().map(|e| e.to_string()),
            });
        }

        let failed = results.iter().filter(|r| !r.loaded).count();
        log::info!(
            "Loaded category {}: {} ok, {} failed",
            category,
            results.len() - failed,
            failed
        );

        results
    }

    pub fn health_check(&self) -> usize {
        let now = Utc::now();
        let mut checked = 0;

        for entry in self.read_entries().values() {
            let mut state = entry.lock();
            if state.runtime.is_loaded() {
                state.runtime.last_health_check_at = Some(now);
                checked += 1;
            }
        }

        checked
    }

    pub fn status(&self) -> RegistrySnapshot {
        let mut categories: BTreeMap<Category, CategoryStats> = BTreeMap::new();
        let mut loaded_names = Vec::new();
        let mut failed_names = Vec::new();
        let mut total = 0;
        let mut loading = 0;

        for (name, entry) in self.read_entries().iter() {
            let status = entry.lock().runtime.status;
            total += 1;
            categories
                .entry(entry.descriptor.category)
                .or_default()
                .record(status);

            match status {
                ProviderStatus::Loaded => loaded_names.push(name.clone()),
                ProviderStatus::Failed => failed_names.push(name.clone()),
                ProviderStatus::Loading => loading += 1,
                ProviderStatus::Registered => {}
            }
        }

        RegistrySnapshot {
            total,
            loading,
            loaded: loaded_names.len(),
            failed: failed_names.len(),
            categories,
            loaded_names,
            failed_names,
            taken_at: Utc::now(),
        }
    }

    pub fn release_all(&self) -> usize {
        let mut released = 0;

        for entry in self.read_entries().values() {
            let mut state = entry.lock();
            if state.runtime.is_loaded() {
                state.runtime.status = ProviderStatus::Registered;
                state.runtime.instance = None;
                released += 1;
            }
        }

        released
    }

    fn entry(&self, name: &str) -> OrchestratorResult<Arc<ProviderEntry>> {
        self.read_entries()
            .get(name)
            .cloned()
            .ok_or_else(|| OrchestratorError::ProviderNotFound(name.to_string()))
    }

    fn read_entries(
        &self,
    ) -> std::sync::RwLockReadGuard<'_, BTreeMap<String, Arc<ProviderEntry>>> {
        self.entries.read().unwrap_or_else(|e| e.into_inner())
    }
}

async fn run_initializer(entry: Arc<ProviderEntry>) -> LoadOutcome {
    let name = entry.descriptor.name.clone();
    let started = Instant::now();
    let outcome = match AssertUnwindSafe(entry.descriptor.initializer.load())
        .catch_unwind()
        .await
    {
        Ok(outcome) => outcome,
        Err(_) => Err(anyhow::anyhow!("initializer panicked")),
    };
    let elapsed_ms = duration_ms(started.elapsed());

    let mut state = entry.lock();
    state.in_flight = None;

    match outcome {
        Ok(instance) => {
            state.runtime.status = ProviderStatus::Loaded;
            state.runtime.instance = Some(instance.clone());
            state.runtime.load_duration_ms = Some(elapsed_ms);
            state.runtime.last_error = None;
            log::debug!("Loaded provider {} in {}ms", name, elapsed_ms);
            Ok(instance)
        }
        Err(e) => {
            let reason = e.to_string();
            state.runtime.status = ProviderStatus::Failed;
            state.runtime.instance = None;
            state.runtime.last_error = Some(reason.clone());
            log::warn!("Failed to load provider {}: {}", name, reason);
            Err(OrchestratorError::ProviderLoad { name, reason })
        }
    }
}

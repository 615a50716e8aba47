pub mod history;
pub mod stages;

pub use history::{BoundedLog, HistoryEntry, SessionHistory};
pub use stages::{RequestPipeline, RequestStage};

use std::collections::HashSet;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;
use uuid::Uuid;

use crate::catalog::{builtin_catalog, Catalog, CatalogManifest, Category};
use crate::config::Config;
use crate::engine::fallback::{reflective_response, FALLBACK_CONFIDENCE, FALLBACK_REASONING};
use crate::engine::{Classifier, Dispatcher, Selector, Synthesizer};
use crate::error::OrchestratorResult;
use crate::registry::{HealthMonitor, Registry, RegistrySnapshot};
use crate::types::{
    duration_ms, ProviderInvocationResult, Request, RequestContext, ResponseMetadata,
    SynthesizedResponse,
};

const SHUTDOWN_GRACE: Duration = Duration::from_secs(2);

#[derive(Default)]
struct Lifecycle {
    catalog_registered: bool,
    initialized: bool,
    monitor: Option<HealthMonitor>,
}

pub struct Orchestrator {
    config: Config,
    catalog: Catalog,
    registry: Registry,
    classifier: Classifier,
    selector: Selector,
    dispatcher: Dispatcher,
    synthesizer: Synthesizer,
    history: SessionHistory,
    lifecycle: Mutex<Lifecycle>,
}

impl Orchestrator {
    pub fn new(config: Config) -> anyhow::Result<Self> {
        let mut catalog = builtin_catalog();
        if let Some(path) = &config.manifest_path {
            let manifest = CatalogManifest::from_file(path)?;
            catalog.extend(manifest.into_catalog());
        }

        let known = builtin_catalog().names().into_iter().collect();
        let selector = Selector::new(config.complexity_threshold).with_catalog(&catalog);
        Ok(Self::with_parts(config, catalog, selector, known)?)
    }

    pub fn with_catalog(config: Config, catalog: Catalog) -> OrchestratorResult<Self> {
        let known = catalog.names().into_iter().collect();
        let selector = Selector::new(config.complexity_threshold).with_catalog(&catalog);
        Self::with_parts(config, catalog, selector, known)
    }

    pub fn with_parts(
        config: Config,
        catalog: Catalog,
        selector: Selector,
        known: HashSet<String>,
    ) -> OrchestratorResult<Self> {
        config.validate()?;

        let registry = Registry::new();
        let dispatcher = Dispatcher::new(registry.clone(), config.invocation_timeout());
        let synthesizer = Synthesizer::new(config.weights, known, config.max_alternates);
        let history = SessionHistory::new(config.history_cap);

        Ok(Self {
            classifier: Classifier::new()?,
            config,
            catalog,
            registry,
            selector,
            dispatcher,
            synthesizer,
            history,
            lifecycle: Mutex::new(Lifecycle::default()),
        })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    pub async fn initialize(&self) -> OrchestratorResult<()> {
        let mut lifecycle = self.lifecycle.lock().await;
        if lifecycle.initialized {
            log::debug!("Orchestrator already initialized");
            return Ok(());
        }

        if !lifecycle.catalog_registered {
            let registered = self.registry.register_catalog(self.catalog.clone())?;
            lifecycle.catalog_registered = true;
            log::info!("Registered {} providers", registered);
        }

        for category in eager_load_order(&self.config.eager_categories) {
            self.registry.load_category(category).await;
        }

        lifecycle.monitor = Some(HealthMonitor::start(
            self.registry.clone(),
            self.config.health_check_interval(),
        ));
        lifecycle.initialized = true;

        let snapshot = self.registry.status();
        log::info!(
            "Orchestrator initialized: {} providers, {} loaded, {} failed",
            snapshot.total,
            snapshot.loaded,
            snapshot.failed
        );
        Ok(())
    }

    pub async fn is_initialized(&self) -> bool {
        self.lifecycle.lock().await.initialized
    }

    /// Always produces a response; provider failures only lower its quality.
    pub async fn handle_request(&self, session_key: &str, request: Request) -> SynthesizedResponse {
        let started = Instant::now();
        let request_id = Uuid::new_v4();
        let mut pipeline = RequestPipeline::new();

        let context = match self.classifier.classify(&request) {
            Ok(context) => context,
            Err(e) => {
                log::error!("Request {} classification failed: {}", request_id, e);
                RequestContext::general(request)
            }
        };
        advance(&mut pipeline, request_id, RequestStage::Classified);

        let provider_names = self.selector.select(&context);
        advance(&mut pipeline, request_id, RequestStage::ProvidersSelected);

        let results = self.dispatcher.dispatch(&context, &provider_names).await;
        advance(&mut pipeline, request_id, RequestStage::Dispatched);

        let synthesized = self.synthesizer.synthesize(&results, &context);
        advance(&mut pipeline, request_id, RequestStage::Synthesized);

        let mut response = match synthesized {
            Ok(response) => {
                advance(&mut pipeline, request_id, RequestStage::Returned);
                response
            }
            Err(e) => {
                log::warn!("Request {} falling back: {}", request_id, e);
                advance(&mut pipeline, request_id, RequestStage::FallbackReturned);
                fallback_response(&context, &results)
            }
        };

        response.metadata.request_id = request_id;
        response.metadata.processing_time_ms = duration_ms(started.elapsed());

        self.history
            .append(session_key, HistoryEntry::new(&context, &response));

        response
    }

    pub fn status(&self) -> RegistrySnapshot {
        self.registry.status()
    }

    pub fn history(&self, session_key: &str) -> Vec<HistoryEntry> {
        self.history.entries(session_key)
    }

    pub async fn shutdown(&self) {
        let mut lifecycle = self.lifecycle.lock().await;
        if let Some(monitor) = lifecycle.monitor.take() {
            monitor.stop(SHUTDOWN_GRACE).await;
        }
        let released = self.registry.release_all();
        lifecycle.initialized = false;
        log::info!("Orchestrator shut down, released {} providers", released);
    }
}

fn eager_load_order(categories: &[Category]) -> Vec<Category> {
    let mut ordered = categories.to_vec();
    ordered.sort_by_key(|c| (c.load_priority(), *c));
    ordered.dedup();
    ordered
}

fn advance(pipeline: &mut RequestPipeline, request_id: Uuid, next: RequestStage) {
    match pipeline.advance(next) {
        Ok(stage) => log::debug!("Request {} -> {:?}", request_id, stage),
        Err(e) => log::error!("Request {}: {}", request_id, e),
    }
}

fn fallback_response(
    context: &RequestContext,
    results: &[ProviderInvocationResult],
) -> SynthesizedResponse {
    SynthesizedResponse {
        content: reflective_response(context),
        confidence: FALLBACK_CONFIDENCE,
        contributing_providers: Vec::new(),
        reasoning_trail: vec![FALLBACK_REASONING.to_string()],
        metadata: ResponseMetadata {
            request_id: Uuid::nil(),
            request_type: context.request_type,
            processing_time_ms: 0,
            providers_used: results.len(),
            providers_succeeded: 0,
            fallback: true,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::ProviderDescriptor;
    use crate::error::OrchestratorError;
    use crate::providers::{
        CapabilityProvider, FnInitializer, FnProvider, TemplateInitializer, TemplateSpec,
    };
    use crate::types::{ProviderOutput, RequestType};
    use std::sync::{Arc, Mutex as StdMutex};

    fn template(name: &str, category: Category, text: &str) -> ProviderDescriptor {
        ProviderDescriptor::new(
            name,
            category,
            0,
            Arc::new(TemplateInitializer::new(name, TemplateSpec::new(text, 0.8))),
        )
    }

    fn small_catalog() -> Catalog {
        let mut catalog = Catalog::new();
        catalog.push(template("reasoning-core", Category::Core, "Core view on {text}."));
        catalog.push(template("context-memory", Category::Core, "Memory view."));
        catalog
    }

    #[tokio::test]
    async fn test_initialize_is_idempotent() {
        let orchestrator = Orchestrator::with_catalog(Config::default(), small_catalog()).unwrap();
        orchestrator.initialize().await.unwrap();
        orchestrator.initialize().await.unwrap();

        let status = orchestrator.status();
        assert_eq!(status.total, 2);
        assert_eq!(status.loaded, 2);
        assert!(orchestrator.is_initialized().await);
        orchestrator.shutdown().await;
    }

    #[tokio::test]
    async fn test_duplicate_catalog_fails_initialize() {
        let mut catalog = small_catalog();
        catalog.push(template("reasoning-core", Category::Creative, "Again."));
        let orchestrator = Orchestrator::with_catalog(Config::default(), catalog).unwrap();

        let err = orchestrator.initialize().await.unwrap_err();
        assert_eq!(
            err,
            OrchestratorError::DuplicateProvider("reasoning-core".to_string())
        );
        assert!(!orchestrator.is_initialized().await);
    }

    #[tokio::test]
    async fn test_empty_text_falls_back_to_general() {
        let orchestrator = Orchestrator::with_catalog(Config::default(), small_catalog()).unwrap();
        orchestrator.initialize().await.unwrap();

        let response = orchestrator.handle_request("s", Request::new("   ")).await;
        assert_eq!(response.metadata.request_type, RequestType::General);
        assert!(!response.metadata.request_id.is_nil());
        orchestrator.shutdown().await;
    }

    #[tokio::test]
    async fn test_uninitialized_request_uses_fallback() {
        let orchestrator = Orchestrator::with_catalog(Config::default(), small_catalog()).unwrap();

        let response = orchestrator
            .handle_request("s", Request::new("What is a good plan?"))
            .await;
        assert!(response.is_fallback());
        assert_eq!(response.confidence, FALLBACK_CONFIDENCE);
        assert_eq!(response.reasoning_trail, vec![FALLBACK_REASONING.to_string()]);
        assert_eq!(response.metadata.providers_succeeded, 0);
        assert_eq!(orchestrator.history("s").len(), 1);
    }

    #[tokio::test]
    async fn test_shutdown_releases_and_allows_reinitialize() {
        let orchestrator = Orchestrator::with_catalog(Config::default(), small_catalog()).unwrap();
        orchestrator.initialize().await.unwrap();
        orchestrator.shutdown().await;

        assert_eq!(orchestrator.status().loaded, 0);
        assert!(!orchestrator.is_initialized().await);

        orchestrator.initialize().await.unwrap();
        assert_eq!(orchestrator.status().loaded, 2);
        orchestrator.shutdown().await;
    }

    fn recording(
        name: &'static str,
        category: Category,
        order: Arc<StdMutex<Vec<String>>>,
    ) -> ProviderDescriptor {
        ProviderDescriptor::new(
            name,
            category,
            0,
            Arc::new(FnInitializer::new(move || {
                order.lock().unwrap().push(name.to_string());
                let provider: Arc<dyn CapabilityProvider> = Arc::new(FnProvider::new(name, |_, _| {
                    Ok(ProviderOutput::new("ok", 0.5))
                }));
                Ok(provider)
            })),
        )
    }

    #[tokio::test]
    async fn test_eager_categories_load_in_priority_order() {
        let order = Arc::new(StdMutex::new(Vec::new()));
        let mut catalog = Catalog::new();
        catalog.push(recording("adv", Category::Advanced, order.clone()));
        catalog.push(recording("core", Category::Core, order.clone()));
        catalog.push(recording("muse", Category::Creative, order.clone()));

        let config = Config {
            eager_categories: vec![
                Category::Advanced,
                Category::Creative,
                Category::Core,
                Category::Advanced,
            ],
            ..Config::default()
        };
        let orchestrator = Orchestrator::with_catalog(config, catalog).unwrap();
        orchestrator.initialize().await.unwrap();

        assert_eq!(*order.lock().unwrap(), vec!["core", "muse", "adv"]);
        orchestrator.shutdown().await;
    }

    #[test]
    fn test_eager_load_order_dedups() {
        assert_eq!(
            eager_load_order(&[Category::Technical, Category::Core, Category::Technical]),
            vec![Category::Core, Category::Technical]
        );
    }

    #[test]
    fn test_invalid_config_rejected() {
        let config = Config {
            history_cap: 0,
            ..Config::default()
        };
        assert!(matches!(
            Orchestrator::with_catalog(config, small_catalog()),
            Err(OrchestratorError::Config(_))
        ));
    }
}

use futures::future::join_all;
use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::error::OrchestratorError;
use crate::registry::Registry;
use crate::types::{duration_ms, ProviderInvocationResult, ProviderName, RequestContext};

#[derive(Clone)]
pub struct Dispatcher {
    registry: Registry,
    timeout: Duration,
}

impl Dispatcher {
    pub fn new(registry: Registry, timeout: Duration) -> Self {
        Self { registry, timeout }
    }

    /// Results come back in the order of `provider_names`. A provider that
    /// fails to load, errors, panics or exceeds the timeout yields a failed
    /// result; it never affects its siblings.
    pub async fn dispatch(
        &self,
        context: &RequestContext,
        provider_names: &[ProviderName],
    ) -> Vec<ProviderInvocationResult> {
        let context = Arc::new(context.clone());

        let handles: Vec<_> = provider_names
            .iter()
            .map(|name| {
                let registry = self.registry.clone();
                let context = context.clone();
                let name = name.clone();
                let timeout = self.timeout;
                tokio::spawn(async move { invoke_one(registry, name, context, timeout).await })
            })
            .collect();

        join_all(handles)
            .await
            .into_iter()
            .zip(provider_names)
            .map(|(joined, name)| {
                joined.unwrap_or_else(|e| {
                    log::warn!("Provider {} task aborted: {}", name, e);
                    ProviderInvocationResult::failure(
                        name.clone(),
                        OrchestratorError::ProviderInvocation {
                            name: name.clone(),
                            reason: format!("task aborted: {}", e),
                        },
                        0,
                    )
                })
            })
            .collect()
    }
}

async fn invoke_one(
    registry: Registry,
    name: ProviderName,
    context: Arc<RequestContext>,
    timeout: Duration,
) -> ProviderInvocationResult {
    let started = Instant::now();

    let call = async {
        let provider = registry.load_provider(&name).await?;
        let output = provider
            .invoke(&context.request, &context)
            .await
            .map_err(|e| OrchestratorError::ProviderInvocation {
                name: name.clone(),
                reason: e.to_string(),
            })?;
        Ok::<_, OrchestratorError>(output)
    };

    let outcome = match tokio::time::timeout(timeout, call).await {
        Ok(outcome) => outcome,
        Err(_) => Err(OrchestratorError::Timeout {
            name: name.clone(),
            timeout_ms: duration_ms(timeout),
        }),
    };
    let latency_ms = duration_ms(started.elapsed());

    match outcome {
        Ok(output) => ProviderInvocationResult::success(name, output, latency_ms),
        Err(e) => {
            log::warn!("Provider {} failed after {}ms: {}", name, latency_ms, e);
            ProviderInvocationResult::failure(name, e, latency_ms)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{Category, ProviderDescriptor};
    use crate::providers::{CapabilityProvider, FnInitializer, FnProvider, Preloaded};
    use crate::types::{ProviderOutput, Request};
    use anyhow::Result;
    use async_trait::async_trait;

    struct SlowProvider;

    #[async_trait]
    impl CapabilityProvider for SlowProvider {
        fn name(&self) -> &str {
            "slow"
        }

        async fn invoke(&self, _request: &Request, _context: &RequestContext) -> Result<ProviderOutput> {
            tokio::time::sleep(Duration::from_secs(30)).await;
            Ok(ProviderOutput::new("too late", 1.0))
        }
    }

    fn register(registry: &Registry, provider: Arc<dyn CapabilityProvider>) {
        let name = provider.name().to_string();
        registry
            .register(ProviderDescriptor::new(name, Category::Core, 0, Arc::new(Preloaded(provider))))
            .unwrap();
    }

    fn echo(name: &'static str) -> Arc<dyn CapabilityProvider> {
        Arc::new(FnProvider::new(name, move |request, _| {
            Ok(ProviderOutput::new(format!("{}: {}", name, request.text), 0.5))
        }))
    }

    fn context() -> RequestContext {
        RequestContext::general(Request::new("ping"))
    }

    #[tokio::test]
    async fn test_results_follow_issuance_order() {
        let registry = Registry::new();
        register(&registry, echo("b"));
        register(&registry, echo("a"));

        let dispatcher = Dispatcher::new(registry, Duration::from_secs(1));
        let names = vec!["b".to_string(), "a".to_string()];
        let results = dispatcher.dispatch(&context(), &names).await;

        assert_eq!(results.len(), 2);
        assert_eq!(results[0].provider_name, "b");
        assert_eq!(results[1].provider_name, "a");
        assert!(results.iter().all(|r| r.succeeded));
        assert_eq!(results[1].payload.as_ref().unwrap().content, "a: ping");
    }

    #[tokio::test]
    async fn test_partial_failures_are_isolated() {
        let registry = Registry::new();
        register(&registry, echo("healthy"));
        register(
            &registry,
            Arc::new(FnProvider::new("erroring", |_, _| Err(anyhow::anyhow!("boom")))),
        );
        registry
            .register(ProviderDescriptor::new(
                "unloadable",
                Category::Creative,
                0,
                Arc::new(FnInitializer::new(|| Err(anyhow::anyhow!("no weights")))),
            ))
            .unwrap();

        let dispatcher = Dispatcher::new(registry.clone(), Duration::from_secs(1));
        let names: Vec<String> = ["healthy", "erroring", "unloadable", "missing"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        let results = dispatcher.dispatch(&context(), &names).await;

        assert_eq!(results.len(), 4);
        assert!(results[0].succeeded);
        assert!(!results[1].succeeded);
        assert!(results[1].error.as_ref().unwrap().contains("boom"));
        assert!(!results[2].succeeded);
        assert!(results[2].error.as_ref().unwrap().contains("no weights"));
        assert!(results[3].error.as_ref().unwrap().contains("Unknown provider"));
        assert!(results.iter().skip(1).all(|r| r.payload.is_none()));
    }

    #[tokio::test]
    async fn test_timeout_fails_only_the_slow_provider() {
        let registry = Registry::new();
        register(&registry, echo("fast"));
        register(&registry, Arc::new(SlowProvider));

        let dispatcher = Dispatcher::new(registry, Duration::from_millis(50));
        let names = vec!["slow".to_string(), "fast".to_string()];

        let started = Instant::now();
        let results = dispatcher.dispatch(&context(), &names).await;
        assert!(started.elapsed() < Duration::from_secs(5));

        assert!(!results[0].succeeded);
        assert!(results[0].error.as_ref().unwrap().contains("timed out"));
        assert!(results[1].succeeded);
    }

    #[tokio::test]
    async fn test_dispatch_loads_lazily() {
        let registry = Registry::new();
        register(&registry, echo("lazy"));
        assert_eq!(
            registry.status_of("lazy"),
            Some(crate::types::ProviderStatus::Registered)
        );

        let dispatcher = Dispatcher::new(registry.clone(), Duration::from_secs(1));
        dispatcher.dispatch(&context(), &["lazy".to_string()]).await;

        assert_eq!(
            registry.status_of("lazy"),
            Some(crate::types::ProviderStatus::Loaded)
        );
    }
}

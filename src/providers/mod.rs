pub mod adapter;
pub mod template;

pub use adapter::{FnInitializer, FnProvider, Preloaded};
pub use template::{TemplateInitializer, TemplateProvider, TemplateSpec};

use anyhow::Result;
use async_trait::async_trait;
use std::sync::Arc;

use crate::types::{ProviderOutput, Request, RequestContext};

/// A loaded capability provider. Must tolerate concurrent invocations from
/// unrelated requests.
#[async_trait]
pub trait CapabilityProvider: Send + Sync {
    fn name(&self) -> &str;

    async fn invoke(&self, request: &Request, context: &RequestContext) -> Result<ProviderOutput>;
}

/// Factory that produces a provider instance. The registry calls `load` at most
/// once per successful load and caches the instance.
#[async_trait]
pub trait ProviderInitializer: Send + Sync {
    async fn load(&self) -> Result<Arc<dyn CapabilityProvider>>;
}

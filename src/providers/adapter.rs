use anyhow::Result;
use async_trait::async_trait;
use std::sync::Arc;

use super::{CapabilityProvider, ProviderInitializer};
use crate::types::{ProviderOutput, Request, RequestContext};

type InvokeFn = dyn Fn(&Request, &RequestContext) -> Result<ProviderOutput> + Send + Sync;
type LoadFn = dyn Fn() -> Result<Arc<dyn CapabilityProvider>> + Send + Sync;

pub struct FnProvider {
    name: String,
    invoke_fn: Box<InvokeFn>,
}

impl FnProvider {
    pub fn new<F>(name: impl Into<String>, invoke_fn: F) -> Self
    where
        F: Fn(&Request, &RequestContext) -> Result<ProviderOutput> + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            invoke_fn: Box::new(invoke_fn),
        }
    }
}

#[async_trait]
impl CapabilityProvider for FnProvider {
    fn name(&self) -> &str {
        &self.name
    }

    async fn invoke(&self, request: &Request, context: &RequestContext) -> Result<ProviderOutput> {
        (self.invoke_fn)(request, context)
    }
}

pub struct FnInitializer {
    load_fn: Box<LoadFn>,
}

impl FnInitializer {
    pub fn new<F>(load_fn: F) -> Self
    where
        F: Fn() -> Result<Arc<dyn CapabilityProvider>> + Send + Sync + 'static,
    {
        Self {
            load_fn: Box::new(load_fn),
        }
    }
}

#[async_trait]
impl ProviderInitializer for FnInitializer {
    async fn load(&self) -> Result<Arc<dyn CapabilityProvider>> {
        (self.load_fn)()
    }
}

pub struct Preloaded(pub Arc<dyn CapabilityProvider>);

#[async_trait]
impl ProviderInitializer for Preloaded {
    async fn load(&self) -> Result<Arc<dyn CapabilityProvider>> {
        Ok(self.0.clone())
    }
}

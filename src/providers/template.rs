use anyhow::{anyhow, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::sync::Arc;

use super::{CapabilityProvider, ProviderInitializer};
use crate::types::{ProviderOutput, Request, RequestContext};

fn default_confidence() -> f64 {
    0.7
}

fn default_enabled() -> bool {
    true
}

/// Placeholders: `{text}`, `{type}`, `{tone}`, `{urgency}`, `{tags}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TemplateSpec {
    pub content_template: String,
    #[serde(default = "default_confidence")]
    pub confidence: f64,
    #[serde(default)]
    pub reasoning: Vec<String>,
    #[serde(default = "default_enabled")]
    pub enabled: bool,
}

impl TemplateSpec {
    pub fn new(content_template: impl Into<String>, confidence: f64) -> Self {
        Self {
            content_template: content_template.into(),
            confidence,
            reasoning: Vec::new(),
            enabled: true,
        }
    }

    pub fn with_reasoning(mut self, reasoning: impl Into<String>) -> Self {
        self.reasoning.push(reasoning.into());
        self
    }
}

pub struct TemplateProvider {
    name: String,
    spec: TemplateSpec,
}

impl TemplateProvider {
    pub fn new(name: impl Into<String>, spec: TemplateSpec) -> Self {
        Self {
            name: name.into(),
            spec,
        }
    }

    fn render(&self, template: &str, context: &RequestContext) -> String {
        template
            .replace("{text}", context.request.text.trim())
            .replace("{type}", context.request_type.as_str())
            .replace("{tone}", context.emotional_tone.as_str())
            .replace("{urgency}", context.urgency.as_str())
            .replace("{tags}", &context.required_capabilities.join(", "))
    }
}

#[async_trait]
impl CapabilityProvider for TemplateProvider {
    fn name(&self) -> &str {
        &self.name
    }

    async fn invoke(&self, _request: &Request, context: &RequestContext) -> Result<ProviderOutput> {
        let content = self.render(&self.spec.content_template, context);
        let reasoning = self
            .spec
            .reasoning
            .iter()
            .map(|r| self.render(r, context))
            .collect();

        Ok(ProviderOutput {
            content,
            confidence: self.spec.confidence,
            reasoning,
            metadata: json!({
                "provider": self.name,
                "complexity": context.complexity,
            }),
        })
    }
}

pub struct TemplateInitializer {
    name: String,
    spec: TemplateSpec,
}

impl TemplateInitializer {
    pub fn new(name: impl Into<String>, spec: TemplateSpec) -> Self {
        Self {
            name: name.into(),
            spec,
        }
    }
}

#[async_trait]
impl ProviderInitializer for TemplateInitializer {
    async fn load(&self) -> Result<Arc<dyn CapabilityProvider>> {
        if !self.spec.enabled {
            return Err(anyhow!("provider {} is disabled", self.name));
        }
        if self.spec.content_template.trim().is_empty() {
            return Err(anyhow!("provider {} has an empty content template", self.name));
        }

        Ok(Arc::new(TemplateProvider::new(
            self.name.clone(),
            self.spec.clone(),
        )))
    }
}

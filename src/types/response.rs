use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use super::{ProviderName, RequestType};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProviderOutput {
    pub content: String,
    pub confidence: f64,
    #[serde(default)]
    pub reasoning: Vec<String>,
    #[serde(default)]
    pub metadata: Value,
}

impl ProviderOutput {
    pub fn new(content: impl Into<String>, confidence: f64) -> Self {
        Self {
            content: content.into(),
            confidence,
            reasoning: Vec::new(),
            metadata: Value::Null,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderInvocationResult {
    pub provider_name: ProviderName,
    pub succeeded: bool,
    pub payload: Option<ProviderOutput>,
    pub error: Option<String>,
    pub latency_ms: u64,
}

impl ProviderInvocationResult {
    pub fn success(provider_name: impl Into<String>, payload: ProviderOutput, latency_ms: u64) -> Self {
        Self {
            provider_name: provider_name.into(),
            succeeded: true,
            payload: Some(payload),
            error: None,
            latency_ms,
        }
    }

    pub fn failure(provider_name: impl Into<String>, error: impl ToString, latency_ms: u64) -> Self {
        Self {
            provider_name: provider_name.into(),
            succeeded: false,
            payload: None,
            error: Some(error.to_string()),
            latency_ms,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResponseMetadata {
    pub request_id: Uuid,
    pub request_type: RequestType,
    pub processing_time_ms: u64,
    pub providers_used: usize,
    pub providers_succeeded: usize,
    pub fallback: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SynthesizedResponse {
    pub content: String,
    pub confidence: f64,
    pub contributing_providers: Vec<ProviderName>,
    pub reasoning_trail: Vec<String>,
    pub metadata: ResponseMetadata,
}

impl SynthesizedResponse {
    pub fn is_fallback(&self) -> bool {
        self.metadata.fallback
    }
}

pub mod request;
pub mod response;

pub use request::{Request, RequestContext};
pub use response::{
    ProviderInvocationResult, ProviderOutput, ResponseMetadata, SynthesizedResponse,
};

use serde::{Deserialize, Serialize};
use std::time::Duration;

pub type ProviderName = String;
pub type SessionKey = String;

pub(crate) fn duration_ms(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RequestType {
    Creative,
    Strategic,
    Emotional,
    Analytical,
    Technical,
    Philosophical,
    General,
}

impl RequestType {
    pub const ALL: [RequestType; 7] = [
        RequestType::Creative,
        RequestType::Strategic,
        RequestType::Emotional,
        RequestType::Analytical,
        RequestType::Technical,
        RequestType::Philosophical,
        RequestType::General,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            RequestType::Creative => "creative",
            RequestType::Strategic => "strategic",
            RequestType::Emotional => "emotional",
            RequestType::Analytical => "analytical",
            RequestType::Technical => "technical",
            RequestType::Philosophical => "philosophical",
            RequestType::General => "general",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        let needle = s.trim().to_lowercase();
        Self::ALL.into_iter().find(|t| t.as_str() == needle)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Urgency {
    Low,
    Medium,
    High,
}

impl Urgency {
    pub fn as_str(&self) -> &'static str {
        match self {
            Urgency::Low => "low",
            Urgency::Medium => "medium",
            Urgency::High => "high",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EmotionalTone {
    Neutral,
    Positive,
    Distressed,
    Frustrated,
    Curious,
}

impl EmotionalTone {
    pub fn as_str(&self) -> &'static str {
        match self {
            EmotionalTone::Neutral => "neutral",
            EmotionalTone::Positive => "positive",
            EmotionalTone::Distressed => "distressed",
            EmotionalTone::Frustrated => "frustrated",
            EmotionalTone::Curious => "curious",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ProviderStatus {
    Registered, // Declared, never loaded (or released)
    Loading,    // Initializer in flight
    Loaded,     // Instance cached
    Failed,     // Last load attempt errored, may be retried
}

impl ProviderStatus {
    pub fn as_str(&self) -> &str {
        match self {
            ProviderStatus::Registered => "Registered",
            ProviderStatus::Loading => "Loading",
            ProviderStatus::Loaded => "Loaded",
            ProviderStatus::Failed => "Failed",
        }
    }
}

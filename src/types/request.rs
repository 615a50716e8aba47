use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::{EmotionalTone, RequestType, Urgency};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Request {
    pub text: String,
    #[serde(default)]
    pub type_hint: Option<String>,
    /// Caller-supplied depth signal in [0, 1]; high values pull in the advanced tier.
    #[serde(default)]
    pub depth: Option<f64>,
    #[serde(default)]
    pub metadata: Value,
}

impl Request {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            type_hint: None,
            depth: None,
            metadata: Value::Null,
        }
    }

    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.type_hint = Some(hint.into());
        self
    }

    pub fn with_depth(mut self, depth: f64) -> Self {
        self.depth = Some(depth);
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RequestContext {
    pub request: Request,
    pub request_type: RequestType,
    pub complexity: f64,
    pub urgency: Urgency,
    pub emotional_tone: EmotionalTone,
    pub required_capabilities: Vec<String>,
}

impl RequestContext {
    pub fn general(request: Request) -> Self {
        Self {
            request,
            request_type: RequestType::General,
            complexity: 0.0,
            urgency: Urgency::Low,
            emotional_tone: EmotionalTone::Neutral,
            required_capabilities: Vec::new(),
        }
    }

    pub fn depth(&self) -> f64 {
        self.request.depth.unwrap_or(0.0)
    }
}

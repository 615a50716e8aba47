use anyhow::{anyhow, Result};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RequestStage {
    Received,
    Classified,
    ProvidersSelected,
    Dispatched,
    Synthesized,
    Returned,         // Terminal
    FallbackReturned, // Terminal
}

impl RequestStage {
    pub fn is_terminal(&self) -> bool {
        matches!(self, RequestStage::Returned | RequestStage::FallbackReturned)
    }
}

#[derive(Debug, Clone)]
pub struct RequestPipeline {
    stage: RequestStage,
}

impl RequestPipeline {
    pub fn new() -> Self {
        Self {
            stage: RequestStage::Received,
        }
    }

    pub fn stage(&self) -> RequestStage {
        self.stage
    }

    pub fn advance(&mut self, next: RequestStage) -> Result<RequestStage> {
        let allowed = matches!(
            (self.stage, next),
            (RequestStage::Received, RequestStage::Classified)
                | (RequestStage::Classified, RequestStage::ProvidersSelected)
                | (RequestStage::ProvidersSelected, RequestStage::Dispatched)
                | (RequestStage::Dispatched, RequestStage::Synthesized)
                | (RequestStage::Synthesized, RequestStage::Returned)
                | (RequestStage::Synthesized, RequestStage::FallbackReturned)
        );

        if !allowed {
            return Err(anyhow!(
                "Invalid request stage transition from {:?} to {:?}",
                self.stage,
                next
            ));
        }

        self.stage = next;
        Ok(next)
    }
}

impl Default for RequestPipeline {
    fn default() -> Self {
        Self::new()
    }
}

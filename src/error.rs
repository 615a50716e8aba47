use thiserror::Error;

/// A shared in-flight load hands the same error to every caller waiting on it.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum OrchestratorError {
    #[error("Provider already registered: {0}")]
    DuplicateProvider(String),
    #[error("Unknown provider: {0}")]
    ProviderNotFound(String),
    #[error("Failed to load provider {name}: {reason}")]
    ProviderLoad { name: String, reason: String },
    #[error("Provider {name} failed: {reason}")]
    ProviderInvocation { name: String, reason: String },
    #[error("Provider {name} timed out after {timeout_ms}ms")]
    Timeout { name: String, timeout_ms: u64 },
    #[error("No provider succeeded ({attempted} attempted)")]
    NoProviderSucceeded { attempted: usize },
    #[error("Classification failed: {0}")]
    Classification(String),
    #[error("Invalid configuration: {0}")]
    Config(String),
}

pub type OrchestratorResult<T> = std::result::Result<T, OrchestratorError>;

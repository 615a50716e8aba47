pub mod types;
pub mod error;
pub mod providers;
pub mod catalog;
pub mod registry;
pub mod engine;
pub mod orchestrator;
pub mod config;

pub use config::Config;
pub use error::{OrchestratorError, OrchestratorResult};
pub use orchestrator::Orchestrator;
pub use registry::Registry;
pub use types::*;

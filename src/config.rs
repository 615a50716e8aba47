use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::catalog::Category;
use crate::error::OrchestratorError;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SynthesisWeights {
    pub length: f64,
    pub confidence: f64,
    pub known: f64,
}

impl Default for SynthesisWeights {
    fn default() -> Self {
        Self {
            length: 0.3,
            confidence: 0.4,
            known: 0.3,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub invocation_timeout_ms: u64,
    pub history_cap: usize,
    pub health_check_interval_secs: u64,
    pub complexity_threshold: f64,
    pub max_alternates: usize,
    pub eager_categories: Vec<Category>,
    pub weights: SynthesisWeights,
    pub manifest_path: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            invocation_timeout_ms: 5_000,
            history_cap: 500,
            health_check_interval_secs: 300,
            complexity_threshold: 0.7,
            max_alternates: 2,
            eager_categories: vec![Category::Core],
            weights: SynthesisWeights::default(),
            manifest_path: None,
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        let mut config = Self::default();
        config.apply_env();
        config
    }

    pub fn from_toml_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file {}", path.display()))?;
        Ok(config)
    }

    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut config = match path {
            Some(path) => Self::from_toml_file(path)?,
            None => Self::default(),
        };
        config.apply_env();
        config.validate()?;
        Ok(config)
    }

    fn apply_env(&mut self) {
        if let Some(v) = env_parse("CHORUS_INVOCATION_TIMEOUT_MS") {
            self.invocation_timeout_ms = v;
        }
        if let Some(v) = env_parse("CHORUS_HISTORY_CAP") {
            self.history_cap = v;
        }
        if let Some(v) = env_parse("CHORUS_HEALTH_CHECK_INTERVAL_SECS") {
            self.health_check_interval_secs = v;
        }
        if let Some(v) = env_parse("CHORUS_COMPLEXITY_THRESHOLD") {
            self.complexity_threshold = v;
        }
        if let Ok(path) = std::env::var("CHORUS_MANIFEST") {
            self.manifest_path = Some(PathBuf::from(path));
        }
    }

    pub fn validate(&self) -> Result<(), OrchestratorError> {
        if self.invocation_timeout_ms == 0 {
            return Err(OrchestratorError::Config(
                "invocation_timeout_ms must be positive".to_string(),
            ));
        }
        if self.history_cap == 0 {
            return Err(OrchestratorError::Config(
                "history_cap must be positive".to_string(),
            ));
        }
        if self.health_check_interval_secs == 0 {
            return Err(OrchestratorError::Config(
                "health_check_interval_secs must be positive".to_string(),
            ));
        }
        let w = self.weights;
        if w.length < 0.0 || w.confidence < 0.0 || w.known < 0.0 {
            return Err(OrchestratorError::Config(
                "synthesis weights must not be negative".to_string(),
            ));
        }
        Ok(())
    }

    pub fn invocation_timeout(&self) -> Duration {
        Duration::from_millis(self.invocation_timeout_ms)
    }

    pub fn health_check_interval(&self) -> Duration {
        Duration::from_secs(self.health_check_interval_secs)
    }
}

fn env_parse<T: std::str::FromStr>(key: &str) -> Option<T> {
    std::env::var(key).ok().and_then(|v| v.trim().parse().ok())
}

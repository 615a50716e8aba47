use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::Arc;

use super::{Catalog, Category, ProviderDescriptor};
use crate::providers::{TemplateInitializer, TemplateSpec};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CatalogManifest {
    #[serde(default)]
    pub providers: Vec<ManifestEntry>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ManifestEntry {
    pub name: String,
    pub category: Category,
    #[serde(default)]
    pub priority: u32,
    #[serde(flatten)]
    pub template: TemplateSpec,
}

impl CatalogManifest {
    pub fn from_yaml(yaml_content: &str) -> Result<Self> {
        let manifest: CatalogManifest = serde_yaml::from_str(yaml_content)
            .map_err(|e| anyhow!("Failed to parse provider manifest: {}", e))?;

        for entry in &manifest.providers {
            if entry.name.trim().is_empty() {
                return Err(anyhow!("Manifest entry with empty name"));
            }
            if !(0.0..=1.0).contains(&entry.template.confidence) {
                return Err(anyhow!(
                    "Manifest entry {} has confidence {} outside [0, 1]",
                    entry.name,
                    entry.template.confidence
                ));
            }
        }

        Ok(manifest)
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read provider manifest {}", path.display()))?;
        Self::from_yaml(&content)
    }

    pub fn into_catalog(self) -> Catalog {
        let mut catalog = Catalog::new();
        for entry in self.providers {
            let initializer = TemplateInitializer::new(entry.name.clone(), entry.template);
            catalog.push(ProviderDescriptor::new(
                entry.name,
                entry.category,
                entry.priority,
                Arc::new(initializer),
            ));
        }
        catalog
    }
}

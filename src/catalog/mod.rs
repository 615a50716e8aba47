pub mod builtin;
pub mod manifest;

pub use builtin::builtin_catalog;
pub use manifest::{CatalogManifest, ManifestEntry};

use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

use crate::providers::ProviderInitializer;
use crate::types::RequestType;

/// Provider grouping. Categories load in ascending `load_priority`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    Core,
    Creative,
    Strategic,
    Emotional,
    Analytical,
    Technical,
    Philosophical,
    Advanced,
}

impl Category {
    pub const ALL: [Category; 8] = [
        Category::Core,
        Category::Creative,
        Category::Strategic,
        Category::Emotional,
        Category::Analytical,
        Category::Technical,
        Category::Philosophical,
        Category::Advanced,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Core => "core",
            Category::Creative => "creative",
            Category::Strategic => "strategic",
            Category::Emotional => "emotional",
            Category::Analytical => "analytical",
            Category::Technical => "technical",
            Category::Philosophical => "philosophical",
            Category::Advanced => "advanced",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        let needle = s.trim().to_lowercase();
        Self::ALL.into_iter().find(|c| c.as_str() == needle)
    }

    pub fn load_priority(&self) -> u8 {
        match self {
            Category::Core => 0,
            Category::Creative => 1,
            Category::Strategic => 2,
            Category::Emotional => 3,
            Category::Analytical => 4,
            Category::Technical => 5,
            Category::Philosophical => 6,
            Category::Advanced => 9,
        }
    }

    pub fn for_request_type(request_type: RequestType) -> Option<Self> {
        match request_type {
            RequestType::Creative => Some(Category::Creative),
            RequestType::Strategic => Some(Category::Strategic),
            RequestType::Emotional => Some(Category::Emotional),
            RequestType::Analytical => Some(Category::Analytical),
            RequestType::Technical => Some(Category::Technical),
            RequestType::Philosophical => Some(Category::Philosophical),
            RequestType::General => None,
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Clone)]
pub struct ProviderDescriptor {
    pub name: String,
    pub category: Category,
    pub priority: u32,
    pub initializer: Arc<dyn ProviderInitializer>,
}

impl ProviderDescriptor {
    pub fn new(
        name: impl Into<String>,
        category: Category,
        priority: u32,
        initializer: Arc<dyn ProviderInitializer>,
    ) -> Self {
        Self {
            name: name.into(),
            category,
            priority,
            initializer,
        }
    }
}

impl fmt::Debug for ProviderDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProviderDescriptor")
            .field("name", &self.name)
            .field("category", &self.category)
            .field("priority", &self.priority)
            .finish_non_exhaustive()
    }
}

#[derive(Debug, Clone, Default)]
pub struct Catalog {
    descriptors: Vec<ProviderDescriptor>,
}

impl Catalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, descriptor: ProviderDescriptor) {
        self.descriptors.push(descriptor);
    }

    pub fn extend(&mut self, other: Catalog) {
        self.descriptors.extend(other.descriptors);
    }

    pub fn descriptors(&self) -> &[ProviderDescriptor] {
        &self.descriptors
    }

    pub fn names(&self) -> Vec<String> {
        self.descriptors.iter().map(|d| d.name.clone()).collect()
    }

    pub fn len(&self) -> usize {
        self.descriptors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.descriptors.is_empty()
    }

    pub fn in_category(&self, category: Category) -> Vec<&ProviderDescriptor> {
        let mut matching: Vec<_> = self
            .descriptors
            .iter()
            .filter(|d| d.category == category)
            .collect();
        matching.sort_by(|a, b| a.priority.cmp(&b.priority).then_with(|| a.name.cmp(&b.name)));
        matching
    }
}

impl IntoIterator for Catalog {
    type Item = ProviderDescriptor;
    type IntoIter = std::vec::IntoIter<ProviderDescriptor>;

    fn into_iter(self) -> Self::IntoIter {
        self.descriptors.into_iter()
    }
}

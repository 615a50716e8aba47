use std::collections::{HashMap, HashSet};

use crate::catalog::builtin::{ADVANCED_PROVIDERS, CORE_PROVIDERS};
use crate::catalog::{Catalog, Category, ProviderDescriptor};
use crate::types::{ProviderName, RequestContext, RequestType};

/// Order: always-on core, then type-specific, then capability-tag providers,
/// then the advanced tier when complexity or depth crosses the threshold.
/// Duplicates keep their first position.
#[derive(Debug, Clone)]
pub struct Selector {
    core: Vec<ProviderName>,
    by_type: HashMap<RequestType, Vec<ProviderName>>,
    by_tag: HashMap<String, Vec<ProviderName>>,
    advanced: Vec<ProviderName>,
    threshold: f64,
}

fn names(list: &[&str]) -> Vec<ProviderName> {
    list.iter().map(|s| s.to_string()).collect()
}

fn extend_unique(providers: &mut Vec<ProviderName>, descriptors: Vec<&ProviderDescriptor>) {
    for descriptor in descriptors {
        if !providers.contains(&descriptor.name) {
            providers.push(descriptor.name.clone());
        }
    }
}

impl Selector {
    pub fn new(threshold: f64) -> Self {
        let by_type = [
            (RequestType::Creative, names(&["creative-muse", "idea-generator"])),
            (RequestType::Strategic, names(&["strategy-planner", "risk-assessor"])),
            (RequestType::Emotional, names(&["empathy-engine", "wellbeing-guide"])),
            (RequestType::Analytical, names(&["data-analyst", "logic-verifier"])),
            (RequestType::Technical, names(&["code-architect", "debug-assistant"])),
            (RequestType::Philosophical, names(&["philosophy-sage", "ethics-advisor"])),
        ]
        .into_iter()
        .collect();

        let by_tag = [
            ("code", names(&["code-architect"])),
            ("data", names(&["data-analyst"])),
            ("visual", names(&["creative-muse"])),
            ("planning", names(&["strategy-planner"])),
            ("writing", names(&["response-composer"])),
            ("support", names(&["empathy-engine"])),
        ]
        .into_iter()
        .map(|(tag, providers)| (tag.to_string(), providers))
        .collect();

        Self {
            core: names(&CORE_PROVIDERS),
            by_type,
            by_tag,
            advanced: names(&ADVANCED_PROVIDERS),
            threshold,
        }
    }

    pub fn with_catalog(mut self, catalog: &Catalog) -> Self {
        extend_unique(&mut self.core, catalog.in_category(Category::Core));
        extend_unique(&mut self.advanced, catalog.in_category(Category::Advanced));

        for request_type in RequestType::ALL {
            if let Some(category) = Category::for_request_type(request_type) {
                let providers = self.by_type.entry(request_type).or_default();
                extend_unique(providers, catalog.in_category(category));
            }
        }

        self
    }

    pub fn wants_advanced_tier(&self, context: &RequestContext) -> bool {
        context.complexity > self.threshold || context.depth() > self.threshold
    }

    pub fn select(&self, context: &RequestContext) -> Vec<ProviderName> {
        let mut seen = HashSet::new();
        let mut selected = Vec::new();
        let mut push_all = |providers: &[ProviderName]| {
            for name in providers {
                if seen.insert(name.clone()) {
                    selected.push(name.clone());
                }
            }
        };

        push_all(self.core.as_slice());

        if let Some(providers) = self.by_type.get(&context.request_type) {
            push_all(providers.as_slice());
        }

        for tag in &context.required_capabilities {
            if let Some(providers) = self.by_tag.get(tag) {
                push_all(providers.as_slice());
            }
        }

        if self.wants_advanced_tier(context) {
            push_all(self.advanced.as_slice());
        }

        selected
    }
}

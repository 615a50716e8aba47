use std::sync::Arc;

use super::{Catalog, Category, ProviderDescriptor};
use crate::providers::{TemplateInitializer, TemplateSpec};

pub const CORE_PROVIDERS: [&str; 3] = ["reasoning-core", "context-memory", "response-composer"];

pub const ADVANCED_PROVIDERS: [&str; 2] = ["deep-reasoner", "meta-cognition"];

struct Builtin {
    name: &'static str,
    category: Category,
    priority: u32,
    template: &'static str,
    confidence: f64,
    reasoning: &'static str,
}

const BUILTINS: &[Builtin] = &[
    Builtin {
        name: "reasoning-core",
        category: Category::Core,
        priority: 0,
        template: "Working through \"{text}\" step by step. The request reads as {type} with {urgency} urgency, so the answer starts from the essentials and builds outward.",
        confidence: 0.72,
        reasoning: "Decomposed the {type} request into its essentials",
    },
    Builtin {
        name: "context-memory",
        category: Category::Core,
        priority: 1,
        template: "Keeping the broader conversation in view. Earlier threads inform how \"{text}\" should be framed.",
        confidence: 0.6,
        reasoning: "Checked the request against conversational context",
    },
    Builtin {
        name: "response-composer",
        category: Category::Core,
        priority: 2,
        template: "A clear answer to \"{text}\" balances brevity and depth for a {tone} reader.",
        confidence: 0.65,
        reasoning: "Shaped the answer for a {tone} tone",
    },
    Builtin {
        name: "creative-muse",
        category: Category::Creative,
        priority: 0,
        template: "Imagine \"{text}\" as a story told in shapes and colour. Start from one bold motif, strip everything else away, and let contrast carry the idea.",
        confidence: 0.8,
        reasoning: "Explored divergent visual metaphors",
    },
    Builtin {
        name: "idea-generator",
        category: Category::Creative,
        priority: 1,
        template: "Three directions worth sketching: a minimal mark, a playful mascot, and a typographic treatment. Each can be tested quickly before committing.",
        confidence: 0.74,
        reasoning: "Generated alternative directions",
    },
    Builtin {
        name: "strategy-planner",
        category: Category::Strategic,
        priority: 0,
        template: "Frame \"{text}\" as a sequence of decisions. Secure the cheapest reversible wins first, then commit resources where the evidence is strongest.",
        confidence: 0.78,
        reasoning: "Ordered decisions by reversibility and cost",
    },
    Builtin {
        name: "risk-assessor",
        category: Category::Strategic,
        priority: 1,
        template: "The main risks are timing, dependency on a single channel, and unclear ownership. Each deserves an explicit mitigation before launch.",
        confidence: 0.7,
        reasoning: "Enumerated risks and mitigations",
    },
    Builtin {
        name: "empathy-engine",
        category: Category::Emotional,
        priority: 0,
        template: "What you are feeling makes sense given everything going on. It is okay to take this one small step at a time.",
        confidence: 0.76,
        reasoning: "Acknowledged the {tone} emotional state",
    },
    Builtin {
        name: "wellbeing-guide",
        category: Category::Emotional,
        priority: 1,
        template: "A short pause, a glass of water, and naming one thing within your control can lower the pressure noticeably.",
        confidence: 0.68,
        reasoning: "Suggested grounding techniques",
    },
    Builtin {
        name: "data-analyst",
        category: Category::Analytical,
        priority: 0,
        template: "Looking at \"{text}\" quantitatively: establish a baseline, isolate the variables that moved, and compare against a control before drawing conclusions.",
        confidence: 0.8,
        reasoning: "Proposed a baseline and control comparison",
    },
    Builtin {
        name: "logic-verifier",
        category: Category::Analytical,
        priority: 1,
        template: "The argument holds only if its premises are independent. Check for hidden assumptions that make the conclusion circular.",
        confidence: 0.7,
        reasoning: "Checked premises for circularity",
    },
    Builtin {
        name: "code-architect",
        category: Category::Technical,
        priority: 0,
        template: "For \"{text}\", separate the pure core from the IO edges. Define the interfaces first, then write the smallest implementation that satisfies a test.",
        confidence: 0.82,
        reasoning: "Separated pure logic from side effects",
    },
    Builtin {
        name: "debug-assistant",
        category: Category::Technical,
        priority: 1,
        template: "Reproduce the failure deterministically, bisect the change history, and add a regression test before fixing anything.",
        confidence: 0.75,
        reasoning: "Outlined a reproduce-bisect-test loop",
    },
    Builtin {
        name: "philosophy-sage",
        category: Category::Philosophical,
        priority: 0,
        template: "Questions like \"{text}\" rarely have one answer. They reveal what we value when certainty is not available.",
        confidence: 0.7,
        reasoning: "Reframed the question around underlying values",
    },
    Builtin {
        name: "ethics-advisor",
        category: Category::Philosophical,
        priority: 1,
        template: "Weigh who bears the consequences, whether they consented, and whether the choice would survive being made public.",
        confidence: 0.66,
        reasoning: "Applied consequence and consent tests",
    },
    Builtin {
        name: "deep-reasoner",
        category: Category::Advanced,
        priority: 0,
        template: "At depth, \"{text}\" touches several interacting systems. Tracing second-order effects shows where a simple fix would shift the problem elsewhere.",
        confidence: 0.84,
        reasoning: "Traced second-order effects",
    },
    Builtin {
        name: "meta-cognition",
        category: Category::Advanced,
        priority: 1,
        template: "The confidence behind this answer rests on stated assumptions. Revisiting them is the fastest way to improve it.",
        confidence: 0.62,
        reasoning: "Reviewed the assumptions behind the answer",
    },
];

pub fn builtin_catalog() -> Catalog {
    let mut catalog = Catalog::new();
    for builtin in BUILTINS {
        let spec = TemplateSpec::new(builtin.template, builtin.confidence)
            .with_reasoning(builtin.reasoning);
        catalog.push(ProviderDescriptor::new(
            builtin.name,
            builtin.category,
            builtin.priority,
            Arc::new(TemplateInitializer::new(builtin.name, spec)),
        ));
    }
    catalog
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_builtin_names_are_unique() {
        let catalog = builtin_catalog();
        let names: HashSet<_> = catalog.names().into_iter().collect();
        assert_eq!(names.len(), catalog.len());
    }

    #[test]
    fn test_every_category_is_populated() {
        let catalog = builtin_catalog();
        for category in Category::ALL {
            assert!(
                !catalog.in_category(category).is_empty(),
                "category {} has no providers",
                category
            );
        }
    }

    #[test]
    fn test_core_and_advanced_lists_match_catalog() {
        let catalog = builtin_catalog();
        let core: Vec<_> = catalog
            .in_category(Category::Core)
            .iter()
            .map(|d| d.name.clone())
            .collect();
        assert_eq!(core, CORE_PROVIDERS.to_vec());

        let advanced: Vec<_> = catalog
            .in_category(Category::Advanced)
            .iter()
            .map(|d| d.name.clone())
            .collect();
        assert_eq!(advanced, ADVANCED_PROVIDERS.to_vec());
    }
}

use std::cmp::Ordering;
use std::collections::HashSet;
use uuid::Uuid;

use crate::config::SynthesisWeights;
use crate::error::{OrchestratorError, OrchestratorResult};
use crate::types::{
    ProviderInvocationResult, ProviderOutput, RequestContext, ResponseMetadata, SynthesizedResponse,
};

const EXCERPT_MIN_CHARS: usize = 20;
const EXCERPT_MAX_CHARS: usize = 150;
const OVERLAP_RATIO: f64 = 0.6;
const CONSENSUS_BONUS_PER_PROVIDER: f64 = 0.05;
const CONSENSUS_BONUS_CAP: f64 = 0.15;
const CONFIDENCE_CEILING: f64 = 0.95;
const REASONING_TRAIL_CAP: usize = 5;

struct Ranked<'a> {
    name: &'a str,
    output: &'a ProviderOutput,
    score: f64,
}

/// The returned response carries a nil request id and zero processing time;
/// the orchestrator stamps both.
#[derive(Debug, Clone)]
pub struct Synthesizer {
    weights: SynthesisWeights,
    known: HashSet<String>,
    max_alternates: usize,
}

impl Synthesizer {
    pub fn new(weights: SynthesisWeights, known: HashSet<String>, max_alternates: usize) -> Self {
        Self {
            weights,
            known,
            max_alternates,
        }
    }

    pub fn synthesize(
        &self,
        results: &[ProviderInvocationResult],
        context: &RequestContext,
    ) -> OrchestratorResult<SynthesizedResponse> {
        let successes: Vec<(&str, &ProviderOutput)> = results
            .iter()
            .filter(|r| r.succeeded)
            .filter_map(|r| r.payload.as_ref().map(|p| (r.provider_name.as_str(), p)))
            .collect();

        let metadata = ResponseMetadata {
            request_id: Uuid::nil(),
            request_type: context.request_type,
            processing_time_ms: 0,
            providers_used: results.len(),
            providers_succeeded: successes.len(),
            fallback: false,
        };

        match successes.as_slice() {
            [] => Err(OrchestratorError::NoProviderSucceeded {
                attempted: results.len(),
            }),
            [(name, output)] => Ok(SynthesizedResponse {
                content: output.content.clone(),
                confidence: sanitized(output.confidence),
                contributing_providers: vec![name.to_string()],
                reasoning_trail: reasoning_trail(std::iter::once(*output)),
                metadata,
            }),
            _ => Ok(self.merge(&successes, metadata)),
        }
    }

    fn merge(&self, successes: &[(&str, &ProviderOutput)], metadata: ResponseMetadata) -> SynthesizedResponse {
        let ranked = self.rank(successes);

        let primary = ranked[0].output.content.clone();
        let mut content = primary.clone();
        for alternate in ranked.iter().skip(1).take(self.max_alternates) {
            let excerpt = first_sentence(&alternate.output.content);
            let chars = excerpt.chars().count();
            if (EXCERPT_MIN_CHARS..=EXCERPT_MAX_CHARS).contains(&chars) && !overlaps(excerpt, &primary) {
                content.push_str(&format!(
                    "\n\nAlternate perspective ({}): {}",
                    alternate.name, excerpt
                ));
            }
        }

        let count = ranked.len() as f64;
        let average = ranked
            .iter()
            .map(|r| sanitized(r.output.confidence))
            .sum::<f64>()
            / count;
        let bonus = (CONSENSUS_BONUS_PER_PROVIDER * count).min(CONSENSUS_BONUS_CAP);

        SynthesizedResponse {
            content,
            confidence: (average + bonus).min(CONFIDENCE_CEILING),
            contributing_providers: ranked.iter().map(|r| r.name.to_string()).collect(),
            reasoning_trail: reasoning_trail(ranked.iter().map(|r| r.output)),
            metadata,
        }
    }

    fn rank<'a>(&self, successes: &[(&'a str, &'a ProviderOutput)]) -> Vec<Ranked<'a>> {
        let longest = successes
            .iter()
            .map(|(_, o)| o.content.chars().count())
            .max()
            .unwrap_or(0)
            .max(1) as f64;

        let mut ranked: Vec<Ranked<'a>> = successes
            .iter()
            .map(|&(name, output)| {
                let length = output.content.chars().count() as f64 / longest;
                let known = if self.known.contains(name) { 1.0 } else { 0.0 };
                Ranked {
                    name,
                    output,
                    score: self.weights.length * length
                        + self.weights.confidence * sanitized(output.confidence)
                        + self.weights.known * known,
                }
            })
            .collect();

        ranked.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(Ordering::Equal));
        ranked
    }
}

fn sanitized(confidence: f64) -> f64 {
    if confidence.is_finite() {
        confidence.clamp(0.0, 1.0)
    } else {
        0.0
    }
}

fn reasoning_trail<'a>(outputs: impl Iterator<Item = &'a ProviderOutput>) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut trail = Vec::new();
    for reason in outputs.flat_map(|o| o.reasoning.iter()) {
        if trail.len() == REASONING_TRAIL_CAP {
            break;
        }
        if seen.insert(reason.as_str()) {
            trail.push(reason.clone());
        }
    }
    trail
}

fn first_sentence(content: &str) -> &str {
    let content = content.trim();
    let mut chars = content.char_indices().peekable();
    while let Some((i, c)) = chars.next() {
        if matches!(c, '.' | '!' | '?') {
            let at_boundary = chars.peek().map(|(_, next)| next.is_whitespace()).unwrap_or(true);
            if at_boundary {
                return &content[..i + c.len_utf8()];
            }
        }
    }
    content
}

fn words(text: &str) -> HashSet<String> {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|w| w.chars().count() > 3)
        .map(|w| w.to_lowercase())
        .collect()
}

fn overlaps(excerpt: &str, primary: &str) -> bool {
    if primary.contains(excerpt) {
        return true;
    }
    let excerpt_words = words(excerpt);
    if excerpt_words.is_empty() {
        return true;
    }
    let primary_words = words(primary);
    let shared = excerpt_words.intersection(&primary_words).count() as f64;
    shared / excerpt_words.len() as f64 >= OVERLAP_RATIO
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Request, RequestType};

    fn synthesizer(known: &[&str]) -> Synthesizer {
        Synthesizer::new(
            SynthesisWeights::default(),
            known.iter().map(|s| s.to_string()).collect(),
            2,
        )
    }

    fn ok(name: &str, content: &str, confidence: f64, reasoning: &[&str]) -> ProviderInvocationResult {
        let mut output = ProviderOutput::new(content, confidence);
        output.reasoning = reasoning.iter().map(|s| s.to_string()).collect();
        ProviderInvocationResult::success(name, output, 5)
    }

    fn failed(name: &str) -> ProviderInvocationResult {
        ProviderInvocationResult::failure(name, "boom", 5)
    }

    fn context() -> RequestContext {
        let mut ctx = RequestContext::general(Request::new("Design a logo concept"));
        ctx.request_type = RequestType::Creative;
        ctx
    }

    #[test]
    fn test_no_success_signals_caller() {
        let err = synthesizer(&[])
            .synthesize(&[failed("a"), failed("b")], &context())
            .unwrap_err();
        assert_eq!(err, OrchestratorError::NoProviderSucceeded { attempted: 2 });
    }

    #[test]
    fn test_single_success_passes_through_verbatim() {
        let content = "  Exactly this text, untouched.  ";
        let response = synthesizer(&[])
            .synthesize(&[failed("a"), ok("b", content, 0.66, &["why"])], &context())
            .unwrap();

        assert_eq!(response.content, content);
        assert_eq!(response.confidence, 0.66);
        assert_eq!(response.contributing_providers, vec!["b"]);
        assert_eq!(response.reasoning_trail, vec!["why"]);
        assert_eq!(response.metadata.providers_used, 2);
        assert_eq!(response.metadata.providers_succeeded, 1);
    }

    #[test]
    fn test_ranking_prefers_composite_score() {
        let results = vec![
            ok("short", "Tiny.", 0.9, &[]),
            ok("long", "A much longer answer that fills the space with detail.", 0.9, &[]),
        ];
        let response = synthesizer(&[]).synthesize(&results, &context()).unwrap();
        assert_eq!(response.contributing_providers, vec!["long", "short"]);
        assert!(response.content.starts_with("A much longer answer"));
    }

    #[test]
    fn test_known_provider_outranks_unknown() {
        let results = vec![
            ok("stranger", "Same length content here.", 0.8, &[]),
            ok("trusted", "Same length content here.", 0.8, &[]),
        ];
        let response = synthesizer(&["trusted"]).synthesize(&results, &context()).unwrap();
        assert_eq!(response.contributing_providers[0], "trusted");
    }

    #[test]
    fn test_ties_keep_issuance_order() {
        let results = vec![
            ok("first", "Identical content for both.", 0.5, &[]),
            ok("second", "Identical content for both.", 0.5, &[]),
        ];
        let response = synthesizer(&[]).synthesize(&results, &context()).unwrap();
        assert_eq!(response.contributing_providers, vec!["first", "second"]);
    }

    #[test]
    fn test_alternates_are_appended_when_distinct() {
        let results = vec![
            ok(
                "primary",
                "Start from one bold motif and let contrast carry the idea across every medium.",
                0.9,
                &[],
            ),
            ok(
                "alt",
                "Three directions are worth sketching quickly. Then pick one.",
                0.7,
                &[],
            ),
            ok("tiny", "Too short.", 0.6, &[]),
        ];
        let response = synthesizer(&[]).synthesize(&results, &context()).unwrap();

        assert!(response
            .content
            .contains("Alternate perspective (alt): Three directions are worth sketching quickly."));
        assert!(!response.content.contains("Too short"));
    }

    #[test]
    fn test_redundant_alternate_is_dropped() {
        let primary = "Separate the pure core from the side effects before writing any code at all.";
        let results = vec![
            ok("primary", primary, 0.9, &[]),
            ok("echo", "Separate the pure core from the side effects.", 0.8, &[]),
        ];
        let response = synthesizer(&[]).synthesize(&results, &context()).unwrap();
        assert_eq!(response.content, primary);
    }

    #[test]
    fn test_consensus_confidence() {
        let results = vec![
            ok("a", "Alpha answer text.", 0.6, &[]),
            ok("b", "Beta answer text.", 0.8, &[]),
        ];
        let response = synthesizer(&[]).synthesize(&results, &context()).unwrap();
        assert!((response.confidence - (0.7 + 0.1)).abs() < 1e-9);
    }

    #[test]
    fn test_consensus_confidence_is_capped() {
        let results: Vec<_> = (0..6)
            .map(|i| ok(&format!("p{}", i), "Confident answer.", 0.99, &[]))
            .collect();
        let response = synthesizer(&[]).synthesize(&results, &context()).unwrap();
        assert_eq!(response.confidence, 0.95);
    }

    #[test]
    fn test_nan_confidence_alone_counts_as_zero() {
        let response = synthesizer(&[])
            .synthesize(&[ok("a", "Answer with a broken score.", f64::NAN, &[])], &context())
            .unwrap();
        assert_eq!(response.confidence, 0.0);
    }

    #[test]
    fn test_nan_confidence_does_not_inflate_consensus() {
        let results = vec![
            ok("a", "Answer with a broken score.", f64::NAN, &[]),
            ok("b", "Answer with a sound score.", 0.5, &[]),
        ];
        let response = synthesizer(&[]).synthesize(&results, &context()).unwrap();
        assert!((response.confidence - (0.25 + 0.1)).abs() < 1e-9);
        assert_eq!(response.contributing_providers[0], "b");
    }

    #[test]
    fn test_infinite_confidence_counts_as_zero() {
        let response = synthesizer(&[])
            .synthesize(&[ok("a", "Answer.", f64::INFINITY, &[])], &context())
            .unwrap();
        assert_eq!(response.confidence, 0.0);
    }

    #[test]
    fn test_reasoning_trail_dedup_and_cap() {
        let results = vec![
            ok("a", "Answer A is here.", 0.9, &["r1", "r2", "r3"]),
            ok("b", "Answer B.", 0.5, &["r2", "r4", "r5", "r6", "r7"]),
        ];
        let response = synthesizer(&[]).synthesize(&results, &context()).unwrap();
        assert_eq!(response.reasoning_trail, vec!["r1", "r2", "r3", "r4", "r5"]);
    }

    #[test]
    fn test_first_sentence() {
        assert_eq!(first_sentence("One. Two."), "One.");
        assert_eq!(first_sentence("Version 1.5 shipped! Next"), "Version 1.5 shipped!");
        assert_eq!(first_sentence("no terminator"), "no terminator");
    }
}

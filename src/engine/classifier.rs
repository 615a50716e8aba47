use regex::{Regex, RegexBuilder};

use crate::error::{OrchestratorError, OrchestratorResult};
use crate::types::{EmotionalTone, Request, RequestContext, RequestType, Urgency};

// First matching rule wins.
const TYPE_RULES: &[(RequestType, &str)] = &[
    (
        RequestType::Emotional,
        r"\b(feel|feeling|sad|anxious|anxiety|lonely|stressed|overwhelmed|depressed|upset|grief|heartbroken|worried)\b",
    ),
    (
        RequestType::Technical,
        r"\b(code|bug|compile|compiler|function|api|database|deploy|rust|python|server|algorithm|debug|refactor)\b",
    ),
    (
        RequestType::Creative,
        r"\b(design|logo|story|poem|creative|imagine|invent|brainstorm|paint|draw|compose|slogan)\b",
    ),
    (
        RequestType::Strategic,
        r"\b(strategy|strategic|plan|roadmap|market|competitor|business|launch|growth|prioriti[sz]e)\b",
    ),
    (
        RequestType::Analytical,
        r"\b(analy[sz]e|analysis|data|statistics|compare|evaluate|metrics?|trends?|measure)\b",
    ),
    (
        RequestType::Philosophical,
        r"\b(meaning|ethics?|ethical|moral|morality|consciousness|existence|philosophy|free will)\b",
    ),
];

const URGENCY_RULES: &[(Urgency, &str)] = &[
    (
        Urgency::High,
        r"\b(urgent|urgently|asap|immediately|emergency|right now|critical)\b",
    ),
    (
        Urgency::Medium,
        r"\b(soon|quickly|today|this week|priority|important|deadline)\b",
    ),
];

const TONE_RULES: &[(EmotionalTone, &str)] = &[
    (
        EmotionalTone::Distressed,
        r"\b(sad|anxious|scared|afraid|overwhelmed|hopeless|depressed|lonely|hurt|grief)\b",
    ),
    (
        EmotionalTone::Frustrated,
        r"\b(frustrated|frustrating|annoyed|annoying|angry|stuck|fed up|hate)\b",
    ),
    (
        EmotionalTone::Positive,
        r"\b(happy|excited|great|love|thanks|thank you|glad|awesome|delighted)\b",
    ),
    (
        EmotionalTone::Curious,
        r"\b(wonder|curious|how does|why does|what if)\b",
    ),
];

const TAG_RULES: &[(&str, &str)] = &[
    ("code", r"\b(code|function|api|bug|compile|program|script)\b"),
    ("data", r"\b(data|dataset|statistics|metrics?|chart|numbers)\b"),
    ("visual", r"\b(design|logo|image|visual|colou?r|sketch|illustration)\b"),
    ("planning", r"\b(plan|roadmap|schedule|milestone|strategy)\b"),
    ("writing", r"\b(write|essay|story|poem|draft|copy|slogan)\b"),
    ("support", r"\b(feel|feeling|cope|support|lonely|stressed|anxious)\b"),
];

const LENGTH_WEIGHT: f64 = 0.5;
const LENGTH_SATURATION_CHARS: f64 = 500.0;
const QUESTION_WEIGHT: f64 = 0.1;
const QUESTION_CAP: f64 = 0.3;
const LONG_WORD_WEIGHT: f64 = 0.04;
const LONG_WORD_CAP: f64 = 0.2;
const LONG_WORD_MIN_CHARS: usize = 8;

struct Rule<T> {
    value: T,
    pattern: Regex,
}

fn compile<T: Copy>(table: &[(T, &str)]) -> OrchestratorResult<Vec<Rule<T>>> {
    table
        .iter()
        .map(|(value, pattern)| {
            RegexBuilder::new(pattern)
                .case_insensitive(true)
                .build()
                .map(|pattern| Rule {
                    value: *value,
                    pattern,
                })
                .map_err(|e| OrchestratorError::Classification(e.to_string()))
        })
        .collect()
}

fn first_match<T: Copy>(rules: &[Rule<T>], text: &str) -> Option<T> {
    rules
        .iter()
        .find(|rule| rule.pattern.is_match(text))
        .map(|rule| rule.value)
}

pub struct Classifier {
    type_rules: Vec<Rule<RequestType>>,
    urgency_rules: Vec<Rule<Urgency>>,
    tone_rules: Vec<Rule<EmotionalTone>>,
    tag_rules: Vec<Rule<&'static str>>,
}

impl Classifier {
    pub fn new() -> OrchestratorResult<Self> {
        Ok(Self {
            type_rules: compile(TYPE_RULES)?,
            urgency_rules: compile(URGENCY_RULES)?,
            tone_rules: compile(TONE_RULES)?,
            tag_rules: compile(TAG_RULES)?,
        })
    }

    pub fn classify(&self, request: &Request) -> OrchestratorResult<RequestContext> {
        let text = request.text.trim();
        if text.is_empty() {
            return Err(OrchestratorError::Classification(
                "request has no text".to_string(),
            ));
        }

        let request_type = request
            .type_hint
            .as_deref()
            .and_then(RequestType::parse)
            .or_else(|| first_match(&self.type_rules, text))
            .unwrap_or(RequestType::General);

        let urgency = first_match(&self.urgency_rules, text).unwrap_or(Urgency::Low);

        let emotional_tone = first_match(&self.tone_rules, text).unwrap_or(if text.contains('?') {
            EmotionalTone::Curious
        } else {
            EmotionalTone::Neutral
        });

        let mut required_capabilities: Vec<String> = self
            .tag_rules
            .iter()
            .filter(|rule| rule.pattern.is_match(text))
            .map(|rule| rule.value.to_string())
            .collect();
        required_capabilities.sort();
        required_capabilities.dedup();

        Ok(RequestContext {
            request: request.clone(),
            request_type,
            complexity: complexity(text),
            urgency,
            emotional_tone,
            required_capabilities,
        })
    }
}

/// Weighted sum of length, question marks and long words, clamped to [0, 1].
pub fn complexity(text: &str) -> f64 {
    let chars = text.chars().count() as f64;
    let questions = text.matches('?').count() as f64;
    let long_words = text
        .split(|c: char| !c.is_alphanumeric())
        .filter(|w| w.chars().count() >= LONG_WORD_MIN_CHARS)
        .count() as f64;

    let score = LENGTH_WEIGHT * (chars / LENGTH_SATURATION_CHARS).min(1.0)
        + (questions * QUESTION_WEIGHT).min(QUESTION_CAP)
        + (long_words * LONG_WORD_WEIGHT).min(LONG_WORD_CAP);

    score.clamp(0.0, 1.0)
}

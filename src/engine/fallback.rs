use crate::types::{EmotionalTone, RequestContext, RequestType};

pub const FALLBACK_CONFIDENCE: f64 = 0.3;
pub const FALLBACK_REASONING: &str =
    "No provider produced a result; answered from the local reflective generator";

fn tone_opening(tone: EmotionalTone) -> &'static str {
    match tone {
        EmotionalTone::Distressed => "It sounds like a lot is weighing on you right now. ",
        EmotionalTone::Frustrated => "That sounds genuinely frustrating. ",
        EmotionalTone::Positive => "Good to feel the energy behind this. ",
        EmotionalTone::Curious => "That is a good question to sit with. ",
        EmotionalTone::Neutral => "",
    }
}

fn type_body(request_type: RequestType) -> &'static str {
    match request_type {
        RequestType::Creative => "Try describing the feeling the result should leave behind, then sketch the simplest form that could carry it.",
        RequestType::Strategic => "Start by naming the one outcome that matters most, then list the decisions that are cheap to reverse and make those first.",
        RequestType::Emotional => "Taking one small, concrete step and letting the rest wait is often enough for now.",
        RequestType::Analytical => "Write down what you would expect to see if your hypothesis were wrong, and look for that first.",
        RequestType::Technical => "Reduce the problem to the smallest input that still shows the behaviour; the cause is usually visible from there.",
        RequestType::Philosophical => "Ask which answer you would still accept if you were on the other side of the question.",
        RequestType::General => "Could you say a little more about what you are hoping to get out of this?",
    }
}

pub fn reflective_response(context: &RequestContext) -> String {
    format!(
        "{}{}",
        tone_opening(context.emotional_tone),
        type_body(context.request_type)
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Request;

    #[test]
    fn test_every_type_and_tone_produces_text() {
        let tones = [
            EmotionalTone::Neutral,
            EmotionalTone::Positive,
            EmotionalTone::Distressed,
            EmotionalTone::Frustrated,
            EmotionalTone::Curious,
        ];
        for request_type in RequestType::ALL {
            for tone in tones {
                let mut ctx = RequestContext::general(Request::new("anything"));
                ctx.request_type = request_type;
                ctx.emotional_tone = tone;
                assert!(!reflective_response(&ctx).trim().is_empty());
            }
        }
    }

    #[test]
    fn test_distressed_opening() {
        let mut ctx = RequestContext::general(Request::new("help"));
        ctx.request_type = RequestType::Emotional;
        ctx.emotional_tone = EmotionalTone::Distressed;
        assert!(reflective_response(&ctx).starts_with("It sounds like a lot"));
    }
}

//! Utterance pattern matchers
//!
//! Small yes/no and trigger-phrase detectors the dialogue machine branches
//! on. Word-boundary regexes rather than `contains` so "no" does not fire
//! inside "know" or "now".

use once_cell::sync::Lazy;
use regex::Regex;

static AFFIRMATIVE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)\b(yes|yeah|yep|yup|sure|ok|okay|alright|confirm|please|go ahead|sounds good|definitely|absolutely|of course|why not)\b",
    )
    .unwrap()
});

static NEGATIVE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)\b(no|nope|nah|not now|not today|cancel|decline|stop|never mind|nevermind|don't|do not|maybe later|later)\b",
    )
    .unwrap()
});

static JOB_CHANGE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)\b(new job|chang(?:e|ed|ing) jobs?|start(?:ed|ing)? a new (?:job|role)|new employer|switch(?:ed|ing)? employers?|mov(?:e|ed|ing) to another employer|join(?:ed|ing)? a new company|new company|new role)\b",
    )
    .unwrap()
});

/// Did the user agree?
///
/// Negation wins on a mixed utterance ("no, actually yes" is rare; "yes but
/// not now" is not), so callers should check [`is_negative`] first when both
/// outcomes are possible.
pub fn is_affirmative(text: &str) -> bool {
    AFFIRMATIVE.is_match(text)
}

/// Did the user decline or cancel?
pub fn is_negative(text: &str) -> bool {
    NEGATIVE.is_match(text)
}

/// Does the utterance mention changing jobs or employers?
pub fn mentions_job_change(text: &str) -> bool {
    JOB_CHANGE.is_match(text)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_affirmative_variants() {
        for text in ["yes please", "Sure, go ahead", "ok", "sounds good to me"] {
            assert!(is_affirmative(text), "{text}");
        }
    }

    #[test]
    fn test_negative_variants() {
        for text in ["no thanks", "cancel that", "not now", "nope"] {
            assert!(is_negative(text), "{text}");
        }
    }

    #[test]
    fn test_no_does_not_fire_inside_words() {
        assert!(!is_negative("I know my balance"));
        assert!(!is_negative("show me the notice"));
    }

    #[test]
    fn test_job_change_phrases() {
        for text in [
            "I'm starting a new job next month",
            "I changed jobs recently",
            "moving to another employer",
            "just joined a new company",
        ] {
            assert!(mentions_job_change(text), "{text}");
        }
        assert!(!mentions_job_change("what's my balance"));
    }

    #[test]
    fn test_neutral_text_matches_neither() {
        let text = "what's the weather like";
        assert!(!is_affirmative(text));
        assert!(!is_negative(text));
    }
}

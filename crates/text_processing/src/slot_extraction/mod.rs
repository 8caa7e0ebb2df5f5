//! Slot value extraction from speech transcripts
//!
//! Speech recognizers rarely hand back "jane.smith@gmail.com"; they hand
//! back "jane dot smith at gmail dot com", "jane smith (at) gmail.com", or
//! just "jane smith gmail com". The email extractor runs a fixed cascade of
//! rules over the raw transcript and the LLM-normalized hint and returns
//! the first syntactically valid address. Addresses are free-form and pass
//! through the hint verbatim.
//!
//! ## Rule order (email)
//!
//! 1. Direct regex extraction from the raw transcript
//! 2. Direct regex extraction from the LLM hint
//! 3. Token-substitution normalization of the hint, accepted whole or
//!    regex-extracted
//! 4. The same normalization of the raw transcript
//! 5. Word-reconstruction fallback (hint first, then transcript)
//! 6. Failure, with a guidance message for the re-prompt
//!
//! Extraction is a pure function of its two text inputs. Static patterns
//! are compiled once at program start using `once_cell::sync::Lazy`.

use once_cell::sync::Lazy;
use regex::Regex;
use thiserror::Error;

use member_assist_core::SlotKind;

// =============================================================================
// STATIC REGEX PATTERNS - Compiled once at program start
// =============================================================================

// Permissive address-shaped token for extraction out of surrounding text
static EMAIL_EXTRACT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}").unwrap());

// Strict whole-string check: local-part@domain.tld
static EMAIL_VALID: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").unwrap());

// Spoken separators: " at " / " dot " and bracketed variants
static SPOKEN_AT: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)\s+at\s+").unwrap());
static SPOKEN_DOT: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)\s+dot\s+").unwrap());
static PAREN_AT: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)\s*\(at\)\s*").unwrap());
static PAREN_DOT: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)\s*\(dot\)\s*").unwrap());
static BRACKET_AT: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)\[at\]").unwrap());
static BRACKET_DOT: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)\[dot\]").unwrap());
static WHITESPACE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").unwrap());
static TRAILING_PUNCT: Lazy<Regex> = Lazy::new(|| Regex::new(r"[.,;:!?]+$").unwrap());

/// Guidance spoken back to the user when no rule yields a valid email
pub const EMAIL_GUIDANCE: &str = "Sorry, I could not extract a valid email address. \
    Please say your email in the format john dot doe at gmail dot com, \
    for example: jane dot smith at outlook dot com.";

/// Extraction failure, carrying the re-prompt guidance
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ExtractionError {
    #[error("empty transcript")]
    EmptyInput,

    #[error("no valid email found")]
    NoValidEmail,
}

impl ExtractionError {
    /// User-facing guidance for the re-prompt
    pub fn guidance(&self, kind: SlotKind) -> &'static str {
        match kind {
            SlotKind::Email => EMAIL_GUIDANCE,
            SlotKind::Address => "I didn't catch that. Could you please repeat your new address?",
        }
    }
}

/// Slot extractor for speech transcripts
///
/// Stateless; all patterns are module-level statics.
#[derive(Debug, Clone, Copy, Default)]
pub struct SlotExtractor;

impl SlotExtractor {
    pub fn new() -> Self {
        Self
    }

    /// Extract a normalized slot value from a transcript and its LLM hint
    pub fn extract(
        &self,
        kind: SlotKind,
        transcript: &str,
        hint: &str,
    ) -> Result<String, ExtractionError> {
        if transcript.trim().is_empty() && hint.trim().is_empty() {
            return Err(ExtractionError::EmptyInput);
        }

        match kind {
            SlotKind::Address => self.extract_address(hint),
            SlotKind::Email => self.extract_email(transcript, hint),
        }
    }

    /// Addresses are free-form: the LLM-normalized text is taken verbatim
    fn extract_address(&self, hint: &str) -> Result<String, ExtractionError> {
        let address = strip_quotes(hint.trim());
        if address.is_empty() {
            return Err(ExtractionError::EmptyInput);
        }
        Ok(address.to_string())
    }

    /// Run the email cascade over the transcript and the hint
    pub fn extract_email(
        &self,
        transcript: &str,
        hint: &str,
    ) -> Result<String, ExtractionError> {
        let hint = strip_quotes(hint.trim());

        // 1-2. Direct regex extraction, transcript first
        if let Some(email) = extract_with_regex(transcript).filter(|e| is_valid_email(e)) {
            return Ok(email);
        }
        if let Some(email) = extract_with_regex(hint).filter(|e| is_valid_email(e)) {
            return Ok(email);
        }

        // 3. Normalize the hint, accepted whole or regex-extracted
        let normalized_hint = normalize_spoken_email(hint);
        if is_valid_email(&normalized_hint) {
            return Ok(normalized_hint);
        }
        if let Some(email) = extract_with_regex(&normalized_hint).filter(|e| is_valid_email(e)) {
            return Ok(email);
        }

        // 4. Normalize the raw transcript
        let normalized_transcript = normalize_spoken_email(transcript);
        if is_valid_email(&normalized_transcript) {
            return Ok(normalized_transcript);
        }
        if let Some(email) =
            extract_with_regex(&normalized_transcript).filter(|e| is_valid_email(e))
        {
            return Ok(email);
        }

        // 5. Word-reconstruction fallback, hint first
        if let Some(email) = reconstruct_from_words(hint).filter(|e| is_valid_email(e)) {
            tracing::debug!(email = %email, "Email reconstructed from hint words");
            return Ok(email);
        }
        if let Some(email) = reconstruct_from_words(transcript).filter(|e| is_valid_email(e)) {
            tracing::debug!(email = %email, "Email reconstructed from transcript words");
            return Ok(email);
        }

        Err(ExtractionError::NoValidEmail)
    }
}

/// Pull the first email-shaped token out of the text
pub fn extract_with_regex(text: &str) -> Option<String> {
    EMAIL_EXTRACT.find(text).map(|m| m.as_str().to_string())
}

/// Strict local-part@domain.tld check on the whole string
pub fn is_valid_email(text: &str) -> bool {
    EMAIL_VALID.is_match(text)
}

/// Replace spoken separators, squeeze whitespace, case-fold, and strip
/// trailing punctuation
pub fn normalize_spoken_email(text: &str) -> String {
    let mut email = SPOKEN_AT.replace_all(text, "@").into_owned();
    email = SPOKEN_DOT.replace_all(&email, ".").into_owned();
    email = PAREN_AT.replace_all(&email, "@").into_owned();
    email = PAREN_DOT.replace_all(&email, ".").into_owned();
    email = WHITESPACE.replace_all(&email, "").into_owned();
    email = BRACKET_AT.replace_all(&email, "@").into_owned();
    email = BRACKET_DOT.replace_all(&email, ".").into_owned();
    email = email.to_lowercase();
    TRAILING_PUNCT.replace(&email, "").into_owned()
}

/// Rebuild an address from bare words: the last token becomes the TLD, the
/// second-last the domain, everything before them the local part
pub fn reconstruct_from_words(text: &str) -> Option<String> {
    let mut words: Vec<&str> = text.split_whitespace().collect();
    if words.len() < 3 {
        return None;
    }
    let tld = words.pop()?;
    let domain = words.pop()?;
    let local = words.concat();
    if local.is_empty() {
        return None;
    }
    Some(format!("{}@{}.{}", local, domain, tld).to_lowercase())
}

/// Strip one layer of surrounding double quotes (LLMs like to add them)
fn strip_quotes(text: &str) -> &str {
    text.trim_start_matches('"').trim_end_matches('"').trim()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wellformed_email_returned_unchanged() {
        let extractor = SlotExtractor::new();
        let value = extractor
            .extract(SlotKind::Email, "my email is Jane.Smith+x@Sub.Example.org thanks", "")
            .unwrap();
        assert_eq!(value, "Jane.Smith+x@Sub.Example.org");
    }

    #[test]
    fn test_spoken_email_normalized() {
        let extractor = SlotExtractor::new();
        let value = extractor
            .extract(SlotKind::Email, "john dot doe at gmail dot com", "")
            .unwrap();
        assert_eq!(value, "john.doe@gmail.com");
    }

    #[test]
    fn test_bracket_variants() {
        assert_eq!(
            normalize_spoken_email("john[at]gmail[dot]com"),
            "john@gmail.com"
        );
        assert_eq!(
            normalize_spoken_email("jane (at) outlook (dot) com"),
            "jane@outlook.com"
        );
    }

    #[test]
    fn test_trailing_punctuation_stripped() {
        assert_eq!(
            normalize_spoken_email("jane at outlook dot com."),
            "jane@outlook.com"
        );
    }

    #[test]
    fn test_word_reconstruction_fallback() {
        let extractor = SlotExtractor::new();
        let value = extractor
            .extract(SlotKind::Email, "jane smith gmail com", "")
            .unwrap();
        assert_eq!(value, "janesmith@gmail.com");
    }

    #[test]
    fn test_regex_rules_run_before_reconstruction() {
        // A valid address anywhere in the transcript must win even when the
        // token layout would also reconstruct to something else.
        let extractor = SlotExtractor::new();
        let value = extractor
            .extract(SlotKind::Email, "send it to jane@gmail.com not smith yahoo com", "")
            .unwrap();
        assert_eq!(value, "jane@gmail.com");
    }

    #[test]
    fn test_hint_preferred_over_reconstruction() {
        let extractor = SlotExtractor::new();
        let value = extractor
            .extract(SlotKind::Email, "jane smith gmail com", "jane.smith@gmail.com")
            .unwrap();
        assert_eq!(value, "jane.smith@gmail.com");
    }

    #[test]
    fn test_two_words_cannot_reconstruct() {
        assert_eq!(reconstruct_from_words("gmail com"), None);

        let extractor = SlotExtractor::new();
        assert_eq!(
            extractor.extract(SlotKind::Email, "gmail com", ""),
            Err(ExtractionError::NoValidEmail)
        );
    }

    #[test]
    fn test_empty_input_fails() {
        let extractor = SlotExtractor::new();
        assert_eq!(
            extractor.extract(SlotKind::Email, "   ", ""),
            Err(ExtractionError::EmptyInput)
        );
        assert_eq!(
            extractor.extract(SlotKind::Address, "", "  "),
            Err(ExtractionError::EmptyInput)
        );
    }

    #[test]
    fn test_address_passthrough() {
        let extractor = SlotExtractor::new();
        let value = extractor
            .extract(SlotKind::Address, "I moved", "\"42 Harbour St, Melbourne\"")
            .unwrap();
        assert_eq!(value, "42 Harbour St, Melbourne");
    }

    #[test]
    fn test_guidance_messages() {
        let err = ExtractionError::NoValidEmail;
        assert!(err.guidance(SlotKind::Email).contains("john dot doe"));
        assert!(err.guidance(SlotKind::Address).contains("address"));
    }
}

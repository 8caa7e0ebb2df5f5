//! One-time passcode generation and verification
//!
//! The code is a mocked identity check: 6 digits, uniformly random, leading
//! zeros kept. Verification strips everything that is not a digit first so
//! "1 2 3 4 5 6" read out over voice matches "123456". No expiry; attempt
//! bounding is the state machine's job.

use rand::Rng;

/// Generate a 6-digit code, zero-padded
pub fn generate() -> String {
    let code: u32 = rand::thread_rng().gen_range(0..1_000_000);
    format!("{:06}", code)
}

/// Drop every non-digit character
pub fn strip_non_digits(input: &str) -> String {
    input.chars().filter(|c| c.is_ascii_digit()).collect()
}

/// Compare spoken/typed input against the expected code
pub fn verify(input: &str, expected: &str) -> bool {
    strip_non_digits(input) == expected
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_code_is_always_six_digits() {
        for _ in 0..200 {
            let code = generate();
            assert_eq!(code.len(), 6);
            assert!(code.chars().all(|c| c.is_ascii_digit()));
        }
    }

    #[test]
    fn test_code_matches_itself() {
        let code = generate();
        assert!(verify(&code, &code));
    }

    #[test]
    fn test_spoken_digits_match() {
        assert!(verify("1 2 3 4 5 6", "123456"));
        assert!(verify("the code is 123-456.", "123456"));
    }

    #[test]
    fn test_distinct_codes_mismatch() {
        assert!(!verify("000001", "000002"));
        assert!(!verify("", "123456"));
    }

    #[test]
    fn test_leading_zeros_preserved() {
        // A code below 100000 must not lose its padding
        assert!(verify("012345", "012345"));
        assert!(!verify("12345", "012345"));
    }
}

use thiserror::Error;

pub const MAX_CHIRP_LENGTH: usize = 140;

/// Words masked out of chirp bodies. Compared against lower-cased tokens.
pub const BLOCKED_WORDS: &[&str] = &["kerfuffle", "sharbert", "fornax"];

const MASK: &str = "****";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum FilterError {
    #[error("Chirp is too long")]
    TooLong { length: usize },
}

/// Check the raw length, then redact. The length counts characters of the
/// body as submitted, before any word is masked.
pub fn validate_chirp(body: &str) -> Result<String, FilterError> {
    let length = body.chars().count();
    if length > MAX_CHIRP_LENGTH {
        return Err(FilterError::TooLong { length });
    }
    Ok(redact(body, BLOCKED_WORDS))
}

/// Replace blocked words with a fixed mask.
///
/// Tokens are split on single spaces only, so a blocked word with punctuation
/// attached ("Kerfuffle!") is left alone. Spacing is preserved exactly.
pub fn redact(body: &str, blocked: &[&str]) -> String {
    body.split(' ')
        .map(|word| {
            let lowered = word.to_lowercase();
            if blocked.iter().any(|b| b.to_lowercase() == lowered) {
                MASK
            } else {
                word
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn all_blocked_words_masked() {
        assert_eq!(
            redact("kerfuffle sharbert fornax", BLOCKED_WORDS),
            "**** **** ****"
        );
    }

    #[test]
    fn match_is_case_insensitive() {
        assert_eq!(
            redact("This is a Kerfuffle opinion", BLOCKED_WORDS),
            "This is a **** opinion"
        );
    }

    #[test]
    fn punctuation_attached_word_is_not_matched() {
        assert_eq!(
            redact("I said Kerfuffle!", &["kerfuffle"]),
            "I said Kerfuffle!"
        );
    }

    #[test]
    fn spacing_is_preserved() {
        assert_eq!(redact("  fornax  ok ", BLOCKED_WORDS), "  ****  ok ");
        assert_eq!(redact("", BLOCKED_WORDS), "");
    }

    #[test]
    fn length_limit_is_inclusive() {
        let exact = "a".repeat(MAX_CHIRP_LENGTH);
        assert_eq!(validate_chirp(&exact).unwrap(), exact);

        let over = "a".repeat(MAX_CHIRP_LENGTH + 1);
        assert_eq!(
            validate_chirp(&over),
            Err(FilterError::TooLong { length: 141 })
        );
    }

    #[test]
    fn length_is_counted_before_redaction() {
        // 131 characters of filler plus " kerfuffle" (10) is over the limit even
        // though the redacted text would fit.
        let body = format!("{} kerfuffle", "a".repeat(131));
        assert_eq!(body.chars().count(), 141);
        assert!(validate_chirp(&body).is_err());
    }

    #[test]
    fn length_counts_characters_not_bytes() {
        let body = "é".repeat(MAX_CHIRP_LENGTH);
        assert!(validate_chirp(&body).is_ok());
    }
}

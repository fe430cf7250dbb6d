//! Identifier validation shared by builders and the archive layer.

use crate::error::LangError;

/// Returns whether `s` matches `[A-Za-z_][A-Za-z0-9_]*`.
pub fn is_identifier(s: &str) -> bool {
    let mut chars = s.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

pub(crate) fn require_identifier(s: &str) -> Result<(), LangError> {
    if is_identifier(s) {
        Ok(())
    } else {
        Err(LangError::InvalidIdentifier(s.to_owned()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_leading_underscore_and_digits_after() {
        assert!(is_identifier("_x9"));
        assert!(is_identifier("Host"));
        assert!(is_identifier("a"));
    }

    #[test]
    fn rejects_empty_leading_digit_and_punctuation() {
        assert!(!is_identifier(""));
        assert!(!is_identifier("9lives"));
        assert!(!is_identifier("foo-bar"));
        assert!(!is_identifier("foo bar"));
        assert!(!is_identifier("naïve"));
    }

    #[test]
    fn require_identifier_names_the_offender() {
        let err = require_identifier("foo.bar").unwrap_err();
        assert_eq!(err.to_string(), "\"foo.bar\" is not a valid identifier");
    }
}

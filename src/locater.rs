//! Locater ids: `level.room.spot` seat addresses such as `0.3.5`.
//!
//! Locaters are compared as strings everywhere, so they are validated but
//! never rewritten. `0.03.5` and `0.3.5` are different locaters.

use std::sync::LazyLock;

use regex::Regex;

static LOCATER_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[0-9]+\.[0-9]+\.[0-9]+$").unwrap());

/// True when `value` has the `digits.digits.digits` shape (ASCII digits only).
pub fn is_well_formed(value: &str) -> bool {
    LOCATER_REGEX.is_match(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_well_formed_locaters() {
        assert!(is_well_formed("0.3.5"));
        assert!(is_well_formed("12.104.7"));
        assert!(is_well_formed("0.03.5"));
    }

    #[test]
    fn test_malformed_locaters() {
        for bad in ["", "0.3", "0.3.5.1", "a.b.c", " 0.3.5", "0.3.5 ", "0..5", "-1.2.3"] {
            assert!(!is_well_formed(bad), "{bad:?} should be rejected");
        }
    }

    #[test]
    fn test_non_ascii_digits_are_rejected() {
        for bad in ["١.٢.٣", "０.３.５", "0.३.5"] {
            assert!(!is_well_formed(bad), "{bad:?} should be rejected");
        }
    }
}

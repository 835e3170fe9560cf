//! Amount equality check

use crate::utils::helpers::normalize_digits;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AmountCheck {
    Match,
    Mismatch { submitted: i64 },
    NotANumber,
}

/// Parse a whole-number amount, accepting Arabic-Indic digits
pub fn parse_amount(text: &str) -> Option<i64> {
    let normalized = normalize_digits(text.trim());
    if normalized.is_empty() {
        return None;
    }
    normalized.parse::<i64>().ok()
}

pub fn check_amount(text: &str, expected: u32) -> AmountCheck {
    match parse_amount(text) {
        Some(submitted) if submitted == i64::from(expected) => AmountCheck::Match,
        Some(submitted) => AmountCheck::Mismatch { submitted },
        None => AmountCheck::NotANumber,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exact_match() {
        assert_eq!(check_amount("400", 400), AmountCheck::Match);
        assert_eq!(check_amount("  400\n", 400), AmountCheck::Match);
        assert_eq!(check_amount("٤٠٠", 400), AmountCheck::Match);
    }

    #[test]
    fn test_mismatch_keeps_submitted_value() {
        assert_eq!(check_amount("350", 400), AmountCheck::Mismatch { submitted: 350 });
        assert_eq!(check_amount("-400", 400), AmountCheck::Mismatch { submitted: -400 });
    }

    #[test]
    fn test_not_a_number() {
        assert_eq!(check_amount("four hundred", 400), AmountCheck::NotANumber);
        assert_eq!(check_amount("400 stars", 400), AmountCheck::NotANumber);
        assert_eq!(check_amount("", 400), AmountCheck::NotANumber);
        assert_eq!(check_amount("4.5", 400), AmountCheck::NotANumber);
    }
}

// Field-level validators for user records

use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    /// ASCII word characters only; `\w` in `regex` would also admit Unicode letters.
    static ref EMAIL_RE: Regex = Regex::new(
        r"^[A-Za-z0-9_]+([.-]?[A-Za-z0-9_]+)*@[A-Za-z0-9_]+([.-]?[A-Za-z0-9_]+)*(\.[A-Za-z0-9_]{2,3})+$"
    )
    .expect("valid email regex");

    /// Anywhere in the value, not anchored: "+91 9876543210" is accepted.
    static ref MOBILE_RE: Regex = Regex::new(r"[0-9]{10}").expect("valid mobile regex");
}

pub fn is_valid_email(value: &str) -> bool {
    EMAIL_RE.is_match(value)
}

pub fn is_valid_mobile(value: &str) -> bool {
    MOBILE_RE.is_match(value)
}

/// Trims the value and rejects it when nothing is left.
pub fn required(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accepts_common_emails() {
        assert!(is_valid_email("john.smith@example.com"));
        assert!(is_valid_email("a-b@mail.example.org"));
        assert!(is_valid_email("user_1@site.io"));
    }

    #[test]
    fn test_rejects_malformed_emails() {
        assert!(!is_valid_email("not-an-email"));
        assert!(!is_valid_email("missing@tld"));
        assert!(!is_valid_email("@example.com"));
        assert!(!is_valid_email("john@example.comma"));
        assert!(!is_valid_email("john smith@example.com"));
    }

    #[test]
    fn test_rejects_non_ascii_emails() {
        assert!(!is_valid_email("josé@exämple.com"));
        assert!(!is_valid_email("имя@почта.рф"));
        assert!(!is_valid_email("jane@example.cöm"));
    }

    #[test]
    fn test_mobile_needs_ten_consecutive_digits() {
        assert!(is_valid_mobile("9876543210"));
        assert!(is_valid_mobile("+91 9876543210"));
        assert!(!is_valid_mobile("987654321"));
        assert!(!is_valid_mobile("98765 43210"));
        assert!(!is_valid_mobile("phone"));
    }

    #[test]
    fn test_required_trims_and_rejects_blank() {
        assert_eq!(required(Some("  Jane ".into())), Some("Jane".to_string()));
        assert_eq!(required(Some("   ".into())), None);
        assert_eq!(required(None), None);
    }
}

use std::fmt;
use std::sync::LazyLock;

use regex::Regex;

/// Regex patterns used for redaction, compiled once.
pub struct PiiRegexRegistry;

impl PiiRegexRegistry {
    /// Email addresses
    pub fn email() -> &'static Regex {
        static EMAIL_REGEX: LazyLock<Regex> = LazyLock::new(|| {
            #[allow(clippy::unwrap_used)]
            Regex::new(r"\b[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Za-z]{1,}\b").unwrap()
        });
        &EMAIL_REGEX
    }

    /// Bank account or card numbers: 6+ digits, optionally grouped by spaces
    /// or dashes.
    pub fn account_number() -> &'static Regex {
        static ACCOUNT_REGEX: LazyLock<Regex> = LazyLock::new(|| {
            #[allow(clippy::unwrap_used)]
            Regex::new(r"\+?\d(?:[ -]?\d){5,}").unwrap()
        });
        &ACCOUNT_REGEX
    }
}

/// Masks sensitive data in free text.
///
/// - Emails keep the first character of the local part and the domain.
/// - Account, card and phone numbers keep their last four digits.
pub fn redact(input: &str) -> String {
    let emails = PiiRegexRegistry::email().replace_all(input, |caps: &regex::Captures| {
        let full = &caps[0];
        match full.find('@') {
            Some(0) | None => full.to_string(),
            Some(at) => format!("{}***{}", &full[..1], &full[at..]),
        }
    });

    PiiRegexRegistry::account_number()
        .replace_all(&emails, |caps: &regex::Captures| {
            let digits: Vec<char> = caps[0].chars().filter(char::is_ascii_digit).collect();
            let tail: String = digits[digits.len().saturating_sub(4)..].iter().collect();
            format!("****{tail}")
        })
        .to_string()
}

/// Wrapper that redacts on `Display` and `Debug`.
pub struct Redacted<'a>(pub &'a str);

impl fmt::Display for Redacted<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", redact(self.0))
    }
}

impl fmt::Debug for Redacted<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", redact(self.0))
    }
}

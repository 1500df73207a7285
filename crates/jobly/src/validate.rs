//! Validation helpers used by the `New*` input types.

use std::sync::OnceLock;

/// Best-effort email validation.
///
/// This is intentionally not fully RFC-compliant; the unique index on
/// `users.email` is the real guard against duplicates.
pub fn is_email(s: &str) -> bool {
    static EMAIL_RE: OnceLock<regex::Regex> = OnceLock::new();
    EMAIL_RE
        .get_or_init(|| {
            regex::Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("invalid built-in email regex")
        })
        .is_match(s)
}

/// Company handles: lowercase letters, digits, `-` and `_`, 1-25 chars.
pub fn is_handle(s: &str) -> bool {
    static HANDLE_RE: OnceLock<regex::Regex> = OnceLock::new();
    HANDLE_RE
        .get_or_init(|| {
            regex::Regex::new(r"^[a-zA-Z0-9_-]{1,25}$").expect("invalid built-in handle regex")
        })
        .is_match(s)
}

/// An absolute `http`/`https` URL, as used for logos and profile photos.
pub fn is_http_url(s: &str) -> bool {
    url::Url::parse(s)
        .map(|u| matches!(u.scheme(), "http" | "https"))
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn email() {
        assert!(is_email("joel@burton.com"));
        assert!(!is_email("joel"));
        assert!(!is_email("a b@c.d"));
    }

    #[test]
    fn handle() {
        assert!(is_handle("AAPL"));
        assert!(is_handle("rithm-school"));
        assert!(!is_handle(""));
        assert!(!is_handle("has space"));
    }

    #[test]
    fn urls() {
        assert!(is_http_url("https://example.com/logo.png"));
        assert!(!is_http_url("ftp://example.com/x"));
        assert!(!is_http_url("not a url"));
    }
}

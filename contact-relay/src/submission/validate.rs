//! Field validation, honeypot detection and sanitization.

use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::{Map, Value};

use super::types::ContactForm;
use crate::error::GatewayError;

/// Decoy fields hidden from humans; bots tend to fill them in.
pub const HONEYPOT_FIELDS: &[&str] = &["website", "url", "homepage", "company_website"];

// ASCII digits only; `\d` would admit any Unicode decimal digit.
static PHONE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[0-9\s\-+()]+$").unwrap());

static EMAIL_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").unwrap());

/// Trim whitespace plus the byte order mark, which `str::trim` keeps.
pub(crate) fn trim_field(value: &str) -> &str {
    value.trim_matches(|c: char| c.is_whitespace() || c == '\u{feff}')
}

/// Return the first honeypot field that carries a value.
pub fn honeypot_field(body: &Map<String, Value>) -> Option<&'static str> {
    HONEYPOT_FIELDS.iter().copied().find(|field| {
        match body.get(*field) {
            None | Some(Value::Null) => false,
            Some(Value::String(s)) => !trim_field(s).is_empty(),
            Some(Value::Bool(b)) => *b,
            Some(_) => true,
        }
    })
}

/// Check required fields and formats.
///
/// Phone is checked before email so the caller sees one error at a time.
pub fn validate(form: &ContactForm) -> Result<(), GatewayError> {
    let phone = form.phone.as_deref().map(trim_field).unwrap_or("");
    if phone.is_empty() {
        return Err(GatewayError::PhoneRequired);
    }
    if !PHONE_RE.is_match(phone) {
        return Err(GatewayError::InvalidPhone);
    }

    if let Some(email) = form.email.as_deref().map(trim_field) {
        if !email.is_empty() && !EMAIL_RE.is_match(email) {
            return Err(GatewayError::InvalidEmail);
        }
    }

    Ok(())
}

/// Trim and drop angle brackets. Absent input becomes an empty string.
///
/// This only keeps markup out of the payload; downstream consumers still treat
/// the values as untrusted.
pub fn sanitize(value: Option<&str>) -> String {
    value
        .map(|s| trim_field(s).chars().filter(|c| *c != '<' && *c != '>').collect())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn form(phone: Option<&str>, email: Option<&str>) -> ContactForm {
        ContactForm {
            phone: phone.map(String::from),
            email: email.map(String::from),
            ..Default::default()
        }
    }

    #[test]
    fn test_phone_required() {
        assert!(matches!(validate(&form(None, None)), Err(GatewayError::PhoneRequired)));
        assert!(matches!(validate(&form(Some(""), None)), Err(GatewayError::PhoneRequired)));
        assert!(matches!(
            validate(&form(Some(" \t "), Some("a@b.co"))),
            Err(GatewayError::PhoneRequired)
        ));
    }

    #[test]
    fn test_phone_format() {
        assert!(matches!(validate(&form(Some("abc"), None)), Err(GatewayError::InvalidPhone)));
        assert!(matches!(
            validate(&form(Some("555-0100 ext 2"), None)),
            Err(GatewayError::InvalidPhone)
        ));
        assert!(validate(&form(Some("+1 (555) 123-4567"), None)).is_ok());
        assert!(validate(&form(Some("  5550100  "), None)).is_ok());
    }

    #[test]
    fn test_phone_rejects_non_ascii_digits() {
        for phone in ["١٢٣٤٥", "５５５", "５５５０１００"] {
            assert!(
                matches!(validate(&form(Some(phone), None)), Err(GatewayError::InvalidPhone)),
                "{phone:?} should be rejected"
            );
        }
    }

    #[test]
    fn test_byte_order_mark_trimmed() {
        assert_eq!(trim_field("\u{feff} 555 \u{feff}"), "555");
        assert!(validate(&form(Some("\u{feff}5550100"), None)).is_ok());
        assert!(matches!(
            validate(&form(Some("\u{feff}"), None)),
            Err(GatewayError::PhoneRequired)
        ));
        assert_eq!(sanitize(Some("\u{feff}<b>Ada</b>\u{feff}")), "bAda/b");
    }

    #[test]
    fn test_phone_checked_before_email() {
        assert!(matches!(
            validate(&form(Some("abc"), Some("not-an-email"))),
            Err(GatewayError::InvalidPhone)
        ));
    }

    #[test]
    fn test_email_format() {
        assert!(matches!(
            validate(&form(Some("555"), Some("not-an-email"))),
            Err(GatewayError::InvalidEmail)
        ));
        assert!(matches!(
            validate(&form(Some("555"), Some("a b@c.de"))),
            Err(GatewayError::InvalidEmail)
        ));
        assert!(validate(&form(Some("555"), Some("a@b.co"))).is_ok());
        assert!(validate(&form(Some("555"), Some("   "))).is_ok());
        assert!(validate(&form(Some("555"), None)).is_ok());
    }

    #[test]
    fn test_sanitize() {
        assert_eq!(sanitize(None), "");
        assert_eq!(sanitize(Some("  plain  ")), "plain");
        assert_eq!(sanitize(Some("<img src=x onerror=alert(1)>")), "img src=x onerror=alert(1)");
        assert_eq!(sanitize(Some(" <<>> ")), "");
    }

    #[test]
    fn test_sanitize_never_leaves_brackets() {
        let inputs = ["<", ">", "a<b>c", " <x> ", "<<<>>>", "ok", "é<ü>ñ"];
        for input in inputs {
            let out = sanitize(Some(input));
            assert!(!out.contains('<') && !out.contains('>'), "{input:?} -> {out:?}");
        }
    }

    #[test]
    fn test_honeypot_detection() {
        let body = json!({"phone": "555", "website": "http://spam.example"});
        assert_eq!(honeypot_field(body.as_object().unwrap()), Some("website"));

        let body = json!({"phone": "555", "company_website": "x"});
        assert_eq!(honeypot_field(body.as_object().unwrap()), Some("company_website"));
    }

    #[test]
    fn test_honeypot_ignores_blank_and_null() {
        let body = json!({"phone": "555", "website": "   ", "url": null, "homepage": ""});
        assert_eq!(honeypot_field(body.as_object().unwrap()), None);
    }

    #[test]
    fn test_honeypot_non_string_value_counts() {
        let body = json!({"phone": "555", "url": 1});
        assert_eq!(honeypot_field(body.as_object().unwrap()), Some("url"));
    }
}

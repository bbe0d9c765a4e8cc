//! Hint extraction from the initial GET response.
//!
//! The username suffix the API expects is undocumented; the service is
//! suspected to leak it through a response header or cookie, so every name
//! is scanned for a fixed set of keywords before the date-derived guesses
//! in [`crate::credentials`] take over.

use chrono::{Duration, NaiveDateTime};

/// Case-insensitive substrings that mark a header or cookie name as a
/// possible auth hint.
pub const HINT_KEYWORDS: &[&str] = &["suffix", "code", "auth", "token", "fastprint"];

/// The only accepted `Date` header shape, e.g. `Tue, 02 Jan 2024 13:45:10 GMT`.
const DATE_FORMAT: &str = "%a, %d %b %Y %H:%M:%S GMT";

/// Suffix hints and the authoritative server time recovered from the
/// initial GET response.
#[derive(Debug, Clone)]
pub struct ResponseHints {
    /// Server clock, already shifted backward by the configured offset.
    pub server_time: NaiveDateTime,
    pub header_suffix: Option<String>,
    pub cookie_suffix: Option<String>,
}

/// True when the name contains any of the known hint keywords.
pub fn is_hint_name(name: &str) -> bool {
    let lower = name.to_ascii_lowercase();
    HINT_KEYWORDS.iter().any(|keyword| lower.contains(keyword))
}

/// Scans `(name, value)` pairs (headers or cookies) for a leaked suffix.
/// Every name matching a hint keyword is logged; the first name containing
/// `suffix` yields the captured value.
pub fn find_suffix_hint<'a, I>(source: &str, pairs: I) -> Option<String>
where
    I: IntoIterator<Item = (&'a str, &'a str)>,
{
    let mut found = None;
    for (name, value) in pairs {
        if is_hint_name(name) {
            tracing::info!(source, name, value, "Possible auth hint");
            if found.is_none() && name.to_ascii_lowercase().contains("suffix") {
                found = Some(value.to_string());
            }
        }
    }
    found
}

/// Body format detected during inspection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BodyFormat {
    Json,
    Text,
}

/// Checks the response body for the literal `suffix`. JSON bodies are
/// re-serialized first so the check covers keys and values uniformly.
/// Diagnostic only; no value is ever extracted from the body.
pub fn inspect_body(body: &str) -> (BodyFormat, bool) {
    match serde_json::from_str::<serde_json::Value>(body) {
        Ok(value) => {
            let rendered = value.to_string();
            (BodyFormat::Json, rendered.to_ascii_lowercase().contains("suffix"))
        }
        Err(_) => (BodyFormat::Text, body.to_ascii_lowercase().contains("suffix")),
    }
}

/// Parses the `Date` header and shifts it backward by `offset_hours` to
/// obtain the clock the credentials are derived from.
pub fn parse_server_date(
    raw: &str,
    offset_hours: i64,
) -> Result<NaiveDateTime, chrono::ParseError> {
    let parsed = NaiveDateTime::parse_from_str(raw.trim(), DATE_FORMAT)?;
    Ok(parsed - Duration::hours(offset_hours))
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;

    #[test]
    fn parse_server_date_applies_backward_offset() {
        let parsed = parse_server_date("Tue, 02 Jan 2024 13:45:10 GMT", 1).unwrap();
        let expected = NaiveDate::from_ymd_opt(2024, 1, 2)
            .unwrap()
            .and_hms_opt(12, 45, 10)
            .unwrap();
        assert_eq!(parsed, expected);
    }

    #[test]
    fn parse_server_date_crosses_midnight_backward() {
        let parsed = parse_server_date("Mon, 01 Jan 2024 00:30:00 GMT", 1).unwrap();
        let expected = NaiveDate::from_ymd_opt(2023, 12, 31)
            .unwrap()
            .and_hms_opt(23, 30, 0)
            .unwrap();
        assert_eq!(parsed, expected);
    }

    #[test]
    fn parse_server_date_rejects_other_formats() {
        assert!(parse_server_date("2024-01-02T13:45:10Z", 1).is_err());
        assert!(parse_server_date("", 1).is_err());
    }

    #[test]
    fn suffix_header_is_captured_case_insensitively() {
        let pairs = vec![
            ("Content-Type", "application/json"),
            ("X-Auth-Suffix", "C99"),
        ];
        assert_eq!(find_suffix_hint("header", pairs), Some("C99".to_string()));
    }

    #[test]
    fn keyword_without_suffix_is_not_captured() {
        let pairs = vec![("X-Fastprint-Token", "abc"), ("Server", "nginx")];
        assert_eq!(find_suffix_hint("header", pairs), None);
    }

    #[test]
    fn first_suffix_name_wins() {
        let pairs = vec![("login-suffix", "C11"), ("other-suffix", "C12")];
        assert_eq!(find_suffix_hint("cookie", pairs), Some("C11".to_string()));
    }

    #[test]
    fn hint_names_match_known_keywords() {
        assert!(is_hint_name("X-Fastprint-Code"));
        assert!(is_hint_name("authorization"));
        assert!(!is_hint_name("Content-Length"));
    }

    #[test]
    fn body_inspection_detects_format_and_keyword() {
        assert_eq!(
            inspect_body(r#"{"hint": "the SUFFIX is C22"}"#),
            (BodyFormat::Json, true)
        );
        assert_eq!(inspect_body("<html>login</html>"), (BodyFormat::Text, false));
        assert_eq!(inspect_body("ask about the suffix"), (BodyFormat::Text, true));
    }
}

//! Credential derivation from the server clock.
//!
//! The password format is fixed and documented by the recruiters; the
//! username suffix is not, so a prioritized list of guesses is derived
//! from the same clock. Everything here is a pure function of the server
//! time plus whatever hints the GET response leaked.

use chrono::{Datelike, NaiveDateTime};
use md5::{Digest, Md5};

use crate::config::ApiConfig;
use crate::hints::ResponseHints;

type SuffixFn = fn(NaiveDateTime) -> String;

/// Date-derived suffix guesses, tried in this order after any leaked
/// hints. Adding, removing, or reordering an entry never touches the
/// probing loop. The `day + 20` arithmetic matches the observed `C22`
/// suffix on day 2 and may drift if the service changes its rule.
const DATE_STRATEGIES: &[(&str, SuffixFn)] = &[
    ("day of year", |time| format!("C{:02}", time.ordinal())),
    ("week of year", |time| format!("C{:02}", time.iso_week().week())),
    ("day + 20", |time| format!("C{:02}", time.day() + 20)),
    ("day + month", |time| format!("C{:02}", time.day() + time.month())),
    ("day", |time| format!("C{:02}", time.day())),
];

/// One (strategy, suffix, username) guess to present to the API.
#[derive(Debug, Clone)]
pub struct Candidate {
    pub strategy: &'static str,
    pub suffix: String,
    pub username: String,
}

/// The single derived password and every username candidate, in
/// priority order. Computed once per run.
#[derive(Debug, Clone)]
pub struct Credentials {
    pub password_raw: String,
    pub password_hash: String,
    pub candidates: Vec<Candidate>,
}

/// Derives the password and the ordered candidate list from the server
/// time and the hints recovered during inspection. The configured
/// fallback suffix is always appended, so the list is never empty.
pub fn derive(hints: &ResponseHints, api: &ApiConfig) -> Credentials {
    let time = hints.server_time;
    let day = time.day();
    let month = time.month();
    let year = time.year() % 100;

    let password_raw = format!("{}-{day:02}-{month:02}-{year:02}", api.password_prefix);
    let password_hash = md5_hex(&password_raw);

    let mut candidates = Vec::new();
    let mut push = |strategy: &'static str, suffix: String| {
        let username = format!("{}{day:02}{month:02}{year:02}{suffix}", api.username_prefix);
        candidates.push(Candidate {
            strategy,
            suffix,
            username,
        });
    };

    if let Some(suffix) = &hints.header_suffix {
        push("header", suffix.clone());
    }
    if let Some(suffix) = &hints.cookie_suffix {
        push("cookie", suffix.clone());
    }
    for (strategy, derive_suffix) in DATE_STRATEGIES.iter().copied() {
        push(strategy, derive_suffix(time));
    }
    push("fallback", api.fallback_suffix.clone());

    Credentials {
        password_raw,
        password_hash,
        candidates,
    }
}

/// Lowercase hex MD5, the digest format the API expects for passwords.
fn md5_hex(input: &str) -> String {
    Md5::digest(input.as_bytes())
        .iter()
        .map(|byte| format!("{byte:02x}"))
        .collect()
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;

    fn noon(year: i32, month: u32, day: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(year, month, day)
            .unwrap()
            .and_hms_opt(12, 0, 0)
            .unwrap()
    }

    fn hints_at(server_time: NaiveDateTime) -> ResponseHints {
        ResponseHints {
            server_time,
            header_suffix: None,
            cookie_suffix: None,
        }
    }

    #[test]
    fn password_matches_known_vector() {
        let credentials = derive(&hints_at(noon(2024, 1, 2)), &ApiConfig::default());
        assert_eq!(credentials.password_raw, "bisacoding-02-01-24");
        assert_eq!(
            credentials.password_hash,
            "8af694bac36acd6f05609cc338c28175"
        );
    }

    #[test]
    fn derivation_is_deterministic() {
        let api = ApiConfig::default();
        let first = derive(&hints_at(noon(2025, 3, 15)), &api);
        let second = derive(&hints_at(noon(2025, 3, 15)), &api);
        assert_eq!(first.password_hash, second.password_hash);
        assert_eq!(
            first.password_hash,
            "5a21e31e87725b05523573073af0587d"
        );
    }

    #[test]
    fn candidate_order_is_fixed_with_hints_first() {
        let hints = ResponseHints {
            server_time: noon(2024, 1, 2),
            header_suffix: Some("C90".to_string()),
            cookie_suffix: Some("C91".to_string()),
        };
        let credentials = derive(&hints, &ApiConfig::default());
        let strategies: Vec<_> = credentials
            .candidates
            .iter()
            .map(|candidate| candidate.strategy)
            .collect();
        assert_eq!(
            strategies,
            vec![
                "header",
                "cookie",
                "day of year",
                "week of year",
                "day + 20",
                "day + month",
                "day",
                "fallback",
            ]
        );
        assert_eq!(credentials.candidates[0].suffix, "C90");
        assert_eq!(credentials.candidates[1].suffix, "C91");
    }

    #[test]
    fn fallback_is_always_last() {
        let credentials = derive(&hints_at(noon(2024, 1, 2)), &ApiConfig::default());
        let last = credentials.candidates.last().unwrap();
        assert_eq!(last.strategy, "fallback");
        assert_eq!(last.suffix, "C22");
        assert!(!credentials.candidates.is_empty());
    }

    #[test]
    fn day_strategy_username_matches_known_vector() {
        let credentials = derive(&hints_at(noon(2024, 1, 2)), &ApiConfig::default());
        let day = credentials
            .candidates
            .iter()
            .find(|candidate| candidate.strategy == "day")
            .unwrap();
        assert_eq!(day.suffix, "C02");
        assert_eq!(day.username, "tesprogrammer020124C02");
    }

    #[test]
    fn date_strategies_cover_the_documented_arithmetic() {
        let credentials = derive(&hints_at(noon(2025, 3, 15)), &ApiConfig::default());
        let suffixes: Vec<_> = credentials
            .candidates
            .iter()
            .map(|candidate| candidate.suffix.as_str())
            .collect();
        // day-of-year 74, ISO week 11, 15+20, 15+3, day 15, fallback
        assert_eq!(suffixes, vec!["C74", "C11", "C35", "C18", "C15", "C22"]);
    }

    #[test]
    fn suffixes_keep_all_digits_past_two() {
        let credentials = derive(&hints_at(noon(2024, 12, 31)), &ApiConfig::default());
        let day_of_year = credentials
            .candidates
            .iter()
            .find(|candidate| candidate.strategy == "day of year")
            .unwrap();
        assert_eq!(day_of_year.suffix, "C366");
    }
}

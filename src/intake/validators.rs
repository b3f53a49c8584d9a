//! Field validators. All of them are total: bad or missing input is `false`,
//! never a panic or an error.

use std::sync::LazyLock;

use regex::Regex;

static EMAIL: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"^[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}$").ok());

static PHONE: LazyLock<Option<Regex>> = LazyLock::new(|| Regex::new(r"^\+?1?\d{9,15}$").ok());

static NUMBER: LazyLock<Option<Regex>> = LazyLock::new(|| Regex::new(r"(-?)(\d+(?:\.\d+)?)").ok());

fn matches(pattern: &LazyLock<Option<Regex>>, s: &str) -> bool {
    pattern.as_ref().is_some_and(|re| re.is_match(s))
}

pub fn validate_email(s: &str) -> bool {
    matches(&EMAIL, s.trim())
}

pub fn validate_phone(s: &str) -> bool {
    matches(&PHONE, s.trim())
}

pub fn validate_nonempty(s: &str) -> bool {
    !s.trim().is_empty()
}

pub fn validate_numeric_experience(s: &str) -> bool {
    years_of_experience(s).is_some()
}

/// The first numeral in `s`, e.g. `5` for "5 years" or `2.5` for "about 2.5".
/// A leading minus sign disqualifies it.
pub fn years_of_experience(s: &str) -> Option<f64> {
    let captures = NUMBER.as_ref()?.captures(s)?;
    if !captures.get(1)?.as_str().is_empty() {
        return None;
    }
    captures.get(2)?.as_str().parse().ok()
}

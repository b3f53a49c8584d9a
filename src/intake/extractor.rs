//! Best-effort recovery of profile fields from free-form text.
//!
//! Two sources are looked at: a JSON object embedded in the text (a fenced
//! ```json block, or a message that is nothing but an object) and contact
//! details written anywhere in plain prose. Nothing here mutates the profile;
//! callers apply the returned [`ProfileUpdates`].

use std::sync::LazyLock;

use regex::Regex;
use serde_json::{Map, Value};
use tracing::debug;

use super::error::ExtractionFailure;
use super::profile::{parse_tech_stack, CandidateProfile, ProfileField};

static EMAIL_CANDIDATE: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Za-z]{2,}").ok());

static PHONE_CANDIDATE: LazyLock<Option<Regex>> = LazyLock::new(|| Regex::new(r"\+?\d+").ok());

static JSON_FENCE: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"(?s)```(?:json)?\s*(\{.*?\})\s*```").ok());

/// Keys accepted for each field in structured content.
const FIELD_KEYS: [(ProfileField, &[&str]); 6] = [
    (ProfileField::Name, &["name", "full_name"]),
    (ProfileField::Email, &["email"]),
    (ProfileField::Phone, &["phone", "phone_number"]),
    (ProfileField::Experience, &["experience", "years_of_experience"]),
    (ProfileField::Location, &["location"]),
    (ProfileField::Position, &["position", "desired_position", "role"]),
];

/// Proposed values for fields the profile does not hold yet.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProfileUpdates {
    pub fields: Vec<(ProfileField, String)>,
    pub tech_stack: Option<Vec<String>>,
}

impl ProfileUpdates {
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty() && self.tech_stack.is_none()
    }

    pub fn get(&self, field: ProfileField) -> Option<&str> {
        self.fields.iter().find(|(f, _)| *f == field).map(|(_, v)| v.as_str())
    }

    fn propose(&mut self, field: ProfileField, value: String) {
        if self.get(field).is_none() {
            self.fields.push((field, value));
        }
    }

    /// Adds the proposals from `other` for fields not proposed yet.
    pub fn merge(&mut self, other: ProfileUpdates) {
        for (field, value) in other.fields {
            self.propose(field, value);
        }
        if self.tech_stack.is_none() {
            self.tech_stack = other.tech_stack;
        }
    }

    /// Applies the updates first-valid-wins. Returns the fields that changed.
    pub fn apply(self, profile: &mut CandidateProfile) -> Vec<ProfileField> {
        let mut applied = Vec::new();
        for (field, value) in self.fields {
            if profile.fill(field, &value) {
                applied.push(field);
            }
        }
        if let Some(stack) = self.tech_stack {
            profile.fill_tech_stack(stack);
        }
        applied
    }
}

/// Every update recoverable from `raw_text`. Unusable structured content is
/// logged and treated as carrying no information.
pub fn extract(raw_text: &str, profile: &CandidateProfile) -> ProfileUpdates {
    let mut updates = parse_structured(raw_text, profile).unwrap_or_else(|failure| {
        debug!("Ignoring structured content: {}", failure);
        ProfileUpdates::default()
    });
    updates.merge(scan_contacts(raw_text, profile));
    updates
}

/// Updates from a JSON object in `raw_text`. Text without any structured
/// content yields no updates; structured content that does not parse is an
/// [`ExtractionFailure`].
pub fn parse_structured(raw_text: &str, profile: &CandidateProfile) -> Result<ProfileUpdates, ExtractionFailure> {
    let Some(candidate) = structured_candidate(raw_text) else {
        return Ok(ProfileUpdates::default());
    };

    let value: Value = serde_json::from_str(candidate).map_err(ExtractionFailure::Malformed)?;
    let Value::Object(object) = value else {
        return Err(ExtractionFailure::NotAnObject);
    };

    let mut updates = ProfileUpdates::default();
    for (field, keys) in FIELD_KEYS {
        if profile.has(field) {
            continue;
        }
        let value = keys.iter().find_map(|key| scalar_text(&object, key));
        if let Some(value) = value.filter(|v| field.validate(v)) {
            updates.propose(field, value.trim().to_string());
        }
    }

    if profile.tech_stack.is_empty() {
        let stack = match object.get("tech_stack") {
            Some(Value::Array(items)) => items
                .iter()
                .filter_map(Value::as_str)
                .map(str::trim)
                .filter(|tech| !tech.is_empty())
                .map(String::from)
                .collect(),
            Some(Value::String(list)) => parse_tech_stack(list),
            _ => Vec::new(),
        };
        if !stack.is_empty() {
            updates.tech_stack = Some(stack);
        }
    }

    Ok(updates)
}

/// `reply` without its fenced JSON blocks, for showing to the candidate.
pub fn strip_structured(reply: &str) -> String {
    match JSON_FENCE.as_ref() {
        Some(fence) => fence.replace_all(reply, "").trim().to_string(),
        None => reply.trim().to_string(),
    }
}

fn structured_candidate(raw_text: &str) -> Option<&str> {
    if let Some(fenced) = JSON_FENCE
        .as_ref()
        .and_then(|re| re.captures(raw_text))
        .and_then(|captures| captures.get(1))
    {
        return Some(fenced.as_str());
    }

    let trimmed = raw_text.trim();
    (trimmed.starts_with('{') && trimmed.ends_with('}')).then_some(trimmed)
}

fn scalar_text(object: &Map<String, Value>, key: &str) -> Option<String> {
    match object.get(key)? {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// Email addresses and phone numbers written anywhere in `raw_text`.
pub fn scan_contacts(raw_text: &str, profile: &CandidateProfile) -> ProfileUpdates {
    let mut updates = ProfileUpdates::default();

    if !profile.has(ProfileField::Email) {
        if let Some(email) = EMAIL_CANDIDATE
            .as_ref()
            .and_then(|re| re.find_iter(raw_text).map(|m| m.as_str()).find(|e| ProfileField::Email.validate(e)))
        {
            updates.propose(ProfileField::Email, email.to_string());
        }
    }

    if !profile.has(ProfileField::Phone) {
        if let Some(phone) = PHONE_CANDIDATE.as_ref().and_then(|re| {
            re.find_iter(raw_text)
                .filter(|m| standalone(raw_text, m.start(), m.end()))
                .map(|m| m.as_str())
                .find(|p| ProfileField::Phone.validate(p))
        }) {
            updates.propose(ProfileField::Phone, phone.to_string());
        }
    }

    updates
}

/// A digit run that is not part of a larger word or an email address.
fn standalone(text: &str, start: usize, end: usize) -> bool {
    let before = text[..start].chars().next_back();
    let after = text[end..].chars().next();
    let joined = |c: char| c.is_alphanumeric() || c == '_' || c == '@';
    !before.is_some_and(|c| joined(c) || c == '.') && !after.is_some_and(joined)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn finds_contacts_in_prose() {
        let updates = scan_contacts(
            "Sure, it's ada.l@example.com and my number is +15551234567.",
            &CandidateProfile::default(),
        );
        assert_eq!(updates.get(ProfileField::Email), Some("ada.l@example.com"));
        assert_eq!(updates.get(ProfileField::Phone), Some("+15551234567"));
    }

    #[test]
    fn digits_inside_emails_are_not_phones() {
        let updates = scan_contacts("reach me at john5551234567@example.com", &CandidateProfile::default());
        assert_eq!(updates.get(ProfileField::Phone), None);
        assert_eq!(updates.get(ProfileField::Email), Some("john5551234567@example.com"));
    }

    #[test]
    fn known_fields_are_never_proposed_again() {
        let mut profile = CandidateProfile::default();
        profile.fill(ProfileField::Email, "first@example.com");

        let updates = extract("actually use second@example.com", &profile);
        assert!(updates.get(ProfileField::Email).is_none());

        updates.apply(&mut profile);
        assert_eq!(profile.email.as_deref(), Some("first@example.com"));
    }

    #[test]
    fn structured_reply_fills_missing_fields() {
        let reply = "Noted!\n```json\n{\"name\": \"Ada\", \"experience\": 4, \"tech_stack\": \"Rust, SQL\"}\n```";
        let updates = parse_structured(reply, &CandidateProfile::default()).unwrap();

        assert_eq!(updates.get(ProfileField::Name), Some("Ada"));
        assert_eq!(updates.get(ProfileField::Experience), Some("4"));
        assert_eq!(updates.tech_stack, Some(vec!["Rust".to_string(), "SQL".to_string()]));
    }

    #[test]
    fn fenced_details_are_hidden_from_the_candidate() {
        let reply = "Thanks! What's your phone number?\n\n```json\n{\"location\": \"Berlin\"}\n```\n";
        assert_eq!(strip_structured(reply), "Thanks! What's your phone number?");
        assert_eq!(strip_structured("No block here. "), "No block here.");
    }

    #[test]
    fn invalid_structured_contacts_are_dropped_silently() {
        let updates = parse_structured(r#"{"email": "nope", "phone": "12"}"#, &CandidateProfile::default()).unwrap();
        assert!(updates.is_empty());
    }

    #[test]
    fn malformed_structured_content_is_a_failure_but_extract_yields_nothing() {
        let raw = "{\"name\": \"Ada\", }";
        assert!(matches!(
            parse_structured(raw, &CandidateProfile::default()),
            Err(ExtractionFailure::Malformed(_))
        ));
        assert!(extract(raw, &CandidateProfile::default()).is_empty());
    }

    #[test]
    fn plain_text_has_no_structured_content() {
        let updates = parse_structured("I have 5 years of experience", &CandidateProfile::default()).unwrap();
        assert!(updates.is_empty());
    }

    #[test]
    fn extraction_is_idempotent_once_fields_are_valid() {
        let mut profile = CandidateProfile::default();
        extract(r#"{"name": "Ada", "email": "ada@example.com"}"#, &profile).apply(&mut profile);
        let snapshot = profile.clone();

        let later = extract(r#"{"name": "Grace", "email": "grace@example.com", "phone": "5551234567"}"#, &profile);
        later.apply(&mut profile);

        assert_eq!(profile.name, snapshot.name);
        assert_eq!(profile.email, snapshot.email);
        assert_eq!(profile.phone.as_deref(), Some("5551234567"));
    }
}

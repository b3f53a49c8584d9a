use std::fmt;

use serde::{Deserialize, Serialize};

use super::validators::{validate_email, validate_nonempty, validate_numeric_experience, validate_phone};

/// The single-valued text fields of a profile.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProfileField {
    Name,
    Email,
    Phone,
    Experience,
    Location,
    Position,
}

impl ProfileField {
    pub const ALL: [ProfileField; 6] = [
        ProfileField::Name,
        ProfileField::Email,
        ProfileField::Phone,
        ProfileField::Experience,
        ProfileField::Location,
        ProfileField::Position,
    ];

    /// Key used in persisted records and structured model output.
    pub fn key(self) -> &'static str {
        match self {
            ProfileField::Name => "name",
            ProfileField::Email => "email",
            ProfileField::Phone => "phone",
            ProfileField::Experience => "experience",
            ProfileField::Location => "location",
            ProfileField::Position => "position",
        }
    }

    pub fn validate(self, value: &str) -> bool {
        match self {
            ProfileField::Email => validate_email(value),
            ProfileField::Phone => validate_phone(value),
            ProfileField::Experience => validate_numeric_experience(value),
            ProfileField::Name | ProfileField::Location | ProfileField::Position => validate_nonempty(value),
        }
    }
}

impl fmt::Display for ProfileField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// Technical questions and the candidate's answers, paired by position.
///
/// Answers never outnumber questions; the next answer always belongs to the
/// oldest unanswered question.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawInterview")]
pub struct Interview {
    questions: Vec<String>,
    answers: Vec<String>,
}

#[derive(Deserialize)]
struct RawInterview {
    #[serde(default)]
    questions: Vec<String>,
    #[serde(default)]
    answers: Vec<String>,
}

impl TryFrom<RawInterview> for Interview {
    type Error = String;

    fn try_from(raw: RawInterview) -> Result<Self, Self::Error> {
        if raw.answers.len() > raw.questions.len() {
            return Err(format!(
                "{} answers recorded for {} questions",
                raw.answers.len(),
                raw.questions.len()
            ));
        }
        Ok(Self { questions: raw.questions, answers: raw.answers })
    }
}

impl Interview {
    pub fn questions(&self) -> &[String] {
        &self.questions
    }

    pub fn answered(&self) -> usize {
        self.answers.len()
    }

    pub fn has_pending_question(&self) -> bool {
        self.questions.len() > self.answers.len()
    }

    /// The oldest question still waiting for an answer.
    pub fn pending_question(&self) -> Option<&str> {
        self.questions.get(self.answers.len()).map(String::as_str)
    }

    pub fn contains_question(&self, question: &str) -> bool {
        self.questions.iter().any(|q| q == question)
    }

    pub(crate) fn push_question(&mut self, question: String) {
        self.questions.push(question);
    }

    /// Records `answer` against the oldest pending question. Returns false,
    /// and records nothing, when no question is pending.
    pub(crate) fn push_answer(&mut self, answer: String) -> bool {
        if !self.has_pending_question() {
            return false;
        }
        self.answers.push(answer);
        true
    }

    /// Each question with its answer, if it has one yet.
    pub fn pairs(&self) -> impl Iterator<Item = (&str, Option<&str>)> {
        self.questions
            .iter()
            .enumerate()
            .map(|(i, q)| (q.as_str(), self.answers.get(i).map(String::as_str)))
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CandidateProfile {
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub experience: Option<String>,
    pub position: Option<String>,
    pub location: Option<String>,
    #[serde(default)]
    pub tech_stack: Vec<String>,
    #[serde(default)]
    pub interview: Interview,
    pub evaluation_summary: Option<String>,
}

impl CandidateProfile {
    pub fn get(&self, field: ProfileField) -> Option<&str> {
        self.slot(field).as_deref()
    }

    fn slot(&self, field: ProfileField) -> &Option<String> {
        match field {
            ProfileField::Name => &self.name,
            ProfileField::Email => &self.email,
            ProfileField::Phone => &self.phone,
            ProfileField::Experience => &self.experience,
            ProfileField::Location => &self.location,
            ProfileField::Position => &self.position,
        }
    }

    fn slot_mut(&mut self, field: ProfileField) -> &mut Option<String> {
        match field {
            ProfileField::Name => &mut self.name,
            ProfileField::Email => &mut self.email,
            ProfileField::Phone => &mut self.phone,
            ProfileField::Experience => &mut self.experience,
            ProfileField::Location => &mut self.location,
            ProfileField::Position => &mut self.position,
        }
    }

    /// True once the field holds a value that passes its validator.
    pub fn has(&self, field: ProfileField) -> bool {
        self.get(field).is_some_and(|value| field.validate(value))
    }

    /// Binds `value` unless the field already holds a valid value or `value`
    /// itself fails validation. First valid value wins.
    pub fn fill(&mut self, field: ProfileField, value: &str) -> bool {
        let value = value.trim();
        if self.has(field) || !field.validate(value) {
            return false;
        }
        *self.slot_mut(field) = Some(value.to_string());
        true
    }

    pub fn fill_tech_stack(&mut self, stack: Vec<String>) -> bool {
        if !self.tech_stack.is_empty() || stack.is_empty() {
            return false;
        }
        self.tech_stack = stack;
        true
    }

    pub fn missing_fields(&self) -> Vec<ProfileField> {
        ProfileField::ALL.into_iter().filter(|f| !self.has(*f)).collect()
    }
}

/// Splits a comma-separated stack, trimming entries and dropping empties.
pub fn parse_tech_stack(input: &str) -> Vec<String> {
    input
        .split(',')
        .map(str::trim)
        .filter(|tech| !tech.is_empty())
        .map(String::from)
        .collect()
}

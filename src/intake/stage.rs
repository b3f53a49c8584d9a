use std::fmt;
use std::str::FromStr;

use tracing::{debug, warn};

use super::error::{IntakeError, Result};
use super::profile::{parse_tech_stack, CandidateProfile, Interview, ProfileField};
use super::prompts;

/// Minimum answered questions before a completion marker is honored.
pub const MIN_ANSWERED_QUESTIONS: usize = 3;

/// Steps of the interview, in the order they are visited.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Greeting,
    Name,
    Email,
    Phone,
    Experience,
    Location,
    Position,
    TechStack,
    TechAssessment,
    Complete,
}

impl Stage {
    pub fn as_str(self) -> &'static str {
        match self {
            Stage::Greeting => "greeting",
            Stage::Name => "name",
            Stage::Email => "email",
            Stage::Phone => "phone",
            Stage::Experience => "experience",
            Stage::Location => "location",
            Stage::Position => "position",
            Stage::TechStack => "tech_stack",
            Stage::TechAssessment => "tech_assessment",
            Stage::Complete => "complete",
        }
    }

    /// The profile field this stage collects, for the single-field stages.
    pub fn field(self) -> Option<ProfileField> {
        match self {
            Stage::Name => Some(ProfileField::Name),
            Stage::Email => Some(ProfileField::Email),
            Stage::Phone => Some(ProfileField::Phone),
            Stage::Experience => Some(ProfileField::Experience),
            Stage::Location => Some(ProfileField::Location),
            Stage::Position => Some(ProfileField::Position),
            _ => None,
        }
    }

    fn successor(self) -> Stage {
        match self {
            Stage::Greeting => Stage::Name,
            Stage::Name => Stage::Email,
            Stage::Email => Stage::Phone,
            Stage::Phone => Stage::Experience,
            Stage::Experience => Stage::Location,
            Stage::Location => Stage::Position,
            Stage::Position => Stage::TechStack,
            Stage::TechStack => Stage::TechAssessment,
            Stage::TechAssessment | Stage::Complete => Stage::Complete,
        }
    }

    fn is_satisfied_by(self, profile: &CandidateProfile) -> bool {
        match self {
            Stage::TechStack => !profile.tech_stack.is_empty(),
            stage => stage.field().is_some_and(|field| profile.has(field)),
        }
    }

    /// The next stage whose data is still missing. Stages already covered by
    /// opportunistic extraction are skipped.
    pub fn next_open(self, profile: &CandidateProfile) -> Stage {
        let mut next = self.successor();
        while next.is_satisfied_by(profile) {
            next = next.successor();
        }
        next
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Stage {
    type Err = IntakeError;

    fn from_str(s: &str) -> Result<Self> {
        let stage = match s {
            "greeting" => Stage::Greeting,
            "name" => Stage::Name,
            "email" => Stage::Email,
            "phone" => Stage::Phone,
            "experience" => Stage::Experience,
            "location" => Stage::Location,
            "position" => Stage::Position,
            "tech_stack" => Stage::TechStack,
            "tech_assessment" => Stage::TechAssessment,
            "complete" => Stage::Complete,
            other => return Err(IntakeError::InvalidState(other.to_string())),
        };
        Ok(stage)
    }
}

/// A value accepted from the candidate's message.
#[derive(Debug, Clone, PartialEq)]
pub enum Binding {
    Field(ProfileField, String),
    TechStack(Vec<String>),
    Answer(String),
}

impl Binding {
    pub fn apply(self, profile: &mut CandidateProfile) -> bool {
        match self {
            Binding::Field(field, value) => profile.fill(field, &value),
            Binding::TechStack(stack) => profile.fill_tech_stack(stack),
            Binding::Answer(answer) => super::questions::record_answer(&answer, &mut profile.interview),
        }
    }
}

/// What the next assistant message has to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NextPrompt {
    Ask(Stage),
    Clarify(Stage),
    Assess,
}

impl NextPrompt {
    /// Step guidance for the model, rendered against the already-updated profile.
    pub fn guidance(self, profile: &CandidateProfile, required_answers: usize) -> String {
        match self {
            NextPrompt::Ask(stage) => prompts::next_question_guidance(stage),
            NextPrompt::Clarify(stage) => prompts::clarification_guidance(stage),
            NextPrompt::Assess => prompts::assessment_guidance(profile, required_answers),
        }
    }

    /// Text shown to the candidate when the model could not be reached.
    pub fn fallback(self, profile: &CandidateProfile) -> String {
        match self {
            NextPrompt::Ask(stage) | NextPrompt::Clarify(stage) => prompts::stage_question(stage).to_string(),
            NextPrompt::Assess => match profile.interview.pending_question() {
                Some(question) => format!("Let's continue with: {}", question),
                None => "Please send your last answer again so we can continue.".to_string(),
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Advance {
    pub binding: Option<Binding>,
    pub next: Stage,
    /// The input failed validation and the same stage is asked again.
    pub retry: bool,
    pub prompt: NextPrompt,
}

#[derive(Debug, Clone)]
pub struct StageController {
    completion_marker: String,
    min_answered: usize,
}

impl Default for StageController {
    fn default() -> Self {
        Self {
            completion_marker: prompts::COMPLETION_MARKER.to_string(),
            min_answered: MIN_ANSWERED_QUESTIONS,
        }
    }
}

impl StageController {
    pub fn min_answered(&self) -> usize {
        self.min_answered
    }

    /// Validates `user_input` for `stage` and picks the stage and prompt that
    /// follow. Invalid input keeps the stage and asks again, without limit.
    pub fn advance(&self, stage: Stage, user_input: &str, profile: &CandidateProfile) -> Result<Advance> {
        let input = user_input.trim();

        let advance = match stage {
            Stage::Greeting => {
                let next = stage.next_open(profile);
                Advance { binding: None, next, retry: false, prompt: NextPrompt::Ask(next) }
            }
            Stage::TechStack => {
                let stack = parse_tech_stack(input);
                if stack.is_empty() {
                    skip_or_retry(stage, profile)
                } else {
                    let next = stage.next_open(profile);
                    Advance { binding: Some(Binding::TechStack(stack)), next, retry: false, prompt: prompt_for(next) }
                }
            }
            Stage::TechAssessment => {
                let binding = profile
                    .interview
                    .has_pending_question()
                    .then(|| Binding::Answer(input.to_string()));
                Advance { binding, next: stage, retry: false, prompt: NextPrompt::Assess }
            }
            Stage::Complete => return Err(IntakeError::InvalidState(stage.to_string())),
            field_stage => {
                let Some(field) = field_stage.field() else {
                    return Err(IntakeError::InvalidState(field_stage.to_string()));
                };
                if field.validate(input) {
                    let next = stage.next_open(profile);
                    Advance {
                        binding: Some(Binding::Field(field, input.to_string())),
                        next,
                        retry: false,
                        prompt: prompt_for(next),
                    }
                } else {
                    skip_or_retry(stage, profile)
                }
            }
        };

        debug!("Stage {} -> {} (retry: {})", stage, advance.next, advance.retry);
        Ok(advance)
    }

    /// Decides whether the assistant's reply ends the assessment. The marker
    /// only counts once enough questions have been answered.
    pub fn conclude(&self, stage: Stage, assistant_text: &str, interview: &Interview) -> Stage {
        if stage != Stage::TechAssessment || !assistant_text.contains(&self.completion_marker) {
            return stage;
        }
        if interview.answered() < self.min_answered {
            warn!(
                "Ignoring completion marker with {} of {} questions answered",
                interview.answered(),
                self.min_answered
            );
            return stage;
        }
        Stage::Complete
    }
}

/// Input that failed validation still moves on when extraction has already
/// filled the stage's data from the same message.
fn skip_or_retry(stage: Stage, profile: &CandidateProfile) -> Advance {
    if stage.is_satisfied_by(profile) {
        let next = stage.next_open(profile);
        return Advance { binding: None, next, retry: false, prompt: prompt_for(next) };
    }
    retry(stage)
}

fn retry(stage: Stage) -> Advance {
    Advance { binding: None, next: stage, retry: true, prompt: NextPrompt::Clarify(stage) }
}

fn prompt_for(stage: Stage) -> NextPrompt {
    match stage {
        Stage::TechAssessment => NextPrompt::Assess,
        other => NextPrompt::Ask(other),
    }
}

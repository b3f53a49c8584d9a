use std::fmt;
use std::path::PathBuf;

use tracing::{debug, error, info};

use super::conversation_state::ConversationState;
use super::error::Result;
use super::persistence::RecordStore;
use super::prompts;
use super::stage::{Stage, StageController};
use super::{extractor, questions};
use crate::text_generation::TextGenerator;

/// Something the operator should see besides the assistant's reply.
#[derive(Debug)]
pub enum Notice {
    GenerationFailed(String),
    Saved(PathBuf),
    SaveFailed(String),
}

impl fmt::Display for Notice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Notice::GenerationFailed(e) => write!(f, "Sorry, I encountered an error: {}", e),
            Notice::Saved(path) => write!(f, "Interview data saved to {}", path.display()),
            Notice::SaveFailed(e) => write!(
                f,
                "Could not save the interview ({}). Your responses may not have been fully captured.",
                e
            ),
        }
    }
}

/// The outcome of one user message.
#[derive(Debug)]
pub struct Turn {
    pub reply: String,
    pub notices: Vec<Notice>,
    pub stage: Stage,
}

/// Runs one interview turn at a time against a [`ConversationState`].
pub struct ConversationDriver {
    generator: Box<dyn TextGenerator>,
    controller: StageController,
    store: RecordStore,
    extraction: bool,
}

impl ConversationDriver {
    pub fn new(generator: Box<dyn TextGenerator>, store: RecordStore) -> Self {
        Self {
            generator,
            controller: StageController::default(),
            store,
            extraction: true,
        }
    }

    /// Toggles opportunistic extraction of fields ahead of their stage.
    pub fn with_extraction(mut self, enabled: bool) -> Self {
        self.extraction = enabled;
        self
    }

    pub fn generator_name(&self) -> &'static str {
        self.generator.name()
    }

    pub fn store(&self) -> &RecordStore {
        &self.store
    }

    /// Greets the candidate and opens the first stage. No model call.
    pub fn start(&self, state: &mut ConversationState) -> String {
        if state.stage == Stage::Greeting {
            state.stage = Stage::Greeting.next_open(&state.profile);
        }
        state.add_assistant_message(prompts::GREETING);
        prompts::GREETING.to_string()
    }

    /// Processes one user message to completion. Only a corrupted stage is
    /// an error; every other failure comes back as a [`Notice`].
    pub async fn handle(&self, state: &mut ConversationState, user_text: &str) -> Result<Turn> {
        let input = user_text.trim();

        if state.is_completed() {
            return Ok(Turn {
                reply: prompts::CLOSING.to_string(),
                notices: Vec::new(),
                stage: state.stage,
            });
        }

        state.add_user_message(input);

        if self.extraction {
            let applied = extractor::extract(input, &state.profile).apply(&mut state.profile);
            if !applied.is_empty() {
                debug!("Extracted ahead of stage {}: {:?}", state.stage, applied);
            }
        }

        let advance = self.controller.advance(state.stage, input, &state.profile)?;
        if let Some(binding) = advance.binding {
            if binding.apply(&mut state.profile) {
                debug!("Bound input for stage {}", state.stage);
            }
        }
        if advance.next != state.stage {
            info!("Interview stage {} -> {}", state.stage, advance.next);
        }
        state.stage = advance.next;

        let mut system = format!(
            "{}\n\n{}",
            prompts::SYSTEM_PROMPT,
            advance.prompt.guidance(&state.profile, self.controller.min_answered())
        );
        if self.extraction {
            system.push_str("\n\n");
            system.push_str(prompts::VOLUNTEERED_DETAILS);
        }

        let reply = match self.generator.generate(&system, state.get_messages()).await {
            Ok(reply) => reply,
            Err(e) => {
                error!("{} generation failed: {}", self.generator.name(), e);
                let fallback = advance.prompt.fallback(&state.profile);
                state.add_assistant_message(&fallback);
                return Ok(Turn {
                    reply: fallback,
                    notices: vec![Notice::GenerationFailed(e.to_string())],
                    stage: state.stage,
                });
            }
        };

        if self.extraction {
            match extractor::parse_structured(&reply, &state.profile) {
                Ok(updates) if !updates.is_empty() => {
                    let applied = updates.apply(&mut state.profile);
                    debug!("Assistant reply carried structured fields: {:?}", applied);
                }
                Ok(_) => {}
                Err(failure) => debug!("No updates from assistant reply: {}", failure),
            }
        }

        let mut reply = extractor::strip_structured(&reply);
        if reply.is_empty() {
            reply = advance.prompt.fallback(&state.profile);
        }

        let mut notices = Vec::new();
        if state.stage == Stage::TechAssessment {
            let added = questions::track(&reply, &mut state.profile.interview);
            if added > 0 {
                debug!("Recorded {} new technical question(s)", added);
            }

            state.stage = self.controller.conclude(state.stage, &reply, &state.profile.interview);
            if state.stage == Stage::Complete && state.mark_completed() {
                info!("Interview complete, persisting candidate record");
                match self.store.persist(&mut state.profile, self.generator.as_ref()).await {
                    Ok(path) => notices.push(Notice::Saved(path)),
                    Err(e) => {
                        error!("Failed to persist candidate record: {}", e);
                        notices.push(Notice::SaveFailed(e.to_string()));
                    }
                }
            }
        }

        state.add_assistant_message(&reply);

        Ok(Turn { reply, notices, stage: state.stage })
    }
}

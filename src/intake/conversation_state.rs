use super::profile::CandidateProfile;
use super::stage::Stage;
use crate::text_generation::Message;

/// Everything known about the one interview in progress.
#[derive(Debug, Clone)]
pub struct ConversationState {
    pub stage: Stage,
    messages: Vec<Message>,
    pub profile: CandidateProfile,
    completed: bool,
}

impl Default for ConversationState {
    fn default() -> Self {
        Self::new()
    }
}

impl ConversationState {
    pub fn new() -> Self {
        Self {
            stage: Stage::Greeting,
            messages: Vec::new(),
            profile: CandidateProfile::default(),
            completed: false,
        }
    }

    pub fn add_user_message(&mut self, message: &str) {
        self.messages.push(Message::user(message));
    }

    pub fn add_assistant_message(&mut self, message: &str) {
        self.messages.push(Message::assistant(message));
    }

    pub fn get_messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn is_completed(&self) -> bool {
        self.completed
    }

    /// Flags the interview as finished. True only for the call that flips it.
    pub fn mark_completed(&mut self) -> bool {
        !std::mem::replace(&mut self.completed, true)
    }

    pub fn clear(&mut self) {
        *self = Self::new();
    }
}

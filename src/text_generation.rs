use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Who said a line of the transcript.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Speaker {
    User,
    Assistant,
}

impl Speaker {
    pub fn as_str(self) -> &'static str {
        match self {
            Speaker::User => "user",
            Speaker::Assistant => "assistant",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub speaker: Speaker,
    pub text: String,
}

impl Message {
    pub fn user(text: impl Into<String>) -> Self {
        Self { speaker: Speaker::User, text: text.into() }
    }

    pub fn assistant(text: impl Into<String>) -> Self {
        Self { speaker: Speaker::Assistant, text: text.into() }
    }
}

#[derive(Debug, Error)]
pub enum GenerationError {
    #[error("{0} environment variable not set")]
    MissingApiKey(&'static str),

    #[error("invalid endpoint: {0}")]
    Endpoint(#[from] url::ParseError),

    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("API request failed with status {status}: {body}")]
    Api { status: u16, body: String },

    #[error("model returned an empty response")]
    Empty,
}

/// A backing completion model. Given a system instruction and the ordered
/// transcript, returns the assistant's next message as plain text.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    /// Provider name for logs and the status line.
    fn name(&self) -> &'static str;

    async fn generate(&self, system: &str, history: &[Message]) -> Result<String, GenerationError>;
}

#[cfg(test)]
pub mod testing {
    use std::collections::VecDeque;
    use std::sync::Mutex;

    use super::*;

    /// Replays canned responses in order and remembers every system prompt it saw.
    #[derive(Default)]
    pub struct ScriptedGenerator {
        replies: Mutex<VecDeque<Result<String, GenerationError>>>,
        pub systems: Mutex<Vec<String>>,
    }

    impl ScriptedGenerator {
        pub fn new<I>(replies: I) -> Self
        where
            I: IntoIterator<Item = Result<String, GenerationError>>,
        {
            Self {
                replies: Mutex::new(replies.into_iter().collect()),
                systems: Mutex::new(Vec::new()),
            }
        }

        pub fn replying(texts: &[&str]) -> Self {
            Self::new(texts.iter().map(|t| Ok(t.to_string())))
        }

        pub fn calls(&self) -> usize {
            self.systems.lock().unwrap().len()
        }
    }

    #[async_trait]
    impl TextGenerator for ScriptedGenerator {
        fn name(&self) -> &'static str {
            "scripted"
        }

        async fn generate(&self, system: &str, _history: &[Message]) -> Result<String, GenerationError> {
            self.systems.lock().unwrap().push(system.to_string());
            self.replies
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or(Err(GenerationError::Empty))
        }
    }
}

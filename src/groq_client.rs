use std::env;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, error};

use crate::text_generation::{GenerationError, Message, TextGenerator};

const API_URL: &str = "https://api.groq.com/openai/v1/chat/completions";

pub const DEFAULT_MODEL: &str = "llama-3.3-70b-versatile";

#[derive(Debug, Serialize, Deserialize)]
struct ChatMessage {
    role: String,
    content: String,
}

#[derive(Debug, Serialize)]
struct ChatCompletionRequest {
    model: String,
    messages: Vec<ChatMessage>,
    temperature: f32,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionChoice {
    message: ChatMessage,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<ChatCompletionChoice>,
}

/// OpenAI-compatible chat completions served by Groq.
pub struct GroqClient {
    api_key: String,
    model: String,
    client: reqwest::Client,
}

impl GroqClient {
    pub fn new(model: &str) -> Result<Self, GenerationError> {
        let api_key = env::var("GROQ_API_KEY")
            .map_err(|_| GenerationError::MissingApiKey("GROQ_API_KEY"))?;

        Ok(Self {
            api_key,
            model: model.to_string(),
            client: reqwest::Client::new(),
        })
    }

    fn request(&self, system: &str, history: &[Message]) -> ChatCompletionRequest {
        let mut messages = Vec::with_capacity(history.len() + 1);
        messages.push(ChatMessage { role: "system".into(), content: system.into() });
        messages.extend(history.iter().map(|message| ChatMessage {
            role: message.speaker.as_str().into(),
            content: message.text.clone(),
        }));

        ChatCompletionRequest {
            model: self.model.clone(),
            messages,
            temperature: 0.2,
        }
    }
}

#[async_trait]
impl TextGenerator for GroqClient {
    fn name(&self) -> &'static str {
        "groq"
    }

    async fn generate(&self, system: &str, history: &[Message]) -> Result<String, GenerationError> {
        let request = self.request(system, history);

        debug!("Sending {} messages to Groq model {}", request.messages.len(), request.model);

        let response = self.client.post(API_URL)
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await?;
            error!("Groq request failed with response: {}", body);
            return Err(GenerationError::Api { status: status.as_u16(), body });
        }

        let api_response: ChatCompletionResponse = response.json().await?;

        api_response
            .choices
            .into_iter()
            .next()
            .map(|choice| choice.message.content)
            .filter(|content| !content.trim().is_empty())
            .ok_or(GenerationError::Empty)
    }
}

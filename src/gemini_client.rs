use std::env;

use async_trait::async_trait;
use serde_json::{json, Value};
use tracing::{debug, error};
use url::Url;

use crate::text_generation::{GenerationError, Message, Speaker, TextGenerator};

const API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta/models";

pub const DEFAULT_MODEL: &str = "gemini-2.0-flash";

pub struct GeminiClient {
    api_key: String,
    model: String,
    client: reqwest::Client,
}

impl GeminiClient {
    pub fn new(model: &str) -> Result<Self, GenerationError> {
        let api_key = env::var("GEMINI_API_KEY")
            .map_err(|_| GenerationError::MissingApiKey("GEMINI_API_KEY"))?;

        Ok(Self {
            api_key,
            model: model.to_string(),
            client: reqwest::Client::new(),
        })
    }

    fn endpoint(&self) -> Result<Url, GenerationError> {
        let base = format!("{}/{}:generateContent", API_BASE, self.model);
        Ok(Url::parse_with_params(&base, &[("key", self.api_key.as_str())])?)
    }
}

#[async_trait]
impl TextGenerator for GeminiClient {
    fn name(&self) -> &'static str {
        "gemini"
    }

    async fn generate(&self, system: &str, history: &[Message]) -> Result<String, GenerationError> {
        let request_body = request_body(system, history);

        debug!("Sending request to Gemini API: {}", request_body);

        let response = self.client.post(self.endpoint()?)
            .json(&request_body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await?;
            error!("Gemini request failed with response: {}", body);
            return Err(GenerationError::Api { status: status.as_u16(), body });
        }

        let response_json: Value = response.json().await?;

        debug!("Received response from Gemini API: {}", response_json);

        response_text(&response_json).ok_or(GenerationError::Empty)
    }
}

fn request_body(system: &str, history: &[Message]) -> Value {
    // Gemini calls the assistant side "model".
    let contents = history.iter().map(|message| {
        let role = match message.speaker {
            Speaker::User => "user",
            Speaker::Assistant => "model",
        };
        json!({
            "role": role,
            "parts": [{ "text": message.text }]
        })
    }).collect::<Vec<_>>();

    json!({
        "systemInstruction": {
            "parts": [{ "text": system }]
        },
        "contents": contents,
        "generationConfig": {
            "temperature": 0.2,
            "topP": 0.8,
            "topK": 40,
            "maxOutputTokens": 2048
        }
    })
}

/// Concatenates the text parts of the first candidate, if there are any.
fn response_text(response_json: &Value) -> Option<String> {
    let parts = response_json
        .get("candidates")?
        .as_array()?
        .first()?
        .get("content")?
        .get("parts")?
        .as_array()?;

    let text = parts
        .iter()
        .filter_map(|part| part.get("text").and_then(|t| t.as_str()))
        .collect::<String>();

    if text.trim().is_empty() {
        None
    } else {
        Some(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn assistant_turns_use_model_role() {
        let history = vec![Message::assistant("Hi, what's your name?"), Message::user("Ada")];
        let body = request_body("be nice", &history);

        assert_eq!(body["contents"][0]["role"], "model");
        assert_eq!(body["contents"][1]["role"], "user");
        assert_eq!(body["systemInstruction"]["parts"][0]["text"], "be nice");
    }

    #[test]
    fn joins_text_parts_of_first_candidate() {
        let response = json!({
            "candidates": [{
                "content": { "parts": [{ "text": "Hello " }, { "text": "there" }] }
            }]
        });
        assert_eq!(response_text(&response).as_deref(), Some("Hello there"));
    }

    #[test]
    fn missing_or_blank_text_is_none() {
        assert!(response_text(&json!({ "candidates": [] })).is_none());
        let blank = json!({ "candidates": [{ "content": { "parts": [{ "text": "  " }] } }] });
        assert!(response_text(&blank).is_none());
    }
}

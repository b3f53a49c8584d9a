use std::fmt;
use std::path::{Path, PathBuf};

use clap::ValueEnum;
use eyre::Result;

use crate::gemini_client::{self, GeminiClient};
use crate::groq_client::{self, GroqClient};
use crate::text_generation::TextGenerator;

pub const DEFAULT_RECORDS_DIR: &str = "candidates";

/// Which completion model backs the interview.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Provider {
    Gemini,
    Groq,
}

impl Provider {
    pub fn default_model(self) -> &'static str {
        match self {
            Provider::Gemini => gemini_client::DEFAULT_MODEL,
            Provider::Groq => groq_client::DEFAULT_MODEL,
        }
    }
}

impl fmt::Display for Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Provider::Gemini => f.write_str("gemini"),
            Provider::Groq => f.write_str("groq"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Settings {
    pub provider: Provider,
    pub model: String,
    pub records_dir: PathBuf,
    pub extraction: bool,
}

impl Settings {
    /// A blank or missing model falls back to the provider's default.
    pub fn new(provider: Provider, model: Option<String>, records_dir: &str, extraction: bool) -> Self {
        let model = model
            .filter(|model| !model.trim().is_empty())
            .unwrap_or_else(|| provider.default_model().to_string());

        Self { provider, model, records_dir: expand_home(records_dir), extraction }
    }

    /// Builds the client for the configured provider. Fails when its API key
    /// is not set.
    pub fn text_generator(&self) -> Result<Box<dyn TextGenerator>> {
        let generator: Box<dyn TextGenerator> = match self.provider {
            Provider::Gemini => Box::new(GeminiClient::new(&self.model)?),
            Provider::Groq => Box::new(GroqClient::new(&self.model)?),
        };
        Ok(generator)
    }
}

/// Expands a leading `~` to the home directory.
pub fn expand_home(path: &str) -> PathBuf {
    let path = path.trim();

    if path == "~" || path.starts_with("~/") {
        if let Some(home) = dirs::home_dir() {
            return match path.strip_prefix("~/") {
                Some(rest) => home.join(rest),
                None => home,
            };
        }
    }

    Path::new(path).to_path_buf()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn model_defaults_per_provider() {
        let settings = Settings::new(Provider::Gemini, None, DEFAULT_RECORDS_DIR, true);
        assert_eq!(settings.model, gemini_client::DEFAULT_MODEL);
        assert_eq!(settings.records_dir, PathBuf::from("candidates"));

        let settings = Settings::new(Provider::Groq, Some("  ".into()), DEFAULT_RECORDS_DIR, true);
        assert_eq!(settings.model, groq_client::DEFAULT_MODEL);
    }

    #[test]
    fn explicit_model_is_kept() {
        let settings = Settings::new(Provider::Gemini, Some("gemini-1.5-pro".into()), "/tmp/records", false);
        assert_eq!(settings.model, "gemini-1.5-pro");
        assert_eq!(settings.records_dir, PathBuf::from("/tmp/records"));
        assert!(!settings.extraction);
    }

    #[test]
    fn tilde_expands_to_home() {
        if let Some(home) = dirs::home_dir() {
            assert_eq!(expand_home("~/records"), home.join("records"));
            assert_eq!(expand_home("~"), home);
        }
        assert_eq!(expand_home("records"), PathBuf::from("records"));
    }
}

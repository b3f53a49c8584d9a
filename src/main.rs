mod cli;
mod config;
mod gemini_client;
mod groq_client;
mod intake;
mod text_generation;

use std::io;
use std::process::ExitCode;

use clap::Parser;
use color_print::cformat;
use dotenv::dotenv;
use eyre::Result;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

use crate::cli::chat::ChatContext;
use crate::config::{Provider, Settings, DEFAULT_RECORDS_DIR};
use crate::intake::{ConversationDriver, RecordStore};

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Completion model provider
    #[arg(short, long, env = "INTAKE_PROVIDER", value_enum, ignore_case = true, default_value_t = Provider::Gemini)]
    provider: Provider,

    /// Model name, defaults to the provider's standard model
    #[arg(short, long, env = "INTAKE_MODEL")]
    model: Option<String>,

    /// Directory where completed interviews are saved
    #[arg(short, long, env = "INTAKE_RECORDS_DIR", default_value = DEFAULT_RECORDS_DIR)]
    records_dir: String,

    /// Only collect details at their own interview step
    #[arg(long)]
    no_extraction: bool,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    // Load environment variables from .env file
    dotenv().ok();

    let cli = Cli::parse();

    let log_level = if cli.verbose { Level::DEBUG } else { Level::INFO };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_writer(io::stderr)
        .finish();

    tracing::subscriber::set_global_default(subscriber)?;

    let settings = Settings::new(cli.provider, cli.model, &cli.records_dir, !cli.no_extraction);

    info!("Starting hiring assistant with {} ({})", settings.provider, settings.model);

    let generator = match settings.text_generator() {
        Ok(generator) => generator,
        Err(e) => {
            eprintln!("{}", cformat!("<red>Failed to initialize {} client: {}</>", settings.provider, e));
            return Ok(ExitCode::FAILURE);
        }
    };

    let driver = ConversationDriver::new(generator, RecordStore::new(&settings.records_dir))
        .with_extraction(settings.extraction);

    let mut chat_context = ChatContext::new(Box::new(io::stdout()), driver);
    chat_context.run().await
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;

    use super::*;

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn flags_are_parsed() {
        let cli = Cli::try_parse_from([
            "talent-intake-cli",
            "--provider",
            "Groq",
            "--model",
            "llama-3.1-8b-instant",
            "--records-dir",
            "/tmp/records",
            "--no-extraction",
        ])
        .unwrap();

        assert_eq!(cli.provider, Provider::Groq);
        assert_eq!(cli.model.as_deref(), Some("llama-3.1-8b-instant"));
        assert_eq!(cli.records_dir, "/tmp/records");
        assert!(cli.no_extraction);
    }

    #[test]
    fn unknown_provider_is_rejected() {
        assert!(Cli::try_parse_from(["talent-intake-cli", "--provider", "openai"]).is_err());
    }
}

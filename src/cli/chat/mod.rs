pub mod prompt;

use std::io::Write;
use std::process::ExitCode;

use color_print::cformat;
use eyre::Result;
use prompt::generate_prompt;
use tracing::error;

use crate::intake::profile::{CandidateProfile, ProfileField};
use crate::intake::{ConversationDriver, ConversationState, IntakeError, Notice, Stage};

const WELCOME_TEXT: &str = "
TalentScout Hiring Assistant

We'll collect a few details about you and then ask some technical questions.
Your answers are saved once the interview is complete.

/help         Show the help dialogue
/quit         Quit the application
";

const HELP_TEXT: &str = "
TalentScout Hiring Assistant

/status       Show the details collected so far
/clear        Start the interview over
/help         Show this help dialogue
/quit         Quit the application
";

pub struct ChatContext {
    output: Box<dyn Write>,
    conversation_state: ConversationState,
    driver: ConversationDriver,
}

impl ChatContext {
    pub fn new(output: Box<dyn Write>, driver: ConversationDriver) -> Self {
        Self {
            output,
            conversation_state: ConversationState::new(),
            driver,
        }
    }

    pub async fn run(&mut self) -> Result<ExitCode> {
        writeln!(self.output, "{}", WELCOME_TEXT)?;
        self.greet()?;

        let mut rl = prompt::rl()?;

        loop {
            let prompt_text = generate_prompt(self.conversation_state.stage);
            let readline = rl.readline(&prompt_text);

            match readline {
                Ok(line) => {
                    if line.trim().is_empty() {
                        continue;
                    }

                    rl.add_history_entry(line.as_str());

                    if line.trim() == "/quit" {
                        break;
                    }

                    match self.handle_input(&line).await {
                        Ok(()) => {}
                        Err(e) if is_fatal(&e) => {
                            error!("Interview state is corrupted: {}", e);
                            writeln!(self.output, "{}", cformat!("<red><bold>Fatal: {}</bold></red>", e))?;
                            return Ok(ExitCode::FAILURE);
                        }
                        Err(e) => {
                            writeln!(self.output, "{}", cformat!("<red>Error: {}</>", e))?;
                        }
                    }
                }
                Err(e) => {
                    writeln!(self.output, "Error: {}", e)?;
                    break;
                }
            }
        }

        Ok(ExitCode::SUCCESS)
    }

    fn greet(&mut self) -> Result<()> {
        let greeting = self.driver.start(&mut self.conversation_state);
        writeln!(self.output, "{}\n", greeting)?;
        Ok(())
    }

    async fn handle_input(&mut self, input: &str) -> Result<()> {
        match input.trim() {
            "/help" => {
                writeln!(self.output, "{}", HELP_TEXT)?;
            }
            "/clear" => {
                self.conversation_state.clear();
                writeln!(self.output, "Conversation cleared.\n")?;
                self.greet()?;
            }
            "/status" => {
                let status = self.status();
                writeln!(self.output, "{}", status)?;
            }
            _ => {
                let turn = self.driver.handle(&mut self.conversation_state, input).await?;

                for notice in &turn.notices {
                    if let Notice::GenerationFailed(_) | Notice::SaveFailed(_) = notice {
                        writeln!(self.output, "{}", cformat!("<red>{}</>", notice))?;
                    }
                }

                writeln!(self.output, "{}\n", turn.reply)?;

                for notice in &turn.notices {
                    if let Notice::Saved(_) = notice {
                        writeln!(self.output, "{}", cformat!("<green>{}</>", notice))?;
                    }
                }

                if turn.stage == Stage::Complete && !turn.notices.is_empty() {
                    writeln!(self.output, "Type /clear to start a new interview or /quit to exit.")?;
                }
            }
        }

        Ok(())
    }

    fn status(&self) -> String {
        let state = &self.conversation_state;
        let mut status = format!(
            "Provider: {}\nStage: {}\nRecords: {}\n\n{}",
            self.driver.generator_name(),
            state.stage,
            self.driver.store().dir().display(),
            profile_summary(&state.profile)
        );
        if state.is_completed() {
            status.push_str("\nInterview complete.");
        }
        status
    }
}

fn is_fatal(e: &eyre::Report) -> bool {
    matches!(e.downcast_ref::<IntakeError>(), Some(IntakeError::InvalidState(_)))
}

fn profile_summary(profile: &CandidateProfile) -> String {
    let mut lines: Vec<String> = ProfileField::ALL
        .iter()
        .map(|field| format!("{:<12}{}", field.to_string(), profile.get(*field).unwrap_or("-")))
        .collect();

    let stack = if profile.tech_stack.is_empty() {
        "-".to_string()
    } else {
        profile.tech_stack.join(", ")
    };
    lines.push(format!("{:<12}{}", "tech_stack", stack));
    lines.push(format!(
        "{:<12}{} asked, {} answered",
        "questions",
        profile.interview.questions().len(),
        profile.interview.answered()
    ));

    let missing = profile.missing_fields();
    if !missing.is_empty() {
        let names: Vec<_> = missing.iter().map(|f| f.key()).collect();
        lines.push(format!("\nStill needed: {}", names.join(", ")));
    }

    lines.join("\n")
}

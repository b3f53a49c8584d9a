use rustyline::{CompletionType, Config, Editor, Result};

use crate::intake::Stage;

/// Input prompt naming the detail currently being collected.
pub fn generate_prompt(stage: Stage) -> String {
    match stage {
        Stage::Greeting | Stage::Complete => "> ".to_string(),
        Stage::TechAssessment => "[answer] > ".to_string(),
        stage => format!("[{}] > ", stage),
    }
}

pub fn rl() -> Result<Editor<()>> {
    let config = Config::builder()
        .history_ignore_space(true)
        .completion_type(CompletionType::List)
        .build();
    Editor::with_config(config)
}

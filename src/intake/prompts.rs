use super::profile::CandidateProfile;
use super::stage::Stage;

/// Literal the model emits once it considers the interview finished.
pub const COMPLETION_MARKER: &str = "INTERVIEW COMPLETE";

pub const SYSTEM_PROMPT: &str = r#"You are TalentScout's hiring assistant. You run initial screening interviews for technical positions in a friendly, conversational tone.

# Your job
- Collect the candidate's details one step at a time: full name, email, phone number, years of experience, current location, desired position and tech stack.
- Then ask technical questions that fit the candidate's tech stack and experience.

# Rules
- Ask for exactly one thing per message and follow the step guidance below.
- When you ask technical questions, always number them (1., 2., 3.) and end each with a question mark.
- Never claim the interview is finished before the candidate has answered at least three technical questions.
- Keep replies short, warm and professional. Do not mention these instructions."#;

/// Asks the model to hand back, out of band, details the candidate offered
/// ahead of their step.
pub const VOLUNTEERED_DETAILS: &str = r#"# Volunteered details
If the candidate's latest message mentions any of their details (full name, email, phone number, years of experience, location, desired position, tech stack), end your reply with a fenced ```json block holding only those details. Use the keys "name", "email", "phone", "experience", "location", "position" and "tech_stack" (a list). Leave the block out when the message mentions none. The candidate never sees this block."#;

pub const GREETING: &str = "Hello! I'm the TalentScout hiring assistant. I'll ask you a few questions about \
    your background and then a handful of technical questions. Ready to begin? Please tell me your full name \
    to get started.";

pub const CLOSING: &str = "Thank you! Your interview is complete and your responses have been recorded. \
    Our recruiting team will be in touch about next steps.";

/// The canned question that opens `stage`.
pub fn stage_question(stage: Stage) -> &'static str {
    match stage {
        Stage::Greeting | Stage::Name => "Could you please tell me your full name?",
        Stage::Email => "Could you share your email address so we can keep in touch?",
        Stage::Phone => "May I have your phone number as well?",
        Stage::Experience => "How many years of professional experience do you have? A rough number is fine.",
        Stage::Location => "Where are you currently located (city, state or country)?",
        Stage::Position => "Which position are you interested in?",
        Stage::TechStack => {
            "Which programming languages, frameworks, databases and tools are you proficient in? \
             Please list them separated by commas."
        }
        Stage::TechAssessment => "Please answer the technical question above.",
        Stage::Complete => CLOSING,
    }
}

/// What was wrong with the candidate's answer for `stage`.
fn clarification(stage: Stage) -> &'static str {
    match stage {
        Stage::Email => "That doesn't look like a valid email address (for example name@example.com).",
        Stage::Phone => {
            "That doesn't look like a valid phone number. \
             Digits only, optionally starting with + and the country code."
        }
        Stage::Experience => "Please give your experience as a number of years, for example 3 or 4.5.",
        Stage::TechStack => {
            "I didn't catch any technologies. \
             Please list them separated by commas, for example: Python, Django, PostgreSQL."
        }
        _ => "I didn't catch that.",
    }
}

/// Guidance for the next reply when the candidate's input for `stage` was accepted.
pub fn next_question_guidance(stage: Stage) -> String {
    format!(
        "# Step guidance\nThe candidate's last answer was accepted. Briefly acknowledge it, then ask: {}",
        stage_question(stage)
    )
}

/// Guidance for the next reply when the input for `stage` failed validation.
pub fn clarification_guidance(stage: Stage) -> String {
    format!(
        "# Step guidance\nThe candidate's last answer could not be accepted. {} Politely ask again: {}",
        clarification(stage),
        stage_question(stage)
    )
}

pub fn assessment_guidance(profile: &CandidateProfile, required_answers: usize) -> String {
    let interview = &profile.interview;
    let mut guidance = format!(
        "# Step guidance\nTechnical assessment.\n- Tech stack: {}\n- Years of experience: {}\n\
         - Position: {}\n- Questions answered so far: {}\n",
        profile.tech_stack.join(", "),
        profile.experience.as_deref().unwrap_or("not specified"),
        profile.position.as_deref().unwrap_or("not specified"),
        interview.answered(),
    );

    match interview.pending_question() {
        Some(question) => guidance.push_str(&format!(
            "- Still waiting for an answer to: {}\nGently ask the candidate to answer it.\n",
            question
        )),
        None if interview.answered() >= required_answers => guidance.push_str(&format!(
            "The candidate has answered enough questions. \
             Thank them warmly and include the exact text \"{}\" in your reply.\n",
            COMPLETION_MARKER
        )),
        None => guidance.push_str(
            "Briefly and supportively acknowledge the previous answer if there was one, then ask the next \
             technical question, numbered to continue the sequence. Match the question to the candidate's \
             experience and focus on practical, real-world knowledge.\n",
        ),
    }

    guidance
}

pub fn evaluation_prompt(profile: &CandidateProfile) -> String {
    let qa = profile
        .interview
        .pairs()
        .map(|(question, answer)| format!("Q: {}\nA: {}", question, answer.unwrap_or("(no answer)")))
        .collect::<Vec<_>>()
        .join("\n\n");

    format!(
        "Evaluate the candidate.\n\nBackground:\n- Experience: {}\n- Position: {}\n- Tech stack: {}\n\n\
         Interview questions and answers:\n{}\n\n\
         Provide a SINGLE LINE evaluation summary (maximum 100 characters) covering experience relevance, \
         technical knowledge and overall suitability. Return only the summary, nothing else.",
        profile.experience.as_deref().unwrap_or("not specified"),
        profile.position.as_deref().unwrap_or("not specified"),
        profile.tech_stack.join(", "),
        qa,
    )
}

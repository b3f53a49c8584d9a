//! Candidate intake: the interview state machine and everything it needs to
//! turn a chat transcript into a validated, persisted candidate record.

pub mod conversation_state;
pub mod driver;
pub mod error;
pub mod extractor;
pub mod persistence;
pub mod profile;
pub mod prompts;
pub mod questions;
pub mod stage;
pub mod validators;

pub use conversation_state::ConversationState;
pub use driver::{ConversationDriver, Notice};
pub use error::IntakeError;
pub use persistence::RecordStore;
pub use stage::Stage;

pub mod assistant;
pub mod formatter;
pub mod session;
pub mod templates;

pub use assistant::{AssistantReply, AssistantSettings, RemedyAssistant, DEFAULT_MODEL, NO_RESPONSE};
pub use formatter::{format_response, HeadingKind, SectionState};
pub use session::{ChatSession, FAILURE_RAW_TEXT, FAILURE_RESPONSE, WAITING_PLACEHOLDER};
pub use templates::REMEDY_SYSTEM_PROMPT;

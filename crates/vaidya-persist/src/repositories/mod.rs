mod appointment;
mod chat_history;
mod feedback;

pub use appointment::{AppointmentRepository, AppointmentWrite, APPOINTMENTS_KEY};
pub use chat_history::{ChatHistoryRepository, HistoryWatcher, HISTORY_KEY, HISTORY_MIRROR_ID};
pub use feedback::FeedbackRepository;

mod appointment;
mod chat;
mod envelope;
mod feedback;
mod key;

pub use appointment::{
    Appointment, AppointmentId, AppointmentStatus, AsAppointmentId, DoctorResponseNotice,
    NewAppointment,
};
pub use chat::{ChatHistoryEntry, ChatTurn, HISTORY_TTL_DAYS};
pub use envelope::{StorageEnvelope, Unwrapped};
pub use feedback::FeedbackEntry;
pub use key::RecordKey;

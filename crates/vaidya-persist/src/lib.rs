pub mod builder;
pub mod client;
pub mod clock;
pub mod dbs;
pub mod documents;
pub mod error;
pub mod models;
pub mod primary;
pub mod repositories;

pub use builder::PersistClientBuilder;
pub use client::{BackendStatus, PersistClient, WriteOutcome};
pub use clock::{Clock, IdGenerator, ManualClock, SystemClock};
pub use documents::{
    Collection, Database, DocumentStore, FileDocumentStore, MemoryDocumentStore, DATABASE_NAME,
    SCHEMA_VERSION,
};
pub use error::{PersistError, Result};
pub use models::{
    Appointment, AppointmentId, AppointmentStatus, AsAppointmentId, ChatHistoryEntry, ChatTurn,
    DoctorResponseNotice, FeedbackEntry, NewAppointment, RecordKey,
};
pub use primary::{
    FileKeyValueStore, KeyValueBackend, Lookup, MemoryKeyValueStore, PrimaryStore, StorageEvent,
    StorageSubscription,
};
pub use repositories::{
    AppointmentRepository, AppointmentWrite, ChatHistoryRepository, FeedbackRepository,
    HistoryWatcher, APPOINTMENTS_KEY, HISTORY_KEY, HISTORY_MIRROR_ID,
};

#[cfg(feature = "mongodb")]
pub use dbs::mongo::MongoDocumentStore;

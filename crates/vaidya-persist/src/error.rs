use thiserror::Error;

#[derive(Error, Debug)]
pub enum PersistError {
    #[cfg(feature = "mongodb")]
    #[error("Database error: {0}")]
    Database(#[from] mongodb::error::Error),

    #[cfg(feature = "mongodb")]
    #[error("BSON serialization error: {0}")]
    BsonSerialization(#[from] bson::ser::Error),

    #[cfg(feature = "mongodb")]
    #[error("BSON deserialization error: {0}")]
    BsonDeserialization(#[from] bson::de::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Storage quota exceeded writing {key}: {needed} bytes needed, quota is {quota}")]
    QuotaExceeded {
        key: String,
        needed: usize,
        quota: usize,
    },

    #[error("Collection not found: {0}")]
    CollectionMissing(String),

    #[error("Record in {0} has no usable `id` field")]
    MissingKey(String),

    #[error("Requested schema version {requested} is lower than stored version {stored}")]
    VersionConflict { requested: u32, stored: u32 },

    #[error("Storage backend unavailable: {0}")]
    Unavailable(String),

    #[error("Appointment not found: {0}")]
    AppointmentNotFound(String),

    #[error("Invalid appointment status: {0}")]
    InvalidStatus(String),

    #[error("Connection error: {0}")]
    Connection(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

pub type Result<T> = std::result::Result<T, PersistError>;

//! Appointments.
//!
//! The `appointments` collection is the authoritative copy. The single-blob
//! array under [`APPOINTMENTS_KEY`] is only written when the document store
//! fails; every update on that path rewrites the whole array, so it costs
//! O(number of appointments).

use serde_json::Value;
use std::fmt;

use crate::client::PersistClient;
use crate::documents::Collection;
use crate::error::{PersistError, Result};
use crate::models::{
    Appointment, AppointmentId, AppointmentStatus, AsAppointmentId, DoctorResponseNotice,
    NewAppointment,
};

/// Primary-store key of the degraded single-blob copy.
pub const APPOINTMENTS_KEY: &str = "doctorAppointments";

/// Where an appointment write landed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppointmentWrite {
    /// Keyed write to the document store.
    Stored(AppointmentId),
    /// The document store failed; the record went into the blob instead and
    /// is only reachable through a full scan.
    Degraded { id: AppointmentId, reason: String },
}

impl AppointmentWrite {
    pub fn id(&self) -> AppointmentId {
        match self {
            AppointmentWrite::Stored(id) => *id,
            AppointmentWrite::Degraded { id, .. } => *id,
        }
    }

    pub fn is_degraded(&self) -> bool {
        matches!(self, AppointmentWrite::Degraded { .. })
    }
}

#[derive(Clone)]
pub struct AppointmentRepository {
    client: PersistClient,
}

impl AppointmentRepository {
    pub fn new(client: PersistClient) -> Self {
        Self { client }
    }

    /// Stores a booking, assigning a timestamp id when none was given.
    pub async fn save(&self, appointment: NewAppointment) -> Result<AppointmentWrite> {
        let id = appointment
            .id
            .unwrap_or_else(|| AppointmentId(self.client.next_id()));
        let appointment = appointment.into_appointment(id, self.client.clock().now());
        let record = serde_json::to_value(&appointment)?;

        match self.client.database().put(Collection::Appointments, record.clone()).await {
            Ok(()) => {
                tracing::debug!(%id, "appointment saved");
                Ok(AppointmentWrite::Stored(id))
            }
            Err(e) => {
                tracing::warn!(%id, error = %e, "document store rejected appointment; writing blob");
                let mut blob = self.load_blob().await;
                upsert(&mut blob, id, record);
                self.store_blob(&blob).await?;
                Ok(AppointmentWrite::Degraded {
                    id,
                    reason: e.to_string(),
                })
            }
        }
    }

    /// The document store's appointments, or the blob when that is empty or
    /// unreadable. The two are never merged.
    pub async fn load_all(&self) -> Vec<Appointment> {
        match self.client.database().get_all(Collection::Appointments).await {
            Ok(records) if !records.is_empty() => parse_all(records),
            Ok(_) => parse_all(self.load_blob().await),
            Err(e) => {
                tracing::warn!(error = %e, "document store scan failed; reading blob");
                parse_all(self.load_blob().await)
            }
        }
    }

    /// Linear scan of [`load_all`](Self::load_all). `"5"` finds appointment
    /// `5`; a non-numeric id finds nothing.
    pub async fn get_by_id<I: AsAppointmentId + ?Sized>(&self, id: &I) -> Option<Appointment> {
        let id = id.as_appointment_id()?;
        self.load_all().await.into_iter().find(|a| a.id == id)
    }

    /// Sets `status` and leaves every other field as stored.
    pub async fn update_status<I>(&self, id: &I, status: AppointmentStatus) -> Result<AppointmentWrite>
    where
        I: AsAppointmentId + fmt::Display + ?Sized,
    {
        let appointment_id = id
            .as_appointment_id()
            .ok_or_else(|| PersistError::AppointmentNotFound(id.to_string()))?;

        let reason = match self.update_document(appointment_id, &status).await {
            Ok(true) => return Ok(AppointmentWrite::Stored(appointment_id)),
            Ok(false) => "record not in document store".to_string(),
            Err(e) => {
                tracing::warn!(id = %appointment_id, error = %e, "document store update failed; trying blob");
                e.to_string()
            }
        };

        let mut blob = self.load_blob().await;
        let record = blob
            .iter_mut()
            .find(|r| record_id(r) == Some(appointment_id))
            .ok_or_else(|| PersistError::AppointmentNotFound(appointment_id.to_string()))?;
        set_status(record, &status);
        self.store_blob(&blob).await?;

        Ok(AppointmentWrite::Degraded {
            id: appointment_id,
            reason,
        })
    }

    /// Records a doctor's decision and returns what the notification email needs.
    pub async fn handle_doctor_response<I>(
        &self,
        id: &I,
        status: AppointmentStatus,
    ) -> Result<DoctorResponseNotice>
    where
        I: AsAppointmentId + fmt::Display + ?Sized,
    {
        let write = self.update_status(id, status.clone()).await?;
        let appointment = match &write {
            AppointmentWrite::Stored(id) => self.get_document(*id).await?,
            AppointmentWrite::Degraded { id, .. } => {
                parse_all(self.load_blob().await).into_iter().find(|a| a.id == *id)
            }
        }
        .ok_or_else(|| PersistError::AppointmentNotFound(write.id().to_string()))?;

        tracing::info!(id = %appointment.id, %status, "doctor response recorded");
        Ok(DoctorResponseNotice::from(&appointment))
    }

    /// Keyed read-modify-put. `Ok(false)` when the record is not there.
    async fn update_document(&self, id: AppointmentId, status: &AppointmentStatus) -> Result<bool> {
        let database = self.client.database();
        let Some(mut record) = database.get(Collection::Appointments, id).await? else {
            return Ok(false);
        };
        set_status(&mut record, status);
        database.put(Collection::Appointments, record).await?;
        Ok(true)
    }

    async fn get_document(&self, id: AppointmentId) -> Result<Option<Appointment>> {
        match self.client.database().get(Collection::Appointments, id).await? {
            Some(record) => Ok(Some(serde_json::from_value(record)?)),
            None => Ok(None),
        }
    }

    /// The blob as raw records; a lone object reads as a one-element list.
    /// Falls back to the `chats` mirror when the primary store has no copy.
    async fn load_blob(&self) -> Vec<Value> {
        match self.client.load_data(APPOINTMENTS_KEY).await {
            Some(Value::Array(records)) => records,
            Some(record @ Value::Object(_)) => vec![record],
            Some(other) => {
                tracing::warn!(kind = ?other, "ignoring malformed appointment blob");
                Vec::new()
            }
            None => Vec::new(),
        }
    }

    async fn store_blob(&self, records: &[Value]) -> Result<()> {
        let outcome = self.client.save_data(APPOINTMENTS_KEY, records, None).await;
        if !outcome.primary.is_written() {
            tracing::warn!(%outcome, "appointment blob write incomplete");
        }
        outcome.into_result()
    }
}

fn record_id(record: &Value) -> Option<AppointmentId> {
    serde_json::from_value(record.get("id")?.clone()).ok()
}

fn set_status(record: &mut Value, status: &AppointmentStatus) {
    if let Some(map) = record.as_object_mut() {
        map.insert("status".to_string(), Value::String(status.to_string()));
    }
}

fn upsert(records: &mut Vec<Value>, id: AppointmentId, record: Value) {
    match records.iter_mut().find(|r| record_id(r) == Some(id)) {
        Some(existing) => *existing = record,
        None => records.push(record),
    }
}

fn parse_all(records: Vec<Value>) -> Vec<Appointment> {
    records
        .into_iter()
        .filter_map(|record| match serde_json::from_value::<Appointment>(record) {
            Ok(appointment) => Some(appointment),
            Err(e) => {
                tracing::warn!(error = %e, "skipping unreadable appointment record");
                None
            }
        })
        .collect()
}

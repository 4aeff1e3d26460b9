use chrono::{DateTime, Utc};
use serde::{de, Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use std::str::FromStr;

use crate::error::PersistError;
use crate::models::RecordKey;

/// Numeric appointment id (a creation timestamp unless the caller supplied one).
///
/// Deserializes from a number or a numeric string, so blobs written with
/// string ids still resolve.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct AppointmentId(pub i64);

impl fmt::Display for AppointmentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<AppointmentId> for RecordKey {
    fn from(id: AppointmentId) -> Self {
        RecordKey::Int(id.0)
    }
}

impl<'de> Deserialize<'de> for AppointmentId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        match Value::deserialize(deserializer)? {
            Value::Number(n) => n
                .as_i64()
                .or_else(|| n.as_f64().filter(|f| f.fract() == 0.0).map(|f| f as i64))
                .map(AppointmentId)
                .ok_or_else(|| de::Error::custom(format!("appointment id out of range: {}", n))),
            Value::String(s) => s
                .trim()
                .parse()
                .map(AppointmentId)
                .map_err(|_| de::Error::custom(format!("non-numeric appointment id: {}", s))),
            other => Err(de::Error::custom(format!("invalid appointment id: {}", other))),
        }
    }
}

/// Anything a caller may use to name an appointment.
///
/// Lookup coerces to a number first: `"5"` names appointment `5`, and a
/// non-numeric string names nothing.
pub trait AsAppointmentId {
    fn as_appointment_id(&self) -> Option<AppointmentId>;
}

impl AsAppointmentId for AppointmentId {
    fn as_appointment_id(&self) -> Option<AppointmentId> {
        Some(*self)
    }
}

impl AsAppointmentId for i64 {
    fn as_appointment_id(&self) -> Option<AppointmentId> {
        Some(AppointmentId(*self))
    }
}

impl AsAppointmentId for str {
    fn as_appointment_id(&self) -> Option<AppointmentId> {
        self.trim().parse().ok().map(AppointmentId)
    }
}

impl AsAppointmentId for String {
    fn as_appointment_id(&self) -> Option<AppointmentId> {
        self.as_str().as_appointment_id()
    }
}

impl<T: AsAppointmentId + ?Sized> AsAppointmentId for &T {
    fn as_appointment_id(&self) -> Option<AppointmentId> {
        (**self).as_appointment_id()
    }
}

/// Appointment status.
///
/// Stored records are read leniently: known spellings match in any case and
/// anything else is kept verbatim in [`AppointmentStatus::Other`]. Parsing
/// user input with [`FromStr`] only accepts the known spellings.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum AppointmentStatus {
    #[default]
    Pending,
    Confirmed,
    Declined,
    Cancelled,
    Completed,
    Other(String),
}

impl AppointmentStatus {
    fn known(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "pending" => Some(AppointmentStatus::Pending),
            "confirmed" | "accepted" => Some(AppointmentStatus::Confirmed),
            "declined" | "rejected" => Some(AppointmentStatus::Declined),
            "cancelled" | "canceled" => Some(AppointmentStatus::Cancelled),
            "completed" => Some(AppointmentStatus::Completed),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            AppointmentStatus::Pending => "pending",
            AppointmentStatus::Confirmed => "confirmed",
            AppointmentStatus::Declined => "declined",
            AppointmentStatus::Cancelled => "cancelled",
            AppointmentStatus::Completed => "completed",
            AppointmentStatus::Other(raw) => raw,
        }
    }
}

impl fmt::Display for AppointmentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

impl FromStr for AppointmentStatus {
    type Err = PersistError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::known(s).ok_or_else(|| PersistError::InvalidStatus(s.to_string()))
    }
}

impl Serialize for AppointmentStatus {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for AppointmentStatus {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let status = match Value::deserialize(deserializer)? {
            Value::Null => AppointmentStatus::Pending,
            Value::String(s) => Self::known(&s).unwrap_or(AppointmentStatus::Other(s)),
            other => AppointmentStatus::Other(other.to_string()),
        };
        Ok(status)
    }
}

/// Strings in stored records may be missing, `null` or not strings at all.
fn lenient_string<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    Ok(match Value::deserialize(deserializer)? {
        Value::Null => String::new(),
        Value::String(s) => s,
        other => other.to_string(),
    })
}

/// RFC 3339 text or epoch milliseconds; anything else reads as unknown.
fn lenient_timestamp<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<Option<DateTime<Utc>>, D::Error> {
    Ok(match Value::deserialize(deserializer)? {
        Value::String(s) => DateTime::parse_from_rfc3339(s.trim())
            .ok()
            .map(|t| t.with_timezone(&Utc)),
        Value::Number(n) => n.as_i64().and_then(DateTime::<Utc>::from_timestamp_millis),
        _ => None,
    })
}

/// A stored appointment.
///
/// Fields the booking form sends beyond the named ones are kept in `extra`
/// and written back untouched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Appointment {
    pub id: AppointmentId,
    #[serde(default)]
    pub status: AppointmentStatus,
    #[serde(
        default,
        deserialize_with = "lenient_timestamp",
        skip_serializing_if = "Option::is_none"
    )]
    pub updated_at: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub email: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub name: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub doctor_name: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub date: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub time: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Booking request; `id` is assigned on save when absent.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewAppointment {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<AppointmentId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<AppointmentStatus>,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub doctor_name: String,
    #[serde(default)]
    pub date: String,
    #[serde(default)]
    pub time: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl NewAppointment {
    pub fn new(
        name: impl Into<String>,
        email: impl Into<String>,
        doctor_name: impl Into<String>,
        date: impl Into<String>,
        time: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            email: email.into(),
            doctor_name: doctor_name.into(),
            date: date.into(),
            time: time.into(),
            ..Self::default()
        }
    }

    pub fn with_id(mut self, id: i64) -> Self {
        self.id = Some(AppointmentId(id));
        self
    }

    pub fn with_field(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.extra.insert(key.into(), value.into());
        self
    }

    pub fn into_appointment(self, id: AppointmentId, updated_at: DateTime<Utc>) -> Appointment {
        Appointment {
            id,
            status: self.status.unwrap_or_default(),
            updated_at: Some(updated_at),
            email: self.email,
            name: self.name,
            doctor_name: self.doctor_name,
            date: self.date,
            time: self.time,
            extra: self.extra,
        }
    }
}

/// What the email collaborator needs after a doctor accepts or declines.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DoctorResponseNotice {
    pub patient_email: String,
    pub patient_name: String,
    pub status: AppointmentStatus,
    pub doctor_name: String,
    pub date: String,
    pub time: String,
}

impl From<&Appointment> for DoctorResponseNotice {
    fn from(appointment: &Appointment) -> Self {
        Self {
            patient_email: appointment.email.clone(),
            patient_name: appointment.name.clone(),
            status: appointment.status.clone(),
            doctor_name: appointment.doctor_name.clone(),
            date: appointment.date.clone(),
            time: appointment.time.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_id_accepts_numeric_strings() {
        let id: AppointmentId = serde_json::from_value(json!("42")).unwrap();
        assert_eq!(id, AppointmentId(42));
        assert!(serde_json::from_value::<AppointmentId>(json!("abc")).is_err());
    }

    #[test]
    fn test_id_coercion() {
        assert_eq!("5".as_appointment_id(), Some(AppointmentId(5)));
        assert_eq!(5_i64.as_appointment_id(), Some(AppointmentId(5)));
        assert_eq!("five".as_appointment_id(), None);
    }

    #[test]
    fn test_status_parsing() {
        assert_eq!("Accepted".parse::<AppointmentStatus>().unwrap(), AppointmentStatus::Confirmed);
        assert_eq!("declined".parse::<AppointmentStatus>().unwrap(), AppointmentStatus::Declined);
        assert!("maybe".parse::<AppointmentStatus>().is_err());
    }

    #[test]
    fn test_stored_status_is_lenient() {
        let read = |v: Value| serde_json::from_value::<AppointmentStatus>(v).unwrap();
        assert_eq!(read(json!("Pending")), AppointmentStatus::Pending);
        assert_eq!(read(json!("ACCEPTED")), AppointmentStatus::Confirmed);
        assert_eq!(read(json!(null)), AppointmentStatus::Pending);
        assert_eq!(read(json!("rescheduled")), AppointmentStatus::Other("rescheduled".to_string()));
        assert_eq!(
            serde_json::to_value(AppointmentStatus::Other("rescheduled".to_string())).unwrap(),
            json!("rescheduled")
        );
    }

    #[test]
    fn test_foreign_shaped_record_still_reads() {
        let raw = json!({
            "id": "9", "status": "Confirmed", "email": null, "name": "Asha",
            "doctorName": 12, "updatedAt": "last tuesday"
        });
        let appointment: Appointment = serde_json::from_value(raw).unwrap();
        assert_eq!(appointment.id, AppointmentId(9));
        assert_eq!(appointment.status, AppointmentStatus::Confirmed);
        assert_eq!(appointment.email, "");
        assert_eq!(appointment.doctor_name, "12");
        assert_eq!(appointment.updated_at, None);

        let millis: Appointment =
            serde_json::from_value(json!({"id": 1, "updatedAt": 1_760_000_000_000_i64})).unwrap();
        assert_eq!(millis.updated_at.map(|t| t.timestamp_millis()), Some(1_760_000_000_000));
    }

    #[test]
    fn test_unknown_fields_survive_round_trip() {
        let raw = json!({
            "id": 1, "status": "pending", "email": "a@b.c", "name": "Asha",
            "doctorName": "Dr. Rao", "date": "2026-10-20", "time": "10:00",
            "fees": 500
        });
        let appointment: Appointment = serde_json::from_value(raw).unwrap();
        assert_eq!(appointment.extra.get("fees"), Some(&json!(500)));

        let back = serde_json::to_value(&appointment).unwrap();
        assert_eq!(back["fees"], 500);
        assert_eq!(back["doctorName"], "Dr. Rao");
    }
}

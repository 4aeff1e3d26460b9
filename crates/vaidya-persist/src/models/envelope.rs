use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::clock::DAY_MS;

/// On-disk wrapper applied to primary-store values that carry an expiry.
///
/// `expiry` is an absolute epoch-ms deadline; values saved without an
/// expiry are stored bare, without any wrapper.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StorageEnvelope {
    pub data: Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expiry: Option<i64>,
}

/// Result of reading a stored item back.
#[derive(Debug, Clone, PartialEq)]
pub enum Unwrapped {
    Live(Value),
    Expired,
}

impl StorageEnvelope {
    /// Builds the stored item: an envelope when `expiry_days` is non-zero,
    /// otherwise the bare value (zero days means "no expiry"). A bare value
    /// that itself looks like an envelope is wrapped once more so it reads
    /// back unchanged.
    pub fn wrap(data: Value, expiry_days: Option<u32>, now_millis: i64) -> Value {
        match expiry_days {
            Some(days) if days > 0 => serde_json::json!({
                "data": data,
                "expiry": now_millis + i64::from(days) * DAY_MS,
            }),
            _ if Self::is_envelope(&data) => serde_json::json!({ "data": data }),
            _ => data,
        }
    }

    /// Reads a stored item, honouring the expiry deadline.
    ///
    /// Only an [envelope-shaped](Self::is_envelope) object is unwrapped or
    /// expired; anything else is returned as-is so values written before
    /// envelopes existed still load.
    pub fn read(stored: Value, now_millis: i64) -> Unwrapped {
        if !Self::is_envelope(&stored) {
            return Unwrapped::Live(stored);
        }
        if let Some(expiry) = stored.get("expiry").and_then(Value::as_i64) {
            if expiry != 0 && now_millis > expiry {
                return Unwrapped::Expired;
            }
        }
        Unwrapped::Live(Self::payload(stored))
    }

    /// The `data` field of an envelope, ignoring any expiry. Other values
    /// pass through untouched.
    pub fn payload(stored: Value) -> Value {
        if !Self::is_envelope(&stored) {
            return stored;
        }
        match stored {
            Value::Object(mut map) => map.remove("data").unwrap_or(Value::Null),
            other => other,
        }
    }

    /// An object whose keys are `data` and optionally a numeric `expiry`,
    /// and nothing else.
    pub fn is_envelope(stored: &Value) -> bool {
        let Value::Object(map) = stored else {
            return false;
        };
        if !map.contains_key("data") {
            return false;
        }
        map.iter().all(|(key, value)| match key.as_str() {
            "data" => true,
            "expiry" => value.is_number(),
            _ => false,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_wrap_without_expiry_is_bare() {
        assert_eq!(StorageEnvelope::wrap(json!([1, 2]), None, 0), json!([1, 2]));
        assert_eq!(StorageEnvelope::wrap(json!("x"), Some(0), 0), json!("x"));
    }

    #[test]
    fn test_wrap_with_expiry() {
        let stored = StorageEnvelope::wrap(json!({"a": 1}), Some(2), 1_000);
        assert_eq!(stored, json!({"data": {"a": 1}, "expiry": 1_000 + 2 * DAY_MS}));
    }

    #[test]
    fn test_unwrap_respects_deadline() {
        let stored = json!({"data": "v", "expiry": 100});
        assert_eq!(StorageEnvelope::read(stored.clone(), 100), Unwrapped::Live(json!("v")));
        assert_eq!(StorageEnvelope::read(stored, 101), Unwrapped::Expired);
    }

    #[test]
    fn test_unwrap_legacy_value() {
        let stored = json!({"name": "legacy"});
        assert_eq!(StorageEnvelope::read(stored.clone(), 0), Unwrapped::Live(stored));
    }

    #[test]
    fn test_objects_with_extra_keys_are_not_envelopes() {
        let labelled = json!({"data": [1, 2], "label": "x"});
        assert_eq!(StorageEnvelope::read(labelled.clone(), 0), Unwrapped::Live(labelled.clone()));
        assert_eq!(StorageEnvelope::payload(labelled.clone()), labelled);

        let scheduled = json!({"expiry": 5, "title": "renewal"});
        assert_eq!(StorageEnvelope::read(scheduled.clone(), 10), Unwrapped::Live(scheduled));

        let text_expiry = json!({"data": "v", "expiry": "soon"});
        assert_eq!(StorageEnvelope::read(text_expiry.clone(), 10), Unwrapped::Live(text_expiry));
    }

    #[test]
    fn test_envelope_shaped_value_round_trips() {
        let value = json!({"data": [1, 2]});
        let stored = StorageEnvelope::wrap(value.clone(), None, 0);
        assert_eq!(stored, json!({"data": {"data": [1, 2]}}));
        assert_eq!(StorageEnvelope::read(stored, 0), Unwrapped::Live(value));
    }
}

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

/// Primary key of a document-store record.
///
/// Integers sort before strings, the same ordering the browser's embedded
/// store applies to mixed key types.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RecordKey {
    Int(i64),
    Str(String),
}

impl RecordKey {
    /// Reads a key out of a JSON value; only integers and strings qualify.
    pub fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Number(n) => n.as_i64().map(RecordKey::Int),
            Value::String(s) => Some(RecordKey::Str(s.clone())),
            _ => None,
        }
    }

    pub fn to_value(&self) -> Value {
        match self {
            RecordKey::Int(i) => Value::from(*i),
            RecordKey::Str(s) => Value::from(s.as_str()),
        }
    }
}

impl fmt::Display for RecordKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RecordKey::Int(i) => write!(f, "{}", i),
            RecordKey::Str(s) => write!(f, "{}", s),
        }
    }
}

impl From<i64> for RecordKey {
    fn from(value: i64) -> Self {
        RecordKey::Int(value)
    }
}

impl From<&str> for RecordKey {
    fn from(value: &str) -> Self {
        RecordKey::Str(value.to_string())
    }
}

impl From<&RecordKey> for RecordKey {
    fn from(value: &RecordKey) -> Self {
        value.clone()
    }
}

impl From<String> for RecordKey {
    fn from(value: String) -> Self {
        RecordKey::Str(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_integers_order_before_strings() {
        let mut keys = vec![RecordKey::from("a"), RecordKey::from(5), RecordKey::from(1)];
        keys.sort();
        assert_eq!(keys, vec![RecordKey::Int(1), RecordKey::Int(5), RecordKey::from("a")]);
    }

    #[test]
    fn test_from_value_rejects_non_keys() {
        assert_eq!(RecordKey::from_value(&json!(42)), Some(RecordKey::Int(42)));
        assert_eq!(RecordKey::from_value(&json!("k")), Some(RecordKey::from("k")));
        assert_eq!(RecordKey::from_value(&json!(1.5)), None);
        assert_eq!(RecordKey::from_value(&json!(null)), None);
    }
}

//! Generated value representation.
//!
//! `Value` is the instance tree produced by the population engine. It keeps
//! enough type information to be inspected directly in tests and serialises
//! to natural JSON, so it can also be deserialised into a caller's own
//! `serde` types via [`Value::deserialize_into`].

use crate::types::{ScalarType, TypeDescriptor, TypeKind};
use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, NaiveTime};
use indexmap::IndexMap;
use serde::de::DeserializeOwned;
use serde::ser::{SerializeMap, SerializeSeq, SerializeStruct};
use serde::{Serialize, Serializer};
use std::time::Duration;
use uuid::Uuid;

/// A generated value.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// Unset composite, cycle-break point, or explicit null
    Null,

    Bool(bool),

    /// Signed integer of any width
    Int(i64),

    /// Unsigned integer of any width
    UInt(u64),

    Float(f64),

    /// Decimal in string form to preserve the generated scale
    Decimal(String),

    Char(char),

    String(String),

    Bytes(Vec<u8>),

    Uuid(Uuid),

    Date(NaiveDate),

    Time(NaiveTime),

    DateTime(NaiveDateTime),

    ZonedDateTime(DateTime<FixedOffset>),

    Duration(Duration),

    /// Enum variant name
    Enum(String),

    /// Elements of a list or array
    List(Vec<Value>),

    /// Map entries in generation order
    Map(Vec<(Value, Value)>),

    /// Populated composite
    Object {
        /// Concrete type name
        type_name: String,
        /// Field values in declaration order
        fields: IndexMap<String, Value>,
    },
}

impl Value {
    /// Zero value of a type: what excluded and immutable fields hold.
    pub fn zero_for(descriptor: &TypeDescriptor) -> Self {
        match &descriptor.kind {
            TypeKind::Scalar(scalar) => Self::zero_scalar(*scalar),
            TypeKind::Array { .. } | TypeKind::Collection { .. } => Self::List(Vec::new()),
            TypeKind::Map { .. } => Self::Map(Vec::new()),
            TypeKind::Enum { .. }
            | TypeKind::Composite { .. }
            | TypeKind::Abstract
            | TypeKind::Opaque => Self::Null,
        }
    }

    /// Zero value of a scalar type.
    pub fn zero_scalar(scalar: ScalarType) -> Self {
        match scalar {
            ScalarType::Bool => Self::Bool(false),
            ScalarType::I8 | ScalarType::I16 | ScalarType::I32 | ScalarType::I64 => Self::Int(0),
            ScalarType::U8 | ScalarType::U16 | ScalarType::U32 | ScalarType::U64 => Self::UInt(0),
            ScalarType::F32 | ScalarType::F64 => Self::Float(0.0),
            ScalarType::Decimal => Self::Decimal("0".to_string()),
            ScalarType::Char => Self::Char('\0'),
            ScalarType::String => Self::String(String::new()),
            ScalarType::Bytes => Self::Bytes(Vec::new()),
            ScalarType::Uuid => Self::Uuid(Uuid::nil()),
            ScalarType::Date => Self::Date(NaiveDate::default()),
            ScalarType::Time => Self::Time(NaiveTime::default()),
            ScalarType::DateTime => Self::DateTime(NaiveDateTime::default()),
            ScalarType::ZonedDateTime => Self::ZonedDateTime(DateTime::<FixedOffset>::default()),
            ScalarType::Duration => Self::Duration(Duration::ZERO),
        }
    }

    /// Build an object value from field pairs.
    pub fn object<I, K>(type_name: impl Into<String>, fields: I) -> Self
    where
        I: IntoIterator<Item = (K, Value)>,
        K: Into<String>,
    {
        Self::Object {
            type_name: type_name.into(),
            fields: fields.into_iter().map(|(k, v)| (k.into(), v)).collect(),
        }
    }

    /// Check if this value is null.
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Try to get this value as a boolean.
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Try to get this value as an i64.
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Self::Int(i) => Some(*i),
            Self::UInt(u) => i64::try_from(*u).ok(),
            _ => None,
        }
    }

    /// Try to get this value as a u64.
    pub fn as_u64(&self) -> Option<u64> {
        match self {
            Self::UInt(u) => Some(*u),
            Self::Int(i) => u64::try_from(*i).ok(),
            _ => None,
        }
    }

    /// Try to get this value as an f64.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Float(f) => Some(*f),
            Self::Decimal(d) => d.parse().ok(),
            _ => None,
        }
    }

    /// Try to get this value as a string reference.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) | Self::Decimal(s) | Self::Enum(s) => Some(s),
            _ => None,
        }
    }

    /// Try to get this value as a list of elements.
    pub fn as_list(&self) -> Option<&[Value]> {
        match self {
            Self::List(items) => Some(items),
            _ => None,
        }
    }

    /// Try to get this value as map entries.
    pub fn as_map(&self) -> Option<&[(Value, Value)]> {
        match self {
            Self::Map(entries) => Some(entries),
            _ => None,
        }
    }

    /// Concrete type name of an object value.
    pub fn type_name(&self) -> Option<&str> {
        match self {
            Self::Object { type_name, .. } => Some(type_name),
            _ => None,
        }
    }

    /// Get a field of an object value.
    pub fn get_field(&self, name: &str) -> Option<&Value> {
        match self {
            Self::Object { fields, .. } => fields.get(name),
            _ => None,
        }
    }

    /// Follow a dotted field path, e.g. `address.city`.
    pub fn get_path(&self, path: &str) -> Option<&Value> {
        path.split('.')
            .try_fold(self, |value, segment| value.get_field(segment))
    }

    /// Convert to a JSON value.
    pub fn to_json(&self) -> serde_json::Value {
        // Serialising a Value into serde_json::Value cannot fail: every map
        // key is rendered as a string first.
        serde_json::to_value(self).unwrap_or(serde_json::Value::Null)
    }

    /// Deserialize this value into a caller-defined type.
    pub fn deserialize_into<T: DeserializeOwned>(&self) -> Result<T, serde_json::Error> {
        serde_json::from_value(self.to_json())
    }

    /// Whether the map keys of this value can be rendered as JSON object keys.
    fn is_key_like(&self) -> bool {
        matches!(
            self,
            Self::String(_)
                | Self::Char(_)
                | Self::Enum(_)
                | Self::Uuid(_)
                | Self::Int(_)
                | Self::UInt(_)
                | Self::Bool(_)
                | Self::Decimal(_)
                | Self::Date(_)
                | Self::Time(_)
                | Self::DateTime(_)
                | Self::ZonedDateTime(_)
        )
    }

    fn key_string(&self) -> String {
        match self {
            Self::String(s) | Self::Enum(s) | Self::Decimal(s) => s.clone(),
            Self::Char(c) => c.to_string(),
            Self::Uuid(u) => u.to_string(),
            Self::Int(i) => i.to_string(),
            Self::UInt(u) => u.to_string(),
            Self::Bool(b) => b.to_string(),
            Self::Date(d) => d.to_string(),
            Self::Time(t) => t.to_string(),
            Self::DateTime(dt) => dt.format("%Y-%m-%dT%H:%M:%S%.f").to_string(),
            Self::ZonedDateTime(dt) => dt.to_rfc3339(),
            other => other.to_json().to_string(),
        }
    }
}

impl Serialize for Value {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match self {
            Self::Null => serializer.serialize_none(),
            Self::Bool(b) => serializer.serialize_bool(*b),
            Self::Int(i) => serializer.serialize_i64(*i),
            Self::UInt(u) => serializer.serialize_u64(*u),
            Self::Float(f) => serializer.serialize_f64(*f),
            Self::Decimal(d) => serializer.serialize_str(d),
            Self::Char(c) => serializer.serialize_char(*c),
            Self::String(s) | Self::Enum(s) => serializer.serialize_str(s),
            Self::Bytes(bytes) => {
                let mut seq = serializer.serialize_seq(Some(bytes.len()))?;
                for byte in bytes {
                    seq.serialize_element(byte)?;
                }
                seq.end()
            }
            Self::Uuid(u) => serializer.serialize_str(&u.to_string()),
            Self::Date(_) | Self::Time(_) | Self::DateTime(_) | Self::ZonedDateTime(_) => {
                serializer.serialize_str(&self.key_string())
            }
            // Same shape as serde's std::time::Duration
            Self::Duration(d) => {
                let mut state = serializer.serialize_struct("Duration", 2)?;
                state.serialize_field("secs", &d.as_secs())?;
                state.serialize_field("nanos", &d.subsec_nanos())?;
                state.end()
            }
            Self::List(items) => {
                let mut seq = serializer.serialize_seq(Some(items.len()))?;
                for item in items {
                    seq.serialize_element(item)?;
                }
                seq.end()
            }
            Self::Map(entries) if entries.iter().all(|(k, _)| k.is_key_like()) => {
                let mut map = serializer.serialize_map(Some(entries.len()))?;
                for (key, value) in entries {
                    map.serialize_entry(&key.key_string(), value)?;
                }
                map.end()
            }
            // Non-scalar keys are rendered as a list of [key, value] pairs
            Self::Map(entries) => {
                let mut seq = serializer.serialize_seq(Some(entries.len()))?;
                for (key, value) in entries {
                    seq.serialize_element(&(key, value))?;
                }
                seq.end()
            }
            Self::Object { fields, .. } => {
                let mut map = serializer.serialize_map(Some(fields.len()))?;
                for (name, value) in fields {
                    map.serialize_entry(name, value)?;
                }
                map.end()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;
    use serde_json::json;

    #[test]
    fn test_zero_values() {
        assert_eq!(
            Value::zero_for(&TypeDescriptor::scalar(ScalarType::I32)),
            Value::Int(0)
        );
        assert_eq!(
            Value::zero_for(&TypeDescriptor::scalar(ScalarType::String)),
            Value::String(String::new())
        );
        let composite = TypeDescriptor::new("Person", TypeKind::Composite { fields: vec![] });
        assert!(Value::zero_for(&composite).is_null());
    }

    #[test]
    fn test_object_to_json_preserves_field_order() {
        let value = Value::object(
            "Person",
            [
                ("name", Value::String("Ada".to_string())),
                ("age", Value::Int(36)),
                ("tags", Value::List(vec![Value::Enum("Admin".to_string())])),
            ],
        );

        let json = serde_json::to_string(&value).unwrap();
        assert_eq!(json, r#"{"name":"Ada","age":36,"tags":["Admin"]}"#);
    }

    #[test]
    fn test_map_with_scalar_keys_is_object() {
        let value = Value::Map(vec![
            (Value::Int(1), Value::Bool(true)),
            (Value::Int(2), Value::Bool(false)),
        ]);
        assert_eq!(value.to_json(), json!({"1": true, "2": false}));
    }

    #[test]
    fn test_map_with_composite_keys_is_pair_list() {
        let key = Value::object("Point", [("x", Value::Int(1))]);
        let value = Value::Map(vec![(key, Value::Int(7))]);
        assert_eq!(value.to_json(), json!([[{"x": 1}, 7]]));
    }

    #[test]
    fn test_get_path() {
        let value = Value::object(
            "Person",
            [(
                "address",
                Value::object("Address", [("city", Value::String("Paris".to_string()))]),
            )],
        );
        assert_eq!(value.get_path("address.city").and_then(Value::as_str), Some("Paris"));
        assert!(value.get_path("address.zip").is_none());
    }

    #[test]
    fn test_deserialize_into_user_type() {
        #[derive(Debug, Deserialize, PartialEq)]
        struct Reading {
            sensor: String,
            values: Vec<i64>,
            timeout: Duration,
        }

        let value = Value::object(
            "Reading",
            [
                ("sensor", Value::String("t1".to_string())),
                ("values", Value::List(vec![Value::Int(3), Value::Int(4)])),
                ("timeout", Value::Duration(Duration::from_millis(1500))),
            ],
        );

        let reading: Reading = value.deserialize_into().unwrap();
        assert_eq!(
            reading,
            Reading {
                sensor: "t1".to_string(),
                values: vec![3, 4],
                timeout: Duration::from_millis(1500),
            }
        );
    }
}

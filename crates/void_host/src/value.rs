//! Raw values returned by host calls
//!
//! Host calls answer with plain data, handles, or containers of either.
//! The container kind (list, tuple, set) is preserved so callers that
//! re-wrap results can hand back the same shape they received.

use crate::handle::HostHandle;
use serde::{Deserialize, Serialize};

/// A raw value as the host model returns it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value")]
pub enum HostValue {
    /// The host's "nothing" value
    Null,
    /// Boolean value
    Bool(bool),
    /// Integer value
    Int(i64),
    /// Floating point value
    Float(f64),
    /// String value
    String(String),
    /// 3D vector
    Vec3([f64; 3]),
    /// Raw bytes (base64 encoded when serialized)
    #[serde(with = "base64_serde")]
    Bytes(Vec<u8>),
    /// A handle into the host model
    Handle(HostHandle),
    /// Ordered list
    List(Vec<HostValue>),
    /// Fixed-size tuple
    Tuple(Vec<HostValue>),
    /// Unordered set
    Set(Vec<HostValue>),
}

impl HostValue {
    /// Check for host-null: the `Null` value or a null handle
    pub fn is_null(&self) -> bool {
        match self {
            Self::Null => true,
            Self::Handle(handle) => handle.is_null(),
            _ => false,
        }
    }

    /// Whether this value is a host-native type (a handle) rather than plain data
    pub fn is_handle(&self) -> bool {
        matches!(self, Self::Handle(_))
    }

    /// Try to get as handle
    pub fn as_handle(&self) -> Option<HostHandle> {
        match self {
            Self::Handle(handle) => Some(*handle),
            _ => None,
        }
    }

    /// Try to get as bool
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Try to get as i64
    pub fn as_int(&self) -> Option<i64> {
        match self {
            Self::Int(i) => Some(*i),
            Self::Float(f) => Some(*f as i64),
            _ => None,
        }
    }

    /// Try to get as f64
    pub fn as_float(&self) -> Option<f64> {
        match self {
            Self::Float(f) => Some(*f),
            Self::Int(i) => Some(*i as f64),
            _ => None,
        }
    }

    /// Try to get as string
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }

    /// Elements of a list, tuple or set
    pub fn as_elements(&self) -> Option<&[HostValue]> {
        match self {
            Self::List(items) | Self::Tuple(items) | Self::Set(items) => Some(items),
            _ => None,
        }
    }
}

impl Default for HostValue {
    fn default() -> Self {
        Self::Null
    }
}

impl From<bool> for HostValue {
    fn from(v: bool) -> Self {
        Self::Bool(v)
    }
}

impl From<i32> for HostValue {
    fn from(v: i32) -> Self {
        Self::Int(v as i64)
    }
}

impl From<i64> for HostValue {
    fn from(v: i64) -> Self {
        Self::Int(v)
    }
}

impl From<f32> for HostValue {
    fn from(v: f32) -> Self {
        Self::Float(v as f64)
    }
}

impl From<f64> for HostValue {
    fn from(v: f64) -> Self {
        Self::Float(v)
    }
}

impl From<String> for HostValue {
    fn from(v: String) -> Self {
        Self::String(v)
    }
}

impl From<&str> for HostValue {
    fn from(v: &str) -> Self {
        Self::String(v.to_string())
    }
}

impl From<[f64; 3]> for HostValue {
    fn from(v: [f64; 3]) -> Self {
        Self::Vec3(v)
    }
}

impl From<HostHandle> for HostValue {
    fn from(v: HostHandle) -> Self {
        Self::Handle(v)
    }
}

impl<T: Into<HostValue>> From<Vec<T>> for HostValue {
    fn from(v: Vec<T>) -> Self {
        Self::List(v.into_iter().map(Into::into).collect())
    }
}

impl<T: Into<HostValue>> FromIterator<T> for HostValue {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        Self::List(iter.into_iter().map(Into::into).collect())
    }
}

/// Helper module for base64 serialization of bytes
mod base64_serde {
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(bytes: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
        use base64::Engine;
        let encoded = base64::engine::general_purpose::STANDARD.encode(bytes);
        serializer.serialize_str(&encoded)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<u8>, D::Error> {
        use base64::Engine;
        let s = String::deserialize(deserializer)?;
        base64::engine::general_purpose::STANDARD
            .decode(&s)
            .map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handle::HostClass;

    #[test]
    fn test_value_types() {
        assert!(HostValue::Null.is_null());
        assert_eq!(HostValue::from(42).as_int(), Some(42));
        assert_eq!(HostValue::from(2.5).as_float(), Some(2.5));
        assert_eq!(HostValue::from("hello").as_str(), Some("hello"));
    }

    #[test]
    fn test_null_handle_is_null() {
        let null = HostValue::from(HostHandle::null(HostClass::Object));
        assert!(null.is_null());
        assert!(null.is_handle());

        let live = HostValue::from(HostHandle::new(HostClass::Object, 1));
        assert!(!live.is_null());
    }

    #[test]
    fn test_serialized_shape() {
        let value = HostValue::Tuple(vec![
            HostValue::Handle(HostHandle::new(HostClass::Data, 9)),
            HostValue::Bytes(vec![1, 2, 3]),
        ]);

        let json = serde_json::to_string(&value).expect("serialize");
        assert!(json.contains("\"type\":\"Tuple\""));
        assert!(json.contains("AQID"));

        let back: HostValue = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(back, value);
    }
}

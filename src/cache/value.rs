//! Cache Value Module
//!
//! Scalar values accepted by the cache and the decoders used to read them back.

use serde::{Deserialize, Serialize, Serializer};

use crate::error::{CacheError, Result};

// == Cache Value ==
/// A scalar value that can be stored under a generated key.
///
/// Values are written to the store in their Redis wire form: text and bytes
/// verbatim, numbers as their decimal representation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CacheValue {
    Integer(i64),
    Float(f64),
    Text(String),
    Bytes(Vec<u8>),
}

impl CacheValue {
    /// Encodes the value as the bytes sent to the store.
    pub fn to_bytes(&self) -> Vec<u8> {
        match self {
            CacheValue::Integer(i) => i.to_string().into_bytes(),
            // Debug keeps the fractional part on whole floats ("2.0", not "2")
            CacheValue::Float(f) => format!("{:?}", f).into_bytes(),
            CacheValue::Text(s) => s.as_bytes().to_vec(),
            CacheValue::Bytes(b) => b.clone(),
        }
    }
}

impl From<&str> for CacheValue {
    fn from(value: &str) -> Self {
        CacheValue::Text(value.to_string())
    }
}

impl From<String> for CacheValue {
    fn from(value: String) -> Self {
        CacheValue::Text(value)
    }
}

impl From<Vec<u8>> for CacheValue {
    fn from(value: Vec<u8>) -> Self {
        CacheValue::Bytes(value)
    }
}

impl From<&[u8]> for CacheValue {
    fn from(value: &[u8]) -> Self {
        CacheValue::Bytes(value.to_vec())
    }
}

impl From<i64> for CacheValue {
    fn from(value: i64) -> Self {
        CacheValue::Integer(value)
    }
}

impl From<i32> for CacheValue {
    fn from(value: i32) -> Self {
        CacheValue::Integer(value.into())
    }
}

impl From<f64> for CacheValue {
    fn from(value: f64) -> Self {
        CacheValue::Float(value)
    }
}

// == Raw Value ==
/// Bytes exactly as returned by the store.
///
/// Serializes as a string when the bytes are valid UTF-8 and as a byte array
/// otherwise, so call history stays readable for the common case.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawValue(pub Vec<u8>);

impl Serialize for RawValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        match std::str::from_utf8(&self.0) {
            Ok(text) => serializer.serialize_str(text),
            Err(_) => serializer.serialize_bytes(&self.0),
        }
    }
}

// == Decoders ==
/// Interprets raw bytes as UTF-8 text.
pub fn decode_text(raw: Vec<u8>) -> Result<String> {
    String::from_utf8(raw).map_err(|e| CacheError::Decode(format!("invalid UTF-8: {}", e)))
}

/// Parses raw bytes as a decimal integer.
pub fn decode_integer(raw: Vec<u8>) -> Result<i64> {
    let text = decode_text(raw)?;
    text.trim()
        .parse()
        .map_err(|_| CacheError::Decode(format!("not an integer: {:?}", text)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wire_encoding() {
        assert_eq!(CacheValue::from("hello").to_bytes(), b"hello");
        assert_eq!(CacheValue::from(42).to_bytes(), b"42");
        assert_eq!(CacheValue::from(-7i64).to_bytes(), b"-7");
        assert_eq!(CacheValue::from(2.0).to_bytes(), b"2.0");
        assert_eq!(CacheValue::from(3.25).to_bytes(), b"3.25");
        assert_eq!(CacheValue::from(vec![0u8, 159, 146]).to_bytes(), vec![0u8, 159, 146]);
    }

    #[test]
    fn test_untagged_deserialize() {
        let values: Vec<CacheValue> = serde_json::from_str(r#"[42, 1.5, "hi", [1, 2]]"#).unwrap();
        assert_eq!(
            values,
            vec![
                CacheValue::Integer(42),
                CacheValue::Float(1.5),
                CacheValue::Text("hi".to_string()),
                CacheValue::Bytes(vec![1, 2]),
            ]
        );
    }

    #[test]
    fn test_raw_value_serialization() {
        assert_eq!(serde_json::to_string(&RawValue(b"abc".to_vec())).unwrap(), r#""abc""#);
        assert_eq!(serde_json::to_string(&RawValue(vec![255, 0])).unwrap(), "[255,0]");
    }

    #[test]
    fn test_decode_text() {
        assert_eq!(decode_text(b"hello".to_vec()).unwrap(), "hello");
        assert!(matches!(decode_text(vec![0xff, 0xfe]), Err(CacheError::Decode(_))));
    }

    #[test]
    fn test_decode_integer() {
        assert_eq!(decode_integer(b"42".to_vec()).unwrap(), 42);
        assert_eq!(decode_integer(b"-3".to_vec()).unwrap(), -3);
        assert!(matches!(decode_integer(b"4.2".to_vec()), Err(CacheError::Decode(_))));
        assert!(matches!(decode_integer(b"abc".to_vec()), Err(CacheError::Decode(_))));
    }
}

//! Serde adapters for the protobuf JSON mapping.
//!
//! Derived serde impls already give the camelCase field names, but write
//! `bytes` as arrays of numbers and 64-bit integers as JSON numbers. Rendered
//! messages route those fields through these modules instead:
//!
//! ```ignore
//! #[serde(with = "httprule_runtime::json::bytes")]
//! pub payload: Vec<u8>,
//! #[serde(with = "httprule_runtime::json::int64")]
//! pub size: i64,
//! ```
//!
//! Reading is lenient as in the mapping: integers are accepted as numbers or
//! strings, base64 in the standard or URL-safe alphabet with or without
//! padding, and `null` reads as the default value.
use std::{fmt::Display, str::FromStr};

use base64::{engine::general_purpose, Engine};
use serde_json::Value;

/// Decode protobuf JSON base64.
pub fn decode_base64(encoded: &str) -> Result<Vec<u8>, base64::DecodeError> {
    let engine = if encoded.contains(|c: char| c == '-' || c == '_') {
        &general_purpose::URL_SAFE_NO_PAD
    } else {
        &general_purpose::STANDARD_NO_PAD
    };

    engine.decode(encoded.trim_end_matches('='))
}

fn parse_int<T>(value: Value) -> Result<T, String>
where
    T: FromStr + Default,
    T::Err: Display,
{
    let text = match value {
        Value::Null => return Ok(T::default()),
        Value::Number(number) => number.to_string(),
        Value::String(text) => text,
        other => return Err(format!("expected an integer, found {}", other)),
    };

    text.parse()
        .map_err(|err| format!("invalid integer {:?}: {}", text, err))
}

/// `bytes` fields, as base64 strings.
pub mod bytes {
    use base64::{engine::general_purpose::STANDARD, Engine};
    use serde::{de::Error, Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&STANDARD.encode(value))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<u8>, D::Error> {
        match Option::<String>::deserialize(deserializer)? {
            Some(encoded) => super::decode_base64(&encoded).map_err(D::Error::custom),
            None => Ok(vec![]),
        }
    }
}

/// `repeated bytes` fields, as arrays of base64 strings.
pub mod bytes_list {
    use base64::{engine::general_purpose::STANDARD, Engine};
    use serde::{de::Error, Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(values: &[Vec<u8>], serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(values.iter().map(|value| STANDARD.encode(value)))
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Vec<Vec<u8>>, D::Error>
    where
        D: Deserializer<'de>,
    {
        Option::<Vec<String>>::deserialize(deserializer)?
            .unwrap_or_default()
            .iter()
            .map(|encoded| super::decode_base64(encoded).map_err(D::Error::custom))
            .collect()
    }
}

/// 64-bit integer fields, written as decimal strings.
pub mod int64 {
    use std::{fmt::Display, str::FromStr};

    use serde::{de::Error, Deserialize, Deserializer, Serializer};
    use serde_json::Value;

    pub fn serialize<T, S>(value: &T, serializer: S) -> Result<S::Ok, S::Error>
    where
        T: Display,
        S: Serializer,
    {
        serializer.collect_str(value)
    }

    pub fn deserialize<'de, T, D>(deserializer: D) -> Result<T, D::Error>
    where
        T: FromStr + Default,
        T::Err: Display,
        D: Deserializer<'de>,
    {
        super::parse_int(Value::deserialize(deserializer)?).map_err(D::Error::custom)
    }
}

/// `repeated` 64-bit integer fields, as arrays of decimal strings.
pub mod int64_list {
    use std::{fmt::Display, str::FromStr};

    use serde::{de::Error, Deserialize, Deserializer, Serializer};
    use serde_json::Value;

    pub fn serialize<T, S>(values: &[T], serializer: S) -> Result<S::Ok, S::Error>
    where
        T: Display,
        S: Serializer,
    {
        serializer.collect_seq(values.iter().map(ToString::to_string))
    }

    pub fn deserialize<'de, T, D>(deserializer: D) -> Result<Vec<T>, D::Error>
    where
        T: FromStr + Default,
        T::Err: Display,
        D: Deserializer<'de>,
    {
        Option::<Vec<Value>>::deserialize(deserializer)?
            .unwrap_or_default()
            .into_iter()
            .map(|value| super::parse_int(value).map_err(D::Error::custom))
            .collect()
    }
}

//! Generator options, read from the compiler's plugin parameter.
use std::str::FromStr;

use serde::Deserialize;

use crate::error::GenerateError;

/// What to do with request fields that cannot be read from a query string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnsupportedFieldPolicy {
    /// Fail generation.
    #[default]
    Reject,
    /// Leave the field unbound and log a warning.
    Skip,
}

/// What to do with streaming methods that carry an HTTP rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StreamingPolicy {
    #[default]
    Skip,
    Reject,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(default)]
pub struct GeneratorOptions {
    /// Repeated message and map fields reached by the query resolver.
    pub unsupported_query_fields: UnsupportedFieldPolicy,
    pub streaming: StreamingPolicy,
}

impl GeneratorOptions {
    /// Parse a `key=value,key=value` plugin parameter. Empty entries are
    /// ignored.
    pub fn from_parameter(parameter: &str) -> Result<Self, GenerateError> {
        let mut options = Self::default();

        for entry in parameter.split(',').map(str::trim).filter(|e| !e.is_empty()) {
            let (key, value) = entry.split_once('=').ok_or_else(|| GenerateError::InvalidOption {
                key: entry.to_string(),
                reason: "expected key=value".to_string(),
            })?;
            let (key, value) = (key.trim(), value.trim());

            match key {
                "unsupported_query_fields" => {
                    options.unsupported_query_fields = match value {
                        "reject" => UnsupportedFieldPolicy::Reject,
                        "skip" => UnsupportedFieldPolicy::Skip,
                        _ => return Err(invalid_value(key, value)),
                    }
                }
                "streaming" => {
                    options.streaming = match value {
                        "skip" => StreamingPolicy::Skip,
                        "reject" => StreamingPolicy::Reject,
                        _ => return Err(invalid_value(key, value)),
                    }
                }
                _ => {
                    return Err(GenerateError::InvalidOption {
                        key: key.to_string(),
                        reason: "unknown option".to_string(),
                    })
                }
            }
        }

        Ok(options)
    }
}

impl FromStr for GeneratorOptions {
    type Err = GenerateError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_parameter(s)
    }
}

fn invalid_value(key: &str, value: &str) -> GenerateError {
    GenerateError::InvalidOption {
        key: key.to_string(),
        reason: format!("invalid value {:?}", value),
    }
}

use httprule_pattern::PatternError;

/// Errors that abort route generation.
#[derive(Debug, thiserror::Error)]
pub enum GenerateError {
    #[error("invalid HTTP pattern on {method}: {source}")]
    Pattern {
        method: String,
        source: PatternError,
    },
    #[error("message {0} is not defined")]
    UnknownMessage(String),
    #[error("{method}: field {field_path} does not resolve in {message}")]
    UnresolvedPathField {
        method: String,
        field_path: String,
        message: String,
    },
    #[error("{kind} field {field_path} of {message} cannot be read from the query string")]
    UnsupportedQueryField {
        message: String,
        field_path: String,
        kind: &'static str,
    },
    #[error("streaming method {0} cannot be bound to HTTP")]
    StreamingMethod(String),
    #[error("invalid option {key:?}: {reason}")]
    InvalidOption { key: String, reason: String },
}

pub type Result<T, E = GenerateError> = std::result::Result<T, E>;

use crate::{bind::BindError, query::QueryError};

pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Failures while serving a route.
#[derive(Debug, thiserror::Error)]
pub enum HandlerError {
    #[error("Unsupported Content-Type: {0}")]
    UnsupportedContentType(String),
    #[error("Unsupported Accept: {0}")]
    UnsupportedAccept(String),
    #[error("invalid protobuf body: {0}")]
    DecodeProtobuf(#[from] prost::DecodeError),
    #[error("invalid JSON body: {0}")]
    DecodeJson(#[source] serde_json::Error),
    #[error("failed to encode JSON response: {0}")]
    EncodeJson(#[source] serde_json::Error),
    #[error(transparent)]
    Query(#[from] QueryError),
    #[error("cannot bind {field_path}: {source}")]
    Bind {
        field_path: String,
        source: BindError,
    },
    #[error("path {path:?} does not match {pattern:?}")]
    PathMismatch { path: String, pattern: String },
    /// Returned by the service method or an interceptor.
    #[error("{0}")]
    Service(BoxError),
}

impl HandlerError {
    /// Whether this error comes from content negotiation.
    pub fn is_media_type(&self) -> bool {
        matches!(
            self,
            HandlerError::UnsupportedContentType(_) | HandlerError::UnsupportedAccept(_)
        )
    }
}

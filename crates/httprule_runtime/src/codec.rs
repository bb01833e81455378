use bytes::Bytes;
use http::HeaderValue;
use serde::{de::DeserializeOwned, Serialize};

use crate::error::HandlerError;

pub const JSON: &str = "application/json";
pub const PROTOBUF: &str = "application/protobuf";
pub const X_PROTOBUF: &str = "application/x-protobuf";

/// Body encodings a route can read and write.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Encoding {
    Protobuf,
    Json,
}

impl Encoding {
    /// The encoding of a bare media type, as returned by [`media_type`].
    pub fn from_media_type(media_type: &str) -> Option<Self> {
        match media_type {
            PROTOBUF | X_PROTOBUF => Some(Encoding::Protobuf),
            JSON => Some(Encoding::Json),
            _ => None,
        }
    }

    /// The media type written for this encoding.
    pub fn media_type(self) -> &'static str {
        match self {
            Encoding::Protobuf => PROTOBUF,
            Encoding::Json => JSON,
        }
    }

    pub fn decode<M>(self, body: &[u8]) -> Result<M, HandlerError>
    where
        M: prost::Message + DeserializeOwned + Default,
    {
        match self {
            Encoding::Protobuf => Ok(M::decode(body)?),
            Encoding::Json => serde_json::from_slice(body).map_err(HandlerError::DecodeJson),
        }
    }

    pub fn encode<M>(self, message: &M) -> Result<Bytes, HandlerError>
    where
        M: prost::Message + Serialize,
    {
        match self {
            Encoding::Protobuf => Ok(message.encode_to_vec().into()),
            Encoding::Json => serde_json::to_vec(message)
                .map(Bytes::from)
                .map_err(HandlerError::EncodeJson),
        }
    }
}

/// The media type of a `Content-Type` header, lowercased and without
/// parameters. Empty when the header is missing or not valid text.
pub fn media_type(header: Option<&HeaderValue>) -> String {
    header
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.split(';').next())
        .map(|value| value.trim().to_ascii_lowercase())
        .unwrap_or_default()
}

/// The response media type for an `Accept` header.
///
/// Only the first listed type is considered. A missing or `*/*` value falls
/// back to the request's content type, or JSON when that is empty too.
pub fn negotiate(accept: Option<&HeaderValue>, content_type: &str) -> String {
    let first = media_type(accept)
        .split(',')
        .next()
        .map(|value| value.trim().to_string())
        .unwrap_or_default();

    match first.as_str() {
        "" | "*/*" if content_type.is_empty() => JSON.to_string(),
        "" | "*/*" => content_type.to_string(),
        _ => first,
    }
}

//! # Serving generated routes
//!
//! The request side of [`httprule`]: a [`RouteHandler`] takes an
//! [`http::Request`] for one [`Route`](httprule::Route), builds the request
//! message from the body, path and query string, runs it through the
//! interceptor chain and the service method, and writes the response in the
//! negotiated encoding.
//!
//! Supported media types are `application/json`, `application/protobuf` and
//! `application/x-protobuf`. JSON bodies follow the protobuf JSON mapping,
//! with [`json`] holding the field adapters rendered messages need for it.
//! How failures are answered is up to the [`CompletionCallback`], by default
//! [`DefaultCompletion`].
//!
//! The handler is independent of any server. Wiring it into a router is a
//! matter of mapping [`RouteHandler::http_rule`] to the router's own path
//! syntax.
pub mod bind;
pub mod codec;
mod error;
pub mod handler;
pub mod interceptor;
pub mod json;
pub mod path;
pub mod query;
pub mod status;

pub use self::{
    bind::{BindError, Bindable, FieldValue, FromScalar, Scalar},
    codec::Encoding,
    error::{BoxError, HandlerError},
    handler::{
        Completion, CompletionCallback, DefaultCompletion, RequestMessage, ResponseMessage,
        RouteHandler,
    },
    interceptor::{method_fn, CallContext, Interceptor, MethodFn, Next, UnaryMethod},
    query::QueryError,
    status::{Code, Status},
};

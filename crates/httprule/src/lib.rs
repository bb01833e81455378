//! # HTTP route binding for protobuf services
//!
//! Turns methods annotated with `google.api.http` rules into [`Route`]s: the
//! HTTP method and path pattern, which request fields are captured from the
//! path and which are read from the query string.
//!
//! ```text
//! rpc GetMessage(GetMessageRequest) returns (GetMessageResponse) {
//!     option (google.api.http) = { get: "/v1/messages/{message_id}" };
//! }
//! ```
//!
//! The [`Generator`] works on a [`Schema`] describing every message
//! reachable from the input files. Rendering routes into source code is left
//! to the caller, as is serving them. See the `httprule_runtime` crate for
//! the request handling side.
pub mod error;
pub mod model;
pub mod options;
pub mod path;
pub mod query;
pub mod route;
pub mod schema;

pub use self::{
    error::GenerateError,
    model::{FieldPath, FileRoutes, HttpMethod, PathParam, QueryParam, Route},
    options::{GeneratorOptions, StreamingPolicy, UnsupportedFieldPolicy},
    path::{claimed_paths, extract_path_params},
    query::QueryResolver,
    route::{full_method_name, Generator},
    schema::{Field, FieldType, File, HttpRule, Label, Message, Method, ScalarKind, Schema, Service},
};
pub use httprule_pattern::{PatternError, Template};

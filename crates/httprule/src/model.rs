use std::fmt;

use heck::{CamelCase, SnakeCase};
use serde::{Deserialize, Serialize};

use crate::schema::ScalarKind;

/// A dotted path of field names into a request message, e.g. `sub.subfield`.
///
/// Names are kept as declared. The query string key is the dotted form.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub struct FieldPath(Vec<String>);

impl FieldPath {
    pub fn new<I, S>(segments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self(segments.into_iter().map(Into::into).collect())
    }

    pub fn segments(&self) -> &[String] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Key used for this field in the query string.
    pub fn key(&self) -> String {
        self.0.join(".")
    }

    /// Accessor chain with each name in UpperCamel, e.g. `Sub.Subfield`.
    pub fn accessor(&self) -> String {
        self.render(|s| s.to_camel_case())
    }

    /// Accessor chain with each name in snake case, e.g. `sub.subfield`.
    pub fn snake_accessor(&self) -> String {
        self.render(|s| s.to_snake_case())
    }

    pub fn child(&self, name: &str) -> Self {
        let mut segments = self.0.clone();
        segments.push(name.to_string());
        Self(segments)
    }

    /// Whether `prefix` is this path or one of its ancestors.
    pub fn starts_with(&self, prefix: &FieldPath) -> bool {
        self.0.starts_with(&prefix.0)
    }

    /// Every proper, non-empty prefix, shortest first.
    ///
    /// `msg.sub.subfield` yields `msg` and `msg.sub`.
    pub fn prefixes(&self) -> impl Iterator<Item = FieldPath> + '_ {
        (1..self.0.len()).map(move |n| Self(self.0[..n].to_vec()))
    }

    fn render(&self, f: impl Fn(&str) -> String) -> String {
        self.0.iter().map(|s| f(s)).collect::<Vec<_>>().join(".")
    }
}

impl fmt::Display for FieldPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.key())
    }
}

impl From<&str> for FieldPath {
    fn from(dotted: &str) -> Self {
        Self::new(dotted.split('.').filter(|s| !s.is_empty()))
    }
}

impl From<String> for FieldPath {
    fn from(dotted: String) -> Self {
        Self::from(dotted.as_str())
    }
}

impl From<FieldPath> for String {
    fn from(path: FieldPath) -> Self {
        path.key()
    }
}

impl From<&[&str]> for FieldPath {
    fn from(segments: &[&str]) -> Self {
        Self::new(segments.iter().copied())
    }
}

/// HTTP method a route is bound to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum HttpMethod {
    Get,
    Put,
    Post,
    Delete,
    Patch,
}

impl HttpMethod {
    pub fn as_str(self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Put => "PUT",
            HttpMethod::Post => "POST",
            HttpMethod::Delete => "DELETE",
            HttpMethod::Patch => "PATCH",
        }
    }

    /// Whether requests on this method decode the request message from the
    /// body. Routes without a body read the query string instead.
    pub fn has_body(self) -> bool {
        self != HttpMethod::Get
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A request field captured from the URL path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PathParam {
    /// Position in the `/`-split path. Element 0 is the empty string before
    /// the leading slash, so the first real element is 1.
    pub index: usize,
    pub field_path: FieldPath,
    /// Number of path elements captured, `None` for the rest of the path.
    pub width: Option<usize>,
    /// Ancestor messages this param is the first to need, shortest first.
    /// They must exist before the leaf is assigned.
    pub instantiate: Vec<FieldPath>,
}

/// A request field read from the query string.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueryParam {
    pub field_path: FieldPath,
    pub kind: ScalarKind,
    pub repeated: bool,
}

/// Everything needed to bind one RPC method to an HTTP endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Route {
    pub service: String,
    pub method: String,
    /// `/package.Service/Method`.
    pub full_method: String,
    pub http_method: HttpMethod,
    pub pattern: String,
    /// Custom verb of the pattern, without the colon.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub verb: Option<String>,
    pub path_params: Vec<PathParam>,
    /// Empty unless `http_method` carries no body.
    pub query_params: Vec<QueryParam>,
    pub request_type: String,
    pub response_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub documentation: Option<String>,
}

impl Route {
    /// Handler name for generated code, e.g. `get_message`.
    pub fn handler_name(&self) -> String {
        self.method.to_snake_case()
    }
}

/// Routes produced for one input file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileRoutes {
    pub file: String,
    pub package: String,
    pub routes: Vec<Route>,
}

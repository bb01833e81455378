//! Descriptor view of the protobuf files handed to the generator.
//!
//! Only the pieces needed to build routes are modelled: services, their
//! methods with the resolved `google.api.http` rule, and the messages those
//! methods reference.
use std::{collections::HashMap, fmt};

use serde::{Deserialize, Serialize};

use crate::model::{FieldPath, HttpMethod};

/// Scalar protobuf types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScalarKind {
    /// Double type
    Double,
    /// Float type
    Float,
    /// Int type.
    Int32,
    /// Long type.
    Int64,
    /// Unsigned int type.
    Uint32,
    /// Unsigned long type.
    Uint64,
    /// Signed int type, zigzag encoded.
    Sint32,
    /// Signed long type, zigzag encoded.
    Sint64,
    /// Unsigned int type, fixed length.
    Fixed32,
    /// Unsigned long type, fixed length.
    Fixed64,
    /// Signed int type, fixed length.
    Sfixed32,
    /// Signed long type, fixed length.
    Sfixed64,
    /// Boolean type.
    Bool,
    /// String type.
    String,
    /// Bytes type.
    Bytes,
}

impl ScalarKind {
    /// The keyword used for this type in `.proto` files.
    pub fn as_str(self) -> &'static str {
        match self {
            ScalarKind::Double => "double",
            ScalarKind::Float => "float",
            ScalarKind::Int32 => "int32",
            ScalarKind::Int64 => "int64",
            ScalarKind::Uint32 => "uint32",
            ScalarKind::Uint64 => "uint64",
            ScalarKind::Sint32 => "sint32",
            ScalarKind::Sint64 => "sint64",
            ScalarKind::Fixed32 => "fixed32",
            ScalarKind::Fixed64 => "fixed64",
            ScalarKind::Sfixed32 => "sfixed32",
            ScalarKind::Sfixed64 => "sfixed64",
            ScalarKind::Bool => "bool",
            ScalarKind::String => "string",
            ScalarKind::Bytes => "bytes",
        }
    }
}

impl fmt::Display for ScalarKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Possible labels for fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Label {
    /// The field was marked as `optional`.
    Optional,
    /// The field was marked as `repeated`.
    Repeated,
}

/// Possible field types.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldType {
    Scalar(ScalarKind),
    /// An enum, by fully qualified name.
    Enum(String),
    /// A message, by fully qualified name.
    Message(String),
    Map {
        key: ScalarKind,
        value: Box<FieldType>,
    },
}

impl FieldType {
    /// Short name of the kind of type, as used in messages.
    pub fn describe(&self) -> &'static str {
        match self {
            FieldType::Scalar(_) => "scalar",
            FieldType::Enum(_) => "enum",
            FieldType::Message(_) => "message",
            FieldType::Map { .. } => "map",
        }
    }
}

/// A message's field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Field {
    /// Name of the field, as declared.
    pub name: String,
    /// Number of the field.
    pub number: u32,
    /// Label of the field, if any.
    pub label: Option<Label>,
    /// Type of the value of this field.
    pub ty: FieldType,
}

impl Field {
    pub fn new(name: impl Into<String>, number: u32, ty: FieldType) -> Self {
        Self {
            name: name.into(),
            number,
            label: None,
            ty,
        }
    }

    pub fn scalar(name: impl Into<String>, number: u32, kind: ScalarKind) -> Self {
        Self::new(name, number, FieldType::Scalar(kind))
    }

    pub fn message(name: impl Into<String>, number: u32, type_name: impl Into<String>) -> Self {
        Self::new(name, number, FieldType::Message(type_name.into()))
    }

    pub fn repeated(mut self) -> Self {
        self.label = Some(Label::Repeated);
        self
    }

    pub fn is_repeated(&self) -> bool {
        self.label == Some(Label::Repeated)
    }
}

/// A protobuf message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    /// Fully qualified name, without the leading dot.
    pub name: String,
    /// Fields in declaration order.
    pub fields: Vec<Field>,
}

impl Message {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: strip_dot(&name.into()).to_string(),
            fields: vec![],
        }
    }

    pub fn with_field(mut self, field: Field) -> Self {
        self.fields.push(field);
        self
    }

    pub fn field(&self, name: &str) -> Option<&Field> {
        self.fields.iter().find(|f| f.name == name)
    }
}

/// The `google.api.http` rule attached to a method.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HttpRule {
    Get(String),
    Put(String),
    Post(String),
    Delete(String),
    Patch(String),
    /// A custom verb, which is never bound.
    Custom { kind: String, path: String },
}

impl HttpRule {
    /// The HTTP method and pattern of this rule, `None` for custom verbs.
    pub fn method_and_pattern(&self) -> Option<(HttpMethod, &str)> {
        match self {
            HttpRule::Get(p) => Some((HttpMethod::Get, p)),
            HttpRule::Put(p) => Some((HttpMethod::Put, p)),
            HttpRule::Post(p) => Some((HttpMethod::Post, p)),
            HttpRule::Delete(p) => Some((HttpMethod::Delete, p)),
            HttpRule::Patch(p) => Some((HttpMethod::Patch, p)),
            HttpRule::Custom { .. } => None,
        }
    }
}

/// A service's method.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Method {
    pub name: String,
    /// Fully qualified request message name.
    pub input_type: String,
    /// Fully qualified response message name.
    pub output_type: String,
    pub client_streaming: bool,
    pub server_streaming: bool,
    pub http_rule: Option<HttpRule>,
    /// Leading comments of the method.
    pub documentation: Option<String>,
}

impl Method {
    pub fn unary(
        name: impl Into<String>,
        input_type: impl Into<String>,
        output_type: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            input_type: input_type.into(),
            output_type: output_type.into(),
            client_streaming: false,
            server_streaming: false,
            http_rule: None,
            documentation: None,
        }
    }

    pub fn with_rule(mut self, rule: HttpRule) -> Self {
        self.http_rule = Some(rule);
        self
    }

    pub fn is_streaming(&self) -> bool {
        self.client_streaming || self.server_streaming
    }
}

/// A protobuf service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Service {
    pub name: String,
    pub methods: Vec<Method>,
    pub documentation: Option<String>,
}

/// A protobuf file being generated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct File {
    /// Path of the file, as given to the compiler.
    pub name: String,
    pub package: String,
    pub services: Vec<Service>,
}

/// Index of every message reachable from the files being generated.
#[derive(Debug, Clone, Default)]
pub struct Schema {
    messages: HashMap<String, Message>,
}

impl Schema {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn define_message(&mut self, message: Message) -> &mut Self {
        self.messages.insert(message.name.clone(), message);
        self
    }

    /// Look up a message by its fully qualified name, with or without the
    /// leading dot used by descriptors.
    pub fn message(&self, name: &str) -> Option<&Message> {
        self.messages.get(strip_dot(name))
    }

    /// Walk `path` from `message` through singular message fields.
    pub fn resolve_field<'s>(
        &'s self,
        message: &'s Message,
        path: &FieldPath,
    ) -> Option<&'s Field> {
        let (last, parents) = path.segments().split_last()?;
        let mut current = message;

        for name in parents {
            let field = current.field(name)?;

            match &field.ty {
                FieldType::Message(type_name) if !field.is_repeated() => {
                    current = self.message(type_name)?;
                }
                _ => return None,
            }
        }

        current.field(last)
    }
}

fn strip_dot(name: &str) -> &str {
    name.strip_prefix('.').unwrap_or(name)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn schema() -> Schema {
        let mut schema = Schema::new();
        schema
            .define_message(
                Message::new(".pkg.Req")
                    .with_field(Field::scalar("id", 1, ScalarKind::String))
                    .with_field(Field::message("sub", 2, ".pkg.Sub"))
                    .with_field(Field::message("subs", 3, ".pkg.Sub").repeated()),
            )
            .define_message(
                Message::new("pkg.Sub")
                    .with_field(Field::scalar("subfield", 1, ScalarKind::String)),
            );
        schema
    }

    #[test]
    fn test_message_lookup_strips_dot() {
        let schema = schema();

        assert!(schema.message(".pkg.Req").is_some());
        assert!(schema.message("pkg.Req").is_some());
        assert_eq!(schema.message("pkg.Sub").unwrap().name, "pkg.Sub");
        assert!(schema.message("pkg.Missing").is_none());
    }

    #[test]
    fn test_resolve_field() {
        let schema = schema();
        let req = schema.message("pkg.Req").unwrap();

        let field = schema.resolve_field(req, &FieldPath::from("sub.subfield"));
        assert_eq!(field.map(|f| f.name.as_str()), Some("subfield"));

        assert!(schema.resolve_field(req, &FieldPath::from("id")).is_some());
        assert!(schema.resolve_field(req, &FieldPath::from("sub.missing")).is_none());
        assert!(schema.resolve_field(req, &FieldPath::from("id.nope")).is_none());
        assert!(schema.resolve_field(req, &FieldPath::from("subs.subfield")).is_none());
    }

    #[test]
    fn test_custom_rule_has_no_method() {
        let rule = HttpRule::Custom {
            kind: "HEAD".to_string(),
            path: "/v1/x".to_string(),
        };

        assert_eq!(rule.method_and_pattern(), None);
        assert_eq!(
            HttpRule::Post("/v1/x".to_string()).method_and_pattern(),
            Some((HttpMethod::Post, "/v1/x"))
        );
    }
}

use std::collections::HashSet;

use tracing::{debug, warn};

use crate::{
    error::{GenerateError, Result},
    model::{FieldPath, QueryParam},
    options::{GeneratorOptions, UnsupportedFieldPolicy},
    schema::{FieldType, Message, Schema},
};

/// Computes the query parameters of body-less routes.
///
/// Every scalar leaf reachable from the request message through singular
/// message fields becomes a parameter, unless the path already binds it.
pub struct QueryResolver<'a> {
    schema: &'a Schema,
    options: &'a GeneratorOptions,
}

impl<'a> QueryResolver<'a> {
    pub fn new(schema: &'a Schema, options: &'a GeneratorOptions) -> Self {
        Self { schema, options }
    }

    /// Resolve the query parameters of `request_type`, in field declaration
    /// order, descending into nested messages depth first.
    pub fn resolve(
        &self,
        request_type: &str,
        claimed: &HashSet<FieldPath>,
    ) -> Result<Vec<QueryParam>> {
        let message = self
            .schema
            .message(request_type)
            .ok_or_else(|| GenerateError::UnknownMessage(request_type.to_string()))?;

        let mut params = vec![];
        let mut visiting = vec![message.name.as_str()];
        self.walk(message, &FieldPath::default(), claimed, &mut visiting, &mut params)?;

        Ok(params)
    }

    fn walk(
        &self,
        message: &'a Message,
        prefix: &FieldPath,
        claimed: &HashSet<FieldPath>,
        visiting: &mut Vec<&'a str>,
        params: &mut Vec<QueryParam>,
    ) -> Result<()> {
        for field in &message.fields {
            let field_path = prefix.child(&field.name);

            if claimed.iter().any(|c| field_path.starts_with(c)) {
                continue;
            }

            match &field.ty {
                FieldType::Scalar(kind) => params.push(QueryParam {
                    field_path,
                    kind: *kind,
                    repeated: field.is_repeated(),
                }),
                FieldType::Message(_) if field.is_repeated() => {
                    self.unsupported(message, &field_path, "repeated message")?
                }
                FieldType::Message(type_name) => {
                    let nested = match self.schema.message(type_name) {
                        Some(nested) => nested,
                        None => {
                            warn!(
                                field = %field_path,
                                message = %type_name,
                                "message not found, field left unbound"
                            );
                            continue;
                        }
                    };

                    if visiting.contains(&nested.name.as_str()) {
                        debug!(
                            field = %field_path,
                            message = %nested.name,
                            "recursive message, not descending"
                        );
                        continue;
                    }

                    visiting.push(&nested.name);
                    self.walk(nested, &field_path, claimed, visiting, params)?;
                    visiting.pop();
                }
                FieldType::Map { .. } => {
                    self.unsupported(message, &field_path, field.ty.describe())?
                }
                FieldType::Enum(enum_name) => {
                    warn!(
                        field = %field_path,
                        enum_type = %enum_name,
                        "enum fields are not read from the query string"
                    );
                }
            }
        }

        Ok(())
    }

    fn unsupported(
        &self,
        message: &Message,
        field_path: &FieldPath,
        kind: &'static str,
    ) -> Result<()> {
        match self.options.unsupported_query_fields {
            UnsupportedFieldPolicy::Reject => Err(GenerateError::UnsupportedQueryField {
                message: message.name.clone(),
                field_path: field_path.key(),
                kind,
            }),
            UnsupportedFieldPolicy::Skip => {
                warn!(field = %field_path, kind, "field left unbound");
                Ok(())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{Field, ScalarKind};

    fn resolve(schema: &Schema, claimed: &[&str]) -> Result<Vec<QueryParam>> {
        let options = GeneratorOptions::default();
        let claimed = claimed.iter().map(|c| FieldPath::from(*c)).collect();

        QueryResolver::new(schema, &options).resolve("pkg.Req", &claimed)
    }

    fn keys(params: &[QueryParam]) -> Vec<String> {
        params.iter().map(|p| p.field_path.key()).collect()
    }

    fn schema(fields: Vec<Field>) -> Schema {
        let mut schema = Schema::new();
        let req = fields.into_iter().fold(Message::new("pkg.Req"), Message::with_field);

        schema.define_message(req).define_message(
            Message::new("pkg.Sub")
                .with_field(Field::scalar("subfield", 1, ScalarKind::String))
                .with_field(Field::scalar("count", 2, ScalarKind::Int32)),
        );
        schema
    }

    #[test]
    fn test_flat_scalars() {
        let schema = schema(vec![
            Field::scalar("message_id", 1, ScalarKind::String),
            Field::scalar("revision", 2, ScalarKind::Int64),
            Field::scalar("tags", 3, ScalarKind::String).repeated(),
        ]);
        let params = resolve(&schema, &["message_id"]).unwrap();

        assert_eq!(
            params,
            vec![
                QueryParam {
                    field_path: FieldPath::from("revision"),
                    kind: ScalarKind::Int64,
                    repeated: false,
                },
                QueryParam {
                    field_path: FieldPath::from("tags"),
                    kind: ScalarKind::String,
                    repeated: true,
                },
            ]
        );
    }

    #[test]
    fn test_nested_message_is_flattened() {
        let schema = schema(vec![
            Field::scalar("message_id", 1, ScalarKind::String),
            Field::message("sub", 2, ".pkg.Sub"),
            Field::scalar("after", 3, ScalarKind::Bool),
        ]);

        assert_eq!(
            keys(&resolve(&schema, &[]).unwrap()),
            vec!["message_id", "sub.subfield", "sub.count", "after"]
        );
        assert_eq!(
            keys(&resolve(&schema, &["sub.subfield"]).unwrap()),
            vec!["message_id", "sub.count", "after"]
        );
        assert_eq!(
            keys(&resolve(&schema, &["sub"]).unwrap()),
            vec!["message_id", "after"]
        );
    }

    #[test]
    fn test_recursive_message_terminates() {
        let mut schema = Schema::new();
        schema.define_message(
            Message::new("pkg.Req")
                .with_field(Field::scalar("name", 1, ScalarKind::String))
                .with_field(Field::message("parent", 2, "pkg.Req")),
        );

        assert_eq!(keys(&resolve(&schema, &[]).unwrap()), vec!["name"]);
    }

    #[test]
    fn test_enum_and_missing_message_are_skipped() {
        let schema = schema(vec![
            Field::new("state", 1, FieldType::Enum("pkg.State".to_string())),
            Field::message("ghost", 2, "pkg.Ghost"),
            Field::scalar("id", 3, ScalarKind::String),
        ]);

        assert_eq!(keys(&resolve(&schema, &[]).unwrap()), vec!["id"]);
    }

    #[test]
    fn test_unsupported_fields() {
        let schema = schema(vec![
            Field::scalar("id", 1, ScalarKind::String),
            Field::message("subs", 2, "pkg.Sub").repeated(),
            Field::new(
                "labels",
                3,
                FieldType::Map {
                    key: ScalarKind::String,
                    value: Box::new(FieldType::Scalar(ScalarKind::String)),
                },
            ),
        ]);

        assert!(matches!(
            resolve(&schema, &[]),
            Err(GenerateError::UnsupportedQueryField { field_path, kind: "repeated message", .. })
                if field_path == "subs"
        ));

        let options = GeneratorOptions {
            unsupported_query_fields: UnsupportedFieldPolicy::Skip,
            ..GeneratorOptions::default()
        };
        let params = QueryResolver::new(&schema, &options)
            .resolve("pkg.Req", &HashSet::new())
            .unwrap();
        assert_eq!(keys(&params), vec!["id"]);

        let labels = self::schema(vec![Field::new(
            "labels",
            1,
            FieldType::Map {
                key: ScalarKind::String,
                value: Box::new(FieldType::Scalar(ScalarKind::Int32)),
            },
        )]);
        assert!(matches!(
            resolve(&labels, &[]),
            Err(GenerateError::UnsupportedQueryField { kind: "map", .. })
        ));
    }

    #[test]
    fn test_unknown_request_type() {
        let schema = Schema::new();

        assert!(matches!(
            resolve(&schema, &[]),
            Err(GenerateError::UnknownMessage(name)) if name == "pkg.Req"
        ));
    }
}

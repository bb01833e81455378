use httprule_pattern::Template;
use tracing::{debug, info, warn};

use crate::{
    error::{GenerateError, Result},
    model::{FileRoutes, Route},
    options::{GeneratorOptions, StreamingPolicy},
    path::{claimed_paths, extract_path_params},
    query::QueryResolver,
    schema::{FieldType, File, HttpRule, Method, ScalarKind, Schema, Service},
};

/// Builds the [`Route`]s of annotated unary methods.
pub struct Generator<'a> {
    schema: &'a Schema,
    options: GeneratorOptions,
}

impl<'a> Generator<'a> {
    pub fn new(schema: &'a Schema, options: GeneratorOptions) -> Self {
        Self { schema, options }
    }

    /// Generate the routes of every file, in input order.
    ///
    /// Files without any bound method are left out. The first error aborts
    /// the whole run.
    pub fn generate(&self, files: &[File]) -> Result<Vec<FileRoutes>> {
        let mut generated = Vec::with_capacity(files.len());

        for file in files {
            let mut routes = vec![];

            for service in &file.services {
                for method in &service.methods {
                    if let Some(route) = self.route_for(&file.package, service, method)? {
                        routes.push(route);
                    }
                }
            }

            if routes.is_empty() {
                debug!(file = %file.name, "no HTTP rules, file skipped");
                continue;
            }

            generated.push(FileRoutes {
                file: file.name.clone(),
                package: file.package.clone(),
                routes,
            });
        }

        info!(
            files = generated.len(),
            routes = generated.iter().map(|f| f.routes.len()).sum::<usize>(),
            "routes generated"
        );

        Ok(generated)
    }

    /// Build the route of a single method, `None` if it is not bound.
    pub fn route_for(
        &self,
        package: &str,
        service: &Service,
        method: &Method,
    ) -> Result<Option<Route>> {
        let full_method = full_method_name(package, &service.name, &method.name);

        let rule = method
            .http_rule
            .as_ref()
            .and_then(HttpRule::method_and_pattern);
        let (http_method, pattern) = match rule {
            Some(rule) => rule,
            None => {
                debug!(method = %full_method, "no bindable HTTP rule");
                return Ok(None);
            }
        };

        if method.is_streaming() {
            match self.options.streaming {
                StreamingPolicy::Skip => {
                    debug!(method = %full_method, "streaming method skipped");
                    return Ok(None);
                }
                StreamingPolicy::Reject => return Err(GenerateError::StreamingMethod(full_method)),
            }
        }

        let template = Template::parse(pattern).map_err(|source| GenerateError::Pattern {
            method: full_method.clone(),
            source,
        })?;

        let request = self
            .schema
            .message(&method.input_type)
            .ok_or_else(|| GenerateError::UnknownMessage(method.input_type.clone()))?;
        let response = self
            .schema
            .message(&method.output_type)
            .ok_or_else(|| GenerateError::UnknownMessage(method.output_type.clone()))?;

        let path_params = extract_path_params(&template);

        for param in &path_params {
            let field = self.schema.resolve_field(request, &param.field_path).ok_or_else(|| {
                GenerateError::UnresolvedPathField {
                    method: full_method.clone(),
                    field_path: param.field_path.key(),
                    message: request.name.clone(),
                }
            })?;

            if field.is_repeated() || field.ty != FieldType::Scalar(ScalarKind::String) {
                warn!(
                    method = %full_method,
                    field = %param.field_path,
                    "path captures are bound as strings, field is not a singular string"
                );
            }
        }

        let query_params = if http_method.has_body() {
            vec![]
        } else {
            QueryResolver::new(self.schema, &self.options)
                .resolve(&request.name, &claimed_paths(&path_params))?
        };

        let route = Route {
            service: service.name.clone(),
            method: method.name.clone(),
            full_method,
            http_method,
            pattern: pattern.to_string(),
            verb: template.verb().map(str::to_string),
            path_params,
            query_params,
            request_type: request.name.clone(),
            response_type: response.name.clone(),
            documentation: method.documentation.clone(),
        };

        debug!(
            method = %route.full_method,
            http_method = %route.http_method,
            pattern = %route.pattern,
            path_params = route.path_params.len(),
            query_params = route.query_params.len(),
            "route built"
        );

        Ok(Some(route))
    }
}

/// The gRPC method name, `/package.Service/Method`.
pub fn full_method_name(package: &str, service: &str, method: &str) -> String {
    if package.is_empty() {
        format!("/{}/{}", service, method)
    } else {
        format!("/{}.{}/{}", package, service, method)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        model::{FieldPath, HttpMethod, PathParam},
        options::UnsupportedFieldPolicy,
        schema::{Field, Message},
    };

    fn schema() -> Schema {
        let mut schema = Schema::new();
        schema
            .define_message(
                Message::new("pkg.GetMessageRequest")
                    .with_field(Field::scalar("message_id", 1, ScalarKind::String))
                    .with_field(Field::scalar("message", 2, ScalarKind::String))
                    .with_field(Field::scalar("tags", 3, ScalarKind::String).repeated())
                    .with_field(Field::message("sub", 4, ".pkg.SubMessage")),
            )
            .define_message(
                Message::new("pkg.GetMessageResponse")
                    .with_field(Field::scalar("message_id", 1, ScalarKind::String))
                    .with_field(Field::scalar("message", 2, ScalarKind::String)),
            )
            .define_message(
                Message::new("pkg.SubMessage")
                    .with_field(Field::scalar("subfield", 1, ScalarKind::String)),
            )
            .define_message(
                Message::new("pkg.ListRequest")
                    .with_field(Field::message("filters", 1, "pkg.SubMessage").repeated()),
            );
        schema
    }

    fn method(name: &str, rule: HttpRule) -> Method {
        Method::unary(name, ".pkg.GetMessageRequest", ".pkg.GetMessageResponse").with_rule(rule)
    }

    fn service(methods: Vec<Method>) -> Service {
        Service {
            name: "Messaging".to_string(),
            methods,
            documentation: None,
        }
    }

    fn file(name: &str, services: Vec<Service>) -> File {
        File {
            name: name.to_string(),
            package: "pkg".to_string(),
            services,
        }
    }

    #[test]
    fn test_get_route() {
        let schema = schema();
        let gen = Generator::new(&schema, GeneratorOptions::default());
        let svc = service(vec![]);
        let route = gen
            .route_for(
                "pkg",
                &svc,
                &method("GetMessage", HttpRule::Get("/v1/messages/{message_id}".to_string())),
            )
            .unwrap()
            .unwrap();

        assert_eq!(route.full_method, "/pkg.Messaging/GetMessage");
        assert_eq!(route.http_method, HttpMethod::Get);
        assert_eq!(route.request_type, "pkg.GetMessageRequest");
        assert_eq!(route.response_type, "pkg.GetMessageResponse");
        assert_eq!(route.handler_name(), "get_message");
        assert_eq!(route.verb, None);
        assert_eq!(
            route.path_params,
            vec![PathParam {
                index: 3,
                field_path: FieldPath::from("message_id"),
                width: Some(1),
                instantiate: vec![],
            }]
        );

        let keys: Vec<_> = route.query_params.iter().map(|q| q.field_path.key()).collect();
        assert_eq!(keys, vec!["message", "tags", "sub.subfield"]);
    }

    #[test]
    fn test_body_routes_have_no_query_params() {
        let schema = schema();
        let gen = Generator::new(&schema, GeneratorOptions::default());
        let svc = service(vec![]);
        let route = gen
            .route_for(
                "pkg",
                &svc,
                &method(
                    "UpdateMessage",
                    HttpRule::Put("/v1/messages/{message_id}/{sub.subfield}".to_string()),
                ),
            )
            .unwrap()
            .unwrap();

        assert_eq!(route.http_method, HttpMethod::Put);
        assert!(route.query_params.is_empty());
        assert_eq!(route.path_params[1].instantiate, vec![FieldPath::from("sub")]);
    }

    #[test]
    fn test_custom_verb_route() {
        let schema = schema();
        let gen = Generator::new(&schema, GeneratorOptions::default());
        let svc = service(vec![]);
        let rule = HttpRule::Post("/v1/messages/{message_id}:publish".to_string());
        let route = gen
            .route_for("pkg", &svc, &method("PublishMessage", rule))
            .unwrap()
            .unwrap();

        assert_eq!(route.verb.as_deref(), Some("publish"));
        assert_eq!(route.pattern, "/v1/messages/{message_id}:publish");
        assert_eq!(route.path_params[0].index, 3);
        assert_eq!(route.path_params[0].field_path, FieldPath::from("message_id"));
    }

    #[test]
    fn test_unbound_methods_are_skipped() {
        let schema = schema();
        let gen = Generator::new(&schema, GeneratorOptions::default());

        let mut streaming = method("Watch", HttpRule::Get("/v1/watch".to_string()));
        streaming.server_streaming = true;

        let files = vec![
            file(
                "messaging.proto",
                vec![service(vec![
                    Method::unary("Plain", "pkg.GetMessageRequest", "pkg.GetMessageResponse"),
                    method(
                        "Custom",
                        HttpRule::Custom {
                            kind: "HEAD".to_string(),
                            path: "/v1/head".to_string(),
                        },
                    ),
                    streaming.clone(),
                    method("Get", HttpRule::Get("/v1/messages".to_string())),
                ])],
            ),
            file("empty.proto", vec![service(vec![streaming])]),
        ];

        let generated = gen.generate(&files).unwrap();

        assert_eq!(generated.len(), 1);
        assert_eq!(generated[0].file, "messaging.proto");
        let names: Vec<_> = generated[0].routes.iter().map(|r| r.method.as_str()).collect();
        assert_eq!(names, vec!["Get"]);
    }

    #[test]
    fn test_streaming_reject() {
        let schema = schema();
        let options = GeneratorOptions {
            streaming: StreamingPolicy::Reject,
            ..GeneratorOptions::default()
        };
        let mut streaming = method("Watch", HttpRule::Get("/v1/watch".to_string()));
        streaming.client_streaming = true;

        let err = Generator::new(&schema, options)
            .generate(&[file("a.proto", vec![service(vec![streaming])])])
            .unwrap_err();

        assert!(matches!(
            err,
            GenerateError::StreamingMethod(name) if name == "/pkg.Messaging/Watch"
        ));
    }

    #[test]
    fn test_route_order() {
        let schema = schema();
        let gen = Generator::new(&schema, GeneratorOptions::default());
        let mut other = service(vec![method("C", HttpRule::Delete("/v1/c".to_string()))]);
        other.name = "Other".to_string();

        let generated = gen
            .generate(&[file(
                "a.proto",
                vec![
                    service(vec![
                        method("A", HttpRule::Post("/v1/a".to_string())),
                        method("B", HttpRule::Patch("/v1/b".to_string())),
                    ]),
                    other,
                ],
            )])
            .unwrap();

        let names: Vec<_> = generated[0].routes.iter().map(|r| r.full_method.as_str()).collect();
        assert_eq!(names, vec!["/pkg.Messaging/A", "/pkg.Messaging/B", "/pkg.Other/C"]);
    }

    #[test]
    fn test_generation_errors() {
        let schema = schema();
        let gen = Generator::new(&schema, GeneratorOptions::default());
        let svc = service(vec![]);

        let err = gen
            .route_for("pkg", &svc, &method("Bad", HttpRule::Get("v1/no-slash".to_string())))
            .unwrap_err();
        assert!(matches!(err, GenerateError::Pattern { .. }));

        let err = gen
            .route_for("pkg", &svc, &method("Bad", HttpRule::Get("/v1/{missing}".to_string())))
            .unwrap_err();
        assert!(matches!(
            err,
            GenerateError::UnresolvedPathField { field_path, .. } if field_path == "missing"
        ));

        let unknown = Method::unary("Bad", "pkg.Nope", "pkg.GetMessageResponse")
            .with_rule(HttpRule::Post("/v1/x".to_string()));
        let err = gen.route_for("pkg", &svc, &unknown).unwrap_err();
        assert!(matches!(err, GenerateError::UnknownMessage(name) if name == "pkg.Nope"));
    }

    #[test]
    fn test_unsupported_query_field_policy() {
        let schema = schema();
        let svc = service(vec![]);
        let list = Method::unary("List", "pkg.ListRequest", "pkg.GetMessageResponse")
            .with_rule(HttpRule::Get("/v1/list".to_string()));

        let err = Generator::new(&schema, GeneratorOptions::default())
            .route_for("pkg", &svc, &list)
            .unwrap_err();
        assert!(matches!(err, GenerateError::UnsupportedQueryField { .. }));

        let options = GeneratorOptions {
            unsupported_query_fields: UnsupportedFieldPolicy::Skip,
            ..GeneratorOptions::default()
        };
        let route = Generator::new(&schema, options)
            .route_for("pkg", &svc, &list)
            .unwrap()
            .unwrap();
        assert!(route.query_params.is_empty());
    }

    #[test]
    fn test_full_method_name() {
        assert_eq!(full_method_name("a.b", "Svc", "Do"), "/a.b.Svc/Do");
        assert_eq!(full_method_name("", "Svc", "Do"), "/Svc/Do");
    }
}

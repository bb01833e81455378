//! Messaging and AllPattern services served over HTTP.
//!
//! `messaging.v1.rs` and `all_pattern.v1.rs` hold what the compiler plugin
//! renders for the protos below. [`proto_files`] describes those protos so
//! the routes can be generated and served side by side.
use httprule::{
    Field, File, FileRoutes, GenerateError, Generator, GeneratorOptions, HttpRule, Message, Method,
    Route, ScalarKind, Schema, Service,
};

#[path = "./messaging.v1.rs"]
pub mod messaging;

#[path = "./all_pattern.v1.rs"]
pub mod all_pattern;

pub mod service;


const SCALARS: [(&str, ScalarKind); 15] = [
    ("double", ScalarKind::Double),
    ("float", ScalarKind::Float),
    ("int32", ScalarKind::Int32),
    ("int64", ScalarKind::Int64),
    ("uint32", ScalarKind::Uint32),
    ("uint64", ScalarKind::Uint64),
    ("sint32", ScalarKind::Sint32),
    ("sint64", ScalarKind::Sint64),
    ("fixed32", ScalarKind::Fixed32),
    ("fixed64", ScalarKind::Fixed64),
    ("sfixed32", ScalarKind::Sfixed32),
    ("sfixed64", ScalarKind::Sfixed64),
    ("bool", ScalarKind::Bool),
    ("string", ScalarKind::String),
    ("bytes", ScalarKind::Bytes),
];

/// The descriptors of `messaging.proto` and `all_pattern.proto`.
pub fn proto_files() -> (Schema, Vec<File>) {
    let mut schema = Schema::new();

    let sub = ".messaging.v1.SubMessage";
    schema
        .define_message(
            Message::new(sub).with_field(Field::scalar("subfield", 1, ScalarKind::String)),
        )
        .define_message(
            Message::new(".messaging.v1.GetMessageRequest")
                .with_field(Field::scalar("message_id", 1, ScalarKind::String))
                .with_field(Field::scalar("message", 2, ScalarKind::String))
                .with_field(Field::scalar("tags", 3, ScalarKind::String).repeated()),
        )
        .define_message(
            Message::new(".messaging.v1.GetMessageResponse")
                .with_field(Field::scalar("message_id", 1, ScalarKind::String))
                .with_field(Field::scalar("message", 2, ScalarKind::String))
                .with_field(Field::scalar("tags", 3, ScalarKind::String).repeated()),
        );

    for name in ["UpdateMessageRequest", "UpdateMessageResponse"] {
        schema.define_message(
            Message::new(format!(".messaging.v1.{}", name))
                .with_field(Field::scalar("message_id", 1, ScalarKind::String))
                .with_field(Field::message("sub", 2, sub))
                .with_field(Field::scalar("message", 3, ScalarKind::String)),
        );
    }

    for name in ["CreateMessageRequest", "CreateMessageResponse"] {
        let nested = format!(".messaging.v1.{}.Message", name);

        schema
            .define_message(Message::new(nested.as_str()).with_field(Field::message("sub", 1, sub)))
            .define_message(
                Message::new(format!(".messaging.v1.{}", name))
                    .with_field(Field::scalar("message_id", 1, ScalarKind::String))
                    .with_field(Field::message("sub", 2, sub))
                    .with_field(Field::message("msg", 3, nested.as_str()))
                    .with_field(Field::scalar("opt", 4, ScalarKind::String)),
            );
    }

    let singular = SCALARS
        .iter()
        .zip(1..)
        .map(|((name, kind), number)| Field::scalar(*name, number, *kind));
    let repeated = SCALARS
        .iter()
        .zip(16..)
        .map(|((name, kind), number)| {
            Field::scalar(format!("repeated_{}", name), number, *kind).repeated()
        });
    schema.define_message(
        singular
            .chain(repeated)
            .fold(Message::new(".all_pattern.v1.AllPatternMessage"), Message::with_field),
    );

    let messaging = File {
        name: "messaging.proto".to_string(),
        package: "messaging.v1".to_string(),
        services: vec![Service {
            name: "Messaging".to_string(),
            methods: vec![
                Method::unary(
                    "GetMessage",
                    ".messaging.v1.GetMessageRequest",
                    ".messaging.v1.GetMessageResponse",
                )
                .with_rule(HttpRule::Get("/v1/messages/{message_id}".to_string())),
                Method::unary(
                    "UpdateMessage",
                    ".messaging.v1.UpdateMessageRequest",
                    ".messaging.v1.UpdateMessageResponse",
                )
                .with_rule(HttpRule::Put("/v1/messages/{message_id}/{sub.subfield}".to_string())),
                Method::unary(
                    "CreateMessage",
                    ".messaging.v1.CreateMessageRequest",
                    ".messaging.v1.CreateMessageResponse",
                )
                .with_rule(HttpRule::Post(
                    "/v1/messages/{message_id}/{msg.sub.subfield}/{sub.subfield}".to_string(),
                )),
            ],
            documentation: None,
        }],
    };

    let all_pattern = File {
        name: "all_pattern.proto".to_string(),
        package: "all_pattern.v1".to_string(),
        services: vec![Service {
            name: "AllPattern".to_string(),
            methods: vec![Method::unary(
                "AllPattern",
                ".all_pattern.v1.AllPatternMessage",
                ".all_pattern.v1.AllPatternMessage",
            )
            .with_rule(HttpRule::Get("/all/pattern".to_string()))],
            documentation: None,
        }],
    };

    (schema, vec![messaging, all_pattern])
}

/// Generate the routes of [`proto_files`].
pub fn generate_routes(options: GeneratorOptions) -> Result<Vec<FileRoutes>, GenerateError> {
    let (schema, files) = proto_files();

    Generator::new(&schema, options).generate(&files)
}

/// Find a generated route by its `/package.Service/Method` name.
pub fn find_route(files: &[FileRoutes], full_method: &str) -> Option<Route> {
    files
        .iter()
        .flat_map(|file| &file.routes)
        .find(|route| route.full_method == full_method)
        .cloned()
}

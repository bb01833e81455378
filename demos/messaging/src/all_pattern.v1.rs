use std::sync::Arc;

use httprule::Route;
use httprule_runtime::{
    json, method_fn, BindError, Bindable, BoxError, CallContext, FieldValue, RouteHandler,
};
use serde::{Deserialize, Serialize};

/// Every scalar type, singular and repeated.
#[derive(Clone, PartialEq, ::prost::Message, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct AllPatternMessage {
    #[prost(double, tag = "1")]
    pub double: f64,
    #[prost(float, tag = "2")]
    pub float: f32,
    #[prost(int32, tag = "3")]
    pub int32: i32,
    #[prost(int64, tag = "4")]
    #[serde(with = "json::int64")]
    pub int64: i64,
    #[prost(uint32, tag = "5")]
    pub uint32: u32,
    #[prost(uint64, tag = "6")]
    #[serde(with = "json::int64")]
    pub uint64: u64,
    #[prost(sint32, tag = "7")]
    pub sint32: i32,
    #[prost(sint64, tag = "8")]
    #[serde(with = "json::int64")]
    pub sint64: i64,
    #[prost(fixed32, tag = "9")]
    pub fixed32: u32,
    #[prost(fixed64, tag = "10")]
    #[serde(with = "json::int64")]
    pub fixed64: u64,
    #[prost(sfixed32, tag = "11")]
    pub sfixed32: i32,
    #[prost(sfixed64, tag = "12")]
    #[serde(with = "json::int64")]
    pub sfixed64: i64,
    #[prost(bool, tag = "13")]
    pub bool: bool,
    #[prost(string, tag = "14")]
    pub string: String,
    #[prost(bytes, tag = "15")]
    #[serde(with = "json::bytes")]
    pub bytes: Vec<u8>,
    #[prost(double, repeated, tag = "16")]
    #[serde(alias = "repeated_double")]
    pub repeated_double: Vec<f64>,
    #[prost(float, repeated, tag = "17")]
    #[serde(alias = "repeated_float")]
    pub repeated_float: Vec<f32>,
    #[prost(int32, repeated, tag = "18")]
    #[serde(alias = "repeated_int32")]
    pub repeated_int32: Vec<i32>,
    #[prost(int64, repeated, tag = "19")]
    #[serde(with = "json::int64_list", alias = "repeated_int64")]
    pub repeated_int64: Vec<i64>,
    #[prost(uint32, repeated, tag = "20")]
    #[serde(alias = "repeated_uint32")]
    pub repeated_uint32: Vec<u32>,
    #[prost(uint64, repeated, tag = "21")]
    #[serde(with = "json::int64_list", alias = "repeated_uint64")]
    pub repeated_uint64: Vec<u64>,
    #[prost(sint32, repeated, tag = "22")]
    #[serde(alias = "repeated_sint32")]
    pub repeated_sint32: Vec<i32>,
    #[prost(sint64, repeated, tag = "23")]
    #[serde(with = "json::int64_list", alias = "repeated_sint64")]
    pub repeated_sint64: Vec<i64>,
    #[prost(fixed32, repeated, tag = "24")]
    #[serde(alias = "repeated_fixed32")]
    pub repeated_fixed32: Vec<u32>,
    #[prost(fixed64, repeated, tag = "25")]
    #[serde(with = "json::int64_list", alias = "repeated_fixed64")]
    pub repeated_fixed64: Vec<u64>,
    #[prost(sfixed32, repeated, tag = "26")]
    #[serde(alias = "repeated_sfixed32")]
    pub repeated_sfixed32: Vec<i32>,
    #[prost(sfixed64, repeated, tag = "27")]
    #[serde(with = "json::int64_list", alias = "repeated_sfixed64")]
    pub repeated_sfixed64: Vec<i64>,
    #[prost(bool, repeated, tag = "28")]
    #[serde(alias = "repeated_bool")]
    pub repeated_bool: Vec<bool>,
    #[prost(string, repeated, tag = "29")]
    #[serde(alias = "repeated_string")]
    pub repeated_string: Vec<String>,
    #[prost(bytes, repeated, tag = "30")]
    #[serde(with = "json::bytes_list", alias = "repeated_bytes")]
    pub repeated_bytes: Vec<Vec<u8>>,
}

impl Bindable for AllPatternMessage {
    fn message_mut(&mut self, _field: &str) -> Option<&mut dyn Bindable> {
        None
    }

    fn assign(&mut self, field: &str, value: FieldValue) -> Result<(), BindError> {
        match field {
            "double" => self.double = value.into_single()?,
            "float" => self.float = value.into_single()?,
            "int32" => self.int32 = value.into_single()?,
            "int64" => self.int64 = value.into_single()?,
            "uint32" => self.uint32 = value.into_single()?,
            "uint64" => self.uint64 = value.into_single()?,
            "sint32" => self.sint32 = value.into_single()?,
            "sint64" => self.sint64 = value.into_single()?,
            "fixed32" => self.fixed32 = value.into_single()?,
            "fixed64" => self.fixed64 = value.into_single()?,
            "sfixed32" => self.sfixed32 = value.into_single()?,
            "sfixed64" => self.sfixed64 = value.into_single()?,
            "bool" => self.bool = value.into_single()?,
            "string" => self.string = value.into_single()?,
            "bytes" => self.bytes = value.into_single()?,
            "repeated_double" => self.repeated_double = value.into_list()?,
            "repeated_float" => self.repeated_float = value.into_list()?,
            "repeated_int32" => self.repeated_int32 = value.into_list()?,
            "repeated_int64" => self.repeated_int64 = value.into_list()?,
            "repeated_uint32" => self.repeated_uint32 = value.into_list()?,
            "repeated_uint64" => self.repeated_uint64 = value.into_list()?,
            "repeated_sint32" => self.repeated_sint32 = value.into_list()?,
            "repeated_sint64" => self.repeated_sint64 = value.into_list()?,
            "repeated_fixed32" => self.repeated_fixed32 = value.into_list()?,
            "repeated_fixed64" => self.repeated_fixed64 = value.into_list()?,
            "repeated_sfixed32" => self.repeated_sfixed32 = value.into_list()?,
            "repeated_sfixed64" => self.repeated_sfixed64 = value.into_list()?,
            "repeated_bool" => self.repeated_bool = value.into_list()?,
            "repeated_string" => self.repeated_string = value.into_list()?,
            "repeated_bytes" => self.repeated_bytes = value.into_list()?,
            _ => return Err(BindError::unknown_field(field)),
        }
        Ok(())
    }
}

/// The `all_pattern.v1.AllPattern` service.
#[async_trait::async_trait]
pub trait AllPattern: Send + Sync + 'static {
    async fn all_pattern(
        &self,
        ctx: &CallContext,
        req: AllPatternMessage,
    ) -> Result<AllPatternMessage, BoxError>;
}

/// Builds a [`RouteHandler`] per `AllPattern` method.
pub struct AllPatternHttpConverter<S> {
    service: Arc<S>,
}

impl<S: AllPattern> AllPatternHttpConverter<S> {
    pub fn new(service: S) -> Self {
        Self {
            service: Arc::new(service),
        }
    }

    pub fn all_pattern(&self, route: Route) -> RouteHandler<AllPatternMessage, AllPatternMessage> {
        let service = self.service.clone();

        RouteHandler::new(
            route,
            method_fn(move |ctx: CallContext, req: AllPatternMessage| {
                let service = service.clone();
                async move { service.all_pattern(&ctx, req).await }
            }),
        )
    }
}

use std::sync::Arc;

use httprule::Route;
use httprule_runtime::{
    method_fn, BindError, Bindable, BoxError, CallContext, FieldValue, RouteHandler,
};
use serde::{Deserialize, Serialize};

#[derive(Clone, PartialEq, ::prost::Message, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SubMessage {
    #[prost(string, tag = "1")]
    pub subfield: String,
}

#[derive(Clone, PartialEq, ::prost::Message, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct GetMessageRequest {
    #[prost(string, tag = "1")]
    #[serde(alias = "message_id")]
    pub message_id: String,
    #[prost(string, tag = "2")]
    pub message: String,
    #[prost(string, repeated, tag = "3")]
    pub tags: Vec<String>,
}

#[derive(Clone, PartialEq, ::prost::Message, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct GetMessageResponse {
    #[prost(string, tag = "1")]
    #[serde(alias = "message_id")]
    pub message_id: String,
    #[prost(string, tag = "2")]
    pub message: String,
    #[prost(string, repeated, tag = "3")]
    pub tags: Vec<String>,
}

#[derive(Clone, PartialEq, ::prost::Message, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct UpdateMessageRequest {
    #[prost(string, tag = "1")]
    #[serde(alias = "message_id")]
    pub message_id: String,
    #[prost(message, optional, tag = "2")]
    pub sub: Option<SubMessage>,
    #[prost(string, tag = "3")]
    pub message: String,
}

#[derive(Clone, PartialEq, ::prost::Message, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct UpdateMessageResponse {
    #[prost(string, tag = "1")]
    #[serde(alias = "message_id")]
    pub message_id: String,
    #[prost(message, optional, tag = "2")]
    pub sub: Option<SubMessage>,
    #[prost(string, tag = "3")]
    pub message: String,
}

#[derive(Clone, PartialEq, ::prost::Message, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CreateMessageRequest {
    #[prost(string, tag = "1")]
    #[serde(alias = "message_id")]
    pub message_id: String,
    #[prost(message, optional, tag = "2")]
    pub sub: Option<SubMessage>,
    #[prost(message, optional, tag = "3")]
    pub msg: Option<create_message_request::Message>,
    #[prost(string, tag = "4")]
    pub opt: String,
}

pub mod create_message_request {
    use serde::{Deserialize, Serialize};

    #[derive(Clone, PartialEq, ::prost::Message, Serialize, Deserialize)]
    #[serde(default, rename_all = "camelCase")]
    pub struct Message {
        #[prost(message, optional, tag = "1")]
        pub sub: Option<super::SubMessage>,
    }
}

#[derive(Clone, PartialEq, ::prost::Message, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CreateMessageResponse {
    #[prost(string, tag = "1")]
    #[serde(alias = "message_id")]
    pub message_id: String,
    #[prost(message, optional, tag = "2")]
    pub sub: Option<SubMessage>,
    #[prost(message, optional, tag = "3")]
    pub msg: Option<create_message_response::Message>,
    #[prost(string, tag = "4")]
    pub opt: String,
}

pub mod create_message_response {
    use serde::{Deserialize, Serialize};

    #[derive(Clone, PartialEq, ::prost::Message, Serialize, Deserialize)]
    #[serde(default, rename_all = "camelCase")]
    pub struct Message {
        #[prost(message, optional, tag = "1")]
        pub sub: Option<super::SubMessage>,
    }
}

impl Bindable for SubMessage {
    fn message_mut(&mut self, _field: &str) -> Option<&mut dyn Bindable> {
        None
    }

    fn assign(&mut self, field: &str, value: FieldValue) -> Result<(), BindError> {
        match field {
            "subfield" => self.subfield = value.into_single()?,
            _ => return Err(BindError::unknown_field(field)),
        }
        Ok(())
    }
}

impl Bindable for GetMessageRequest {
    fn message_mut(&mut self, _field: &str) -> Option<&mut dyn Bindable> {
        None
    }

    fn assign(&mut self, field: &str, value: FieldValue) -> Result<(), BindError> {
        match field {
            "message_id" => self.message_id = value.into_single()?,
            "message" => self.message = value.into_single()?,
            "tags" => self.tags = value.into_list()?,
            _ => return Err(BindError::unknown_field(field)),
        }
        Ok(())
    }
}

impl Bindable for UpdateMessageRequest {
    fn message_mut(&mut self, field: &str) -> Option<&mut dyn Bindable> {
        match field {
            "sub" => Some(self.sub.get_or_insert_with(Default::default)),
            _ => None,
        }
    }

    fn assign(&mut self, field: &str, value: FieldValue) -> Result<(), BindError> {
        match field {
            "message_id" => self.message_id = value.into_single()?,
            "message" => self.message = value.into_single()?,
            _ => return Err(BindError::unknown_field(field)),
        }
        Ok(())
    }
}

impl Bindable for CreateMessageRequest {
    fn message_mut(&mut self, field: &str) -> Option<&mut dyn Bindable> {
        match field {
            "sub" => Some(self.sub.get_or_insert_with(Default::default)),
            "msg" => Some(self.msg.get_or_insert_with(Default::default)),
            _ => None,
        }
    }

    fn assign(&mut self, field: &str, value: FieldValue) -> Result<(), BindError> {
        match field {
            "message_id" => self.message_id = value.into_single()?,
            "opt" => self.opt = value.into_single()?,
            _ => return Err(BindError::unknown_field(field)),
        }
        Ok(())
    }
}

impl Bindable for create_message_request::Message {
    fn message_mut(&mut self, field: &str) -> Option<&mut dyn Bindable> {
        match field {
            "sub" => Some(self.sub.get_or_insert_with(Default::default)),
            _ => None,
        }
    }

    fn assign(&mut self, field: &str, _value: FieldValue) -> Result<(), BindError> {
        Err(BindError::unknown_field(field))
    }
}

/// The `messaging.v1.Messaging` service.
#[async_trait::async_trait]
pub trait Messaging: Send + Sync + 'static {
    async fn get_message(
        &self,
        ctx: &CallContext,
        req: GetMessageRequest,
    ) -> Result<GetMessageResponse, BoxError>;

    async fn update_message(
        &self,
        ctx: &CallContext,
        req: UpdateMessageRequest,
    ) -> Result<UpdateMessageResponse, BoxError>;

    async fn create_message(
        &self,
        ctx: &CallContext,
        req: CreateMessageRequest,
    ) -> Result<CreateMessageResponse, BoxError>;
}

/// Builds a [`RouteHandler`] per `Messaging` method.
pub struct MessagingHttpConverter<S> {
    service: Arc<S>,
}

impl<S> Clone for MessagingHttpConverter<S> {
    fn clone(&self) -> Self {
        Self {
            service: self.service.clone(),
        }
    }
}

impl<S: Messaging> MessagingHttpConverter<S> {
    pub fn new(service: S) -> Self {
        Self {
            service: Arc::new(service),
        }
    }

    pub fn get_message(
        &self,
        route: Route,
    ) -> RouteHandler<GetMessageRequest, GetMessageResponse> {
        let service = self.service.clone();

        RouteHandler::new(
            route,
            method_fn(move |ctx: CallContext, req: GetMessageRequest| {
                let service = service.clone();
                async move { service.get_message(&ctx, req).await }
            }),
        )
    }

    pub fn update_message(
        &self,
        route: Route,
    ) -> RouteHandler<UpdateMessageRequest, UpdateMessageResponse> {
        let service = self.service.clone();

        RouteHandler::new(
            route,
            method_fn(move |ctx: CallContext, req: UpdateMessageRequest| {
                let service = service.clone();
                async move { service.update_message(&ctx, req).await }
            }),
        )
    }

    pub fn create_message(
        &self,
        route: Route,
    ) -> RouteHandler<CreateMessageRequest, CreateMessageResponse> {
        let service = self.service.clone();

        RouteHandler::new(
            route,
            method_fn(move |ctx: CallContext, req: CreateMessageRequest| {
                let service = service.clone();
                async move { service.create_message(&ctx, req).await }
            }),
        )
    }
}

use httprule_runtime::{BoxError, CallContext};
use tracing::debug;

use crate::{
    all_pattern::{AllPattern, AllPatternMessage},
    messaging::*,
};

pub struct MessagingImpl;

#[async_trait::async_trait]
impl Messaging for MessagingImpl {
    async fn get_message(
        &self,
        ctx: &CallContext,
        req: GetMessageRequest,
    ) -> Result<GetMessageResponse, BoxError> {
        debug!(method = ctx.full_method(), message_id = %req.message_id, "get message");

        if req.message == "fail" {
            return Err(format!("message {} cannot be read", req.message_id).into());
        }

        Ok(GetMessageResponse {
            message_id: req.message_id,
            message: req.message,
            tags: req.tags,
        })
    }

    async fn update_message(
        &self,
        _ctx: &CallContext,
        req: UpdateMessageRequest,
    ) -> Result<UpdateMessageResponse, BoxError> {
        Ok(UpdateMessageResponse {
            message_id: req.message_id,
            sub: req.sub.map(|sub| SubMessage {
                subfield: sub.subfield,
            }),
            message: req.message,
        })
    }

    async fn create_message(
        &self,
        _ctx: &CallContext,
        req: CreateMessageRequest,
    ) -> Result<CreateMessageResponse, BoxError> {
        Ok(CreateMessageResponse {
            message_id: req.message_id,
            sub: req.sub,
            msg: req.msg.map(|msg| create_message_response::Message { sub: msg.sub }),
            opt: req.opt,
        })
    }
}

pub struct AllPatternImpl;

#[async_trait::async_trait]
impl AllPattern for AllPatternImpl {
    async fn all_pattern(
        &self,
        _ctx: &CallContext,
        msg: AllPatternMessage,
    ) -> Result<AllPatternMessage, BoxError> {
        Ok(msg)
    }
}

use std::{future::Future, sync::Arc};

use async_trait::async_trait;
use http::{request::Parts, HeaderMap, Method, Uri};

use crate::error::BoxError;

/// Request information shared with the service method and interceptors.
#[derive(Debug, Clone)]
pub struct CallContext {
    full_method: String,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
}

impl CallContext {
    pub fn new(full_method: impl Into<String>, parts: &Parts) -> Self {
        Self {
            full_method: full_method.into(),
            method: parts.method.clone(),
            uri: parts.uri.clone(),
            headers: parts.headers.clone(),
        }
    }

    /// `/package.Service/Method` of the route being served.
    pub fn full_method(&self) -> &str {
        &self.full_method
    }

    pub fn method(&self) -> &Method {
        &self.method
    }

    pub fn uri(&self) -> &Uri {
        &self.uri
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }
}

/// The service implementation of one RPC method.
#[async_trait]
pub trait UnaryMethod<Req, Resp>: Send + Sync {
    async fn call(&self, ctx: &CallContext, req: Req) -> Result<Resp, BoxError>;
}

/// Adapts an async closure into an [`UnaryMethod`].
pub struct MethodFn<F>(F);

pub fn method_fn<F>(f: F) -> MethodFn<F> {
    MethodFn(f)
}

#[async_trait]
impl<Req, Resp, F, Fut> UnaryMethod<Req, Resp> for MethodFn<F>
where
    Req: Send + 'static,
    Resp: Send + 'static,
    F: Fn(CallContext, Req) -> Fut + Send + Sync,
    Fut: Future<Output = Result<Resp, BoxError>> + Send,
{
    async fn call(&self, ctx: &CallContext, req: Req) -> Result<Resp, BoxError> {
        (self.0)(ctx.clone(), req).await
    }
}

/// Middleware around a service method.
///
/// An interceptor may change the request, change the response, short-circuit
/// by not calling `next`, or fail.
#[async_trait]
pub trait Interceptor<Req, Resp>: Send + Sync {
    async fn intercept(
        &self,
        ctx: &CallContext,
        req: Req,
        next: Next<'_, Req, Resp>,
    ) -> Result<Resp, BoxError>;
}

/// The rest of an interceptor chain.
pub struct Next<'a, Req, Resp> {
    chain: &'a [Arc<dyn Interceptor<Req, Resp>>],
    method: &'a dyn UnaryMethod<Req, Resp>,
}

impl<'a, Req, Resp> Next<'a, Req, Resp>
where
    Req: Send + 'static,
    Resp: Send + 'static,
{
    /// A chain running `chain` in order, the first being the outermost, and
    /// finally `method`.
    pub fn new(
        chain: &'a [Arc<dyn Interceptor<Req, Resp>>],
        method: &'a dyn UnaryMethod<Req, Resp>,
    ) -> Self {
        Self { chain, method }
    }

    /// Call the next interceptor, or the service method once none is left.
    pub async fn run(self, ctx: &CallContext, req: Req) -> Result<Resp, BoxError> {
        match self.chain.split_first() {
            Some((first, rest)) => {
                let next = Next {
                    chain: rest,
                    method: self.method,
                };
                first.intercept(ctx, req, next).await
            }
            None => self.method.call(ctx, req).await,
        }
    }
}

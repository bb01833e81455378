use std::sync::Arc;

use bytes::Bytes;
use http::{header, HeaderValue, Request, Response, StatusCode};
use httprule::Route;
use serde::{de::DeserializeOwned, Serialize};
use tracing::debug;

use crate::{
    bind::Bindable,
    codec::{self, Encoding},
    error::HandlerError,
    interceptor::{CallContext, Interceptor, Next, UnaryMethod},
    path::apply_path_params,
    query::apply_query_params,
    status::Status,
};

/// Request messages a [`RouteHandler`] can decode and bind.
pub trait RequestMessage:
    prost::Message + DeserializeOwned + Default + Clone + Bindable + 'static
{
}

impl<T> RequestMessage for T where
    T: prost::Message + DeserializeOwned + Default + Clone + Bindable + 'static
{
}

/// Response messages a [`RouteHandler`] can encode.
pub trait ResponseMessage: prost::Message + Serialize + 'static {}

impl<T> ResponseMessage for T where T: prost::Message + Serialize + 'static {}

/// The outcome of one request, handed to the completion callback.
///
/// `arg` is set once the request was decoded and bound, `ret` once the
/// service method returned.
pub struct Completion<'a, Req, Resp> {
    pub context: &'a CallContext,
    /// Encoding negotiated from `Accept`, if supported.
    pub encoding: Option<Encoding>,
    pub arg: Option<&'a Req>,
    pub ret: Option<&'a Resp>,
    pub error: Option<&'a HandlerError>,
}

/// Called exactly once per request, after the response body is written or
/// the request failed.
pub trait CompletionCallback<Req, Resp>: Send + Sync {
    fn complete(&self, completion: Completion<'_, Req, Resp>, response: &mut Response<Bytes>);
}

impl<Req, Resp, F> CompletionCallback<Req, Resp> for F
where
    F: Fn(Completion<'_, Req, Resp>, &mut Response<Bytes>) + Send + Sync,
{
    fn complete(&self, completion: Completion<'_, Req, Resp>, response: &mut Response<Bytes>) {
        self(completion, response)
    }
}

/// Callback used when none is configured.
///
/// Successful requests are left untouched. Negotiation failures answer 415
/// with a plain text body, every other failure answers 500 with a
/// `google.rpc.Status` of code `UNKNOWN` in the negotiated encoding.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultCompletion;

impl<Req, Resp> CompletionCallback<Req, Resp> for DefaultCompletion {
    fn complete(&self, completion: Completion<'_, Req, Resp>, response: &mut Response<Bytes>) {
        let err = match completion.error {
            Some(err) => err,
            None => return,
        };

        if err.is_media_type() {
            *response.status_mut() = StatusCode::UNSUPPORTED_MEDIA_TYPE;
            write_text(response, err.to_string());
            return;
        }

        *response.status_mut() = StatusCode::INTERNAL_SERVER_ERROR;

        let encoding = completion.encoding.unwrap_or(Encoding::Json);
        match encoding.encode(&Status::unknown(err.to_string())) {
            Ok(body) => {
                response.headers_mut().insert(
                    header::CONTENT_TYPE,
                    HeaderValue::from_static(encoding.media_type()),
                );
                *response.body_mut() = body;
            }
            Err(err) => write_text(response, err.to_string()),
        }
    }
}

fn write_text(response: &mut Response<Bytes>, text: String) {
    response.headers_mut().insert(
        header::CONTENT_TYPE,
        HeaderValue::from_static("text/plain; charset=utf-8"),
    );
    *response.body_mut() = Bytes::from(text);
}

/// Serves one [`Route`] with a service method.
pub struct RouteHandler<Req, Resp> {
    route: Arc<Route>,
    method: Arc<dyn UnaryMethod<Req, Resp>>,
    interceptors: Vec<Arc<dyn Interceptor<Req, Resp>>>,
    completion: Arc<dyn CompletionCallback<Req, Resp>>,
}

impl<Req, Resp> Clone for RouteHandler<Req, Resp> {
    fn clone(&self) -> Self {
        Self {
            route: self.route.clone(),
            method: self.method.clone(),
            interceptors: self.interceptors.clone(),
            completion: self.completion.clone(),
        }
    }
}

impl<Req, Resp> RouteHandler<Req, Resp>
where
    Req: RequestMessage,
    Resp: ResponseMessage,
{
    pub fn new(
        route: impl Into<Arc<Route>>,
        method: impl UnaryMethod<Req, Resp> + 'static,
    ) -> Self {
        Self {
            route: route.into(),
            method: Arc::new(method),
            interceptors: vec![],
            completion: Arc::new(DefaultCompletion),
        }
    }

    /// Append an interceptor. The first one added is the outermost.
    pub fn with_interceptor(mut self, interceptor: impl Interceptor<Req, Resp> + 'static) -> Self {
        self.interceptors.push(Arc::new(interceptor));
        self
    }

    pub fn with_interceptors(
        mut self,
        interceptors: impl IntoIterator<Item = Arc<dyn Interceptor<Req, Resp>>>,
    ) -> Self {
        self.interceptors.extend(interceptors);
        self
    }

    /// Replace the default completion callback.
    pub fn with_completion(
        mut self,
        completion: impl CompletionCallback<Req, Resp> + 'static,
    ) -> Self {
        self.completion = Arc::new(completion);
        self
    }

    pub fn route(&self) -> &Route {
        &self.route
    }

    /// The service and method names along with the handler, for routers
    /// keyed by RPC name.
    pub fn with_name(self) -> (String, String, Self) {
        (self.route.service.clone(), self.route.method.clone(), self)
    }

    /// The HTTP method and pattern along with the handler, for routers keyed
    /// by HTTP binding.
    pub fn http_rule(self) -> (http::Method, String, Self) {
        let method = match self.route.http_method {
            httprule::HttpMethod::Get => http::Method::GET,
            httprule::HttpMethod::Put => http::Method::PUT,
            httprule::HttpMethod::Post => http::Method::POST,
            httprule::HttpMethod::Delete => http::Method::DELETE,
            httprule::HttpMethod::Patch => http::Method::PATCH,
        };

        (method, self.route.pattern.clone(), self)
    }

    /// Serve one request.
    ///
    /// Errors never escape: they are reported to the completion callback,
    /// which decides the response status and body.
    pub async fn handle(&self, request: Request<Bytes>) -> Response<Bytes> {
        let (parts, body) = request.into_parts();

        let content_type = codec::media_type(parts.headers.get(header::CONTENT_TYPE));
        let accept = codec::negotiate(parts.headers.get(header::ACCEPT), &content_type);
        let encoding = Encoding::from_media_type(&accept);
        let ctx = CallContext::new(self.route.full_method.as_str(), &parts);

        let mut response = Response::new(Bytes::new());
        if let Ok(value) = HeaderValue::from_str(&accept) {
            response.headers_mut().insert(header::CONTENT_TYPE, value);
        }

        let arg = match self.decode(&parts, &content_type, &body) {
            Ok(arg) => arg,
            Err(err) => {
                self.complete(&ctx, encoding, None, None, &mut response, Err(&err));
                return response;
            }
        };

        let ret = match Next::new(&self.interceptors, self.method.as_ref())
            .run(&ctx, arg.clone())
            .await
        {
            Ok(ret) => ret,
            Err(err) => {
                let err = HandlerError::Service(err);
                self.complete(&ctx, encoding, Some(&arg), None, &mut response, Err(&err));
                return response;
            }
        };

        let written = match encoding {
            Some(encoding) => encoding.encode(&ret),
            None => Err(HandlerError::UnsupportedAccept(accept)),
        };

        match written {
            Ok(body) => {
                *response.body_mut() = body;
                self.complete(&ctx, encoding, Some(&arg), Some(&ret), &mut response, Ok(()));
            }
            Err(err) => self.complete(
                &ctx,
                encoding,
                Some(&arg),
                Some(&ret),
                &mut response,
                Err(&err),
            ),
        }

        response
    }

    fn decode(
        &self,
        parts: &http::request::Parts,
        content_type: &str,
        body: &[u8],
    ) -> Result<Req, HandlerError> {
        let mut arg = if self.route.http_method.has_body() {
            Encoding::from_media_type(content_type)
                .ok_or_else(|| HandlerError::UnsupportedContentType(content_type.to_string()))?
                .decode(body)?
        } else {
            let mut arg = Req::default();
            apply_query_params(&mut arg, &self.route.query_params, parts.uri.query())?;
            arg
        };

        apply_path_params(&mut arg, &self.route, parts.uri.path())?;

        Ok(arg)
    }

    fn complete(
        &self,
        ctx: &CallContext,
        encoding: Option<Encoding>,
        arg: Option<&Req>,
        ret: Option<&Resp>,
        response: &mut Response<Bytes>,
        outcome: Result<(), &HandlerError>,
    ) {
        let error = outcome.err();
        if let Some(err) = error {
            debug!(method = %ctx.full_method(), error = %err, "request failed");
        }

        self.completion.complete(
            Completion {
                context: ctx,
                encoding,
                arg,
                ret,
                error,
            },
            response,
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        bind::{BindError, FieldValue},
        error::BoxError,
        interceptor::method_fn,
    };
    use httprule::{extract_path_params, full_method_name, HttpMethod, Template};
    use prost::Message;
    use serde::Deserialize;

    #[derive(Clone, PartialEq, ::prost::Message, Serialize, Deserialize)]
    #[serde(default)]
    struct Echo {
        #[prost(string, tag = "1")]
        id: String,
        #[prost(string, tag = "2")]
        text: String,
    }

    impl Bindable for Echo {
        fn message_mut(&mut self, _field: &str) -> Option<&mut dyn Bindable> {
            None
        }

        fn assign(&mut self, field: &str, value: FieldValue) -> Result<(), BindError> {
            match field {
                "id" => self.id = value.into_single()?,
                "text" => self.text = value.into_single()?,
                _ => return Err(BindError::unknown_field(field)),
            }
            Ok(())
        }
    }

    fn route(http_method: HttpMethod, pattern: &str) -> Route {
        let path_params = extract_path_params(&Template::parse(pattern).unwrap());
        let query_params = if http_method.has_body() {
            vec![]
        } else {
            vec![httprule::QueryParam {
                field_path: "text".into(),
                kind: httprule::ScalarKind::String,
                repeated: false,
            }]
        };

        Route {
            service: "Echoer".to_string(),
            method: "Echo".to_string(),
            full_method: full_method_name("pkg", "Echoer", "Echo"),
            http_method,
            pattern: pattern.to_string(),
            verb: None,
            path_params,
            query_params,
            request_type: "pkg.Echo".to_string(),
            response_type: "pkg.Echo".to_string(),
            documentation: None,
        }
    }

    fn handler(http_method: HttpMethod) -> RouteHandler<Echo, Echo> {
        RouteHandler::new(
            route(http_method, "/v1/echo/{id}"),
            method_fn(|_ctx: CallContext, req: Echo| async move {
                if req.text == "fail" {
                    return Err::<Echo, BoxError>("it failed".into());
                }
                Ok(req)
            }),
        )
    }

    fn request(
        method: &str,
        uri: &str,
        content_type: Option<&str>,
        body: Vec<u8>,
    ) -> Request<Bytes> {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(content_type) = content_type {
            builder = builder.header(header::CONTENT_TYPE, content_type);
        }
        builder.body(Bytes::from(body)).unwrap()
    }

    #[tokio::test]
    async fn test_get_binds_path_and_query() {
        let resp = handler(HttpMethod::Get)
            .handle(request("GET", "/v1/echo/42?text=hi%20there", None, vec![]))
            .await;

        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(resp.headers()[header::CONTENT_TYPE], "application/json");
        let echo: Echo = serde_json::from_slice(resp.body()).unwrap();
        assert_eq!(echo.id, "42");
        assert_eq!(echo.text, "hi there");
    }

    #[tokio::test]
    async fn test_post_protobuf_body() {
        let body = Echo {
            id: "ignored".to_string(),
            text: "hello".to_string(),
        }
        .encode_to_vec();

        let resp = handler(HttpMethod::Post)
            .handle(request("POST", "/v1/echo/7", Some("application/protobuf"), body))
            .await;

        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(resp.headers()[header::CONTENT_TYPE], "application/protobuf");
        let echo = Echo::decode(resp.body().clone()).unwrap();
        assert_eq!(echo.id, "7");
        assert_eq!(echo.text, "hello");
    }

    #[tokio::test]
    async fn test_unsupported_media_types() {
        let resp = handler(HttpMethod::Post)
            .handle(request("POST", "/v1/echo/7", Some("text/plain"), b"hi".to_vec()))
            .await;

        assert_eq!(resp.status(), StatusCode::UNSUPPORTED_MEDIA_TYPE);
        assert_eq!(resp.body(), "Unsupported Content-Type: text/plain");

        let req = Request::get("/v1/echo/7")
            .header(header::ACCEPT, "text/html")
            .body(Bytes::new())
            .unwrap();
        let resp = handler(HttpMethod::Get).handle(req).await;

        assert_eq!(resp.status(), StatusCode::UNSUPPORTED_MEDIA_TYPE);
        assert_eq!(resp.body(), "Unsupported Accept: text/html");
    }

    #[tokio::test]
    async fn test_service_error_is_status() {
        let resp = handler(HttpMethod::Get)
            .handle(request("GET", "/v1/echo/1?text=fail", None, vec![]))
            .await;

        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let status: Status = serde_json::from_slice(resp.body()).unwrap();
        assert_eq!(status, Status::unknown("it failed"));
    }

    #[tokio::test]
    async fn test_error_body_content_type() {
        let req = Request::get("/v1/echo/1?text=fail")
            .header(header::ACCEPT, "text/html")
            .body(Bytes::new())
            .unwrap();
        let resp = handler(HttpMethod::Get).handle(req).await;

        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(resp.headers()[header::CONTENT_TYPE], "application/json");
        let status: Status = serde_json::from_slice(resp.body()).unwrap();
        assert_eq!(status, Status::unknown("it failed"));
    }

    struct Suffix(&'static str);

    #[async_trait::async_trait]
    impl Interceptor<Echo, Echo> for Suffix {
        async fn intercept(
            &self,
            ctx: &CallContext,
            mut req: Echo,
            next: Next<'_, Echo, Echo>,
        ) -> Result<Echo, BoxError> {
            req.text.push_str(self.0);
            next.run(ctx, req).await
        }
    }

    #[tokio::test]
    async fn test_with_interceptors() {
        let handler = handler(HttpMethod::Get).with_interceptors(vec![
            Arc::new(Suffix("-a")) as Arc<dyn Interceptor<Echo, Echo>>,
            Arc::new(Suffix("-b")),
        ]);
        assert_eq!(handler.route().full_method, "/pkg.Echoer/Echo");

        let resp = handler
            .handle(request("GET", "/v1/echo/1?text=x", None, vec![]))
            .await;

        assert_eq!(resp.status(), StatusCode::OK);
        let echo: Echo = serde_json::from_slice(resp.body()).unwrap();
        assert_eq!(echo.text, "x-a-b");
    }

    fn outcome_status(completion: Completion<'_, Echo, Echo>, response: &mut Response<Bytes>) {
        let status = match (completion.arg, completion.ret, completion.error) {
            (Some(_), Some(_), None) => StatusCode::ACCEPTED,
            (Some(_), None, Some(_)) => StatusCode::BAD_GATEWAY,
            _ => StatusCode::BAD_REQUEST,
        };
        *response.status_mut() = status;
    }

    #[tokio::test]
    async fn test_custom_completion() {
        let handler = handler(HttpMethod::Get).with_completion(outcome_status);

        let ok = handler.handle(request("GET", "/v1/echo/1", None, vec![])).await;
        assert_eq!(ok.status(), StatusCode::ACCEPTED);

        let failed = handler.handle(request("GET", "/v1/echo/1?text=fail", None, vec![])).await;
        assert_eq!(failed.status(), StatusCode::BAD_GATEWAY);

        let unbound = handler.handle(request("GET", "/v1/echo", None, vec![])).await;
        assert_eq!(unbound.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_accessors() {
        let (service, method, handler) = handler(HttpMethod::Get).with_name();
        assert_eq!((service.as_str(), method.as_str()), ("Echoer", "Echo"));

        let (method, pattern, _) = handler.http_rule();
        assert_eq!(method, http::Method::GET);
        assert_eq!(pattern, "/v1/echo/{id}");
    }
}

use std::future::{Ready, ready};
use std::task::{Context, Poll};
use std::time::Instant;
use actix_service::{Service, Transform};
use actix_web::dev::{ServiceRequest, ServiceResponse};
use actix_web::http::header::{HeaderMap, HeaderName, HeaderValue};
use actix_web::{Error, HttpMessage, HttpRequest};
use futures_util::future::LocalBoxFuture;
use tracing::{info, warn};
use uuid::Uuid;

static REQUEST_ID_HEADER: HeaderName = HeaderName::from_static("x-request-id");
static TIMING_HEADER: HeaderName = HeaderName::from_static("server-timing");

const MAX_REQUEST_ID_LEN: usize = 128;

/// Per-request data shared with handlers through request extensions.
#[derive(Clone, Debug)]
pub struct RequestContext {
    pub id: String,
    pub started: Instant,
}

pub fn request_id(req: &HttpRequest) -> String {
    req.extensions()
        .get::<RequestContext>()
        .map(|ctx| ctx.id.clone())
        .unwrap_or_else(|| "unknown".into())
}

/// Client-supplied id when usable, otherwise a fresh UUID.
fn incoming_request_id(headers: &HeaderMap) -> String {
    headers
        .get(&REQUEST_ID_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|id| !id.is_empty() && id.len() <= MAX_REQUEST_ID_LEN)
        .map(str::to_owned)
        .unwrap_or_else(|| Uuid::new_v4().to_string())
}

/// Tags each request with an id, logs its outcome and reports the
/// handling time in `server-timing`.
pub struct RequestContextMiddleware;

impl<S, B> Transform<S, ServiceRequest> for RequestContextMiddleware
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type InitError = ();
    type Transform = RequestContextService<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(RequestContextService { service }))
    }
}

pub struct RequestContextService<S> {
    service: S,
}

impl<S, B> Service<ServiceRequest> for RequestContextService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    fn poll_ready(&self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.service.poll_ready(cx)
    }

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let ctx = RequestContext {
            id: incoming_request_id(req.headers()),
            started: Instant::now(),
        };
        let method = req.method().clone();
        let path = req.path().to_owned();
        req.extensions_mut().insert(ctx.clone());

        let fut = self.service.call(req);

        Box::pin(async move {
            let mut res = fut.await?;
            let elapsed_ms = ctx.started.elapsed().as_millis();
            let status = res.status();

            if status.is_server_error() {
                warn!(
                    request_id = %ctx.id,
                    %method,
                    %path,
                    status = status.as_u16(),
                    elapsed_ms,
                    "request failed"
                );
            } else {
                info!(
                    request_id = %ctx.id,
                    %method,
                    %path,
                    status = status.as_u16(),
                    elapsed_ms,
                    "request completed"
                );
            }

            let headers = res.response_mut().headers_mut();
            if let Ok(value) = HeaderValue::from_str(&ctx.id) {
                headers.insert(REQUEST_ID_HEADER.clone(), value);
            }
            if let Ok(value) = HeaderValue::from_str(&format!("app;dur={elapsed_ms}")) {
                headers.insert(TIMING_HEADER.clone(), value);
            }

            Ok(res)
        })
    }
}

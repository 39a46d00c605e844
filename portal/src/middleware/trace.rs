//! Request tracing middleware.
//!
//! Every request runs inside a [`TraceId`] scope and a `request` span. A
//! well-formed `trace-id` header from upstream is reused; otherwise a fresh
//! id is generated. The id is echoed on the response.

use std::task::{Context, Poll};

use actix_web::Error;
use actix_web::dev::{Service, ServiceRequest, ServiceResponse, Transform};
use actix_web::http::header::{HeaderName, HeaderValue};
use futures_util::future::{LocalBoxFuture, Ready, ready};
use tracing::{Instrument, debug, error, info_span};

use crate::domain::{TRACE_ID_HEADER, TraceId};

fn inbound_trace_id(req: &ServiceRequest) -> Option<TraceId> {
    req.headers()
        .get(TRACE_ID_HEADER)
        .and_then(|value| value.to_str().ok())
        .and_then(|raw| raw.trim().parse().ok())
}

/// Attaches a trace id to each request and its response.
///
/// # Examples
/// ```
/// use actix_web::App;
/// use portal::Trace;
///
/// let app = App::new().wrap(Trace);
/// ```
#[derive(Clone)]
pub struct Trace;

impl<S, B> Transform<S, ServiceRequest> for Trace
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type InitError = ();
    type Transform = TraceMiddleware<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(TraceMiddleware { service }))
    }
}

/// Service produced by [`Trace`].
pub struct TraceMiddleware<S> {
    service: S,
}

impl<S, B> Service<ServiceRequest> for TraceMiddleware<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    fn poll_ready(&self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.service.poll_ready(cx)
    }

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let trace_id = inbound_trace_id(&req).unwrap_or_else(TraceId::generate);
        let span = info_span!(
            "request",
            trace_id = %trace_id,
            method = %req.method(),
            path = req.path(),
        );
        let fut = span.in_scope(|| self.service.call(req));
        Box::pin(
            TraceId::scope(trace_id, async move {
                let mut res = fut.await?;
                debug!(status = res.status().as_u16(), "request completed");
                match HeaderValue::from_str(&trace_id.to_string()) {
                    Ok(value) => {
                        res.headers_mut()
                            .insert(HeaderName::from_static(TRACE_ID_HEADER), value);
                    }
                    Err(error) => error!(%error, "failed to encode trace-id header"),
                }
                Ok(res)
            })
            .instrument(span),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Error as PortalError;
    use actix_web::{App, HttpResponse, test as actix_test, web};
    use rstest::rstest;

    const UPSTREAM: &str = "6f1d2c3b-0a9e-4e5f-8d7c-1b2a3c4d5e6f";

    fn echo_trace() -> HttpResponse {
        let id = TraceId::current().map(|id| id.to_string()).unwrap_or_default();
        HttpResponse::Ok().body(id)
    }

    #[rstest]
    #[actix_web::test]
    async fn handlers_see_the_header_value() {
        let app = actix_test::init_service(
            App::new()
                .wrap(Trace)
                .route("/", web::get().to(|| async { echo_trace() })),
        )
        .await;
        let res = actix_test::call_service(&app, actix_test::TestRequest::get().uri("/").to_request()).await;
        let header = res
            .headers()
            .get(TRACE_ID_HEADER)
            .and_then(|v| v.to_str().ok())
            .map(str::to_owned)
            .expect("trace-id header");
        assert_eq!(actix_test::read_body(res).await, header.as_bytes());
    }

    #[rstest]
    #[case(Some(UPSTREAM), true)]
    #[case(Some("not-a-uuid"), false)]
    #[case(None, false)]
    #[actix_web::test]
    async fn upstream_ids_are_reused_only_when_valid(
        #[case] inbound: Option<&str>,
        #[case] reused: bool,
    ) {
        let app = actix_test::init_service(
            App::new()
                .wrap(Trace)
                .route("/", web::get().to(|| async { HttpResponse::NoContent().finish() })),
        )
        .await;
        let mut req = actix_test::TestRequest::get().uri("/");
        if let Some(value) = inbound {
            req = req.insert_header((TRACE_ID_HEADER, value));
        }
        let res = actix_test::call_service(&app, req.to_request()).await;
        let header = res
            .headers()
            .get(TRACE_ID_HEADER)
            .and_then(|v| v.to_str().ok())
            .expect("trace-id header");
        assert_eq!(header == UPSTREAM, reused);
        assert!(header.parse::<TraceId>().is_ok());
    }

    #[rstest]
    #[actix_web::test]
    async fn errors_carry_the_request_trace_id() {
        let app = actix_test::init_service(App::new().wrap(Trace).route(
            "/",
            web::get().to(|| async { Err::<HttpResponse, _>(PortalError::not_found("gone")) }),
        ))
        .await;
        let req = actix_test::TestRequest::get()
            .uri("/")
            .insert_header((TRACE_ID_HEADER, UPSTREAM))
            .to_request();
        let body: PortalError = actix_test::read_body_json(actix_test::call_service(&app, req).await).await;
        assert_eq!(body.trace_id(), Some(UPSTREAM));
    }
}

//! Session gate: redirects visitors who are on the wrong side of the login
//! boundary before any handler runs.
//!
//! Must be registered inside the session middleware so the session cookie
//! has been loaded when the gate reads it. Navigations are redirected with
//! 307; submissions get 303 so the browser follows with a `GET` instead of
//! replaying the form body.

use std::rc::Rc;
use std::task::{Context, Poll};

use actix_session::SessionExt;
use actix_web::body::EitherBody;
use actix_web::dev::{Service, ServiceRequest, ServiceResponse, Transform};
use actix_web::http::header;
use actix_web::http::StatusCode;
use actix_web::{Error, HttpResponse};
use futures_util::future::{LocalBoxFuture, Ready, ready};
use tracing::debug;

use crate::domain::{GateDecision, RequestKind, RoutePolicy};
use crate::inbound::http::pages::request_target;
use crate::inbound::http::session::session_token;

/// Applies a [`RoutePolicy`] to every request.
///
/// # Examples
/// ```
/// use actix_web::App;
/// use portal::domain::RoutePolicy;
/// use portal::middleware::SessionGate;
///
/// let app = App::new().wrap(SessionGate::new(RoutePolicy::default()));
/// ```
#[derive(Clone, Default)]
pub struct SessionGate {
    policy: Rc<RoutePolicy>,
}

impl SessionGate {
    /// Gate requests with `policy`.
    pub fn new(policy: RoutePolicy) -> Self {
        Self {
            policy: Rc::new(policy),
        }
    }
}

impl<S, B> Transform<S, ServiceRequest> for SessionGate
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type InitError = ();
    type Transform = SessionGateMiddleware<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(SessionGateMiddleware {
            service,
            policy: Rc::clone(&self.policy),
        }))
    }
}

/// Service produced by [`SessionGate`].
pub struct SessionGateMiddleware<S> {
    service: S,
    policy: Rc<RoutePolicy>,
}

impl<S, B> Service<ServiceRequest> for SessionGateMiddleware<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    fn poll_ready(&self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.service.poll_ready(cx)
    }

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let has_session = session_token(&req.get_session()).is_some();
        let kind = RequestKind::from_method(req.method().as_str());
        let decision = self
            .policy
            .decide(request_target(req.request()), kind, has_session);
        let location = match decision {
            GateDecision::Allow => {
                let fut = self.service.call(req);
                return Box::pin(async move { fut.await.map(ServiceResponse::map_into_left_body) });
            }
            GateDecision::RedirectToLogin { location }
            | GateDecision::RedirectToLanding { location } => location,
        };

        let status = match kind {
            RequestKind::Navigation => StatusCode::TEMPORARY_REDIRECT,
            RequestKind::Submission => StatusCode::SEE_OTHER,
        };
        debug!(path = req.path(), %location, %status, "session gate redirect");
        let response = HttpResponse::build(status)
            .insert_header((header::LOCATION, location))
            .finish()
            .map_into_right_body();
        Box::pin(ready(Ok(req.into_response(response))))
    }
}

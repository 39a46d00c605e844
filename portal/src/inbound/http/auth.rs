//! Login, logout and root redirect handlers.
//!
//! Keep these handlers to request/response mapping; validation, the backend
//! exchange and session persistence live in [`crate::domain::LoginService`].

use actix_web::{HttpResponse, get, post, web};
use serde::Deserialize;

use crate::domain::LoginOutcome;
use crate::domain::ports::SessionStore;

use super::pages::login::{LoginForm, render};
use super::pages::{html, see_other};
use super::session::SessionContext;
use super::state::HttpState;

/// `GET /login` query.
#[derive(Debug, Default, Deserialize)]
pub struct LoginQuery {
    #[serde(default)]
    pub next: Option<String>,
}

/// `POST /login` form body. `username` is accepted for the identifier too.
/// A `next` in the form wins over one in the query string.
#[derive(Debug, Default, Deserialize)]
pub struct LoginSubmission {
    #[serde(default, alias = "username")]
    pub email: String,
    #[serde(default)]
    pub password: String,
    #[serde(default)]
    pub next: Option<String>,
}

#[get("/")]
pub async fn root(state: web::Data<HttpState>, session: SessionContext) -> HttpResponse {
    if session.is_authenticated() {
        see_other(state.policy.landing_path())
    } else {
        see_other(state.policy.login_path())
    }
}

#[get("/login")]
pub async fn login_page(query: web::Query<LoginQuery>) -> HttpResponse {
    html(render(&LoginForm {
        next: query.next.as_deref(),
        ..LoginForm::default()
    }))
}

#[post("/login")]
pub async fn login(
    state: web::Data<HttpState>,
    session: SessionContext,
    query: web::Query<LoginQuery>,
    form: web::Form<LoginSubmission>,
) -> HttpResponse {
    let mut submission = form.into_inner();
    submission.next = submission.next.or(query.into_inner().next);
    let outcome = state
        .login
        .login(
            &session,
            &submission.email,
            &submission.password,
            submission.next.as_deref(),
        )
        .await;
    match outcome {
        LoginOutcome::Redirect { location } => see_other(&location),
        LoginOutcome::Rejected { message } => html(render(&LoginForm {
            next: submission.next.as_deref(),
            email: &submission.email,
            error: Some(&message),
        })),
    }
}

#[post("/logout")]
pub async fn logout(state: web::Data<HttpState>, session: SessionContext) -> HttpResponse {
    let location = state.login.logout(&session).await;
    see_other(&location)
}

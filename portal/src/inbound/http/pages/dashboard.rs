//! Dashboard: greeting, the visitor's tasks and a profile card.

use actix_web::{HttpRequest, HttpResponse, get, web};
use futures_util::join;
use maud::{Markup, html};
use tracing::warn;

use crate::domain::{CachedUser, LoadState, Task};

use super::layout;
use super::{html, rejects_session, request_target, session_expired};
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;

const USER_FALLBACK_ERROR: &str = "Failed to load user";

fn task_rows(tasks: &[Task]) -> Markup {
    html! {
        @if tasks.is_empty() {
            div class="muted" { "No tasks to show." }
        } @else {
            @for task in tasks {
                div class="task-row" {
                    div class="task-title" { (task.title.as_deref().unwrap_or_default()) }
                    div class="muted" { (task.description.as_deref().unwrap_or_default()) }
                    span class="badge" { (task.status_label()) }
                }
            }
        }
    }
}

fn profile(user: &CachedUser) -> Markup {
    html! {
        div class="card profile" {
            h3 { "Profile" }
            div class="avatar" { (user.initial()) }
            div class="profile-name" { (user.display_name().unwrap_or_default()) }
            div class="muted" { (user.role_label()) }
        }
    }
}

/// Dashboard body for the given load states.
pub fn render(path: &str, user: &LoadState<CachedUser>, tasks: &[Task]) -> Markup {
    let greeting = user
        .ready()
        .and_then(CachedUser::display_name)
        .map_or_else(|| "Welcome back.".to_owned(), |name| format!("Welcome back, {name}."));
    layout::shell(
        "Dashboard",
        path,
        user.ready(),
        html! {
            p class="muted" { (greeting) }
            @match user {
                LoadState::Loading => {
                    div class="card" { "Loading user..." }
                }
                LoadState::Failed(message) => {
                    div class="card error" {
                        (if message.is_empty() { USER_FALLBACK_ERROR } else { message.as_str() })
                    }
                }
                LoadState::Ready(user) => {
                    div class="dashboard" {
                        section class="card" {
                            h3 { "My Tasks" }
                            (task_rows(tasks))
                        }
                        (profile(user))
                    }
                }
            }
        },
    )
}

#[get("/dashboard")]
pub async fn dashboard(
    req: HttpRequest,
    state: web::Data<HttpState>,
    session: SessionContext,
) -> HttpResponse {
    let (user_result, tasks_result) = join!(
        state.portal.current_user(&session),
        state.portal.tasks(&session)
    );
    if rejects_session(&user_result) || rejects_session(&tasks_result) {
        return session_expired(&state, &session, request_target(&req));
    }
    let user = LoadState::from(user_result);
    let tasks = tasks_result.unwrap_or_else(|err| {
        warn!(error = %err, "dashboard tasks unavailable");
        Vec::new()
    });
    html(render(req.path(), &user, &tasks))
}

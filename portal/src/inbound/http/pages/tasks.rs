//! Task board grouped by status bucket.

use actix_web::{HttpRequest, HttpResponse, get, web};
use maud::{Markup, html};

use crate::domain::ports::SessionStore;
use crate::domain::{CachedUser, LoadState, TaskBoard};

use super::{html, layout, rejects_session, request_target, session_expired};
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;

pub fn render(path: &str, user: Option<&CachedUser>, board: &LoadState<TaskBoard>) -> Markup {
    layout::shell(
        "Tasks",
        path,
        user,
        html! {
            @match board {
                LoadState::Loading => {
                    div class="card" { "Loading tasks..." }
                }
                LoadState::Failed(message) => {
                    div class="card error" { (message) }
                }
                LoadState::Ready(board) => {
                    @if board.is_empty() {
                        div class="card empty-state" { "No tasks to show." }
                    }
                    div class="board" {
                        @for (bucket, tasks) in board.columns() {
                            section class="card column" {
                                h3 { (bucket.label()) " (" (tasks.len()) ")" }
                                @for task in tasks {
                                    div class="task" {
                                        strong { (task.title.as_deref().unwrap_or_default()) }
                                        @if let Some(due) = &task.due_date {
                                            div class="muted" { "Due " (due) }
                                        }
                                    }
                                }
                            }
                        }
                    }
                }
            }
        },
    )
}

#[get("/tasks")]
pub async fn task_board(
    req: HttpRequest,
    state: web::Data<HttpState>,
    session: SessionContext,
) -> HttpResponse {
    let result = state.portal.tasks(&session).await;
    if rejects_session(&result) {
        return session_expired(&state, &session, request_target(&req));
    }
    let board = LoadState::from(result.map(TaskBoard::from_tasks));
    html(render(req.path(), session.cached_user().as_ref(), &board))
}

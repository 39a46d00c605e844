//! Client list with optional search and status filters.

use actix_web::{HttpRequest, HttpResponse, get, web};
use maud::{Markup, html};
use tracing::warn;

use crate::domain::ports::SessionStore;
use crate::domain::{CachedUser, Client, ClientFilter};

use super::layout;
use super::{html, rejects_session, request_target, session_expired};
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;

pub fn render(
    path: &str,
    user: Option<&CachedUser>,
    filter: &ClientFilter,
    clients: &[Client],
) -> Markup {
    layout::shell(
        "Clients",
        path,
        user,
        html! {
            p class="muted" { "Manage all business clients" }
            form class="card filters" method="get" action="/clients" {
                input type="search" name="search" placeholder="Search clients..."
                    value=(filter.search.as_deref().unwrap_or_default());
                input type="text" name="status" placeholder="Status"
                    value=(filter.status.as_deref().unwrap_or_default());
                button type="submit" { "Filter" }
            }
            section class="card" {
                @if clients.is_empty() {
                    div class="empty-state" { "No clients added yet." }
                } @else {
                    table {
                        thead { tr { th { "Client Name" } th { "Email" } th { "Status" } th { "Actions" } } }
                        tbody {
                            @for client in clients {
                                tr {
                                    td { (client.display_name()) }
                                    td class="muted" { (client.email.as_deref().unwrap_or_default()) }
                                    td { (client.status.as_deref().unwrap_or_default()) }
                                    td { a href={ "/clients/" (client.id) } { "View" } }
                                }
                            }
                        }
                    }
                }
            }
        },
    )
}

#[get("/clients")]
pub async fn list_clients(
    req: HttpRequest,
    state: web::Data<HttpState>,
    session: SessionContext,
    filter: web::Query<ClientFilter>,
) -> HttpResponse {
    let result = state.portal.clients(&session, &filter).await;
    if rejects_session(&result) {
        return session_expired(&state, &session, request_target(&req));
    }
    let clients = result.unwrap_or_else(|err| {
        warn!(error = %err, "client list unavailable");
        Vec::new()
    });
    html(render(
        req.path(),
        session.cached_user().as_ref(),
        &filter,
        &clients,
    ))
}

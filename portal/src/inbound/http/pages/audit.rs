//! Audit log table with entity/action filters and offset pagination.

use actix_web::{HttpRequest, HttpResponse, get, web};
use maud::{Markup, html};

use crate::domain::ports::SessionStore;
use crate::domain::{AuditLog, AuditParams, AuditQuery, CachedUser, ENTITY_TYPES, LoadState};

use super::{html, layout, rejects_session, request_target, session_expired};
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;

fn option_label(entity_type: &str) -> String {
    let mut chars = entity_type.chars();
    chars.next().map_or_else(String::new, |first| {
        first.to_uppercase().chain(chars).collect()
    })
}

fn filters(query: &AuditQuery) -> Markup {
    html! {
        form class="card filters" method="get" action="/audit" {
            label {
                "Entity Type"
                select name="entity_type" {
                    option value="" { "All Types" }
                    @for entity_type in ENTITY_TYPES {
                        option value=(entity_type) selected[query.entity_type() == Some(entity_type)] {
                            (option_label(entity_type))
                        }
                    }
                }
            }
            label {
                "Action"
                input type="text" name="action" placeholder="Filter by action..."
                    value=(query.action().unwrap_or_default());
            }
            input type="hidden" name="skip" value=(query.page().skip());
            input type="hidden" name="limit" value=(query.page().limit());
            input type="hidden" name="shown_entity_type" value=(query.entity_type().unwrap_or_default());
            input type="hidden" name="shown_action" value=(query.action().unwrap_or_default());
            button type="submit" { "Apply" }
        }
    }
}

fn row(log: &AuditLog) -> Markup {
    html! {
        tr {
            td { (log.timestamp_label()) }
            td { (log.actor_label()) }
            td { span class=(log.tone().css_class()) { (log.action.as_deref().unwrap_or_default()) } }
            td { span class="badge" { (log.entity_type.as_deref().unwrap_or_default()) } }
            td class="muted" { (log.entity_label()) }
            td {
                @if let Some(details) = log.details_json() {
                    details {
                        summary { "View Details" }
                        pre { (details) }
                    }
                } @else {
                    "-"
                }
            }
        }
    }
}

fn pager(query: &AuditQuery, returned: usize) -> Markup {
    let window = query.page().window(returned);
    html! {
        @if let (Some(first), Some(last)) = (window.first_row(), window.last_row()) {
            nav class="pager" {
                span class="muted" { "Showing " (first) " - " (last) }
                @if let Some(previous) = window.previous() {
                    a href={ "/audit?" (query.with_page(previous).to_query_string()) } { "Previous" }
                } @else {
                    span class="disabled" aria-disabled="true" { "Previous" }
                }
                @if let Some(next) = window.next() {
                    a href={ "/audit?" (query.with_page(next).to_query_string()) } { "Next" }
                } @else {
                    span class="disabled" aria-disabled="true" { "Next" }
                }
            }
        }
    }
}

/// Audit page for `query` and the fetched rows.
pub fn render(
    path: &str,
    user: Option<&CachedUser>,
    query: &AuditQuery,
    logs: &LoadState<Vec<AuditLog>>,
) -> Markup {
    layout::shell(
        "Audit Logs",
        path,
        user,
        html! {
            p class="muted" { "Track all system activities and user actions" }
            (filters(query))
            @match logs {
                LoadState::Loading => {
                    div class="card" { "Loading audit logs..." }
                }
                LoadState::Failed(message) => {
                    div class="card error" { (message) }
                }
                LoadState::Ready(logs) => {
                    section class="card" {
                        table {
                            thead {
                                tr {
                                    th { "Timestamp" } th { "User" } th { "Action" }
                                    th { "Entity Type" } th { "Entity ID" } th { "Details" }
                                }
                            }
                            tbody {
                                @if logs.is_empty() {
                                    tr { td colspan="6" class="empty-state" { "No audit logs found" } }
                                }
                                @for log in logs {
                                    (row(log))
                                }
                            }
                        }
                        (pager(query, logs.len()))
                    }
                }
            }
        },
    )
}

#[get("/audit")]
pub async fn audit_log(
    req: HttpRequest,
    state: web::Data<HttpState>,
    session: SessionContext,
    params: web::Query<AuditParams>,
) -> HttpResponse {
    let query = AuditQuery::from_params(&params);
    let result = state.portal.audit_logs(&session, &query).await;
    if rejects_session(&result) {
        return session_expired(&state, &session, request_target(&req));
    }
    let logs = LoadState::from(result);
    html(render(
        req.path(),
        session.cached_user().as_ref(),
        &query,
        &logs,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ports::ApiMethod;
    use crate::inbound::http::test_utils::{
        FakeGateway, ScriptedBackend, http_state, session_cookie, sign_in_request, test_app,
    };
    use actix_web::test as actix_test;
    use rstest::rstest;
    use serde_json::{Value, json};
    use std::sync::Arc;

    fn logs(count: usize) -> Value {
        Value::Array(
            (0..count)
                .map(|i| json!({"id": i, "action": "task_created", "entity_type": "task"}))
                .collect(),
        )
    }

    async fn open(backend: ScriptedBackend, uri: &str) -> (String, Arc<ScriptedBackend>) {
        let backend = Arc::new(backend);
        let app = actix_test::init_service(test_app(http_state(
            backend.clone(),
            Arc::new(FakeGateway::default()),
        )))
        .await;
        let signed_in = actix_test::call_service(&app, sign_in_request().to_request()).await;
        let cookie = session_cookie(&signed_in).expect("session cookie");
        let res = actix_test::call_service(
            &app,
            actix_test::TestRequest::get().uri(uri).cookie(cookie).to_request(),
        )
        .await;
        let body = String::from_utf8_lossy(&actix_test::read_body(res).await).into_owned();
        (body, backend)
    }

    fn shows_empty_state(body: &str) {
        assert!(body.contains("No audit logs found"));
        assert!(!body.contains("Showing"));
    }

    #[rstest]
    #[actix_web::test]
    async fn empty_task_page_shows_the_empty_state() {
        let backend =
            ScriptedBackend::default().get("/audit?entity_type=task&skip=0&limit=50", json!([]));
        let (body, backend) = open(backend, "/audit?entity_type=task&skip=0&limit=50").await;
        shows_empty_state(&body);
        assert!(body.contains(r#"<option value="task" selected>Task</option>"#));
        assert_eq!(backend.paths(), vec!["/audit?entity_type=task&skip=0&limit=50"]);
    }

    #[rstest]
    #[actix_web::test]
    async fn unknown_filters_are_dropped_before_the_backend() {
        let backend = ScriptedBackend::default().get("/audit?skip=0&limit=50", json!([]));
        let (body, backend) = open(backend, "/audit?entity_type=invoice&action=%20").await;
        shows_empty_state(&body);
        assert_eq!(backend.paths(), vec!["/audit?skip=0&limit=50"]);
    }

    #[rstest]
    #[actix_web::test]
    async fn malformed_paging_renders_the_default_page() {
        let backend = ScriptedBackend::default().get("/audit?skip=0&limit=50", json!([]));
        let (body, backend) = open(backend, "/audit?limit=abc&skip=").await;
        shows_empty_state(&body);
        assert_eq!(backend.paths(), vec!["/audit?skip=0&limit=50"]);
    }

    #[rstest]
    #[actix_web::test]
    async fn changing_a_filter_from_a_later_page_starts_over() {
        let backend =
            ScriptedBackend::default().get("/audit?entity_type=client&skip=0&limit=50", json!([]));
        let (body, backend) = open(
            backend,
            "/audit?entity_type=client&action=&skip=100&limit=50&shown_entity_type=task&shown_action=",
        )
        .await;
        shows_empty_state(&body);
        assert_eq!(backend.paths(), vec!["/audit?entity_type=client&skip=0&limit=50"]);
    }

    #[rstest]
    #[actix_web::test]
    async fn the_filter_form_echoes_the_shown_filters() {
        let backend = ScriptedBackend::default()
            .get("/audit?entity_type=task&action=login&skip=100&limit=50", json!([]));
        let (body, _) = open(backend, "/audit?entity_type=task&action=login&skip=100").await;
        assert!(body.contains(r#"name="skip" value="100""#));
        assert!(body.contains(r#"name="shown_entity_type" value="task""#));
        assert!(body.contains(r#"name="shown_action" value="login""#));
    }

    #[rstest]
    #[actix_web::test]
    async fn backend_errors_are_shown_in_place_of_the_table() {
        let backend =
            ScriptedBackend::default().fail(ApiMethod::Get, "/audit?skip=0&limit=50", 403, "Admins only");
        let (body, _) = open(backend, "/audit").await;
        assert!(body.contains("Admins only"));
        assert!(!body.contains("No audit logs found"));
    }

    #[rstest]
    #[case(0, 3, "Showing 1 - 3", false, false)]
    #[case(0, 2, "Showing 1 - 2", false, true)]
    #[case(2, 2, "Showing 3 - 4", true, true)]
    #[case(4, 1, "Showing 5 - 5", true, false)]
    fn pager_tracks_the_window(
        #[case] skip: u64,
        #[case] returned: usize,
        #[case] showing: &str,
        #[case] has_previous: bool,
        #[case] has_next: bool,
    ) {
        let query = AuditQuery::from_params(&AuditParams {
            entity_type: Some("client".into()),
            skip: Some(skip.to_string()),
            limit: Some("2".into()),
            ..AuditParams::default()
        });
        let rows: Vec<AuditLog> = serde_json::from_value(logs(returned)).expect("valid logs");
        let page = render("/audit", None, &query, &LoadState::Ready(rows)).into_string();
        assert!(page.contains(showing));
        assert_eq!(page.contains(">Previous</a>"), has_previous);
        assert_eq!(page.contains(">Next</a>"), has_next);
        if has_next {
            let next = format!("/audit?entity_type=client&amp;skip={}&amp;limit=2", skip + 2);
            assert!(page.contains(&next), "missing {next}");
        }
    }
}

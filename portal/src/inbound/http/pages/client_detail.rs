//! Client detail page and its inline forms.
//!
//! Every request loads the client and the group catalogue concurrently and
//! folds them into a [`ClientDetailState`]. A submitted form goes through the
//! same reducer: failures re-render the page with the message next to the
//! form, successes redirect back to the page (303) so a refresh never posts
//! twice. A newly created group stays selected through `?group=`.

use actix_web::http::StatusCode;
use actix_web::http::header::ContentType;
use actix_web::{HttpRequest, HttpResponse, get, post, web};
use futures_util::join;
use maud::{Markup, html};
use serde::Deserialize;
use tracing::warn;
use url::form_urlencoded;

use crate::domain::ports::{ApiError, SessionStore};
use crate::domain::{
    CachedUser, Client, ClientDetailState, DetailAction, DetailForm, FormError, LoadState,
    MissingField, NewAccount, NewContact, NewGroup, RecordId,
};

use super::{layout, rejects_session, see_other, session_expired};
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;

const BLANK: &str = "-";
const GROUP_PARAM: &str = "group";

/// Detail page query: the group to preselect.
#[derive(Debug, Default, Deserialize)]
pub struct DetailQuery {
    #[serde(default)]
    pub group: Option<String>,
}

/// Attach-group form body.
#[derive(Debug, Default, Deserialize)]
pub struct AttachGroup {
    #[serde(default)]
    pub group_id: String,
}

struct SessionRejected;

fn detail_path(id: &RecordId) -> String {
    format!("/clients/{id}")
}

fn detail_location(id: &RecordId, selected: Option<&RecordId>) -> String {
    match selected {
        Some(group) => {
            let query = form_urlencoded::Serializer::new(String::new())
                .append_pair(GROUP_PARAM, &group.to_string())
                .finish();
            format!("{}?{query}", detail_path(id))
        }
        None => detail_path(id),
    }
}

async fn load(
    state: &HttpState,
    session: &SessionContext,
    id: &RecordId,
) -> Result<ClientDetailState, SessionRejected> {
    let mut view = ClientDetailState::default();
    let ticket = view.begin();
    let (client, groups) = join!(
        state.portal.client(session, id),
        state.portal.groups(session)
    );
    if rejects_session(&client) || rejects_session(&groups) {
        return Err(SessionRejected);
    }
    let loaded = match client {
        Ok(client) => DetailAction::ClientLoaded(client),
        Err(err) => {
            warn!(client_id = %id, error = %err, "client unavailable");
            DetailAction::ClientFailed
        }
    };
    view.apply(ticket, loaded);
    let groups = groups.unwrap_or_else(|err| {
        warn!(error = %err, "group catalogue unavailable");
        Vec::new()
    });
    view.apply(ticket, DetailAction::GroupsLoaded(groups));
    Ok(view)
}

fn failed(form: DetailForm, message: impl Into<String>) -> DetailAction {
    DetailAction::FormFailed(FormError {
        form,
        message: message.into(),
    })
}

fn settle<T>(
    form: DetailForm,
    result: Result<T, ApiError>,
    done: impl FnOnce(T) -> DetailAction,
) -> DetailAction {
    match result {
        Ok(value) => done(value),
        Err(err) => {
            warn!(?form, error = %err, "client detail submission failed");
            failed(form, err.to_string())
        }
    }
}

fn field(value: Option<&str>) -> &str {
    value.filter(|v| !v.trim().is_empty()).unwrap_or(BLANK)
}

fn form_error(view: &ClientDetailState, form: DetailForm) -> Markup {
    html! {
        @if let Some(message) = view.form_error(form) {
            p class="error" role="alert" { (message) }
        }
    }
}

fn primary_details(client: &Client) -> Markup {
    html! {
        section class="card" {
            h3 { "Primary Details" }
            dl {
                dt { "Primary Contact" } dd { (field(client.primary_contact.as_deref())) }
                dt { "Email" } dd { (field(client.primary_email.as_deref())) }
                dt { "Phone" } dd { (field(client.primary_phone.as_deref())) }
                dt { "Billing Frequency" } dd { (field(client.billing_frequency.as_deref())) }
            }
        }
    }
}

fn accounts(client: &Client, view: &ClientDetailState) -> Markup {
    html! {
        section class="card" {
            h3 { "Accounts" }
            @if client.accounts.is_empty() {
                div class="empty-state" { "No accounts linked" }
            }
            @for account in &client.accounts {
                div class="row" {
                    strong { (account.name.as_deref().unwrap_or_default()) }
                    " "
                    span class="muted" { (account.institution.as_deref().unwrap_or_default()) }
                    " "
                    span class="badge" { (account.status.as_deref().unwrap_or_default()) }
                }
            }
            form method="post" action={ (detail_path(&client.id)) "/accounts" } {
                input name="name" placeholder="Account name" required;
                input name="institution" placeholder="Institution";
                input name="account_type" placeholder="Type";
                input name="number_last4" placeholder="Last 4";
                button type="submit" { "Add Account" }
            }
            (form_error(view, DetailForm::Account))
        }
    }
}

fn contacts(client: &Client, view: &ClientDetailState) -> Markup {
    html! {
        section class="card" {
            h3 { "Contacts" }
            @if client.contacts.is_empty() {
                div class="empty-state" { "No contacts linked" }
            }
            @for contact in &client.contacts {
                div class="row" {
                    strong { (contact.name.as_deref().unwrap_or_default()) }
                    " "
                    span class="muted" {
                        (contact.email.as_deref().or(contact.phone.as_deref()).unwrap_or_default())
                    }
                    " "
                    span class="badge" { (contact.title.as_deref().unwrap_or("Contact")) }
                }
            }
            form method="post" action={ (detail_path(&client.id)) "/contacts" } {
                input name="name" placeholder="Name" required;
                input name="email" placeholder="Email";
                input name="phone" placeholder="Phone";
                input name="title" placeholder="Title / Role";
                button type="submit" { "Add Contact" }
            }
            (form_error(view, DetailForm::Contact))
        }
    }
}

fn groups(client: &Client, view: &ClientDetailState) -> Markup {
    let related = view.related_clients();
    html! {
        section class="card" {
            h3 { "Related Clients (Intercompany)" }
            @if client.groups.is_empty() {
                div class="empty-state" { "No groups assigned" }
            }
            @for membership in &client.groups {
                @if let Some(group) = &membership.group {
                    div class="row" {
                        strong { (group.name.as_deref().unwrap_or_default()) }
                        " "
                        span class="muted" { (group.description.as_deref().unwrap_or_default()) }
                    }
                }
            }
            form method="post" action={ (detail_path(&client.id)) "/groups" } {
                select name="group_id" required {
                    option value="" { "Select group" }
                    @for group in view.groups() {
                        option value=(group.id) selected[view.selected_group() == Some(&group.id)] {
                            (group.name.as_deref().unwrap_or_default())
                        }
                    }
                }
                button type="submit" { "Attach to Group" }
            }
            (form_error(view, DetailForm::AttachGroup))
            form method="post" action={ (detail_path(&client.id)) "/groups/new" } {
                input name="name" placeholder="New group name" required;
                input name="description" placeholder="Description";
                button type="submit" { "Create Group" }
            }
            (form_error(view, DetailForm::CreateGroup))
            @if !related.is_empty() {
                h4 { "Linked Clients" }
                @for entry in &related {
                    div class="row" {
                        a href=(detail_path(&entry.client_id)) { "Client #" (entry.client_id) }
                        " "
                        span class="muted" { "Group: " (entry.group_name) }
                    }
                }
            }
        }
    }
}

/// Detail page for `view`.
pub fn render(path: &str, user: Option<&CachedUser>, view: &ClientDetailState) -> Markup {
    match view.client() {
        LoadState::Ready(client) => layout::shell(
            &client.display_name(),
            path,
            user,
            html! {
                a href="/clients" { "Back" }
                p class="muted" {
                    "Status: " (client.status.as_deref().unwrap_or("unknown"))
                }
                div class="detail-grid" {
                    (primary_details(client))
                    (accounts(client, view))
                    (contacts(client, view))
                    (groups(client, view))
                }
            },
        ),
        LoadState::Loading | LoadState::Failed(_) => layout::shell(
            "Client",
            path,
            user,
            html! {
                div class="card error" {
                    (view.client().failure().unwrap_or("Loading..."))
                }
                a href="/clients" { "Back to clients" }
            },
        ),
    }
}

fn respond(path: &str, session: &SessionContext, view: &ClientDetailState) -> HttpResponse {
    let status = if view.client().ready().is_some() {
        StatusCode::OK
    } else {
        StatusCode::NOT_FOUND
    };
    HttpResponse::build(status)
        .content_type(ContentType::html())
        .body(render(path, session.cached_user().as_ref(), view).into_string())
}

#[get("/clients/{id}")]
pub async fn client_detail(
    req: HttpRequest,
    id: web::Path<String>,
    query: web::Query<DetailQuery>,
    state: web::Data<HttpState>,
    session: SessionContext,
) -> HttpResponse {
    let id = RecordId::from(id.as_str());
    match load(&state, &session, &id).await {
        Ok(mut view) => {
            if let Some(group) = query.group.as_deref().map(str::trim).filter(|g| !g.is_empty()) {
                view.select_group(&RecordId::from(group));
            }
            respond(req.path(), &session, &view)
        }
        Err(SessionRejected) => session_expired(&state, &session, &detail_path(&id)),
    }
}

/// Load the page, run `call` once the client is known and fold its outcome
/// into the view. Success redirects back to the page; failure renders it.
async fn submit<T>(
    state: &HttpState,
    session: &SessionContext,
    id: &RecordId,
    form: DetailForm,
    call: Result<impl Future<Output = Result<T, ApiError>>, MissingField>,
    done: impl FnOnce(T) -> DetailAction,
) -> HttpResponse {
    let path = detail_path(id);
    let Ok(mut view) = load(state, session, id).await else {
        return session_expired(state, session, &path);
    };
    if view.client().ready().is_some() {
        let ticket = view.begin();
        let action = match call {
            Err(missing) => failed(form, missing.to_string()),
            Ok(call) => {
                let result = call.await;
                if rejects_session(&result) {
                    return session_expired(state, session, &path);
                }
                settle(form, result, done)
            }
        };
        let succeeded = !matches!(action, DetailAction::FormFailed(_));
        if view.apply(ticket, action) && succeeded {
            return see_other(&detail_location(id, view.selected_group()));
        }
    }
    respond(&path, session, &view)
}

#[post("/clients/{id}/contacts")]
pub async fn add_contact(
    id: web::Path<String>,
    state: web::Data<HttpState>,
    session: SessionContext,
    form: web::Form<NewContact>,
) -> HttpResponse {
    let id = RecordId::from(id.as_str());
    let (portal, store, client_id) = (&state.portal, &session, &id);
    let call = form
        .into_inner()
        .validated()
        .map(|contact| async move { portal.add_contact(store, client_id, &contact).await });
    submit(&state, &session, &id, DetailForm::Contact, call, DetailAction::ContactAdded).await
}

#[post("/clients/{id}/accounts")]
pub async fn add_account(
    id: web::Path<String>,
    state: web::Data<HttpState>,
    session: SessionContext,
    form: web::Form<NewAccount>,
) -> HttpResponse {
    let id = RecordId::from(id.as_str());
    let (portal, store, client_id) = (&state.portal, &session, &id);
    let call = form
        .into_inner()
        .validated()
        .map(|account| async move { portal.add_account(store, client_id, &account).await });
    submit(&state, &session, &id, DetailForm::Account, call, DetailAction::AccountCreated).await
}

#[post("/clients/{id}/groups")]
pub async fn attach_group(
    id: web::Path<String>,
    state: web::Data<HttpState>,
    session: SessionContext,
    form: web::Form<AttachGroup>,
) -> HttpResponse {
    let id = RecordId::from(id.as_str());
    let (portal, store, client_id) = (&state.portal, &session, &id);
    let raw = form.group_id.trim();
    let call = if raw.is_empty() {
        Err(MissingField { field: "Group" })
    } else {
        let group_id = RecordId::from(raw);
        Ok(async move { portal.attach_group(store, client_id, &group_id).await })
    };
    submit(&state, &session, &id, DetailForm::AttachGroup, call, DetailAction::GroupAttached).await
}

#[post("/clients/{id}/groups/new")]
pub async fn create_group(
    id: web::Path<String>,
    state: web::Data<HttpState>,
    session: SessionContext,
    form: web::Form<NewGroup>,
) -> HttpResponse {
    let id = RecordId::from(id.as_str());
    let (portal, store) = (&state.portal, &session);
    let call = form
        .into_inner()
        .validated()
        .map(|group| async move { portal.create_group(store, &group).await });
    submit(&state, &session, &id, DetailForm::CreateGroup, call, DetailAction::GroupCreated).await
}

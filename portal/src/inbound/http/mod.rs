//! HTTP inbound adapter: server-rendered pages, the `/session` and `/api`
//! JSON endpoints, and health probes.

pub mod auth;
pub mod error;
pub mod health;
pub mod pages;
pub mod proxy;
pub mod schemas;
pub mod session;
pub mod session_config;
pub mod session_info;
pub mod state;
#[cfg(test)]
pub mod test_utils;

use actix_web::web;

pub use error::ApiResult;

/// Register the portal's page, session and proxy routes.
///
/// Health probes and API docs are mounted by the server alongside this.
/// The caller is expected to wrap these routes in the session gate and the
/// session middleware, and to provide [`state::HttpState`] as app data.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(auth::root)
        .service(auth::login_page)
        .service(auth::login)
        .service(auth::logout)
        .service(pages::dashboard::dashboard)
        .service(pages::clients::list_clients)
        .service(pages::client_detail::client_detail)
        .service(pages::client_detail::add_contact)
        .service(pages::client_detail::add_account)
        .service(pages::client_detail::create_group)
        .service(pages::client_detail::attach_group)
        .service(pages::tasks::task_board)
        .service(pages::audit::audit_log)
        .service(session_info::session_info)
        .service(proxy::proxy);
}

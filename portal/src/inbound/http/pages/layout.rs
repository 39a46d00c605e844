//! Page chrome shared by every screen: document shell, sidebar and top bar.

use maud::{DOCTYPE, Markup, PreEscaped, html};

use crate::domain::CachedUser;

/// Product name shown in the sidebar and page titles.
pub const BRAND: &str = "YB Task Management";

/// Sidebar entries as `(label, href)`.
pub const NAV: [(&str, &str); 4] = [
    ("Dashboard", "/dashboard"),
    ("Clients", "/clients"),
    ("Tasks", "/tasks"),
    ("Audit Logs", "/audit"),
];

const STYLE: &str = "\
body{margin:0;font-family:system-ui,sans-serif;background:#f5f6f7;color:#111827}\
.layout{display:flex;min-height:100vh}\
.sidebar{width:220px;background:#1b7f81;color:#fff;display:flex;flex-direction:column}\
.brand{padding:20px 16px;font-weight:700}\
.nav-item{display:block;padding:10px 16px;color:#fff;text-decoration:none}\
.nav-item.active{background:rgba(255,255,255,.18);font-weight:600}\
.main{flex:1;display:flex;flex-direction:column}\
.topbar{display:flex;justify-content:flex-end;align-items:center;gap:12px;padding:12px 24px;background:#fff}\
.avatar{width:36px;height:36px;border-radius:50%;background:#e5e7eb;display:flex;align-items:center;justify-content:center;font-weight:700}\
.content{padding:24px}\
.card{background:#fff;border-radius:8px;padding:16px;margin-bottom:16px}\
.empty-state,.muted{color:#6b7280}\
.error{color:#b91c1c}\
.badge{padding:2px 8px;border-radius:4px;font-size:12px;background:#f0f0f0}\
.badge--positive{color:#15803d}.badge--negative{color:#b91c1c}.badge--info{color:#1d4ed8}\
table{width:100%;border-collapse:collapse}th,td{text-align:left;padding:8px}\
.board{display:grid;grid-template-columns:repeat(4,1fr);gap:16px}";

/// Bare HTML document.
pub fn base(title: &str, body: Markup) -> Markup {
    html! {
        (DOCTYPE)
        html lang="en" {
            head {
                meta charset="utf-8";
                meta name="viewport" content="width=device-width, initial-scale=1";
                title { (title) " · " (BRAND) }
                style { (PreEscaped(STYLE)) }
            }
            body { (body) }
        }
    }
}

/// Whether the sidebar entry `href` is active for `path`.
pub fn is_active(path: &str, href: &str) -> bool {
    path.starts_with(href)
}

fn sidebar(path: &str) -> Markup {
    html! {
        aside class="sidebar" aria-label="Sidebar" {
            div class="brand" { (BRAND) }
            nav {
                @for (label, href) in NAV {
                    a href=(href)
                        class=(if is_active(path, href) { "nav-item active" } else { "nav-item" }) {
                        (label)
                    }
                }
            }
        }
    }
}

fn topbar(user: Option<&CachedUser>) -> Markup {
    let initial = user.map_or_else(|| "U".to_owned(), CachedUser::initial);
    let name = user.and_then(CachedUser::display_name).unwrap_or_default();
    html! {
        header class="topbar" {
            div class="avatar" { (initial) }
            div class="user-name" { (name) }
            form method="post" action="/logout" {
                button type="submit" { "Logout" }
            }
        }
    }
}

/// Authenticated page: sidebar, top bar and `content`.
pub fn shell(title: &str, path: &str, user: Option<&CachedUser>, content: Markup) -> Markup {
    base(
        title,
        html! {
            div class="layout" {
                (sidebar(path))
                div class="main" {
                    (topbar(user))
                    main class="content" {
                        h1 { (title) }
                        (content)
                    }
                }
            }
        },
    )
}

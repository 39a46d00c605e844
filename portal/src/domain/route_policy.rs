//! Route gating rules: which paths need a session and where to send visitors
//! who are on the wrong side of that line.
//!
//! The policy is pure data plus string matching so it can be unit tested
//! without a running server; the session gate middleware asks it for a
//! [`GateDecision`] on every request.

use url::form_urlencoded;

/// Query parameter carrying the post-login return target.
pub const NEXT_PARAM: &str = "next";

const PROTECTED_PREFIXES: [&str; 4] = ["/dashboard", "/clients", "/tasks", "/audit"];
const BYPASS_PREFIXES: [&str; 7] = [
    "/static",
    "/assets",
    "/favicon.ico",
    "/health",
    "/docs",
    "/api-docs",
    "/api",
];
const LOGIN_PATH: &str = "/login";
const LANDING_PATH: &str = "/dashboard";

/// How a request reached the gate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestKind {
    /// `GET` or `HEAD`; a browser may replay it as-is.
    Navigation,
    /// Anything else, typically a form post.
    Submission,
}

impl RequestKind {
    /// Classify an HTTP method name.
    pub fn from_method(method: &str) -> Self {
        if method.eq_ignore_ascii_case("GET") || method.eq_ignore_ascii_case("HEAD") {
            Self::Navigation
        } else {
            Self::Submission
        }
    }
}

/// Outcome of gating one request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GateDecision {
    /// Let the request through.
    Allow,
    /// Protected path without a session.
    RedirectToLogin {
        /// Login URL including the `next` return target.
        location: String,
    },
    /// Login page requested while a session exists.
    RedirectToLanding {
        /// Landing page path.
        location: String,
    },
}

/// Fixed gating configuration.
///
/// ## Invariants
/// - A path is protected when it equals a protected prefix or continues it
///   with `/`; `/clientsx` is not under `/clients`.
/// - Bypass prefixes win over everything else.
/// - Pages are a protected prefix plus at most one segment. Deeper paths are
///   form endpoints owned by the page above them and are never return
///   targets.
///
/// # Examples
/// ```
/// use portal::domain::{GateDecision, RequestKind, RoutePolicy};
///
/// let policy = RoutePolicy::default();
/// assert_eq!(
///     policy.decide("/clients/7", RequestKind::Navigation, false),
///     GateDecision::RedirectToLogin { location: "/login?next=%2Fclients%2F7".into() },
/// );
/// assert_eq!(
///     policy.decide("/clients/7/contacts", RequestKind::Submission, false),
///     GateDecision::RedirectToLogin { location: "/login?next=%2Fclients%2F7".into() },
/// );
/// assert_eq!(
///     policy.decide("/static/app.css", RequestKind::Navigation, false),
///     GateDecision::Allow,
/// );
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoutePolicy {
    protected: Vec<String>,
    bypass: Vec<String>,
    login_path: String,
    landing_path: String,
}

impl Default for RoutePolicy {
    fn default() -> Self {
        Self {
            protected: PROTECTED_PREFIXES.map(str::to_owned).to_vec(),
            bypass: BYPASS_PREFIXES.map(str::to_owned).to_vec(),
            login_path: LOGIN_PATH.to_owned(),
            landing_path: LANDING_PATH.to_owned(),
        }
    }
}

impl RoutePolicy {
    /// Login entry point.
    pub fn login_path(&self) -> &str {
        &self.login_path
    }

    /// Default destination after login.
    pub fn landing_path(&self) -> &str {
        &self.landing_path
    }

    /// Whether `path` requires a session.
    pub fn is_protected(&self, path: &str) -> bool {
        self.protected.iter().any(|prefix| under(path, prefix))
    }

    /// Whether `path` is never intercepted.
    pub fn is_bypassed(&self, path: &str) -> bool {
        self.bypass.iter().any(|prefix| under(path, prefix))
    }

    /// The page a protected `path` belongs to: its protected prefix plus
    /// the first segment below it. `/clients/7/contacts` belongs to
    /// `/clients/7`.
    pub fn owning_page(&self, path: &str) -> Option<String> {
        let prefix = self.protected.iter().find(|prefix| under(path, prefix))?;
        let rest = &path[prefix.len()..];
        let segment = rest.trim_start_matches('/').split('/').next().unwrap_or_default();
        if segment.is_empty() {
            Some(prefix.clone())
        } else {
            Some(format!("{prefix}/{segment}"))
        }
    }

    /// Gate a request `target` (path plus optional query) given whether a
    /// session marker is present.
    ///
    /// Anonymous navigations come back to the exact target after login.
    /// Anonymous submissions come back to the page that owns the form, since
    /// the form endpoint itself only answers posts.
    pub fn decide(&self, target: &str, kind: RequestKind, has_session: bool) -> GateDecision {
        let path = path_of(target);
        if self.is_bypassed(path) {
            return GateDecision::Allow;
        }
        if !has_session && self.is_protected(path) {
            let next = match kind {
                RequestKind::Navigation => target.to_owned(),
                RequestKind::Submission => self
                    .owning_page(path)
                    .unwrap_or_else(|| self.landing_path.clone()),
            };
            return GateDecision::RedirectToLogin {
                location: self.login_location(&next),
            };
        }
        if has_session && under(path, &self.login_path) {
            return GateDecision::RedirectToLanding {
                location: self.landing_path.clone(),
            };
        }
        GateDecision::Allow
    }

    /// Login URL that returns to `next` afterwards.
    pub fn login_location(&self, next: &str) -> String {
        let query = form_urlencoded::Serializer::new(String::new())
            .append_pair(NEXT_PARAM, next)
            .finish();
        format!("{}?{query}", self.login_path)
    }

    /// Where to go after a successful login.
    ///
    /// Only local protected pages are honoured. Anything else, including
    /// scheme-relative `//host` targets and post-only form endpoints, lands
    /// on the default page.
    pub fn return_target(&self, next: Option<&str>) -> String {
        next.filter(|target| self.is_safe_return_target(target))
            .map_or_else(|| self.landing_path.clone(), str::to_owned)
    }

    fn is_safe_return_target(&self, target: &str) -> bool {
        if !target.starts_with('/') || target.starts_with("//") || target.contains('\\') {
            return false;
        }
        let path = path_of(target);
        self.owning_page(path).as_deref() == Some(path)
    }
}

fn path_of(target: &str) -> &str {
    target.split(['?', '#']).next().unwrap_or_default()
}

fn under(path: &str, prefix: &str) -> bool {
    path.strip_prefix(prefix)
        .is_some_and(|rest| rest.is_empty() || rest.starts_with('/'))
}

//! Audit log entries and the filter/page query the audit view submits.

use std::str::FromStr;

use chrono::{DateTime, NaiveDateTime};
use pagination::PageRequest;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use url::form_urlencoded;

use super::RecordId;

/// Entity types offered by the audit filter, in display order.
pub const ENTITY_TYPES: [&str; 5] = ["task", "client", "user", "permission", "document"];

/// Placeholder for missing timestamps and entity ids.
pub const NOT_AVAILABLE: &str = "N/A";

/// One audit log row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuditLog {
    /// Backend id.
    #[serde(default)]
    pub id: Option<RecordId>,
    /// When the action happened.
    #[serde(default)]
    pub timestamp: Option<String>,
    /// Action name, e.g. `created`.
    #[serde(default)]
    pub action: Option<String>,
    /// Kind of entity acted on.
    #[serde(default)]
    pub entity_type: Option<String>,
    /// Id of the entity acted on.
    #[serde(default)]
    pub entity_id: Option<RecordId>,
    /// Id of the acting user.
    #[serde(default)]
    pub performed_by: Option<RecordId>,
    /// Acting user's full name.
    #[serde(default)]
    pub user_full_name: Option<String>,
    /// Acting user's email.
    #[serde(default)]
    pub user_email: Option<String>,
    /// Free-form JSON details.
    #[serde(default)]
    pub details: Option<Value>,
}

fn non_blank(value: Option<&String>) -> Option<&str> {
    value.map(String::as_str).filter(|v| !v.trim().is_empty())
}

impl AuditLog {
    /// Who performed the action: full name, then email, then `User #id`.
    ///
    /// # Examples
    /// ```
    /// use portal::domain::AuditLog;
    /// use serde_json::json;
    ///
    /// let log: AuditLog = serde_json::from_value(json!({"performed_by": 3})).expect("valid");
    /// assert_eq!(log.actor_label(), "User #3");
    /// ```
    pub fn actor_label(&self) -> String {
        non_blank(self.user_full_name.as_ref())
            .or_else(|| non_blank(self.user_email.as_ref()))
            .map_or_else(
                || {
                    let id = self
                        .performed_by
                        .as_ref()
                        .map_or_else(|| NOT_AVAILABLE.to_owned(), ToString::to_string);
                    format!("User #{id}")
                },
                str::to_owned,
            )
    }

    /// Timestamp as `YYYY-MM-DD HH:MM:SS`; unparseable values are shown
    /// verbatim and missing ones as `N/A`.
    pub fn timestamp_label(&self) -> String {
        let Some(raw) = non_blank(self.timestamp.as_ref()) else {
            return NOT_AVAILABLE.to_owned();
        };
        DateTime::parse_from_rfc3339(raw)
            .map(|parsed| parsed.naive_local())
            .or_else(|_| NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f"))
            .map_or_else(
                |_| raw.to_owned(),
                |parsed| parsed.format("%Y-%m-%d %H:%M:%S").to_string(),
            )
    }

    /// Entity id, or `N/A`.
    pub fn entity_label(&self) -> String {
        self.entity_id
            .as_ref()
            .map_or_else(|| NOT_AVAILABLE.to_owned(), ToString::to_string)
    }

    /// Pretty-printed details, when there are any.
    pub fn details_json(&self) -> Option<String> {
        self.details
            .as_ref()
            .filter(|details| !details.is_null())
            .and_then(|details| serde_json::to_string_pretty(details).ok())
    }

    /// Colour family for the action badge.
    pub fn tone(&self) -> ActionTone {
        ActionTone::for_action(self.action.as_deref().unwrap_or_default())
    }
}

/// Badge colour families for audit actions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionTone {
    /// Creation and sign-in.
    Positive,
    /// Deletion and sign-out.
    Negative,
    /// Updates.
    Info,
    /// Anything else.
    Neutral,
}

impl ActionTone {
    /// Classify an action name by keyword.
    pub fn for_action(action: &str) -> Self {
        let action = action.to_ascii_lowercase();
        if action.contains("create") || action.contains("login") {
            Self::Positive
        } else if action.contains("delete") || action.contains("logout") {
            Self::Negative
        } else if action.contains("update") || action.contains("change") {
            Self::Info
        } else {
            Self::Neutral
        }
    }

    /// CSS modifier class.
    pub fn css_class(self) -> &'static str {
        match self {
            Self::Positive => "badge badge--positive",
            Self::Negative => "badge badge--negative",
            Self::Info => "badge badge--info",
            Self::Neutral => "badge",
        }
    }
}

/// Query string the audit page accepts.
///
/// Every field is kept as text so a malformed `skip` or `limit` falls back
/// to the default page instead of failing the request. The `shown_*` fields
/// echo the filters the page was rendered with; the filter form sends them
/// so a changed filter can restart pagination.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AuditParams {
    /// Entity type filter.
    #[serde(default)]
    pub entity_type: Option<String>,
    /// Action filter.
    #[serde(default)]
    pub action: Option<String>,
    /// Rows to skip.
    #[serde(default)]
    pub skip: Option<String>,
    /// Page size.
    #[serde(default)]
    pub limit: Option<String>,
    /// Entity type the submitting page showed.
    #[serde(default)]
    pub shown_entity_type: Option<String>,
    /// Action filter the submitting page showed.
    #[serde(default)]
    pub shown_action: Option<String>,
}

fn lenient<T: FromStr>(raw: Option<&str>) -> Option<T> {
    raw.and_then(|value| value.trim().parse().ok())
}

/// Normalised filters and page for one audit fetch.
///
/// Unknown entity types and blank actions are dropped. Changing a filter
/// returns to the first page.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AuditQuery {
    entity_type: Option<String>,
    action: Option<String>,
    page: PageRequest,
}

fn clean_entity_type(raw: Option<&str>) -> Option<String> {
    raw.map(str::trim)
        .filter(|value| ENTITY_TYPES.contains(value))
        .map(str::to_owned)
}

fn clean_action(raw: Option<&str>) -> Option<String> {
    raw.map(str::trim)
        .filter(|value| !value.is_empty())
        .map(str::to_owned)
}

impl AuditQuery {
    /// Build from raw page parameters.
    ///
    /// When the parameters carry the filters the page was showing, the new
    /// filters are applied on top of those with [`AuditQuery::with_filters`],
    /// so a changed filter starts again from the first page.
    ///
    /// # Examples
    /// ```
    /// use portal::domain::{AuditParams, AuditQuery};
    ///
    /// let params = AuditParams {
    ///     entity_type: Some("task".into()),
    ///     skip: Some("100".into()),
    ///     shown_entity_type: Some("client".into()),
    ///     shown_action: Some(String::new()),
    ///     ..AuditParams::default()
    /// };
    /// assert_eq!(AuditQuery::from_params(&params).page().skip(), 0);
    ///
    /// let garbled = AuditParams { limit: Some("abc".into()), ..AuditParams::default() };
    /// assert_eq!(AuditQuery::from_params(&garbled).page().limit(), 50);
    /// ```
    pub fn from_params(params: &AuditParams) -> Self {
        let page = PageRequest::from_query(
            lenient(params.skip.as_deref()),
            lenient(params.limit.as_deref()),
        );
        if params.shown_entity_type.is_none() && params.shown_action.is_none() {
            return Self {
                entity_type: clean_entity_type(params.entity_type.as_deref()),
                action: clean_action(params.action.as_deref()),
                page,
            };
        }
        let shown = Self {
            entity_type: clean_entity_type(params.shown_entity_type.as_deref()),
            action: clean_action(params.shown_action.as_deref()),
            page,
        };
        shown.with_filters(params.entity_type.as_deref(), params.action.as_deref())
    }

    /// Selected entity type.
    pub fn entity_type(&self) -> Option<&str> {
        self.entity_type.as_deref()
    }

    /// Action text filter.
    pub fn action(&self) -> Option<&str> {
        self.action.as_deref()
    }

    /// Requested page.
    pub fn page(&self) -> PageRequest {
        self.page
    }

    /// Apply new filter values, returning to the first page when either
    /// differs from the current one.
    #[must_use]
    pub fn with_filters(self, entity_type: Option<&str>, action: Option<&str>) -> Self {
        let entity_type = clean_entity_type(entity_type);
        let action = clean_action(action);
        let page = if entity_type == self.entity_type && action == self.action {
            self.page
        } else {
            self.page.reset()
        };
        Self {
            entity_type,
            action,
            page,
        }
    }

    /// Same filters on a different page.
    #[must_use]
    pub fn with_page(&self, page: PageRequest) -> Self {
        Self {
            page,
            ..self.clone()
        }
    }

    /// `entity_type`, `action`, `skip`, `limit` as a query string.
    pub fn to_query_string(&self) -> String {
        let mut query = form_urlencoded::Serializer::new(String::new());
        if let Some(entity_type) = &self.entity_type {
            query.append_pair("entity_type", entity_type);
        }
        if let Some(action) = &self.action {
            query.append_pair("action", action);
        }
        query.append_pair("skip", &self.page.skip().to_string());
        query.append_pair("limit", &self.page.limit().to_string());
        query.finish()
    }

    /// Backend path for this query.
    pub fn backend_path(&self) -> String {
        format!("/audit?{}", self.to_query_string())
    }
}

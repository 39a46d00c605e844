//! Client, account, contact and group payloads as the backend returns them,
//! plus the form inputs the client pages submit.
//!
//! Decoding is lenient: everything except identifiers is optional and
//! unknown fields are ignored. These types exist to be rendered.

use serde::{Deserialize, Deserializer, Serialize};
use url::form_urlencoded;

use super::RecordId;

pub(crate) fn null_as_empty<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<Vec<T>>::deserialize(deserializer).map(Option::unwrap_or_default)
}

/// A bookkeeping client.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Client {
    /// Backend id.
    pub id: RecordId,
    /// Business name.
    #[serde(default)]
    pub name: Option<String>,
    /// Lifecycle status.
    #[serde(default)]
    pub status: Option<String>,
    /// Email shown in the client list.
    #[serde(default)]
    pub email: Option<String>,
    /// Primary contact person.
    #[serde(default)]
    pub primary_contact: Option<String>,
    /// Primary contact email.
    #[serde(default)]
    pub primary_email: Option<String>,
    /// Primary contact phone.
    #[serde(default)]
    pub primary_phone: Option<String>,
    /// Billing cadence.
    #[serde(default)]
    pub billing_frequency: Option<String>,
    /// Linked financial accounts.
    #[serde(default, deserialize_with = "null_as_empty")]
    pub accounts: Vec<Account>,
    /// Additional contacts.
    #[serde(default, deserialize_with = "null_as_empty")]
    pub contacts: Vec<Contact>,
    /// Group memberships.
    #[serde(default, deserialize_with = "null_as_empty")]
    pub groups: Vec<GroupMembership>,
}

impl Client {
    /// Name for headings, falling back to `Client #id`.
    pub fn display_name(&self) -> String {
        self.name
            .as_deref()
            .filter(|name| !name.trim().is_empty())
            .map_or_else(|| format!("Client #{}", self.id), str::to_owned)
    }

    /// Other clients sharing a group with this one, in membership order.
    ///
    /// # Examples
    /// ```
    /// use portal::domain::Client;
    /// use serde_json::json;
    ///
    /// let client: Client = serde_json::from_value(json!({
    ///     "id": 1,
    ///     "groups": [{"id": 10, "group": {"id": 3, "name": "Holdings",
    ///         "members": [{"client_id": 1}, {"client_id": 2}]}}]
    /// })).expect("valid client");
    /// let related = client.related_clients();
    /// assert_eq!(related.len(), 1);
    /// assert_eq!(related[0].client_id.to_string(), "2");
    /// ```
    pub fn related_clients(&self) -> Vec<RelatedClient> {
        self.groups
            .iter()
            .filter_map(|membership| membership.group.as_ref())
            .flat_map(|group| {
                group
                    .members
                    .iter()
                    .filter_map(|member| member.client_id.as_ref())
                    .filter(|client_id| **client_id != self.id)
                    .map(|client_id| RelatedClient {
                        group_name: group.name.clone().unwrap_or_default(),
                        client_id: client_id.clone(),
                    })
            })
            .collect()
    }
}

/// A financial account linked to a client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    /// Backend id.
    #[serde(default)]
    pub id: Option<RecordId>,
    /// Account name.
    #[serde(default)]
    pub name: Option<String>,
    /// Bank or provider.
    #[serde(default)]
    pub institution: Option<String>,
    /// Account kind.
    #[serde(default)]
    pub account_type: Option<String>,
    /// Last four digits.
    #[serde(default)]
    pub number_last4: Option<String>,
    /// Account status.
    #[serde(default)]
    pub status: Option<String>,
}

/// A contact person attached to a client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Contact {
    /// Backend id.
    #[serde(default)]
    pub id: Option<RecordId>,
    /// Contact name.
    #[serde(default)]
    pub name: Option<String>,
    /// Email.
    #[serde(default)]
    pub email: Option<String>,
    /// Phone.
    #[serde(default)]
    pub phone: Option<String>,
    /// Title or role.
    #[serde(default)]
    pub title: Option<String>,
}

/// A client group (intercompany relationship).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Group {
    /// Backend id.
    pub id: RecordId,
    /// Group name.
    #[serde(default)]
    pub name: Option<String>,
    /// Free-text description.
    #[serde(default)]
    pub description: Option<String>,
    /// Member clients.
    #[serde(default, deserialize_with = "null_as_empty")]
    pub members: Vec<GroupMember>,
}

/// One client's membership in a group.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupMembership {
    /// Membership id.
    #[serde(default)]
    pub id: Option<RecordId>,
    /// The group, when expanded by the backend.
    #[serde(default)]
    pub group: Option<Group>,
}

/// Member entry inside a group.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupMember {
    /// Member client id.
    #[serde(default)]
    pub client_id: Option<RecordId>,
}

/// A client reachable through a shared group.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelatedClient {
    /// Name of the shared group.
    pub group_name: String,
    /// The other client's id.
    pub client_id: RecordId,
}

/// `GET /clients/groups` answers `{"groups": [...]}`; a bare array is
/// accepted too.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub(crate) enum GroupListing {
    Wrapped {
        #[serde(default, deserialize_with = "null_as_empty")]
        groups: Vec<Group>,
    },
    Bare(Vec<Group>),
}

impl GroupListing {
    pub(crate) fn into_groups(self) -> Vec<Group> {
        match self {
            Self::Wrapped { groups } | Self::Bare(groups) => groups,
        }
    }
}

/// Optional search and status filters for the client list.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ClientFilter {
    /// Free-text search.
    #[serde(default)]
    pub search: Option<String>,
    /// Status filter.
    #[serde(default)]
    pub status: Option<String>,
}

impl ClientFilter {
    /// Backend path including any non-blank filters.
    pub fn path(&self) -> String {
        let mut query = form_urlencoded::Serializer::new(String::new());
        let mut any = false;
        for (key, value) in [("search", &self.search), ("status", &self.status)] {
            if let Some(value) = value.as_deref().map(str::trim).filter(|v| !v.is_empty()) {
                query.append_pair(key, value);
                any = true;
            }
        }
        if any {
            format!("/clients?{}", query.finish())
        } else {
            "/clients".to_owned()
        }
    }
}

/// Validation failure for an inline client-detail form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("{field} is required")]
pub struct MissingField {
    /// Human-readable field label.
    pub field: &'static str,
}

fn required(value: &str, field: &'static str) -> Result<String, MissingField> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        Err(MissingField { field })
    } else {
        Ok(trimmed.to_owned())
    }
}

/// Contact form submission.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewContact {
    /// Required name.
    #[serde(default)]
    pub name: String,
    /// Email.
    #[serde(default)]
    pub email: String,
    /// Phone.
    #[serde(default)]
    pub phone: String,
    /// Title or role.
    #[serde(default)]
    pub title: String,
}

impl NewContact {
    /// Check required fields and trim the name.
    ///
    /// # Errors
    /// Returns [`MissingField`] when the name is blank.
    pub fn validated(self) -> Result<Self, MissingField> {
        Ok(Self {
            name: required(&self.name, "Name")?,
            ..self
        })
    }
}

/// Account form submission.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewAccount {
    /// Required account name.
    #[serde(default)]
    pub name: String,
    /// Account kind.
    #[serde(default)]
    pub account_type: String,
    /// Bank or provider.
    #[serde(default)]
    pub institution: String,
    /// Last four digits.
    #[serde(default)]
    pub number_last4: String,
}

impl NewAccount {
    /// Check required fields and trim the name.
    ///
    /// # Errors
    /// Returns [`MissingField`] when the name is blank.
    pub fn validated(self) -> Result<Self, MissingField> {
        Ok(Self {
            name: required(&self.name, "Account name")?,
            ..self
        })
    }
}

/// Group creation form submission.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewGroup {
    /// Required group name.
    #[serde(default)]
    pub name: String,
    /// Description.
    #[serde(default)]
    pub description: String,
}

impl NewGroup {
    /// Check required fields and trim the name.
    ///
    /// # Errors
    /// Returns [`MissingField`] when the name is blank.
    pub fn validated(self) -> Result<Self, MissingField> {
        Ok(Self {
            name: required(&self.name, "Group name")?,
            ..self
        })
    }
}

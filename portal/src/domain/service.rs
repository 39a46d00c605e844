//! Typed backend calls used by the portal pages.
//!
//! Every call reads the token from the visitor's [`SessionStore`] at the
//! moment it is made, so a token set or cleared earlier in the same request
//! is honoured.

use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use tracing::warn;

use super::clients::GroupListing;
use super::ports::{ApiError, ApiRequest, BackendApi, SessionStore};
use super::{
    Account, AuditLog, AuditQuery, CachedUser, Client, ClientFilter, Group, NewAccount,
    NewContact, NewGroup, RecordId, Task,
};

fn decode<T: DeserializeOwned>(body: Option<Value>) -> Result<T, ApiError> {
    let body = body.ok_or_else(|| ApiError::decode("empty response body"))?;
    serde_json::from_value(body).map_err(|err| ApiError::decode(err.to_string()))
}

fn decode_list<T: DeserializeOwned>(body: Option<Value>) -> Result<Vec<T>, ApiError> {
    match body {
        None | Some(Value::Null) => Ok(Vec::new()),
        Some(value) => decode(Some(value)),
    }
}

fn encode<T: Serialize>(value: &T) -> Result<Value, ApiError> {
    serde_json::to_value(value).map_err(|err| ApiError::decode(err.to_string()))
}

/// Backend operations behind the dashboard, client, task and audit pages.
#[derive(Clone)]
pub struct PortalService {
    api: Arc<dyn BackendApi>,
}

impl PortalService {
    /// Wrap a backend adapter.
    pub fn new(api: Arc<dyn BackendApi>) -> Self {
        Self { api }
    }

    async fn call(
        &self,
        store: &dyn SessionStore,
        path: &str,
        request: ApiRequest,
    ) -> Result<Option<Value>, ApiError> {
        self.api
            .request(path, request.with_credential(store.token()))
            .await
    }

    /// `GET /users/me`, refreshing the cached user on success.
    pub async fn current_user(&self, store: &dyn SessionStore) -> Result<CachedUser, ApiError> {
        let user: CachedUser = decode(self.call(store, "/users/me", ApiRequest::get()).await?)?;
        if let Err(err) = store.remember_user(&user) {
            warn!(error = %err, "failed to refresh cached user");
        }
        Ok(user)
    }

    /// `GET /tasks`.
    pub async fn tasks(&self, store: &dyn SessionStore) -> Result<Vec<Task>, ApiError> {
        decode_list(self.call(store, "/tasks", ApiRequest::get()).await?)
    }

    /// `GET /clients` with optional filters.
    pub async fn clients(
        &self,
        store: &dyn SessionStore,
        filter: &ClientFilter,
    ) -> Result<Vec<Client>, ApiError> {
        decode_list(self.call(store, &filter.path(), ApiRequest::get()).await?)
    }

    /// `GET /clients/{id}`.
    pub async fn client(&self, store: &dyn SessionStore, id: &RecordId) -> Result<Client, ApiError> {
        decode(self.call(store, &format!("/clients/{id}"), ApiRequest::get()).await?)
    }

    /// `GET /clients/groups`.
    pub async fn groups(&self, store: &dyn SessionStore) -> Result<Vec<Group>, ApiError> {
        let body = self.call(store, "/clients/groups", ApiRequest::get()).await?;
        match body {
            None | Some(Value::Null) => Ok(Vec::new()),
            Some(value) => decode::<GroupListing>(Some(value)).map(GroupListing::into_groups),
        }
    }

    /// `POST /clients/{id}/contacts`; returns the updated client.
    pub async fn add_contact(
        &self,
        store: &dyn SessionStore,
        id: &RecordId,
        contact: &NewContact,
    ) -> Result<Client, ApiError> {
        let request = ApiRequest::post(encode(contact)?);
        decode(self.call(store, &format!("/clients/{id}/contacts"), request).await?)
    }

    /// `POST /clients/{id}/accounts`; returns the new account.
    pub async fn add_account(
        &self,
        store: &dyn SessionStore,
        id: &RecordId,
        account: &NewAccount,
    ) -> Result<Account, ApiError> {
        let request = ApiRequest::post(encode(account)?);
        decode(self.call(store, &format!("/clients/{id}/accounts"), request).await?)
    }

    /// `POST /clients/{id}/groups/{group_id}`; returns the updated client.
    pub async fn attach_group(
        &self,
        store: &dyn SessionStore,
        id: &RecordId,
        group_id: &RecordId,
    ) -> Result<Client, ApiError> {
        let request = ApiRequest::post(Value::Object(serde_json::Map::new()));
        decode(
            self.call(store, &format!("/clients/{id}/groups/{group_id}"), request)
                .await?,
        )
    }

    /// `POST /clients/groups`; returns the new group.
    pub async fn create_group(
        &self,
        store: &dyn SessionStore,
        group: &NewGroup,
    ) -> Result<Group, ApiError> {
        let request = ApiRequest::post(encode(group)?);
        decode(self.call(store, "/clients/groups", request).await?)
    }

    /// `GET /audit` for one filtered page.
    pub async fn audit_logs(
        &self,
        store: &dyn SessionStore,
        query: &AuditQuery,
    ) -> Result<Vec<AuditLog>, ApiError> {
        decode_list(
            self.call(store, &query.backend_path(), ApiRequest::get())
                .await?,
        )
    }

    /// Pass an arbitrary call through with the visitor's credential.
    pub async fn forward(
        &self,
        store: &dyn SessionStore,
        path: &str,
        request: ApiRequest,
    ) -> Result<Option<Value>, ApiError> {
        self.call(store, path, request).await
    }
}

//! View state for the client detail page.
//!
//! Loads and inline-form submissions are applied through
//! [`ClientDetailState::apply`] with the ticket issued when they started, so
//! a superseded completion is dropped instead of overwriting newer data.

use super::{Account, Client, Group, LoadState, RecordId, RelatedClient, RequestGeneration, Ticket};

/// Message shown when the client cannot be loaded.
pub const CLIENT_NOT_FOUND: &str = "Client not found";

/// Inline forms on the detail page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DetailForm {
    /// Add a contact.
    Contact,
    /// Add an account.
    Account,
    /// Attach an existing group.
    AttachGroup,
    /// Create a new group.
    CreateGroup,
}

/// Error attached to one inline form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormError {
    /// Form the error belongs to.
    pub form: DetailForm,
    /// Message to show next to it.
    pub message: String,
}

/// A completed load or submission.
#[derive(Debug, Clone, PartialEq)]
pub enum DetailAction {
    /// The client record arrived.
    ClientLoaded(Client),
    /// The client could not be loaded.
    ClientFailed,
    /// The group catalogue arrived. Failures arrive as an empty list.
    GroupsLoaded(Vec<Group>),
    /// A contact was added; the backend returned the updated client.
    ContactAdded(Client),
    /// An account was created.
    AccountCreated(Account),
    /// A group was attached; the backend returned the updated client.
    GroupAttached(Client),
    /// A group was created; it joins the catalogue and becomes selected.
    GroupCreated(Group),
    /// A submission failed.
    FormFailed(FormError),
}

/// Everything the detail page renders.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ClientDetailState {
    generation: RequestGeneration,
    client: LoadState<Client>,
    groups: Vec<Group>,
    selected_group: Option<RecordId>,
    form_error: Option<FormError>,
}

impl ClientDetailState {
    /// Ticket for a load or submission about to start.
    pub fn begin(&mut self) -> Ticket {
        self.generation.issue()
    }

    /// Fold a completion into the state. Returns `false` when `ticket` is
    /// stale or the action needs a loaded client that is not there.
    pub fn apply(&mut self, ticket: Ticket, action: DetailAction) -> bool {
        if !self.generation.is_current(ticket) {
            return false;
        }
        match action {
            DetailAction::ClientLoaded(client) => {
                self.client = LoadState::Ready(client);
            }
            DetailAction::ClientFailed => {
                self.client = LoadState::Failed(CLIENT_NOT_FOUND.to_owned());
            }
            DetailAction::GroupsLoaded(groups) => self.groups = groups,
            DetailAction::ContactAdded(client) | DetailAction::GroupAttached(client) => {
                self.client = LoadState::Ready(client);
                self.form_error = None;
            }
            DetailAction::AccountCreated(account) => {
                let LoadState::Ready(client) = &mut self.client else {
                    return false;
                };
                client.accounts.push(account);
                self.form_error = None;
            }
            DetailAction::GroupCreated(group) => {
                self.selected_group = Some(group.id.clone());
                self.groups.push(group);
                self.form_error = None;
            }
            DetailAction::FormFailed(error) => self.form_error = Some(error),
        }
        true
    }

    /// Client load state.
    pub fn client(&self) -> &LoadState<Client> {
        &self.client
    }

    /// Group catalogue for the attach selector.
    pub fn groups(&self) -> &[Group] {
        &self.groups
    }

    /// Group preselected in the attach selector.
    pub fn selected_group(&self) -> Option<&RecordId> {
        self.selected_group.as_ref()
    }

    /// Preselect `id` in the attach selector when the catalogue holds it.
    pub fn select_group(&mut self, id: &RecordId) -> bool {
        if !self.groups.iter().any(|group| &group.id == id) {
            return false;
        }
        self.selected_group = Some(id.clone());
        true
    }

    /// Error for `form`, if its last submission failed.
    pub fn form_error(&self, form: DetailForm) -> Option<&str> {
        self.form_error
            .as_ref()
            .filter(|error| error.form == form)
            .map(|error| error.message.as_str())
    }

    /// Clients sharing a group with the loaded client.
    pub fn related_clients(&self) -> Vec<RelatedClient> {
        self.client
            .ready()
            .map(Client::related_clients)
            .unwrap_or_default()
    }
}

//! Explicit view-state values for pages that load backend data.
//!
//! Views that fold several loads and submissions together take a [`Ticket`]
//! from their [`RequestGeneration`] per operation. Only the completion holding
//! the latest ticket may update the view, so a slow response can never
//! overwrite a newer one.

use super::ports::ApiError;

/// Monotonic ticket issued per load.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Ticket(u64);

/// Issues tickets and remembers the newest.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestGeneration {
    latest: u64,
}

impl RequestGeneration {
    /// Issue a ticket newer than every earlier one.
    pub fn issue(&mut self) -> Ticket {
        self.latest = self.latest.saturating_add(1);
        Ticket(self.latest)
    }

    /// Whether `ticket` is the newest issued.
    pub fn is_current(&self, ticket: Ticket) -> bool {
        ticket.0 == self.latest
    }
}

/// Lifecycle of one piece of page data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadState<T> {
    /// Load issued, nothing back yet.
    Loading,
    /// Data arrived.
    Ready(T),
    /// Load failed; holds the message to show.
    Failed(String),
}

impl<T> Default for LoadState<T> {
    fn default() -> Self {
        Self::Loading
    }
}

impl<T> LoadState<T> {
    /// Data, when ready.
    pub fn ready(&self) -> Option<&T> {
        match self {
            Self::Ready(value) => Some(value),
            Self::Loading | Self::Failed(_) => None,
        }
    }

    /// Failure message, when failed.
    pub fn failure(&self) -> Option<&str> {
        match self {
            Self::Failed(message) => Some(message),
            Self::Loading | Self::Ready(_) => None,
        }
    }
}

impl<T> From<Result<T, ApiError>> for LoadState<T> {
    fn from(result: Result<T, ApiError>) -> Self {
        match result {
            Ok(value) => Self::Ready(value),
            Err(error) => Self::Failed(error.to_string()),
        }
    }
}
